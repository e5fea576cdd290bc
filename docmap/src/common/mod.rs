mod convertible;
mod scalars;
mod types;
mod value;

pub use convertible::*;
pub use scalars::*;
pub use types::*;
pub use value::*;
