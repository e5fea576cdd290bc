mod entity;
mod information;

pub use entity::*;
pub use information::*;
