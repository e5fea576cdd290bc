mod descriptor;
mod document_mapper;
mod reader;
mod registry;
mod simple_types;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use descriptor::*;
pub use document_mapper::*;
pub use reader::*;
pub use registry::*;
pub use simple_types::*;
pub use writer::*;
