//! # Docmap - Object-Document Mapping
//!
//! Docmap converts typed entities into schemaless, ordered documents and
//! reads those documents back into entities. Values that cannot be stored
//! natively go through a registry of typed conversion rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docmap::MapperBuilder;
//! use docmap_derive::Entity;
//!
//! #[derive(Entity, Clone, Default, Debug, PartialEq)]
//! struct Person {
//!     id: Option<String>,
//!     name: String,
//!     age: i32,
//! }
//!
//! # fn main() -> docmap::errors::MapperResult<()> {
//! let mapper = MapperBuilder::new().build()?;
//!
//! let person = Person { id: None, name: "John".to_string(), age: 30 };
//! let document = mapper.to_document(&person)?;
//! assert_eq!(document.get("name"), Some(&"John".into()));
//!
//! let copy: Option<Person> = mapper.read_as(Some(&document))?;
//! assert_eq!(copy, Some(person));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Values, type references and the [`common::Convertible`] trait
//! - [`document`] - Documents and object ids
//! - [`entity`] - Entity models, entity types and identifier information
//! - [`errors`] - Error types and result definitions
//! - [`mapper`] - Conversion registry, descriptor resolution, writer and reader
//! - [`mapper_builder`] - Mapper builder
//! - [`mapper_config`] - Mapper configuration

pub mod common;
pub mod document;
pub mod entity;
pub mod errors;
pub mod mapper;
pub mod mapper_builder;
pub mod mapper_config;

pub use document::{Document, ObjectId};
pub use mapper::DocumentMapper;
pub use mapper_builder::MapperBuilder;
pub use mapper_config::MapperConfig;
