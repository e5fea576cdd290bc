#![recursion_limit = "128"]
//! # Docmap Derive Macros
//!
//! Procedural macros generating the metadata the docmap mapper reads.
//!
//! ## Macros
//!
//! ### `Entity`
//!
//! Derives `Entity`, `MappedEntity` and `Convertible` for a struct with
//! named fields, so the mapper can write it to a document and read it back.
//!
//! - **Container attribute**: `#[entity(name = "...")]` sets the entity name
//! - **Field attributes**: `#[entity(id)]`, `#[entity(key = "...")]`, `#[entity(transient)]`
//!
//! The struct must also implement `Clone` and `Default`; the reader creates
//! instances from `Default` before assigning properties.
//!
//! # Examples
//!
//! ```rust,ignore
//! use docmap_derive::Entity;
//!
//! #[derive(Entity, Clone, Default)]
//! #[entity(name = "people")]
//! pub struct Person {
//!     #[entity(id)]
//!     pub code: String,
//!     #[entity(key = "n")]
//!     pub name: String,
//!     #[entity(transient)]
//!     pub cache: Option<String>,
//! }
//! ```
//!
//! ### `MappedEnum`
//!
//! Derives `Convertible` for a fieldless enum. Constants are stored by their
//! symbolic name.
//!
//! ```rust,ignore
//! use docmap_derive::MappedEnum;
//!
//! #[derive(MappedEnum, Clone, Copy)]
//! pub enum Status {
//!     Active,
//!     Retired,
//! }
//! ```

extern crate proc_macro;
mod entity;
mod mapped_enum;

use crate::entity::generate_entity_for_struct;
use crate::mapped_enum::generate_mapped_enum;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `Entity`, `MappedEntity` and `Convertible` for a struct.
///
/// # Attributes
///
/// - `#[entity(name = "...")]` on the struct - entity name, defaults to the struct name
/// - `#[entity(id)]` - marks the identifier property
/// - `#[entity(key = "...")]` - stores the property under another document key
/// - `#[entity(transient)]` - excludes the property from mapping
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a generic struct
/// - An attribute is unknown or malformed
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!(
                        "Failed to derive Entity for struct '{}': {}.\n\
                         Example: #[derive(Entity, Clone, Default)] pub struct MyEntity {{ field: Type }}",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for enums. Use #[derive(MappedEnum)] for fieldless enums.",
            );
            error.to_compile_error().into()
        }
        Data::Union(_) => {
            let error = syn::Error::new_spanned(&ast, "Cannot derive Entity for unions. Only structs are supported.");
            error.to_compile_error().into()
        }
    }
}

/// Derives `Convertible` for a fieldless enum.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to a struct or a union
/// - Any variant carries data, or the enum is generic
#[proc_macro_derive(MappedEnum)]
pub fn derive_mapped_enum(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Enum(ref data) => match generate_mapped_enum(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!(
                        "Failed to derive MappedEnum for enum '{}': {}.\n\
                         Only enums with unit variants are supported.",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Struct(_) | Data::Union(_) => {
            let error = syn::Error::new_spanned(&ast, "MappedEnum can only be derived for enums.");
            error.to_compile_error().into()
        }
    }
}
