use crate::common::{TypeRef, Value};

/// Returns `true` if values of `type_ref` are stored in a document field as
/// they are, without recursive decomposition.
///
/// Scalars, text, date-times, locales, patterns, type names, db-refs,
/// code-with-scope values, object ids and enums are simple, and so is an
/// array whose element type is simple. Lists, sets, maps, entities, nested
/// documents, big integers, custom types and `Any` are compound.
pub fn is_simple_type(type_ref: &TypeRef) -> bool {
    match type_ref {
        TypeRef::Bool
        | TypeRef::I8
        | TypeRef::I16
        | TypeRef::I32
        | TypeRef::I64
        | TypeRef::U8
        | TypeRef::U16
        | TypeRef::U32
        | TypeRef::U64
        | TypeRef::F32
        | TypeRef::F64
        | TypeRef::Char
        | TypeRef::String
        | TypeRef::DateTime
        | TypeRef::Locale
        | TypeRef::Pattern
        | TypeRef::TypeName
        | TypeRef::DbRef
        | TypeRef::CodeWithScope
        | TypeRef::ObjectId
        | TypeRef::Enum(_) => true,
        TypeRef::Array(element) => is_simple_type(element),
        _ => false,
    }
}

/// Classifies a value by its runtime type.
///
/// Arrays are judged item by item, so an empty or mixed array of simple
/// items is simple even though its common element type is `Any`.
pub fn is_simple_value(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|item| item.is_null() || is_simple_value(item)),
        _ => is_simple_type(&value.type_ref()),
    }
}
