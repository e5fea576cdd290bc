use crate::common::{CodeWithScope, CustomType, DbRef, EnumConstant, Locale, Pattern, TypeName, TypeRef};
use crate::document::{Document, ObjectId};
use crate::entity::Entity;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use num_bigint::BigInt;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A dynamically typed value.
///
/// Entities expose their properties as `Value`s and documents store
/// `Value`s, so the writer and reader move data between the two without an
/// intermediate representation. Documents only ever contain scalars,
/// [Value::ObjectId], [Value::Document], [Value::Array] and [Value::List];
/// the remaining variants (`Set`, `Map`, `Enum`, `Entity`, `Custom`,
/// `BigInt`) only appear on the entity side.
///
/// # Usage
///
/// ```text
/// let v1: Value = 42.into();
/// let v2 = Value::from("hello");
/// let doc = doc! { "age": 42, "name": "Alice" };
/// ```
#[derive(Clone, Default, PartialEq, Debug)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    DateTime(DateTime<Utc>),
    Locale(Locale),
    Pattern(Pattern),
    TypeName(TypeName),
    DbRef(DbRef),
    CodeWithScope(CodeWithScope),
    ObjectId(ObjectId),
    BigInt(BigInt),
    Document(Document),
    /// A raw array.
    Array(Vec<Value>),
    /// A generic ordered sequence.
    List(Vec<Value>),
    /// An unordered collection without duplicates.
    Set(Vec<Value>),
    /// Key/value entries in iteration order.
    Map(Vec<(Value, Value)>),
    Enum(EnumConstant),
    Entity(Box<dyn Entity>),
    Custom(CustomValue),
}

impl Value {
    /// Returns the runtime type of this value.
    ///
    /// The element type of a sequence (and the key/value types of a map) is
    /// the common type of its non-null items, or [TypeRef::Any] when the
    /// items disagree or there are none.
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Value::Null => TypeRef::Any,
            Value::Bool(_) => TypeRef::Bool,
            Value::I8(_) => TypeRef::I8,
            Value::I16(_) => TypeRef::I16,
            Value::I32(_) => TypeRef::I32,
            Value::I64(_) => TypeRef::I64,
            Value::U8(_) => TypeRef::U8,
            Value::U16(_) => TypeRef::U16,
            Value::U32(_) => TypeRef::U32,
            Value::U64(_) => TypeRef::U64,
            Value::F32(_) => TypeRef::F32,
            Value::F64(_) => TypeRef::F64,
            Value::Char(_) => TypeRef::Char,
            Value::String(_) => TypeRef::String,
            Value::DateTime(_) => TypeRef::DateTime,
            Value::Locale(_) => TypeRef::Locale,
            Value::Pattern(_) => TypeRef::Pattern,
            Value::TypeName(_) => TypeRef::TypeName,
            Value::DbRef(_) => TypeRef::DbRef,
            Value::CodeWithScope(_) => TypeRef::CodeWithScope,
            Value::ObjectId(_) => TypeRef::ObjectId,
            Value::BigInt(_) => TypeRef::BigInt,
            Value::Document(_) => TypeRef::Document,
            Value::Array(items) => TypeRef::array(common_type(items.iter())),
            Value::List(items) => TypeRef::list(common_type(items.iter())),
            Value::Set(items) => TypeRef::set(common_type(items.iter())),
            Value::Map(entries) => TypeRef::map(
                common_type(entries.iter().map(|(key, _)| key)),
                common_type(entries.iter().map(|(_, value)| value)),
            ),
            Value::Enum(constant) => TypeRef::Enum(constant.enum_type()),
            Value::Entity(entity) => TypeRef::Entity(entity.entity_type()),
            Value::Custom(custom) => TypeRef::Custom(custom.custom_type()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens any integral variant to `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::I8(v) => Some(*v as i128),
            Value::I16(v) => Some(*v as i128),
            Value::I32(v) => Some(*v as i128),
            Value::I64(v) => Some(*v as i128),
            Value::U8(v) => Some(*v as i128),
            Value::U16(v) => Some(*v as i128),
            Value::U32(v) => Some(*v as i128),
            Value::U64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Widens any numeric variant to `f64`.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => self.as_integer().map(|v| v as f64),
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Items of an array, list or set.
    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) | Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Vec<(Value, Value)>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            Value::Enum(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&dyn Entity> {
        match self {
            Value::Entity(entity) => Some(entity.as_ref()),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomValue> {
        match self {
            Value::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Replaces this value with [Value::Null] and returns the old one.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }
}

fn common_type<'a>(mut items: impl Iterator<Item = &'a Value>) -> TypeRef {
    let mut common: Option<TypeRef> = None;
    for item in items.by_ref().filter(|item| !item.is_null()) {
        let item_type = item.type_ref();
        match &common {
            None => common = Some(item_type),
            Some(existing) if *existing == item_type => {}
            Some(_) => return TypeRef::Any,
        }
    }
    common.unwrap_or(TypeRef::Any)
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "\"{}\"", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::DateTime(v) => write!(f, "\"{}\"", v.to_rfc3339()),
            Value::Locale(v) => write!(f, "\"{}\"", v),
            Value::Pattern(v) => write!(f, "/{}/", v.as_str()),
            Value::TypeName(v) => write!(f, "\"{}\"", v.as_str()),
            Value::DbRef(v) => write!(f, "{{\"$ref\": \"{}\", \"$id\": \"{}\"}}", v.namespace(), v.id()),
            Value::CodeWithScope(v) => write!(f, "{{\"$code\": \"{}\", \"$scope\": {}}}", v.code(), v.scope()),
            Value::ObjectId(v) => write!(f, "ObjectId(\"{}\")", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Document(v) => write!(f, "{}", v),
            Value::Array(items) | Value::List(items) | Value::Set(items) => {
                write!(f, "[{}]", items.iter().join(", "))
            }
            Value::Map(entries) => write!(
                f,
                "{{{}}}",
                entries.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
            ),
            Value::Enum(constant) => write!(f, "{:?}", constant),
            Value::Entity(entity) => write!(f, "{:?}", entity),
            Value::Custom(custom) => write!(f, "{:?}", custom),
        }
    }
}

/// An opaque application value the mapper can only handle through a
/// registered conversion rule.
#[derive(Clone)]
pub struct CustomValue {
    custom_type: CustomType,
    inner: Arc<dyn Any + Send + Sync>,
    eq_fn: fn(&dyn Any, &dyn Any) -> bool,
    fmt_fn: fn(&dyn Any, &mut Formatter<'_>) -> std::fmt::Result,
}

impl CustomValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + Debug,
    {
        CustomValue {
            custom_type: CustomType::of::<T>(),
            inner: Arc::new(value),
            eq_fn: eq_any::<T>,
            fmt_fn: fmt_any::<T>,
        }
    }

    pub fn custom_type(&self) -> CustomType {
        self.custom_type
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

fn eq_any<T: Any + PartialEq>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn fmt_any<T: Any + Debug>(value: &dyn Any, f: &mut Formatter<'_>) -> std::fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => write!(f, "{:?}", value),
        None => write!(f, "<opaque>"),
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.custom_type == other.custom_type && (self.eq_fn)(self.inner.as_ref(), other.inner.as_ref())
    }
}

impl Debug for CustomValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        (self.fmt_fn)(self.inner.as_ref(), f)
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    DateTime<Utc> => DateTime,
    Locale => Locale,
    Pattern => Pattern,
    TypeName => TypeName,
    DbRef => DbRef,
    CodeWithScope => CodeWithScope,
    ObjectId => ObjectId,
    BigInt => BigInt,
    Document => Document,
    EnumConstant => Enum,
    Box<dyn Entity> => Entity,
    CustomValue => Custom,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{Error, SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Char(v) => serializer.serialize_char(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::DateTime(v) => serializer.serialize_str(&v.to_rfc3339()),
            Value::Locale(v) => serializer.serialize_str(v.tag()),
            Value::Pattern(v) => serializer.serialize_str(v.as_str()),
            Value::TypeName(v) => serializer.serialize_str(v.as_str()),
            Value::DbRef(v) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("$ref", v.namespace())?;
                map.serialize_entry("$id", v.id())?;
                map.end()
            }
            Value::CodeWithScope(v) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("$code", v.code())?;
                map.serialize_entry("$scope", v.scope())?;
                map.end()
            }
            Value::ObjectId(v) => v.serialize(serializer),
            Value::BigInt(v) => serializer.serialize_str(&v.to_string()),
            Value::Document(v) => v.serialize(serializer),
            Value::Array(items) | Value::List(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Enum(constant) => serializer.serialize_str(constant.name()),
            Value::Map(_) | Value::Entity(_) | Value::Custom(_) => Err(S::Error::custom(format!(
                "{} is not a document value and cannot be serialized",
                self.type_ref()
            ))),
        }
    }
}
