use crate::common::{CodeWithScope, DbRef, Locale, Pattern, TypeName, TypeRef, Value};
use crate::document::{Document, ObjectId};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// Bridges a statically typed Rust value and the dynamic [Value].
///
/// `type_ref` reports the declared type the descriptor resolver sees for a
/// field of this type, `to_value` exposes a field to the writer and
/// `from_value` assigns what the reader produced. The derive macros
/// implement this for entities and enums; [crate::custom_convertible]
/// implements it for opaque application types.
pub trait Convertible: Sized {
    fn type_ref() -> TypeRef;

    fn to_value(&self) -> MapperResult<Value>;

    fn from_value(value: &Value) -> MapperResult<Self>;
}

/// Logs and returns the [ErrorKind::ObjectMappingError] raised when a
/// [Value] does not hold the variant a typed field needs.
pub fn mapping_error<T>(value: &Value, expected: &str) -> MapperResult<T> {
    log::error!("Value {} is not {}", value, expected);
    Err(MapperError::new(
        &format!("Value {} is not {}", value, expected),
        ErrorKind::ObjectMappingError,
    ))
}

macro_rules! impl_scalar_convertible {
    ($($ty:ty => $variant:ident, $type_ref:expr, $expected:literal);* $(;)?) => {
        $(
            impl Convertible for $ty {
                fn type_ref() -> TypeRef {
                    $type_ref
                }

                fn to_value(&self) -> MapperResult<Value> {
                    Ok(Value::$variant(self.clone()))
                }

                fn from_value(value: &Value) -> MapperResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        _ => mapping_error(value, $expected),
                    }
                }
            }
        )*
    };
}

impl_scalar_convertible! {
    bool => Bool, TypeRef::Bool, "a bool";
    i8 => I8, TypeRef::I8, "an i8";
    i16 => I16, TypeRef::I16, "an i16";
    i32 => I32, TypeRef::I32, "an i32";
    i64 => I64, TypeRef::I64, "an i64";
    u8 => U8, TypeRef::U8, "a u8";
    u16 => U16, TypeRef::U16, "a u16";
    u32 => U32, TypeRef::U32, "a u32";
    u64 => U64, TypeRef::U64, "a u64";
    f32 => F32, TypeRef::F32, "an f32";
    f64 => F64, TypeRef::F64, "an f64";
    char => Char, TypeRef::Char, "a char";
    String => String, TypeRef::String, "a string";
    DateTime<Utc> => DateTime, TypeRef::DateTime, "a date-time";
    Locale => Locale, TypeRef::Locale, "a locale";
    Pattern => Pattern, TypeRef::Pattern, "a pattern";
    TypeName => TypeName, TypeRef::TypeName, "a type name";
    DbRef => DbRef, TypeRef::DbRef, "a db-ref";
    CodeWithScope => CodeWithScope, TypeRef::CodeWithScope, "code with scope";
    ObjectId => ObjectId, TypeRef::ObjectId, "an object id";
    BigInt => BigInt, TypeRef::BigInt, "a big integer";
    Document => Document, TypeRef::Document, "a document";
}

impl Convertible for Value {
    fn type_ref() -> TypeRef {
        TypeRef::Any
    }

    fn to_value(&self) -> MapperResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        Ok(value.clone())
    }
}

impl<T: Convertible> Convertible for Option<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn to_value(&self) -> MapperResult<Value> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

impl<T: Convertible> Convertible for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn to_value(&self) -> MapperResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        T::from_value(value).map(Box::new)
    }
}

fn sequence_items<'a>(value: &'a Value, expected: &str) -> MapperResult<&'a Vec<Value>> {
    match value.as_sequence() {
        Some(items) => Ok(items),
        None => mapping_error(value, expected),
    }
}

fn to_values<'a, T: Convertible + 'a>(items: impl Iterator<Item = &'a T>) -> MapperResult<Vec<Value>> {
    items.map(Convertible::to_value).collect()
}

impl<T: Convertible> Convertible for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::list(T::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::List(to_values(self.iter())?))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        sequence_items(value, "a list")?.iter().map(T::from_value).collect()
    }
}

impl<T: Convertible> Convertible for Box<[T]> {
    fn type_ref() -> TypeRef {
        TypeRef::array(T::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::Array(to_values(self.iter())?))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        sequence_items(value, "an array")?
            .iter()
            .map(T::from_value)
            .collect::<MapperResult<Vec<T>>>()
            .map(Vec::into_boxed_slice)
    }
}

impl<T: Convertible + Eq + Hash> Convertible for HashSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::set(T::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::Set(to_values(self.iter())?))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        sequence_items(value, "a set")?.iter().map(T::from_value).collect()
    }
}

impl<T: Convertible + Ord> Convertible for BTreeSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::set(T::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        Ok(Value::Set(to_values(self.iter())?))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        sequence_items(value, "a set")?.iter().map(T::from_value).collect()
    }
}

fn map_entries(value: &Value) -> MapperResult<Vec<(Value, Value)>> {
    match value {
        Value::Map(entries) => Ok(entries.clone()),
        Value::Document(doc) => Ok(doc
            .iter()
            .map(|(key, value)| (Value::from(key), value.clone()))
            .collect()),
        _ => mapping_error(value, "a map"),
    }
}

impl<K: Convertible + Eq + Hash, V: Convertible> Convertible for HashMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::map(K::type_ref(), V::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        let mut entries = Vec::with_capacity(self.len());
        for (key, value) in self {
            entries.push((key.to_value()?, value.to_value()?));
        }
        Ok(Value::Map(entries))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        map_entries(value)?
            .iter()
            .map(|(key, value)| -> MapperResult<(K, V)> { Ok((K::from_value(key)?, V::from_value(value)?)) })
            .collect()
    }
}

impl<K: Convertible + Ord, V: Convertible> Convertible for BTreeMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::map(K::type_ref(), V::type_ref())
    }

    fn to_value(&self) -> MapperResult<Value> {
        let mut entries = Vec::with_capacity(self.len());
        for (key, value) in self {
            entries.push((key.to_value()?, value.to_value()?));
        }
        Ok(Value::Map(entries))
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        map_entries(value)?
            .iter()
            .map(|(key, value)| -> MapperResult<(K, V)> { Ok((K::from_value(key)?, V::from_value(value)?)) })
            .collect()
    }
}

/// Implements [Convertible] for an opaque application type, which then
/// travels through the mapper as a [crate::common::CustomValue]. The type
/// must be `Clone + PartialEq + Debug + Send + Sync + 'static`.
///
/// ```rust,ignore
/// #[derive(Clone, PartialEq, Debug)]
/// struct Money { cents: i64 }
///
/// docmap::custom_convertible!(Money);
/// ```
#[macro_export]
macro_rules! custom_convertible {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::common::Convertible for $ty {
                fn type_ref() -> $crate::common::TypeRef {
                    $crate::common::TypeRef::Custom($crate::common::CustomType::of::<$ty>())
                }

                fn to_value(&self) -> $crate::errors::MapperResult<$crate::common::Value> {
                    Ok($crate::common::Value::Custom($crate::common::CustomValue::new(self.clone())))
                }

                fn from_value(value: &$crate::common::Value) -> $crate::errors::MapperResult<Self> {
                    match value.as_custom().and_then(|custom| custom.downcast_ref::<$ty>()) {
                        Some(inner) => Ok(inner.clone()),
                        None => $crate::common::mapping_error(value, stringify!($ty)),
                    }
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[derive(Clone, PartialEq, Debug)]
    struct Money {
        cents: i64,
    }

    crate::custom_convertible!(Money);

    #[test]
    fn scalars_round_trip() {
        assert_eq!(42i32.to_value().unwrap(), Value::I32(42));
        assert_eq!(i32::from_value(&Value::I32(42)).unwrap(), 42);
        assert_eq!(String::from_value(&Value::from("x")).unwrap(), "x");
        assert_eq!(<u16 as Convertible>::type_ref(), TypeRef::U16);
    }

    #[test]
    fn wrong_variant_is_a_mapping_error() {
        let err = i32::from_value(&Value::I64(1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i32>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(&Value::I32(3)).unwrap(), Some(3));
        assert_eq!(None::<String>.to_value().unwrap(), Value::Null);
        assert_eq!(<Option<String> as Convertible>::type_ref(), TypeRef::String);
    }

    #[test]
    fn containers_report_declared_shapes() {
        assert_eq!(<Vec<i64> as Convertible>::type_ref(), TypeRef::list(TypeRef::I64));
        assert_eq!(<Box<[String]> as Convertible>::type_ref(), TypeRef::array(TypeRef::String));
        assert_eq!(<HashSet<u8> as Convertible>::type_ref(), TypeRef::set(TypeRef::U8));
        assert_eq!(
            <HashMap<String, f64> as Convertible>::type_ref(),
            TypeRef::map(TypeRef::String, TypeRef::F64)
        );
    }

    #[test]
    fn vec_accepts_any_sequence_shape() {
        let from_array = Vec::<i32>::from_value(&Value::Array(vec![Value::I32(1), Value::I32(2)])).unwrap();
        let from_list = Vec::<i32>::from_value(&Value::List(vec![Value::I32(1), Value::I32(2)])).unwrap();
        assert_eq!(from_array, vec![1, 2]);
        assert_eq!(from_array, from_list);
        assert_eq!(vec![1i32].to_value().unwrap(), Value::List(vec![Value::I32(1)]));
    }

    #[test]
    fn maps_accept_documents() {
        let doc = doc! { a: 1, b: 2 };
        let map = BTreeMap::<String, i32>::from_value(&Value::Document(doc)).unwrap();
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn custom_types_travel_as_custom_values() {
        let money = Money { cents: 250 };
        let value = money.to_value().unwrap();
        assert_eq!(value.type_ref(), TypeRef::Custom(crate::common::CustomType::of::<Money>()));
        assert_eq!(Money::from_value(&value).unwrap(), money);
        assert!(Money::from_value(&Value::I64(250)).is_err());
    }
}
