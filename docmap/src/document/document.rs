use crate::common::Value;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use indexmap::IndexMap;
use itertools::Itertools;
use std::borrow::Cow;
use std::fmt::{Debug, Display};

/// Represents a stored document.
///
/// A document is an insertion-ordered mapping from string keys to [Value]s.
/// The writer fills documents in descriptor order, so the key order of a
/// written document follows the entity's property order.
///
/// Values placed in a document are expected to be document shapes: scalars,
/// [crate::document::ObjectId], nested documents, [Value::Array] and
/// [Value::List]. `put` does not police this; the writer never produces
/// anything else.
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`, replacing and keeping the position of
    /// any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InternalError] if the key is empty.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice")?;
    /// doc.put("age", 30)?;
    /// assert_eq!(doc.size(), 2);
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> MapperResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(MapperError::new(
                "Document does not support empty key",
                ErrorKind::InternalError,
            ));
        }

        self.data.insert(key.into_owned(), value.into());
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes `key` and returns its value, keeping the order of the
    /// remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Merges `other` into this document. Nested documents present on both
    /// sides are merged recursively, any other value from `other` wins.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (self.data.get_mut(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    existing.merge(incoming);
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    #[doc(hidden)]
    pub fn insert_entry(&mut self, key: String, value: Value) {
        self.data.insert(key, value);
    }

    fn to_debug_string(&self) -> String {
        format!(
            "{{{}}}",
            self.data
                .iter()
                .map(|(key, value)| format!("\"{}\": {:?}", key, value))
                .join(", ")
        )
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(key, value)| format!("\"{}\": {}", key, value))
                .join(", ")
        )
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in &self.data {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust,ignore
/// use docmap::doc;
///
/// let person = doc! {
///     name: "Alice",
///     "age": 30,
///     address: { city: "Paris", zip: ["75001", "75002"] },
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::document::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::document::Document::new();
            $(
                doc.insert_entry($crate::document::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Converts one value position of the [doc!] macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
