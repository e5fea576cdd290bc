//! Configuration of a document mapper.

use crate::errors::{ErrorKind, MapperError, MapperResult};
use std::sync::Arc;

/// Document key an identifier property is stored under by default.
pub const DEFAULT_ID_KEY: &str = "_id";

/// Property names recognised as the identifier when no property is
/// designated explicitly.
pub const DEFAULT_ID_PROPERTY_NAMES: [&str; 2] = ["id", "_id"];

/// Settings shared by every part of one [crate::mapper::DocumentMapper].
///
/// A `MapperConfig` is immutable and cheap to clone. Build one through
/// [crate::MapperBuilder], or use [MapperConfig::default].
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::MapperBuilder;
///
/// let mapper = MapperBuilder::new()
///     .id_key("_key")
///     .standard_conversions(false)
///     .build()?;
/// assert_eq!(mapper.config().id_key(), "_key");
/// ```
#[derive(Clone)]
pub struct MapperConfig {
    inner: Arc<MapperConfigInner>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            inner: Arc::new(MapperConfigInner {
                id_key: DEFAULT_ID_KEY.to_string(),
                id_property_names: DEFAULT_ID_PROPERTY_NAMES.iter().map(|name| name.to_string()).collect(),
                standard_conversions: true,
            }),
        }
    }
}

impl MapperConfig {
    pub(crate) fn new(
        id_key: String,
        id_property_names: Vec<String>,
        standard_conversions: bool,
    ) -> MapperResult<Self> {
        if id_key.is_empty() {
            log::error!("Identifier key cannot be empty");
            return Err(MapperError::new(
                "Identifier key cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        if id_property_names.iter().any(String::is_empty) {
            log::error!("Identifier property names cannot be empty");
            return Err(MapperError::new(
                "Identifier property names cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        Ok(MapperConfig {
            inner: Arc::new(MapperConfigInner {
                id_key,
                id_property_names,
                standard_conversions,
            }),
        })
    }

    /// Returns the document key identifier properties are written under.
    pub fn id_key(&self) -> &str {
        &self.inner.id_key
    }

    /// Returns the property names treated as the identifier by convention.
    pub fn id_property_names(&self) -> &[String] {
        &self.inner.id_property_names
    }

    pub fn is_id_property_name(&self, name: &str) -> bool {
        self.inner.id_property_names.iter().any(|candidate| candidate == name)
    }

    /// Whether the numeric, text and char conversion rules are registered.
    pub fn standard_conversions(&self) -> bool {
        self.inner.standard_conversions
    }
}

impl std::fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperConfig")
            .field("id_key", &self.inner.id_key)
            .field("id_property_names", &self.inner.id_property_names)
            .field("standard_conversions", &self.inner.standard_conversions)
            .finish()
    }
}

struct MapperConfigInner {
    id_key: String,
    id_property_names: Vec<String>,
    standard_conversions: bool,
}
