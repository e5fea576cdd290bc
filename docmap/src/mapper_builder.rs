use crate::common::{TypeRef, Value};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::{ConversionFn, ConversionRegistry, DocumentMapper};
use crate::mapper_config::{MapperConfig, DEFAULT_ID_KEY, DEFAULT_ID_PROPERTY_NAMES};
use std::sync::Arc;

/// Builds a [DocumentMapper].
///
/// Builder methods never fail on their own; the first invalid setting is
/// kept and returned by [MapperBuilder::build].
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::MapperBuilder;
/// use docmap::common::{CustomType, TypeRef, Value};
///
/// let mapper = MapperBuilder::new()
///     .register_converter(TypeRef::Custom(CustomType::of::<Money>()), TypeRef::String, |value| {
///         // ...
///     })
///     .build()?;
/// ```
pub struct MapperBuilder {
    error: Option<MapperError>,
    id_key: String,
    id_property_names: Vec<String>,
    standard_conversions: bool,
    converters: Vec<(TypeRef, TypeRef, ConversionFn)>,
}

impl Default for MapperBuilder {
    fn default() -> Self {
        MapperBuilder::new()
    }
}

impl MapperBuilder {
    pub fn new() -> Self {
        MapperBuilder {
            error: None,
            id_key: DEFAULT_ID_KEY.to_string(),
            id_property_names: DEFAULT_ID_PROPERTY_NAMES.iter().map(|name| name.to_string()).collect(),
            standard_conversions: true,
            converters: Vec::new(),
        }
    }

    /// Document key identifier properties are written under.
    pub fn id_key(mut self, id_key: &str) -> Self {
        self.id_key = id_key.to_string();
        self
    }

    /// Property names recognised as the identifier by convention.
    pub fn id_property_names(mut self, names: &[&str]) -> Self {
        self.id_property_names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Enables or disables the numeric, text and char conversion rules.
    pub fn standard_conversions(mut self, enabled: bool) -> Self {
        self.standard_conversions = enabled;
        self
    }

    /// Registers a conversion rule. Rules registered here take precedence
    /// over built-in rules for the same pair.
    pub fn register_converter<F>(mut self, source: TypeRef, target: TypeRef, rule: F) -> Self
    where
        F: Fn(&Value) -> MapperResult<Value> + Send + Sync + 'static,
    {
        if self.error.is_none() {
            if let Some(variable) = source.unbound_variable().or_else(|| target.unbound_variable()) {
                log::error!("Cannot register a converter for unbound type variable {}", variable);
                self.error = Some(MapperError::new(
                    &format!("Cannot register a converter for unbound type variable {}", variable),
                    ErrorKind::ConfigurationError,
                ));
            } else if source.is_any() || target.is_any() {
                log::error!("Cannot register a converter from or to any type");
                self.error = Some(MapperError::new(
                    "Cannot register a converter from or to any type",
                    ErrorKind::ConfigurationError,
                ));
            } else {
                self.converters.push((source, target, Arc::new(rule)));
            }
        }
        self
    }

    /// Creates the mapper.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error recorded by the builder.
    pub fn build(self) -> MapperResult<DocumentMapper> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let config = MapperConfig::new(self.id_key, self.id_property_names, self.standard_conversions)?;

        let mut registry = ConversionRegistry::new();
        if config.standard_conversions() {
            registry.register_standard_rules();
        }
        for (source, target, rule) in self.converters {
            registry.register(source, target, move |value| rule(value));
        }

        Ok(DocumentMapper::new(config, registry))
    }
}
