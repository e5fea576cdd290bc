use crate::common::TypeRef;
use crate::entity::{EntityModel, EntityType, PropertyModel};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper_config::MapperConfig;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

/// Name of the meta-property every entity exposes in
/// [AccessMode::Property] mode. It is never mapped.
pub const CLASS_PROPERTY: &str = "class";

/// How the properties of an entity are enumerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Declared fields only. Used by the reader.
    Field,
    /// Declared fields plus the synthetic [CLASS_PROPERTY]. Used by the
    /// writer.
    Property,
}

/// Resolved mapping metadata of one entity property.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    key: String,
    type_ref: TypeRef,
    identifier: bool,
    mappable: bool,
    synthetic: bool,
}

impl EntityDescriptor {
    fn synthetic_class() -> Self {
        EntityDescriptor {
            name: CLASS_PROPERTY.to_string(),
            key: CLASS_PROPERTY.to_string(),
            type_ref: TypeRef::TypeName,
            identifier: false,
            mappable: false,
            synthetic: true,
        }
    }

    /// Property name on the entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document key the property is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared type of the property.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Element type of an array, list or set property.
    pub fn element_type(&self) -> Option<&TypeRef> {
        self.type_ref.element_type()
    }

    /// Key type of a map property.
    pub fn map_key_type(&self) -> Option<&TypeRef> {
        self.type_ref.map_types().map(|(key, _)| key)
    }

    /// Value type of a map property.
    pub fn map_value_type(&self) -> Option<&TypeRef> {
        self.type_ref.map_types().map(|(_, value)| value)
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    pub fn is_enum(&self) -> bool {
        self.type_ref.is_enum()
    }

    /// List- or set-like property. Arrays are not collections.
    pub fn is_collection(&self) -> bool {
        self.type_ref.is_collection()
    }

    pub fn is_map(&self) -> bool {
        self.type_ref.is_map()
    }

    pub fn is_array(&self) -> bool {
        self.type_ref.is_array()
    }

    pub fn is_entity(&self) -> bool {
        self.type_ref.is_entity()
    }

    pub fn is_mappable(&self) -> bool {
        self.mappable
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Whether the declared type can hold an object id: text, object id or
    /// big integer.
    pub fn is_of_id_type(&self) -> bool {
        self.type_ref.is_id_type()
    }
}

/// Resolves and caches the descriptors of entity types.
///
/// Descriptors are computed on first use per `(entity type, access mode)`
/// and kept for the lifetime of the resolver. Failed resolutions are not
/// cached.
pub struct DescriptorResolver {
    config: MapperConfig,
    cache: DashMap<(TypeId, AccessMode), Arc<[EntityDescriptor]>>,
}

impl DescriptorResolver {
    pub fn new(config: MapperConfig) -> Self {
        DescriptorResolver {
            config,
            cache: DashMap::new(),
        }
    }

    /// Returns the ordered descriptors of `entity_type`.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::ConfigurationError] if a property type contains an
    ///   unbound type variable, more than one property is an identifier,
    ///   a document key is empty or two mappable properties share a key.
    /// * [ErrorKind::UnsupportedShape] if a map property has a key type
    ///   other than text.
    pub fn describe(&self, entity_type: &EntityType, mode: AccessMode) -> MapperResult<Arc<[EntityDescriptor]>> {
        let cache_key = (entity_type.type_id(), mode);
        if let Some(descriptors) = self.cache.get(&cache_key) {
            return Ok(descriptors.value().clone());
        }

        let descriptors: Arc<[EntityDescriptor]> = self.resolve(entity_type, mode)?.into();
        let descriptors = self
            .cache
            .entry(cache_key)
            .or_insert(descriptors)
            .value()
            .clone();
        Ok(descriptors)
    }

    /// Returns the identifier descriptor of `entity_type`, if it has one.
    pub fn identifier(&self, entity_type: &EntityType) -> MapperResult<Option<EntityDescriptor>> {
        let descriptors = self.describe(entity_type, AccessMode::Field)?;
        Ok(descriptors.iter().find(|descriptor| descriptor.is_identifier()).cloned())
    }

    /// Number of cached descriptor sets.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn resolve(&self, entity_type: &EntityType, mode: AccessMode) -> MapperResult<Vec<EntityDescriptor>> {
        let model = entity_type.model();
        let identifier = self.find_identifier(&model)?;

        let mut descriptors = Vec::with_capacity(model.properties().len() + 1);
        let mut keys = HashSet::new();
        for property in model.properties() {
            let is_identifier = identifier == Some(property.name());
            let descriptor = self.resolve_property(&model, property, is_identifier)?;

            if descriptor.is_mappable() && !keys.insert(descriptor.key().to_string()) {
                log::error!(
                    "Entity {} maps more than one property to key {}",
                    model.name(),
                    descriptor.key()
                );
                return Err(MapperError::new(
                    &format!(
                        "Entity {} maps more than one property to key {}",
                        model.name(),
                        descriptor.key()
                    ),
                    ErrorKind::ConfigurationError,
                ));
            }
            descriptors.push(descriptor);
        }

        if mode == AccessMode::Property
            && !model.properties().iter().any(|property| property.name() == CLASS_PROPERTY)
        {
            descriptors.push(EntityDescriptor::synthetic_class());
        }

        Ok(descriptors)
    }

    fn find_identifier<'a>(&self, model: &'a EntityModel) -> MapperResult<Option<&'a str>> {
        let explicit: Vec<&PropertyModel> = model.properties().iter().filter(|p| p.is_id()).collect();
        let candidates = if explicit.is_empty() {
            model
                .properties()
                .iter()
                .filter(|p| !p.is_transient() && self.config.is_id_property_name(p.name()))
                .collect()
        } else {
            explicit
        };

        match candidates.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(single.name())),
            [first, second, ..] => {
                log::error!(
                    "Entity {} declares more than one identifier: {} and {}",
                    model.name(),
                    first.name(),
                    second.name()
                );
                Err(MapperError::new(
                    &format!(
                        "Entity {} declares more than one identifier: {} and {}",
                        model.name(),
                        first.name(),
                        second.name()
                    ),
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    fn resolve_property(
        &self,
        model: &EntityModel,
        property: &PropertyModel,
        identifier: bool,
    ) -> MapperResult<EntityDescriptor> {
        let type_ref = property.type_ref();

        if let Some(variable) = type_ref.unbound_variable() {
            log::error!(
                "Cannot resolve type variable {} of property {}.{}",
                variable,
                model.name(),
                property.name()
            );
            return Err(MapperError::new(
                &format!(
                    "Cannot resolve type variable {} of property {}.{} to a concrete type",
                    variable,
                    model.name(),
                    property.name()
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        if let Some((key_type, _)) = type_ref.map_types() {
            if !matches!(key_type, TypeRef::String | TypeRef::Any) {
                log::error!(
                    "Map property {}.{} has {} keys, only text keys are supported",
                    model.name(),
                    property.name(),
                    key_type
                );
                return Err(MapperError::new(
                    &format!(
                        "Map property {}.{} has {} keys, only text keys are supported",
                        model.name(),
                        property.name(),
                        key_type
                    ),
                    ErrorKind::UnsupportedShape,
                ));
            }
        }

        let key = match property.key_override() {
            Some(key) => key.to_string(),
            None if identifier => self.config.id_key().to_string(),
            None => property.name().to_string(),
        };

        if key.is_empty() {
            log::error!("Property {}.{} has an empty document key", model.name(), property.name());
            return Err(MapperError::new(
                &format!("Property {}.{} has an empty document key", model.name(), property.name()),
                ErrorKind::ConfigurationError,
            ));
        }

        Ok(EntityDescriptor {
            name: property.name().to_string(),
            key,
            type_ref: type_ref.clone(),
            identifier,
            mappable: !property.is_transient(),
            synthetic: false,
        })
    }
}
