use crate::common::{TypeRef, Value};
use crate::entity::{Entity, EntityType};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::{DescriptorResolver, EntityDescriptor};

/// Identifier metadata of an entity type that has one.
///
/// # Examples
///
/// ```rust,ignore
/// let info = mapper.entity_information(&EntityType::of::<Person>())?;
/// assert_eq!(info.id_key(), "_id");
/// assert!(info.is_new(&Person::default())?);
/// ```
#[derive(Clone, Debug)]
pub struct EntityInformation {
    entity_type: EntityType,
    entity_name: String,
    id_descriptor: EntityDescriptor,
}

impl EntityInformation {
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if the type has no identifier
    /// property, or its descriptors cannot be resolved.
    pub fn new(entity_type: &EntityType, resolver: &DescriptorResolver) -> MapperResult<Self> {
        let entity_name = entity_type.model().name().to_string();
        match resolver.identifier(entity_type)? {
            Some(id_descriptor) => Ok(EntityInformation {
                entity_type: *entity_type,
                entity_name,
                id_descriptor,
            }),
            None => {
                log::error!("No identifier property found for entity {}", entity_name);
                Err(MapperError::new(
                    &format!("No identifier property found for entity {}", entity_name),
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Name the entity model declares for the type.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Name of the identifier property.
    pub fn id_property(&self) -> &str {
        self.id_descriptor.name()
    }

    /// Document key the identifier is stored under.
    pub fn id_key(&self) -> &str {
        self.id_descriptor.key()
    }

    /// Declared type of the identifier property.
    pub fn id_type(&self) -> &TypeRef {
        self.id_descriptor.type_ref()
    }

    /// Reads the identifier value of `entity`.
    pub fn id(&self, entity: &dyn Entity) -> MapperResult<Value> {
        let actual = entity.entity_type();
        if actual != self.entity_type {
            log::error!(
                "Entity {} is not a {}",
                actual.simple_name(),
                self.entity_type.simple_name()
            );
            return Err(MapperError::new(
                &format!(
                    "Entity {} is not a {}",
                    actual.simple_name(),
                    self.entity_type.simple_name()
                ),
                ErrorKind::ObjectMappingError,
            ));
        }
        entity.property(self.id_property())
    }

    /// An entity is new while its identifier is unset.
    pub fn is_new(&self, entity: &dyn Entity) -> MapperResult<bool> {
        Ok(self.id(entity)?.is_null())
    }
}
