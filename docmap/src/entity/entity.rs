use crate::common::{TypeRef, Value};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};

/// A typed application record the mapper can read from and write to.
///
/// The mapper never touches struct fields directly; it goes through
/// `property` and `set_property` by property name. `#[derive(Entity)]` from
/// `docmap_derive` generates this, but a hand-written implementation is
/// equally valid:
///
/// ```rust,ignore
/// #[derive(Clone, Default)]
/// struct Tag { label: String }
///
/// impl Entity for Tag {
///     fn entity_type(&self) -> EntityType { EntityType::of::<Tag>() }
///
///     fn property(&self, name: &str) -> MapperResult<Value> {
///         match name {
///             "label" => self.label.to_value(),
///             _ => unknown_property(self, name),
///         }
///     }
///
///     fn set_property(&mut self, name: &str, value: Value) -> MapperResult<()> {
///         match name {
///             "label" => self.label = String::from_value(&value)?,
///             _ => return unknown_property(self, name),
///         }
///         Ok(())
///     }
///
///     fn clone_entity(&self) -> Box<dyn Entity> { Box::new(self.clone()) }
///     fn as_any(&self) -> &dyn Any { self }
///     fn into_any(self: Box<Self>) -> Box<dyn Any> { self }
/// }
/// ```
pub trait Entity: Any + Send + Sync {
    fn entity_type(&self) -> EntityType;

    /// Returns the current value of a property, [Value::Null] when unset.
    fn property(&self, name: &str) -> MapperResult<Value>;

    fn set_property(&mut self, name: &str, value: Value) -> MapperResult<()>;

    fn clone_entity(&self) -> Box<dyn Entity>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// An entity type that describes its own properties and can be created
/// with its default value.
pub trait MappedEntity: Entity + Clone + Default {
    fn entity_model() -> EntityModel;
}

/// Error for a property name the entity does not declare.
pub fn unknown_property<T>(entity: &dyn Entity, name: &str) -> MapperResult<T> {
    let entity_type = entity.entity_type();
    log::error!("{} has no property named {}", entity_type.simple_name(), name);
    Err(MapperError::new(
        &format!("{} has no property named {}", entity_type.simple_name(), name),
        ErrorKind::ObjectMappingError,
    ))
}

/// Converts a boxed entity back to its concrete type.
pub fn downcast_entity<T: Entity>(entity: Box<dyn Entity>) -> MapperResult<T> {
    let actual = entity.entity_type();
    match entity.into_any().downcast::<T>() {
        Ok(entity) => Ok(*entity),
        Err(_) => {
            log::error!(
                "Entity of type {} is not a {}",
                actual.simple_name(),
                std::any::type_name::<T>()
            );
            Err(MapperError::new(
                &format!(
                    "Entity of type {} is not a {}",
                    actual.simple_name(),
                    std::any::type_name::<T>()
                ),
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}

/// Wraps an entity field value for the writer.
pub fn entity_to_value<T: MappedEntity>(entity: &T) -> Value {
    Value::Entity(Box::new(entity.clone()))
}

/// Recovers a typed entity from the value the reader assigns.
pub fn entity_from_value<T: MappedEntity>(value: &Value) -> MapperResult<T> {
    match value.as_entity().and_then(|entity| entity.as_any().downcast_ref::<T>()) {
        Some(entity) => Ok(entity.clone()),
        None => crate::common::mapping_error(value, std::any::type_name::<T>()),
    }
}

impl Clone for Box<dyn Entity> {
    fn clone(&self) -> Self {
        self.clone_entity()
    }
}

impl PartialEq for dyn Entity {
    fn eq(&self, other: &Self) -> bool {
        let entity_type = self.entity_type();
        if entity_type != other.entity_type() {
            return false;
        }

        let model = entity_type.model();
        model.properties().iter().filter(|property| !property.is_transient()).all(|property| {
            match (self.property(property.name()), other.property(property.name())) {
                (Ok(left), Ok(right)) => left == right,
                _ => false,
            }
        })
    }
}

impl Debug for dyn Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entity_type = self.entity_type();
        let mut debug = f.debug_struct(&entity_type.simple_name());
        for property in entity_type.model().properties().iter().filter(|p| !p.is_transient()) {
            match self.property(property.name()) {
                Ok(value) => debug.field(property.name(), &value),
                Err(_) => debug.field(property.name(), &"<unreadable>"),
            };
        }
        debug.finish()
    }
}

fn default_instance<T: MappedEntity>() -> Box<dyn Entity> {
    Box::new(T::default())
}

/// Handle to an entity type: its identity, its model and, when the type can
/// be created from nothing, its construction capability.
///
/// `EntityType` is `Copy` and compares by the Rust type it stands for.
#[derive(Clone, Copy)]
pub struct EntityType {
    type_id: TypeId,
    name: &'static str,
    model: fn() -> EntityModel,
    factory: Option<fn() -> Box<dyn Entity>>,
}

impl EntityType {
    pub fn of<T: MappedEntity>() -> Self {
        EntityType {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            model: T::entity_model,
            factory: Some(default_instance::<T>),
        }
    }

    /// An entity type the reader cannot instantiate.
    pub fn without_constructor<T: Entity>(model: fn() -> EntityModel) -> Self {
        EntityType {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            model,
            factory: None,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified Rust type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path, generic arguments kept.
    pub fn simple_name(&self) -> String {
        let (path, generics) = match self.name.find('<') {
            Some(index) => self.name.split_at(index),
            None => (self.name, ""),
        };
        let base = path.rsplit("::").next().unwrap_or(path);
        format!("{}{}", base, generics)
    }

    pub fn model(&self) -> EntityModel {
        (self.model)()
    }

    pub fn can_instantiate(&self) -> bool {
        self.factory.is_some()
    }

    /// Creates a default instance of the type.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InstantiationError] if the type has no construction
    /// capability.
    pub fn instantiate(&self) -> MapperResult<Box<dyn Entity>> {
        match self.factory {
            Some(factory) => Ok(factory()),
            None => {
                log::error!("Cannot instantiate entity {}", self.simple_name());
                Err(MapperError::new(
                    &format!("Cannot instantiate entity {}, no constructor available", self.simple_name()),
                    ErrorKind::InstantiationError,
                ))
            }
        }
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

/// The ordered property list of an entity type, as supplied by its
/// metadata source.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityModel {
    name: String,
    properties: Vec<PropertyModel>,
}

impl EntityModel {
    pub fn new(name: &str) -> Self {
        EntityModel {
            name: name.to_string(),
            properties: Vec::new(),
        }
    }

    pub fn property(mut self, property: PropertyModel) -> Self {
        self.properties.push(property);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[PropertyModel] {
        &self.properties
    }
}

/// One declared property with the overrides its metadata source supplies.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyModel {
    name: String,
    type_ref: TypeRef,
    key: Option<String>,
    id: bool,
    transient: bool,
}

impl PropertyModel {
    pub fn new(name: &str, type_ref: TypeRef) -> Self {
        PropertyModel {
            name: name.to_string(),
            type_ref,
            key: None,
            id: false,
            transient: false,
        }
    }

    /// Stores the property under `key` instead of its name.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Designates the property as the identifier.
    pub fn as_id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Excludes the property from mapping.
    pub fn as_transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn key_override(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_id(&self) -> bool {
        self.id
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}
