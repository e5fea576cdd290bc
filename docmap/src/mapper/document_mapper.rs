use crate::common::{TypeRef, Value};
use crate::document::{Document, ObjectId};
use crate::entity::{downcast_entity, Entity, EntityInformation, EntityType, MappedEntity};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::descriptor::{AccessMode, DescriptorResolver, EntityDescriptor};
use crate::mapper::reader::EntityReader;
use crate::mapper::registry::ConversionRegistry;
use crate::mapper::writer::EntityWriter;
use crate::mapper_config::MapperConfig;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Writes entities into documents.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, entity: &dyn Entity, document: &mut Document) -> MapperResult<()>;
}

/// Reads documents into entities.
pub trait DocumentReader: Send + Sync {
    fn read(&self, entity_type: &EntityType, document: Option<&Document>) -> MapperResult<Option<Box<dyn Entity>>>;
}

/// Converts between entities and documents.
///
/// A `DocumentMapper` owns a frozen [ConversionRegistry] and the descriptor
/// cache. It is cheap to clone and safe to share between threads; clones
/// share the cache.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::MapperBuilder;
///
/// let mapper = MapperBuilder::new().build()?;
/// let document = mapper.to_document(&person)?;
/// let copy: Option<Person> = mapper.read_as(Some(&document))?;
/// ```
#[derive(Clone)]
pub struct DocumentMapper {
    inner: Arc<DocumentMapperInner>,
}

impl DocumentMapper {
    pub(crate) fn new(config: MapperConfig, registry: ConversionRegistry) -> Self {
        DocumentMapper {
            inner: Arc::new(DocumentMapperInner::new(config, registry)),
        }
    }

    /// Writes `entity` into a new document.
    pub fn to_document(&self, entity: &dyn Entity) -> MapperResult<Document> {
        let mut document = Document::new();
        self.inner.writer().write(entity, &mut document)?;
        Ok(document)
    }

    /// Reads `document` into a `T`.
    pub fn read_as<T: MappedEntity>(&self, document: Option<&Document>) -> MapperResult<Option<T>> {
        match self.inner.reader().read(&EntityType::of::<T>(), document)? {
            Some(entity) => downcast_entity::<T>(entity).map(Some),
            None => Ok(None),
        }
    }

    /// Converts an object id into `target`, e.g. its text or big integer
    /// form.
    pub fn convert_object_id(&self, id: &ObjectId, target: &TypeRef) -> MapperResult<Value> {
        self.inner.registry.convert(&Value::ObjectId(*id), target)
    }

    /// Converts an identifier value into an object id.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConversionError] if the value cannot be converted,
    /// [ErrorKind::InvalidId] if it is null.
    pub fn to_object_id(&self, value: &Value) -> MapperResult<ObjectId> {
        match self.inner.registry.convert(value, &TypeRef::ObjectId)? {
            Value::ObjectId(id) => Ok(id),
            other => {
                log::error!("{} cannot be used as an object id", other);
                Err(MapperError::new(
                    &format!("{} cannot be used as an object id", other),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }

    pub fn describe(&self, entity_type: &EntityType, mode: AccessMode) -> MapperResult<Arc<[EntityDescriptor]>> {
        self.inner.resolver.describe(entity_type, mode)
    }

    pub fn entity_information(&self, entity_type: &EntityType) -> MapperResult<EntityInformation> {
        EntityInformation::new(entity_type, &self.inner.resolver)
    }

    pub fn registry(&self) -> &ConversionRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.inner.config
    }
}

impl Debug for DocumentMapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMapper")
            .field("config", &self.inner.config)
            .field("cached_descriptors", &self.inner.resolver.cached())
            .finish()
    }
}

impl DocumentWriter for DocumentMapper {
    fn write(&self, entity: &dyn Entity, document: &mut Document) -> MapperResult<()> {
        self.inner.writer().write(entity, document)
    }
}

impl DocumentReader for DocumentMapper {
    fn read(&self, entity_type: &EntityType, document: Option<&Document>) -> MapperResult<Option<Box<dyn Entity>>> {
        self.inner.reader().read(entity_type, document)
    }
}

struct DocumentMapperInner {
    config: MapperConfig,
    registry: ConversionRegistry,
    resolver: DescriptorResolver,
}

impl DocumentMapperInner {
    fn new(config: MapperConfig, registry: ConversionRegistry) -> Self {
        DocumentMapperInner {
            resolver: DescriptorResolver::new(config.clone()),
            config,
            registry,
        }
    }

    fn writer(&self) -> EntityWriter<'_> {
        EntityWriter::new(&self.registry, &self.resolver)
    }

    fn reader(&self) -> EntityReader<'_> {
        EntityReader::new(&self.registry, &self.resolver)
    }
}
