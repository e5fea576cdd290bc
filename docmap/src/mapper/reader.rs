use crate::common::{TypeRef, Value};
use crate::document::Document;
use crate::entity::{Entity, EntityType};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::descriptor::{AccessMode, DescriptorResolver};
use crate::mapper::registry::ConversionRegistry;
use crate::mapper::simple_types::is_simple_value;

/// Reads documents back into entities.
///
/// The target type of every nested entity comes from the declared property
/// type, never from the document. A field whose stored shape does not fit
/// its declaration is logged as a structural mismatch and the property
/// keeps its default value; the rest of the document is still read.
pub struct EntityReader<'a> {
    registry: &'a ConversionRegistry,
    resolver: &'a DescriptorResolver,
}

impl<'a> EntityReader<'a> {
    pub fn new(registry: &'a ConversionRegistry, resolver: &'a DescriptorResolver) -> Self {
        EntityReader { registry, resolver }
    }

    /// Reads `document` into a new instance of `entity_type`. A missing
    /// document yields `None`.
    pub fn read(
        &self,
        entity_type: &EntityType,
        document: Option<&Document>,
    ) -> MapperResult<Option<Box<dyn Entity>>> {
        match document {
            Some(document) => self.read_entity(entity_type, document).map(Some),
            None => Ok(None),
        }
    }

    fn read_entity(&self, entity_type: &EntityType, document: &Document) -> MapperResult<Box<dyn Entity>> {
        let mut entity = entity_type.instantiate()?;
        let descriptors = self.resolver.describe(entity_type, AccessMode::Field)?;

        for descriptor in descriptors.iter() {
            let stored = match document.get(descriptor.key()) {
                Some(stored) => stored,
                None => continue,
            };

            let path = format!("{}.{}", entity_type.simple_name(), descriptor.name());
            if !descriptor.is_mappable() {
                log::warn!("Property {} is not mappable, ignoring stored value", path);
                continue;
            }

            if stored.is_null() {
                continue;
            }

            if let Some(value) = self.read_value(descriptor.type_ref(), stored, &path)? {
                entity.set_property(descriptor.name(), value)?;
            }
        }
        Ok(entity)
    }

    /// Reads one stored value into `declared`. `None` means the value did
    /// not fit and was skipped.
    fn read_value(&self, declared: &TypeRef, stored: &Value, path: &str) -> MapperResult<Option<Value>> {
        if is_simple_value(stored) {
            return self.read_simple(declared, stored, path);
        }

        match stored {
            Value::Array(items) | Value::List(items) => self.read_sequence(declared, stored, items, path),
            Value::Document(document) => {
                if declared.is_collection() {
                    log::error!("{} is declared as {} but holds a nested document", path, declared);
                    return Err(MapperError::new(
                        &format!("{} is declared as {} but holds a nested document", path, declared),
                        ErrorKind::UnsupportedShape,
                    ));
                }
                self.read_document(declared, document, path)
            }
            _ => Ok(mismatch(path, declared, stored)),
        }
    }

    fn read_simple(&self, declared: &TypeRef, stored: &Value, path: &str) -> MapperResult<Option<Value>> {
        if !self.registry.can_convert(&stored.type_ref(), declared) {
            return Ok(mismatch(path, declared, stored));
        }
        self.registry.convert(stored, declared).map(Some)
    }

    fn read_sequence(
        &self,
        declared: &TypeRef,
        stored: &Value,
        items: &[Value],
        path: &str,
    ) -> MapperResult<Option<Value>> {
        if !declared.is_sequence() && !declared.is_any() {
            return Ok(mismatch(path, declared, stored));
        }

        let element_type = declared.element_type().unwrap_or(&TypeRef::Any);
        let mut elements = Vec::with_capacity(items.len());
        // one element that does not fit skips the whole property
        for (index, item) in items.iter().enumerate() {
            let element = match item {
                Value::Document(document) => {
                    let element_path = format!("{}[{}]", path, index);
                    match self.read_document(element_type, document, &element_path)? {
                        Some(element) => element,
                        None => return Ok(mismatch(path, declared, stored)),
                    }
                }
                Value::Null => Value::Null,
                item => {
                    if !self.registry.can_convert(&item.type_ref(), element_type) {
                        let element_path = format!("{}[{}]", path, index);
                        mismatch(&element_path, element_type, item);
                        return Ok(mismatch(path, declared, stored));
                    }
                    item.clone()
                }
            };
            elements.push(element);
        }

        let collected = match stored {
            Value::Array(_) => Value::Array(elements),
            _ => Value::List(elements),
        };
        self.read_simple(declared, &collected, path)
    }

    fn read_document(&self, declared: &TypeRef, document: &Document, path: &str) -> MapperResult<Option<Value>> {
        match declared {
            TypeRef::Entity(entity_type) => self.read_entity(entity_type, document).map(|entity| Some(Value::Entity(entity))),
            TypeRef::Map(_, value_type) => self.read_map(value_type, document, path).map(Some),
            TypeRef::Any | TypeRef::Document => Ok(Some(Value::Document(document.clone()))),
            _ => {
                let stored = Value::Document(document.clone());
                self.read_simple(declared, &stored, path)
            }
        }
    }

    fn read_map(&self, value_type: &TypeRef, document: &Document, path: &str) -> MapperResult<Value> {
        let mut entries = Vec::with_capacity(document.size());
        for (key, stored) in document.iter() {
            if stored.is_null() {
                continue;
            }

            let entry_path = format!("{}[{}]", path, key);
            if let Some(value) = self.read_value(value_type, stored, &entry_path)? {
                entries.push((Value::from(key), value));
            }
        }
        Ok(Value::Map(entries))
    }
}

fn mismatch(path: &str, declared: &TypeRef, stored: &Value) -> Option<Value> {
    let err = MapperError::new(
        &format!(
            "{} is declared as {} but the document holds {}",
            path,
            declared,
            stored.type_ref()
        ),
        ErrorKind::StructuralMismatch,
    );
    log::warn!("{}, leaving the default value", err);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::document::ObjectId;
    use crate::entity::downcast_entity;
    use crate::mapper::fixtures::*;
    use crate::mapper_config::MapperConfig;

    struct Harness {
        registry: ConversionRegistry,
        resolver: DescriptorResolver,
    }

    impl Harness {
        fn new() -> Self {
            init_logger();
            let mut registry = ConversionRegistry::new();
            registry.register_standard_rules();
            Harness {
                registry,
                resolver: DescriptorResolver::new(MapperConfig::default()),
            }
        }

        fn read<T: Entity>(&self, entity_type: EntityType, document: &Document) -> MapperResult<T> {
            let reader = EntityReader::new(&self.registry, &self.resolver);
            let entity = reader.read(&entity_type, Some(document))?;
            downcast_entity::<T>(entity.unwrap())
        }
    }

    #[test]
    fn missing_document_reads_as_none() {
        let harness = Harness::new();
        let reader = EntityReader::new(&harness.registry, &harness.resolver);
        assert!(reader.read(&EntityType::of::<Person>(), None).unwrap().is_none());
    }

    #[test]
    fn simple_fields_and_missing_keys() {
        let harness = Harness::new();
        let person: Person = harness
            .read(EntityType::of::<Person>(), &doc! { "_id": "k1", name: "Ann" })
            .unwrap();

        assert_eq!(person.id.as_deref(), Some("k1"));
        assert_eq!(person.name, "Ann");
        assert_eq!(person.age, 0);
        assert!(person.address.is_none());
    }

    #[test]
    fn object_id_is_read_into_text_identifier() {
        let harness = Harness::new();
        let id = ObjectId::parse_str("4d9d7f4a3f9f4b2a8c000001").unwrap();
        let person: Person = harness
            .read(EntityType::of::<Person>(), &doc! { "_id": id })
            .unwrap();
        assert_eq!(person.id.as_deref(), Some("4d9d7f4a3f9f4b2a8c000001"));
    }

    #[test]
    fn stored_values_are_converted_to_declared_types() {
        let harness = Harness::new();
        let person: Person = harness
            .read(EntityType::of::<Person>(), &doc! { age: (42i64) })
            .unwrap();
        assert_eq!(person.age, 42);
    }

    #[test]
    fn rejecting_conversion_propagates() {
        let harness = Harness::new();
        let err = harness
            .read::<Person>(EntityType::of::<Person>(), &doc! { age: "forty" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConversionError);
    }

    #[test]
    fn nested_entity_is_read_from_declaration() {
        let harness = Harness::new();
        let person: Person = harness
            .read(
                EntityType::of::<Person>(),
                &doc! { name: "Bo", address: { street: "Main", city: "Oslo", zip: 1234 } },
            )
            .unwrap();

        let address = person.address.unwrap();
        assert_eq!(address.street, "Main");
        assert_eq!(address.zip, Some(1234));
    }

    #[test]
    fn scalar_where_document_expected_is_skipped() {
        let harness = Harness::new();
        let person: Person = harness
            .read(
                EntityType::of::<Person>(),
                &doc! { address: "not a document", name: "Cy", age: 7 },
            )
            .unwrap();

        assert!(person.address.is_none());
        assert_eq!(person.name, "Cy");
        assert_eq!(person.age, 7);
    }

    #[test]
    fn sequences_maps_and_enums() {
        let harness = Harness::new();
        let document = doc! {
            tags: ["a", "b"],
            scores: [1, 2, 3],
            labels: { x: 1, y: 2 },
            shade: "Dark",
            shades: ["Light", "Dark"],
            members: [{ street: "S1" }, { street: "S2" }],
            branches: { north: { city: "Tromso" } },
        };
        let catalog: Catalog = harness.read(EntityType::of::<Catalog>(), &document).unwrap();

        assert_eq!(catalog.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(&*catalog.scores, &[1, 2, 3]);
        assert_eq!(catalog.labels.get("x"), Some(&1));
        assert_eq!(catalog.labels.get("y"), Some(&2));
        assert_eq!(catalog.shade, Some(Shade::Dark));
        assert_eq!(&*catalog.shades, &[Shade::Light, Shade::Dark]);
        assert_eq!(catalog.members.len(), 2);
        assert_eq!(catalog.members[1].street, "S2");
        assert_eq!(catalog.branches.get("north").map(|a| a.city.as_str()), Some("Tromso"));
    }

    #[test]
    fn generic_list_shape_is_accepted() {
        let harness = Harness::new();
        let mut document = Document::new();
        document
            .put(
                "members",
                Value::List(vec![Value::Document(doc! { city: "Bergen" })]),
            )
            .unwrap();
        document
            .put("tags", Value::List(vec![Value::from("t")]))
            .unwrap();

        let catalog: Catalog = harness.read(EntityType::of::<Catalog>(), &document).unwrap();
        assert_eq!(catalog.members[0].city, "Bergen");
        assert_eq!(catalog.tags, vec!["t".to_string()]);
    }

    #[test]
    fn document_inside_simple_sequence_skips_the_property() {
        let harness = Harness::new();
        let catalog: Catalog = harness
            .read(
                EntityType::of::<Catalog>(),
                &doc! { tags: ["a", { x: 1 }], scores: [1, 2], shade: "Dark" },
            )
            .unwrap();

        assert!(catalog.tags.is_empty());
        assert_eq!(&*catalog.scores, &[1, 2]);
        assert_eq!(catalog.shade, Some(Shade::Dark));
    }

    #[test]
    fn scalar_inside_entity_sequence_skips_the_property() {
        let harness = Harness::new();
        let catalog: Catalog = harness
            .read(
                EntityType::of::<Catalog>(),
                &doc! { members: [{ street: "S" }, "oops"], shade: "Dark" },
            )
            .unwrap();

        assert!(catalog.members.is_empty());
        assert_eq!(catalog.shade, Some(Shade::Dark));
    }

    #[test]
    fn nested_document_for_collection_is_unsupported() {
        let harness = Harness::new();
        let err = harness
            .read::<Catalog>(EntityType::of::<Catalog>(), &doc! { tags: { a: 1 } })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);
    }

    #[test]
    fn unknown_enum_name_is_a_conversion_error() {
        let harness = Harness::new();
        let err = harness
            .read::<Catalog>(EntityType::of::<Catalog>(), &doc! { shade: "Purple" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConversionError);
    }

    #[test]
    fn transient_keys_and_nulls_are_ignored() {
        let harness = Harness::new();
        let mut document = doc! { "_id": "c", t: "Title", cache: "stale" };
        document.put("t", Value::Null).unwrap();

        let keyed: Keyed = harness.read(EntityType::of::<Keyed>(), &document).unwrap();
        assert_eq!(keyed.code, "c");
        assert_eq!(keyed.title, "");
        assert!(keyed.cache.is_none());
    }

    #[test]
    fn any_declarations_keep_raw_values() {
        let harness = Harness::new();
        let holder: Holder = harness
            .read(EntityType::of::<Holder>(), &doc! { payload: { a: [1, 2] }, extra: { k: "v" } })
            .unwrap();

        assert_eq!(holder.payload, Value::Document(doc! { a: [1, 2] }));
        assert_eq!(holder.extra, Some(doc! { k: "v" }));
    }

    #[test]
    fn type_without_constructor_cannot_be_read() {
        let harness = Harness::new();
        let reader = EntityReader::new(&harness.registry, &harness.resolver);
        let entity_type = EntityType::without_constructor::<Anonymous>(|| {
            crate::entity::EntityModel::new("Anonymous")
        });
        let err = reader.read(&entity_type, Some(&doc! { name: "x" })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InstantiationError);
    }
}
