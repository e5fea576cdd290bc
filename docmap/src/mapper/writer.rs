use crate::common::{TypeRef, Value};
use crate::document::{Document, ObjectId};
use crate::entity::Entity;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use crate::mapper::descriptor::{AccessMode, DescriptorResolver, EntityDescriptor};
use crate::mapper::registry::{ConversionRegistry, DOCUMENT_TARGETS};
use crate::mapper::simple_types::is_simple_value;

/// Writes entities into documents.
///
/// Every mappable, non-null property ends up under its document key:
/// enums as their constant name, textual identifiers in object id format as
/// [ObjectId]s, simple values as they are, maps as nested documents,
/// sequences as arrays and nested entities as nested documents. Values of
/// any other type are stored through the first document type the registry
/// can convert them to.
///
/// The object graph is walked depth first without cycle detection.
pub struct EntityWriter<'a> {
    registry: &'a ConversionRegistry,
    resolver: &'a DescriptorResolver,
}

impl<'a> EntityWriter<'a> {
    pub fn new(registry: &'a ConversionRegistry, resolver: &'a DescriptorResolver) -> Self {
        EntityWriter { registry, resolver }
    }

    pub fn write(&self, entity: &dyn Entity, document: &mut Document) -> MapperResult<()> {
        let entity_type = entity.entity_type();
        let descriptors = self.resolver.describe(&entity_type, AccessMode::Property)?;

        for descriptor in descriptors.iter() {
            if !descriptor.is_mappable() {
                if !descriptor.is_synthetic() {
                    log::debug!(
                        "Skipping non-mappable property {}.{}",
                        entity_type.simple_name(),
                        descriptor.name()
                    );
                }
                continue;
            }

            let value = entity.property(descriptor.name())?;
            if value.is_null() {
                continue;
            }

            let stored = self.write_property(descriptor, value)?;
            document.put(descriptor.key(), stored)?;
        }
        Ok(())
    }

    fn write_property(&self, descriptor: &EntityDescriptor, value: Value) -> MapperResult<Value> {
        if let Value::Enum(constant) = &value {
            return Ok(Value::String(constant.name().to_string()));
        }

        if descriptor.is_identifier() && descriptor.is_of_id_type() {
            if let Value::String(text) = &value {
                if ObjectId::is_valid(text) {
                    return self.coerce_identifier(value);
                }
            }
        }

        self.write_value(value)
    }

    fn coerce_identifier(&self, value: Value) -> MapperResult<Value> {
        match self.registry.convert(&value, &TypeRef::ObjectId) {
            Ok(id) => Ok(id),
            Err(err) if *err.kind() == ErrorKind::ConversionError => {
                log::warn!("Unable to convert identifier {} to an object id, storing it as is: {}", value, err);
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }

    fn write_value(&self, value: Value) -> MapperResult<Value> {
        if is_simple_value(&value) {
            Ok(store_simple(value))
        } else {
            self.write_compound(value)
        }
    }

    fn write_compound(&self, value: Value) -> MapperResult<Value> {
        match value {
            Value::Map(entries) => self.write_map(entries).map(Value::Document),
            Value::Array(items) | Value::List(items) | Value::Set(items) => self.write_sequence(items),
            value => {
                if let Some(target) = self.registry.find_first_supported_target(&value, &DOCUMENT_TARGETS) {
                    return self.registry.convert(&value, &target);
                }

                match value {
                    Value::Entity(entity) => {
                        let mut nested = Document::new();
                        self.write(entity.as_ref(), &mut nested)?;
                        Ok(Value::Document(nested))
                    }
                    value => {
                        log::error!("No way to store a value of type {} in a document", value.type_ref());
                        Err(MapperError::new(
                            &format!("No way to store a value of type {} in a document", value.type_ref()),
                            ErrorKind::UnsupportedShape,
                        ))
                    }
                }
            }
        }
    }

    fn write_map(&self, entries: Vec<(Value, Value)>) -> MapperResult<Document> {
        let mut document = Document::new();
        for (key, value) in entries {
            let key = match key {
                Value::String(key) => key,
                key => {
                    log::error!("Map key {} is not text, only text keys are supported", key);
                    return Err(MapperError::new(
                        &format!("Map key {} of type {} is not text, only text keys are supported", key, key.type_ref()),
                        ErrorKind::UnsupportedShape,
                    ));
                }
            };

            if value.is_null() {
                continue;
            }
            document.put(key, self.write_value(value)?)?;
        }
        Ok(document)
    }

    fn write_sequence(&self, items: Vec<Value>) -> MapperResult<Value> {
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            if item.is_null() || is_simple_value(&item) {
                stored.push(store_simple(item));
            } else {
                stored.push(self.write_compound(item)?);
            }
        }
        Ok(Value::Array(stored))
    }
}

/// Enum constants are stored by name, also inside arrays.
fn store_simple(value: Value) -> Value {
    match value {
        Value::Enum(constant) => Value::String(constant.name().to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(store_simple).collect()),
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CustomType;
    use crate::doc;
    use crate::mapper::fixtures::*;
    use crate::mapper_config::MapperConfig;
    use std::collections::HashMap;

    fn write(registry: &ConversionRegistry, entity: &dyn Entity) -> MapperResult<Document> {
        init_logger();
        let resolver = DescriptorResolver::new(MapperConfig::default());
        let writer = EntityWriter::new(registry, &resolver);
        let mut document = Document::new();
        writer.write(entity, &mut document)?;
        Ok(document)
    }

    fn standard() -> ConversionRegistry {
        let mut registry = ConversionRegistry::new();
        registry.register_standard_rules();
        registry
    }

    #[test]
    fn simple_properties_and_null_skipping() {
        let person = Person {
            id: Some("my-key".to_string()),
            name: "Ann".to_string(),
            age: 41,
            address: None,
            nickname: None,
        };

        let document = write(&standard(), &person).unwrap();
        assert_eq!(document, doc! { "_id": "my-key", name: "Ann", age: 41 });
        assert!(!document.contains_key("class"));
    }

    #[test]
    fn textual_object_id_is_coerced() {
        let hex = "4d9d7f4a3f9f4b2a8c000001";
        let person = Person {
            id: Some(hex.to_string()),
            ..Default::default()
        };

        let document = write(&standard(), &person).unwrap();
        assert_eq!(
            document.get("_id"),
            Some(&Value::ObjectId(ObjectId::parse_str(hex).unwrap()))
        );
    }

    #[test]
    fn failed_identifier_coercion_falls_back_to_text() {
        let hex = "4d9d7f4a3f9f4b2a8c000001";
        let mut registry = ConversionRegistry::new();
        registry.register(TypeRef::String, TypeRef::ObjectId, |_| {
            Err(MapperError::new("rejected", ErrorKind::ConversionError))
        });

        let person = Person {
            id: Some(hex.to_string()),
            ..Default::default()
        };
        let document = write(&registry, &person).unwrap();
        assert_eq!(document.get("_id"), Some(&Value::from(hex)));
    }

    #[test]
    fn nested_entity_becomes_nested_document() {
        let person = Person {
            name: "Bo".to_string(),
            address: Some(Address {
                street: "Main".to_string(),
                city: "Oslo".to_string(),
                zip: None,
            }),
            ..Default::default()
        };

        let document = write(&standard(), &person).unwrap();
        assert_eq!(
            document.get("address"),
            Some(&Value::Document(doc! { street: "Main", city: "Oslo" }))
        );
    }

    #[test]
    fn containers_enums_and_maps() {
        let mut labels = HashMap::new();
        labels.insert("x".to_string(), 1);
        let mut branches = HashMap::new();
        branches.insert(
            "north".to_string(),
            Address {
                city: "Tromso".to_string(),
                ..Default::default()
            },
        );

        let catalog = Catalog {
            id: None,
            tags: vec!["a".to_string(), "b".to_string()],
            scores: vec![1, 2].into_boxed_slice(),
            labels,
            shade: Some(Shade::Dark),
            shades: vec![Shade::Light, Shade::Dark].into_boxed_slice(),
            members: vec![Address {
                street: "S".to_string(),
                ..Default::default()
            }],
            branches,
        };

        let document = write(&standard(), &catalog).unwrap();
        assert!(!document.contains_key("_id"));
        assert_eq!(
            document.get("tags"),
            Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(document.get("scores"), Some(&Value::Array(vec![Value::I32(1), Value::I32(2)])));
        assert_eq!(document.get("labels"), Some(&Value::Document(doc! { x: 1 })));
        assert_eq!(document.get("shade"), Some(&Value::from("Dark")));
        assert_eq!(
            document.get("shades"),
            Some(&Value::Array(vec![Value::from("Light"), Value::from("Dark")]))
        );
        assert_eq!(
            document.get("members"),
            Some(&Value::Array(vec![Value::Document(doc! { street: "S", city: "" })]))
        );
        assert_eq!(
            document.get("branches"),
            Some(&Value::Document(doc! { north: { street: "", city: "Tromso" } }))
        );
    }

    #[test]
    fn transient_property_is_not_written() {
        let keyed = Keyed {
            code: "c-1".to_string(),
            title: "T".to_string(),
            cache: Some("hot".to_string()),
        };
        let document = write(&standard(), &keyed).unwrap();
        assert_eq!(document, doc! { "_id": "c-1", t: "T" });
    }

    #[test]
    fn custom_value_uses_registered_rule() {
        let mut registry = standard();
        registry.register(TypeRef::Custom(CustomType::of::<Money>()), TypeRef::I64, |value| {
            match value.as_custom().and_then(|custom| custom.downcast_ref::<Money>()) {
                Some(money) => Ok(Value::I64(money.cents)),
                None => Err(MapperError::new("not money", ErrorKind::ConversionError)),
            }
        });

        let priced = Priced {
            id: None,
            price: Some(Money { cents: 995 }),
        };
        let document = write(&registry, &priced).unwrap();
        assert_eq!(document.get("price"), Some(&Value::I64(995)));
    }

    #[test]
    fn custom_value_without_rule_is_unsupported() {
        let priced = Priced {
            id: None,
            price: Some(Money { cents: 1 }),
        };
        let err = write(&standard(), &priced).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);
    }

    #[test]
    fn raw_values_in_any_properties() {
        let holder = Holder {
            payload: Value::Map(vec![
                (Value::from("a"), Value::I32(1)),
                (Value::from("skip"), Value::Null),
            ]),
            extra: Some(doc! { k: "v" }),
        };
        let document = write(&standard(), &holder).unwrap();
        assert_eq!(document.get("payload"), Some(&Value::Document(doc! { a: 1 })));
        assert_eq!(document.get("extra"), Some(&Value::Document(doc! { k: "v" })));
    }

    #[test]
    fn non_text_map_key_is_unsupported() {
        let holder = Holder {
            payload: Value::Map(vec![(Value::I32(1), Value::from("one"))]),
            extra: None,
        };
        let err = write(&standard(), &holder).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);
    }

    #[test]
    fn compound_sequence_elements_are_written_recursively() {
        let holder = Holder {
            payload: Value::List(vec![
                Value::I32(1),
                Value::Null,
                Value::Map(vec![(Value::from("k"), Value::from("v"))]),
                Value::List(vec![Value::from("inner")]),
            ]),
            extra: None,
        };
        let document = write(&standard(), &holder).unwrap();
        assert_eq!(
            document.get("payload"),
            Some(&Value::Array(vec![
                Value::I32(1),
                Value::Null,
                Value::Document(doc! { k: "v" }),
                Value::Array(vec![Value::from("inner")]),
            ]))
        );
    }
}
