use docmap::common::{Convertible, TypeRef, Value};
use docmap::doc;
use docmap::entity::{unknown_property, Entity, EntityModel, EntityType, MappedEntity, PropertyModel};
use docmap::errors::{ErrorKind, MapperResult};
use docmap::mapper::{AccessMode, DocumentReader};
use docmap_int_test::models::*;
use docmap_int_test::test_util::run_test;
use std::any::Any;

#[test]
fn test_scalar_where_document_expected_is_skipped() {
    run_test(|mapper| {
        let document = doc! {
            first_name: "Ann",
            address: "12 High Street",
            age: 41,
        };

        let employee = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();
        assert_eq!(employee.address, None);
        assert_eq!(employee.first_name, "Ann");
        assert_eq!(employee.age, 41);
        Ok(())
    });
}

#[test]
fn test_mismatched_shapes_leave_defaults() {
    run_test(|mapper| {
        let document = doc! {
            name: "Acme",
            ratings: "five",
            headquarters: [1, 2],
            head_counts: 7,
        };

        let company = mapper.read_as::<Company>(Some(&document))?.unwrap_or_default();
        assert_eq!(company.name, "Acme");
        assert!(company.ratings.is_empty());
        assert_eq!(company.headquarters, None);
        assert!(company.head_counts.is_empty());
        Ok(())
    });
}

#[test]
fn test_mismatched_sequence_element_leaves_default() {
    run_test(|mapper| {
        let document = doc! {
            name: "Acme",
            ratings: [1, { x: 1 }],
            employees: [{ first_name: "Ann" }, "oops"],
            statuses: ["Active", "Retired"],
        };

        let company = mapper.read_as::<Company>(Some(&document))?.unwrap_or_default();
        assert_eq!(company.name, "Acme");
        assert!(company.ratings.is_empty());
        assert!(company.employees.is_empty());
        assert_eq!(&*company.statuses, &[Status::Active, Status::Retired]);
        Ok(())
    });
}

#[test]
fn test_document_for_collection_is_rejected() {
    run_test(|mapper| {
        let document = doc! { name: "Acme", employees: { first: "Ann" } };
        let err = mapper.read_as::<Company>(Some(&document)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);
        Ok(())
    });
}

#[test]
fn test_stored_text_is_converted_to_declared_type() {
    run_test(|mapper| {
        let document = doc! { first_name: "Ann", age: "41", badge: 7i64, salary: 10 };
        let employee = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();
        assert_eq!(employee.age, 41);
        assert_eq!(employee.badge, 7);
        assert_eq!(employee.salary, 10.0);
        Ok(())
    });
}

#[test]
fn test_rejected_conversion_fails_the_read() {
    run_test(|mapper| {
        let document = doc! { first_name: "Ann", age: "forty-one" };
        let err = mapper.read_as::<Employee>(Some(&document)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConversionError);
        Ok(())
    });
}

#[derive(Clone, Default)]
struct Envelope {
    content: Value,
}

impl Entity for Envelope {
    fn entity_type(&self) -> EntityType {
        EntityType::of::<Envelope>()
    }

    fn property(&self, name: &str) -> MapperResult<Value> {
        match name {
            "content" => Ok(self.content.clone()),
            _ => unknown_property(self, name),
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> MapperResult<()> {
        match name {
            "content" => self.content = value,
            _ => return unknown_property(self, name),
        }
        Ok(())
    }

    fn clone_entity(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl MappedEntity for Envelope {
    fn entity_model() -> EntityModel {
        EntityModel::new("Envelope").property(PropertyModel::new("content", TypeRef::Variable("T")))
    }
}

#[test]
fn test_unbound_type_variable_is_a_configuration_error() {
    run_test(|mapper| {
        let envelope = Envelope {
            content: Value::from(1),
        };
        let err = mapper.to_document(&envelope).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

        let err = mapper
            .describe(&EntityType::of::<Envelope>(), AccessMode::Field)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
        Ok(())
    });
}

#[test]
fn test_type_without_constructor_cannot_be_read() {
    run_test(|mapper| {
        let entity_type = EntityType::without_constructor::<Address>(Address::entity_model);
        let document = doc! { street: "High", city: "York" };

        let err = mapper.read(&entity_type, Some(&document)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InstantiationError);

        let address = Address {
            street: "High".to_string(),
            city: "York".to_string(),
            zip: None,
        };
        assert_eq!(mapper.to_document(&address)?, document);
        assert_eq!(Address::type_ref(), TypeRef::Entity(EntityType::of::<Address>()));
        Ok(())
    });
}
