use docmap::common::Value;
use docmap::doc;
use docmap::entity::{EntityType, MappedEntity};
use docmap::errors::ErrorKind;
use docmap::mapper::DocumentReader;
use docmap_int_test::models::*;
use docmap_int_test::test_util::{create_mapper, run_test};
use std::collections::HashMap;

#[test]
fn test_simple_round_trip() {
    run_test(|mapper| {
        let employee = Employee {
            id: Some("e-1".to_string()),
            ..fake_employee()
        };

        let document = mapper.to_document(&employee)?;
        let copy: Option<Employee> = mapper.read_as(Some(&document))?;
        assert_eq!(copy, Some(employee));
        Ok(())
    });
}

#[test]
fn test_round_trip_of_many_fake_employees() {
    run_test(|mapper| {
        for _ in 0..50 {
            let employee = fake_employee();
            let document = mapper.to_document(&employee)?;
            let copy = mapper.read_as::<Employee>(Some(&document))?;
            assert_eq!(copy.as_ref(), Some(&employee));
        }
        Ok(())
    });
}

#[test]
fn test_document_keys_match_non_null_properties() {
    run_test(|mapper| {
        let employee = Employee {
            id: None,
            joined: None,
            address: None,
            ..fake_employee()
        };

        let document = mapper.to_document(&employee)?;
        let keys: Vec<&str> = document.keys().collect();
        assert_eq!(
            keys,
            vec!["first_name", "last_name", "age", "salary", "active", "grade", "badge", "status"]
        );
        Ok(())
    });
}

#[test]
fn test_nested_entity_round_trip() {
    run_test(|mapper| {
        let employee = fake_employee();
        let document = mapper.to_document(&employee)?;

        let address = document.get("address").and_then(|value| value.as_document());
        let expected = employee.address.clone().unwrap_or_default();
        assert_eq!(
            address.and_then(|address| address.get("city")),
            Some(&Value::from(expected.city.as_str()))
        );

        let copy = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();
        assert_eq!(copy.address, employee.address);
        Ok(())
    });
}

#[test]
fn test_collection_round_trip() {
    run_test(|mapper| {
        let company = fake_company();
        let document = mapper.to_document(&company)?;

        assert_eq!(
            document.get("ratings"),
            Some(&Value::Array(vec![Value::I32(1), Value::I32(2), Value::I32(3)]))
        );
        assert_eq!(
            document.get("statuses"),
            Some(&Value::Array(vec![Value::from("Active"), Value::from("Retired")]))
        );
        match document.get("employees") {
            Some(Value::Array(items)) => {
                assert_eq!(items.len(), 3);
                assert!(items.iter().all(|item| item.is_document()));
            }
            other => panic!("employees stored as {:?}", other),
        }

        let copy = mapper.read_as::<Company>(Some(&document))?.unwrap_or_default();
        assert_eq!(copy.ratings, vec![1, 2, 3]);
        assert_eq!(copy.employees, company.employees);
        assert_eq!(copy.statuses, company.statuses);
        assert_eq!(copy, company);
        Ok(())
    });
}

#[test]
fn test_list_read_from_stored_list() {
    run_test(|mapper| {
        let document = doc! {
            name: "Acme",
            ratings: (Value::List(vec![Value::I32(4), Value::I32(5)])),
        };

        let company = mapper.read_as::<Company>(Some(&document))?.unwrap_or_default();
        assert_eq!(company.ratings, vec![4, 5]);
        Ok(())
    });
}

#[test]
fn test_empty_collections_round_trip() {
    run_test(|mapper| {
        let company = Company {
            name: "Empty".to_string(),
            ..Default::default()
        };

        let document = mapper.to_document(&company)?;
        assert_eq!(document.get("employees"), Some(&Value::Array(vec![])));
        assert!(document.get("offices").and_then(|value| value.as_document()).is_some());

        let copy = mapper.read_as::<Company>(Some(&document))?;
        assert_eq!(copy, Some(company));
        Ok(())
    });
}

#[test]
fn test_map_round_trip() {
    run_test(|mapper| {
        let company = fake_company();
        let document = mapper.to_document(&company)?;

        let head_counts = document
            .get("head_counts")
            .and_then(|value| value.as_document())
            .cloned()
            .unwrap_or_default();
        assert_eq!(head_counts.size(), 2);
        assert_eq!(
            head_counts.get("north"),
            company.head_counts.get("north").map(|count| Value::I64(*count)).as_ref()
        );

        let copy = mapper.read_as::<Company>(Some(&document))?.unwrap_or_default();
        assert_eq!(copy.head_counts, company.head_counts);
        assert_eq!(copy.offices, company.offices);
        Ok(())
    });
}

#[test]
fn test_non_text_map_keys_are_rejected() {
    let mapper = create_mapper().unwrap();
    let mut calibration = HashMap::new();
    calibration.insert(1, 0.5);
    let sensor = Sensor {
        id: Some(1),
        reading: 20.5,
        calibration,
    };

    let err = mapper.to_document(&sensor).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);

    let err = mapper
        .read_as::<Sensor>(Some(&doc! { reading: 1.0 }))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::UnsupportedShape);
}

#[test]
fn test_enum_stored_by_name() {
    run_test(|mapper| {
        let employee = Employee {
            status: Status::Retired,
            ..fake_employee()
        };

        let document = mapper.to_document(&employee)?;
        assert_eq!(document.get("status"), Some(&Value::from("Retired")));

        let document = doc! { first_name: "Ann", status: "OnLeave" };
        let copy = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();
        assert_eq!(copy.status, Status::OnLeave);
        Ok(())
    });
}

#[test]
fn test_unknown_enum_name_fails() {
    let mapper = create_mapper().unwrap();
    let err = mapper
        .read_as::<Employee>(Some(&doc! { status: "Fired" }))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConversionError);
}

#[test]
fn test_missing_fields_keep_defaults() {
    run_test(|mapper| {
        let document = doc! { first_name: "Ann" };
        let employee = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();

        assert_eq!(employee.first_name, "Ann");
        assert_eq!(employee.last_name, "");
        assert_eq!(employee.age, 0);
        assert_eq!(employee.status, Status::Active);
        assert_eq!(employee.address, None);
        Ok(())
    });
}

#[test]
fn test_stored_null_keeps_default() {
    run_test(|mapper| {
        let document = doc! { first_name: "Ann", address: (Value::Null) };
        let employee = mapper.read_as::<Employee>(Some(&document))?.unwrap_or_default();
        assert_eq!(employee.address, None);
        Ok(())
    });
}

#[test]
fn test_missing_document_reads_as_none() {
    run_test(|mapper| {
        assert_eq!(mapper.read_as::<Employee>(None)?, None);
        assert!(mapper.read(&EntityType::of::<Employee>(), None)?.is_none());
        Ok(())
    });
}

#[test]
fn test_raw_values_round_trip() {
    run_test(|mapper| {
        let note = Note {
            text: "hello".to_string(),
            attachment: Value::from(42i64),
            meta: Some(doc! { author: "Ann", tags: ["a", "b"] }),
        };

        let document = mapper.to_document(&note)?;
        assert_eq!(document.get("attachment"), Some(&Value::I64(42)));

        let copy = mapper.read_as::<Note>(Some(&document))?;
        assert_eq!(copy, Some(note));
        Ok(())
    });
}

#[test]
fn test_model_of_derived_entity() {
    let model = Company::entity_model();
    assert_eq!(model.name(), "companies");
    let names: Vec<&str> = model.properties().iter().map(|property| property.name()).collect();
    assert_eq!(
        names,
        vec!["company_id", "name", "headquarters", "employees", "ratings", "offices", "head_counts", "statuses"]
    );
    assert!(model.properties()[0].is_id());
}
