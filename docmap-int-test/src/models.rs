use chrono::{DateTime, Utc};
use docmap::common::Value;
use docmap::document::{Document, ObjectId};
use docmap_derive::{Entity, MappedEnum};
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::chrono::en::DateTime as FakeDateTime;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::{FirstName, LastName};
use fake::{Fake, Faker};
use std::collections::{BTreeMap, HashMap};

#[derive(MappedEnum, Clone, Copy, Default, Debug, PartialEq)]
pub enum Status {
    #[default]
    Active,
    OnLeave,
    Retired,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Money {
    pub cents: i64,
}

docmap::custom_convertible!(Money);

#[derive(Entity, Clone, Default, Debug, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<i32>,
}

#[derive(Entity, Clone, Default, Debug, PartialEq)]
pub struct Employee {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub salary: f64,
    pub active: bool,
    pub grade: char,
    pub badge: u16,
    pub joined: Option<DateTime<Utc>>,
    pub status: Status,
    pub address: Option<Address>,
}

#[derive(Entity, Clone, Default, Debug, PartialEq)]
#[entity(name = "companies")]
pub struct Company {
    #[entity(id)]
    pub company_id: Option<ObjectId>,
    pub name: String,
    pub headquarters: Option<Address>,
    pub employees: Vec<Employee>,
    pub ratings: Vec<i32>,
    pub offices: HashMap<String, Address>,
    pub head_counts: BTreeMap<String, i64>,
    pub statuses: Box<[Status]>,
}

#[derive(Entity, Clone, Default, Debug, PartialEq)]
pub struct Account {
    pub id: Option<String>,
    pub owner: String,
    #[entity(key = "bal")]
    pub balance: Option<Money>,
    #[entity(transient)]
    pub session: Option<String>,
}

#[derive(Entity, Clone, Default, Debug, PartialEq)]
pub struct Sensor {
    pub id: Option<i64>,
    pub reading: f64,
    pub calibration: HashMap<i32, f64>,
}

#[derive(Entity, Clone, Default, Debug, PartialEq)]
pub struct Note {
    pub text: String,
    pub attachment: Value,
    pub meta: Option<Document>,
}

pub fn fake_address() -> Address {
    Address {
        street: StreetName().fake(),
        city: CityName().fake(),
        zip: Some((10000..99999).fake()),
    }
}

pub fn fake_employee() -> Employee {
    Employee {
        id: None,
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        age: (18..70).fake(),
        salary: Faker.fake(),
        active: Faker.fake(),
        grade: 'B',
        badge: Faker.fake(),
        joined: Some(FakeDateTime().fake()),
        status: Status::OnLeave,
        address: Some(fake_address()),
    }
}

pub fn fake_company() -> Company {
    let mut offices = HashMap::new();
    offices.insert("north".to_string(), fake_address());
    offices.insert("south".to_string(), fake_address());

    let mut head_counts = BTreeMap::new();
    head_counts.insert("north".to_string(), (1..500i64).fake());
    head_counts.insert("south".to_string(), (1..500i64).fake());

    Company {
        company_id: None,
        name: CompanyName().fake(),
        headquarters: Some(fake_address()),
        employees: vec![fake_employee(), fake_employee(), fake_employee()],
        ratings: vec![1, 2, 3],
        offices,
        head_counts,
        statuses: vec![Status::Active, Status::Retired].into_boxed_slice(),
    }
}
