//! Hand-written entities shared by the mapper tests.

use crate::common::{Convertible, EnumType, TypeRef, Value};
use crate::document::ObjectId;
use crate::entity::{
    entity_from_value, entity_to_value, unknown_property, Entity, EntityModel, EntityType, MappedEntity,
    PropertyModel,
};
use crate::errors::MapperResult;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Once;

static LOGGER: Once = Once::new();

pub(crate) fn init_logger() {
    LOGGER.call_once(colog::init);
}

macro_rules! fixture_entity {
    ($name:ident { $($field:ident : $ty:ty $([ $($method:ident ( $($arg:expr),* )),* ])?),* $(,)? }) => {
        #[derive(Clone, Default, Debug, PartialEq)]
        pub(crate) struct $name {
            $(pub(crate) $field: $ty),*
        }

        impl Entity for $name {
            fn entity_type(&self) -> EntityType {
                EntityType::of::<$name>()
            }

            fn property(&self, name: &str) -> MapperResult<Value> {
                match name {
                    $(stringify!($field) => self.$field.to_value(),)*
                    _ => unknown_property(self, name),
                }
            }

            fn set_property(&mut self, name: &str, value: Value) -> MapperResult<()> {
                match name {
                    $(stringify!($field) => self.$field = <$ty as Convertible>::from_value(&value)?,)*
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

        impl MappedEntity for $name {
            fn entity_model() -> EntityModel {
                EntityModel::new(stringify!($name))
                    $(.property(
                        PropertyModel::new(stringify!($field), <$ty as Convertible>::type_ref())
                            $($(.$method($($arg),*))*)?
                    ))*
            }
        }

        impl Convertible for $name {
            fn type_ref() -> TypeRef {
                TypeRef::Entity(EntityType::of::<$name>())
            }

            fn to_value(&self) -> MapperResult<Value> {
                Ok(entity_to_value(self))
            }

            fn from_value(value: &Value) -> MapperResult<Self> {
                entity_from_value(value)
            }
        }
    };
}

pub(crate) static SHADE: EnumType = EnumType::new("Shade", &["Light", "Dark"]);

#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub(crate) enum Shade {
    #[default]
    Light,
    Dark,
}

impl Convertible for Shade {
    fn type_ref() -> TypeRef {
        TypeRef::Enum(&SHADE)
    }

    fn to_value(&self) -> MapperResult<Value> {
        let ordinal = match self {
            Shade::Light => 0,
            Shade::Dark => 1,
        };
        match SHADE.constant_at(ordinal) {
            Some(constant) => Ok(Value::Enum(constant)),
            None => crate::common::mapping_error(&Value::Null, "a Shade"),
        }
    }

    fn from_value(value: &Value) -> MapperResult<Self> {
        let name = match value {
            Value::Enum(constant) if constant.enum_type() == &SHADE => constant.name(),
            Value::String(name) => name.as_str(),
            _ => return crate::common::mapping_error(value, "a Shade"),
        };
        match name {
            "Light" => Ok(Shade::Light),
            "Dark" => Ok(Shade::Dark),
            _ => crate::common::mapping_error(value, "a Shade"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Money {
    pub(crate) cents: i64,
}

crate::custom_convertible!(Money);

fixture_entity!(Address {
    street: String,
    city: String,
    zip: Option<i32>,
});

fixture_entity!(Person {
    id: Option<String>,
    name: String,
    age: i32,
    address: Option<Address>,
    nickname: Option<String>,
});

fixture_entity!(Catalog {
    id: Option<ObjectId>,
    tags: Vec<String>,
    scores: Box<[i32]>,
    labels: HashMap<String, i32>,
    shade: Option<Shade>,
    shades: Box<[Shade]>,
    members: Vec<Address>,
    branches: HashMap<String, Address>,
});

fixture_entity!(Keyed {
    code: String [as_id()],
    title: String [with_key("t")],
    cache: Option<String> [as_transient()],
});

fixture_entity!(Priced {
    id: Option<String>,
    price: Option<Money>,
});

fixture_entity!(Numbered {
    id: Option<i64>,
    count: i64,
});

fixture_entity!(Anonymous {
    name: String,
});

fixture_entity!(BadMap {
    lookup: HashMap<i32, String>,
});

fixture_entity!(TwoIds {
    id: Option<String>,
    _id: Option<String>,
});

fixture_entity!(ClashingKeys {
    first: String [with_key("k")],
    second: String [with_key("k")],
});

fixture_entity!(Holder {
    payload: Value,
    extra: Option<crate::document::Document>,
});
