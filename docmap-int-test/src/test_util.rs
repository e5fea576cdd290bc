use crate::models::Money;
use docmap::common::{Convertible, TypeRef, Value};
use docmap::errors::{ErrorKind, MapperError, MapperResult};
use docmap::{DocumentMapper, MapperBuilder};
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(colog::init);
}

/// Runs `test` against a mapper with default settings, panicking with the
/// full error when it fails.
pub fn run_test<T>(test: T)
where
    T: FnOnce(DocumentMapper) -> MapperResult<()>,
{
    init_logger();
    let result = create_mapper().and_then(test);
    if let Err(e) = result {
        panic!("Test failed: {:?}", e);
    }
}

pub fn create_mapper() -> MapperResult<DocumentMapper> {
    MapperBuilder::new().build()
}

/// Mapper that stores [Money] as its amount in cents.
pub fn create_money_mapper() -> MapperResult<DocumentMapper> {
    MapperBuilder::new()
        .register_converter(Money::type_ref(), TypeRef::I64, |value| {
            match value.as_custom().and_then(|custom| custom.downcast_ref::<Money>()) {
                Some(money) => Ok(Value::I64(money.cents)),
                None => Err(MapperError::new(
                    &format!("{} is not money", value),
                    ErrorKind::ConversionError,
                )),
            }
        })
        .register_converter(TypeRef::I64, Money::type_ref(), |value| match value {
            Value::I64(cents) => Money { cents: *cents }.to_value(),
            _ => Err(MapperError::new(
                &format!("{} is not an amount in cents", value),
                ErrorKind::ConversionError,
            )),
        })
        .build()
}
