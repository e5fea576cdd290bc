use crate::common::{TypeRef, Value};
use crate::document::ObjectId;
use crate::errors::{ErrorKind, MapperError, MapperResult};
use num_bigint::{BigInt, Sign};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A directed conversion from one concrete type to another.
pub type ConversionFn = Arc<dyn Fn(&Value) -> MapperResult<Value> + Send + Sync>;

/// Types a document field can hold directly, in the priority order the
/// writer tries them for values that are neither simple nor structural.
pub const DOCUMENT_TARGETS: [TypeRef; 5] = [
    TypeRef::I64,
    TypeRef::F64,
    TypeRef::DateTime,
    TypeRef::String,
    TypeRef::Document,
];

const NUMERIC_TYPES: [TypeRef; 10] = [
    TypeRef::I8,
    TypeRef::I16,
    TypeRef::I32,
    TypeRef::I64,
    TypeRef::U8,
    TypeRef::U16,
    TypeRef::U32,
    TypeRef::U64,
    TypeRef::F32,
    TypeRef::F64,
];

const OBJECT_ID_HEX_DIGITS: usize = 24;

/// The table of conversion rules one mapper uses.
///
/// Lookup is an exact `(source, target)` match, tried after the identity
/// case and before two built-in families: enum constants to and from their
/// names, and sequences (array, list, set) converted element by element.
///
/// Rules are added through `&mut self` only, so a registry can no longer
/// change once the mapper that owns it is shared.
#[derive(Clone)]
pub struct ConversionRegistry {
    rules: HashMap<(TypeRef, TypeRef), ConversionFn>,
}

impl ConversionRegistry {
    /// Creates a registry holding the object id rules: text to and from
    /// object id, object id to and from big integer.
    pub fn new() -> Self {
        let mut registry = ConversionRegistry {
            rules: HashMap::new(),
        };

        registry.register(TypeRef::String, TypeRef::ObjectId, |value| match value {
            Value::String(text) => Ok(Value::ObjectId(ObjectId::parse_str(text)?)),
            _ => unexpected_source(value, &TypeRef::ObjectId),
        });

        registry.register(TypeRef::ObjectId, TypeRef::String, |value| match value {
            Value::ObjectId(id) => Ok(Value::String(id.to_hex())),
            _ => unexpected_source(value, &TypeRef::String),
        });

        registry.register(TypeRef::ObjectId, TypeRef::BigInt, |value| match value {
            Value::ObjectId(id) => Ok(Value::BigInt(BigInt::from_bytes_be(Sign::Plus, &id.bytes()))),
            _ => unexpected_source(value, &TypeRef::BigInt),
        });

        registry.register(TypeRef::BigInt, TypeRef::ObjectId, |value| match value {
            Value::BigInt(number) => big_int_to_object_id(number).map(Value::ObjectId),
            _ => unexpected_source(value, &TypeRef::ObjectId),
        });

        registry
    }

    /// Adds the general purpose rules: checked numeric conversions, parsing
    /// of text into numbers, booleans and big integers, char to and from
    /// text, big integer to decimal text and integers to big integer.
    pub fn register_standard_rules(&mut self) {
        for source in NUMERIC_TYPES.iter() {
            for target in NUMERIC_TYPES.iter().filter(|target| *target != source) {
                let to = target.clone();
                self.register(source.clone(), target.clone(), move |value| convert_number(value, &to));
            }

            let to = source.clone();
            self.register(TypeRef::String, source.clone(), move |value| parse_text(value, &to));
        }

        for source in NUMERIC_TYPES.iter().filter(|source| source.is_integral()) {
            self.register(source.clone(), TypeRef::BigInt, |value| {
                convert_number(value, &TypeRef::BigInt)
            });
        }

        self.register(TypeRef::String, TypeRef::Bool, |value| parse_text(value, &TypeRef::Bool));
        self.register(TypeRef::String, TypeRef::Char, |value| parse_text(value, &TypeRef::Char));
        self.register(TypeRef::String, TypeRef::BigInt, |value| parse_text(value, &TypeRef::BigInt));

        self.register(TypeRef::Char, TypeRef::String, |value| match value {
            Value::Char(c) => Ok(Value::String(c.to_string())),
            _ => unexpected_source(value, &TypeRef::String),
        });

        self.register(TypeRef::BigInt, TypeRef::String, |value| match value {
            Value::BigInt(number) => Ok(Value::String(number.to_str_radix(10))),
            _ => unexpected_source(value, &TypeRef::String),
        });
    }

    /// Adds or replaces the rule converting `source` values into `target`.
    pub fn register<F>(&mut self, source: TypeRef, target: TypeRef, rule: F)
    where
        F: Fn(&Value) -> MapperResult<Value> + Send + Sync + 'static,
    {
        self.rules.insert((source, target), Arc::new(rule));
    }

    /// Returns `true` if an explicit rule is registered for the pair.
    pub fn has_rule(&self, source: &TypeRef, target: &TypeRef) -> bool {
        self.rules.contains_key(&(source.clone(), target.clone()))
    }

    /// Returns `true` if values of `source` can be converted to `target`.
    ///
    /// A sequence whose element type is unknown (`Any`) is considered
    /// convertible to any sequence; its items are checked one by one when
    /// converted.
    pub fn can_convert(&self, source: &TypeRef, target: &TypeRef) -> bool {
        if source == target || target.is_any() {
            return true;
        }

        if self.has_rule(source, target) {
            return true;
        }

        match (source, target) {
            (TypeRef::Enum(_), TypeRef::String) | (TypeRef::String, TypeRef::Enum(_)) => true,
            (source, target) if source.is_sequence() && target.is_sequence() => {
                match (source.element_type(), target.element_type()) {
                    (Some(from), Some(to)) => from.is_any() || self.can_convert(from, to),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Converts `value` into `target`. [Value::Null] converts to itself.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConversionError] when no rule applies or the rule rejects
    /// the value. A rule failing with another kind is wrapped as the cause.
    pub fn convert(&self, value: &Value, target: &TypeRef) -> MapperResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let source = value.type_ref();
        if source == *target || target.is_any() {
            return Ok(value.clone());
        }

        if let Some(rule) = self.rules.get(&(source.clone(), target.clone())) {
            return rule(value).map_err(|err| {
                if *err.kind() == ErrorKind::ConversionError {
                    err
                } else {
                    log::error!("Failed to convert {} to {}: {}", value, target, err);
                    MapperError::new_with_cause(
                        &format!("Failed to convert {} to {}", value, target),
                        ErrorKind::ConversionError,
                        err,
                    )
                }
            });
        }

        match (value, target) {
            (Value::Enum(constant), TypeRef::String) => Ok(Value::String(constant.name().to_string())),
            (Value::String(name), TypeRef::Enum(enum_type)) => match enum_type.constant(name) {
                Some(constant) => Ok(Value::Enum(constant)),
                None => {
                    log::error!("{} is not a constant of enum {}", name, enum_type.name());
                    Err(MapperError::new(
                        &format!("{} is not a constant of enum {}", name, enum_type.name()),
                        ErrorKind::ConversionError,
                    ))
                }
            },
            (Value::Array(items) | Value::List(items) | Value::Set(items), target)
                if target.is_sequence() =>
            {
                self.convert_sequence(items, target)
            }
            _ => no_rule(&source, target),
        }
    }

    /// Returns the first of `candidates` that `value` can be converted into.
    pub fn find_first_supported_target(&self, value: &Value, candidates: &[TypeRef]) -> Option<TypeRef> {
        let source = value.type_ref();
        candidates
            .iter()
            .find(|candidate| self.can_convert(&source, candidate))
            .cloned()
    }

    fn convert_sequence(&self, items: &[Value], target: &TypeRef) -> MapperResult<Value> {
        let element_type = target.element_type().unwrap_or(&TypeRef::Any);
        let mut converted = Vec::with_capacity(items.len());
        for item in items {
            let item = self.convert(item, element_type)?;
            if matches!(target, TypeRef::Set(_)) {
                if !converted.contains(&item) {
                    converted.push(item);
                }
            } else {
                converted.push(item);
            }
        }

        Ok(match target {
            TypeRef::Array(_) => Value::Array(converted),
            TypeRef::Set(_) => Value::Set(converted),
            _ => Value::List(converted),
        })
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        ConversionRegistry::new()
    }
}

impl Debug for ConversionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn no_rule<T>(source: &TypeRef, target: &TypeRef) -> MapperResult<T> {
    log::error!("No conversion rule from {} to {}", source, target);
    Err(MapperError::new(
        &format!("No conversion rule from {} to {}", source, target),
        ErrorKind::ConversionError,
    ))
}

fn unexpected_source<T>(value: &Value, target: &TypeRef) -> MapperResult<T> {
    log::error!("Cannot convert {} to {}", value, target);
    Err(MapperError::new(
        &format!("Cannot convert {} to {}", value, target),
        ErrorKind::ConversionError,
    ))
}

fn big_int_to_object_id(number: &BigInt) -> MapperResult<ObjectId> {
    if number.sign() == Sign::Minus {
        log::error!("Negative number {} cannot be an object id", number);
        return Err(MapperError::new(
            &format!("Negative number {} cannot be an object id", number),
            ErrorKind::ConversionError,
        ));
    }

    let hex = number.to_str_radix(16);
    if hex.len() > OBJECT_ID_HEX_DIGITS {
        log::error!("Number {} is too large for an object id", number);
        return Err(MapperError::new(
            &format!("Number {} is too large for an object id", number),
            ErrorKind::ConversionError,
        ));
    }

    ObjectId::parse_str(&format!("{:0>width$}", hex, width = OBJECT_ID_HEX_DIGITS))
}

fn integer_value(number: i128, target: &TypeRef) -> Option<Value> {
    match target {
        TypeRef::I8 => i8::try_from(number).ok().map(Value::I8),
        TypeRef::I16 => i16::try_from(number).ok().map(Value::I16),
        TypeRef::I32 => i32::try_from(number).ok().map(Value::I32),
        TypeRef::I64 => i64::try_from(number).ok().map(Value::I64),
        TypeRef::U8 => u8::try_from(number).ok().map(Value::U8),
        TypeRef::U16 => u16::try_from(number).ok().map(Value::U16),
        TypeRef::U32 => u32::try_from(number).ok().map(Value::U32),
        TypeRef::U64 => u64::try_from(number).ok().map(Value::U64),
        TypeRef::F32 => Some(Value::F32(number as f32)),
        TypeRef::F64 => Some(Value::F64(number as f64)),
        TypeRef::BigInt => Some(Value::BigInt(BigInt::from(number))),
        _ => None,
    }
}

fn convert_number(value: &Value, target: &TypeRef) -> MapperResult<Value> {
    let converted = match (value.as_integer(), value.as_decimal()) {
        (Some(integer), _) => integer_value(integer, target),
        (None, Some(decimal)) if target.is_integral() => {
            // only whole numbers inside the target range survive
            if decimal.fract() == 0.0 && decimal.is_finite() {
                integer_value(decimal as i128, target)
            } else {
                None
            }
        }
        (None, Some(decimal)) => match target {
            TypeRef::F32 => Some(Value::F32(decimal as f32)),
            TypeRef::F64 => Some(Value::F64(decimal)),
            _ => None,
        },
        _ => None,
    };

    match converted {
        Some(converted) => Ok(converted),
        None => unexpected_source(value, target),
    }
}

fn parse_text(value: &Value, target: &TypeRef) -> MapperResult<Value> {
    let text = match value {
        Value::String(text) => text.trim(),
        _ => return unexpected_source(value, target),
    };

    let parsed = match target {
        TypeRef::I8 => Value::I8(text.parse()?),
        TypeRef::I16 => Value::I16(text.parse()?),
        TypeRef::I32 => Value::I32(text.parse()?),
        TypeRef::I64 => Value::I64(text.parse()?),
        TypeRef::U8 => Value::U8(text.parse()?),
        TypeRef::U16 => Value::U16(text.parse()?),
        TypeRef::U32 => Value::U32(text.parse()?),
        TypeRef::U64 => Value::U64(text.parse()?),
        TypeRef::F32 => Value::F32(text.parse()?),
        TypeRef::F64 => Value::F64(text.parse()?),
        TypeRef::Bool => Value::Bool(text.parse()?),
        TypeRef::BigInt => match text.parse::<BigInt>() {
            Ok(number) => Value::BigInt(number),
            Err(_) => return unexpected_source(value, target),
        },
        TypeRef::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return unexpected_source(value, target),
            }
        }
        _ => return unexpected_source(value, target),
    };
    Ok(parsed)
}
