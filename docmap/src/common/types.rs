use crate::entity::EntityType;
use std::any::TypeId;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Describes the type of a property or of a runtime [crate::common::Value].
///
/// A `TypeRef` plays the role a class object plays in a reflective runtime:
/// the descriptor resolver reads it from entity metadata (the declared type)
/// and the writer derives it from values (the runtime type). Container
/// variants carry their generic arguments.
///
/// `Variable` stands for a generic parameter a metadata source could not
/// bind to a concrete type; describing an entity that declares one fails.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Any value, no static information.
    Any,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    DateTime,
    Locale,
    Pattern,
    /// A value naming a type.
    TypeName,
    DbRef,
    CodeWithScope,
    ObjectId,
    BigInt,
    Document,
    Enum(&'static EnumType),
    Entity(EntityType),
    Custom(CustomType),
    Array(Box<TypeRef>),
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Variable(&'static str),
}

impl TypeRef {
    pub fn array(element: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(element))
    }

    pub fn list(element: TypeRef) -> TypeRef {
        TypeRef::List(Box::new(element))
    }

    pub fn set(element: TypeRef) -> TypeRef {
        TypeRef::Set(Box::new(element))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> TypeRef {
        TypeRef::Map(Box::new(key), Box::new(value))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeRef::Any)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeRef::Enum(_))
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, TypeRef::Entity(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    /// List- or set-like container. Arrays are not collections.
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::List(_) | TypeRef::Set(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TypeRef::Array(_) | TypeRef::List(_) | TypeRef::Set(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TypeRef::Map(_, _))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, TypeRef::F32 | TypeRef::F64)
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeRef::I8
                | TypeRef::I16
                | TypeRef::I32
                | TypeRef::I64
                | TypeRef::U8
                | TypeRef::U16
                | TypeRef::U32
                | TypeRef::U64
        )
    }

    /// Types an identifier property may hold and still be coerced to an
    /// object id.
    pub fn is_id_type(&self) -> bool {
        matches!(self, TypeRef::String | TypeRef::ObjectId | TypeRef::BigInt)
    }

    /// Element type of an array, list or set.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(element) | TypeRef::List(element) | TypeRef::Set(element) => {
                Some(element)
            }
            _ => None,
        }
    }

    /// Key and value types of a map.
    pub fn map_types(&self) -> Option<(&TypeRef, &TypeRef)> {
        match self {
            TypeRef::Map(key, value) => Some((key, value)),
            _ => None,
        }
    }

    /// Returns the first generic variable found anywhere inside this type.
    pub fn unbound_variable(&self) -> Option<&'static str> {
        match self {
            TypeRef::Variable(name) => Some(*name),
            TypeRef::Array(element) | TypeRef::List(element) | TypeRef::Set(element) => {
                element.unbound_variable()
            }
            TypeRef::Map(key, value) => key.unbound_variable().or_else(|| value.unbound_variable()),
            _ => None,
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Any => write!(f, "any"),
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::I8 => write!(f, "i8"),
            TypeRef::I16 => write!(f, "i16"),
            TypeRef::I32 => write!(f, "i32"),
            TypeRef::I64 => write!(f, "i64"),
            TypeRef::U8 => write!(f, "u8"),
            TypeRef::U16 => write!(f, "u16"),
            TypeRef::U32 => write!(f, "u32"),
            TypeRef::U64 => write!(f, "u64"),
            TypeRef::F32 => write!(f, "f32"),
            TypeRef::F64 => write!(f, "f64"),
            TypeRef::Char => write!(f, "char"),
            TypeRef::String => write!(f, "string"),
            TypeRef::DateTime => write!(f, "datetime"),
            TypeRef::Locale => write!(f, "locale"),
            TypeRef::Pattern => write!(f, "pattern"),
            TypeRef::TypeName => write!(f, "type-name"),
            TypeRef::DbRef => write!(f, "dbref"),
            TypeRef::CodeWithScope => write!(f, "code-with-scope"),
            TypeRef::ObjectId => write!(f, "object-id"),
            TypeRef::BigInt => write!(f, "bigint"),
            TypeRef::Document => write!(f, "document"),
            TypeRef::Enum(enum_type) => write!(f, "enum {}", enum_type.name()),
            TypeRef::Entity(entity_type) => write!(f, "entity {}", entity_type.simple_name()),
            TypeRef::Custom(custom_type) => write!(f, "{}", custom_type.name()),
            TypeRef::Array(element) => write!(f, "[{}]", element),
            TypeRef::List(element) => write!(f, "list<{}>", element),
            TypeRef::Set(element) => write!(f, "set<{}>", element),
            TypeRef::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            TypeRef::Variable(name) => write!(f, "{}", name),
        }
    }
}

impl Debug for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeRef({})", self)
    }
}

/// Static description of a fieldless enum: its name and the symbolic names
/// of its constants in declaration order.
///
/// Instances live in statics, usually generated by `#[derive(MappedEnum)]`:
///
/// ```rust,ignore
/// static STATUS: EnumType = EnumType::new("Status", &["Active", "Retired"]);
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: &'static str,
    constants: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, constants: &'static [&'static str]) -> Self {
        EnumType { name, constants }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn constants(&self) -> &'static [&'static str] {
        self.constants
    }

    /// Looks up a constant by its symbolic name.
    pub fn constant(&'static self, name: &str) -> Option<EnumConstant> {
        self.constants
            .iter()
            .position(|constant| *constant == name)
            .map(|ordinal| EnumConstant { enum_type: self, ordinal })
    }

    pub fn constant_at(&'static self, ordinal: usize) -> Option<EnumConstant> {
        if ordinal < self.constants.len() {
            Some(EnumConstant { enum_type: self, ordinal })
        } else {
            None
        }
    }
}

/// One constant of an [EnumType].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    enum_type: &'static EnumType,
    ordinal: usize,
}

impl EnumConstant {
    pub fn enum_type(&self) -> &'static EnumType {
        self.enum_type
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn name(&self) -> &'static str {
        self.enum_type.constants[self.ordinal]
    }
}

impl Debug for EnumConstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.enum_type.name, self.name())
    }
}

/// Identity of an application type the mapper knows nothing about, such as
/// a money amount that a registered conversion rule turns into text.
#[derive(Clone, Copy)]
pub struct CustomType {
    name: &'static str,
    type_id: TypeId,
}

impl CustomType {
    pub fn of<T: 'static>() -> Self {
        CustomType {
            name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CustomType {}

impl Hash for CustomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for CustomType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomType({})", self.name)
    }
}
