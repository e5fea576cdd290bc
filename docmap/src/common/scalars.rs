use crate::document::{Document, ObjectId};
use crate::errors::{ErrorKind, MapperError, MapperResult};
use regex::Regex;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// A language tag such as `en` or `en-GB`, stored as text.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Locale {
    tag: String,
}

impl Locale {
    pub fn new(tag: &str) -> Self {
        Locale {
            tag: tag.replace('_', "-"),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn language(&self) -> &str {
        self.tag.split('-').next().unwrap_or_default()
    }

    pub fn country(&self) -> Option<&str> {
        self.tag.split('-').nth(1)
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// A compiled regular expression stored as a document value.
///
/// Two patterns are equal when their source text is equal.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> MapperResult<Pattern> {
        match Regex::new(source) {
            Ok(regex) => Ok(Pattern { regex }),
            Err(err) => {
                log::error!("Invalid pattern {}: {}", source, err);
                Err(MapperError::new(
                    &format!("Invalid pattern {}: {}", source, err),
                    ErrorKind::ConversionError,
                ))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

/// A value naming a type, the document counterpart of a class literal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: &str) -> Self {
        TypeName(name.to_string())
    }

    pub fn of<T: ?Sized>() -> Self {
        TypeName(std::any::type_name::<T>().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A reference to a document in another collection.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct DbRef {
    namespace: String,
    id: ObjectId,
}

impl DbRef {
    pub fn new(namespace: &str, id: ObjectId) -> Self {
        DbRef {
            namespace: namespace.to_string(),
            id,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }
}

/// Source code together with the variables it closes over.
#[derive(Clone, PartialEq, Debug)]
pub struct CodeWithScope {
    code: String,
    scope: Document,
}

impl CodeWithScope {
    pub fn new(code: &str, scope: Document) -> Self {
        CodeWithScope {
            code: code.to_string(),
            scope,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn scope(&self) -> &Document {
        &self.scope
    }
}
