use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for mapping operations.
///
/// The kinds split into fatal ones, which abort a read or write call, and
/// [ErrorKind::StructuralMismatch], which the reader logs and absorbs.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{MapperError, ErrorKind, MapperResult};
///
/// fn example() -> MapperResult<()> {
///     Err(MapperError::new("No identifier property", ErrorKind::ConfigurationError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Entity metadata is unusable: unbound type variable, duplicate
    /// identifier, missing identifier where one is required.
    ConfigurationError,
    /// The entity type has no construction capability.
    InstantiationError,
    /// A conversion rule is missing or rejected its input.
    ConversionError,
    /// A document field does not have the shape the descriptor expects.
    StructuralMismatch,
    /// The value or declaration has a shape the mapper refuses to handle,
    /// such as a map with non-text keys.
    UnsupportedShape,
    /// The text is not a valid object identifier.
    InvalidId,
    /// A typed value could not be bridged to or from a [crate::common::Value].
    ObjectMappingError,
    /// Unexpected internal failure.
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::InstantiationError => write!(f, "Instantiation error"),
            ErrorKind::ConversionError => write!(f, "Conversion error"),
            ErrorKind::StructuralMismatch => write!(f, "Structural mismatch"),
            ErrorKind::UnsupportedShape => write!(f, "Unsupported shape"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom mapper error type.
///
/// `MapperError` carries a message, a kind, an optional cause and the
/// backtrace captured at construction.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::errors::{MapperError, ErrorKind};
///
/// let cause = MapperError::new("bad hex digit", ErrorKind::InvalidId);
/// let err = MapperError::new_with_cause("Cannot convert id", ErrorKind::ConversionError, cause);
/// ```
#[derive(Clone)]
pub struct MapperError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MapperError>>,
    backtrace: Backtrace,
}

impl MapperError {
    /// Creates a new `MapperError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MapperError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a new `MapperError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MapperError) -> Self {
        MapperError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new_unresolved(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&MapperError> {
        self.cause.as_deref()
    }
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => {
                let mut backtrace = self.backtrace.clone();
                backtrace.resolve();
                write!(f, "{}: {}\n{:?}", self.error_kind, self.message, backtrace)
            }
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

#[cfg(feature = "serde")]
impl serde::ser::Error for MapperError {
    fn custom<T: Display>(msg: T) -> Self {
        MapperError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::num::ParseIntError> for MapperError {
    fn from(err: std::num::ParseIntError) -> Self {
        MapperError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::ConversionError,
        )
    }
}

impl From<std::num::ParseFloatError> for MapperError {
    fn from(err: std::num::ParseFloatError) -> Self {
        MapperError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::ConversionError,
        )
    }
}

impl From<std::str::ParseBoolError> for MapperError {
    fn from(err: std::str::ParseBoolError) -> Self {
        MapperError::new(
            &format!("Boolean parsing error: {}", err),
            ErrorKind::ConversionError,
        )
    }
}

impl From<String> for MapperError {
    fn from(msg: String) -> Self {
        MapperError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MapperError {
    fn from(msg: &str) -> Self {
        MapperError::new(msg, ErrorKind::InternalError)
    }
}
