use crate::errors::{ErrorKind, MapperError, MapperResult};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

const OBJECT_ID_LENGTH: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(rand::random);
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK));

/// The store's native 12-byte object identifier.
///
/// Layout: 4 bytes of big-endian seconds since the epoch, 5 bytes unique to
/// the process, 3 bytes of a big-endian counter. The textual form is the
/// 24-digit lowercase hex encoding of the bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use docmap::document::ObjectId;
///
/// let id = ObjectId::new();
/// assert!(ObjectId::is_valid(&id.to_hex()));
///
/// let parsed = ObjectId::parse_str("4d9d7f4a3f9f4b2a8c000001")?;
/// assert_eq!(parsed.to_hex(), "4d9d7f4a3f9f4b2a8c000001");
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_LENGTH],
}

impl ObjectId {
    /// Generates a new identifier from the current time, the process bytes
    /// and the next counter value.
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        ObjectId { bytes }
    }

    pub fn from_bytes(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        ObjectId { bytes }
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LENGTH] {
        self.bytes
    }

    /// Returns `true` if `text` is a 24-digit hex string.
    pub fn is_valid(text: &str) -> bool {
        text.len() == OBJECT_ID_LENGTH * 2 && text.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Parses the 24-digit hex form of an identifier.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidId] if the text is not 24 hex digits.
    pub fn parse_str(text: &str) -> MapperResult<ObjectId> {
        if !ObjectId::is_valid(text) {
            log::error!("'{}' is not a valid object id", text);
            return Err(MapperError::new(
                &format!("'{}' is not a valid object id", text),
                ErrorKind::InvalidId,
            ));
        }

        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16)?;
        }
        Ok(ObjectId { bytes })
    }

    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// The creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        Utc.timestamp_opt(seconds as i64, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl FromStr for ObjectId {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        ObjectId::parse_str(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_and_valid() {
        let first = ObjectId::new();
        let second = ObjectId::new();
        assert_ne!(first, second);
        assert!(ObjectId::is_valid(&first.to_hex()));
    }

    #[test]
    fn parse_round_trips_hex() {
        let id = ObjectId::parse_str("4d9d7f4a3f9f4b2a8c000001").unwrap();
        assert_eq!(id.to_hex(), "4d9d7f4a3f9f4b2a8c000001");
        assert_eq!(id.to_string(), "4d9d7f4a3f9f4b2a8c000001");
        assert_eq!(id.bytes()[11], 1);
    }

    #[test]
    fn parse_accepts_upper_case() {
        let id: ObjectId = "4D9D7F4A3F9F4B2A8C0000FF".parse().unwrap();
        assert_eq!(id.to_hex(), "4d9d7f4a3f9f4b2a8c0000ff");
    }

    #[test]
    fn invalid_text_is_rejected() {
        assert!(!ObjectId::is_valid("1234"));
        assert!(!ObjectId::is_valid("zz9d7f4a3f9f4b2a8c000001"));
        let err = ObjectId::parse_str("not-an-id").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidId);
    }

    #[test]
    fn timestamp_reads_leading_seconds() {
        let id = ObjectId::from_bytes([0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(id.timestamp().timestamp(), 10);

        let now = Utc::now().timestamp();
        let generated = ObjectId::new().timestamp().timestamp();
        assert!((generated - now).abs() <= 1);
    }

    #[test]
    fn debug_format_names_the_type() {
        let id = ObjectId::parse_str("000000000000000000000001").unwrap();
        assert_eq!(format!("{:?}", id), "ObjectId(\"000000000000000000000001\")");
    }
}
