//! Object identification and canonical envelope format.

use crate::error::{GitliteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte BLAKE3 content hash used to identify blobs and commits.
///
/// The same content always produces the same ObjectId, enabling
/// deduplication and integrity verification.
///
/// # Examples
///
/// ```
/// use gitlite_core::ObjectId;
///
/// let id = ObjectId::from_bytes([0xab; 32]);
/// assert_eq!(id.as_hex().len(), 64);
/// assert_eq!(id.shard(), "ab");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// The length of an ObjectId in bytes.
    pub const LEN: usize = 32;

    /// The length of an ObjectId as a hex string.
    pub const HEX_LEN: usize = 64;

    /// Creates an ObjectId from raw bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the underlying 32-byte BLAKE3 hash.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns this ObjectId as a lowercase hex string.
    ///
    /// The returned string is always exactly 64 characters long.
    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the first 8 hex characters, for messages.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Returns the shard prefix (first 2 hex characters).
    ///
    /// Blob objects live at `.gitlite/objects/{shard}/{full_hex}`.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// Returns true if the hex form of this id starts with `prefix`
    /// (case-insensitive).
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.as_hex().starts_with(&prefix.to_ascii_lowercase())
    }

    /// Parses an ObjectId from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `GitliteError::InvalidHex` if the string is not valid hex
    /// or is not exactly 64 characters long.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitlite_core::ObjectId;
    ///
    /// let hex = "a".repeat(64);
    /// let id = ObjectId::from_hex(&hex).unwrap();
    /// assert_eq!(id.as_hex(), hex);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN {
            return Err(GitliteError::InvalidHex(format!(
                "expected {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }

        let bytes = hex::decode(s).map_err(|e| GitliteError::InvalidHex(e.to_string()))?;

        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| GitliteError::InvalidHex("invalid length".to_string()))?;

        Ok(Self(arr))
    }

    /// Computes the ObjectId of a blob from its content bytes.
    pub fn hash_blob(content: &[u8]) -> Self {
        Self::hash_canonical(&canonical_bytes(ObjectKind::Blob, content))
    }

    /// Computes the ObjectId of a commit from its canonical serialization.
    pub(crate) fn hash_commit(serialized: &[u8]) -> Self {
        Self::hash_canonical(&canonical_bytes(ObjectKind::Commit, serialized))
    }

    fn hash_canonical(canonical: &[u8]) -> Self {
        let hash = blake3::hash(canonical);
        Self::from_bytes(*hash.as_bytes())
    }
}

// Ids are stored as hex strings so the JSON records stay readable and map
// keys stay strings.
impl Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}...)", &self.as_hex()[..12])
    }
}

/// Entity kind discriminant for the canonical envelope.
///
/// Each kind salts the hash so a blob and a commit with identical payload
/// bytes never share an id.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    /// File contents.
    Blob = 1,
    /// Serialized commit.
    Commit = 2,
}

/// Canonical envelope magic bytes.
pub(crate) const MAGIC: &[u8; 4] = b"GLO1";

/// Size of the envelope header preceding the payload.
pub(crate) const HEADER_LEN: usize = 4 + 1 + 8;

/// Constructs canonical bytes for hashing.
///
/// Format:
/// - Magic: "GLO1" (4 bytes)
/// - Kind: u8 (1 byte)
/// - Length: u64 LE (8 bytes)
/// - Payload: variable bytes
pub(crate) fn canonical_bytes(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(kind as u8);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
    out
}
