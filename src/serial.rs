//! On-disk cache of compiled grants.
//!
//! `grants.json` is what the access-control runtime loads; this cache is for
//! the build step that produces it. A cache written with the schema text
//! records that text's BLAKE3 digest, so a later build can compare digests
//! with [`source_digest`] and reuse the cached grants instead of lowering and
//! compiling the schema again.
//!
//! ## Layout
//!
//! ```text
//! Offset  Size  Field
//! 0       4     b"GRNT"
//! 4       2     Cache format version (u16, little-endian)
//! 6       2     Flags (u16): bit 0 set when a source digest is recorded
//! 8       4     Grant count (u32, little-endian)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    First 16 bytes of the payload's BLAKE3 hash
//! 32..    var   bincode payload: role table, resource table, grants
//! ```
//!
//! Grants refer to roles and resources by index into the two tables. A cache
//! whose format version differs from [`FORMAT_VERSION`] is rejected with
//! [`DeserializeError::IncompatibleVersion`]; callers are expected to
//! recompile from the schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{AclAction, Attributes, Grant, Grants};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"GRNT";
/// Cache format version written by this build.
pub const FORMAT_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;
const FLAG_SOURCE_DIGEST: u16 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure to write a grants cache.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("cannot encode grants cache: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("grants cache for {0} grants exceeds the 4 GiB format limit")]
    TooLarge(usize),

    #[error("cannot write grants cache: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read a grants cache. Every variant means the cache is unusable
/// and the schema has to be compiled again.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a grants cache (missing GRNT marker)")]
    BadMagic,

    #[error("grants cache format v{blob} cannot be read, this build reads v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("grants cache is corrupt: payload checksum does not match header")]
    ChecksumMismatch,

    #[error("grants cache is truncated: needs {expected} bytes, found {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("cannot decode grants cache payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("grants cache is inconsistent: {0}")]
    Validation(String),

    #[error("cannot read grants cache: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedGrants {
    source_digest: Option<[u8; 32]>,
    roles: Vec<String>,
    resources: Vec<String>,
    grants: Vec<SerializedGrant>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedGrant {
    role: usize,
    resource: usize,
    action: SerializedAction,
    attributes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedAction {
    CreateAny,
    ReadAny,
    UpdateAny,
    DeleteAny,
    CreateOwn,
    ReadOwn,
    UpdateOwn,
    DeleteOwn,
}

// ---------------------------------------------------------------------------
// AclAction conversion
// ---------------------------------------------------------------------------

fn serialize_action(action: AclAction) -> SerializedAction {
    match action {
        AclAction::CreateAny => SerializedAction::CreateAny,
        AclAction::ReadAny => SerializedAction::ReadAny,
        AclAction::UpdateAny => SerializedAction::UpdateAny,
        AclAction::DeleteAny => SerializedAction::DeleteAny,
        AclAction::CreateOwn => SerializedAction::CreateOwn,
        AclAction::ReadOwn => SerializedAction::ReadOwn,
        AclAction::UpdateOwn => SerializedAction::UpdateOwn,
        AclAction::DeleteOwn => SerializedAction::DeleteOwn,
    }
}

fn deserialize_action(action: SerializedAction) -> AclAction {
    match action {
        SerializedAction::CreateAny => AclAction::CreateAny,
        SerializedAction::ReadAny => AclAction::ReadAny,
        SerializedAction::UpdateAny => AclAction::UpdateAny,
        SerializedAction::DeleteAny => AclAction::DeleteAny,
        SerializedAction::CreateOwn => AclAction::CreateOwn,
        SerializedAction::ReadOwn => AclAction::ReadOwn,
        SerializedAction::UpdateOwn => AclAction::UpdateOwn,
        SerializedAction::DeleteOwn => AclAction::DeleteOwn,
    }
}

// ---------------------------------------------------------------------------
// Name interning
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Interner<'a> {
    names: Vec<String>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Interner<'a> {
    fn intern(&mut self, name: &'a str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_owned());
        self.index.insert(name, idx);
        idx
    }
}

// ---------------------------------------------------------------------------
// Grants -> SerializedGrants
// ---------------------------------------------------------------------------

fn grants_to_serialized(grants: &[Grant], source_text: Option<&str>) -> SerializedGrants {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let mut roles = Interner::default();
    let mut resources = Interner::default();

    let serialized: Vec<SerializedGrant> = grants
        .iter()
        .map(|g| SerializedGrant {
            role: roles.intern(&g.role),
            resource: resources.intern(&g.resource),
            action: serialize_action(g.action),
            attributes: g.attributes.clone(),
        })
        .collect();

    SerializedGrants {
        source_digest,
        roles: roles.names,
        resources: resources.names,
        grants: serialized,
    }
}

// ---------------------------------------------------------------------------
// SerializedGrants -> Grants
// ---------------------------------------------------------------------------

fn serialized_to_grants(
    header: &Header,
    ser: SerializedGrants,
) -> Result<Grants, DeserializeError> {
    validate(header, &ser)?;

    let grants = ser
        .grants
        .into_iter()
        .map(|sg| Grant {
            role: ser.roles[sg.role].clone(),
            resource: ser.resources[sg.resource].clone(),
            action: deserialize_action(sg.action),
            attributes: sg.attributes,
        })
        .collect();

    Ok(Grants::from_vec(grants))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(header: &Header, ser: &SerializedGrants) -> Result<(), DeserializeError> {
    if header.grant_count as usize != ser.grants.len() {
        return Err(DeserializeError::Validation(format!(
            "header lists {} grants, payload holds {}",
            header.grant_count,
            ser.grants.len()
        )));
    }
    if header.has_source_digest() != ser.source_digest.is_some() {
        return Err(DeserializeError::Validation(
            "source digest flag disagrees with payload".to_owned(),
        ));
    }

    for (i, grant) in ser.grants.iter().enumerate() {
        let Some(role) = ser.roles.get(grant.role) else {
            return Err(DeserializeError::Validation(format!(
                "grant {i} names role #{} of {}",
                grant.role,
                ser.roles.len()
            )));
        };
        if ser.resources.get(grant.resource).is_none() {
            return Err(DeserializeError::Validation(format!(
                "grant {i} ({role}) names resource #{} of {}",
                grant.resource,
                ser.resources.len()
            )));
        }
        if let Err(err) = Attributes::parse(&grant.attributes) {
            return Err(DeserializeError::Validation(format!(
                "grant {i} ({role}) has unreadable attributes: {err}"
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    format_version: u16,
    flags: u16,
    grant_count: u32,
    payload_len: u32,
    checksum: [u8; 16],
}

impl Header {
    fn for_payload(
        payload: &[u8],
        grant_count: u32,
        has_digest: bool,
    ) -> Result<Self, SerializeError> {
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| SerializeError::TooLarge(grant_count as usize))?;
        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&blake3::hash(payload).as_bytes()[..16]);
        Ok(Self {
            format_version: FORMAT_VERSION,
            flags: if has_digest { FLAG_SOURCE_DIGEST } else { 0 },
            grant_count,
            payload_len,
            checksum,
        })
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.format_version.to_le_bytes());
        buf.extend_from_slice(&self.flags.to_le_bytes());
        buf.extend_from_slice(&self.grant_count.to_le_bytes());
        buf.extend_from_slice(&self.payload_len.to_le_bytes());
        buf.extend_from_slice(&self.checksum);
    }

    fn read(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let Some(header) = bytes.first_chunk::<HEADER_SIZE>() else {
            return Err(DeserializeError::LengthMismatch {
                expected: HEADER_SIZE as u32,
                actual: bytes.len(),
            });
        };
        let (magic, rest) = header.split_at(4);
        if magic != MAGIC {
            return Err(DeserializeError::BadMagic);
        }
        let u16_at = |at: usize| u16::from_le_bytes([rest[at], rest[at + 1]]);
        let u32_at =
            |at: usize| u32::from_le_bytes([rest[at], rest[at + 1], rest[at + 2], rest[at + 3]]);

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&rest[12..28]);
        Ok(Self {
            format_version: u16_at(0),
            flags: u16_at(2),
            grant_count: u32_at(4),
            payload_len: u32_at(8),
            checksum,
        })
    }

    fn has_source_digest(&self) -> bool {
        self.flags & FLAG_SOURCE_DIGEST != 0
    }

    /// Check version, length and checksum, returning the payload slice.
    fn payload<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8], DeserializeError> {
        if self.format_version != FORMAT_VERSION {
            return Err(DeserializeError::IncompatibleVersion {
                blob: self.format_version,
                supported: FORMAT_VERSION,
            });
        }
        let body = &bytes[HEADER_SIZE..];
        let Some(payload) = body.get(..self.payload_len as usize) else {
            return Err(DeserializeError::LengthMismatch {
                expected: self.payload_len,
                actual: body.len(),
            });
        };
        if blake3::hash(payload).as_bytes()[..16] != self.checksum {
            return Err(DeserializeError::ChecksumMismatch);
        }
        Ok(payload)
    }
}

fn read_payload(bytes: &[u8]) -> Result<(Header, SerializedGrants), DeserializeError> {
    let header = Header::read(bytes)?;
    let payload = header.payload(bytes)?;
    let (serialized, _): (SerializedGrants, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok((header, serialized))
}

/// The BLAKE3 digest of the schema text the cache was written from, if one
/// was recorded. Compare it with the digest of the current schema to decide
/// whether the cache is still fresh.
///
/// # Errors
///
/// Returns [`DeserializeError`] if `bytes` is not a readable grants cache.
pub fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    let header = Header::read(bytes)?;
    if !header.has_source_digest() {
        header.payload(bytes)?;
        return Ok(None);
    }
    let (_, serialized) = read_payload(bytes)?;
    Ok(serialized.source_digest)
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    grants: &[Grant],
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let grant_count =
        u32::try_from(grants.len()).map_err(|_| SerializeError::TooLarge(grants.len()))?;
    let serialized = grants_to_serialized(grants, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;
    let header = Header::for_payload(&payload, grant_count, source_text.is_some())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write(&mut buf);
    buf.extend_from_slice(&payload);
    debug!(grants = grants.len(), bytes = buf.len(), "encoded grants cache");
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Grants, DeserializeError> {
    let (header, serialized) = read_payload(bytes)?;
    let grants = serialized_to_grants(&header, serialized)?;
    debug!(grants = grants.len(), "decoded grants cache");
    Ok(grants)
}

impl Grants {
    /// Serialize these grants to a byte vector.
    ///
    /// The optional `source_text` (typically the schema document) is hashed
    /// and recorded in the cache so a later build can tell whether the
    /// cache is stale; see [`source_digest`].
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if encoding fails.
    pub fn to_bytes(&self, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
        encode(self, source_text)
    }

    /// Deserialize grants previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        decode(bytes)
    }

    /// Serialize these grants and write them to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] on encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the grants it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on I/O, format, integrity, or validation failure.
    pub fn from_binary_file(path: impl AsRef<std::path::Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
