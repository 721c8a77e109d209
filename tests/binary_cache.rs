#![cfg(feature = "binary-cache")]

use grantc::{DeserializeError, EntityAction, Grants, SchemaBuilder};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn simple_grants() -> Grants {
    SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| e.all_roles(EntityAction::Create))
        .compile()
        .unwrap()
}

fn complex_grants() -> Grants {
    SchemaBuilder::new()
        .role("Admin")
        .role("Editor")
        .role("User")
        .entity("Article", |e| {
            e.all_roles(EntityAction::View)
                .granular(EntityAction::Update, |p| {
                    p.role("Admin")
                        .role("Editor")
                        .field("publishedAt", ["Admin"])
                        .field("body", ["Admin", "Editor"])
                })
                .disabled(EntityAction::Delete)
        })
        .entity("Invoice", |e| {
            e.granular(EntityAction::Search, |p| {
                p.role("Admin").role("User").field("total", ["Admin"])
            })
        })
        .compile()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn round_trip_simple() {
    let original = simple_grants();
    let bytes = original.to_bytes(None).unwrap();
    let restored = Grants::from_bytes(&bytes).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn round_trip_preserves_order_and_attributes() {
    let original = complex_grants();
    let restored = Grants::from_bytes(&original.to_bytes(None).unwrap()).unwrap();
    assert_eq!(restored.len(), original.len());
    for (a, b) in original.iter().zip(restored.iter()) {
        assert_eq!(a, b);
    }
    assert!(restored.iter().any(|g| g.attributes == "*,!publishedAt"));
}

#[test]
fn round_trip_empty() {
    let empty = SchemaBuilder::new().compile().unwrap();
    let restored = Grants::from_bytes(&empty.to_bytes(None).unwrap()).unwrap();
    assert!(restored.is_empty());
}

#[test]
fn encoding_is_deterministic() {
    let a = complex_grants().to_bytes(Some("schema")).unwrap();
    let b = complex_grants().to_bytes(Some("schema")).unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Source digest
// ---------------------------------------------------------------------------

#[test]
fn source_digest_present_when_given() {
    let bytes = simple_grants().to_bytes(Some("{\"roles\":[]}")).unwrap();
    let digest = grantc::serial::source_digest(&bytes).unwrap();
    assert_eq!(digest, Some(*blake3::hash(b"{\"roles\":[]}").as_bytes()));
}

#[test]
fn source_digest_absent_when_omitted() {
    let bytes = simple_grants().to_bytes(None).unwrap();
    assert_eq!(grantc::serial::source_digest(&bytes).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn bad_magic() {
    let mut bytes = simple_grants().to_bytes(None).unwrap();
    bytes[0] = b'X';
    assert!(matches!(
        Grants::from_bytes(&bytes),
        Err(DeserializeError::BadMagic)
    ));
}

#[test]
fn incompatible_version() {
    let mut bytes = simple_grants().to_bytes(None).unwrap();
    bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
    assert!(matches!(
        Grants::from_bytes(&bytes),
        Err(DeserializeError::IncompatibleVersion { blob: 99, supported: 1 })
    ));
}

#[test]
fn flipped_payload_byte_fails_checksum() {
    let mut bytes = complex_grants().to_bytes(None).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    assert!(matches!(
        Grants::from_bytes(&bytes),
        Err(DeserializeError::ChecksumMismatch)
    ));
}

#[test]
fn truncated_payload() {
    let bytes = complex_grants().to_bytes(None).unwrap();
    let truncated = &bytes[..bytes.len() - 3];
    assert!(matches!(
        Grants::from_bytes(truncated),
        Err(DeserializeError::LengthMismatch { .. })
    ));
}

#[test]
fn empty_input() {
    assert!(matches!(
        Grants::from_bytes(&[]),
        Err(DeserializeError::LengthMismatch { expected: 32, actual: 0 })
    ));
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grants.bin");

    let original = complex_grants();
    original.to_binary_file(&path, None).unwrap();
    let restored = Grants::from_binary_file(&path).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Grants::from_binary_file(dir.path().join("nope.bin")),
        Err(DeserializeError::Io(_))
    ));
}
