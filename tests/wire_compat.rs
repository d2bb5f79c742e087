//! Wire compatibility tests.
//!
//! These tests pin the exact bytes produced for known records and check
//! decoding of buffers written by other protobuf producers, including
//! fields this schema does not (or no longer) declares.

use dir_metadata::core::config::DecodeLimits;
use dir_metadata::{
    decode, decode_with, encode, enum_name, field_names, EnumKind, MalformedReason, Message,
    Metadata, Monorail, Os, RecordKind, WireType,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn bytes(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).expect("valid hex")
}

/// `team@example.com`
const TEAM_EMAIL_HEX: &str = "7465616d406578616d706c652e636f6d";

/// Monorail { project: "chromium", component: "Blink" }
const MONORAIL_HEX: &str = "0a086368726f6d69756d1205426c696e6b";

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn encodes_team_email_and_os() {
    let meta = Metadata::builder()
        .team_email("team@example.com")
        .os(Os::Linux)
        .build();

    let expected = bytes(&format!("1210{}1801", TEAM_EMAIL_HEX));
    assert_eq!(encode(&meta), expected);
}

#[test]
fn encodes_monorail() {
    assert_eq!(
        encode(&Monorail::new("chromium", "Blink")),
        bytes(MONORAIL_HEX)
    );
}

#[test]
fn encodes_embedded_monorail() {
    let meta = Metadata::builder().monorail("chromium", "Blink").build();
    assert_eq!(encode(&meta), bytes(&format!("0a11{}", MONORAIL_HEX)));
}

#[test]
fn all_default_metadata_has_no_tags() {
    assert!(encode(&Metadata::default()).is_empty());
}

#[test]
fn unwrapped_default_os_is_omitted() {
    let meta = Metadata::builder().os(Os::Unrecognized(0)).build();
    assert!(encode(&meta).is_empty());

    let parsed: Metadata = decode(&encode(&meta)).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn unwrapped_declared_os_roundtrips() {
    let meta = Metadata::builder().os(Os::Unrecognized(2)).build();
    assert_eq!(encode(&meta), bytes("1802"));

    let parsed: Metadata = decode(&encode(&meta)).unwrap();
    assert_eq!(parsed.os, Os::Windows);
    assert_eq!(parsed, meta);
}

#[test]
fn encodes_negative_os_sign_extended() {
    let meta = Metadata::builder().os(Os::from(-1)).build();
    assert_eq!(encode(&meta), bytes("18ffffffffffffffffff01"));
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn decodes_example_record() {
    let meta: Metadata = decode(&bytes(&format!("1210{}1801", TEAM_EMAIL_HEX))).unwrap();

    assert_eq!(meta.team_email, "team@example.com");
    assert_eq!(meta.os, Os::Linux);
    assert_eq!(meta.monorail, None);
}

#[test]
fn decodes_fields_out_of_order() {
    let meta: Metadata = decode(&bytes(&format!("18071210{}", TEAM_EMAIL_HEX))).unwrap();
    assert_eq!(meta.os, Os::Fuchsia);
    assert_eq!(meta.team_email, "team@example.com");
}

#[test]
fn unknown_os_survives_roundtrip() {
    let meta: Metadata = decode(&bytes("1863")).unwrap();
    assert_eq!(meta.os.as_i32(), 99);
    assert_eq!(enum_name(EnumKind::Os, 99), "99");
    assert_eq!(encode(&meta), bytes("1863"));
}

#[test]
fn reserved_field_13_varint_skipped() {
    let stripped = bytes("1801");
    let with_reserved = bytes("6896011801");

    let a: Metadata = decode(&with_reserved).unwrap();
    let b: Metadata = decode(&stripped).unwrap();
    assert_eq!(a, b);
}

#[test]
fn reserved_field_14_length_delimited_skipped() {
    let stripped = bytes(&format!("1210{}", TEAM_EMAIL_HEX));
    let with_reserved = bytes(&format!("72036162631210{}", TEAM_EMAIL_HEX));

    let a: Metadata = decode(&with_reserved).unwrap();
    let b: Metadata = decode(&stripped).unwrap();
    assert_eq!(a, b);
}

#[test]
fn reserved_fields_fixed_width_skipped() {
    // field 13 fixed64, field 14 fixed32, then os = MAC
    let meta: Metadata = decode(&bytes("690102030405060708750a0b0c0d1803")).unwrap();
    assert_eq!(meta, Metadata::builder().os(Os::Mac).build());
}

#[test]
fn reserved_groups_skipped() {
    // field 13 group { field 1 = 1 }, empty field 14 group, then os = ANDROID
    let meta: Metadata = decode(&bytes("6b08016c73741804")).unwrap();
    assert_eq!(meta, Metadata::builder().os(Os::Android).build());
}

#[test]
fn unknown_group_skipped() {
    // field 15 group { field 1 = 1 }, then os = IOS
    let meta: Metadata = decode(&bytes("7b08017c1805")).unwrap();
    assert_eq!(meta.os, Os::Ios);
}

#[test]
fn unknown_fields_are_dropped_on_reencode() {
    let meta: Metadata = decode(&bytes("68011801")).unwrap();
    assert_eq!(encode(&meta), bytes("1801"));
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn truncated_team_email_reports_length_offset() {
    // declared 16 bytes, only 4 present
    let err = decode::<Metadata>(&bytes("180112107465616d")).unwrap_err();
    assert_eq!(err.offset(), 3);
    assert_eq!(
        err.reason(),
        &MalformedReason::LengthOverrun {
            declared: 16,
            remaining: 4
        }
    );
    assert_eq!(
        err.to_string(),
        "malformed input at byte 3: declared length 16 exceeds 4 remaining bytes"
    );
}

#[test]
fn wrong_wire_type_for_team_email() {
    let err = decode::<Metadata>(&bytes("1005")).unwrap_err();
    assert_eq!(err.offset(), 0);
    assert_eq!(
        err.reason(),
        &MalformedReason::WireTypeMismatch {
            field: 2,
            expected: WireType::LengthDelimited,
            found: WireType::Varint,
        }
    );
}

#[test]
fn wrong_wire_type_for_monorail() {
    let err = decode::<Metadata>(&bytes("18010d00000000")).unwrap_err();
    assert_eq!(err.offset(), 2);
}

#[test]
fn nested_overrun_offset_is_absolute() {
    // monorail (4 bytes) { project declares 9 bytes, has 2 }
    let err = decode::<Metadata>(&bytes("0a040a096162")).unwrap_err();
    assert_eq!(err.offset(), 3);
}

#[test]
fn truncated_varint_os() {
    let err = decode::<Metadata>(&bytes("1880")).unwrap_err();
    assert_eq!(err.offset(), 1);
    assert_eq!(err.reason(), &MalformedReason::TruncatedVarint);
}

#[test]
fn field_number_zero_rejected() {
    let err = decode::<Monorail>(&bytes("0201")).unwrap_err();
    assert!(matches!(err.reason(), MalformedReason::InvalidFieldNumber(_)));
}

#[test]
fn limits_apply_to_decode() {
    let payload = bytes(&format!("1210{}", TEAM_EMAIL_HEX));
    let limits = DecodeLimits::default().with_max_input_len(8);

    let err = decode_with::<Metadata>(&payload, &limits).unwrap_err();
    assert_eq!(err.offset(), 8);
    assert_eq!(
        err.reason(),
        &MalformedReason::InputTooLarge {
            len: payload.len(),
            limit: 8
        }
    );
}

#[test]
fn deeply_nested_groups_fail_without_overflow() {
    let limits = DecodeLimits::default().with_recursion_limit(u32::MAX);
    let payload = vec![0x7b; 500_000];

    let err = decode_with::<Metadata>(&payload, &limits).unwrap_err();
    assert_eq!(err.offset(), payload.len() - 1);
    assert_eq!(err.reason(), &MalformedReason::UnterminatedGroup(15));
}

#[test]
fn nested_groups_hit_default_recursion_limit() {
    let payload = vec![0x7b; 200];

    let err = decode::<Metadata>(&payload).unwrap_err();
    assert_eq!(err.offset(), 100);
    assert_eq!(err.reason(), &MalformedReason::RecursionLimitExceeded(100));
}

// =============================================================================
// Reflection
// =============================================================================

#[test]
fn field_names_in_declaration_order() {
    assert_eq!(
        field_names(RecordKind::Metadata).collect::<Vec<_>>(),
        vec!["monorail", "team_email", "os"]
    );
    assert_eq!(
        field_names(RecordKind::Monorail).collect::<Vec<_>>(),
        vec!["project", "component"]
    );
}

#[test]
fn descriptor_wire_types_match_encoder() {
    let meta = Metadata::builder()
        .monorail("p", "c")
        .team_email("t")
        .os(Os::Chrome)
        .build();
    let encoded = meta.encode_to_vec();

    // Keys appear in declaration order: 0x0a, 0x12, 0x18
    let descriptor = RecordKind::Metadata.descriptor();
    let keys: Vec<u8> = descriptor
        .fields
        .iter()
        .map(|f| ((f.number << 3) as u8) | f.wire_type().as_u8())
        .collect();
    assert_eq!(keys, vec![0x0a, 0x12, 0x18]);
    assert_eq!(encoded[0], keys[0]);
}
