//! Literal-byte end-to-end scenarios S1-S7, plus a handful of fixtures
//! covering multi-value, reference-types and bulk-memory that S1-S7
//! don't exercise. Hand-assembled rather than taken from an external
//! corpus, in the style of `fuel-tx`'s `tests/valid_cases`.

use wasm_core::{decode, decode_and_validate, validate_module, DecoderConfig, ErrorCode, ValidatorConfig, ValueKind};

fn decoder_cfg() -> DecoderConfig {
    DecoderConfig::default()
}

fn validator_cfg() -> ValidatorConfig {
    ValidatorConfig::default()
}

/// S1: minimal empty module.
#[test]
fn s1_minimal_empty_module() {
    let bytes = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
    let module = decode_and_validate(&bytes).unwrap();
    assert_eq!(module.total_function_count(), 0);
    assert!(module.start.is_none());
}

/// S2: bad magic.
#[test]
fn s2_bad_magic() {
    let bytes = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x00, 0x00, 0x00];
    let err = decode(&bytes, &decoder_cfg()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidMagicNumber);
    assert_eq!(err.location().unwrap().offset, 0);
}

/// S3: bad version.
#[test]
fn s3_bad_version() {
    let bytes = [0x00, 0x61, 0x73, 0x6D, 0x02, 0x00, 0x00, 0x00];
    let err = decode(&bytes, &decoder_cfg()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidVersion);
    assert_eq!(err.location().unwrap().offset, 4);
}

/// S4: `(func (result i32) i32.const 42)` decodes and validates.
#[test]
fn s4_single_function_returning_i32_const() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00, // header
        0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F, // type: [] -> [i32]
        0x03, 0x02, 0x01, 0x00, // func: type idx 0
        0x0A, 0x06, 0x01, 0x04, 0x00, 0x41, 0x2A, 0x0B, // code
    ];
    let module = decode_and_validate(&bytes).unwrap();
    assert_eq!(module.total_function_count(), 1);
    assert_eq!(module.functions[0].body.as_ref(), &[0x41, 0x2A, 0x0B]);
    assert_eq!(module.function_type(0).unwrap().results[0], ValueKind::I32);
}

/// S5: function declared `[] -> [i32]` but body pushes an f32.
#[test]
fn s5_type_mismatch() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F,
        0x03, 0x02, 0x01, 0x00,
        0x0A, 0x09, 0x01, 0x07, 0x00, 0x43, 0x00, 0x00, 0x28, 0x42, 0x0B,
    ];
    let module = decode(&bytes, &decoder_cfg()).unwrap();
    let err = validate_module(&module, &validator_cfg()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
    assert_eq!(err.location().unwrap().function_index, Some(0));
}

/// S6: duplicate type section.
#[test]
fn s6_duplicate_type_section() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x01, 0x01, 0x00, // empty type section
        0x01, 0x01, 0x00, // duplicate empty type section
    ];
    let err = decode(&bytes, &decoder_cfg()).unwrap_err();
    assert!(matches!(
        err.code(),
        ErrorCode::DuplicateSection | ErrorCode::InvalidSectionOrder
    ));
}

/// S7: over-long LEB128 used as a count (six continuation bytes before
/// a terminator, decoding a u32 vector count).
#[test]
fn s7_over_long_leb128() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x01, 0x08, // type section, 8 bytes
        0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00, // over-long count
        0x00,
    ];
    let err = decode(&bytes, &decoder_cfg()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidLEB128Encoding);
}

/// Multi-value: a function returning two results.
#[test]
fn multi_value_function_returns_two_results() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x01, 0x06, 0x01, 0x60, 0x00, 0x02, 0x7F, 0x7F, // type: [] -> [i32, i32]
        0x03, 0x02, 0x01, 0x00,
        0x0A, 0x08, 0x01, 0x06, 0x00, 0x41, 0x01, 0x41, 0x02, 0x0B,
    ];
    let module = decode_and_validate(&bytes).unwrap();
    assert_eq!(module.function_type(0).unwrap().results.len(), 2);
}

/// Reference types: a `funcref` table with default min/max limits.
#[test]
fn reference_types_funcref_table() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x04, 0x04, 0x01, 0x70, 0x00, 0x01, // table section: funcref, min=1
    ];
    let module = decode_and_validate(&bytes).unwrap();
    assert_eq!(module.total_table_count(), 1);
}

/// Bulk memory: `memory.copy` guarded by a data-count section.
#[test]
fn bulk_memory_copy_with_data_count() {
    let bytes = [
        0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
        0x01, 0x04, 0x01, 0x60, 0x00, 0x00, // type: [] -> []
        0x03, 0x02, 0x01, 0x00, // func
        0x05, 0x03, 0x01, 0x00, 0x01, // memory section: min=1
        0x0C, 0x01, 0x00, // data-count section: 0
        0x0A, 0x0E, 0x01, 0x0C, 0x00,
        0x41, 0x00, 0x41, 0x00, 0x41, 0x00, 0xFC, 0x0A, 0x00, 0x00, 0x0B,
    ];
    let module = decode_and_validate(&bytes).unwrap();
    assert_eq!(module.data_count, Some(0));
}
