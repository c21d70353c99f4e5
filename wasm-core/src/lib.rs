//! The portable WebAssembly toolkit core: decode a binary module, then
//! validate it.
//!
//! This crate is the facade over [`wasm_types`], [`wasm_reader`] and
//! [`wasm_module`] — most callers only need [`decode_and_validate`].
//! Grounded on `fuel-vm`'s top-level `lib.rs`, which re-exports its
//! sibling crates' public types and layers a handful of top-level
//! convenience functions over `fuel-tx`'s `IntoChecked`/`Checkable`
//! split (build, then check); here that split is decode, then
//! validate.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub use wasm_module::{
    decode,
    validate_module,
    CustomSection,
    Data,
    DecoderConfig,
    Element,
    ElementItems,
    Export,
    ExternalKind,
    Function,
    Global,
    Import,
    ImportKind,
    Module,
    Producers,
    SectionId,
    SegmentMode,
    ValidatorConfig,
};
pub use wasm_types::{
    arith,
    conv,
    endian,
    error,
    Error,
    ErrorCode,
    FuncType,
    GlobalType,
    Limits,
    Location,
    MemoryType,
    Mutability,
    Result,
    TableType,
    Value,
    ValueKind,
};

/// Decode a module, then validate it, using default resource limits.
///
/// This is the one-call entry point most embedders want. Call
/// [`decode`]/[`validate_module`] directly with a non-default
/// [`DecoderConfig`]/[`ValidatorConfig`] when the host has tighter
/// resource caps (see `SPEC_FULL.md` §5).
#[cfg(feature = "alloc")]
pub fn decode_and_validate(bytes: &[u8]) -> Result<Module> {
    decode_and_validate_with(bytes, &DecoderConfig::default(), &ValidatorConfig::default())
}

/// Decode and validate a module with explicit resource limits.
#[cfg(feature = "alloc")]
pub fn decode_and_validate_with(
    bytes: &[u8],
    decoder_cfg: &DecoderConfig,
    validator_cfg: &ValidatorConfig,
) -> Result<Module> {
    let module = decode(bytes, decoder_cfg)?;
    validate_module(&module, validator_cfg)?;
    Ok(module)
}

/// Alias for [`decode`], for callers who think in "parse" terms.
#[cfg(feature = "alloc")]
pub fn parse(bytes: &[u8], cfg: &DecoderConfig) -> Result<Module> {
    decode(bytes, cfg)
}

/// Alias for [`decode_and_validate_with`].
#[cfg(feature = "alloc")]
pub fn parse_and_validate(
    bytes: &[u8],
    decoder_cfg: &DecoderConfig,
    validator_cfg: &ValidatorConfig,
) -> Result<Module> {
    decode_and_validate_with(bytes, decoder_cfg, validator_cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module_bytes() -> alloc::vec::Vec<u8> {
        alloc::vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00]
    }

    #[test]
    fn decode_and_validate_accepts_the_empty_module() {
        let module = decode_and_validate(&empty_module_bytes()).unwrap();
        assert_eq!(module.total_function_count(), 0);
    }

    #[test]
    fn decode_and_validate_rejects_bad_magic() {
        let mut bytes = empty_module_bytes();
        bytes[0] = 0xFF;
        let err = decode_and_validate(&bytes).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidMagicNumber);
    }

    #[test]
    fn parse_and_validate_is_an_alias() {
        let bytes = empty_module_bytes();
        let via_alias =
            parse_and_validate(&bytes, &DecoderConfig::default(), &ValidatorConfig::default())
                .unwrap();
        let via_direct = decode_and_validate(&bytes).unwrap();
        assert_eq!(via_alias, via_direct);
    }
}
