//! Decodes a WebAssembly binary into a [`Module`], then validates it.
//!
//! The two phases are deliberately separate, mirroring
//! `fuel-tx::transaction`'s split between building a `Transaction` and
//! running `Checkable::check` over it: [`decode`] only rejects malformed
//! *binary*, [`validate_module`] only rejects *ill-typed* modules. A
//! `Module` that decoded successfully is always a structurally valid
//! aggregate of sections; it is not yet known to type-check.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod decode;
pub mod module;
pub mod validate;

pub use decode::decode;
pub use module::{
    CustomSection, Data, DecoderConfig, Element, ElementItems, Export, ExternalKind, Function,
    Global, Import, ImportKind, Module, Producers, SectionId, SegmentMode,
};
pub use validate::{validate_module, ValidatorConfig};
