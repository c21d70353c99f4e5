//! Value kinds, IEEE-754 conversions, and the error taxonomy shared by
//! every crate in the wasm-core workspace.
//!
//! This crate has no knowledge of the binary format or of module
//! structure; it only knows about the seven Wasm value kinds and the
//! primitives ([`Error`], [`Result`], endianness) that the reader,
//! decoder and validator all build on.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod arith;
pub mod conv;
pub mod endian;
pub mod error;
pub mod value;

pub use error::{Error, ErrorCode, Location, Result};
pub use value::{
    FuncType,
    GlobalType,
    Limits,
    MemoryType,
    Mutability,
    TableType,
    Value,
    ValueKind,
};

/// Page size for Wasm linear memory, fixed by the Core Spec.
pub const PAGE_SIZE: u32 = 65_536;

/// The largest number of pages a memory may ever declare (`min`, and
/// `max` if present, per §3 of the spec).
pub const MAX_MEMORY_PAGES: u32 = PAGE_SIZE;
