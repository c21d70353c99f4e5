//! A bounds-checked cursor over Wasm module bytes.
//!
//! Grounded on `fuel-asm`'s `pack`/`unpack`/`conv` trio of small,
//! stateless byte-slice functions, generalized from "unpack one fixed
//! 4-byte instruction" to "walk a byte slice of unknown total
//! structure, one bounds-checked primitive at a time". [`Reader`] owns
//! no allocation and never panics on short input; every method returns
//! [`wasm_types::Result`].
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod reader;

pub use reader::Reader;
