//! The decoded module aggregate and its constituent types.
//!
//! Grounded on `fuel-tx::transaction`'s module, which owns a `Vec` of
//! typed entries per logical group — exactly the section-vector-of-
//! entries shape the Wasm binary format uses — and on
//! `fuel-tx::transaction::repr::TransactionRepr` for the byte-tag
//! enum/`TryFrom<u8>` dispatch pattern, generalized here to
//! [`SectionId`].

#[cfg(feature = "alloc")]
use alloc::{boxed::Box, string::String, vec::Vec};

use wasm_types::{FuncType, GlobalType, Limits, MemoryType, TableType, ValueKind};

/// A known section id. Custom sections (id `0`) are handled separately
/// since they carry no ordering constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
    DataCount = 12,
}

impl TryFrom<u8> for SectionId {
    type Error = wasm_types::Error;

    fn try_from(byte: u8) -> wasm_types::Result<Self> {
        match byte {
            0 => Ok(Self::Custom),
            1 => Ok(Self::Type),
            2 => Ok(Self::Import),
            3 => Ok(Self::Function),
            4 => Ok(Self::Table),
            5 => Ok(Self::Memory),
            6 => Ok(Self::Global),
            7 => Ok(Self::Export),
            8 => Ok(Self::Start),
            9 => Ok(Self::Element),
            10 => Ok(Self::Code),
            11 => Ok(Self::Data),
            12 => Ok(Self::DataCount),
            _ => Err(wasm_types::error::Error::new(
                wasm_types::ErrorCode::InvalidSectionId,
                "section id is not one of 0..=12",
            )),
        }
    }
}

/// What kind of entity an import or export names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalKind {
    Func,
    Table,
    Memory,
    Global,
}

impl ExternalKind {
    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Func),
            0x01 => Some(Self::Table),
            0x02 => Some(Self::Memory),
            0x03 => Some(Self::Global),
            _ => None,
        }
    }
}

/// The kind-specific descriptor carried by an [`Import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Func(u32),
    Table(TableType),
    Memory(MemoryType),
    Global(GlobalType),
}

impl ImportKind {
    /// The [`ExternalKind`] this import descriptor belongs to.
    #[must_use]
    pub const fn external_kind(&self) -> ExternalKind {
        match self {
            Self::Func(_) => ExternalKind::Func,
            Self::Table(_) => ExternalKind::Table,
            Self::Memory(_) => ExternalKind::Memory,
            Self::Global(_) => ExternalKind::Global,
        }
    }
}

/// A two-level-named import with a kind-specific descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    #[cfg(feature = "alloc")]
    pub module: String,
    #[cfg(feature = "alloc")]
    pub field: String,
    pub kind: ImportKind,
}

/// A named export resolving into the merged index space of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    #[cfg(feature = "alloc")]
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

/// A global definition: its type, and its initializer as raw
/// constant-expression bytes (validated later, see `validate::F2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    pub ty: GlobalType,
    #[cfg(feature = "alloc")]
    pub init: Box<[u8]>,
}

/// A defined function: its signature, locals, and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub type_index: u32,
    #[cfg(feature = "alloc")]
    pub locals: Vec<ValueKind>,
    #[cfg(feature = "alloc")]
    pub body: Box<[u8]>,
    /// The absolute byte offset of `body`'s first byte in the original
    /// module, used to report instruction-level errors precisely.
    pub body_offset: usize,
}

/// How an element or data segment is realized at instantiation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentMode {
    Active {
        index: u32,
        #[cfg(feature = "alloc")]
        offset: Box<[u8]>,
    },
    Passive,
    Declarative,
}

/// The payload of an element segment: either the MVP form (bare
/// function indices) or the bulk-memory form (constant expressions,
/// each producing a reference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementItems {
    #[cfg(feature = "alloc")]
    FuncIndices(Vec<u32>),
    #[cfg(feature = "alloc")]
    Exprs(Vec<Box<[u8]>>),
}

/// An element segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub mode: SegmentMode,
    /// The reference kind carried by this segment (`funcref` or
    /// `externref`).
    pub kind: ValueKind,
    pub items: ElementItems,
}

/// A data segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub mode: SegmentMode,
    #[cfg(feature = "alloc")]
    pub bytes: Box<[u8]>,
}

/// An unrecognized section, retained verbatim unless the caller
/// configures the decoder to drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    #[cfg(feature = "alloc")]
    pub name: String,
    #[cfg(feature = "alloc")]
    pub data: Box<[u8]>,
}

/// Best-effort metadata parsed from a `"producers"` custom section.
/// Never validated, never affects accept/reject.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Producers {
    #[cfg(feature = "alloc")]
    pub language: Vec<(String, String)>,
    #[cfg(feature = "alloc")]
    pub processed_by: Vec<(String, String)>,
    #[cfg(feature = "alloc")]
    pub sdk: Vec<(String, String)>,
}

/// A fully decoded WebAssembly module. Immutable once constructed;
/// constructing one is the decoder's only job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    #[cfg(feature = "alloc")]
    pub types: Vec<FuncType>,
    #[cfg(feature = "alloc")]
    pub imports: Vec<Import>,
    #[cfg(feature = "alloc")]
    pub tables: Vec<TableType>,
    #[cfg(feature = "alloc")]
    pub memories: Vec<MemoryType>,
    #[cfg(feature = "alloc")]
    pub globals: Vec<Global>,
    #[cfg(feature = "alloc")]
    pub exports: Vec<Export>,
    pub start: Option<u32>,
    #[cfg(feature = "alloc")]
    pub elements: Vec<Element>,
    #[cfg(feature = "alloc")]
    pub functions: Vec<Function>,
    #[cfg(feature = "alloc")]
    pub data: Vec<Data>,
    pub data_count: Option<u32>,
    #[cfg(feature = "alloc")]
    pub custom_sections: Vec<CustomSection>,
    #[cfg(feature = "alloc")]
    pub name: Option<String>,
    pub producers: Producers,
}

impl Module {
    /// The type of the function at `func_index` in the merged
    /// imported+defined function index space, or `None` if out of
    /// range.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn function_type(&self, func_index: u32) -> Option<&FuncType> {
        let imported_func_count = self
            .imports
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Func(_)))
            .count() as u32;
        if func_index < imported_func_count {
            let type_index = self
                .imports
                .iter()
                .filter_map(|i| match &i.kind {
                    ImportKind::Func(idx) => Some(*idx),
                    _ => None,
                })
                .nth(func_index as usize)?;
            self.types.get(type_index as usize)
        } else {
            let defined = self
                .functions
                .get((func_index - imported_func_count) as usize)?;
            self.types.get(defined.type_index as usize)
        }
    }

    /// The total number of functions in the merged index space
    /// (imported + defined).
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn total_function_count(&self) -> u32 {
        let imported = self
            .imports
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Func(_)))
            .count() as u32;
        imported + self.functions.len() as u32
    }

    /// The total number of tables in the merged index space.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn total_table_count(&self) -> u32 {
        let imported = self
            .imports
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Table(_)))
            .count() as u32;
        imported + self.tables.len() as u32
    }

    /// The total number of memories in the merged index space.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn total_memory_count(&self) -> u32 {
        let imported = self
            .imports
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Memory(_)))
            .count() as u32;
        imported + self.memories.len() as u32
    }

    /// The total number of globals in the merged index space.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn total_global_count(&self) -> u32 {
        let imported = self
            .imports
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Global(_)))
            .count() as u32;
        imported + self.globals.len() as u32
    }

    /// The type of the global at `global_index`, and whether it is
    /// immutable, in the merged index space.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn global_type(&self, global_index: u32) -> Option<GlobalType> {
        let imported_globals: Vec<GlobalType> = self
            .imports
            .iter()
            .filter_map(|i| match &i.kind {
                ImportKind::Global(ty) => Some(*ty),
                _ => None,
            })
            .collect();
        if (global_index as usize) < imported_globals.len() {
            Some(imported_globals[global_index as usize])
        } else {
            self.globals
                .get(global_index as usize - imported_globals.len())
                .map(|g| g.ty)
        }
    }
}

/// Soft caps on decoded sizes (`spec.md` §4.E.5), and whether to retain
/// custom sections verbatim (§5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub retain_custom_sections: bool,
    pub max_section_bytes: u32,
    pub max_module_bytes: u32,
    pub max_function_body_bytes: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            retain_custom_sections: true,
            max_section_bytes: 16 * 1024 * 1024,
            max_module_bytes: 256 * 1024 * 1024,
            max_function_body_bytes: 1024 * 1024,
        }
    }
}
