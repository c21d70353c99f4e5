//! Categorized error codes and the fallible-operation carrier.
//!
//! Grounded on `fuel-types::error` (an `Error` with a `Result<T, E =
//! Error>` alias) and on `fuel-asm::panic_reason` (a categorized
//! `#[repr] enum` with manual `Display`). `Error`'s `Display` is
//! written by hand rather than derived, since its offset/function-index
//! formatting depends on runtime state a derive macro can't see; `std::
//! error::Error` is implemented only under the `std` feature, since
//! that trait isn't available in `core` at this crate's MSRV. The core
//! never panics or raises on malformed input; every fallible operation
//! returns [`Result`].

#[cfg(feature = "alloc")]
use alloc::{
    borrow::Cow,
    string::String,
};
use core::fmt;

/// Categorized error codes, organised by top nibble.
///
/// The numbering is a stable external contract (see `spec.md` §7): binary
/// format errors occupy `0x1xxx`, validation `0x2xxx`, memory `0x3xxx`,
/// instruction-level `0x4xxx`, module-level `0x5xxx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[repr(u32)]
pub enum ErrorCode {
    // Binary format (0x1000-0x1FFF)
    /// Module did not start with `\0asm`.
    InvalidMagicNumber = 0x1000,
    /// Module version is not `1`.
    InvalidVersion = 0x1001,
    /// A section id byte was not one of 0..=12.
    InvalidSectionId = 0x1002,
    /// The input ended before a read could be completed.
    UnexpectedEndOfFile = 0x1003,
    /// A LEB128 value used too many bytes, or had non-zero high bits on
    /// its terminating byte.
    InvalidLEB128Encoding = 0x1004,
    /// A name was not valid UTF-8.
    InvalidUTF8Sequence = 0x1005,
    /// A section's declared payload length did not match its contents.
    SectionTooLarge = 0x1006,
    /// A known section id appeared more than once.
    DuplicateSection = 0x1007,
    /// A section header was truncated before its length could be read.
    MissingSectionSize = 0x1008,
    /// Known sections did not appear in strictly ascending id order.
    InvalidSectionOrder = 0x1009,

    // Validation (0x2000-0x2FFF)
    /// An instruction's operand kind did not match what was expected.
    TypeMismatch = 0x2000,
    /// An instruction popped from an empty, non-polymorphic stack.
    StackUnderflow = 0x2001,
    /// The operand or label stack exceeded its configured depth cap.
    StackOverflow = 0x2002,
    /// An opcode byte did not match any known instruction.
    UnknownOpcode = 0x2003,
    /// A type index was out of range.
    InvalidTypeIndex = 0x2004,
    /// A function index was out of range.
    InvalidFunctionIndex = 0x2005,
    /// A table index was out of range.
    InvalidTableIndex = 0x2006,
    /// A memory index was out of range.
    InvalidMemoryIndex = 0x2007,
    /// A global index was out of range.
    InvalidGlobalIndex = 0x2008,
    /// A local index was out of range.
    InvalidLocalIndex = 0x2009,
    /// A branch target depth exceeded the current label stack.
    InvalidBranchTarget = 0x200A,
    /// Code after an unconditional trap was inconsistent with the
    /// enclosing label (polymorphic stack rules were violated).
    UnreachableCode = 0x200B,
    /// A constant expression was not one of the permitted forms.
    InvalidConstantExpression = 0x200C,
    /// A control/operand stack exceeded the configured depth cap.
    ValidationStackTooDeep = 0x200D,

    // Arithmetic traps (0x2010-0x201F), nested in the validation
    // category since the Core Spec defines them as runtime traps, not
    // a distinct top-level class.
    /// Integer division or remainder with a zero divisor.
    IntegerDivideByZero = 0x2010,
    /// Signed division overflow (`MIN / -1`).
    IntegerOverflow = 0x2011,

    // Memory (0x3000-0x3FFF)
    /// Allocation failed while building the decoded module.
    OutOfMemory = 0x3000,
    /// A memory instruction's alignment hint exceeded the natural width.
    InvalidAlignment = 0x3001,
    /// A statically-known memory access fell outside the declared bounds.
    OutOfBounds = 0x3002,
    /// A declared size or offset violates memory safety invariants.
    MemoryAccessViolation = 0x3003,
    /// A memory's limits were not well-formed.
    InvalidMemorySize = 0x3004,
    /// A memory's limits exceed this implementation's configured cap.
    MemoryLimitExceeded = 0x3005,

    // Instruction-level (0x4000-0x4FFF)
    /// An instruction's byte encoding was malformed.
    InvalidInstruction = 0x4000,
    /// An instruction's immediate operand was malformed.
    InvalidImmediate = 0x4001,
    /// The opcode belongs to a proposal this core does not accept (see
    /// `spec.md` §6.2).
    UnsupportedInstruction = 0x4002,
    /// An instruction sequence violated a structural rule (e.g. missing
    /// `end`).
    InstructionSequenceError = 0x4003,

    // Module-level (0x5000-0x5FFF)
    /// The decoded module failed a module-level well-formedness check.
    InvalidModule = 0x5000,
    /// A section required by context (e.g. data-count before
    /// `memory.init`) was absent.
    MissingRequiredSection = 0x5001,
    /// Reserved for future use; no cycle-detection rule exists in the
    /// Core Spec today.
    CircularDependency = 0x5002,
    /// An export name was not unique, or resolved to nothing.
    DuplicateExport = 0x5003,
    /// An import could not be resolved against the merged index space.
    ImportResolutionFailed = 0x5004,
    /// The start function's signature was not `() -> ()`.
    InvalidStartFunction = 0x5005,
}

impl ErrorCode {
    /// The top-nibble category this code belongs to.
    #[must_use]
    pub const fn category(self) -> u32 {
        (self as u32) & 0xF000
    }

    /// `true` if this is a `0x1xxx` binary-format error.
    #[must_use]
    pub const fn is_binary_error(self) -> bool {
        self.category() == 0x1000
    }

    /// `true` if this is a `0x2xxx` validation error.
    #[must_use]
    pub const fn is_validation_error(self) -> bool {
        self.category() == 0x2000
    }

    /// `true` if this is a `0x3xxx` memory error.
    #[must_use]
    pub const fn is_memory_error(self) -> bool {
        self.category() == 0x3000
    }

    /// `true` if this is a `0x4xxx` instruction-level error.
    #[must_use]
    pub const fn is_instruction_error(self) -> bool {
        self.category() == 0x4000
    }

    /// `true` if this is a `0x5xxx` module-level error.
    #[must_use]
    pub const fn is_module_error(self) -> bool {
        self.category() == 0x5000
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Where, in the input stream or in a function body, an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Byte offset into the original module bytes.
    pub offset: usize,
    /// The function whose body was being checked, if any.
    pub function_index: Option<u32>,
}

impl Location {
    /// A location with only a byte offset, outside any function body.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            offset,
            function_index: None,
        }
    }

    /// A location inside a specific function body.
    #[must_use]
    pub const fn in_function(function_index: u32, offset: usize) -> Self {
        Self {
            offset,
            function_index: Some(function_index),
        }
    }
}

/// A categorised, location-bearing error.
///
/// This is the sole fallibility mechanism in the workspace: the decoder
/// and validator never panic on malformed input, they return `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    #[cfg(feature = "alloc")]
    message: Cow<'static, str>,
    #[cfg(not(feature = "alloc"))]
    message: &'static str,
    location: Option<Location>,
}

impl Error {
    /// Build an error with a `'static` message and no location.
    #[must_use]
    pub const fn new(code: ErrorCode, message: &'static str) -> Self {
        Self {
            code,
            #[cfg(feature = "alloc")]
            message: Cow::Borrowed(message),
            #[cfg(not(feature = "alloc"))]
            message,
            location: None,
        }
    }

    /// Attach a location to this error, replacing any prior one.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Build an error with an owned, formatted message.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn with_message(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message: Cow::Owned(message),
            location: None,
        }
    }

    /// The categorised error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The byte offset / function index this error was raised at, if any.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location {
                offset,
                function_index: Some(func),
            }) => write!(
                f,
                "{} at offset {offset} (function {func}): {}",
                self.code, self.message
            ),
            Some(Location {
                offset,
                function_index: None,
            }) => write!(f, "{} at offset {offset}: {}", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The result type used throughout the workspace.
pub type Result<T> = core::result::Result<T, Error>;

/// Construct an `Err(Error)` and emit a `tracing::debug!` event for it.
///
/// Malformed input is routine for a decoder, not exceptional, so this
/// logs at `debug` rather than `warn`/`error` (see `SPEC_FULL.md` §4.B).
pub fn reject<T>(code: ErrorCode, message: &'static str, location: Location) -> Result<T> {
    tracing::debug!(code = ?code, offset = location.offset, "rejecting input: {message}");
    Err(Error::new(code, message).at(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_masks_top_nibble() {
        assert_eq!(ErrorCode::InvalidMagicNumber.category(), 0x1000);
        assert_eq!(ErrorCode::TypeMismatch.category(), 0x2000);
        assert_eq!(ErrorCode::OutOfBounds.category(), 0x3000);
        assert_eq!(ErrorCode::UnsupportedInstruction.category(), 0x4000);
        assert_eq!(ErrorCode::InvalidStartFunction.category(), 0x5000);
    }

    #[test]
    fn predicates_agree_with_category() {
        assert!(ErrorCode::InvalidLEB128Encoding.is_binary_error());
        assert!(ErrorCode::StackUnderflow.is_validation_error());
        assert!(ErrorCode::InvalidAlignment.is_memory_error());
        assert!(ErrorCode::UnknownOpcode.is_validation_error());
        assert!(ErrorCode::DuplicateExport.is_module_error());
    }

    #[test]
    fn display_includes_location_when_present() {
        let err = Error::new(ErrorCode::InvalidMagicNumber, "bad magic").at(Location::at(0));
        assert_eq!(err.to_string(), "InvalidMagicNumber at offset 0: bad magic");

        let err = Error::new(ErrorCode::TypeMismatch, "bad type")
            .at(Location::in_function(3, 42));
        assert_eq!(
            err.to_string(),
            "TypeMismatch at offset 42 (function 3): bad type"
        );
    }
}
