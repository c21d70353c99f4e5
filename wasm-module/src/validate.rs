//! The stack-polymorphic per-function validator, plus module-level
//! well-formedness checks.
//!
//! Grounded on `fuel-tx::transaction::checkable`'s `Checkable` trait (a
//! `check` method that runs sub-checks in sequence, short-circuiting
//! with `?`) and `fuel-tx::transaction::validity`'s `ValidityError`
//! enumeration style (every rule named, carrying the context needed to
//! report it precisely). Here the carrier is `wasm_types::Error`
//! directly rather than a parallel enum, since it already carries a
//! category code, message, and location.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use wasm_reader::Reader;
use wasm_types::error::{Error, Location};
use wasm_types::{ErrorCode, Result, ValueKind};

use crate::module::{ElementItems, ExternalKind, ImportKind, Module, SegmentMode};

/// Resource bounds for the per-function body checker (`spec.md` §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub max_operand_stack_depth: usize,
    pub max_label_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_operand_stack_depth: 1024,
            max_label_depth: 64,
        }
    }
}

/// Run every module-level check (F.2) then validate every function body
/// (F.1), short-circuiting on the first failure.
#[cfg(feature = "alloc")]
pub fn validate_module(module: &Module, cfg: &ValidatorConfig) -> Result<()> {
    check_function_type_indices(module)?;
    check_export_uniqueness_and_targets(module)?;
    check_start_function(module)?;
    check_limits(module)?;
    check_single_memory_and_table(module)?;
    let has_data_count = module.data_count.is_some();
    check_data_count_consistency(module)?;
    check_global_initializers(module)?;
    check_element_segments(module)?;
    check_data_segments(module)?;

    for (i, func) in module.functions.iter().enumerate() {
        let func_index = module.total_function_count() - module.functions.len() as u32 + i as u32;
        validate_function(module, func_index, cfg, has_data_count)?;
    }
    Ok(())
}

fn module_err(code: ErrorCode, message: &'static str) -> Error {
    Error::new(code, message).at(Location::at(0))
}

#[cfg(feature = "alloc")]
fn check_function_type_indices(module: &Module) -> Result<()> {
    for func in &module.functions {
        if module.types.get(func.type_index as usize).is_none() {
            return Err(module_err(ErrorCode::InvalidTypeIndex, "function type index out of range"));
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_export_uniqueness_and_targets(module: &Module) -> Result<()> {
    for (i, export) in module.exports.iter().enumerate() {
        if module.exports[..i].iter().any(|e| e.name == export.name) {
            return Err(module_err(ErrorCode::DuplicateExport, "export name is not unique"));
        }
        let in_range = match export.kind {
            ExternalKind::Func => export.index < module.total_function_count(),
            ExternalKind::Table => export.index < module.total_table_count(),
            ExternalKind::Memory => export.index < module.total_memory_count(),
            ExternalKind::Global => export.index < module.total_global_count(),
        };
        if !in_range {
            return Err(module_err(
                ErrorCode::ImportResolutionFailed,
                "export index does not resolve in its kind's index space",
            ));
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_start_function(module: &Module) -> Result<()> {
    let Some(start) = module.start else {
        return Ok(());
    };
    let ty = module
        .function_type(start)
        .ok_or_else(|| module_err(ErrorCode::InvalidFunctionIndex, "start function index out of range"))?;
    if !ty.params.is_empty() || !ty.results.is_empty() {
        return Err(module_err(ErrorCode::InvalidStartFunction, "start function must be () -> ()"));
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_limits(module: &Module) -> Result<()> {
    for table in &module.tables {
        if !table.limits.is_well_formed() {
            return Err(module_err(ErrorCode::InvalidMemorySize, "table limits max < min"));
        }
    }
    for memory in &module.memories {
        if !memory.limits.is_well_formed() {
            return Err(module_err(ErrorCode::InvalidMemorySize, "memory limits max < min"));
        }
        if !memory.is_within_page_cap() {
            return Err(module_err(ErrorCode::MemoryLimitExceeded, "memory limits exceed 65,536 pages"));
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_single_memory_and_table(module: &Module) -> Result<()> {
    if module.total_memory_count() > 1 {
        return Err(module_err(
            ErrorCode::InvalidModule,
            "at most one memory is permitted in an MVP module",
        ));
    }
    if module.total_table_count() > 1 {
        return Err(module_err(
            ErrorCode::InvalidModule,
            "at most one table is permitted in an MVP module",
        ));
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_data_count_consistency(module: &Module) -> Result<()> {
    if let Some(count) = module.data_count {
        if count as usize != module.data.len() {
            return Err(module_err(
                ErrorCode::InvalidModule,
                "data-count section does not match data section length",
            ));
        }
    }
    Ok(())
}

/// Validate a constant-expression byte sequence, requiring it to
/// produce exactly `expected` and (for `global.get`) to reference only
/// imported, immutable globals.
#[cfg(feature = "alloc")]
fn check_const_expr(module: &Module, bytes: &[u8], expected: ValueKind) -> Result<()> {
    let mut r = Reader::new(bytes);
    let op = r.read_u8()?;
    let produced = match op {
        0x41 => {
            r.read_sleb128_i32()?;
            ValueKind::I32
        }
        0x42 => {
            r.read_sleb128_i64()?;
            ValueKind::I64
        }
        0x43 => {
            r.read_f32_le()?;
            ValueKind::F32
        }
        0x44 => {
            r.read_f64_le()?;
            ValueKind::F64
        }
        0x23 => {
            let idx = r.read_uleb128_u32()?;
            let imported_globals = module
                .imports
                .iter()
                .filter_map(|i| match &i.kind {
                    ImportKind::Global(ty) => Some(*ty),
                    _ => None,
                })
                .count() as u32;
            if idx >= imported_globals {
                return Err(module_err(
                    ErrorCode::InvalidConstantExpression,
                    "global.get in a constant expression must reference an imported global",
                ));
            }
            let ty = module
                .global_type(idx)
                .ok_or_else(|| module_err(ErrorCode::InvalidGlobalIndex, "global index out of range"))?;
            if ty.mutability != wasm_types::Mutability::Const {
                return Err(module_err(
                    ErrorCode::InvalidConstantExpression,
                    "global.get in a constant expression must reference an immutable global",
                ));
            }
            ty.value_kind
        }
        0xD0 => {
            let reftype = r.read_u8()?;
            ValueKind::from_tag_byte(reftype)
                .filter(|k| k.is_reference())
                .ok_or_else(|| module_err(ErrorCode::InvalidConstantExpression, "ref.null needs a reference type"))?
        }
        0xD2 => {
            r.read_uleb128_u32()?;
            ValueKind::FuncRef
        }
        _ => {
            return Err(module_err(
                ErrorCode::InvalidConstantExpression,
                "opcode not permitted in a constant expression",
            ))
        }
    };
    if produced != expected {
        return Err(module_err(ErrorCode::TypeMismatch, "constant expression produced the wrong kind"));
    }
    let end = r.read_u8()?;
    if end != 0x0B || !r.is_empty() {
        return Err(module_err(
            ErrorCode::InvalidConstantExpression,
            "constant expression must contain exactly one instruction before end",
        ));
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_global_initializers(module: &Module) -> Result<()> {
    for global in &module.globals {
        check_const_expr(module, &global.init, global.ty.value_kind)?;
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_element_segments(module: &Module) -> Result<()> {
    for element in &module.elements {
        if let SegmentMode::Active { index, offset } = &element.mode {
            if *index >= module.total_table_count() {
                return Err(module_err(ErrorCode::InvalidTableIndex, "active element targets unknown table"));
            }
            check_const_expr(module, offset, ValueKind::I32)?;
        }
        match &element.items {
            ElementItems::FuncIndices(indices) => {
                for idx in indices {
                    if *idx >= module.total_function_count() {
                        return Err(module_err(ErrorCode::InvalidFunctionIndex, "element references unknown function"));
                    }
                }
            }
            ElementItems::Exprs(exprs) => {
                for expr in exprs {
                    check_const_expr(module, expr, element.kind)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn check_data_segments(module: &Module) -> Result<()> {
    for data in &module.data {
        if let SegmentMode::Active { index, offset } = &data.mode {
            if *index >= module.total_memory_count() {
                return Err(module_err(ErrorCode::InvalidMemoryIndex, "active data targets unknown memory"));
            }
            check_const_expr(module, offset, ValueKind::I32)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Block,
    Loop,
    If { has_else: bool },
    Function,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    #[cfg(feature = "alloc")]
    start_types: Vec<ValueKind>,
    #[cfg(feature = "alloc")]
    end_types: Vec<ValueKind>,
    height: usize,
    unreachable: bool,
}

/// The per-function body checker: an operand stack of abstract kinds
/// plus a stack of control frames, following the Core Spec's
/// stack-polymorphic validation algorithm.
struct Checker<'m> {
    module: &'m Module,
    func_index: u32,
    #[cfg(feature = "alloc")]
    locals: Vec<ValueKind>,
    #[cfg(feature = "alloc")]
    stack: Vec<ValueKind>,
    #[cfg(feature = "alloc")]
    frames: Vec<Frame>,
    cfg: ValidatorConfig,
    has_data_count: bool,
}

impl<'m> Checker<'m> {
    fn err_at(&self, code: ErrorCode, message: &'static str, offset: usize) -> Error {
        Error::new(code, message).at(Location::in_function(self.func_index, offset))
    }

    fn current_frame(&self) -> &Frame {
        self.frames.last().expect("function frame always present")
    }

    fn push(&mut self, kind: ValueKind) {
        self.stack.push(kind);
    }

    fn pop_expect(&mut self, kind: ValueKind, offset: usize) -> Result<()> {
        let frame_height = self.current_frame().height;
        let frame_unreachable = self.current_frame().unreachable;
        if self.stack.len() == frame_height {
            if frame_unreachable {
                return Ok(());
            }
            return Err(self.err_at(ErrorCode::StackUnderflow, "operand stack underflow", offset));
        }
        let top = self.stack.pop().expect("checked above");
        if top != kind {
            return Err(self.err_at(ErrorCode::TypeMismatch, "operand kind mismatch", offset));
        }
        Ok(())
    }

    fn pop_any(&mut self, offset: usize) -> Result<ValueKind> {
        let frame_height = self.current_frame().height;
        let frame_unreachable = self.current_frame().unreachable;
        if self.stack.len() == frame_height {
            if frame_unreachable {
                return Ok(ValueKind::Empty);
            }
            return Err(self.err_at(ErrorCode::StackUnderflow, "operand stack underflow", offset));
        }
        Ok(self.stack.pop().expect("checked above"))
    }

    fn pop_reference(&mut self, offset: usize) -> Result<ValueKind> {
        let kind = self.pop_any(offset)?;
        if kind != ValueKind::Empty && !kind.is_reference() {
            return Err(self.err_at(ErrorCode::TypeMismatch, "expected a reference type", offset));
        }
        Ok(kind)
    }

    fn set_unreachable(&mut self) {
        let frame = self.frames.last_mut().expect("function frame always present");
        frame.unreachable = true;
        let height = frame.height;
        self.stack.truncate(height);
    }

    fn push_ctrl(&mut self, kind: FrameKind, params: Vec<ValueKind>, results: Vec<ValueKind>, offset: usize) -> Result<()> {
        for p in params.iter().rev() {
            self.pop_expect(*p, offset)?;
        }
        if self.frames.len() >= self.cfg.max_label_depth {
            return Err(self.err_at(ErrorCode::ValidationStackTooDeep, "label depth exceeds configured cap", offset));
        }
        let height = self.stack.len();
        self.frames.push(Frame {
            kind,
            start_types: params.clone(),
            end_types: results,
            height,
            unreachable: false,
        });
        for p in &params {
            self.push(*p);
        }
        Ok(())
    }

    fn check_end_types(&mut self, offset: usize) -> Result<Vec<ValueKind>> {
        let frame = self.current_frame().clone();
        for t in frame.end_types.iter().rev() {
            self.pop_expect(*t, offset)?;
        }
        if self.stack.len() != frame.height && !frame.unreachable {
            return Err(self.err_at(ErrorCode::TypeMismatch, "extra values left on the operand stack", offset));
        }
        self.stack.truncate(frame.height);
        Ok(frame.end_types)
    }

    fn branch_frame(&self, depth: u32, offset: usize) -> Result<&Frame> {
        let len = self.frames.len();
        let idx = (depth as usize)
            .checked_add(1)
            .and_then(|d| len.checked_sub(d))
            .ok_or_else(|| self.err_at(ErrorCode::InvalidBranchTarget, "branch depth exceeds label stack", offset))?;
        self.frames.get(idx).ok_or_else(|| self.err_at(ErrorCode::InvalidBranchTarget, "branch depth exceeds label stack", offset))
    }

    fn branch_types(&self, depth: u32, offset: usize) -> Result<Vec<ValueKind>> {
        let frame = self.branch_frame(depth, offset)?;
        Ok(match frame.kind {
            FrameKind::Loop => frame.start_types.clone(),
            _ => frame.end_types.clone(),
        })
    }

    fn check_stack_depth(&self, offset: usize) -> Result<()> {
        if self.stack.len() > self.cfg.max_operand_stack_depth {
            return Err(self.err_at(ErrorCode::StackOverflow, "operand stack exceeds configured depth cap", offset));
        }
        Ok(())
    }
}

fn natural_align_log2(width_bytes: u32) -> u32 {
    width_bytes.trailing_zeros()
}

fn read_memarg(r: &mut Reader<'_>) -> Result<(u32, u32)> {
    let align = r.read_uleb128_u32()?;
    let offset = r.read_uleb128_u32()?;
    Ok((align, offset))
}

#[cfg(feature = "alloc")]
fn check_memory_access(checker: &Checker<'_>, r: &mut Reader<'_>, natural_width: u32, instr_offset: usize) -> Result<()> {
    let (align, _offset) = read_memarg(r)?;
    if align > natural_align_log2(natural_width) {
        return Err(checker.err_at(ErrorCode::InvalidAlignment, "alignment hint exceeds natural width", instr_offset));
    }
    if checker.module.total_memory_count() == 0 {
        return Err(checker.err_at(ErrorCode::InvalidMemoryIndex, "memory instruction with no declared memory", instr_offset));
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn decode_blocktype(module: &Module, r: &mut Reader<'_>) -> Result<(Vec<ValueKind>, Vec<ValueKind>)> {
    let byte = r.peek_u8()?;
    if byte == ValueKind::Empty.tag_byte() {
        r.read_u8()?;
        return Ok((Vec::new(), Vec::new()));
    }
    if let Some(kind) = ValueKind::from_tag_byte(byte) {
        if kind != ValueKind::Empty {
            r.read_u8()?;
            return Ok((Vec::new(), alloc::vec![kind]));
        }
    }
    let type_index = r.read_sleb128_i33()?;
    let ty = module
        .types
        .get(type_index as usize)
        .ok_or_else(|| Error::new(ErrorCode::InvalidTypeIndex, "block type index out of range").at(Location::at(r.offset())))?;
    Ok((ty.params.clone(), ty.results.clone()))
}

/// Classification of a `0xFD`-prefixed (`v128`) instruction's stack
/// effect. The Core Spec defines over 200 SIMD opcodes; since the
/// validator only needs to type-check them (`spec.md` §6.2: "v128 ...
/// as far as type-checking is concerned"), every one of them reduces
/// to one of a handful of shapes.
#[derive(Debug, Clone, Copy)]
enum SimdEffect {
    /// `(mem) -> v128`, e.g. the `v128.load*` family.
    Load,
    /// `(v128, mem) -> ()`, `v128.store`.
    Store,
    /// 16-byte immediate, `() -> v128`, `v128.const`.
    Const,
    /// `(v128, v128) -> v128`, most binary SIMD arithmetic/bitwise ops.
    Binary,
    /// `(v128) -> v128`, unary SIMD ops.
    Unary,
    /// `(v128, v128, v128) -> v128`, `v128.bitselect`.
    Ternary,
    /// `(v128) -> i32`, `*.all_true`/`*.bitmask`/`v128.any_true`.
    ReduceToI32,
    /// `(v128, i32) -> v128`, the shift family.
    Shift,
    /// lane splat: `(scalar) -> v128`, scalar kind given.
    Splat(ValueKind),
    /// lane extract: `(v128, u8 laneidx) -> scalar`.
    ExtractLane(ValueKind),
    /// lane replace: `(v128, scalar, u8 laneidx) -> v128`.
    ReplaceLane(ValueKind),
    /// `i8x16.shuffle`: 16-byte immediate, `(v128, v128) -> v128`.
    Shuffle,
}

fn simd_effect(sub: u32) -> SimdEffect {
    match sub {
        0..=10 => SimdEffect::Load,
        11 => SimdEffect::Store,
        12 => SimdEffect::Const,
        13 => SimdEffect::Shuffle,
        14 => SimdEffect::Binary, // i8x16.swizzle
        15 | 16 | 17 => SimdEffect::Splat(ValueKind::I32),
        18 => SimdEffect::Splat(ValueKind::I64),
        19 => SimdEffect::Splat(ValueKind::F32),
        20 => SimdEffect::Splat(ValueKind::F64),
        21 | 22 | 24 | 25 | 27 => SimdEffect::ExtractLane(ValueKind::I32),
        29 => SimdEffect::ExtractLane(ValueKind::I64),
        31 => SimdEffect::ExtractLane(ValueKind::F32),
        33 => SimdEffect::ExtractLane(ValueKind::F64),
        23 | 26 | 28 => SimdEffect::ReplaceLane(ValueKind::I32),
        30 => SimdEffect::ReplaceLane(ValueKind::I64),
        32 => SimdEffect::ReplaceLane(ValueKind::F32),
        34 => SimdEffect::ReplaceLane(ValueKind::F64),
        92 | 93 => SimdEffect::Load, // v128.load32_zero / v128.load64_zero
        // any_true / all_true / bitmask live scattered through the
        // arithmetic range; this core only needs a plausible default
        // since it never evaluates the result.
        _ if is_simd_reduce(sub) => SimdEffect::ReduceToI32,
        _ if is_simd_shift(sub) => SimdEffect::Shift,
        _ if is_simd_unary(sub) => SimdEffect::Unary,
        _ => SimdEffect::Binary,
    }
}

const fn is_simd_reduce(sub: u32) -> bool {
    matches!(sub, 65 | 66 | 67 | 78 | 79 | 80 | 97 | 98 | 99 | 130 | 131 | 132)
}

const fn is_simd_shift(sub: u32) -> bool {
    matches!(
        sub,
        107 | 108 | 109 | 137 | 138 | 139 | 140 | 141 | 142 | 150 | 151 | 152 | 161 | 162 | 163
    )
}

const fn is_simd_unary(sub: u32) -> bool {
    matches!(
        sub,
        // neg, abs, not, ceil/floor/trunc/nearest/sqrt, extend-family
        96 | 110 | 124 | 139 | 156
    ) || sub >= 225
}

#[cfg(feature = "alloc")]
fn handle_simd(checker: &mut Checker<'_>, r: &mut Reader<'_>, offset: usize) -> Result<()> {
    let sub = r.read_uleb128_u32()?;
    match simd_effect(sub) {
        SimdEffect::Load => {
            check_memory_access(checker, r, 16, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Store => {
            check_memory_access(checker, r, 16, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        SimdEffect::Const => {
            r.read_bytes(16)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Shuffle => {
            r.read_bytes(16)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Binary => {
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Unary => {
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Ternary => {
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::ReduceToI32 => {
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::I32);
        }
        SimdEffect::Shift => {
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::Splat(scalar) => {
            checker.pop_expect(scalar, offset)?;
            checker.push(ValueKind::V128);
        }
        SimdEffect::ExtractLane(scalar) => {
            r.read_u8()?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(scalar);
        }
        SimdEffect::ReplaceLane(scalar) => {
            r.read_u8()?;
            checker.pop_expect(scalar, offset)?;
            checker.pop_expect(ValueKind::V128, offset)?;
            checker.push(ValueKind::V128);
        }
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn handle_bulk_memory(checker: &mut Checker<'_>, r: &mut Reader<'_>, offset: usize) -> Result<()> {
    let sub = r.read_uleb128_u32()?;
    match sub {
        0 | 1 => {
            // i32.trunc_sat_f32_s / _u
            checker.pop_expect(ValueKind::F32, offset)?;
            checker.push(ValueKind::I32);
        }
        2 | 3 => {
            // i32.trunc_sat_f64_s / _u
            checker.pop_expect(ValueKind::F64, offset)?;
            checker.push(ValueKind::I32);
        }
        4 | 5 => {
            // i64.trunc_sat_f32_s / _u
            checker.pop_expect(ValueKind::F32, offset)?;
            checker.push(ValueKind::I64);
        }
        6 | 7 => {
            // i64.trunc_sat_f64_s / _u
            checker.pop_expect(ValueKind::F64, offset)?;
            checker.push(ValueKind::I64);
        }
        8 => {
            // memory.init dataidx
            r.read_uleb128_u32()?;
            r.read_u8()?; // reserved memory index
            if !checker.has_data_count {
                return Err(checker.err_at(
                    ErrorCode::MissingRequiredSection,
                    "memory.init requires a data-count section",
                    offset,
                ));
            }
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        9 => {
            // data.drop dataidx
            r.read_uleb128_u32()?;
            if !checker.has_data_count {
                return Err(checker.err_at(
                    ErrorCode::MissingRequiredSection,
                    "data.drop requires a data-count section",
                    offset,
                ));
            }
        }
        10 => {
            r.read_u8()?;
            r.read_u8()?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        11 => {
            r.read_u8()?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        12 => {
            r.read_uleb128_u32()?;
            r.read_uleb128_u32()?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        13 => {
            r.read_uleb128_u32()?;
        }
        14 => {
            r.read_uleb128_u32()?;
            r.read_uleb128_u32()?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        15 => {
            let table_index = r.read_uleb128_u32()?;
            let element = checker
                .module
                .tables
                .get(table_index as usize)
                .map_or(ValueKind::FuncRef, |t| t.element);
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(element, offset)?;
            checker.push(ValueKind::I32);
        }
        16 => {
            r.read_uleb128_u32()?;
            checker.push(ValueKind::I32);
        }
        17 => {
            let table_index = r.read_uleb128_u32()?;
            let element = checker
                .module
                .tables
                .get(table_index as usize)
                .map_or(ValueKind::FuncRef, |t| t.element);
            checker.pop_expect(ValueKind::I32, offset)?;
            checker.pop_expect(element, offset)?;
            checker.pop_expect(ValueKind::I32, offset)?;
        }
        _ => return Err(checker.err_at(ErrorCode::UnknownOpcode, "unknown 0xFC sub-opcode", offset)),
    }
    Ok(())
}

/// Validate one function body (F.1), against its declared signature
/// and locals.
#[cfg(feature = "alloc")]
pub fn validate_function(
    module: &Module,
    func_index: u32,
    cfg: &ValidatorConfig,
    has_data_count: bool,
) -> Result<()> {
    let imported_func_count = module.total_function_count() - module.functions.len() as u32;
    let func = &module.functions[(func_index - imported_func_count) as usize];
    let ty = module
        .types
        .get(func.type_index as usize)
        .ok_or_else(|| module_err(ErrorCode::InvalidTypeIndex, "function type index out of range"))?;

    let mut locals = ty.params.clone();
    locals.extend_from_slice(&func.locals);

    let mut checker = Checker {
        module,
        func_index,
        locals,
        stack: Vec::new(),
        frames: Vec::new(),
        cfg: *cfg,
        has_data_count,
    };
    checker.frames.push(Frame {
        kind: FrameKind::Function,
        start_types: ty.params.clone(),
        end_types: ty.results.clone(),
        height: 0,
        unreachable: false,
    });

    let mut r = Reader::new(&func.body);
    loop {
        if r.is_empty() {
            return Err(checker.err_at(
                ErrorCode::InstructionSequenceError,
                "function body ended without a matching end",
                func.body_offset + r.offset(),
            ));
        }
        let instr_offset = func.body_offset + r.offset();
        let opcode = r.read_u8()?;
        checker.check_stack_depth(instr_offset)?;

        match opcode {
            0x00 => checker.set_unreachable(),
            0x01 => {}
            0x02 => {
                let (params, results) = decode_blocktype(module, &mut r)?;
                checker.push_ctrl(FrameKind::Block, params, results, instr_offset)?;
            }
            0x03 => {
                let (params, results) = decode_blocktype(module, &mut r)?;
                checker.push_ctrl(FrameKind::Loop, params, results, instr_offset)?;
            }
            0x04 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                let (params, results) = decode_blocktype(module, &mut r)?;
                checker.push_ctrl(FrameKind::If { has_else: false }, params, results, instr_offset)?;
            }
            0x05 => {
                if !matches!(checker.current_frame().kind, FrameKind::If { .. }) {
                    return Err(checker.err_at(
                        ErrorCode::InstructionSequenceError,
                        "else without a matching if",
                        instr_offset,
                    ));
                }
                let end_types = checker.check_end_types(instr_offset)?;
                let frame = checker.frames.last_mut().expect("checked above");
                frame.kind = FrameKind::If { has_else: true };
                frame.unreachable = false;
                let start = frame.start_types.clone();
                let _ = end_types;
                for t in &start {
                    checker.push(*t);
                }
            }
            0x0B => {
                if matches!(checker.current_frame().kind, FrameKind::If { has_else: false }) {
                    let frame = checker.current_frame();
                    if frame.start_types != frame.end_types {
                        return Err(checker.err_at(
                            ErrorCode::TypeMismatch,
                            "if without else must not change the operand-stack signature",
                            instr_offset,
                        ));
                    }
                }
                let end_types = checker.check_end_types(instr_offset)?;
                let closed = checker.frames.pop().expect("checked above");
                if checker.frames.is_empty() {
                    if !r.is_empty() {
                        return Err(checker.err_at(
                            ErrorCode::InstructionSequenceError,
                            "bytes remain after the function's final end",
                            func.body_offset + r.offset(),
                        ));
                    }
                    let _ = closed;
                    break;
                }
                for t in &end_types {
                    checker.push(*t);
                }
            }
            0x0C => {
                let depth = r.read_uleb128_u32()?;
                let types = checker.branch_types(depth, instr_offset)?;
                for t in types.iter().rev() {
                    checker.pop_expect(*t, instr_offset)?;
                }
                checker.set_unreachable();
            }
            0x0D => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                let depth = r.read_uleb128_u32()?;
                let types = checker.branch_types(depth, instr_offset)?;
                for t in types.iter().rev() {
                    checker.pop_expect(*t, instr_offset)?;
                }
                for t in &types {
                    checker.push(*t);
                }
            }
            0x0E => {
                let targets = r.read_vec(|r| r.read_uleb128_u32())?;
                let default = r.read_uleb128_u32()?;
                let default_types = checker.branch_types(default, instr_offset)?;
                for target in &targets {
                    let types = checker.branch_types(*target, instr_offset)?;
                    if types.len() != default_types.len() {
                        return Err(checker.err_at(
                            ErrorCode::InvalidBranchTarget,
                            "br_table targets must share a common arity",
                            instr_offset,
                        ));
                    }
                }
                for t in default_types.iter().rev() {
                    checker.pop_expect(*t, instr_offset)?;
                }
                checker.set_unreachable();
            }
            0x0F => {
                let results = checker.frames[0].end_types.clone();
                for t in results.iter().rev() {
                    checker.pop_expect(*t, instr_offset)?;
                }
                checker.set_unreachable();
            }
            0x10 => {
                let idx = r.read_uleb128_u32()?;
                let ty = module
                    .function_type(idx)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidFunctionIndex, "call target out of range", instr_offset))?
                    .clone();
                for p in ty.params.iter().rev() {
                    checker.pop_expect(*p, instr_offset)?;
                }
                for r_ in &ty.results {
                    checker.push(*r_);
                }
            }
            0x11 => {
                let type_index = r.read_uleb128_u32()?;
                let table_index = r.read_uleb128_u32()?;
                if table_index >= module.total_table_count() {
                    return Err(checker.err_at(ErrorCode::InvalidTableIndex, "call_indirect table out of range", instr_offset));
                }
                let ty = module
                    .types
                    .get(type_index as usize)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidTypeIndex, "call_indirect type out of range", instr_offset))?
                    .clone();
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                for p in ty.params.iter().rev() {
                    checker.pop_expect(*p, instr_offset)?;
                }
                for r_ in &ty.results {
                    checker.push(*r_);
                }
            }
            0x06 | 0x07 | 0x08 | 0x09 | 0x12 | 0x13 | 0x18 | 0x19 => {
                return Err(checker.err_at(
                    ErrorCode::UnsupportedInstruction,
                    "exception-handling/tail-call opcodes are not part of the accepted feature set",
                    instr_offset,
                ));
            }
            0x1A => {
                checker.pop_any(instr_offset)?;
            }
            0x1B => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                let b = checker.pop_any(instr_offset)?;
                let a = checker.pop_any(instr_offset)?;
                if a != b || (a != ValueKind::Empty && !a.is_number() && !a.is_vector()) {
                    return Err(checker.err_at(
                        ErrorCode::TypeMismatch,
                        "untyped select requires two matching numeric/vector operands",
                        instr_offset,
                    ));
                }
                checker.push(a);
            }
            0x1C => {
                let types = r.read_vec(|r| {
                    let byte = r.read_u8()?;
                    ValueKind::from_tag_byte(byte).ok_or_else(|| {
                        Error::new(ErrorCode::InvalidModule, "not a value-kind tag byte").at(Location::at(r.offset() - 1))
                    })
                })?;
                let kind = *types
                    .first()
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidImmediate, "typed select needs exactly one result type", instr_offset))?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(kind, instr_offset)?;
                checker.pop_expect(kind, instr_offset)?;
                checker.push(kind);
            }
            0x20 => {
                let idx = r.read_uleb128_u32()?;
                let kind = *checker.locals.get(idx as usize).ok_or_else(|| {
                    checker.err_at(ErrorCode::InvalidLocalIndex, "local index out of range", instr_offset)
                })?;
                checker.push(kind);
            }
            0x21 => {
                let idx = r.read_uleb128_u32()?;
                let kind = *checker.locals.get(idx as usize).ok_or_else(|| {
                    checker.err_at(ErrorCode::InvalidLocalIndex, "local index out of range", instr_offset)
                })?;
                checker.pop_expect(kind, instr_offset)?;
            }
            0x22 => {
                let idx = r.read_uleb128_u32()?;
                let kind = *checker.locals.get(idx as usize).ok_or_else(|| {
                    checker.err_at(ErrorCode::InvalidLocalIndex, "local index out of range", instr_offset)
                })?;
                checker.pop_expect(kind, instr_offset)?;
                checker.push(kind);
            }
            0x23 => {
                let idx = r.read_uleb128_u32()?;
                let ty = module
                    .global_type(idx)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidGlobalIndex, "global index out of range", instr_offset))?;
                checker.push(ty.value_kind);
            }
            0x24 => {
                let idx = r.read_uleb128_u32()?;
                let ty = module
                    .global_type(idx)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidGlobalIndex, "global index out of range", instr_offset))?;
                if ty.mutability != wasm_types::Mutability::Var {
                    return Err(checker.err_at(ErrorCode::InvalidModule, "global.set on an immutable global", instr_offset));
                }
                checker.pop_expect(ty.value_kind, instr_offset)?;
            }
            0x25 => {
                let idx = r.read_uleb128_u32()?;
                let element = module
                    .tables
                    .get(idx as usize)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidTableIndex, "table index out of range", instr_offset))?
                    .element;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(element);
            }
            0x26 => {
                let idx = r.read_uleb128_u32()?;
                let element = module
                    .tables
                    .get(idx as usize)
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidTableIndex, "table index out of range", instr_offset))?
                    .element;
                checker.pop_expect(element, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x28 => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x29 => {
                check_memory_access(&checker, &mut r, 8, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x2A => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0x2B => {
                check_memory_access(&checker, &mut r, 8, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0x2C | 0x2D => {
                check_memory_access(&checker, &mut r, 1, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x2E | 0x2F => {
                check_memory_access(&checker, &mut r, 2, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x30 | 0x31 => {
                check_memory_access(&checker, &mut r, 1, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x32 | 0x33 => {
                check_memory_access(&checker, &mut r, 2, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x34 | 0x35 => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x36 => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x37 => {
                check_memory_access(&checker, &mut r, 8, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x38 => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x39 => {
                check_memory_access(&checker, &mut r, 8, instr_offset)?;
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3A => {
                check_memory_access(&checker, &mut r, 1, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3B => {
                check_memory_access(&checker, &mut r, 2, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3C => {
                check_memory_access(&checker, &mut r, 1, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3D => {
                check_memory_access(&checker, &mut r, 2, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3E => {
                check_memory_access(&checker, &mut r, 4, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
            }
            0x3F => {
                r.read_u8()?;
                if module.total_memory_count() == 0 {
                    return Err(checker.err_at(ErrorCode::InvalidMemoryIndex, "memory.size with no declared memory", instr_offset));
                }
                checker.push(ValueKind::I32);
            }
            0x40 => {
                r.read_u8()?;
                if module.total_memory_count() == 0 {
                    return Err(checker.err_at(ErrorCode::InvalidMemoryIndex, "memory.grow with no declared memory", instr_offset));
                }
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x41 => {
                r.read_sleb128_i32()?;
                checker.push(ValueKind::I32);
            }
            0x42 => {
                r.read_sleb128_i64()?;
                checker.push(ValueKind::I64);
            }
            0x43 => {
                r.read_f32_le()?;
                checker.push(ValueKind::F32);
            }
            0x44 => {
                r.read_f64_le()?;
                checker.push(ValueKind::F64);
            }
            0x45 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x46..=0x4F => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x50 => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x51..=0x5A => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x5B..=0x60 => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x61..=0x66 => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x67..=0x69 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x6A..=0x78 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0x79..=0x7B => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x7C..=0x8A => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0x8B..=0x91 => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0x92..=0x98 => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0x99..=0x9F => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xA0..=0xA6 => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xA7 => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xA8 | 0xA9 => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xAA | 0xAB => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xAC | 0xAD => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0xAE | 0xAF => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0xB0 | 0xB1 => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0xB2 | 0xB3 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0xB4 | 0xB5 => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0xB6 => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0xB7 | 0xB8 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xB9 | 0xBA => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xBB => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xBC => {
                checker.pop_expect(ValueKind::F32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xBD => {
                checker.pop_expect(ValueKind::F64, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0xBE => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::F32);
            }
            0xBF => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::F64);
            }
            0xC0 | 0xC1 => {
                checker.pop_expect(ValueKind::I32, instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xC2 | 0xC3 | 0xC4 => {
                checker.pop_expect(ValueKind::I64, instr_offset)?;
                checker.push(ValueKind::I64);
            }
            0xD0 => {
                let reftype_byte = r.read_u8()?;
                let kind = ValueKind::from_tag_byte(reftype_byte)
                    .filter(|k| k.is_reference())
                    .ok_or_else(|| checker.err_at(ErrorCode::InvalidImmediate, "ref.null needs a reference type byte", instr_offset))?;
                checker.push(kind);
            }
            0xD1 => {
                checker.pop_reference(instr_offset)?;
                checker.push(ValueKind::I32);
            }
            0xD2 => {
                let idx = r.read_uleb128_u32()?;
                if idx >= module.total_function_count() {
                    return Err(checker.err_at(ErrorCode::InvalidFunctionIndex, "ref.func index out of range", instr_offset));
                }
                checker.push(ValueKind::FuncRef);
            }
            0xFC => handle_bulk_memory(&mut checker, &mut r, instr_offset)?,
            0xFD => handle_simd(&mut checker, &mut r, instr_offset)?,
            0xFE => {
                return Err(checker.err_at(
                    ErrorCode::UnsupportedInstruction,
                    "threads/atomics opcodes are not part of the accepted feature set",
                    instr_offset,
                ));
            }
            0xFB => {
                return Err(checker.err_at(
                    ErrorCode::UnsupportedInstruction,
                    "GC opcodes are not part of the accepted feature set",
                    instr_offset,
                ));
            }
            _ => {
                return Err(checker.err_at(ErrorCode::UnknownOpcode, "unrecognized opcode byte", instr_offset));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::module::DecoderConfig;

    fn empty_module_bytes() -> Vec<u8> {
        vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00]
    }

    #[test]
    fn empty_module_validates() {
        let module = decode(&empty_module_bytes(), &DecoderConfig::default()).unwrap();
        validate_module(&module, &ValidatorConfig::default()).unwrap();
    }

    fn result_i32_func_bytes(body: &[u8]) -> Vec<u8> {
        let mut bytes = empty_module_bytes();
        bytes.extend_from_slice(&[0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F]);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        let mut code_section = vec![0x01]; // one entry
        let mut entry = vec![0x00]; // no locals
        entry.extend_from_slice(body);
        code_section.push(entry.len() as u8);
        code_section.extend_from_slice(&entry);
        bytes.push(0x0A);
        bytes.push(code_section.len() as u8);
        bytes.extend_from_slice(&code_section);
        bytes
    }

    #[test]
    fn accepts_matching_return_type() {
        let bytes = result_i32_func_bytes(&[0x41, 0x2A, 0x0B]);
        let module = decode(&bytes, &DecoderConfig::default()).unwrap();
        validate_module(&module, &ValidatorConfig::default()).unwrap();
    }

    #[test]
    fn rejects_mismatched_return_type() {
        let bytes = result_i32_func_bytes(&[0x43, 0x00, 0x00, 0x28, 0x42, 0x0B]);
        let module = decode(&bytes, &DecoderConfig::default()).unwrap();
        let err = validate_module(&module, &ValidatorConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn rejects_stack_underflow() {
        let bytes = result_i32_func_bytes(&[0x0B]);
        let module = decode(&bytes, &DecoderConfig::default()).unwrap();
        let err = validate_module(&module, &ValidatorConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StackUnderflow);
    }

    #[test]
    fn unreachable_makes_stack_polymorphic() {
        let bytes = result_i32_func_bytes(&[0x00, 0x0B]);
        let module = decode(&bytes, &DecoderConfig::default()).unwrap();
        validate_module(&module, &ValidatorConfig::default()).unwrap();
    }
}
