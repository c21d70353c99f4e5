//! The two-pass section decoder: `decode(bytes, &DecoderConfig) ->
//! Result<Module>`.
//!
//! Pass one walks the section stream and slices out each section's raw
//! bytes, enforcing the ordering/duplication rules and size caps before
//! any per-entry decoding runs. Pass two parses each known section's
//! bytes into the [`Module`] aggregate. Grounded in
//! `original_source/.../binary/parser.hpp`'s `ModuleParser`, which
//! separates "find section boundaries" from "interpret section
//! contents".

#[cfg(feature = "alloc")]
use alloc::{boxed::Box, string::String, vec::Vec};

use wasm_reader::Reader;
use wasm_types::error::{Error, Location};
use wasm_types::{ErrorCode, FuncType, GlobalType, Limits, MemoryType, Mutability, Result, TableType, ValueKind};

use crate::module::{
    CustomSection, Data, Element, ElementItems, Export, ExternalKind, Function, Global, Import,
    ImportKind, Module, Producers, SectionId, SegmentMode,
};
use crate::DecoderConfig;

const MAGIC: [u8; 4] = *b"\0asm";
const VERSION: u32 = 1;

/// The canonical section ordering, with the data-count section (12)
/// slotted between elements (9) and code (10).
const ORDER: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 12, 10, 11];

fn order_index(id: u8) -> Option<usize> {
    ORDER.iter().position(|&x| x == id)
}

/// Decode a complete module from its binary encoding.
#[cfg(feature = "alloc")]
pub fn decode(bytes: &[u8], cfg: &DecoderConfig) -> Result<Module> {
    if bytes.len() as u64 > u64::from(cfg.max_module_bytes) {
        return Err(Error::new(ErrorCode::SectionTooLarge, "module exceeds configured size cap")
            .at(Location::at(0)));
    }

    let mut r = Reader::new(bytes);
    decode_header(&mut r)?;

    let mut module = Module {
        types: Vec::new(),
        imports: Vec::new(),
        tables: Vec::new(),
        memories: Vec::new(),
        globals: Vec::new(),
        exports: Vec::new(),
        start: None,
        elements: Vec::new(),
        functions: Vec::new(),
        data: Vec::new(),
        data_count: None,
        custom_sections: Vec::new(),
        name: None,
        producers: Producers::default(),
    };

    let mut function_type_indices: Vec<u32> = Vec::new();
    let mut last_order: Option<usize> = None;

    while !r.is_empty() {
        let section_start = r.offset();
        let id = r.read_u8()?;
        let size = r.read_uleb128_u32()? as usize;
        if size as u64 > u64::from(cfg.max_section_bytes) {
            return Err(
                Error::new(ErrorCode::SectionTooLarge, "section exceeds configured size cap")
                    .at(Location::at(section_start)),
            );
        }
        let payload_start = r.offset();
        let payload = r.read_bytes(size).map_err(|_| {
            Error::new(ErrorCode::MissingSectionSize, "section payload shorter than declared")
                .at(Location::at(section_start))
        })?;

        if id == SectionId::Custom as u8 {
            decode_custom_section(payload, cfg, &mut module, section_start)?;
            continue;
        }

        let idx = order_index(id)
            .ok_or_else(|| Error::new(ErrorCode::InvalidSectionId, "unknown section id").at(Location::at(section_start)))?;
        if let Some(last) = last_order {
            if idx == last {
                return Err(Error::new(ErrorCode::DuplicateSection, "section id repeated")
                    .at(Location::at(section_start)));
            }
            if idx < last {
                return Err(
                    Error::new(ErrorCode::InvalidSectionOrder, "known sections out of order")
                        .at(Location::at(section_start)),
                );
            }
        }
        last_order = Some(idx);

        let mut sr = Reader::new(payload);
        match SectionId::try_from(id)? {
            SectionId::Custom => unreachable!(),
            SectionId::Type => module.types = decode_type_section(&mut sr)?,
            SectionId::Import => module.imports = decode_import_section(&mut sr)?,
            SectionId::Function => function_type_indices = sr.read_vec(|r| r.read_uleb128_u32())?,
            SectionId::Table => module.tables = sr.read_vec(decode_table_type)?,
            SectionId::Memory => module.memories = sr.read_vec(decode_memory_type)?,
            SectionId::Global => module.globals = decode_global_section(&mut sr)?,
            SectionId::Export => module.exports = decode_export_section(&mut sr)?,
            SectionId::Start => module.start = Some(sr.read_uleb128_u32()?),
            SectionId::Element => module.elements = decode_element_section(&mut sr)?,
            SectionId::Code => {
                let bodies = decode_code_section(&mut sr, cfg, payload_start)?;
                if bodies.len() != function_type_indices.len() {
                    return Err(Error::new(
                        ErrorCode::InvalidModule,
                        "function and code section lengths differ",
                    )
                    .at(Location::at(section_start)));
                }
                module.functions = function_type_indices
                    .iter()
                    .zip(bodies)
                    .map(|(type_index, (locals, body, body_offset))| Function {
                        type_index: *type_index,
                        locals,
                        body,
                        body_offset,
                    })
                    .collect();
            }
            SectionId::Data => module.data = decode_data_section(&mut sr)?,
            SectionId::DataCount => module.data_count = Some(sr.read_uleb128_u32()?),
        }

        if !sr.is_empty() {
            return Err(Error::new(ErrorCode::SectionTooLarge, "section body not fully consumed")
                .at(Location::at(section_start)));
        }
    }

    Ok(module)
}

fn decode_header(r: &mut Reader<'_>) -> Result<()> {
    let magic = r.read_bytes(4)?;
    if magic != MAGIC {
        return Err(Error::new(ErrorCode::InvalidMagicNumber, "module does not start with \\0asm")
            .at(Location::at(0)));
    }
    let version = r.read_u32_le()?;
    if version != VERSION {
        return Err(
            Error::new(ErrorCode::InvalidVersion, "only version 1 is supported").at(Location::at(4)),
        );
    }
    Ok(())
}

#[cfg(feature = "alloc")]
fn decode_custom_section(
    payload: &[u8],
    cfg: &DecoderConfig,
    module: &mut Module,
    section_start: usize,
) -> Result<()> {
    let mut r = Reader::new(payload);
    let name = r.read_name().map_err(|e| e.at(Location::at(section_start)))?;
    let data: Box<[u8]> = r.remaining().to_vec().into_boxed_slice();

    if name == "name" {
        if let Some(parsed) = parse_name_section(&data) {
            module.name = Some(parsed);
        } else {
            tracing::debug!("malformed name custom section, dropping");
        }
    } else if name == "producers" {
        if let Some(parsed) = parse_producers_section(&data) {
            module.producers = parsed;
        } else {
            tracing::debug!("malformed producers custom section, dropping");
        }
    }

    if cfg.retain_custom_sections {
        module.custom_sections.push(CustomSection { name, data });
    }
    Ok(())
}

/// Best-effort: the module-name subsection (id 0) only.
#[cfg(feature = "alloc")]
fn parse_name_section(data: &[u8]) -> Option<String> {
    let mut r = Reader::new(data);
    while !r.is_empty() {
        let subsection_id = r.read_u8().ok()?;
        let size = r.read_uleb128_u32().ok()? as usize;
        let payload = r.read_bytes(size).ok()?;
        if subsection_id == 0 {
            let mut sr = Reader::new(payload);
            return sr.read_name().ok();
        }
    }
    None
}

/// Best-effort: parses the `language`/`processed-by`/`sdk` groups.
#[cfg(feature = "alloc")]
fn parse_producers_section(data: &[u8]) -> Option<Producers> {
    let mut r = Reader::new(data);
    let mut producers = Producers::default();
    let group_count = r.read_uleb128_u32().ok()?;
    for _ in 0..group_count {
        let field_name = r.read_name().ok()?;
        let value_count = r.read_uleb128_u32().ok()?;
        let mut values = Vec::new();
        for _ in 0..value_count {
            let name = r.read_name().ok()?;
            let version = r.read_name().ok()?;
            values.push((name, version));
        }
        match field_name.as_str() {
            "language" => producers.language = values,
            "processed-by" => producers.processed_by = values,
            "sdk" => producers.sdk = values,
            _ => {}
        }
    }
    Some(producers)
}

#[cfg(feature = "alloc")]
fn decode_type_section(r: &mut Reader<'_>) -> Result<Vec<FuncType>> {
    r.read_vec(|r| {
        let prefix = r.read_u8()?;
        if prefix != 0x60 {
            return Err(Error::new(ErrorCode::InvalidModule, "function type must start with 0x60")
                .at(Location::at(r.offset() - 1)));
        }
        let params = decode_valtype_vec(r)?;
        let results = decode_valtype_vec(r)?;
        Ok(FuncType::new(params, results))
    })
}

#[cfg(feature = "alloc")]
fn decode_valtype_vec(r: &mut Reader<'_>) -> Result<Vec<ValueKind>> {
    r.read_vec(|r| decode_valtype(r))
}

/// Decodes a value type in a context where one is actually required: type-
/// section params/results, table/global element types, and locals. `0x40`
/// (`ValueKind::Empty`) is a block-type control-signature sentinel, never a
/// real value type, so it is rejected here rather than left to callers.
fn decode_valtype(r: &mut Reader<'_>) -> Result<ValueKind> {
    let offset = r.offset();
    let byte = r.read_u8()?;
    match ValueKind::from_tag_byte(byte) {
        Some(ValueKind::Empty) | None => Err(Error::new(
            ErrorCode::InvalidModule,
            "not a value-kind tag byte",
        )
        .at(Location::at(offset))),
        Some(kind) => Ok(kind),
    }
}

fn decode_limits(r: &mut Reader<'_>) -> Result<Limits> {
    let flag = r.read_u8()?;
    let min = r.read_uleb128_u32()?;
    let max = if flag == 0x01 {
        Some(r.read_uleb128_u32()?)
    } else {
        None
    };
    Limits::new(min, max)
        .ok_or_else(|| Error::new(ErrorCode::InvalidMemorySize, "limits max < min").at(Location::at(r.offset())))
}

fn decode_table_type(r: &mut Reader<'_>) -> Result<TableType> {
    let element = decode_valtype(r)?;
    if !element.is_reference() {
        return Err(Error::new(ErrorCode::InvalidModule, "table element type must be a reference kind")
            .at(Location::at(r.offset())));
    }
    let limits = decode_limits(r)?;
    Ok(TableType { element, limits })
}

fn decode_memory_type(r: &mut Reader<'_>) -> Result<MemoryType> {
    let limits = decode_limits(r)?;
    let ty = MemoryType { limits };
    if !ty.is_within_page_cap() {
        return Err(Error::new(ErrorCode::MemoryLimitExceeded, "memory limits exceed 65,536 pages")
            .at(Location::at(r.offset())));
    }
    Ok(ty)
}

fn decode_global_type(r: &mut Reader<'_>) -> Result<GlobalType> {
    let value_kind = decode_valtype(r)?;
    let mutability_byte = r.read_u8()?;
    let mutability = Mutability::from_byte(mutability_byte)
        .ok_or_else(|| Error::new(ErrorCode::InvalidModule, "not a mutability byte").at(Location::at(r.offset() - 1)))?;
    Ok(GlobalType { value_kind, mutability })
}

#[cfg(feature = "alloc")]
fn decode_import_section(r: &mut Reader<'_>) -> Result<Vec<Import>> {
    r.read_vec(|r| {
        let module = r.read_name()?;
        let field = r.read_name()?;
        let kind_byte = r.read_u8()?;
        let kind = match kind_byte {
            0x00 => ImportKind::Func(r.read_uleb128_u32()?),
            0x01 => ImportKind::Table(decode_table_type(r)?),
            0x02 => ImportKind::Memory(decode_memory_type(r)?),
            0x03 => ImportKind::Global(decode_global_type(r)?),
            _ => {
                return Err(Error::new(ErrorCode::InvalidModule, "unknown import kind byte")
                    .at(Location::at(r.offset() - 1)))
            }
        };
        Ok(Import { module, field, kind })
    })
}

#[cfg(feature = "alloc")]
fn decode_export_section(r: &mut Reader<'_>) -> Result<Vec<Export>> {
    r.read_vec(|r| {
        let name = r.read_name()?;
        let kind_byte = r.read_u8()?;
        let kind = ExternalKind::from_byte(kind_byte)
            .ok_or_else(|| Error::new(ErrorCode::InvalidModule, "unknown export kind byte").at(Location::at(r.offset() - 1)))?;
        let index = r.read_uleb128_u32()?;
        Ok(Export { name, kind, index })
    })
}

#[cfg(feature = "alloc")]
fn decode_global_section(r: &mut Reader<'_>) -> Result<Vec<Global>> {
    r.read_vec(|r| {
        let ty = decode_global_type(r)?;
        let init = decode_const_expr_bytes(r)?;
        Ok(Global { ty, init })
    })
}

/// Captures the exact bytes of one constant expression: a short run of
/// `*.const` / `global.get` / `ref.null` / `ref.func`, terminated by
/// `end` (`0x0B`). Nested blocks are not permitted in a const-expr.
#[cfg(feature = "alloc")]
fn decode_const_expr_bytes(r: &mut Reader<'_>) -> Result<Box<[u8]>> {
    let start = r.offset();
    loop {
        let op = r.read_u8()?;
        match op {
            0x0B => break, // end
            0x41 => {
                r.read_sleb128_i32()?;
            }
            0x42 => {
                r.read_sleb128_i64()?;
            }
            0x43 => {
                r.read_f32_le()?;
            }
            0x44 => {
                r.read_f64_le()?;
            }
            0x23 => {
                r.read_uleb128_u32()?;
            }
            0xD0 => {
                r.read_u8()?;
            }
            0xD2 => {
                r.read_uleb128_u32()?;
            }
            _ => {
                return Err(Error::new(
                    ErrorCode::InvalidConstantExpression,
                    "opcode not permitted in a constant expression",
                )
                .at(Location::at(r.offset() - 1)))
            }
        }
    }
    let end = r.offset();
    Ok(r.slice(start, end).to_vec().into_boxed_slice())
}

#[cfg(feature = "alloc")]
fn decode_element_section(r: &mut Reader<'_>) -> Result<Vec<Element>> {
    r.read_vec(|r| {
        let flag = r.read_uleb128_u32()?;
        let segment = match flag {
            0 => {
                let offset = decode_const_expr_bytes(r)?;
                let items = r.read_vec(|r| r.read_uleb128_u32())?;
                Element {
                    mode: SegmentMode::Active { index: 0, offset },
                    kind: ValueKind::FuncRef,
                    items: ElementItems::FuncIndices(items),
                }
            }
            1 => {
                expect_elemkind(r)?;
                let items = r.read_vec(|r| r.read_uleb128_u32())?;
                Element {
                    mode: SegmentMode::Passive,
                    kind: ValueKind::FuncRef,
                    items: ElementItems::FuncIndices(items),
                }
            }
            2 => {
                let index = r.read_uleb128_u32()?;
                let offset = decode_const_expr_bytes(r)?;
                expect_elemkind(r)?;
                let items = r.read_vec(|r| r.read_uleb128_u32())?;
                Element {
                    mode: SegmentMode::Active { index, offset },
                    kind: ValueKind::FuncRef,
                    items: ElementItems::FuncIndices(items),
                }
            }
            3 => {
                expect_elemkind(r)?;
                let items = r.read_vec(|r| r.read_uleb128_u32())?;
                Element {
                    mode: SegmentMode::Declarative,
                    kind: ValueKind::FuncRef,
                    items: ElementItems::FuncIndices(items),
                }
            }
            4 => {
                let offset = decode_const_expr_bytes(r)?;
                let items = r.read_vec(decode_const_expr_bytes)?;
                Element {
                    mode: SegmentMode::Active { index: 0, offset },
                    kind: ValueKind::FuncRef,
                    items: ElementItems::Exprs(items),
                }
            }
            5 => {
                let kind = decode_reftype(r)?;
                let items = r.read_vec(decode_const_expr_bytes)?;
                Element {
                    mode: SegmentMode::Passive,
                    kind,
                    items: ElementItems::Exprs(items),
                }
            }
            6 => {
                let index = r.read_uleb128_u32()?;
                let offset = decode_const_expr_bytes(r)?;
                let kind = decode_reftype(r)?;
                let items = r.read_vec(decode_const_expr_bytes)?;
                Element {
                    mode: SegmentMode::Active { index, offset },
                    kind,
                    items: ElementItems::Exprs(items),
                }
            }
            7 => {
                let kind = decode_reftype(r)?;
                let items = r.read_vec(decode_const_expr_bytes)?;
                Element {
                    mode: SegmentMode::Declarative,
                    kind,
                    items: ElementItems::Exprs(items),
                }
            }
            _ => {
                return Err(Error::new(ErrorCode::InvalidModule, "unknown element segment flag")
                    .at(Location::at(r.offset())))
            }
        };
        Ok(segment)
    })
}

fn expect_elemkind(r: &mut Reader<'_>) -> Result<()> {
    let byte = r.read_u8()?;
    if byte != 0x00 {
        return Err(Error::new(ErrorCode::InvalidModule, "only elemkind funcref (0x00) is defined")
            .at(Location::at(r.offset() - 1)));
    }
    Ok(())
}

fn decode_reftype(r: &mut Reader<'_>) -> Result<ValueKind> {
    let kind = decode_valtype(r)?;
    if !kind.is_reference() {
        return Err(Error::new(ErrorCode::InvalidModule, "expected a reference type")
            .at(Location::at(r.offset())));
    }
    Ok(kind)
}

#[cfg(feature = "alloc")]
fn decode_locals(r: &mut Reader<'_>) -> Result<Vec<ValueKind>> {
    let group_count = r.read_uleb128_u32()?;
    let mut locals = Vec::new();
    let mut total: u64 = 0;
    for _ in 0..group_count {
        let run = r.read_uleb128_u32()?;
        let kind = decode_valtype(r)?;
        total += u64::from(run);
        if total > u64::from(u32::MAX) {
            return Err(
                Error::new(ErrorCode::InvalidModule, "local count exceeds u32").at(Location::at(r.offset())),
            );
        }
        locals.resize(locals.len() + run as usize, kind);
    }
    Ok(locals)
}

#[cfg(feature = "alloc")]
#[allow(clippy::type_complexity)]
fn decode_code_section(
    r: &mut Reader<'_>,
    cfg: &DecoderConfig,
    payload_start: usize,
) -> Result<Vec<(Vec<ValueKind>, Box<[u8]>, usize)>> {
    r.read_vec(|r| {
        let body_start = payload_start + r.offset();
        let body_size = r.read_uleb128_u32()? as usize;
        if body_size as u32 > cfg.max_function_body_bytes {
            return Err(Error::new(ErrorCode::SectionTooLarge, "function body exceeds configured size cap")
                .at(Location::at(body_start)));
        }
        let instrs_start = payload_start + r.offset();
        let entry_bytes = r.read_bytes(body_size)?;
        let mut br = Reader::new(entry_bytes);
        let locals = decode_locals(&mut br)?;
        let body_offset = instrs_start + (entry_bytes.len() - br.remaining().len());
        let body = br.remaining().to_vec().into_boxed_slice();
        Ok((locals, body, body_offset))
    })
}

#[cfg(feature = "alloc")]
fn decode_data_section(r: &mut Reader<'_>) -> Result<Vec<Data>> {
    r.read_vec(|r| {
        let flag = r.read_uleb128_u32()?;
        let mode = match flag {
            0 => {
                let offset = decode_const_expr_bytes(r)?;
                SegmentMode::Active { index: 0, offset }
            }
            1 => SegmentMode::Passive,
            2 => {
                let index = r.read_uleb128_u32()?;
                let offset = decode_const_expr_bytes(r)?;
                SegmentMode::Active { index, offset }
            }
            _ => {
                return Err(Error::new(ErrorCode::InvalidModule, "unknown data segment flag")
                    .at(Location::at(r.offset())))
            }
        };
        let len = r.read_uleb128_u32()? as usize;
        let bytes = r.read_bytes(len)?.to_vec().into_boxed_slice();
        Ok(Data { mode, bytes })
    })
}
