use std::fmt;

use log::warn;

use crate::{
    bytes::{read_u16, read_u32, slice},
    matches_cp_info,
    parser::{read_multiple, Diagnostics},
    ClassFileError, ConstantPool, Result, Warning,
};

/// How deep Code attributes may nest inside each other before the input is
/// treated as malformed.
pub const MAX_ATTRIBUTE_DEPTH: usize = 4;

/// An attribute as it appears in the class file, before its name is looked
/// up in the constant pool.
pub struct RawAttribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug)]
pub enum Attribute {
    Code(CodeAttribute),
    // Recognised, but their contents are dropped.
    SourceFile,
    LineNumberTable,
}
impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Code(_) => "Code",
            Attribute::SourceFile => "SourceFile",
            Attribute::LineNumberTable => "LineNumberTable",
        }
    }
}

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name() == name)
    }

    pub fn code_attribute(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}
impl ExceptionTableEntry {
    /// The caught class, or `None` for a handler that catches everything.
    pub fn catch_type_name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Option<&'a str>> {
        if self.catch_type == 0 {
            return Ok(None);
        }

        let class = matches_cp_info!(constant_pool, self.catch_type, Class)?;
        Ok(Some(class.value()?))
    }
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

pub(crate) fn read_attributes(
    buf: &[u8],
    base: usize,
    constant_pool: &ConstantPool,
    diagnostics: &mut Diagnostics,
    depth: usize,
) -> Result<(Attributes, usize)> {
    if depth > MAX_ATTRIBUTE_DEPTH {
        return Err(ClassFileError::MalformedAttribute(format!(
            "attributes nested more than {MAX_ATTRIBUTE_DEPTH} levels deep"
        )));
    }

    let (raw, offset) = read_multiple(buf, base, Vec::new(), read_raw_attribute)?;
    let attributes = raw
        .into_iter()
        .map(|attribute| resolve_attribute(attribute, constant_pool, diagnostics, depth))
        .collect::<Result<Vec<_>>>()?;

    Ok((Attributes(attributes), offset))
}

fn read_raw_attribute(buf: &[u8], base: usize) -> Result<(RawAttribute, usize)> {
    let attribute_name_index = read_u16(buf, base)?;
    let length = read_u32(buf, base + 2)? as usize;
    let info = slice(buf, base + 6, length)?.to_vec();

    Ok((
        RawAttribute {
            attribute_name_index,
            info,
        },
        6 + length,
    ))
}

fn resolve_attribute(
    attribute: RawAttribute,
    constant_pool: &ConstantPool,
    diagnostics: &mut Diagnostics,
    depth: usize,
) -> Result<Attribute> {
    match constant_pool.utf8(attribute.attribute_name_index)? {
        "Code" => Ok(Attribute::Code(parse_code_attribute(
            &attribute.info,
            constant_pool,
            diagnostics,
            depth,
        )?)),
        "SourceFile" => {
            warn!("Skipping SourceFile attribute");
            Ok(Attribute::SourceFile)
        }
        "LineNumberTable" => {
            warn!("Skipping LineNumberTable attribute");
            Ok(Attribute::LineNumberTable)
        }
        name => Err(ClassFileError::UnsupportedAttribute(name.to_owned())),
    }
}

fn parse_code_attribute(
    info: &[u8],
    constant_pool: &ConstantPool,
    diagnostics: &mut Diagnostics,
    depth: usize,
) -> Result<CodeAttribute> {
    let max_stack = read_u16(info, 0)?;
    let max_locals = read_u16(info, 2)?;
    let code_length = read_u32(info, 4)? as usize;
    let code = slice(info, 8, code_length)?.to_vec();

    let (exception_table, offset) = read_trailing(info, 8 + code_length, |info, offset| {
        read_multiple(info, offset, Vec::new(), read_exception_table_entry)
    })?;
    let (attributes, end) = read_trailing(info, offset, |info, offset| {
        read_attributes(info, offset, constant_pool, diagnostics, depth + 1)
    })?;

    if end != info.len() {
        diagnostics.report(Warning::CodeLengthMismatch {
            declared: info.len(),
            consumed: end,
        })?;
    }

    Ok(CodeAttribute {
        max_stack,
        max_locals,
        code,
        exception_table,
        attributes,
    })
}

/// Reads a count prefixed section at the tail of a Code attribute. A count
/// that lies past the end of `info` reads as 0; the two bytes it would have
/// taken still count towards the consumed length.
fn read_trailing<T, F>(info: &[u8], offset: usize, read_section: F) -> Result<(T, usize)>
where
    T: Default,
    F: FnOnce(&[u8], usize) -> Result<(T, usize)>,
{
    if offset + 2 > info.len() {
        return Ok((T::default(), offset + 2));
    }

    read_section(info, offset)
}

fn read_exception_table_entry(buf: &[u8], base: usize) -> Result<(ExceptionTableEntry, usize)> {
    Ok((
        ExceptionTableEntry {
            start_pc: read_u16(buf, base)?,
            end_pc: read_u16(buf, base + 2)?,
            handler_pc: read_u16(buf, base + 4)?,
            catch_type: read_u16(buf, base + 6)?,
        },
        8,
    ))
}
