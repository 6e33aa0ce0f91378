use bitflags::bitflags;
use log::{debug, warn};

use crate::{
    attributes::{read_attributes, Attributes},
    bytes::{buffer_equals, read_u16, read_u32, read_u8, slice},
    class_file::{FieldInfo, MethodInfo},
    reference::{PendingReferences, Reference, ReferenceKind},
    AccessFlags, ClassFile, ClassFileError, ConstantPool, ConstantSlot, Result, Warning,
};

pub const MAGIC: u32 = 0xCAFEBABE;

/// `[major, minor]`
pub const SUPPORTED_VERSION: [u16; 2] = [52, 0];

mod constant_tag {
    pub(crate) const UTF8: u8 = 1;
    pub(crate) const CLASS: u8 = 7;
    pub(crate) const STRING: u8 = 8;
    pub(crate) const FIELD_REF: u8 = 9;
    pub(crate) const METHOD_REF: u8 = 10;
    pub(crate) const NAME_AND_TYPE: u8 = 12;
}

bitflags! {
    /// Warnings that should abort the decode instead of being reported.
    pub struct ParserFlags: u32 {
        const STRICT_VERSION = 1;
        const STRICT_CODE_LENGTH = 1 << 1;
        const STRICT_TRAILING_BYTES = 1 << 2;
    }
}
impl Default for ParserFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    pub(crate) flags: ParserFlags,
    pub(crate) warnings: Vec<Warning>,
}
impl Diagnostics {
    pub(crate) fn report(&mut self, warning: Warning) -> Result<()> {
        let strict = match warning {
            Warning::UnsupportedVersion { .. } => ParserFlags::STRICT_VERSION,
            Warning::CodeLengthMismatch { .. } => ParserFlags::STRICT_CODE_LENGTH,
            Warning::NotFullyConsumed { .. } => ParserFlags::STRICT_TRAILING_BYTES,
        };
        if self.flags.contains(strict) {
            return Err(ClassFileError::Rejected(warning));
        }

        warn!("{}", warning);
        self.warnings.push(warning);
        Ok(())
    }
}

pub struct Parser<'a> {
    buf: &'a [u8],
    diagnostics: Diagnostics,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_flags(buf, ParserFlags::default())
    }

    pub fn with_flags(buf: &'a [u8], flags: ParserFlags) -> Self {
        Self {
            buf,
            diagnostics: Diagnostics {
                flags,
                warnings: Vec::new(),
            },
        }
    }

    /// Warnings reported by the last call to [`Parser::parse`].
    pub fn warnings(&self) -> &[Warning] {
        &self.diagnostics.warnings
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.diagnostics.warnings.clear();

        self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let mut references = PendingReferences::new();
        let (constant_pool, offset) = read_constant_pool(self.buf, 8, &mut references)?;
        debug!(
            "Read {} constants, header starts at {}",
            constant_pool.len(),
            offset
        );

        let (header, offset) = read_header(self.buf, offset, &mut references)?;
        let (fields, offset) = read_multiple(self.buf, offset, Vec::new(), |buf, base| {
            read_member(
                buf,
                base,
                &constant_pool,
                &mut references,
                &mut self.diagnostics,
                |access_flags, name, descriptor, attributes| FieldInfo {
                    access_flags,
                    name,
                    descriptor,
                    attributes,
                },
            )
        })?;
        let (methods, offset) = read_multiple(self.buf, offset, Vec::new(), |buf, base| {
            read_member(
                buf,
                base,
                &constant_pool,
                &mut references,
                &mut self.diagnostics,
                |access_flags, name, descriptor, attributes| MethodInfo {
                    access_flags,
                    name,
                    descriptor,
                    attributes,
                },
            )
        })?;
        let (attributes, end) = read_attributes(
            self.buf,
            offset,
            &constant_pool,
            &mut self.diagnostics,
            0,
        )?;

        if end != self.buf.len() {
            self.diagnostics.report(Warning::NotFullyConsumed {
                consumed: end,
                len: self.buf.len(),
            })?;
        }

        debug!("Resolving {} references", references.len());
        references.resolve_all(&constant_pool)?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags: header.access_flags,
            this_class: header.this_class,
            super_class: header.super_class,
            interfaces: header.interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match read_u32(self.buf, 0)? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::NotAClassFile(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = read_u16(self.buf, 4)?;
        let major = read_u16(self.buf, 6)?;

        if buffer_equals(&[major, minor], &SUPPORTED_VERSION) {
            debug!("Detected supported class file format version {major}.{minor}");
        } else {
            self.diagnostics
                .report(Warning::UnsupportedVersion { major, minor })?;
        }

        Ok((major, minor))
    }
}

/// Reads a 2 byte count followed by that many entries, each starting where
/// the previous one ended. `read_entry` returns the entry and the number of
/// bytes it consumed.
///
/// Entries in `seed` count towards the declared count, so the constant pool
/// can pass its reserved slot and still read `count - 1` entries.
pub fn read_multiple<T, F>(
    buf: &[u8],
    base: usize,
    seed: Vec<T>,
    mut read_entry: F,
) -> Result<(Vec<T>, usize)>
where
    F: FnMut(&[u8], usize) -> Result<(T, usize)>,
{
    let count = read_u16(buf, base)? as usize;
    let mut offset = base + 2;
    let mut entries = seed;
    entries.reserve(count.saturating_sub(entries.len()));

    while entries.len() < count {
        let (entry, consumed) = read_entry(buf, offset)?;
        entries.push(entry);
        offset += consumed;
    }

    Ok((entries, offset))
}

pub(crate) fn read_constant_pool(
    buf: &[u8],
    base: usize,
    references: &mut PendingReferences,
) -> Result<(ConstantPool, usize)> {
    let (slots, offset) = read_multiple(buf, base, vec![ConstantSlot::Reserved], |buf, offset| {
        read_constant(buf, offset, references)
    })?;

    Ok((ConstantPool::new(slots), offset))
}

fn read_constant(
    buf: &[u8],
    base: usize,
    references: &mut PendingReferences,
) -> Result<(ConstantSlot, usize)> {
    let tag = read_u8(buf, base)?;
    let offset = base + 1;

    let (slot, size) = match tag {
        constant_tag::UTF8 => {
            let length = read_u16(buf, offset)? as usize;
            let bytes = slice(buf, offset + 2, length)?;
            (
                ConstantSlot::Utf8(String::from_utf8_lossy(bytes).into()),
                3 + length,
            )
        }
        constant_tag::CLASS => (
            ConstantSlot::Class(references.single(ReferenceKind::Class, read_u16(buf, offset)?)),
            3,
        ),
        constant_tag::STRING => (
            ConstantSlot::String(references.single(ReferenceKind::String, read_u16(buf, offset)?)),
            3,
        ),
        constant_tag::FIELD_REF => (
            ConstantSlot::FieldRef(read_composite(buf, offset, references, ReferenceKind::Field)?),
            5,
        ),
        constant_tag::METHOD_REF => (
            ConstantSlot::MethodRef(read_composite(
                buf,
                offset,
                references,
                ReferenceKind::Method,
            )?),
            5,
        ),
        constant_tag::NAME_AND_TYPE => (
            ConstantSlot::NameAndType(read_composite(
                buf,
                offset,
                references,
                ReferenceKind::NameAndType,
            )?),
            5,
        ),
        _ => return Err(ClassFileError::UnsupportedConstantTag(tag)),
    };

    Ok((slot, size))
}

fn read_composite(
    buf: &[u8],
    offset: usize,
    references: &mut PendingReferences,
    kind: ReferenceKind,
) -> Result<Reference> {
    let first = read_u16(buf, offset)?;
    let second = read_u16(buf, offset + 2)?;

    Ok(references.composite(kind, first, second))
}

pub(crate) struct Header {
    pub(crate) access_flags: AccessFlags,
    pub(crate) this_class: Reference,
    pub(crate) super_class: Option<Reference>,
    pub(crate) interfaces: Vec<Reference>,
}

pub(crate) fn read_header(
    buf: &[u8],
    base: usize,
    references: &mut PendingReferences,
) -> Result<(Header, usize)> {
    let access_flags = AccessFlags::from_bits_truncate(read_u16(buf, base)?);
    let this_class = references.single(ReferenceKind::This, read_u16(buf, base + 2)?);

    // Only the root of the class hierarchy has no superclass.
    let super_class = match read_u16(buf, base + 4)? {
        0 => None,
        index => Some(references.single(ReferenceKind::Super, index)),
    };

    let (interfaces, offset) = read_multiple(buf, base + 6, Vec::new(), |buf, offset| {
        Ok((
            references.single(ReferenceKind::Interface, read_u16(buf, offset)?),
            2,
        ))
    })?;

    Ok((
        Header {
            access_flags,
            this_class,
            super_class,
            interfaces,
        },
        offset,
    ))
}

/// Reads a field or method. Returns the number of bytes consumed rather than
/// the end offset, as [`read_multiple`] expects.
fn read_member<M>(
    buf: &[u8],
    base: usize,
    constant_pool: &ConstantPool,
    references: &mut PendingReferences,
    diagnostics: &mut Diagnostics,
    make: impl FnOnce(AccessFlags, Reference, Reference, Attributes) -> M,
) -> Result<(M, usize)> {
    let access_flags = AccessFlags::from_bits_truncate(read_u16(buf, base)?);
    let name = references.single(ReferenceKind::Name, read_u16(buf, base + 2)?);
    let descriptor = references.single(ReferenceKind::Name, read_u16(buf, base + 4)?);
    let (attributes, offset) = read_attributes(buf, base + 6, constant_pool, diagnostics, 0)?;

    Ok((make(access_flags, name, descriptor, attributes), offset - base))
}
