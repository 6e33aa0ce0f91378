use std::fmt;

use thiserror::Error;

use crate::{constant_pool::ConstantSlot, reference::ReferenceKind};

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Read of {width} bytes at offset {offset} is out of bounds (length {len})")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("Not a class file, magic identifier was 0x{0:X}")]
    NotAClassFile(u32),
    #[error("Unsupported constant tag: {0}")]
    UnsupportedConstantTag(u8),
    #[error("Unsupported attribute: {0}")]
    UnsupportedAttribute(String),
    #[error("Unknown reference kind for a composite reference: {0}")]
    UnknownReferenceKind(ReferenceKind),
    #[error("Reference of kind {0} was dereferenced before being resolved")]
    ReferenceNotResolved(ReferenceKind),
    #[error("Constant {0} could not be resolved, the reference chain is cyclic or too deep")]
    UnresolvedReference(u16),
    #[error("Composite constant starting at {index} resolves to {len} bytes")]
    ResolvedValueTooLong { index: u16, len: usize },
    #[error("Constant index {index} is out of range (pool length {len})")]
    ConstantIndexOutOfRange { index: u16, len: usize },
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, ConstantSlot),
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),
    #[error("Rejected by strict parsing: {0}")]
    Rejected(Warning),
}

/// Conditions that do not stop a decode. They are logged and collected on
/// the [`Parser`](crate::Parser) unless the matching strict flag is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnsupportedVersion { major: u16, minor: u16 },
    CodeLengthMismatch { declared: usize, consumed: usize },
    NotFullyConsumed { consumed: usize, len: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnsupportedVersion { major, minor } => {
                write!(f, "Unsupported class file format version {major}.{minor}")
            }
            Warning::CodeLengthMismatch { declared, consumed } => write!(
                f,
                "Code attribute declares {declared} bytes but {consumed} were consumed"
            ),
            Warning::NotFullyConsumed { consumed, len } => write!(
                f,
                "Class binary was not fully consumed ({consumed} of {len} bytes)"
            ),
        }
    }
}
