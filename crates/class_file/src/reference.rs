use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{ClassFileError, ConstantPool, Result};

/// Longest chain of constants a single resolution may follow. Well formed
/// pools never go deeper than `Methodref -> Class -> Utf8`.
pub const MAX_RESOLUTION_DEPTH: usize = 8;

/// Longest value a composite reference may resolve to. A `Methodref` joins
/// three Utf8 constants of at most `u16::MAX` bytes each with two separators;
/// anything longer can only come from composites nested inside composites,
/// which would otherwise double in size at every level of the chain.
pub const MAX_RESOLVED_LENGTH: usize = 3 * u16::MAX as usize + 2;

pub type Reference = Arc<SymbolicReference>;

/// What a reference was created for. Only composite references care, since
/// the kind picks the infix used to join both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Class,
    String,
    This,
    Super,
    Interface,
    Name,
    Field,
    Method,
    NameAndType,
}
impl ReferenceKind {
    pub fn infix(self) -> Result<&'static str> {
        match self {
            ReferenceKind::NameAndType => Ok(":"),
            ReferenceKind::Method | ReferenceKind::Field => Ok("."),
            kind => Err(ClassFileError::UnknownReferenceKind(kind)),
        }
    }
}
impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceKind::Class => "class",
            ReferenceKind::String => "string",
            ReferenceKind::This => "this",
            ReferenceKind::Super => "super",
            ReferenceKind::Interface => "interface",
            ReferenceKind::Name => "name",
            ReferenceKind::Field => "field",
            ReferenceKind::Method => "method",
            ReferenceKind::NameAndType => "name&type",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Single(u16),
    Composite(u16, u16),
}

/// An index (or pair of indices) into the constant pool whose string value
/// is computed once, after the whole pool has been read.
#[derive(Debug)]
pub struct SymbolicReference {
    kind: ReferenceKind,
    target: Target,
    value: OnceLock<String>,
}
impl SymbolicReference {
    pub fn single(kind: ReferenceKind, index: u16) -> Self {
        Self {
            kind,
            target: Target::Single(index),
            value: OnceLock::new(),
        }
    }

    pub fn composite(kind: ReferenceKind, first: u16, second: u16) -> Self {
        Self {
            kind,
            target: Target::Composite(first, second),
            value: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// The resolved value. Calling this before the reference went through
    /// [`SymbolicReference::resolve`] is a bug in the caller.
    pub fn value(&self) -> Result<&str> {
        self.value
            .get()
            .map(String::as_str)
            .ok_or(ClassFileError::ReferenceNotResolved(self.kind))
    }

    /// Resolves against `pool`, or returns the cached value without touching
    /// `pool` if this reference was already resolved.
    pub fn resolve(&self, pool: &ConstantPool) -> Result<&str> {
        self.resolve_at(pool, 0)
    }

    pub(crate) fn resolve_at(&self, pool: &ConstantPool, depth: usize) -> Result<&str> {
        if let Some(value) = self.value.get() {
            return Ok(value.as_str());
        }

        if depth > MAX_RESOLUTION_DEPTH {
            return Err(ClassFileError::UnresolvedReference(match self.target {
                Target::Single(index) | Target::Composite(index, _) => index,
            }));
        }

        let value = match self.target {
            Target::Single(index) => pool.resolve_index(index, depth + 1)?,
            Target::Composite(first_index, second) => {
                let infix = self.kind.infix()?;
                let first = pool.resolve_index(first_index, depth + 1)?;
                let second = pool.resolve_index(second, depth + 1)?;

                let len = first.len() + infix.len() + second.len();
                if len > MAX_RESOLVED_LENGTH {
                    return Err(ClassFileError::ResolvedValueTooLong { index: first_index, len });
                }
                format!("{first}{infix}{second}")
            }
        };

        Ok(self.value.get_or_init(|| value).as_str())
    }
}

/// References created while reading one class file, kept in creation order
/// until the constant pool is complete and they can all be resolved.
#[derive(Debug, Default)]
pub struct PendingReferences {
    references: Vec<Reference>,
}
impl PendingReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&mut self, kind: ReferenceKind, index: u16) -> Reference {
        self.push(SymbolicReference::single(kind, index))
    }

    pub fn composite(&mut self, kind: ReferenceKind, first: u16, second: u16) -> Reference {
        self.push(SymbolicReference::composite(kind, first, second))
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn resolve_all(&mut self, pool: &ConstantPool) -> Result<()> {
        for reference in self.references.drain(..) {
            reference.resolve(pool)?;
        }

        Ok(())
    }

    fn push(&mut self, reference: SymbolicReference) -> Reference {
        let reference = Arc::new(reference);
        self.references.push(Arc::clone(&reference));
        reference
    }
}
