use crate::{reference::Reference, ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index)? {
            $crate::constant_pool::ConstantSlot::$i(ref n) => Ok(n),
            c => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
        }
    };
}

/// The constant pool of a class file. Slot 0 is always
/// [`ConstantSlot::Reserved`], so indices read from the file can be used as is.
#[derive(Debug, Default)]
pub struct ConstantPool {
    slots: Vec<ConstantSlot>,
}
impl ConstantPool {
    pub fn new(slots: Vec<ConstantSlot>) -> Self {
        Self { slots }
    }

    /// Number of slots including the reserved one, i.e. the count the class
    /// file itself declares.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<&ConstantSlot> {
        match self.slots.get(index as usize) {
            Some(ConstantSlot::Reserved) | None => Err(ClassFileError::ConstantIndexOutOfRange {
                index,
                len: self.slots.len(),
            }),
            Some(slot) => Ok(slot),
        }
    }

    /// Looks up a raw Utf8 slot, bypassing reference resolution.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !matches!(slot, ConstantSlot::Reserved))
            .map(|(index, slot)| (index as u16, slot))
    }

    pub(crate) fn resolve_index(&self, index: u16, depth: usize) -> Result<String> {
        match self.get(index)? {
            ConstantSlot::Utf8(s) => Ok(s.clone()),
            ConstantSlot::Class(r)
            | ConstantSlot::String(r)
            | ConstantSlot::FieldRef(r)
            | ConstantSlot::MethodRef(r)
            | ConstantSlot::NameAndType(r) => Ok(r.resolve_at(self, depth)?.to_owned()),
            // `get` never hands out the reserved slot.
            ConstantSlot::Reserved => Err(ClassFileError::ConstantIndexOutOfRange {
                index,
                len: self.slots.len(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConstantSlot {
    Reserved,
    Utf8(String),
    Class(Reference),
    String(Reference),
    FieldRef(Reference),
    MethodRef(Reference),
    NameAndType(Reference),
}
impl ConstantSlot {
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            ConstantSlot::Class(r)
            | ConstantSlot::String(r)
            | ConstantSlot::FieldRef(r)
            | ConstantSlot::MethodRef(r)
            | ConstantSlot::NameAndType(r) => Some(r),
            ConstantSlot::Reserved | ConstantSlot::Utf8(_) => None,
        }
    }
}
