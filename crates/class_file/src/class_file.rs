use crate::{
    attributes::{Attributes, CodeAttribute},
    parser::Parser,
    reference::Reference,
    AccessFlags, ConstantPool, Result,
};

/// A decoded class file. Every reference it holds has been resolved against
/// `constant_pool` by the time a [`Parser`] hands it out.
#[derive(Debug)]
pub struct ClassFile {
    /// `(major, minor)`
    pub version: (u16, u16),
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: Reference,
    pub super_class: Option<Reference>,
    pub interfaces: Vec<Reference>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn class_name(&self) -> Result<&str> {
        self.this_class.value()
    }

    /// `None` only for the root of the class hierarchy.
    pub fn super_class(&self) -> Result<Option<&str>> {
        self.super_class.as_ref().map(|r| r.value()).transpose()
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces.iter().map(|r| r.value()).collect()
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.name().map_or(false, |n| n == name))
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| {
            m.name().map_or(false, |n| n == name)
                && m.descriptor().map_or(false, |d| d == descriptor)
        })
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name: Reference,
    pub descriptor: Reference,
    pub attributes: Attributes,
}
impl FieldInfo {
    pub fn name(&self) -> Result<&str> {
        self.name.value()
    }

    pub fn descriptor(&self) -> Result<&str> {
        self.descriptor.value()
    }
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name: Reference,
    pub descriptor: Reference,
    pub attributes: Attributes,
}
impl MethodInfo {
    pub fn name(&self) -> Result<&str> {
        self.name.value()
    }

    pub fn descriptor(&self) -> Result<&str> {
        self.descriptor.value()
    }

    /// Abstract and native methods have no code.
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.code_attribute()
    }
}
