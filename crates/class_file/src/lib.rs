// https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-4.html

mod access_flags;
pub mod attributes;
pub mod bytes;
mod class_file;
mod constant_pool;
mod error;
mod parser;
pub mod reference;
mod registry;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use constant_pool::{ConstantPool, ConstantSlot};
pub use error::{ClassFileError, Warning};
pub use parser::{read_multiple, Parser, ParserFlags, MAGIC, SUPPORTED_VERSION};
pub use registry::ClassRegistry;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
