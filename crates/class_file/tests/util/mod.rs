#![allow(dead_code)]

/// Assembles class file images byte by byte.
#[derive(Debug, Default)]
pub struct ClassBuilder {
    buf: Vec<u8>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a class file with the magic identifier and the given version.
    pub fn with_version(major: u16, minor: u16) -> Self {
        let mut builder = Self::new();
        builder.u4(0xCAFEBABE).u2(minor).u2(major);
        builder
    }

    pub fn u1(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn u2(&mut self, value: u16) -> &mut Self {
        self.buf.extend(value.to_be_bytes());
        self
    }

    pub fn u4(&mut self, value: u32) -> &mut Self {
        self.buf.extend(value.to_be_bytes());
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend(bytes);
        self
    }

    pub fn utf8(&mut self, value: &str) -> &mut Self {
        self.u1(1).u2(value.len() as u16).raw(value.as_bytes())
    }

    pub fn class(&mut self, name_index: u16) -> &mut Self {
        self.u1(7).u2(name_index)
    }

    pub fn string(&mut self, string_index: u16) -> &mut Self {
        self.u1(8).u2(string_index)
    }

    pub fn field_ref(&mut self, class_index: u16, name_and_type_index: u16) -> &mut Self {
        self.u1(9).u2(class_index).u2(name_and_type_index)
    }

    pub fn method_ref(&mut self, class_index: u16, name_and_type_index: u16) -> &mut Self {
        self.u1(10).u2(class_index).u2(name_and_type_index)
    }

    pub fn name_and_type(&mut self, name_index: u16, descriptor_index: u16) -> &mut Self {
        self.u1(12).u2(name_index).u2(descriptor_index)
    }

    /// A field or method without its attribute count.
    pub fn member(&mut self, access_flags: u16, name_index: u16, descriptor_index: u16) -> &mut Self {
        self.u2(access_flags).u2(name_index).u2(descriptor_index)
    }

    pub fn attributes(&mut self, attributes: &[Vec<u8>]) -> &mut Self {
        self.u2(attributes.len() as u16);
        attributes.iter().for_each(|a| {
            self.raw(a);
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

pub fn attribute(name_index: u16, info: &[u8]) -> Vec<u8> {
    let mut builder = ClassBuilder::new();
    builder.u2(name_index).u4(info.len() as u32).raw(info);
    builder.build()
}

pub fn code(max_stack: u16, max_locals: u16, code: &[u8], attributes: &[Vec<u8>]) -> Vec<u8> {
    let mut builder = ClassBuilder::new();
    builder
        .u2(max_stack)
        .u2(max_locals)
        .u4(code.len() as u32)
        .raw(code)
        // no exception handlers
        .u2(0)
        .attributes(attributes);
    builder.build()
}

pub const CODE: u16 = 23;
pub const LINE_NUMBER_TABLE: u16 = 24;
pub const SOURCE_FILE: u16 = 27;

/// The constant pool, header, members and attributes `javac` would emit for
///
/// ```java
/// public class HelloWorld implements Runnable {
///     private final String greeting;
///
///     public static void main(String[] args) {
///         System.out.println("Hello, World!");
///     }
/// }
/// ```
///
/// with the `run` method and constructor body left out.
pub fn hello_world(major: u16, minor: u16) -> ClassBuilder {
    let mut builder = ClassBuilder::with_version(major, minor);
    builder
        .u2(33)
        .method_ref(2, 3) // 1
        .class(4) // 2
        .name_and_type(5, 6) // 3
        .utf8("java/lang/Object") // 4
        .utf8("<init>") // 5
        .utf8("()V") // 6
        .field_ref(8, 9) // 7
        .class(10) // 8
        .name_and_type(11, 12) // 9
        .utf8("java/lang/System") // 10
        .utf8("out") // 11
        .utf8("Ljava/io/PrintStream;") // 12
        .string(14) // 13
        .utf8("Hello, World!") // 14
        .method_ref(16, 17) // 15
        .class(18) // 16
        .name_and_type(19, 20) // 17
        .utf8("java/io/PrintStream") // 18
        .utf8("println") // 19
        .utf8("(Ljava/lang/String;)V") // 20
        .class(22) // 21
        .utf8("HelloWorld") // 22
        .utf8("Code") // 23
        .utf8("LineNumberTable") // 24
        .utf8("main") // 25
        .utf8("([Ljava/lang/String;)V") // 26
        .utf8("SourceFile") // 27
        .utf8("HelloWorld.java") // 28
        .utf8("greeting") // 29
        .utf8("Ljava/lang/String;") // 30
        .class(32) // 31
        .utf8("java/lang/Runnable"); // 32

    // public super, this, super, one interface
    builder.u2(0x0021).u2(21).u2(2).u2(1).u2(31);

    // private final String greeting
    builder.u2(1).member(0x0012, 29, 30).attributes(&[]);

    let line_numbers = |line: u16| {
        let mut builder = ClassBuilder::new();
        builder.u2(1).u2(0).u2(line);
        attribute(LINE_NUMBER_TABLE, &builder.build())
    };
    builder
        .u2(2)
        .member(0x0001, 5, 6)
        .attributes(&[attribute(
            CODE,
            &code(1, 1, &[0x2a, 0xb7, 0x00, 0x01, 0xb1], &[line_numbers(1)]),
        )])
        .member(0x0009, 25, 26)
        .attributes(&[attribute(
            CODE,
            &code(
                2,
                1,
                &[0xb2, 0x00, 0x07, 0x12, 0x0d, 0xb6, 0x00, 0x0f, 0xb1],
                &[line_numbers(5)],
            ),
        )]);

    builder.attributes(&[attribute(SOURCE_FILE, &[0x00, 28])]);
    builder
}
