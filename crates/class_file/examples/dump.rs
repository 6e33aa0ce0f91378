use std::{env, fs::File, process};

use kettle_class_file::{ClassFile, ClassRegistry};
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    let paths = env::args().skip(1).collect::<Vec<_>>();
    if paths.is_empty() {
        eprintln!("usage: dump <class file>...");
        process::exit(2);
    }

    let registry = ClassRegistry::global();
    for path in paths {
        let file = File::open(&path).unwrap();
        let mmap = unsafe { Mmap::map(&file).unwrap() };

        let class = match ClassFile::parse(&mmap) {
            Ok(class) => class,
            Err(e) => {
                log::error!("Failed to decode {}: {}", path, e);
                continue;
            }
        };

        print_class(&class);
        if !registry.register(class).unwrap() {
            log::warn!("Duplicate class in {}", path);
        }
    }
}

fn print_class(class: &ClassFile) {
    let (major, minor) = class.version;
    println!("Class: {}", class.class_name().unwrap());
    println!("    Version:    {}.{}", major, minor);
    println!("    Access:     {:?}", class.access_flags);
    println!(
        "    Super:      {}",
        class.super_class().unwrap().unwrap_or("-")
    );
    for interface in class.interface_names().unwrap() {
        println!("    Implements: {}", interface);
    }
    println!("    Constants:  {}", class.constant_pool.len());

    for field in &class.fields {
        println!(
            "    Field:      {} {}",
            field.name().unwrap(),
            field.descriptor().unwrap()
        );
    }

    for method in &class.methods {
        print!(
            "    Method:     {}{}",
            method.name().unwrap(),
            method.descriptor().unwrap()
        );
        match method.code() {
            Some(code) => println!(
                " (stack {}, locals {}, {} bytes of code)",
                code.max_stack,
                code.max_locals,
                code.code.len()
            ),
            None => println!(),
        }
    }
    println!();
}
