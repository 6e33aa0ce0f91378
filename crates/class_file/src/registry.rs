use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use log::{info, warn};
use parking_lot::RwLock;

use crate::{ClassFile, Result};

lazy_static::lazy_static! {
    static ref GLOBAL: ClassRegistry = ClassRegistry::new();
}

/// Decoded classes keyed by their resolved name. Classes are only ever
/// added; a second class with a name that is already taken is refused.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, Arc<ClassFile>>>,
}
impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static ClassRegistry {
        &GLOBAL
    }

    /// Returns `false` and leaves the registry untouched if a class with the
    /// same name is already registered.
    pub fn register(&self, class: ClassFile) -> Result<bool> {
        let name = class.class_name()?.to_owned();

        match self.classes.write().entry(name) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(class));
                Ok(true)
            }
        }
    }

    /// Decodes `bytes` and registers the result.
    pub fn load(&self, bytes: &[u8]) -> Result<bool> {
        let class = ClassFile::parse(bytes)?;
        let name = class.class_name()?.to_owned();

        let registered = self.register(class)?;
        if registered {
            info!("Class {} registered", name);
        } else {
            warn!("Class {} not registered, the name is already taken", name);
        }

        Ok(registered)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClassFile>> {
        self.classes.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}
