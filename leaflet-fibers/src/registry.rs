use crate::dom::{Document, ElementId};
use crate::native::SharedMap;
use crate::props::Children;
use smartstring::{LazyCompact, SmartString};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Service that mounts nested declarative content into a detached element.
#[derive(Clone)]
pub struct ContentRenderer(Rc<dyn Fn(&Children, &Document, ElementId)>);

impl ContentRenderer {
    pub fn new(f: impl Fn(&Children, &Document, ElementId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn render(&self, children: &Children, document: &Document, host: ElementId) {
        (self.0)(children, document, host)
    }
}

impl fmt::Debug for ContentRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentRenderer(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    Container(ElementId),
    Service(SmartString<LazyCompact>),
}

#[derive(Clone)]
pub enum RegistryValue {
    Map(SharedMap),
    ContentRenderer(ContentRenderer),
}

/// Keyed store scoped to one render root.
///
/// Maps are stored under their container, services under a well-known name.
/// Inserting under an existing key replaces the previous value.
#[derive(Default)]
pub struct RootRegistry {
    entries: HashMap<RegistryKey, RegistryValue>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: RegistryKey, value: RegistryValue) -> Option<RegistryValue> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &RegistryKey) -> Option<&RegistryValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &RegistryKey) -> Option<RegistryValue> {
        self.entries.remove(key)
    }

    pub fn register_map(&mut self, container: ElementId, map: SharedMap) {
        self.insert(RegistryKey::Container(container), RegistryValue::Map(map));
    }

    pub fn map(&self, container: ElementId) -> Option<SharedMap> {
        match self.get(&RegistryKey::Container(container))? {
            RegistryValue::Map(map) => Some(map.clone()),
            _ => None,
        }
    }

    pub fn register_service(&mut self, name: &str, value: RegistryValue) {
        self.insert(RegistryKey::Service(name.into()), value);
    }

    pub fn service(&self, name: &str) -> Option<&RegistryValue> {
        self.get(&RegistryKey::Service(name.into()))
    }

    pub fn content_renderer(&self, name: &str) -> Option<ContentRenderer> {
        match self.service(name)? {
            RegistryValue::ContentRenderer(renderer) => Some(renderer.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RootRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
