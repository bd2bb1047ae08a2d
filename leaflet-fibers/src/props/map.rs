use super::value::PropValue;
use smartstring::{LazyCompact, SmartString};

pub type PropKey = SmartString<LazyCompact>;

/// Declared props in declaration order.
///
/// Iteration follows insertion order; re-inserting an existing key replaces
/// its value in place.
#[derive(Clone, Debug, Default)]
pub struct Props {
    entries: Vec<(PropKey, PropValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<PropValue>) -> Option<PropValue> {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key.into(), value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let index = self.entries.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Overlay `other` onto `self`, keeping the position of existing keys.
    pub fn merge(&mut self, other: &Props) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut props = Props::new();
        for (k, v) in iter {
            props.insert(k.as_ref(), v);
        }
        props
    }
}
