//! Decoded protocol payloads.

use std::collections::hash_map::{Entry, HashMap};

/// Ordered key/value pairs decoded from one `fetch` response.
///
/// Keys keep the order in which the node sent them. A key sent twice keeps
/// its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricRecord {
    entries: Vec<(String, String)>,
    /// Position of each key in `entries`
    index: HashMap<String, usize>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.index.entry(key) {
            Entry::Occupied(slot) => self.entries[*slot.get()].1 = value,
            Entry::Vacant(slot) => {
                self.entries.push((slot.key().clone(), value));
                slot.insert(self.entries.len() - 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for MetricRecord {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetricRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}
