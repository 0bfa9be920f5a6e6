//! Component state snapshots.
//!
//! A `StateMap` is an ordered string-keyed map of scalar values. Partial
//! states fold into a base state by shallow merge: each key of the
//! partial replaces or appends, existing keys keep their position.

use std::sync::Arc;

use crate::props::Value;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateMap {
    entries: Vec<(Arc<str>, Value)>,
}

impl StateMap {
    pub fn new() -> StateMap {
        StateMap::default()
    }

    pub fn with(mut self, key: impl Into<Arc<str>>, value: Value) -> StateMap {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<Arc<str>>, value: Value) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| &**existing == key)
            .map(|(_, value)| value)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// Shallow merge of `partial` into `self`.
    pub fn merge_from(&mut self, partial: &StateMap) {
        for (key, value) in &partial.entries {
            self.set(key.clone(), value.clone());
        }
    }

    pub fn merged(&self, partial: &StateMap) -> StateMap {
        let mut next = self.clone();
        next.merge_from(partial);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(Arc<str>, Value)] {
        &self.entries
    }
}
