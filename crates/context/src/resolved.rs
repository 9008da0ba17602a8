//! Resolution results handed to constructors and property setters

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::binding::{downcast, BoundValue};
use crate::errors::{ContextError, Result};

/// Resolved parameter values in declared order
#[derive(Debug, Clone)]
pub struct Arguments {
    target: String,
    values: Vec<BoundValue>,
}

impl Arguments {
    pub fn new(target: impl Into<String>, values: Vec<BoundValue>) -> Self {
        Self {
            target: target.into(),
            values,
        }
    }

    /// Collapse per-position slots; every slot must have been written
    pub(crate) fn from_slots(target: String, slots: Vec<Option<BoundValue>>) -> Result<Self> {
        let values = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| ContextError::MissingArgumentInjection {
                    target: target.clone(),
                    index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { target, values })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed access to the value at `index`
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let value = self.get_raw(index)?;
        downcast(value, &self.target, format!("argument {}", index + 1))
    }

    /// Untyped access to the value at `index`
    pub fn get_raw(&self, index: usize) -> Result<BoundValue> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| ContextError::MissingArgumentInjection {
                target: self.target.clone(),
                index,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundValue> {
        self.values.iter()
    }

    pub fn into_inner(self) -> Vec<BoundValue> {
        self.values
    }
}

/// Resolved property values by name; no ordering
#[derive(Debug, Clone, Default)]
pub struct Properties {
    target: String,
    values: HashMap<String, BoundValue>,
}

impl Properties {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            values: HashMap::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) -> Option<BoundValue> {
        self.values.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Typed access to property `name`
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let value = self
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| ContextError::UnknownProperty {
                target: self.target.clone(),
                property: name.to_string(),
            })?;
        downcast(value, &self.target, format!("property {name}"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_inner(self) -> HashMap<String, BoundValue> {
        self.values
    }
}

impl IntoIterator for Properties {
    type Item = (String, BoundValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, BoundValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
