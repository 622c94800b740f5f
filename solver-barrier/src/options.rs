//! Named option storage.
//!
//! Options are looked up by name with an optional prefix: a value stored
//! under `prefix + name` takes precedence over one stored under `name`.
//! This lets several algorithm components share one list while still
//! allowing per-component overrides (e.g. `"resto.mu_max"`).

use std::collections::HashMap;

use crate::error::{BarrierError, BarrierResult};

/// A single stored option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Numeric(f64),
    Integer(i64),
    String(String),
}

/// Named options with prefix lookup.
#[derive(Debug, Clone, Default)]
pub struct OptionsList {
    values: HashMap<String, OptionValue>,
}

impl OptionsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_numeric(&mut self, name: &str, value: f64) -> &mut Self {
        self.values.insert(name.to_string(), OptionValue::Numeric(value));
        self
    }

    pub fn set_integer(&mut self, name: &str, value: i64) -> &mut Self {
        self.values.insert(name.to_string(), OptionValue::Integer(value));
        self
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values
            .insert(name.to_string(), OptionValue::String(value.into()));
        self
    }

    /// Raw lookup, prefixed name first.
    pub fn get(&self, name: &str, prefix: &str) -> Option<&OptionValue> {
        if !prefix.is_empty() {
            let prefixed = format!("{prefix}{name}");
            if let Some(v) = self.values.get(&prefixed) {
                return Some(v);
            }
        }
        self.values.get(name)
    }

    /// Numeric lookup. Integer values are widened to `f64`.
    pub fn get_numeric(&self, name: &str, prefix: &str) -> BarrierResult<Option<f64>> {
        match self.get(name, prefix) {
            None => Ok(None),
            Some(OptionValue::Numeric(v)) => Ok(Some(*v)),
            Some(OptionValue::Integer(v)) => Ok(Some(*v as f64)),
            Some(OptionValue::String(_)) => Err(BarrierError::OptionType {
                option: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    pub fn get_integer(&self, name: &str, prefix: &str) -> BarrierResult<Option<i64>> {
        match self.get(name, prefix) {
            None => Ok(None),
            Some(OptionValue::Integer(v)) => Ok(Some(*v)),
            Some(_) => Err(BarrierError::OptionType {
                option: name.to_string(),
                expected: "integer",
            }),
        }
    }

    pub fn get_string(&self, name: &str, prefix: &str) -> BarrierResult<Option<&str>> {
        match self.get(name, prefix) {
            None => Ok(None),
            Some(OptionValue::String(v)) => Ok(Some(v.as_str())),
            Some(_) => Err(BarrierError::OptionType {
                option: name.to_string(),
                expected: "string",
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
