//! Request entrante, independiente del framework HTTP.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DataMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardRequest {
    input: DataMap,
}

impl WizardRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_input(input: DataMap) -> Self {
        Self { input }
    }

    /// Builder: agrega un valor al input.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    pub fn input(&self) -> &DataMap {
        &self.input
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.input.contains_key(key)
    }
}

impl From<Value> for WizardRequest {
    /// Un valor que no es objeto produce un request vacío.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(input) => Self { input },
            _ => Self::default(),
        }
    }
}
