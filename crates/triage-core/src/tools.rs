//! Tool-call argument access.
//!
//! The model sends tool arguments as a JSON-encoded object. [`ToolArgs`]
//! parses that payload once and offers typed accessors; missing or
//! mistyped parameters surface as error strings fed back to the model
//! rather than terminating the conversation.

use serde_json::Value;
use std::collections::HashMap;

/// Parsed arguments of one tool call.
#[derive(Debug, Clone)]
pub struct ToolArgs {
    params: HashMap<String, Value>,
}

impl ToolArgs {
    /// Parse arguments from the JSON string carried by a tool call.
    pub fn from_json(arguments_json: &str) -> Result<Self, serde_json::Error> {
        let params: HashMap<String, Value> = serde_json::from_str(arguments_json)?;
        Ok(Self { params })
    }

    /// Build arguments directly from a map (test helper).
    pub fn from_map(params: HashMap<String, Value>) -> Self {
        Self { params }
    }

    /// Get an optional string argument.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument, or an error message for the model.
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }

    /// Get an optional boolean argument with a default.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// Get an optional numeric argument.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(|v| v.as_f64())
    }

    /// Iterate over all present (non-null) arguments.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }
}
