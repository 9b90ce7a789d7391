//! Function parameter schemas
//!
//! Every registered function declares a schema so an external tool-calling
//! agent (or a test harness) can enumerate the available operations. The
//! schema doubles as advisory pre-invocation validation: required parameters
//! and enum membership are checked before the handler runs, but the handler
//! stays the final authority on its inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameter value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// Array of strings (customization lists)
    Array,
}

/// Declared shape of one function parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Value type
    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Human-readable description for the agent
    pub description: String,

    /// Whether the parameter must be present
    #[serde(default)]
    pub required: bool,

    /// Closed set of accepted values, when applicable
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParamSpec {
    /// A string parameter
    #[must_use]
    pub fn string(description: &str) -> Self {
        Self {
            param_type: ParamType::String,
            description: description.to_string(),
            required: false,
            allowed: None,
        }
    }

    /// An integer parameter
    #[must_use]
    pub fn integer(description: &str) -> Self {
        Self {
            param_type: ParamType::Integer,
            description: description.to_string(),
            required: false,
            allowed: None,
        }
    }

    /// A number parameter
    #[must_use]
    pub fn number(description: &str) -> Self {
        Self {
            param_type: ParamType::Number,
            description: description.to_string(),
            required: false,
            allowed: None,
        }
    }

    /// A string-array parameter
    #[must_use]
    pub fn string_array(description: &str) -> Self {
        Self {
            param_type: ParamType::Array,
            description: description.to_string(),
            required: false,
            allowed: None,
        }
    }

    /// Mark the parameter as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the parameter to a closed value set
    #[must_use]
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(ToString::to_string).collect());
        self
    }
}

/// Declared schema of one registered function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Unique function name
    pub name: String,

    /// Description for the agent
    pub description: String,

    /// Parameter specs, keyed by parameter name
    pub parameters: BTreeMap<String, ParamSpec>,
}

impl FunctionSchema {
    /// Start a schema with no parameters
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn param(mut self, name: &str, spec: ParamSpec) -> Self {
        self.parameters.insert(name.to_string(), spec);
        self
    }

    /// Validate parsed arguments against this schema
    ///
    /// Checks that the arguments are an object, that every required
    /// parameter is present, and that enum-restricted parameters carry an
    /// accepted value. Deeper type checking is left to the handler.
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first problem found.
    pub fn validate(&self, args: &serde_json::Value) -> Result<()> {
        let Some(map) = args.as_object() else {
            return Err(Error::Validation(format!(
                "arguments for {} must be a JSON object",
                self.name
            )));
        };

        for (name, spec) in &self.parameters {
            let value = map.get(name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if spec.required {
                    return Err(Error::Validation(format!(
                        "missing required parameter '{name}' for {}",
                        self.name
                    )));
                }
                continue;
            };

            if let Some(allowed) = &spec.allowed {
                let ok = value
                    .as_str()
                    .is_some_and(|s| allowed.iter().any(|a| a == s));
                if !ok {
                    return Err(Error::Validation(format!(
                        "invalid value {value} for parameter '{name}' of {}; valid: {}",
                        self.name,
                        allowed.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FunctionSchema {
        FunctionSchema::new("add_item_to_order", "Add an item to the current order")
            .param("item_name", ParamSpec::string("Menu item name").required())
            .param("quantity", ParamSpec::integer("How many"))
            .param(
                "payment_method",
                ParamSpec::string("Payment method").one_of(&["card", "cash", "mobile"]),
            )
    }

    #[test]
    fn accepts_valid_arguments() {
        let schema = schema();
        schema
            .validate(&json!({"item_name": "latte", "quantity": 2}))
            .unwrap();
        schema
            .validate(&json!({"item_name": "latte", "payment_method": "cash"}))
            .unwrap();
    }

    #[test]
    fn rejects_missing_required() {
        let schema = schema();
        let err = schema.validate(&json!({"quantity": 2})).unwrap_err();
        assert!(err.to_string().contains("item_name"));
    }

    #[test]
    fn rejects_bad_enum_value() {
        let schema = schema();
        let err = schema
            .validate(&json!({"item_name": "latte", "payment_method": "barter"}))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("payment_method"));
        assert!(msg.contains("card, cash, mobile"));
    }

    #[test]
    fn rejects_non_object_arguments() {
        let schema = schema();
        assert!(schema.validate(&json!("latte")).is_err());
        assert!(schema.validate(&json!([1, 2])).is_err());
    }

    #[test]
    fn null_optional_is_treated_as_absent() {
        let schema = schema();
        schema
            .validate(&json!({"item_name": "latte", "payment_method": null}))
            .unwrap();
    }

    #[test]
    fn serializes_to_plain_document() {
        let doc = serde_json::to_value(schema()).unwrap();
        assert_eq!(doc["name"], "add_item_to_order");
        assert_eq!(doc["parameters"]["item_name"]["type"], "string");
        assert_eq!(doc["parameters"]["item_name"]["required"], true);
        assert_eq!(
            doc["parameters"]["payment_method"]["enum"][0],
            "card"
        );
    }
}
