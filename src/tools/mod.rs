//! Tool catalog advertised to the chat service.
//!
//! The set of tools is closed: `ToolName` enumerates every tool, and each
//! variant owns exactly one descriptor. The registry refuses to build unless a
//! handler exists for every variant, so the catalog sent to the model and the
//! set of dispatchable handlers can never drift apart.

pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::{ToolDispatcher, ToolOutcome};
pub use handler::ToolHandler;
pub use registry::ToolRegistry;

use crate::core::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Arguments after validation against a descriptor.
pub type ToolArguments = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    CurrentTime,
    CurrentDate,
    Todo,
    AddLamp,
    ToggleLamp,
    HomeState,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::CurrentTime,
        ToolName::CurrentDate,
        ToolName::Todo,
        ToolName::AddLamp,
        ToolName::ToggleLamp,
        ToolName::HomeState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::CurrentTime => "get_current_time",
            ToolName::CurrentDate => "get_current_date",
            ToolName::Todo => "get_todo",
            ToolName::AddLamp => "add_lamp",
            ToolName::ToggleLamp => "toggle_lamp",
            ToolName::HomeState => "get_home_state",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let (description, parameters): (&'static str, &'static [ParameterSpec]) = match self {
            ToolName::CurrentTime => (
                "get the current time, use this if you cant access location and real time data",
                &[],
            ),
            ToolName::CurrentDate => (
                "get the current date and not the time, use this if you cant access location and real time data",
                &[],
            ),
            ToolName::Todo => ("get the related todo", &[]),
            ToolName::AddLamp => (
                "add a lamp to the home",
                &[ParameterSpec {
                    name: "name",
                    description: "name of the lamp",
                    required: true,
                    allowed: &[],
                }],
            ),
            ToolName::ToggleLamp => (
                "turn the lamp on,off,blink",
                &[
                    ParameterSpec {
                        name: "state",
                        description: "on, off, blink representing the state of the lamp",
                        required: true,
                        allowed: &["on", "off", "blink"],
                    },
                    ParameterSpec {
                        name: "name",
                        description: "name of the lamp, defaults to 'lamp'",
                        required: false,
                        allowed: &[],
                    },
                ],
            ),
            ToolName::HomeState => (
                "get the state of the home, used to check if the lamp is on or off",
                &[],
            ),
        };
        ToolDescriptor {
            tool: *self,
            description,
            parameters,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single string-valued parameter accepted by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    /// Permitted values; empty means any string.
    pub allowed: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub tool: ToolName,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
}

impl ToolDescriptor {
    pub fn name(&self) -> &'static str {
        self.tool.as_str()
    }

    /// JSON Schema for the parameters. Parameterless tools get an empty
    /// object schema rather than a non-standard `"type": "none"`.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.parameters {
            let mut property = json!({
                "type": "string",
                "description": param.description,
            });
            if !param.allowed.is_empty() {
                property["enum"] = json!(param.allowed);
            }
            properties.insert(param.name.to_string(), property);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Checks raw model-supplied arguments against the declared parameters.
    ///
    /// Accepts an object, a JSON-encoded object string, or null. Scalars are
    /// coerced to strings; undeclared keys are dropped.
    pub fn validate(&self, raw: &Value) -> Result<ToolArguments, ToolError> {
        let parsed;
        let supplied = match raw {
            Value::Null => return self.validate_map(&Map::new()),
            Value::Object(map) => map,
            Value::String(text) if text.trim().is_empty() => {
                return self.validate_map(&Map::new());
            }
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text)
                    .map_err(|e| ToolError::invalid(self.name(), format!("arguments are not valid JSON: {}", e)))?;
                match &parsed {
                    Value::Object(map) => map,
                    _ => return Err(ToolError::invalid(self.name(), "arguments must be an object")),
                }
            }
            _ => return Err(ToolError::invalid(self.name(), "arguments must be an object")),
        };
        self.validate_map(supplied)
    }

    fn validate_map(&self, supplied: &Map<String, Value>) -> Result<ToolArguments, ToolError> {
        let mut validated = Map::new();
        for param in self.parameters {
            let value = match supplied.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::invalid(
                        self.name(),
                        format!("missing required argument '{}'", param.name),
                    ));
                }
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(_) => {
                    return Err(ToolError::invalid(
                        self.name(),
                        format!("argument '{}' must be a string", param.name),
                    ));
                }
            };
            if !param.allowed.is_empty() && !param.allowed.contains(&value.as_str()) {
                return Err(ToolError::invalid(
                    self.name(),
                    format!(
                        "'{}' must be one of {} (got '{}')",
                        param.name,
                        param.allowed.join(", "),
                        value
                    ),
                ));
            }
            validated.insert(param.name.to_string(), Value::String(value));
        }
        Ok(validated)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation token, when the chat service supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// The full catalog, in declaration order.
pub fn catalog() -> Vec<ToolDescriptor> {
    ToolName::ALL.iter().map(ToolName::descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_uniquely_named_tools() {
        let names: Vec<&str> = catalog().iter().map(ToolDescriptor::name).collect();
        assert_eq!(
            names,
            vec![
                "get_current_time",
                "get_current_date",
                "get_todo",
                "add_lamp",
                "toggle_lamp",
                "get_home_state"
            ]
        );
        for name in names {
            assert_eq!(ToolName::from_name(name).map(|t| t.as_str()), Some(name));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(ToolName::from_name("toggle_lamp"), Some(ToolName::ToggleLamp));
        assert_eq!(ToolName::from_name("Toggle_Lamp"), None);
        assert_eq!(ToolName::from_name("toggle"), None);
    }

    #[test]
    fn parameterless_tools_use_empty_object_schema() {
        let schema = ToolName::CurrentTime.descriptor().parameters_schema();
        assert_eq!(
            schema,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn toggle_schema_advertises_state_enum() {
        let schema = ToolName::ToggleLamp.descriptor().parameters_schema();
        assert_eq!(schema["properties"]["state"]["enum"], json!(["on", "off", "blink"]));
        assert_eq!(schema["required"], json!(["state"]));
        assert!(schema["properties"]["name"].get("enum").is_none());
    }

    #[test]
    fn validate_rejects_state_outside_enum() {
        let err = ToolName::ToggleLamp
            .descriptor()
            .validate(&json!({"state": "xyz"}))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref tool, .. } if tool == "toggle_lamp"));
    }

    #[test]
    fn validate_requires_required_arguments() {
        let err = ToolName::AddLamp.descriptor().validate(&json!({})).unwrap_err();
        assert!(err.to_string().contains("missing required argument 'name'"));
    }

    #[test]
    fn validate_accepts_encoded_objects_and_drops_extras() {
        let args = ToolName::ToggleLamp
            .descriptor()
            .validate(&json!("{\"state\":\"on\",\"brightness\":4}"))
            .unwrap();
        assert_eq!(Value::Object(args), json!({"state": "on"}));

        let args = ToolName::CurrentDate.descriptor().validate(&Value::Null).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn validate_coerces_scalars_to_strings() {
        let args = ToolName::AddLamp
            .descriptor()
            .validate(&json!({"name": 7}))
            .unwrap();
        assert_eq!(args["name"], json!("7"));
    }
}
