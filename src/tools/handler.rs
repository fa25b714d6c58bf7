use super::{ToolArguments, ToolName};
use crate::core::error::ToolError;
use crate::home::device::{DeviceClient, LampCommand};
use crate::home::{DEFAULT_LAMP, SharedHome};
use crate::todo::TodoClient;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Executes one tool. Arguments have already been validated against the
/// tool's descriptor by the time `call` runs.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tool(&self) -> ToolName;
    async fn call(&self, args: &ToolArguments) -> Result<String, ToolError>;
}

fn str_arg<'a>(args: &'a ToolArguments, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub struct CurrentTimeTool;
pub struct CurrentDateTool;

pub struct TodoTool {
    client: TodoClient,
}

pub struct AddLampTool {
    home: SharedHome,
}

pub struct ToggleLampTool {
    home: SharedHome,
    device: DeviceClient,
}

pub struct HomeStateTool {
    home: SharedHome,
}

impl TodoTool {
    pub fn new(client: TodoClient) -> Self {
        Self { client }
    }
}

impl AddLampTool {
    pub fn new(home: SharedHome) -> Self {
        Self { home }
    }
}

impl ToggleLampTool {
    pub fn new(home: SharedHome, device: DeviceClient) -> Self {
        Self { home, device }
    }
}

impl HomeStateTool {
    pub fn new(home: SharedHome) -> Self {
        Self { home }
    }
}

#[async_trait]
impl ToolHandler for CurrentTimeTool {
    fn tool(&self) -> ToolName {
        ToolName::CurrentTime
    }

    async fn call(&self, _args: &ToolArguments) -> Result<String, ToolError> {
        Ok(chrono::Local::now().format("%-I:%M:%S %p").to_string())
    }
}

#[async_trait]
impl ToolHandler for CurrentDateTool {
    fn tool(&self) -> ToolName {
        ToolName::CurrentDate
    }

    async fn call(&self, _args: &ToolArguments) -> Result<String, ToolError> {
        Ok(chrono::Local::now().format("%-m/%-d/%Y").to_string())
    }
}

#[async_trait]
impl ToolHandler for TodoTool {
    fn tool(&self) -> ToolName {
        ToolName::Todo
    }

    async fn call(&self, _args: &ToolArguments) -> Result<String, ToolError> {
        let todo = self
            .client
            .fetch()
            .await
            .map_err(|e| ToolError::failure(self.tool().as_str(), e.to_string()))?;
        serde_json::to_string(&todo)
            .map_err(|e| ToolError::failure(self.tool().as_str(), e.to_string()))
    }
}

#[async_trait]
impl ToolHandler for AddLampTool {
    fn tool(&self) -> ToolName {
        ToolName::AddLamp
    }

    async fn call(&self, args: &ToolArguments) -> Result<String, ToolError> {
        let name = str_arg(args, "name").map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ToolError::invalid(self.tool().as_str(), "lamp name must not be empty"));
        }

        if self.home.add_lamp(name) {
            info!(lamp = name, "lamp added");
            Ok(format!("Added lamp '{}'", name))
        } else {
            Ok(format!("Lamp '{}' already exists", name))
        }
    }
}

#[async_trait]
impl ToolHandler for ToggleLampTool {
    fn tool(&self) -> ToolName {
        ToolName::ToggleLamp
    }

    async fn call(&self, args: &ToolArguments) -> Result<String, ToolError> {
        let tool = self.tool().as_str();
        let state = str_arg(args, "state").unwrap_or_default();
        let command = LampCommand::parse(state).ok_or_else(|| {
            ToolError::invalid(tool, format!("'state' must be one of on, off, blink (got '{}')", state))
        })?;
        let name = str_arg(args, "name").unwrap_or(DEFAULT_LAMP);

        if self.device.path_for(command).is_none() {
            return Err(ToolError::invalid(
                tool,
                format!("'{}' is not supported by this device", command),
            ));
        }
        // Check before touching the device so an unknown lamp causes no side effect.
        if !self.home.contains(name) {
            return Err(ToolError::StateNotFound(name.to_string()));
        }

        self.device
            .send(command)
            .await
            .map_err(|e| ToolError::failure(tool, e.to_string()))?;

        match command.resulting_state() {
            Some(on) => {
                self.home.set_lamp(name, on)?;
                Ok(format!("Success: lamp '{}' turned {}", name, command))
            }
            None => Ok(format!("Success: lamp '{}' is blinking", name)),
        }
    }
}

#[async_trait]
impl ToolHandler for HomeStateTool {
    fn tool(&self) -> ToolName {
        ToolName::HomeState
    }

    async fn call(&self, _args: &ToolArguments) -> Result<String, ToolError> {
        serde_json::to_string(&self.home.snapshot())
            .map_err(|e| ToolError::failure(self.tool().as_str(), e.to_string()))
    }
}
