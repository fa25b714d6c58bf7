use super::handler::{
    AddLampTool, CurrentDateTool, CurrentTimeTool, HomeStateTool, TodoTool, ToggleLampTool,
    ToolHandler,
};
use super::{ToolDescriptor, ToolName};
use crate::core::error::{HomechatError, ToolError};
use crate::home::SharedHome;
use crate::home::device::DeviceClient;
use crate::todo::TodoClient;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Maps every tool to its descriptor and handler.
pub struct ToolRegistry {
    handlers: HashMap<ToolName, Arc<dyn ToolHandler>>,
    catalog: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            handlers: Vec::new(),
        }
    }

    /// Registry wired to the home, the lamp endpoint and the to-do source.
    pub fn standard(
        home: SharedHome,
        device: DeviceClient,
        todo: TodoClient,
    ) -> Result<Self, HomechatError> {
        Self::builder()
            .register(CurrentTimeTool)
            .register(CurrentDateTool)
            .register(TodoTool::new(todo))
            .register(AddLampTool::new(home.clone()))
            .register(ToggleLampTool::new(home.clone(), device))
            .register(HomeStateTool::new(home))
            .build()
    }

    /// Descriptors advertised to the chat service.
    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    pub fn resolve(
        &self,
        name: &str,
    ) -> Result<(ToolDescriptor, Arc<dyn ToolHandler>), ToolError> {
        let tool =
            ToolName::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let handler = self
            .handlers
            .get(&tool)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        Ok((tool.descriptor(), handler))
    }
}

pub struct ToolRegistryBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistryBuilder {
    pub fn register<H: ToolHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Fails unless each tool has exactly one handler.
    pub fn build(self) -> Result<ToolRegistry, HomechatError> {
        let mut handlers = HashMap::new();
        for handler in self.handlers {
            let tool = handler.tool();
            if handlers.insert(tool, handler).is_some() {
                return Err(HomechatError::Config(format!(
                    "tool '{}' registered more than once",
                    tool
                )));
            }
        }

        let catalog: Vec<ToolDescriptor> = ToolName::ALL.iter().map(ToolName::descriptor).collect();
        let advertised: HashSet<ToolName> = catalog.iter().map(|d| d.tool).collect();
        let dispatchable: HashSet<ToolName> = handlers.keys().copied().collect();
        if advertised != dispatchable {
            let mut missing: Vec<&str> = advertised
                .difference(&dispatchable)
                .map(|t| t.as_str())
                .collect();
            missing.sort_unstable();
            return Err(HomechatError::Config(format!(
                "no handler registered for: {}",
                missing.join(", ")
            )));
        }

        Ok(ToolRegistry { handlers, catalog })
    }
}
