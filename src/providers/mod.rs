use crate::core::error::HomechatError;
use crate::tools::{ToolCallRequest, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod base_client;
pub mod factory;
pub mod ollama;
pub mod openai;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Tool invocations requested by an assistant reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// For `tool` messages, the id of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>, tool_call_id: Option<String>) -> Self {
        Self {
            tool_call_id,
            ..Self::new(Role::Tool, content)
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCallRequest>) -> Self {
        self.tool_calls = calls;
        self
    }
}

/// Function-tool entry in the wire format shared by Ollama and OpenAI.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
struct FunctionSpec {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

impl From<&ToolDescriptor> for FunctionTool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Self {
            kind: "function",
            function: FunctionSpec {
                name: descriptor.name(),
                description: descriptor.description,
                parameters: descriptor.parameters_schema(),
            },
        }
    }
}

pub fn function_tools(tools: Option<&[ToolDescriptor]>) -> Option<Vec<FunctionTool>> {
    tools.map(|tools| tools.iter().map(FunctionTool::from).collect())
}

/// A chat-completion service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the whole history. `tools` is the catalog the model may call;
    /// `None` asks for a plain answer. Returns the assistant reply.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<Message, HomechatError>;

    fn model(&self) -> &str;

    fn set_model(&mut self, model: &str);
}
