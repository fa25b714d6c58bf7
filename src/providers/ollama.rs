use super::base_client::HttpClient;
use super::{ChatProvider, FunctionTool, Message, Role, function_tools};
use crate::core::error::HomechatError;
use crate::tools::{ToolCallRequest, ToolDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<FunctionTool>>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: WireMessage,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    function: WireFunction {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
        }
    }
}

/// Native Ollama `/api/chat` client. Ollama does not assign tool call ids.
#[derive(Clone)]
pub struct OllamaProvider {
    client: HttpClient,
    model: String,
}

impl OllamaProvider {
    pub fn new(model: String) -> Self {
        Self::with_endpoint(DEFAULT_BASE_URL.to_string(), model)
    }

    pub fn with_endpoint(endpoint: String, model: String) -> Self {
        Self {
            client: HttpClient::new(endpoint, None),
            model,
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for OllamaProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<Message, HomechatError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            tools: function_tools(tools),
        };

        let response: ChatResponse = self.client.post("api/chat", &payload).await?;
        if response.message.role != Role::Assistant.as_str() {
            return Err(HomechatError::Service(format!(
                "expected an assistant reply, got role '{}'",
                response.message.role
            )));
        }

        let calls = response
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCallRequest::new(call.function.name, call.function.arguments))
            .collect();
        Ok(Message::assistant(response.message.content).with_tool_calls(calls))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn decodes_tool_calls_from_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3.1", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        {"function": {"name": "toggle_lamp", "arguments": {"state": "on"}}}
                    ]
                },
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::with_endpoint(server.uri(), DEFAULT_MODEL.to_string());
        let catalog = catalog();
        let reply = provider
            .chat(&[Message::user("turn on the lamp")], Some(&catalog))
            .await
            .unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(
            reply.tool_calls,
            vec![ToolCallRequest::new("toggle_lamp", json!({"state": "on"}))]
        );
    }

    #[tokio::test]
    async fn omits_tools_when_none_given() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "Done."}
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::with_endpoint(server.uri(), DEFAULT_MODEL.to_string());
        let reply = provider.chat(&[Message::user("hi")], None).await.unwrap();
        assert_eq!(reply.content, "Done.");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[tokio::test]
    async fn server_error_is_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::with_endpoint(server.uri(), DEFAULT_MODEL.to_string());
        let err = provider.chat(&[Message::user("hi")], None).await.unwrap_err();
        assert!(err.is_service_failure());
        assert!(err.to_string().contains("model not loaded"));
    }
}
