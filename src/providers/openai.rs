use super::base_client::HttpClient;
use super::{ChatProvider, FunctionTool, Message, function_tools};
use crate::core::error::HomechatError;
use crate::tools::{ToolCallRequest, ToolDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<FunctionTool>>,
}

#[derive(Serialize)]
struct ChatCompletionMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

impl From<&Message> for ChatCompletionMessage {
    fn from(message: &Message) -> Self {
        let tool_calls: Vec<WireToolCall> = message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: function_kind(),
                function: WireFunction {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect();
        // Assistant tool-call turns usually carry no text; the API wants null there.
        let content = if message.content.is_empty() && !tool_calls.is_empty() {
            None
        } else {
            Some(message.content.clone())
        };
        Self {
            role: message.role.as_str(),
            content,
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

fn decode_tool_call(call: WireToolCall) -> Result<ToolCallRequest, HomechatError> {
    let arguments = if call.function.arguments.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(&call.function.arguments).map_err(|e| {
            HomechatError::Service(format!(
                "tool call '{}' has malformed arguments: {}",
                call.function.name, e
            ))
        })?
    };
    Ok(ToolCallRequest {
        id: call.id,
        name: call.function.name,
        arguments,
    })
}

/// Client for OpenAI and OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAIProvider {
    client: HttpClient,
    model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_endpoint(DEFAULT_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: Option<String>, model: String) -> Self {
        let auth_header = api_key.map(|key| ("Authorization".to_string(), format!("Bearer {}", key)));
        Self {
            client: HttpClient::new(endpoint, auth_header),
            model,
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<Message, HomechatError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: messages.iter().map(ChatCompletionMessage::from).collect(),
            tools: function_tools(tools),
        };

        let response: ChatCompletionResponse =
            self.client.post("chat/completions", &payload).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HomechatError::Service("No choices in API response".to_string()))?;

        let calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(decode_tool_call)
            .collect::<Result<Vec<_>, _>>()?;
        let content = choice.message.content.unwrap_or_default();
        Ok(Message::assistant(content.trim()).with_tool_calls(calls))
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
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAIProvider {
        OpenAIProvider::with_endpoint(
            server.uri(),
            Some("sk-test".to_string()),
            DEFAULT_MODEL.to_string(),
        )
    }

    #[tokio::test]
    async fn parses_string_encoded_arguments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "add_lamp", "arguments": "{\"name\":\"desk\"}"}
                        }]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog();
        let reply = provider(&server)
            .chat(&[Message::user("add a desk lamp")], Some(&catalog))
            .await
            .unwrap();

        assert_eq!(reply.content, "");
        assert_eq!(
            reply.tool_calls,
            vec![ToolCallRequest::new("add_lamp", json!({"name": "desk"})).with_id("call_1")]
        );

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["tools"].as_array().map(Vec::len), Some(6));
    }

    #[tokio::test]
    async fn history_round_trips_ids_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Done."}}]
            })))
            .mount(&server)
            .await;

        let history = vec![
            Message::user("lamp on"),
            Message::assistant("").with_tool_calls(vec![
                ToolCallRequest::new("toggle_lamp", json!({"state": "on"})).with_id("call_9"),
            ]),
            Message::tool("Success", Some("call_9".into())),
        ];
        let reply = provider(&server).chat(&history, None).await.unwrap();
        assert_eq!(reply.content, "Done.");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("tools").is_none());
        let assistant = &body["messages"][1];
        assert_eq!(assistant["content"], Value::Null);
        assert_eq!(assistant["tool_calls"][0]["id"], "call_9");
        assert_eq!(assistant["tool_calls"][0]["function"]["arguments"], "{\"state\":\"on\"}");
        assert_eq!(body["messages"][2]["tool_call_id"], "call_9");
    }

    #[tokio::test]
    async fn malformed_arguments_are_a_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": null, "tool_calls": [{
                    "id": "x", "type": "function",
                    "function": {"name": "toggle_lamp", "arguments": "{state:"}
                }]}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .chat(&[Message::user("hi")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, HomechatError::Service(_)));
    }

    #[tokio::test]
    async fn empty_choices_are_a_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .chat(&[Message::user("hi")], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No choices"));
    }
}
