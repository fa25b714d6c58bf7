use crate::core::error::HomechatError;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON-over-HTTP client shared by the chat providers.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    auth_header: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(endpoint: String, auth_header: Option<(String, String)>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_header,
        }
    }

    /// POSTs `payload` and decodes the JSON reply. Non-2xx statuses and
    /// undecodable bodies are service errors.
    pub async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<R, HomechatError> {
        let url = format!("{}/{}", self.endpoint, path);
        let mut request = self.client.post(&url).json(payload);

        if let Some((key, value)) = &self.auth_header {
            request = request.header(key, value);
        }

        debug!(%url, "posting chat request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HomechatError::Service(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| HomechatError::Service(format!("malformed response from {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_auth_header_and_decodes_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(
            format!("{}/", server.uri()),
            Some(("Authorization".into(), "Bearer secret".into())),
        );
        let reply: Value = client.post("chat", &json!({"q": 1})).await.unwrap();

        assert_eq!(reply, json!({"ok": true}));
    }

    #[tokio::test]
    async fn non_success_status_is_a_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = HttpClient::new(server.uri(), None);
        let err = client.post::<_, Value>("chat", &json!({})).await.unwrap_err();

        match err {
            HomechatError::Service(message) => assert!(message.ends_with("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
