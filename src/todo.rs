use crate::core::error::HomechatError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TODO_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Read-only client for the external to-do source.
#[derive(Debug, Clone)]
pub struct TodoClient {
    client: Client,
    url: String,
}

impl TodoClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<Todo, HomechatError> {
        debug!(url = %self.url, "fetching todo");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HomechatError::Network(format!(
                "{} returned {}",
                self.url, status
            )));
        }
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| HomechatError::Serialization(format!("invalid todo payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_and_decodes_camel_case_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userId": 1,
                "id": 1,
                "title": "delectus aut autem",
                "completed": false
            })))
            .mount(&server)
            .await;

        let client = TodoClient::new(format!("{}/todos/1", server.uri()));
        let todo = client.fetch().await.unwrap();
        assert_eq!(
            todo,
            Todo {
                user_id: 1,
                id: 1,
                title: "delectus aut autem".into(),
                completed: false
            }
        );
    }

    #[tokio::test]
    async fn error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = TodoClient::new(format!("{}/todos/1", server.uri()));
        let err = client.fetch().await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn malformed_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = TodoClient::new(format!("{}/todos/1", server.uri()));
        assert!(client.fetch().await.is_err());
    }
}
