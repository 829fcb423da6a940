// src/api.rs

use crate::{
    config::Config,
    errors::{LoupeError, LoupeResult},
    logging::log_api_call,
    models::{ApiCallLog, LogRecord, SessionViewInfo},
};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;

// Query documents for the gateway's (fixed) schema.
pub const STORAGES_QUERY: &str = "query { storages { name createdAt updatedAt } }";
pub const STORAGE_READ_AT_QUERY: &str = "query StorageReadAt($name: String!, $start: Int, $length: Int) { \
     storageReadAt(name: $name, start: $start, length: $length) { \
     id record { level elapsed category message modulePath file line kv { json } } } }";

/// GraphQL client for the log storage gateway.
///
/// Built once from the [`Config`] and passed by reference to the fetch
/// tasks; the endpoint and headers live here, not in any global.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoint: String,
    authorization: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.endpoint.clone(),
            authorization: config.authorization.clone(),
        }
    }

    /// Lists every known session.
    pub async fn storages(&self) -> LoupeResult<Vec<SessionViewInfo>> {
        let payload = json!({ "query": STORAGES_QUERY });
        let mut data = self.execute("storages", payload).await?;
        serde_json::from_value(data["storages"].take())
            .map_err(|e| LoupeError::gateway(format!("malformed storages payload: {}", e)))
    }

    /// Reads up to `length` records of `name` starting at cursor
    /// `start`. The ids in the result drive the next cursor.
    pub async fn storage_read_at(
        &self,
        name: &str,
        start: u64,
        length: usize,
    ) -> LoupeResult<Vec<LogRecord>> {
        let payload = json!({
            "query": STORAGE_READ_AT_QUERY,
            "variables": { "name": name, "start": start, "length": length },
        });
        let summary = format!("storageReadAt {} start={} length={}", name, start, length);
        let mut data = self.execute(&summary, payload).await?;
        serde_json::from_value(data["storageReadAt"].take())
            .map_err(|e| LoupeError::gateway(format!("malformed storageReadAt payload: {}", e)))
    }

    /// Posts one GraphQL request and returns the `data` object.
    async fn execute(&self, summary: &str, payload: Value) -> LoupeResult<Value> {
        let started = Instant::now();
        let mut request = self.http.post(&self.endpoint).json(&payload);
        if let Some(auth) = &self.authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        let response = request.send().await?;

        let status = response.status();
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: self.endpoint.clone(),
            request_summary: summary.to_string(),
            response_status: status.as_u16(),
            response_time_ms: started.elapsed().as_millis(),
        });

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoupeError::gateway(format!(
                "gateway returned {}: {}",
                status, body
            )));
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| LoupeError::gateway(format!("failed to parse response: {}", e)))?;

        if let Some(errors) = body["errors"].as_array() {
            let message = errors
                .iter()
                .filter_map(|e| e["message"].as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(LoupeError::gateway(if message.is_empty() {
                "unknown error".to_string()
            } else {
                message
            }));
        }

        Ok(body["data"].take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> ApiClient {
        let mut config = Config::default();
        config.endpoint = server.uri();
        ApiClient::new(&config)
    }

    #[tokio::test]
    async fn storages_decodes_session_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "query": STORAGES_QUERY })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "storages": [
                        {
                            "name": "session-a",
                            "createdAt": "2021-05-01T10:00:00Z",
                            "updatedAt": "2021-05-01T10:05:00Z"
                        },
                        {
                            "name": "session-b",
                            "createdAt": "2021-05-02T09:00:00Z",
                            "updatedAt": "2021-05-02T09:30:00Z"
                        }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let sessions = client_for(&server).storages().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].name, "session-a");
        assert_eq!(sessions[1].name, "session-b");
    }

    #[tokio::test]
    async fn storage_read_at_sends_pagination_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({
                "variables": { "name": "session-a", "start": 10, "length": 5 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "storageReadAt": [
                        {
                            "id": 10,
                            "record": {
                                "level": "INFO",
                                "elapsed": 1.0,
                                "category": "net",
                                "message": "connected"
                            }
                        }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server)
            .storage_read_at("session-a", 10, 5)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 10);
        assert_eq!(records[0].record.category, "net");
    }

    #[tokio::test]
    async fn empty_page_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "storageReadAt": [] }
            })))
            .mount(&server)
            .await;

        let records = client_for(&server)
            .storage_read_at("session-a", 0, 100)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn graphql_errors_surface_as_gateway_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "unknown storage: nope" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .storage_read_at("nope", 0, 100)
            .await
            .unwrap_err();
        match err {
            LoupeError::Gateway { message } => assert!(message.contains("unknown storage")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_failure_surfaces_as_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).storages().await.unwrap_err();
        assert!(matches!(err, LoupeError::Gateway { .. }));
    }
}
