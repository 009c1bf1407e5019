//! REST client for the Firestore document API.

use log::debug;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use postmitra_core::config::RemoteConfig;

use crate::error::{FirestoreError, Result};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const MAX_LOG_BODY_CHARS: usize = 512;

/// One Firestore document: resource name plus typed fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl Document {
    /// Server-assigned id: the trailing segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<Document>,
}

/// Client for the Firestore REST API.
///
/// Documents live under
/// `{base}/v1/projects/{project}/databases/(default)/documents/...`;
/// requests authenticate with the web API key as a query parameter.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl FirestoreClient {
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default endpoint, mainly for tests.
    pub fn with_base_url(config: &RemoteConfig, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Firestore response status: {}", status);
            return;
        }
        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Firestore response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body, funneling API failures into
    /// [`FirestoreError::Api`].
    async fn parse_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(&body) {
                return Err(FirestoreError::api(
                    status.as_u16(),
                    format!("{}: {}", envelope.error.status, envelope.error.message),
                ));
            }
            return Err(FirestoreError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize Firestore response: {}", e);
            FirestoreError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Fetch a document. A 404 is an absent document, not an error.
    ///
    /// GET /v1/.../documents/{path}
    pub async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let url = format!("{}/{}", self.documents_root(), path);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::parse_response(response).await?))
    }

    /// Create or fully replace a document.
    ///
    /// PATCH /v1/.../documents/{path}
    pub async fn patch_document(&self, path: &str, fields: Map<String, Value>) -> Result<Document> {
        let url = format!("{}/{}", self.documents_root(), path);
        let response = self
            .client
            .patch(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Add a document to a collection; the server assigns the id.
    ///
    /// POST /v1/.../documents/{parent}/{collection}
    pub async fn create_document(
        &self,
        parent: &str,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<Document> {
        let url = format!("{}/{}/{}", self.documents_root(), parent, collection);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Ordered, limited read of a subcollection.
    ///
    /// POST /v1/.../documents/{parent}:runQuery
    pub async fn run_query(
        &self,
        parent: &str,
        collection: &str,
        order_by: &str,
        descending: bool,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let url = format!("{}/{}:runQuery", self.documents_root(), parent);
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order_by },
                    "direction": if descending { "DESCENDING" } else { "ASCENDING" }
                }],
                "limit": limit
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&query)
            .send()
            .await?;

        let results: Vec<QueryResult> = Self::parse_response(response).await?;
        Ok(results.into_iter().filter_map(|r| r.document).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex as TokioMutex;

    fn test_config() -> RemoteConfig {
        RemoteConfig {
            api_key: "test-key".to_string(),
            project_id: "test-project".to_string(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
        }
    }

    fn status_text(status: u16) -> &'static str {
        match status {
            200 => "OK",
            404 => "Not Found",
            403 => "Forbidden",
            500 => "Internal Server Error",
            _ => "Error",
        }
    }

    /// Serve the scripted (status, body) responses, one per connection.
    async fn start_mock_server(
        responses: Vec<(u16, String)>,
    ) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let scripted = Arc::new(TokioMutex::new(responses));

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let scripted = Arc::clone(&scripted);
                tokio::spawn(async move {
                    // Drain the request head plus any content-length body.
                    let mut buffer = Vec::new();
                    loop {
                        let mut chunk = [0_u8; 2048];
                        let read = match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buffer.extend_from_slice(&chunk[..read]);
                        if let Some(head_end) =
                            buffer.windows(4).position(|w| w == b"\r\n\r\n")
                        {
                            let head = String::from_utf8_lossy(&buffer[..head_end]);
                            let content_length = head
                                .lines()
                                .filter_map(|line| line.split_once(':'))
                                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                                .unwrap_or(0);
                            if buffer.len() >= head_end + 4 + content_length {
                                break;
                            }
                        }
                    }

                    let (status, body) = scripted
                        .lock()
                        .await
                        .pop()
                        .unwrap_or((500, r#"{"error":{"code":500,"message":"unexpected request","status":"INTERNAL"}}"#.to_string()));
                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        status_text(status),
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.flush().await;
                });
            }
        });

        (format!("http://{}", addr), handle)
    }

    fn profile_doc_body() -> String {
        r#"{
            "name": "projects/test-project/databases/(default)/documents/users/user_abc",
            "fields": {
                "businessName": {"stringValue": "Ramesh Hardware Store"},
                "category": {"stringValue": "Retail"},
                "city": {"stringValue": "Pune"},
                "language": {"stringValue": "Hinglish"},
                "tone": {"stringValue": "Friendly"},
                "updatedAt": {"timestampValue": "2026-08-01T10:00:00.000Z"}
            },
            "createTime": "2026-08-01T10:00:00.000000Z",
            "updateTime": "2026-08-01T10:00:00.000000Z"
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn get_document_decodes_fields_and_id() {
        let (base_url, server) = start_mock_server(vec![(200, profile_doc_body())]).await;
        let client = FirestoreClient::with_base_url(&test_config(), &base_url);

        let doc = client
            .get_document("users/user_abc")
            .await
            .expect("request ok")
            .expect("document present");
        assert_eq!(doc.id(), "user_abc");
        assert_eq!(
            doc.fields["businessName"],
            serde_json::json!({"stringValue": "Ramesh Hardware Store"})
        );

        server.abort();
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let body = r#"{"error":{"code":404,"message":"Document not found","status":"NOT_FOUND"}}"#;
        let (base_url, server) = start_mock_server(vec![(404, body.to_string())]).await;
        let client = FirestoreClient::with_base_url(&test_config(), &base_url);

        let doc = client.get_document("users/missing").await.expect("ok");
        assert!(doc.is_none());

        server.abort();
    }

    #[tokio::test]
    async fn api_error_surfaces_status_and_message() {
        let body =
            r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let (base_url, server) = start_mock_server(vec![(403, body.to_string())]).await;
        let client = FirestoreClient::with_base_url(&test_config(), &base_url);

        let err = client
            .get_document("users/forbidden")
            .await
            .expect_err("must fail");
        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("PERMISSION_DENIED"));

        server.abort();
    }

    #[tokio::test]
    async fn create_document_returns_server_assigned_id() {
        let body = r#"{
            "name": "projects/test-project/databases/(default)/documents/users/user_abc/history/AbCdEf123",
            "fields": {"content": {"stringValue": "hello"}},
            "createTime": "2026-08-01T10:00:00.000000Z",
            "updateTime": "2026-08-01T10:00:00.000000Z"
        }"#;
        let (base_url, server) = start_mock_server(vec![(200, body.to_string())]).await;
        let client = FirestoreClient::with_base_url(&test_config(), &base_url);

        let mut fields = Map::new();
        fields.insert("content".to_string(), json!({"stringValue": "hello"}));
        let doc = client
            .create_document("users/user_abc", "history", fields)
            .await
            .expect("created");
        assert_eq!(doc.id(), "AbCdEf123");

        server.abort();
    }

    #[tokio::test]
    async fn run_query_collects_documents_and_skips_stat_rows() {
        let body = r#"[
            {"document": {
                "name": "projects/p/databases/(default)/documents/users/u/history/h2",
                "fields": {"content": {"stringValue": "newer"}}
            }, "readTime": "2026-08-01T10:00:01.000000Z"},
            {"document": {
                "name": "projects/p/databases/(default)/documents/users/u/history/h1",
                "fields": {"content": {"stringValue": "older"}}
            }, "readTime": "2026-08-01T10:00:01.000000Z"},
            {"readTime": "2026-08-01T10:00:01.000000Z"}
        ]"#;
        let (base_url, server) = start_mock_server(vec![(200, body.to_string())]).await;
        let client = FirestoreClient::with_base_url(&test_config(), &base_url);

        let docs = client
            .run_query("users/u", "history", "timestamp", true, 50)
            .await
            .expect("query ok");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id(), "h2");

        server.abort();
    }
}
