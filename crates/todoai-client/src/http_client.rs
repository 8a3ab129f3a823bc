use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::error::Result;
use crate::token::token_preview;
use crate::token::TokenHolder;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// HTTP client for the Todo AI backend. Attaches the bearer token from its
/// [`TokenHolder`] to every authorized request and hands errors back as-is.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    tokens: TokenHolder,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenHolder) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
            tokens,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenHolder {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str, authorized: bool) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout);

        if authorized {
            match self.tokens.get().await {
                Some(token) => {
                    log::debug!("Attaching token {} to {}", token_preview(&token), path);
                    builder = builder.bearer_auth(token);
                }
                None => log::debug!("No token available for {}", path),
            }
        }

        builder
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path, true).await;
        read_json(builder).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path, true).await.query(query);
        read_json(builder).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, true).await.json(body);
        read_json(builder).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::POST, path, true).await;
        read_json(builder).await
    }

    /// POST without the bearer token, for the login and register endpoints.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, false).await.json(body);
        read_json(builder).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path, true).await.json(body);
        read_json(builder).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path, true).await;
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = builder.send().await?;
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    log::warn!(
        "Request to {} failed with status {}: {}",
        path,
        status.as_u16(),
        detail.as_deref().unwrap_or("<no detail>")
    );

    Err(ApiError::http(status.as_u16(), detail))
}

/// FastAPI puts human-readable errors in a top-level `detail` string.
/// Validation errors use a list there instead, which is not user-facing.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::types::Task;

    async fn client_with_token(url: String, token: Option<&str>) -> ApiClient {
        let tokens = TokenHolder::in_memory();
        if let Some(token) = token {
            tokens.set(token).await.unwrap();
        }
        ApiClient::new(url, tokens)
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tasks/")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = client_with_token(server.url(), Some("tok-123")).await;
        let tasks: Vec<Task> = client.get("/api/tasks/").await.unwrap();

        assert!(tasks.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn public_requests_skip_the_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = client_with_token(server.url(), Some("tok-123")).await;
        let value: Value = client
            .post_public("/api/auth/login", &json!({"email": "a@b.co"}))
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn no_token_means_no_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tasks/")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"detail":"Not authenticated"}"#)
            .create_async()
            .await;

        let client = client_with_token(server.url(), None).await;
        let err = client.get::<Vec<Task>>("/api/tasks/").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Not authenticated"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tasks/")
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let client = client_with_token(server.url(), None).await;
        let err = client.get::<Vec<Task>>("/api/tasks/").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is not expected to be listening.
        let client = client_with_token("http://127.0.0.1:9".to_string(), None)
            .await
            .with_timeout(Duration::from_secs(2));
        let err = client.get::<Vec<Task>>("/api/tasks/").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn detail_extraction() {
        assert_eq!(
            extract_detail(r#"{"detail":"Task not found"}"#).as_deref(),
            Some("Task not found")
        );
        assert_eq!(extract_detail(r#"{"detail":[{"msg":"field required"}]}"#), None);
        assert_eq!(extract_detail("Internal Server Error"), None);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", TokenHolder::in_memory());
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/chat"), "http://localhost:8000/api/chat");
    }
}
