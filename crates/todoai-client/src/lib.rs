//! Client SDK for the Todo AI backend.
//!
//! The traits here are the seams the front-end core is written against: the
//! chat widget only knows [`ChatApi`], the dashboard only knows [`TaskApi`],
//! and the auth session only knows [`AuthApi`]. [`ClientFactory`] wires the
//! HTTP implementations to a shared [`ApiClient`] and [`TokenHolder`].

use std::sync::Arc;

use async_trait::async_trait;

pub mod auth;
pub mod chat;
pub mod error;
pub mod http_client;
pub mod tasks;
pub mod token;
pub mod types;

pub use error::{ApiError, Result};
pub use http_client::{ApiClient, DEFAULT_API_URL};
pub use token::{FileTokenStore, MemoryTokenStore, StoredToken, TokenHolder, TokenStore};
pub use types::*;

/// Chat endpoints.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send one free-text message and get the backend's reply and intent
    async fn send_message(&self, text: &str) -> Result<ChatReply>;

    /// Fetch up to `limit` of the most recent messages, oldest first
    async fn get_history(&self, limit: usize) -> Result<Vec<ChatMessage>>;
}

/// Task CRUD endpoints.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn get_task(&self, id: i64) -> Result<Task>;
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task>;
    async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<Task>;
    async fn toggle_task(&self, id: i64) -> Result<Task>;
    async fn delete_task(&self, id: i64) -> Result<()>;
}

/// Unauthenticated account endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse>;
    async fn register(&self, credentials: &Credentials) -> Result<TokenResponse>;
}

/// Builds the HTTP-backed implementations of the client traits.
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(api: ApiClient) -> Arc<dyn ChatApi> {
        Arc::new(chat::ChatClient::new(api))
    }

    pub fn create_task_client(api: ApiClient) -> Arc<dyn TaskApi> {
        Arc::new(tasks::TasksClient::new(api))
    }

    pub fn create_auth_client(api: ApiClient) -> Arc<dyn AuthApi> {
        Arc::new(auth::AuthClient::new(api))
    }
}
