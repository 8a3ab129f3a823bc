use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::types::ChatMessage;
use crate::types::ChatReply;
use crate::types::ChatRequest;
use crate::ChatApi;

/// Typed adapter over the chat endpoints.
pub struct ChatClient {
    api: ApiClient,
}

impl ChatClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ChatApi for ChatClient {
    async fn send_message(&self, text: &str) -> Result<ChatReply> {
        let request = ChatRequest {
            message: text.to_string(),
        };
        self.api.post("/api/chat", &request).await
    }

    async fn get_history(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        self.api
            .get_with_query("/api/chat/history", &[("limit", limit)])
            .await
    }
}
