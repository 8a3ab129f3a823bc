use async_trait::async_trait;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::types::Credentials;
use crate::types::TokenResponse;
use crate::AuthApi;

/// Login and registration. Neither call carries a bearer token.
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse> {
        self.api.post_public("/api/auth/login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<TokenResponse> {
        self.api.post_public("/api/auth/register", credentials).await
    }
}
