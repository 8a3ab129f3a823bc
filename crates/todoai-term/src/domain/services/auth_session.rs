use std::sync::Arc;

use thiserror::Error;
use todoai_client::ApiError;
use todoai_client::AuthApi;
use todoai_client::Credentials;
use todoai_client::TokenHolder;
use todoai_client::TokenResponse;

use super::validation::validate_email;
use super::validation::validate_password;
use super::validation::ValidationError;

pub const LOGIN_FAILED: &str = "Login failed. Check your credentials.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backend refused the credentials. Holds the user-facing message.
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to store token: {0}")]
    Storage(ApiError),
}

/// Logs users in and out. The only writer of the shared [`TokenHolder`].
#[derive(Clone)]
pub struct AuthSession {
    auth_api: Arc<dyn AuthApi>,
    tokens: TokenHolder,
}

impl AuthSession {
    pub fn new(auth_api: Arc<dyn AuthApi>, tokens: TokenHolder) -> AuthSession {
        AuthSession { auth_api, tokens }
    }

    pub fn tokens(&self) -> &TokenHolder {
        &self.tokens
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        validate_credentials(credentials)?;

        let response = self
            .auth_api
            .login(credentials)
            .await
            .map_err(|err| rejected(err, LOGIN_FAILED))?;
        self.store(&response).await?;

        tracing::info!(email = %credentials.email, "logged in");
        Ok(response)
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        validate_credentials(credentials)?;

        let response = self
            .auth_api
            .register(credentials)
            .await
            .map_err(|err| rejected(err, REGISTER_FAILED))?;
        self.store(&response).await?;

        tracing::info!(email = %credentials.email, "registered");
        Ok(response)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.tokens.clear().await.map_err(AuthError::Storage)?;
        tracing::info!("logged out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_present().await
    }

    async fn store(&self, response: &TokenResponse) -> Result<(), AuthError> {
        self.tokens
            .set(&response.access_token)
            .await
            .map_err(AuthError::Storage)
    }
}

fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    validate_email(&credentials.email)?;
    validate_password(&credentials.password)
}

fn rejected(err: ApiError, fallback: &str) -> AuthError {
    tracing::warn!(error = %err, "authentication request failed");
    AuthError::Rejected(err.detail().unwrap_or(fallback).to_string())
}
