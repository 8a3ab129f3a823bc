use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use todoai_client::ApiClient;
use todoai_client::AuthApi;
use todoai_client::ChatApi;
use todoai_client::ClientFactory;
use todoai_client::FileTokenStore;
use todoai_client::TaskApi;
use todoai_client::TokenHolder;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// Every backend client, sharing one token holder.
#[derive(Clone)]
pub struct Clients {
    pub api: ApiClient,
    pub chat: Arc<dyn ChatApi>,
    pub tasks: Arc<dyn TaskApi>,
    pub auth: Arc<dyn AuthApi>,
}

impl Clients {
    pub fn tokens(&self) -> TokenHolder {
        self.api.tokens().clone()
    }
}

pub struct ClientManager {}

impl ClientManager {
    /// Builds the clients from the loaded [`Config`].
    pub fn from_config() -> Result<Clients> {
        let api_url = Config::get(ConfigKey::ApiUrl);
        if api_url.is_empty() {
            bail!("api-url is not defined");
        }

        let token_file = Config::get(ConfigKey::TokenFile);
        if token_file.is_empty() {
            bail!("token-file is not defined");
        }

        let tokens = TokenHolder::new(Arc::new(FileTokenStore::new(token_file)));
        let api = ApiClient::new(api_url, tokens).with_timeout(Config::request_timeout()?);

        Ok(ClientManager::from_api(api))
    }

    pub fn from_api(api: ApiClient) -> Clients {
        tracing::debug!(url = api.base_url(), "building backend clients");
        Clients {
            chat: ClientFactory::create_chat_client(api.clone()),
            tasks: ClientFactory::create_task_client(api.clone()),
            auth: ClientFactory::create_auth_client(api.clone()),
            api,
        }
    }
}
