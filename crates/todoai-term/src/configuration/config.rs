#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::HistoryPolicy;
use crate::domain::models::DEFAULT_HISTORY_LIMIT;
use crate::domain::models::DEFAULT_VOICE_LOCALE;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    ApiUrl,
    TokenFile,
    HistoryPolicy,
    HistoryLimit,
    VoiceCommand,
    VoiceLocale,
    RequestTimeout,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let app_dir = dirs::config_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(|| path::PathBuf::from("."))
            .join("todoai");

        let res = match key {
            ConfigKey::ApiUrl => todoai_client::DEFAULT_API_URL.to_string(),
            ConfigKey::HistoryPolicy => HistoryPolicy::default().kind().to_string(),
            ConfigKey::HistoryLimit => DEFAULT_HISTORY_LIMIT.to_string(),
            ConfigKey::VoiceCommand => "".to_string(),
            ConfigKey::VoiceLocale => DEFAULT_VOICE_LOCALE.to_string(),
            ConfigKey::RequestTimeout => "30000".to_string(),

            // Paths
            ConfigKey::ConfigFile => app_dir.join("config.toml").display().to_string(),
            ConfigKey::TokenFile => app_dir.join("token.json").display().to_string(),
        };

        return res;
    }

    pub fn get_parsed<T>(key: ConfigKey) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = Config::get(key);
        raw.parse::<T>()
            .with_context(|| format!("invalid value for '{key}': {raw}"))
    }

    pub fn history_policy() -> Result<HistoryPolicy> {
        let limit = Config::get_parsed::<usize>(ConfigKey::HistoryLimit)?;
        HistoryPolicy::parse(&Config::get(ConfigKey::HistoryPolicy), limit)
    }

    /// Per-request timeout, configured in milliseconds.
    pub fn request_timeout() -> Result<Duration> {
        let millis = Config::get_parsed::<u64>(ConfigKey::RequestTimeout)?;
        if millis == 0 {
            bail!("request-timeout must be greater than 0");
        }
        Ok(Duration::from_millis(millis))
    }

    /// Layers defaults, then `config.toml`, then CLI flags and env vars.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str
                .parse::<toml_edit::Document>()
                .with_context(|| format!("failed to parse {}", config_path.display()))?;

            for key in ConfigKey::iter() {
                let Some(val) = doc.get(&key.to_string()) else {
                    continue;
                };

                // Use clap value parsers to do validation.
                let possible_values = possible_values(&cmd, key);

                if let Some(val_int) = val.as_integer() {
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty()
                        && !possible_values.contains(&val_str.to_string())
                    {
                        bail!(
                            "config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}",
                            possible_values.join(", ")
                        );
                    }
                    Config::set(key, val_str);
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiUrl),
            token_file = Config::get(ConfigKey::TokenFile),
            history_policy = Config::get(ConfigKey::HistoryPolicy),
            voice = !Config::get(ConfigKey::VoiceCommand).is_empty(),
            "config"
        );

        return Ok(());
    }

    /// A commented `config.toml` with every default filled in.
    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| help.to_string())
                    .unwrap_or_default();
                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let possible_values = possible_values(&cmd, key);
                if !possible_values.is_empty() {
                    description = format!(
                        "{description} [possible values: {}]",
                        possible_values.join(", ")
                    );
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}

fn possible_values(cmd: &Command, key: ConfigKey) -> Vec<String> {
    let key = key.to_string();
    cmd.get_arguments()
        .find(|e| e.get_long() == Some(key.as_str()))
        .map(|arg| {
            arg.get_possible_values()
                .iter()
                .map(|e| e.get_name().to_string())
                .collect()
        })
        .unwrap_or_default()
}
