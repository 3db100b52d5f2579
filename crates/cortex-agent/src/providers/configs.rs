use config::{Config, Environment};
use serde::Deserialize;

use crate::errors::{to_env_var, ConfigError};

pub const DEFAULT_TOKEN_TYPE: &str = "PROGRAMMATIC_ACCESS_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Connection settings for the Snowflake REST API
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub account_url: String,
    pub token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SnowflakeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None, None)
    }

    /// Layers explicit values over `SNOWFLAKE_*` environment variables.
    pub fn load(account_url: Option<String>, token: Option<String>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("token_type", default_token_type())?
            .add_source(Environment::with_prefix("SNOWFLAKE").prefix_separator("_"))
            .set_override_option("account_url", account_url)?
            .set_override_option("token", token)?
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // "missing field `token`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
