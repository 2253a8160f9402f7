use serde::Deserialize;
use std::env;

/// Variable the deployment stack uses to hand the table name to the function.
pub const TABLE_ENV_VAR: &str = "NOTES_TABLE";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_provider")]
    pub provider: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_store_provider(),
            table_name: String::new(),
            endpoint_url: None,
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            provider: "memory".to_string(),
            ..Self::default()
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("NOTES").separator("__"));
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;

        if config.store.table_name.trim().is_empty() {
            if let Ok(table) = env::var(TABLE_ENV_VAR) {
                config.store.table_name = table.trim().to_string();
            }
        }

        if config.store.provider == "dynamodb" && config.store.table_name.is_empty() {
            return Err(config::ConfigError::Message(
                "Missing notes table. Set NOTES__STORE__TABLE_NAME or NOTES_TABLE.".into(),
            ));
        }

        Ok(config)
    }
}

fn default_store_provider() -> String {
    "dynamodb".to_string()
}
