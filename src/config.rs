use std::{env, error::Error, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use model_server::TrainingConfig;

const DEFAULT_APP_NAME: &str = "NLP Trainer";
const DEFAULT_STORAGE_PATH: &str = "assets/storage";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// The service's settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app_name: String,
    pub version: String,
    pub api_key: String,
    pub storage_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub training: TrainingConfig,
}

impl AppConfig {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Reads the settings through `var`.
    ///
    /// # Arguments
    /// * `var` - Looks up a variable by name.
    ///
    /// # Returns
    /// The settings, or an error naming the first missing or malformed variable.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("API_SECRET_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("API_SECRET_KEY must be set"))?;

        let mut training = TrainingConfig::default();

        if let Some(test_size) = parse(&var, "TEST_SIZE")? {
            training.test_size = test_size;
        }

        training.seed = parse(&var, "TRAINING_SEED")?;
        training.timeout = parse(&var, "TRAINING_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            app_name: var("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            version: var("VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            api_key,
            storage_path: var("STORAGE_PATH")
                .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string())
                .into(),
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse(&var, "PORT")?.unwrap_or(DEFAULT_PORT),
            training,
        })
    }
}

fn parse<F, T>(var: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    var(name)
        .map(|raw| raw.parse().with_context(|| format!("invalid {name}: {raw:?}")))
        .transpose()
}
