use crate::provider::{DeploymentMap, SUPPORTED_MODELS};
use config::{Config, ConfigError, Environment, File};
use itertools::Itertools;
use serde::Deserialize;

/// Process-wide settings, loaded once at startup and passed by reference into
/// component constructors. Components never re-read environment state
/// mid-request.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub detection_threshold: f64,
    pub max_input_chars: usize,
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_api_version: String,
    pub azure_deployments: Option<String>,
}

impl AppConfig {
    /// Reads an optional `transbot.toml` next to the working directory, then
    /// `TRANSBOT_*` environment variables on top of the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .set_default("model", "gpt-4o-mini")?
            .set_default("temperature", 0.3)?
            .set_default("max_output_tokens", 4000)?
            .set_default("timeout_secs", 60)?
            .set_default("max_retries", 3)?
            .set_default("detection_threshold", 0.5)?
            .set_default("max_input_chars", 50_000)?
            .set_default("azure_api_version", "2024-06-01")?
            .add_source(File::with_name("transbot").required(false))
            .add_source(Environment::with_prefix("TRANSBOT").try_parsing(true))
            .build()?;

        let config: AppConfig = raw.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Message(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(ConfigError::Message(format!(
                "detection threshold must be between 0.0 and 1.0, got {}",
                self.detection_threshold
            )));
        }
        if !SUPPORTED_MODELS.contains(&self.model.as_str()) {
            return Err(ConfigError::Message(format!(
                "unsupported model: {} (supported: {})",
                self.model,
                SUPPORTED_MODELS.iter().join(", ")
            )));
        }
        Ok(())
    }

    /// Deployment allow-list for the Azure-hosted path; empty when the
    /// `azure_deployments` string is unset.
    pub fn deployments(&self) -> DeploymentMap {
        self.azure_deployments
            .as_deref()
            .map(DeploymentMap::parse)
            .unwrap_or_default()
    }
}
