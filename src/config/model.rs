// src/config/model.rs
//! Model provider config: which backend answers the analysis prompt and how.
//! Loaded from JSON; an `"ENV"` api key is read from `GEMINI_API_KEY`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_MODEL_CONFIG_PATH: &str = "MODEL_CONFIG_PATH";
pub const DEFAULT_MODEL_CONFIG_PATH: &str = "config/model.json";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_temperature() -> f32 {
    0.4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub enabled: bool,
    /// "gemini" | "relay" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from GEMINI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Endpoint of the relay function when provider = "relay".
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            api_key: default_api_key(),
            relay_url: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl ModelConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading model config from {}", path.display()))?;
        let mut cfg: ModelConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing model config {}", path.display()))?;

        // Normalize provider
        cfg.provider = cfg.provider.trim().to_lowercase();

        match cfg.provider.as_str() {
            "gemini" => {
                if cfg.api_key.trim().eq_ignore_ascii_case("env") {
                    cfg.api_key = env::var("GEMINI_API_KEY")
                        .map_err(|_| anyhow::anyhow!("Missing GEMINI_API_KEY env var"))?;
                }
            }
            "relay" => {
                if cfg.relay_url.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                    anyhow::bail!("provider 'relay' requires relay_url");
                }
            }
            other => anyhow::bail!("Unsupported provider in config: {other}"),
        }

        // Sanitize sampling knobs
        if !(0.0..=2.0).contains(&cfg.temperature) {
            cfg.temperature = default_temperature();
        }
        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }

        Ok(cfg)
    }

    /// $MODEL_CONFIG_PATH, then config/model.json, then a disabled default.
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_MODEL_CONFIG_PATH) {
            return Self::load_from_file(PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_MODEL_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(p);
        }
        Ok(Self::default())
    }
}
