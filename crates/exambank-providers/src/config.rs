//! Drafter configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use exambank_core::traits::QuestionDrafter;

use crate::mock::MockDrafter;
use crate::openai::OpenAiDrafter;

/// Configuration for a single drafting backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrafterConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Mock,
}

impl std::fmt::Debug for DrafterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrafterConfig::OpenAI {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            DrafterConfig::Mock => f.debug_struct("Mock").finish(),
        }
    }
}

/// Top-level exambank configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExambankConfig {
    /// Drafter configurations keyed by name.
    #[serde(default)]
    pub drafters: HashMap<String, DrafterConfig>,
    /// Default drafter to use.
    #[serde(default = "default_drafter")]
    pub default_drafter: String,
    /// Authored open-book bank file.
    #[serde(default = "default_authored_open")]
    pub authored_open_bank: PathBuf,
    /// Generated open-book bank file.
    #[serde(default = "default_generated_open")]
    pub generated_open_bank: PathBuf,
    /// Flat authored closed-book bank file (test-prep source).
    #[serde(default = "default_authored_closed")]
    pub authored_closed_bank: PathBuf,
    /// Generated closed-book bank file.
    #[serde(default = "default_generated_closed")]
    pub generated_closed_bank: PathBuf,
    /// Directory for per-batch archives.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

fn default_drafter() -> String {
    "openai".to_string()
}
fn default_authored_open() -> PathBuf {
    PathBuf::from("data/open_book_questions.json")
}
fn default_generated_open() -> PathBuf {
    PathBuf::from("data/generated_open_book_questions.json")
}
fn default_authored_closed() -> PathBuf {
    PathBuf::from("data/closed_book_questions.json")
}
fn default_generated_closed() -> PathBuf {
    PathBuf::from("data/generated_closed_book_questions.json")
}
fn default_archive_dir() -> PathBuf {
    PathBuf::from("data/generated_tests")
}

impl Default for ExambankConfig {
    fn default() -> Self {
        Self {
            drafters: HashMap::new(),
            default_drafter: default_drafter(),
            authored_open_bank: default_authored_open(),
            generated_open_bank: default_generated_open(),
            authored_closed_bank: default_authored_closed(),
            generated_closed_bank: default_generated_closed(),
            archive_dir: default_archive_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a drafter config.
fn resolve_drafter_config(config: &DrafterConfig) -> DrafterConfig {
    match config {
        DrafterConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => DrafterConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        DrafterConfig::Mock => DrafterConfig::Mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `exambank.toml` in the current directory
/// 2. `~/.config/exambank/config.toml`
///
/// Environment variable override: `EXAMBANK_OPENAI_KEY`.
pub fn load_config() -> Result<ExambankConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExambankConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("exambank.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExambankConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExambankConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("EXAMBANK_OPENAI_KEY") {
        config
            .drafters
            .entry("openai".into())
            .or_insert(DrafterConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(DrafterConfig::OpenAI { api_key, .. }) = config.drafters.get_mut("openai") {
            *api_key = key;
        }
    }

    // Resolve env vars in all drafter configs
    let resolved: HashMap<String, DrafterConfig> = config
        .drafters
        .iter()
        .map(|(k, v)| (k.clone(), resolve_drafter_config(v)))
        .collect();
    config.drafters = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("exambank"))
}

/// Create a drafter instance from its configuration.
pub fn create_drafter(config: &DrafterConfig) -> Result<Box<dyn QuestionDrafter>> {
    match config {
        DrafterConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("openai drafter configured without an api key");
            }
            Ok(Box::new(OpenAiDrafter::new(
                api_key,
                base_url.clone(),
                model.clone(),
            )))
        }
        DrafterConfig::Mock => Ok(Box::new(MockDrafter::synthesizing())),
    }
}
