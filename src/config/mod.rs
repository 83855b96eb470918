use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod keypair;

pub use keypair::load_keypair;

/// Drive profile: where to talk to and who signs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Base drive API endpoint URL
    pub endpoint: String,

    /// Path to a keypair file (JSON byte array)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypair: Option<PathBuf>,

    /// Optional default bucket (storage account)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Disable TLS certificate verification
    #[serde(default)]
    pub insecure_tls: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Profile used when none is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile by name, or the default profile if not specified
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        if let Some(name) = name {
            self.profiles.get(name)
        } else if let Some(default) = &self.default_profile {
            self.profiles.get(default)
        } else {
            self.profiles.values().next()
        }
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config =
        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - SHDW_ENDPOINT (required)
/// - SHDW_KEYPAIR (optional keypair file path)
/// - SHDW_BUCKET (optional)
/// - SHDW_INSECURE_TLS (optional, "true" or "1")
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let endpoint =
        std::env::var("SHDW_ENDPOINT").context("SHDW_ENDPOINT environment variable not set")?;
    let endpoint = endpoint.trim().to_string();
    if endpoint.is_empty() {
        anyhow::bail!("SHDW_ENDPOINT is empty");
    }

    let keypair = std::env::var("SHDW_KEYPAIR").ok().map(PathBuf::from);
    let bucket = std::env::var("SHDW_BUCKET").ok().filter(|b| !b.is_empty());
    let insecure_tls = std::env::var("SHDW_INSECURE_TLS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let profile = Profile {
        endpoint,
        keypair,
        bucket,
        insecure_tls,
    };

    let mut config = Config::new();
    config.profiles.insert("default".to_string(), profile);
    config.default_profile = Some("default".to_string());

    Ok(config)
}

/// Load configuration from file or environment
///
/// # Arguments
/// * `config_path` - Optional path to YAML config file
/// * `profile_name` - Optional profile name to use (only relevant for YAML configs)
pub fn load_config(config_path: Option<&str>, profile_name: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        let mut config = load_from_yaml(path)?;

        if let Some(name) = profile_name {
            if !config.profiles.contains_key(name) {
                anyhow::bail!("Profile '{}' not found in config file", name);
            }
            config.default_profile = Some(name.to_string());
        }

        Ok(config)
    } else {
        load_from_env()
    }
}
