use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::PocketError;
use crate::multipart::{DEFAULT_CONTENT_TYPE, PartMarkers};

pub const CONFIG_FILE: &str = "pocket-decoder.json";
pub const DEFAULT_ENDPOINT: &str = "http://grasp:8000/process/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub expected_content_type: Option<String>,
    #[serde(default)]
    pub parts: Option<PartsEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PartsEntry {
    #[serde(default)]
    pub grasp: Option<String>,
    #[serde(default)]
    pub p2rank: Option<String>,
    #[serde(default)]
    pub structure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub expected_content_type: String,
    pub markers: PartMarkers,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            expected_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            markers: PartMarkers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub decoder: DecoderConfig,
    pub client: ClientConfig,
}

pub struct ConfigLoader;

impl ConfigLoader {
    // explicit path must exist; otherwise ./pocket-decoder.json, ~/.config/pocket-decoder/config.json, defaults
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, PocketError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };
        let Some(config_path) = config_path else {
            tracing::debug!("no config file found, using defaults");
            return Self::resolve_config(Config::default());
        };
        Self::resolve_config(Self::load(&config_path)?)
    }

    pub fn load(path: &Path) -> Result<Config, PocketError> {
        let content =
            fs::read_to_string(path).map_err(|_| PocketError::ConfigRead(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        serde_json::from_str(&content).map_err(|err| PocketError::ConfigParse(err.to_string()))
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| {
                dirs.home_dir()
                    .join(".config")
                    .join("pocket-decoder")
                    .join("config.json")
            })
            .filter(|path| path.exists())
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, PocketError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(PocketError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(PocketError::ConfigParse(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let defaults = PartMarkers::default();
        let parts = config.parts.unwrap_or_default();
        let markers = PartMarkers {
            grasp: parts.grasp.unwrap_or(defaults.grasp),
            p2rank: parts.p2rank.unwrap_or(defaults.p2rank),
            structure: parts.structure.unwrap_or(defaults.structure),
        };
        validate_markers(&markers)?;

        Ok(ResolvedConfig {
            schema_version,
            decoder: DecoderConfig {
                expected_content_type: config
                    .expected_content_type
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                markers,
            },
            client: ClientConfig {
                endpoint: config
                    .endpoint
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn validate_markers(markers: &PartMarkers) -> Result<(), PocketError> {
    let all = [&markers.grasp, &markers.p2rank, &markers.structure];
    if all.iter().any(|marker| marker.trim().is_empty()) {
        return Err(PocketError::ConfigParse(
            "part markers must not be empty".to_string(),
        ));
    }
    // identification is by substring, so one marker inside another would shadow it
    for (i, a) in all.iter().enumerate() {
        for b in all.iter().skip(i + 1) {
            if a.contains(b.as_str()) || b.contains(a.as_str()) {
                return Err(PocketError::ConfigParse(format!(
                    "part markers {a:?} and {b:?} overlap"
                )));
            }
        }
    }
    Ok(())
}
