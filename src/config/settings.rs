//! Resolved settings (layers 2 and 3 applied over the defaults)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::ConfigError;

/// Endpoint overrides for the `aws` tool, per service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub logs: Option<String>,
    #[serde(default)]
    pub s3: Option<String>,
}

/// Fully merged settings for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub job_queue: String,
    pub job_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    pub awscli: String,
    pub workdir: String,
    pub teardown: bool,
    pub poll_interval_ms: u64,
    pub log_group: String,
    pub aws_program: String,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// CLI layer. Unset fields are left out of the merge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awscli: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Overrides {
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Settings {
    /// Load settings from the config file (explicit or default location)
    /// and the CLI layer.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>, cli: &Overrides) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) => Some(load_toml_file(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(load_toml_file(&path)?),
                _ => None,
            },
        };
        Self::from_layers(file, cli.to_value()?)
    }

    /// Merge the defaults with an optional file layer and the CLI layer.
    pub fn from_layers(file: Option<Value>, cli: Value) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        layers.extend(file);
        layers.push(cli);

        let settings: Settings = serde_json::from_value(merge_layers(layers))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".to_string()));
        }
        for (key, value) in [
            ("job_queue", &self.job_queue),
            ("job_name", &self.job_name),
            ("awscli", &self.awscli),
            ("aws_program", &self.aws_program),
            ("log_group", &self.log_group),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `$HOME/.config/batchrun/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/batchrun/config.toml"))
}

/// Load and parse a TOML file into a JSON value
pub fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let digest = hex::encode(Sha256::digest(contents.as_bytes()));
    debug!("config file {} sha256 {}", path.display(), digest);

    let table: toml::Value = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml_to_json(table))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            Value::Object(table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}
