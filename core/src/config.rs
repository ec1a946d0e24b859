use directories::BaseDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Runtime settings for the chat client, resolved from `ripple.yaml`.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: Url,
    pub poll_interval_ms: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Ripple is not configured—create ripple.yaml with a server address.")]
    Missing,
    #[error("Ripple configuration invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Missing => {
                "Ripple is not configured—create ripple.yaml with a server address.".to_string()
            }
            Self::Invalid(detail) => {
                format!("Ripple is misconfigured—{detail}. Update ripple.yaml.")
            }
        }
    }
}

impl ClientSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let path = locate_config_file().ok_or(ConfigError::Missing)?;
        let contents = fs::read_to_string(&path).map_err(|err| {
            ConfigError::Invalid(format!("failed to read {}: {err}", path.display()))
        })?;
        let config: RippleConfig = serde_yaml::from_str(&contents)
            .map_err(|err| ConfigError::Invalid(format!("invalid ripple.yaml: {err}")))?;
        let server = config
            .server
            .ok_or_else(|| ConfigError::Invalid("missing `server` section".to_string()))?;
        resolve_server_settings(server)
    }

    pub fn for_server(server_url: Url) -> Self {
        Self {
            server_url,
            poll_interval_ms: 1000,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn resolve_server_settings(server: ServerSection) -> Result<ClientSettings, ConfigError> {
    let raw_url = server.url.trim();
    if raw_url.is_empty() {
        return Err(ConfigError::Invalid(
            "missing server url in ripple.yaml".to_string(),
        ));
    }
    let server_url = Url::parse(raw_url)
        .map_err(|err| ConfigError::Invalid(format!("invalid server url: {err}")))?;
    let mut settings = ClientSettings::for_server(server_url);
    if let Some(interval) = server.poll_interval_ms {
        if interval == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        settings.poll_interval_ms = interval;
    }
    Ok(settings)
}

fn locate_config_file() -> Option<PathBuf> {
    ripple_yaml_candidates()
        .into_iter()
        .find(|path| path.exists())
}

fn ripple_yaml_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(base) = BaseDirs::new() {
        let config_dir = base.config_dir().join("ripple");
        paths.push(config_dir.join("ripple.yaml"));
        paths.push(config_dir.join("ripple.yml"));
        let home_dir = base.home_dir();
        paths.push(home_dir.join(".ripple").join("ripple.yaml"));
        paths.push(home_dir.join(".ripple").join("ripple.yml"));
    } else {
        paths.push(PathBuf::from("ripple.yaml"));
        paths.push(PathBuf::from("ripple.yml"));
    }
    paths
}

/// Default location for the durable session file.
pub fn default_state_dir() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        base.config_dir().join("ripple")
    } else {
        PathBuf::from(".ripple")
    }
}

#[derive(Debug, Deserialize)]
struct RippleConfig {
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    #[serde(default)]
    url: String,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
}
