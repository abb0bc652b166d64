use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};

/// Shipped defaults, looked up relative to the working directory.
const DEFAULT_CONFIG: &str = "config/default";
use serde::Deserialize;

/// HTTP server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload, in megabytes
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Paths to the serialized classifiers, one per category
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    pub malaria: PathBuf,
    pub pneumonia: PathBuf,
    pub brain_tumor: PathBuf,
}

/// Credentials accepted by the login gate
#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// `MEDSCAN__SECTION__KEY` variables, e.g. `MEDSCAN__SERVER__PORT`.
fn environment() -> Environment {
    Environment::with_prefix("MEDSCAN")
        .prefix_separator("__")
        .separator("__")
}

impl Settings {
    /// Loads settings in order of increasing precedence:
    /// 1. built-in defaults
    /// 2. `config/default.toml`, if present
    /// 3. the file given with `--config`, if any
    /// 4. environment variables prefixed with `MEDSCAN__` (e.g. `MEDSCAN__SERVER__PORT`)
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(Some(DEFAULT_CONFIG), explicit, environment())
    }

    fn load_from(
        default_file: Option<&str>,
        explicit: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_upload_mb", 10)?
            .set_default("logging.level", "info")?;

        if let Some(name) = default_file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::Message(format!(
                    "Configuration file not found at: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(env)
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Port must be between 1 and 65535, got: 0".to_string()));
        }

        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_mb must be greater than 0".to_string(),
            ));
        }

        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(ConfigError::Message(
                "auth.username and auth.password must not be empty".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(format!(
                "Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                self.logging.level
            ))),
        }
    }

    /// The shipped credentials use one literal for both fields.
    pub fn has_weak_credentials(&self) -> bool {
        self.auth.username == self.auth.password
    }
}
