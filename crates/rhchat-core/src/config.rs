// Configuration loading and parsing (rhchat.toml plus environment overrides).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the config file inside `config/` (and the platform config dir).
pub const CONFIG_FILE_NAME: &str = "rhchat.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("invalid value for environment variable {var}: {message}")]
    InvalidOverride { var: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppInfo,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 120,
            endpoints: Endpoints::default(),
        }
    }
}

/// Paths appended to `base_url` for each backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub generate: String,
    pub subquestions: String,
    pub retrieve_resumes: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            generate: "/generate/".to_string(),
            subquestions: "/generate_subquestions/".to_string(),
            retrieve_resumes: "/retrieve_resumes/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        AppInfo {
            name: "RH Chatbot".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Longest chat message accepted, in characters.
    pub max_message_length: usize,
    /// How long a reply must be pending before the typing indicator shows.
    pub typing_indicator_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            max_message_length: 1000,
            typing_indicator_delay_ms: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration relative to `base_dir`, reading environment overrides
/// through `env`.
///
/// Lookup order: `base_dir/config/rhchat.toml`, then `platform_file` when
/// given and present, else built-in defaults. Overrides are applied last,
/// then the result is validated.
pub fn load_config_from<F>(
    base_dir: &Path,
    platform_file: Option<&Path>,
    env: F,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let local = base_dir.join("config").join(CONFIG_FILE_NAME);

    let mut config = if local.exists() {
        parse_file(&local)?
    } else if let Some(path) = platform_file.filter(|p| p.exists()) {
        parse_file(path)?
    } else {
        debug!("no config file found, using built-in defaults");
        Config::default()
    };

    apply_env_overrides(&mut config, env)?;
    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    // A client can run from anywhere; without defaults/ we fall through to
    // the platform config dir or built-in values.
    if !defaults_dir.exists() {
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, seeding `config/` from `defaults/` and reading the process
/// environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let copied = ensure_config_files(&cwd)?;
    for path in &copied {
        info!("Seeded {} from defaults", path.display());
    }
    let platform_file = platform_config_file();
    load_config_from(&cwd, platform_file.as_deref(), |key| std::env::var(key).ok())
}

/// `rhchat.toml` inside the per-user platform config directory.
pub fn platform_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "rhchat")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("RHCHAT_API_BASE_URL") {
        config.api.base_url = url;
    }
    if let Some(name) = env("RHCHAT_APP_NAME") {
        config.app.name = name;
    }
    if let Some(version) = env("RHCHAT_APP_VERSION") {
        config.app.version = version;
    }
    if let Some(raw) = env("RHCHAT_MAX_MESSAGE_LENGTH") {
        config.chat.max_message_length = parse_number("RHCHAT_MAX_MESSAGE_LENGTH", &raw)?;
    }
    if let Some(raw) = env("RHCHAT_TYPING_INDICATOR_DELAY_MS") {
        config.chat.typing_indicator_delay_ms =
            parse_number("RHCHAT_TYPING_INDICATOR_DELAY_MS", &raw)?;
    }
    if let Some(raw) = env("RHCHAT_REQUEST_TIMEOUT_SECS") {
        config.api.request_timeout_secs = parse_number("RHCHAT_REQUEST_TIMEOUT_SECS", &raw)?;
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidOverride {
        var: var.to_string(),
        message: format!("{e} (got {raw:?})"),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base_url = &config.api.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("must start with http:// or https://, got {base_url:?}"),
        });
    }

    let endpoints = &config.api.endpoints;
    let endpoint_fields: &[(&str, &str)] = &[
        ("api.endpoints.generate", endpoints.generate.as_str()),
        ("api.endpoints.subquestions", endpoints.subquestions.as_str()),
        ("api.endpoints.retrieve_resumes", endpoints.retrieve_resumes.as_str()),
    ];
    for (name, path) in endpoint_fields {
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must start with '/', got {path:?}"),
            });
        }
    }

    if config.api.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "api.request_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.chat.max_message_length == 0 {
        return Err(ConfigError::ValidationError {
            field: "chat.max_message_length".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
