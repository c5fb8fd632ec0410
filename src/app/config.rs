//! TOML configuration file loading
//!
//! The file is looked up at `--config-file` or, failing that, at
//! `<config dir>/Ses/ses.toml`. A missing default file is not an error;
//! a missing explicit one is. Command-line flags are applied on top.

use crate::app::cli::Args;
use crate::core::error_handling::ContextualError;
use crate::core::logging::{LogFormat, LOG_LEVELS};
use crate::dispatch::ManagerSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{message}")]
    NotFound { path: PathBuf, message: String },
    #[error("{message}")]
    Read {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{message}")]
    Parse { path: PathBuf, message: String },
    #[error("{message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, problem: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: format!("Invalid configuration value for {}: {}", field, problem),
        }
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { message, .. }
            | ConfigError::Parse { message, .. }
            | ConfigError::Invalid { message, .. } => Some(message),
            ConfigError::Read { .. } => None,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    pub file: Option<PathBuf>,
    /// `None` follows terminal detection
    pub color: Option<bool>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default().name().to_string(),
            file: None,
            color: None,
        }
    }
}

/// `[demo]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoSettings {
    pub messages: usize,
    pub passes: usize,
    pub from_priority: u8,
    pub to_priority: u8,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            messages: 8,
            passes: 3,
            from_priority: 0,
            to_priority: 9,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub manager: ManagerSettings,
    pub logging: LoggingSettings,
    pub demo: DemoSettings,
}

impl AppConfig {
    /// `<config dir>/Ses/ses.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("Ses").join("ses.toml"))
    }

    /// Load from `explicit`, else from the default path, else defaults
    ///
    /// Returns the configuration and the file it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                        message: format!(
                            "The specified configuration file does not exist: {}",
                            path.display()
                        ),
                    });
                }
                Ok((Self::from_file(path)?, Some(path.to_path_buf())))
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    let config = Self::from_file(&path)?;
                    Ok((config, Some(path)))
                }
                _ => Ok((Self::default(), None)),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: format!("Error reading configuration file {}", path.display()),
            source: e,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Parse TOML text; `origin` is only used in error messages
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: format!(
                "Error parsing configuration file {}: {}",
                origin.display(),
                e
            ),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay command-line values, then re-validate
    pub fn apply_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = format.clone();
        }
        if let Some(file) = args.log_file_override() {
            self.logging.file = file;
        }
        if let Some(color) = args.color_override() {
            self.logging.color = Some(color);
        }
        if let Some(messages) = args.messages {
            self.demo.messages = messages;
        }
        if let Some(passes) = args.passes {
            self.demo.passes = passes;
        }
        if let Some(from) = args.from {
            self.demo.from_priority = from;
        }
        if let Some(to) = args.to {
            self.demo.to_priority = to;
        }
        if let Some(timeout) = args.gate_timeout {
            self.manager.gate_timeout_ms = timeout;
        }
        if let Some(wait) = args.post_wait {
            self.manager.post_wait_ms = wait;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err((field, problem)) = self.manager.validate() {
            return Err(ConfigError::invalid(&format!("manager.{}", field), problem));
        }
        if !LOG_LEVELS
            .iter()
            .any(|level| level.eq_ignore_ascii_case(&self.logging.level))
        {
            return Err(ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
        if LogFormat::from_name(&self.logging.format).is_none() {
            return Err(ConfigError::invalid(
                "logging.format",
                format!(
                    "'{}' is not one of {}",
                    self.logging.format,
                    LogFormat::names().join(", ")
                ),
            ));
        }
        Ok(())
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_name(&self.logging.format).unwrap_or_default()
    }

    /// Colour setting, falling back to `is_terminal` when unset
    pub fn use_color(&self, is_terminal: bool) -> bool {
        self.logging.color.unwrap_or(is_terminal)
    }
}
