// Error types for netstate-diff

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{table} is not found in {origin}")]
    MissingTable { table: String, origin: String },

    #[error("Missing field `{field}` in {origin}")]
    MissingField { field: String, origin: String },

    #[error("Invalid value {value:?} for field `{field}` in {origin}")]
    InvalidField {
        field: String,
        value: String,
        origin: String,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node {0} is not found in config")]
    UnknownNode(String),

    #[error("Worker task failed: {0}")]
    Task(String),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn missing_field(field: &str, origin: &str) -> Self {
        AppError::MissingField {
            field: field.to_string(),
            origin: origin.to_string(),
        }
    }

    pub fn invalid_field(field: &str, value: impl Into<String>, origin: &str) -> Self {
        AppError::InvalidField {
            field: field.to_string(),
            value: value.into(),
            origin: origin.to_string(),
        }
    }

    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        AppError::Read {
            path: path.display().to_string(),
            source,
        }
    }

    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingTable { table, .. } => {
                format!("The state export has no {} table. Check that the capture is complete.", table)
            }
            AppError::MissingField { .. } | AppError::InvalidField { .. } => {
                "The state export does not follow the expected schema.".to_string()
            }
            AppError::Read { .. } => {
                "File system error. Check the state directory and file suffixes in the config.".to_string()
            }
            AppError::Json(_) | AppError::Yaml(_) | AppError::Toml(_) => {
                "Data format error. Check that the file is valid JSON, YAML or TOML.".to_string()
            }
            AppError::Config(_) => {
                "Configuration error. Check your config file or command-line arguments.".to_string()
            }
            AppError::UnknownNode(name) => {
                format!("Node {} is not listed in original_node_params.", name)
            }
            AppError::Task(_) => {
                "An internal worker failed. This might be a bug, please report it.".to_string()
            }
        }
    }

    /// Check if the error only affects the table being built
    pub fn is_node_scoped(&self) -> bool {
        !matches!(self, AppError::Config(_) | AppError::UnknownNode(_))
    }
}
