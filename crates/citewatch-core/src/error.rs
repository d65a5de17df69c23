use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platform limits file at {path}: {source}")]
    LimitsFileIo {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse platform limits file: {0}")]
    LimitsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
