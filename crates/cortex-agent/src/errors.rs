use thiserror::Error;

/// Invalid or missing action input. Always fatal to the run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Missing required input: {0}")]
    MissingField(&'static str),

    #[error("Either `messages` or `message` must be provided")]
    MissingMessages,

    #[error("Invalid `messages` JSON: {0}")]
    InvalidMessages(String),

    #[error("`messages` must be a JSON array")]
    MessagesNotArray,

    #[error("`messages` must contain at least one message")]
    EmptyMessages,

    #[error("Invalid integer for `{field}`: {value}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("Invalid `tool_choice` JSON: {0}")]
    InvalidToolChoice(String),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to create result directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not resolve working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Maps a settings field name to the environment variable that provides it.
pub fn to_env_var(field: &str) -> String {
    format!("SNOWFLAKE_{}", field.to_uppercase())
}
