use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Duplicate title '{title}' in {scope}")]
    DuplicateTitle { scope: String, title: String },

    #[error("Invalid modifier key: {0}")]
    InvalidModifier(String),

    #[error("Invalid command '{title}': {reason}")]
    InvalidCommand { title: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Command `{command}` timed out after {timeout_ms}ms")]
    CommandTimeout { command: String, timeout_ms: u128 },

    #[error("Empty command")]
    EmptyCommand,
}

pub type Result<T> = std::result::Result<T, LaunchError>;
