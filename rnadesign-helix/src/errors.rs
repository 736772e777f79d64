use thiserror::Error;

use rnadesign_core::errors::DesignError;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Could not find folding executable '{executable}'. Install ViennaRNA or set {env_var}")]
    ToolNotFound {
        executable: String,
        env_var: &'static str,
    },

    #[error("{executable} failed (status={status:?}): {stderr}")]
    ToolFailed {
        executable: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Could not parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("Cannot fold an empty sequence")]
    EmptySequence,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HelixDesignError {
    #[error(transparent)]
    Design(#[from] DesignError),

    #[error("Folding oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Error parsing designer config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HelixDesignError>;
