use thiserror::Error;

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error(
        "Cannot shrink helix {helix_id} to a single pair: it has both a parent and children, so the pair to keep is ambiguous"
    )]
    AmbiguousShrink { helix_id: usize },

    #[error("Requested {requested} positions but only {available} are eligible")]
    InsufficientPositions { requested: usize, available: usize },

    #[error("Enumeration would produce {count} candidates, above the limit of {limit}")]
    TooManyCombinations { count: u128, limit: u128 },

    #[error("Error parsing selection parameters: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DesignError>;
