// Error types shared by the library and the binaries

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("malformed engine code '{code}': {reason}")]
    MalformedCode { code: String, reason: String },

    #[error("no valid opponent codes supplied")]
    NoOpponents,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("budget exhausted: no symbol left to play in round {round}")]
    BudgetExhausted { round: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
