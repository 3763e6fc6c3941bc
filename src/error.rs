use thiserror::Error;

use crate::parser::SkipReason;

#[derive(Error, Debug)]
pub enum SplitError {
    /// A timestamp after a structurally valid block header failed to parse.
    /// This aborts the whole parse regardless of strictness.
    #[error("Malformed timestamp at line {line}:\n{detail}")]
    Timestamp { line: usize, detail: String },

    /// A defective block encountered under strict parsing. Under lenient
    /// parsing the same block is skipped with a warning instead.
    #[error("Invalid block at line {line}: {reason}")]
    Block { line: usize, reason: SkipReason },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
