//! Error types for optimizer construction

use thiserror::Error;

/// Errors raised while configuring the fine-tuning optimizer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptimError {
    #[error("unknown learning rate scheduler {got:?}, should be \"noam_decay\" or \"linear_warmup_decay\"")]
    InvalidScheduler { got: String },
}

/// Result type for optimizer configuration
pub type Result<T> = std::result::Result<T, OptimError>;
