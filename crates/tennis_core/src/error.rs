use thiserror::Error;

/// Rejected configuration. Raised before any match is simulated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid probability for {player}.{field}: {value} (must be within [0, 1])")]
    InvalidProbability {
        player: String,
        field: &'static str,
        value: f64,
    },

    #[error("Player name must not be empty")]
    EmptyName,

    #[error("Player names must be unique within a match: {0}")]
    DuplicateName(String),

    #[error("Invalid best_of: {0} (must be a positive odd number)")]
    InvalidBestOf(u32),

    #[error("Invalid {field}: {value} (must be greater than zero)")]
    NonPositive { field: &'static str, value: u64 },

    #[error("Run would need {batches} batches (at most {max} allowed); raise batch_size")]
    TooManyBatches { batches: u64, max: u64 },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },
}

/// Failure while simulating a match or a batch of matches.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Match state invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Match exceeded the safety cap of {cap} points")]
    PointCapExceeded { cap: u64 },

    #[error("Worker panicked while simulating batch {batch}: {message}")]
    WorkerPanicked { batch: usize, message: String },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure raised by a point-log sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink rejected batch {batch}: {message}")]
    Rejected { batch: usize, message: String },
}

impl SimError {
    /// Whether rerunning the same batch could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SimError::PointCapExceeded { .. } => true,
            SimError::WorkerPanicked { .. } => true,
            SimError::InvariantViolation(_) => false,
            SimError::WorkerPool(_) => false,
            SimError::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SimError::PointCapExceeded { cap: 10 }.is_retryable());
        assert!(SimError::WorkerPanicked {
            batch: 3,
            message: "boom".to_string(),
        }
        .is_retryable());
        assert!(!SimError::InvariantViolation("sets".to_string()).is_retryable());
        assert!(!SimError::WorkerPool("no threads".to_string()).is_retryable());
        assert!(!SimError::from(ConfigError::EmptyName).is_retryable());
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = SimError::from(ConfigError::InvalidBestOf(4));
        assert_eq!(err.to_string(), ConfigError::InvalidBestOf(4).to_string());
    }
}
