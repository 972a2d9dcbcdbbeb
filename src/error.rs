use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KalmanError {
    #[error("invalid distance metric: {0}")]
    InvalidMetric(String),
    #[error("covariance is not positive definite in {0}")]
    NotPositiveDefinite(&'static str),
    #[error("shape mismatch for {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, KalmanError>;
