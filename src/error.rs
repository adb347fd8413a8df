use thiserror::Error;

/// A candidate panicked or returned an error while being measured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CandidateFault {
    pub message: String,
}

impl CandidateFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build a fault from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self { message }
    }
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no candidates registered")]
    EmptyCandidateSet,

    #[error("candidate #{index} `{name}` failed: {source}")]
    CandidateExecutionFailed {
        index: usize,
        name: String,
        #[source]
        source: CandidateFault,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("failed to encode report: {0}")]
    ReportEncode(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),

    #[error("no tests registered in suite")]
    EmptySuite,
}

pub type Result<T> = std::result::Result<T, BenchError>;
