use crate::core::types::OperationKind;
use crate::pipeline::PipelineError;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("operation batch must be an array of operations")]
    InvalidBatch,

    #[error("invalid operation at index {index}: {reason}")]
    InvalidOperation { index: usize, reason: String },

    #[error("unsupported chainId \"{chain}\": supported chainIds are {supported}")]
    UnsupportedChain { chain: String, supported: String },

    #[error("{kind} operation requires a \"{param}\" parameter")]
    MissingParam {
        kind: OperationKind,
        param: &'static str,
    },

    #[error("invalid \"{param}\" parameter for {kind} operation: {reason}")]
    InvalidParam {
        kind: OperationKind,
        param: &'static str,
        reason: String,
    },

    #[error("failed to {action} for {subject}: {cause}")]
    ResolutionFailed {
        action: String,
        subject: String,
        cause: String,
    },

    #[error("unsupported operation type: \"{0}\"")]
    UnsupportedOperationKind(String),

    #[error("xpath operations require the scraping runtime and are not supported by this engine")]
    XpathUnsupported,

    #[error("postprocess failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("math error: {0}")]
    Math(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Wrap a collaborator failure with enough context to reproduce it.
    pub fn resolution(
        action: impl Into<String>,
        subject: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        FetchError::ResolutionFailed {
            action: action.into(),
            subject: subject.into(),
            cause: cause.to_string(),
        }
    }
}

