pub mod chain;
pub mod core;
pub mod dispatch;
pub mod pipeline;
pub mod resolvers;

// Re-export commonly used types
pub use crate::core::{
    batch_from_json, Config, FetchError, FetchResult, Operation, OperationKind, OperationParams,
    ResolvedValue,
};
pub use crate::dispatch::Fetcher;
pub use crate::pipeline::{PipelinePolicy, PipelineStep};
