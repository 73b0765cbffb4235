pub mod coerce;
pub mod config;
pub mod constants;
pub mod decimal;
pub mod error;
pub mod types;

pub use config::Config;
pub use constants::*;
pub use error::{FetchError, FetchResult};
pub use types::*;
