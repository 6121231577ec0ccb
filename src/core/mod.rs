pub mod config;
pub mod error;
pub mod types;
pub mod workflow_schema;

pub use error::{codes, AppError};
pub use types::ErrorCategory;
