//! Chat-completion client for the remote assistant service.

mod client;
mod error;
mod types;

pub use client::{CompletionService, HttpCompletionClient};
pub use error::CompletionError;
pub use types::{
    Choice, CompletionRequest, CompletionResponse, GenerationParams, Message, Role, Usage,
};
