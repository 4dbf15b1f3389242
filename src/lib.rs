// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod service;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{API_KEY_ENV, ChunkStream, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Gemini};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use service::{CompletionService, TextStream};
pub use types::*;
