//! Logging trait for generative-language client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`Gemini`](crate::Gemini)
//! client.

use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// A trait for logging client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including outgoing requests and individual streamed chunks.
///
/// # Example
///
/// ```rust,ignore
/// use compass::{ClientLogger, GenerateContentRequest, GenerateContentResponse, Model};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, model: &Model, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{model}: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
///
///     fn log_stream_text(&self, text: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "complete: {text}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request immediately before it is sent.
    fn log_request(&self, model: &Model, request: &GenerateContentRequest);

    /// Log an individual streamed chunk, or the whole body of a non-streaming
    /// call.
    fn log_stream_chunk(&self, chunk: &GenerateContentResponse);

    /// Log the concatenated answer text once a stream ends cleanly.
    fn log_stream_text(&self, text: &str);
}
