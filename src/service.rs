//! The seam between the chat session and whatever produces completions.
//!
//! The session only needs an ordered stream of text fragments followed by a
//! terminal success or failure.  [`Gemini`] provides that over HTTP; tests and
//! alternative backends provide their own [`CompletionService`].

use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};

use crate::client::{ChunkStream, Gemini};
use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::types::{GenerateContentRequest, Model};

/// An ordered stream of text fragments.
///
/// Each item is the text produced since the previous item.  The stream ends
/// cleanly on completion; an `Err` item is terminal.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A source of streamed completions.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Open a streamed completion for `request` against `model`.
    ///
    /// Errors returned here happen before any fragment is produced; errors
    /// yielded by the stream happen mid-response.
    async fn stream_text(&self, model: &Model, request: &GenerateContentRequest)
    -> Result<TextStream>;
}

#[async_trait::async_trait]
impl<S: CompletionService + ?Sized> CompletionService for Arc<S> {
    async fn stream_text(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<TextStream> {
        (**self).stream_text(model, request).await
    }
}

#[async_trait::async_trait]
impl CompletionService for Gemini {
    async fn stream_text(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<TextStream> {
        let chunks = self.stream_generate_content(model, request).await?;
        Ok(text_fragments(chunks, self.logger().cloned()))
    }
}

struct FragmentState {
    chunks: ChunkStream,
    accumulated: String,
    logger: Option<Arc<dyn ClientLogger>>,
    done: bool,
}

/// Reduce response chunks to their non-empty answer text.
///
/// A refused prompt becomes [`Error::Blocked`].  Nothing is yielded after the
/// first error.
fn text_fragments(chunks: ChunkStream, logger: Option<Arc<dyn ClientLogger>>) -> TextStream {
    let state = FragmentState {
        chunks,
        accumulated: String::new(),
        logger,
        done: false,
    };
    Box::pin(stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            match state.chunks.next().await {
                Some(Ok(chunk)) => {
                    if let Some(reason) = chunk.block_reason() {
                        state.done = true;
                        return Some((Err(Error::blocked(reason)), state));
                    }
                    let text = chunk.text();
                    if text.is_empty() {
                        continue;
                    }
                    state.accumulated.push_str(&text);
                    return Some((Ok(text), state));
                }
                Some(Err(err)) => {
                    state.done = true;
                    return Some((Err(err), state));
                }
                None => {
                    if let Some(logger) = &state.logger {
                        logger.log_stream_text(&state.accumulated);
                    }
                    return None;
                }
            }
        }
    }))
}
