//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with a sequence of `data:` events,
//! each carrying one JSON [`GenerateContentResponse`] chunk.  This module turns
//! the raw byte stream into a stream of parsed chunks, handling buffering of
//! events split across network reads (including multi-byte UTF-8 characters)
//! and errors reported in-band.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::types::GenerateContentResponse;
use crate::{Error, Result};

/// Process a stream of bytes into a stream of response chunks.
///
/// This function takes a byte stream from an HTTP response and converts it into
/// a stream of parsed [`GenerateContentResponse`] objects, handling SSE parsing,
/// buffering, and error conditions.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream
        .map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
            })
        })
        .fuse();

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some((event, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match event {
                        Some(event) => {
                            record(&event);
                            return Some((event, (stream, buffer)));
                        }
                        None => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream; a final event may lack its blank line.
                        if buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                            buffer.extend_from_slice(b"\n\n");
                            if let Some((Some(event), _)) = extract_event(&buffer) {
                                record(&event);
                                return Some((event, (stream, Vec::new())));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

fn record(event: &Result<GenerateContentResponse>) {
    match event {
        Ok(_) => STREAM_CHUNKS.click(),
        Err(_) => STREAM_ERRORS.click(),
    }
}

/// Extract a complete SSE event from a buffer.
///
/// Returns `None` when no complete event is buffered yet.  Otherwise returns
/// the parsed event (or `None` for events without data, such as comments and
/// keep-alives) together with the unconsumed remainder of the buffer.
#[allow(clippy::type_complexity)]
fn extract_event(buffer: &[u8]) -> Option<(Option<Result<GenerateContentResponse>>, Vec<u8>)> {
    // Simple SSE parsing - each event is delimited by double newlines
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let rest = buffer[end + 2..].to_vec();

    let event_text = match std::str::from_utf8(&buffer[..end]) {
        Ok(text) => text,
        Err(e) => return Some((Some(Err(e.into())), rest)),
    };

    let mut data_lines = Vec::new();
    for line in event_text.lines() {
        if let Some(data) = line.strip_prefix("data:") {
            data_lines.push(data.strip_prefix(' ').unwrap_or(data));
        }
    }
    if data_lines.is_empty() {
        return Some((None, rest));
    }

    Some((Some(parse_data(&data_lines.join("\n"))), rest))
}

/// Parse the data payload of one event.
fn parse_data(data: &str) -> Result<GenerateContentResponse> {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        code: Option<u16>,
        message: Option<String>,
        status: Option<String>,
    }

    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        )
    })?;

    if value.get("error").is_some() {
        let envelope: ErrorEnvelope = serde_json::from_value(value)?;
        return Err(Error::api(
            envelope.error.code.unwrap_or(500),
            envelope.error.status,
            envelope
                .error
                .message
                .unwrap_or_else(|| "error reported in stream".to_string()),
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        Error::serialization(
            format!("Malformed response chunk: {e}"),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    const CHUNK_A: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"}]}}]}"#;
    const CHUNK_B: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":" there"}]},"finishReason":"STOP"}]}"#;

    async fn collect(chunks: Vec<Vec<u8>>) -> Vec<Result<GenerateContentResponse>> {
        let stream = Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect::<Vec<_>>(),
        ));
        process_sse(stream).collect().await
    }

    #[tokio::test]
    async fn parse_single_event() {
        let events = collect(vec![format!("data: {CHUNK_A}\n\n").into_bytes()]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), "Hello");
    }

    #[tokio::test]
    async fn parse_multiple_events_with_crlf() {
        let body = format!("data: {CHUNK_A}\r\n\r\ndata: {CHUNK_B}\r\n\r\n");
        let events = collect(vec![body.into_bytes()]).await;
        let texts: Vec<String> = events.into_iter().map(|e| e.unwrap().text()).collect();
        assert_eq!(texts, vec!["Hello".to_string(), " there".to_string()]);
    }

    #[tokio::test]
    async fn handle_split_event() {
        let body = format!("data: {CHUNK_A}\n\n");
        let (left, right) = body.as_bytes().split_at(17);
        let events = collect(vec![left.to_vec(), right.to_vec()]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), "Hello");
    }

    #[tokio::test]
    async fn handle_split_utf8() {
        let body = r#"data: {"candidates":[{"content":{"parts":[{"text":"café ☕"}]}}]}

"#;
        let bytes = body.as_bytes();
        let cut = body.find('☕').unwrap() + 1;
        let events = collect(vec![bytes[..cut].to_vec(), bytes[cut..].to_vec()]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().text(), "café ☕");
    }

    #[tokio::test]
    async fn final_event_without_blank_line() {
        let events = collect(vec![format!("data: {CHUNK_B}\n").into_bytes()]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().finish_reason(), Some("STOP"));
    }

    #[tokio::test]
    async fn skip_comments_and_keepalives() {
        let body = format!(": keep-alive\n\ndata: {CHUNK_A}\n\n\n");
        let events = collect(vec![body.into_bytes()]).await;
        assert_eq!(events.len(), 1);
        assert!(events[0].is_ok());
    }

    #[tokio::test]
    async fn handle_malformed_event() {
        let events = collect(vec![b"data: {not json\n\n".to_vec()]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(Error::Serialization { .. })));
    }

    #[tokio::test]
    async fn in_band_error_event() {
        let body = r#"data: {"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}

"#;
        let events = collect(vec![body.as_bytes().to_vec()]).await;
        match &events[0] {
            Err(Error::Api {
                status_code,
                status,
                message,
            }) => {
                assert_eq!(*status_code, 503);
                assert_eq!(status.as_deref(), Some("UNAVAILABLE"));
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
