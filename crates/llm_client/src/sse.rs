//! Shared SSE -> [`LlmStream`] adapter.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Response;

use crate::provider::{LlmChunk, LlmError, LlmStream, Result};

fn to_stream_error(err: LlmError) -> LlmError {
    match err {
        LlmError::Stream(msg) => LlmError::Stream(msg),
        other => LlmError::Stream(other.to_string()),
    }
}

/// Convert an SSE HTTP [`Response`] into an [`LlmStream`].
///
/// `handler` receives each event's data payload and can:
/// - return `Ok(Some(chunk))` to emit a chunk
/// - return `Ok(None)` to skip the event
/// - return `Err(_)` to emit a stream error (mapped to `LlmError::Stream`)
pub fn llm_stream_from_sse<H>(response: Response, mut handler: H) -> LlmStream
where
    H: FnMut(&str) -> Result<Option<LlmChunk>> + Send + 'static,
{
    let stream = response
        .bytes_stream()
        .eventsource()
        .map(move |event| {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            handler(event.data.as_str()).map_err(to_stream_error)
        })
        .filter_map(|result| async move {
            match result {
                Ok(Some(chunk)) => Some(Ok(chunk)),
                Ok(None) => None,
                Err(err) => Some(Err(err)),
            }
        });

    Box::pin(stream)
}
