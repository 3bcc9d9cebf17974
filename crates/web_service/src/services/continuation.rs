//! Chunked continuation orchestrator.
//!
//! Assembles output longer than one model response by repeatedly asking the
//! transport for a bounded continuation, concatenating the chunks into a
//! single caller-visible stream. Strictly sequential: each chunk's prompt
//! depends on the previous chunk's output.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chat_core::ConversationMessage;
use futures::Stream;
use llm_client::{collect_response, LlmError, LlmProvider};

use crate::error::AppError;

/// Completion sentinel the model emits when the overall task is done.
pub const END_OF_OUTPUT: &str = "<END_OF_OUTPUT>";

const DEFAULT_TARGET_WORDS: u64 = 500_000;
const DEFAULT_CHUNK_WORDS: u64 = 2_000;
const DEFAULT_MAX_ITERATIONS: u32 = 500;
const THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ContinuationOptions {
    /// Approximate target output size in words. A soft bound: the loop stops
    /// after the chunk that crosses it.
    pub target_words: u64,
    /// Approximate words requested per chunk.
    pub chunk_words: u64,
    /// Hard backstop against a sentinel that never arrives.
    pub max_iterations: u32,
    /// Fixed delay between iterations.
    pub throttle: Duration,
}

impl Default for ContinuationOptions {
    fn default() -> Self {
        Self {
            target_words: DEFAULT_TARGET_WORDS,
            chunk_words: DEFAULT_CHUNK_WORDS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            throttle: THROTTLE,
        }
    }
}

impl ContinuationOptions {
    /// Apply request overrides onto the defaults. Zero is rejected for all
    /// three parameters; absent values fall back.
    pub fn from_request(
        target_words: Option<u64>,
        chunk_words: Option<u64>,
        max_iterations: Option<u32>,
    ) -> Result<Self, AppError> {
        let defaults = Self::default();
        let options = Self {
            target_words: target_words.unwrap_or(defaults.target_words),
            chunk_words: chunk_words.unwrap_or(defaults.chunk_words),
            max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
            throttle: defaults.throttle,
        };

        if options.target_words == 0 || options.chunk_words == 0 || options.max_iterations == 0 {
            return Err(AppError::InvalidInput(
                "targetWords, chunkWords and maxIterations must be positive".to_string(),
            ));
        }
        Ok(options)
    }
}

fn continuation_prompt(chunk_words: u64) -> String {
    format!(
        "-- CONTINUE: Please continue the previous output. Produce up to {chunk_words} words \
         in this response, and then stop. If you have finished the whole text, indicate \
         completion by outputting the token {END_OF_OUTPUT} on its own line."
    )
}

fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Run the continuation loop, streaming concatenated chunks and inline
/// bracketed diagnostic markers.
///
/// `messages` must already be sanitized. The stream closes when the loop
/// exits, whichever of the four stop conditions fired; errors are reported
/// in-band and never propagated to the caller.
pub fn continuation_stream(
    provider: Arc<dyn LlmProvider>,
    messages: Vec<ConversationMessage>,
    options: ContinuationOptions,
) -> Pin<Box<dyn Stream<Item = Bytes> + Send>> {
    Box::pin(async_stream::stream! {
        let mut produced_words: u64 = 0;
        let mut iterations: u32 = 0;
        let mut context = messages;

        while produced_words < options.target_words && iterations < options.max_iterations {
            iterations += 1;

            let mut request = context.clone();
            request.push(ConversationMessage::user(continuation_prompt(options.chunk_words)));

            let chunk_result = match provider.chat_stream(&request, None).await {
                Ok(stream) => collect_response(stream).await,
                Err(err) => Err(err),
            };

            let chunk_text = match chunk_result {
                Ok(text) => text,
                Err(LlmError::Api { status, body }) => {
                    // Fatal for this run; no retry above the transport layer.
                    yield Bytes::from(format!("\n\n[error chunk {iterations}]: {status} {body}\n"));
                    break;
                }
                Err(err) => {
                    log::error!("continuation chunk {iterations} failed: {err}");
                    yield Bytes::from(format!("\n\n[generate-large error] {err}\n"));
                    break;
                }
            };

            yield Bytes::from(chunk_text.clone());

            produced_words += count_words(chunk_text.trim());

            if chunk_text.contains(END_OF_OUTPUT) {
                yield Bytes::from("\n\n[generation complete]\n");
                break;
            }

            // The chunk becomes context for the next continuation request.
            context.push(ConversationMessage::assistant(chunk_text));

            tokio::time::sleep(options.throttle).await;
        }
    })
}
