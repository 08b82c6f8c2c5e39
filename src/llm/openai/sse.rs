//! Server-Sent Events (SSE) parser for OpenAI-compatible streams

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::OpenAiStreamChunk;

/// One parsed event of a chat completions stream
#[derive(Debug, Clone)]
pub enum SseFrame {
    Chunk(OpenAiStreamChunk),
    /// The `data: [DONE]` sentinel
    Done,
}

/// Parse a stream of bytes as OpenAI SSE events
///
/// The format is a sequence of blank-line separated events:
/// ```text
/// data: {"choices":[{"delta":{"content":"Hel"}}]}
///
/// data: [DONE]
/// ```
///
/// Bytes are buffered until a full event is available, so events and UTF-8
/// sequences split across chunks are handled. Comment lines (`:`) are skipped.
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<SseFrame, LlmError>> + Send>> {
    let mut buffer: Vec<u8> = Vec::new();

    let frame_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
        };

        buffer.extend(chunk.iter().filter(|&&b| b != b'\r'));

        let mut frames = Vec::new();
        while let Some(event_end) = find_event_end(&buffer) {
            let event_bytes: Vec<u8> = buffer.drain(..event_end + 2).collect();

            let event_text = match std::str::from_utf8(&event_bytes) {
                Ok(text) => text,
                Err(e) => {
                    frames.push(Err(LlmError::StreamError(format!(
                        "Invalid UTF-8 in stream: {}",
                        e
                    ))));
                    continue;
                }
            };

            if let Some(frame) = parse_event(event_text) {
                frames.push(frame);
            }
        }

        futures::stream::iter(frames)
    });

    Box::pin(frame_stream)
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\n\n")
}

/// Parse a single SSE event from its text representation
fn parse_event(event_text: &str) -> Option<Result<SseFrame, LlmError>> {
    let data_lines: Vec<&str> = event_text
        .lines()
        .filter(|line| !line.starts_with(':'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(SseFrame::Done));
    }

    match serde_json::from_str::<OpenAiStreamChunk>(&data) {
        Ok(chunk) => Some(Ok(SseFrame::Chunk(chunk))),
        Err(e) => Some(Err(LlmError::SerializationError(format!(
            "Failed to parse SSE chunk: {}. Data: {}",
            e, data
        )))),
    }
}
