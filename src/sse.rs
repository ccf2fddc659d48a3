//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module handles parsing and processing of SSE streams from
//! OpenAI-compatible completion APIs, converting raw byte streams into
//! structured ChatCompletionChunk objects. These streams are data-only:
//! every event is a `data:` line holding a JSON chunk, and the stream is
//! closed by the `data: [DONE]` sentinel.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability;
use crate::{ChatCompletionChunk, Error, Result};

/// What one extracted SSE event contributes to the chunk stream.
enum Extracted {
    /// A parsed chunk, or a parse error to surface in its place.
    Item(Result<ChatCompletionChunk>),

    /// A comment or keep-alive event with no data line.
    Skip,

    /// The `[DONE]` sentinel.
    Done,
}

/// Process a stream of bytes into a stream of chat completion chunks.
///
/// This function takes a byte stream from an HTTP response and converts it
/// into a stream of parsed ChatCompletionChunk objects, handling SSE
/// buffering, the `[DONE]` sentinel, and error conditions. The returned
/// stream is finite and ends when the sentinel arrives or the connection
/// closes.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream
        .map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
            })
        })
        .fuse();

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First drain any complete events already in the buffer
                while let Some((extracted, remaining)) = extract_event(&buffer) {
                    buffer = remaining;
                    match extracted {
                        Extracted::Item(item) => {
                            match &item {
                                Ok(_) => observability::STREAM_CHUNKS.click(),
                                Err(_) => observability::STREAM_ERRORS.click(),
                            }
                            return Some((item, (stream, buffer)));
                        }
                        Extracted::Skip => continue,
                        Extracted::Done => return None,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            observability::STREAM_ERRORS.click();
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        observability::STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // A server that closes without [DONE] may leave one
                        // final event missing its trailing blank line.
                        if buffer.trim().is_empty() {
                            return None;
                        }
                        buffer.push_str("\n\n");
                    }
                }
            }
        },
    )
}

/// Extract a complete SSE event from a buffer string.
///
/// Events are delimited by blank lines. Only `data:` lines matter; event
/// name lines and `:` comments are tolerated and ignored.
fn extract_event(buffer: &str) -> Option<(Extracted, String)> {
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return None;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    let mut data = None;
    for line in event_text.lines() {
        if let Some(payload) = line.strip_prefix("data:") {
            data = Some(payload.trim());
        }
    }

    match data {
        Some("[DONE]") => Some((Extracted::Done, rest)),
        Some(json_str) => match serde_json::from_str::<ChatCompletionChunk>(json_str) {
            Ok(chunk) => Some((Extracted::Item(Ok(chunk)), rest)),
            Err(e) => Some((
                Extracted::Item(Err(Error::serialization(
                    format!("Failed to parse chunk JSON: {e}"),
                    Some(Box::new(e)),
                ))),
                rest,
            )),
        },
        None => Some((Extracted::Skip, rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunk_json(content: &str) -> String {
        format!(
            r#"{{"id":"chatcmpl-1","object":"chat.completion.chunk","created":0,"model":"gpt-3.5-turbo","choices":[{{"index":0,"delta":{{"content":"{content}"}},"finish_reason":null}}]}}"#
        )
    }

    #[tokio::test]
    async fn parse_single_chunk() {
        let data = format!("data: {}\n\n", chunk_json("Hello"));
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));
        let chunk = sse_stream.next().await.unwrap().unwrap();

        assert_eq!(chunk.fragment(), Some("Hello"));
    }

    #[tokio::test]
    async fn parse_multiple_chunks() {
        let data = format!(
            "data: {}\n\ndata: {}\n\n",
            chunk_json("Hi"),
            chunk_json(" there!")
        );
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));

        let chunk1 = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk1.fragment(), Some("Hi"));

        let chunk2 = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk2.fragment(), Some(" there!"));

        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn done_sentinel_ends_the_stream() {
        let data = format!(
            "data: {}\n\ndata: [DONE]\n\ndata: {}\n\n",
            chunk_json("Hi"),
            chunk_json("ignored")
        );
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.fragment(), Some("Hi"));

        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handle_event_split_across_reads() {
        let whole = format!("data: {}\n\n", chunk_json("Hello"));
        let (first, second) = whole.split_at(whole.len() / 2);
        let first = first.to_string();
        let second = second.to_string();

        let stream = Box::pin(stream::iter(vec![
            Ok(Bytes::from(first)),
            Ok(Bytes::from(second)),
        ]));

        let mut sse_stream = Box::pin(process_sse(stream));
        let chunk = sse_stream.next().await.unwrap().unwrap();

        assert_eq!(chunk.fragment(), Some("Hello"));
    }

    #[tokio::test]
    async fn handle_malformed_json() {
        let data = "data: {not json}\n\n";
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));
        let result = sse_stream.next().await.unwrap();

        assert!(matches!(result, Err(Error::Serialization { .. })));
    }

    #[tokio::test]
    async fn comment_events_are_skipped() {
        let data = format!(": keep-alive\n\ndata: {}\n\n", chunk_json("Hi"));
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));
        let chunk = sse_stream.next().await.unwrap().unwrap();

        assert_eq!(chunk.fragment(), Some("Hi"));
    }

    #[tokio::test]
    async fn final_event_without_trailing_blank_line() {
        let data = format!("data: {}", chunk_json("Hello"));
        let stream = Box::pin(stream::once(async move { Ok(Bytes::from(data)) }));

        let mut sse_stream = Box::pin(process_sse(stream));
        let chunk = sse_stream.next().await.unwrap().unwrap();

        assert_eq!(chunk.fragment(), Some("Hello"));
        assert!(sse_stream.next().await.is_none());
    }
}
