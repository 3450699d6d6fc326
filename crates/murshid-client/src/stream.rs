// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt stream binding: chunked text body to fragment stream.
//!
//! The backend answers `POST /chat?stream=1` with a plain chunked text
//! body (not SSE). Bytes are decoded incrementally as UTF-8: a multibyte
//! sequence split across chunk boundaries is carried over to the next
//! chunk, so Arabic and other non-ASCII text survives arbitrary chunking.

use async_trait::async_trait;
use futures::StreamExt;
use murshid_core::{FragmentStream, HistoryItem, MurshidError, PromptRequest, PromptStreamer};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::ApiClient;

#[derive(Serialize)]
struct StreamBody<'a> {
    prompt: &'a str,
    history: &'a [HistoryItem],
    stream: bool,
}

#[async_trait]
impl PromptStreamer for ApiClient {
    async fn open_stream(&self, request: PromptRequest) -> Result<FragmentStream, MurshidError> {
        let body = StreamBody {
            prompt: &request.prompt,
            history: &request.history,
            stream: true,
        };

        let response = self
            .http()
            .post(self.url("/chat?stream=1"))
            .json(&body)
            .send()
            .await
            .map_err(|e| MurshidError::Api {
                message: format!("chat stream request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, history_len = request.history.len(), "prompt stream response received");

        if status == StatusCode::UNAUTHORIZED {
            return Err(MurshidError::Unauthorized);
        }
        if !status.is_success() {
            return Err(MurshidError::StreamRequest {
                status: status.as_u16(),
            });
        }

        Ok(fragment_stream(response))
    }
}

/// Wraps a streaming response body into a fragment stream.
///
/// Fragments are yielded in arrival order; empty decodes (a chunk that
/// only completed a carried-over sequence into nothing) are skipped.
/// Dropping the stream aborts the underlying request.
fn fragment_stream(response: reqwest::Response) -> FragmentStream {
    let inner = Box::pin(response.bytes_stream());
    let decoder = Utf8Decoder::default();

    let fragments = futures::stream::unfold(
        (inner, decoder, false),
        |(mut inner, mut decoder, done)| async move {
            if done {
                return None;
            }
            loop {
                match inner.next().await {
                    Some(Ok(bytes)) => {
                        let text = decoder.decode(&bytes);
                        if text.is_empty() {
                            continue;
                        }
                        return Some((Ok(text), (inner, decoder, false)));
                    }
                    Some(Err(e)) => {
                        let err = MurshidError::Api {
                            message: format!("chat stream read failed: {e}"),
                            source: Some(Box::new(e)),
                        };
                        return Some((Err(err), (inner, decoder, true)));
                    }
                    None => {
                        let tail = decoder.finish();
                        if tail.is_empty() {
                            return None;
                        }
                        return Some((Ok(tail), (inner, decoder, true)));
                    }
                }
            }
        },
    );

    Box::pin(fragments)
}

/// Incremental UTF-8 decoder with carry-over of incomplete sequences.
///
/// Invalid sequences decode to U+FFFD and decoding continues, matching
/// the lenient text decoding the backend contract assumes.
#[derive(Debug, Default)]
struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    /// Decodes a chunk, joining it with any carried-over bytes. An
    /// incomplete trailing sequence is held back for the next chunk.
    fn decode(&mut self, input: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(input);

        let mut out = String::new();
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                        out.push_str(valid);
                    }
                    match e.error_len() {
                        Some(invalid_len) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid_up_to + invalid_len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk.
                            self.carry = rest[valid_up_to..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flushes a dangling incomplete sequence as a single U+FFFD.
    fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            String::new()
        } else {
            self.carry.clear();
            "\u{FFFD}".to_string()
        }
    }
}
