//! Streaming Reply Decoder
//!
//! Incrementally decodes an event-stream reply body:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//! : heartbeat
//!
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//! data: [DONE]
//! ```
//!
//! Chunks arrive with arbitrary boundaries, so the decoder keeps two
//! carry-over buffers: undecoded bytes (a UTF-8 sequence split across reads)
//! and an incomplete line. Only `choices[0].delta.content` is read from each
//! payload; every update carries the full reply so far.
//!
//! A `data:` line whose JSON fails to parse is assumed to be incomplete: it
//! is put back in front of the pending text without its line break and
//! retried once more bytes arrive. [`DecoderLimits`] bounds this so a line
//! that never becomes valid turns into [`DecodeError::MalformedLine`]
//! instead of stalling forever.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of a payload line
const DATA_PREFIX: &str = "data: ";

/// Payload marking the logical end of a reply
const DONE_SENTINEL: &str = "[DONE]";

/// Path of the text delta inside a payload
const DELTA_POINTER: &str = "/choices/0/delta/content";

/// Bounds on retrying unparsable lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Consecutive parse failures tolerated on the head line
    pub max_retries: u32,
    /// Largest incomplete line kept while waiting for its end
    pub max_pending_bytes: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_retries: 8,
            max_pending_bytes: 1024 * 1024,
        }
    }
}

/// Something the consumer should act on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeEvent {
    /// New text arrived
    Update {
        /// The fragment carried by this line
        delta: String,
        /// The full reply so far
        content: String,
    },
    /// The `[DONE]` sentinel was seen
    Done,
}

/// Unrecoverable decoding failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A data line kept failing to parse
    #[error("data line still unparsable after {attempts} attempts: {preview:?}")]
    MalformedLine {
        /// Failed attempts, including the last
        attempts: u32,
        /// Start of the offending payload
        preview: String,
    },

    /// An incomplete line outgrew the buffer limit
    #[error("incomplete line exceeds {limit} bytes")]
    LineTooLong {
        /// The configured limit
        limit: usize,
    },
}

/// Result of closing the decoder at end of stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// Events produced by lines that were still buffered
    pub events: Vec<DecodeEvent>,
    /// The full reply
    pub content: String,
    /// Whether unfinished data was left over and discarded
    pub truncated: bool,
}

/// Why a pass over the pending lines stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stop {
    /// No complete line left
    Exhausted,
    /// `[DONE]` seen
    Done,
    /// Head line restored for a retry
    Retry,
}

/// Decoder state for one reply
#[derive(Debug, Default)]
pub struct StreamDecoder {
    limits: DecoderLimits,
    pending_bytes: Vec<u8>,
    pending_line: String,
    content: String,
    retries: u32,
    done: bool,
}

impl StreamDecoder {
    /// Create a decoder with the given limits
    #[must_use]
    pub fn new(limits: DecoderLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    /// The reply accumulated so far
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether `[DONE]` has been seen
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk of the body
    ///
    /// # Errors
    ///
    /// Returns an error once a line exhausts the retry budget or the pending
    /// line grows past the size limit. Content decoded before the error
    /// stays available through [`StreamDecoder::content`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<DecodeEvent>, DecodeError> {
        self.pending_bytes.extend_from_slice(chunk);
        let text = self.take_decoded();
        self.pending_line.push_str(&text);

        let mut events = Vec::new();
        self.drain_lines(&mut events)?;

        if self.pending_line.len() > self.limits.max_pending_bytes {
            return Err(DecodeError::LineTooLong {
                limit: self.limits.max_pending_bytes,
            });
        }
        Ok(events)
    }

    /// Close the decoder at end of stream
    ///
    /// Lines still held back for a retry get their remaining chances first.
    /// Whatever is left after that is discarded and reported as truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if a retried line exhausts the budget.
    pub fn finish(&mut self) -> Result<DecodeOutcome, DecodeError> {
        let mut events = Vec::new();
        while self.pending_line.contains('\n') {
            if self.drain_lines(&mut events)? == Stop::Done {
                break;
            }
        }

        let truncated = !self.pending_bytes.is_empty() || !self.pending_line.trim().is_empty();
        if truncated {
            warn!(
                pending_bytes = self.pending_bytes.len(),
                pending_chars = self.pending_line.len(),
                "Reply stream ended mid-line; trailing data discarded"
            );
        }
        self.pending_bytes.clear();
        self.pending_line.clear();

        Ok(DecodeOutcome {
            events,
            content: self.content.clone(),
            truncated,
        })
    }

    /// Move every complete UTF-8 sequence out of the byte buffer
    ///
    /// Invalid sequences become U+FFFD; an incomplete sequence at the end
    /// stays buffered for the next chunk.
    fn take_decoded(&mut self) -> String {
        let mut out = String::new();
        let mut start = 0;
        while start < self.pending_bytes.len() {
            match std::str::from_utf8(&self.pending_bytes[start..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    start = self.pending_bytes.len();
                }
                Err(err) => {
                    let valid_end = start + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(
                        &self.pending_bytes[start..valid_end],
                    ));
                    if let Some(invalid_len) = err.error_len() {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + invalid_len;
                    } else {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
        self.pending_bytes.drain(..start);
        out
    }

    fn drain_lines(&mut self, events: &mut Vec<DecodeEvent>) -> Result<Stop, DecodeError> {
        while let Some(pos) = self.pending_line.find('\n') {
            let mut line: String = self.pending_line.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }

            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(raw_payload) = line.strip_prefix(DATA_PREFIX) else {
                debug!(line = %line, "Ignoring non-data line");
                continue;
            };
            let payload = raw_payload.trim();

            if payload == DONE_SENTINEL {
                self.done = true;
                events.push(DecodeEvent::Done);
                return Ok(Stop::Done);
            }

            match serde_json::from_str::<Value>(payload) {
                Ok(value) => {
                    self.retries = 0;
                    let delta = value
                        .pointer(DELTA_POINTER)
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if !delta.is_empty() {
                        self.content.push_str(delta);
                        events.push(DecodeEvent::Update {
                            delta: delta.to_string(),
                            content: self.content.clone(),
                        });
                    }
                }
                Err(err) => {
                    self.retries += 1;
                    if self.retries > self.limits.max_retries {
                        return Err(DecodeError::MalformedLine {
                            attempts: self.retries,
                            preview: payload.chars().take(80).collect(),
                        });
                    }
                    debug!(
                        attempt = self.retries,
                        error = %err,
                        "Data line did not parse, holding it for more bytes"
                    );
                    let restored = format!("{DATA_PREFIX}{raw_payload}");
                    self.pending_line.insert_str(0, &restored);
                    return Ok(Stop::Retry);
                }
            }
        }
        Ok(Stop::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
        )
    }

    #[test]
    fn test_single_line() {
        let mut decoder = StreamDecoder::default();
        let events = decoder.feed(line("Hi").as_bytes()).unwrap();
        assert_eq!(
            events,
            vec![DecodeEvent::Update {
                delta: "Hi".to_string(),
                content: "Hi".to_string()
            }]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = StreamDecoder::default();
        let body = line("ok").replace('\n', "\r\n");
        decoder.feed(body.as_bytes()).unwrap();
        assert_eq!(decoder.content(), "ok");
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let mut decoder = StreamDecoder::default();
        let events = decoder
            .feed(b"event: message\nid: 4\nretry: 100\n")
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(decoder.content(), "");
    }

    #[test]
    fn test_missing_or_empty_delta_emits_nothing() {
        let mut decoder = StreamDecoder::default();
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":null}}]}\n",
            "data: {\"choices\":[]}\n",
        );
        let events = decoder.feed(body.as_bytes()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_done_stops_the_current_chunk_only() {
        let mut decoder = StreamDecoder::default();
        let body = format!("data: [DONE]\n{}", line("late"));
        let events = decoder.feed(body.as_bytes()).unwrap();
        assert_eq!(events, vec![DecodeEvent::Done]);
        assert!(decoder.is_done());

        // The next chunk drains what was left behind
        let events = decoder.feed(b"").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(decoder.content(), "late");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = StreamDecoder::default();
        let mut body = b"data: {\"choices\":[{\"delta\":{\"content\":\"a".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"b\"}}]}\n");
        decoder.feed(&body).unwrap();
        assert_eq!(decoder.content(), "a\u{FFFD}b");
    }

    #[test]
    fn test_pending_line_limit() {
        let mut decoder = StreamDecoder::new(DecoderLimits {
            max_pending_bytes: 16,
            ..Default::default()
        });
        let err = decoder
            .feed(b"data: {\"choices\":[{\"delta\":")
            .unwrap_err();
        assert_eq!(err, DecodeError::LineTooLong { limit: 16 });
    }

    #[test]
    fn test_finish_without_leftover_is_clean() {
        let mut decoder = StreamDecoder::default();
        decoder.feed(line("done").as_bytes()).unwrap();
        let outcome = decoder.finish().unwrap();
        assert!(!outcome.truncated);
        assert_eq!(outcome.content, "done");
    }
}
