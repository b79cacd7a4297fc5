//! Chat Backend Client
//!
//! Trait-based access to a chat-completion service, plus the implementation
//! for OpenAI-compatible endpoints (hosted APIs, or a local Ollama at
//! `http://localhost:11434/v1`).
//!
//! A reply is streamed by a spawned task that pumps the response body
//! through a [`StreamDecoder`] and forwards [`ReplyEvent`]s over a channel.
//! The caller holds a [`ReplyStream`]; cancelling or dropping it aborts the
//! task and with it the underlying read.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::decoder::{DecodeEvent, StreamDecoder};
use super::error::ChatError;
use super::messages::{ChatMessage, ChatRequest, ChatRole};
use crate::config::ChatSettings;

/// Capacity of the per-reply event channel
const REPLY_CHANNEL_CAPACITY: usize = 100;

/// Events delivered while a reply streams
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyEvent {
    /// More text arrived
    Delta {
        /// The new fragment
        delta: String,
        /// The full reply so far
        content: String,
    },
    /// The body ended normally
    Done {
        /// The full reply
        content: String,
        /// Whether an incomplete trailing line was discarded
        truncated: bool,
    },
    /// The reply failed part-way
    Failed {
        /// What went wrong
        error: ChatError,
        /// Text received before the failure
        partial: String,
    },
}

/// Receiving end of one streaming reply
pub struct ReplyStream {
    receiver: mpsc::Receiver<ReplyEvent>,
    task: Option<AbortHandle>,
}

impl ReplyStream {
    /// Wrap a receiver, optionally owning the task that feeds it
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<ReplyEvent>, task: Option<AbortHandle>) -> Self {
        Self { receiver, task }
    }

    /// Next event, or `None` once the producer is gone
    pub async fn next(&mut self) -> Option<ReplyEvent> {
        self.receiver.recv().await
    }

    /// Abort the producing task and stop accepting events
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Reply stream cancelled");
        }
        self.receiver.close();
    }
}

impl Drop for ReplyStream {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for ReplyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyStream")
            .field("owns_task", &self.task.is_some())
            .finish_non_exhaustive()
    }
}

/// Chat backend trait
///
/// Implement this trait to plug in a different completion service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Start streaming a reply
    ///
    /// Fails before any streaming begins if the request cannot be sent or
    /// the backend answers with a non-success status.
    async fn stream_reply(&self, request: &ChatRequest) -> Result<ReplyStream, ChatError>;
}

/// Drive a response body through a decoder
///
/// Sends a [`ReplyEvent::Delta`] for every text update and returns the
/// terminal event ([`ReplyEvent::Done`] or [`ReplyEvent::Failed`]) without
/// sending it. Each read waits at most `idle_timeout`.
pub async fn pump_stream<S, B, E>(
    mut body: S,
    mut decoder: StreamDecoder,
    idle_timeout: Duration,
    tx: &mpsc::Sender<ReplyEvent>,
) -> ReplyEvent
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    loop {
        let Ok(next) = tokio::time::timeout(idle_timeout, body.next()).await else {
            return failed(ChatError::IdleTimeout(idle_timeout), &decoder);
        };
        match next {
            Some(Ok(chunk)) => {
                let events = match decoder.feed(chunk.as_ref()) {
                    Ok(events) => events,
                    Err(err) => return failed(err.into(), &decoder),
                };
                if !forward(events, tx).await {
                    return failed(ChatError::Cancelled, &decoder);
                }
            }
            Some(Err(err)) => return failed(ChatError::Transport(err.to_string()), &decoder),
            None => break,
        }
    }

    match decoder.finish() {
        Ok(outcome) => {
            if !forward(outcome.events, tx).await {
                return failed(ChatError::Cancelled, &decoder);
            }
            ReplyEvent::Done {
                content: outcome.content,
                truncated: outcome.truncated,
            }
        }
        Err(err) => failed(err.into(), &decoder),
    }
}

/// Send updates on; `false` once the receiver is gone
async fn forward(events: Vec<DecodeEvent>, tx: &mpsc::Sender<ReplyEvent>) -> bool {
    for event in events {
        match event {
            DecodeEvent::Update { delta, content } => {
                if tx.send(ReplyEvent::Delta { delta, content }).await.is_err() {
                    return false;
                }
            }
            DecodeEvent::Done => debug!("Reply marked done by sentinel"),
        }
    }
    true
}

fn failed(error: ChatError, decoder: &StreamDecoder) -> ReplyEvent {
    warn!(error = %error, partial_len = decoder.content().len(), "Reply stream failed");
    ReplyEvent::Failed {
        error,
        partial: decoder.content().to_string(),
    }
}

/// Backend for OpenAI-compatible `/chat/completions` endpoints
#[derive(Clone)]
pub struct OpenAiCompatBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    settings: ChatSettings,
    http_client: reqwest::Client,
}

impl OpenAiCompatBackend {
    /// Create a backend from chat settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(settings: &ChatSettings) -> Result<Self, ChatError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            settings: settings.clone(),
            http_client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    /// Build the JSON body for a streaming completion request
    #[must_use]
    pub fn build_body(&self, request: &ChatRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_ref().or(self.settings.system_prompt.as_ref()) {
            messages.push(json!({ "role": ChatRole::System.as_str(), "content": system }));
        }
        messages.extend(
            request
                .messages
                .iter()
                .filter(|m| !(m.content.is_empty() && m.image.is_none()))
                .map(message_json),
        );

        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.model),
            "messages": messages,
            "stream": true,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

fn message_json(message: &ChatMessage) -> Value {
    match &message.image {
        Some(image) => json!({
            "role": message.role.as_str(),
            "content": [
                { "type": "text", "text": message.content },
                { "type": "image_url", "image_url": { "url": image.data_uri() } },
            ],
        }),
        None => json!({
            "role": message.role.as_str(),
            "content": message.content,
        }),
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    async fn health_check(&self) -> bool {
        let mut builder = self
            .http_client
            .get(self.models_url())
            .timeout(Duration::from_secs(5));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        matches!(builder.send().await, Ok(response) if response.status().is_success())
    }

    async fn stream_reply(&self, request: &ChatRequest) -> Result<ReplyStream, ChatError> {
        if request.messages.is_empty() {
            return Err(ChatError::InvalidRequest("no messages to send".to_string()));
        }
        let body = self.build_body(request);
        info!(
            url = %self.completions_url(),
            model = %body["model"],
            messages = request.messages.len(),
            "Requesting chat reply"
        );

        let mut builder = self.http_client.post(self.completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let idle_timeout = self.settings.idle_timeout;
        let response = tokio::time::timeout(idle_timeout, builder.send())
            .await
            .map_err(|_| ChatError::IdleTimeout(idle_timeout))??;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let err = ChatError::from_status(status, &body);
            warn!(status, error = %err, "Chat backend rejected request");
            return Err(err);
        }

        let (tx, rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
        let decoder = StreamDecoder::new(self.settings.limits);
        let body = Box::pin(response.bytes_stream());

        let handle = tokio::spawn(async move {
            let terminal = pump_stream(body, decoder, idle_timeout, &tx).await;
            // Receiver may already be gone if the caller cancelled
            let _ = tx.send(terminal).await;
        });

        Ok(ReplyStream::new(rx, Some(handle.abort_handle())))
    }
}
