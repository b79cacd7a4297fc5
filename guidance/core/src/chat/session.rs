//! Chat Session
//!
//! Keeps the conversation and drives one reply at a time through a
//! [`ChatBackend`].
//!
//! # Reply lifecycle
//!
//! ```text
//! send() ──► user message + empty streaming placeholder (busy)
//!              │
//!              ├─ Delta ──► placeholder.content = full reply so far
//!              ├─ Done ───► placeholder completed
//!              ├─ Failed ─► partial kept + fallback message,
//!              │            or placeholder replaced by the fallback
//!              └─ cancel ─► partial kept, empty placeholder dropped
//! ```
//!
//! The busy flag is cleared on every path, including when the `send`
//! future is dropped before it finishes.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::client::{ChatBackend, ReplyEvent};
use super::error::ChatError;
use super::messages::{ChatMessage, ChatRequest, ImageAttachment};

/// Assistant text shown when a reply fails
pub const FALLBACK_REPLY: &str = "Sorry, I could not process your request. Please try again.";

/// A conversation with the guidance assistant
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    system_prompt: Option<String>,
    messages: Vec<ChatMessage>,
    /// Index of the streaming placeholder while a reply is in flight
    pending: Option<usize>,
}

impl ChatSession {
    /// Create an empty session
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            system_prompt: None,
            messages: Vec::new(),
            pending: None,
        }
    }

    /// Set the system prompt sent with every request
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Conversation so far, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget the conversation
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] while a reply is in flight.
    pub fn clear(&mut self) -> Result<(), ChatError> {
        if self.is_busy() {
            return Err(ChatError::Busy);
        }
        debug!(messages = self.messages.len(), "Clearing chat history");
        self.messages.clear();
        Ok(())
    }

    /// Send a message and stream the reply into the conversation
    ///
    /// `on_update` sees the assistant message after every update.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] or [`ChatError::InvalidRequest`] without
    /// touching the conversation; any other error is returned after the
    /// fallback reply has been recorded.
    pub async fn send<F>(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
        on_update: F,
    ) -> Result<(), ChatError>
    where
        F: FnMut(&ChatMessage),
    {
        self.send_with_cancel(text, image, std::future::pending(), on_update)
            .await
    }

    /// Like [`ChatSession::send`], abandoning the reply once `cancel` resolves
    ///
    /// # Errors
    ///
    /// As [`ChatSession::send`]; cancellation yields [`ChatError::Cancelled`].
    pub async fn send_with_cancel<C, F>(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
        cancel: C,
        mut on_update: F,
    ) -> Result<(), ChatError>
    where
        C: Future<Output = ()>,
        F: FnMut(&ChatMessage),
    {
        let request = self.begin_reply(text, image)?;
        let backend = Arc::clone(&self.backend);
        info!(backend = backend.name(), "Sending chat message");
        let reply = InFlight { session: self };

        tokio::pin!(cancel);
        let started = tokio::select! {
            biased;
            () = &mut cancel => Err(ChatError::Cancelled),
            started = backend.stream_reply(&request) => started,
        };
        let mut stream = match started {
            Ok(stream) => stream,
            Err(err) => {
                reply.session.fail_reply(&err);
                return Err(err);
            }
        };

        let outcome = loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    stream.cancel();
                    break Err(ChatError::Cancelled);
                }
                event = stream.next() => match event {
                    Some(ReplyEvent::Delta { content, .. }) => {
                        if let Some(message) = reply.session.apply_update(content) {
                            on_update(message);
                        }
                    }
                    Some(ReplyEvent::Done { content, truncated }) => {
                        if truncated {
                            warn!("Reply ended with an incomplete line");
                        }
                        reply.session.apply_update(content);
                        break Ok(());
                    }
                    Some(ReplyEvent::Failed { error, .. }) => break Err(error),
                    None => {
                        break Err(ChatError::Transport(
                            "reply stream closed unexpectedly".to_string(),
                        ))
                    }
                },
            }
        };

        match outcome {
            Ok(()) => {
                if let Some(message) = reply.session.complete_reply() {
                    on_update(message);
                }
                Ok(())
            }
            Err(err) => {
                reply.session.fail_reply(&err);
                Err(err)
            }
        }
    }

    /// Record the user message and the placeholder; returns the request
    fn begin_reply(
        &mut self,
        text: &str,
        image: Option<ImageAttachment>,
    ) -> Result<ChatRequest, ChatError> {
        if self.is_busy() {
            return Err(ChatError::Busy);
        }
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(ChatError::InvalidRequest("message is empty".to_string()));
        }

        let mut user = ChatMessage::user(text);
        user.image = image;
        self.messages.push(user);

        let mut request = ChatRequest::new(self.messages.clone());
        request.system = self.system_prompt.clone();

        self.messages.push(ChatMessage::streaming_assistant());
        self.pending = Some(self.messages.len() - 1);
        Ok(request)
    }

    fn placeholder(&mut self) -> Option<&mut ChatMessage> {
        self.pending.and_then(|index| self.messages.get_mut(index))
    }

    fn apply_update(&mut self, content: String) -> Option<&ChatMessage> {
        let message = self.placeholder()?;
        message.content = content;
        Some(message)
    }

    fn complete_reply(&mut self) -> Option<&ChatMessage> {
        let index = self.pending.take()?;
        let message = self.messages.get_mut(index)?;
        message.complete();
        debug!(chars = message.content.len(), "Reply complete");
        Some(message)
    }

    fn fail_reply(&mut self, error: &ChatError) {
        let Some(index) = self.pending.take() else {
            return;
        };
        let Some(message) = self.messages.get_mut(index) else {
            return;
        };
        message.complete();
        let has_partial = !message.content.is_empty();
        warn!(error = %error, has_partial, "Chat reply failed");

        match (error, has_partial) {
            (ChatError::Cancelled, true) => {}
            (ChatError::Cancelled, false) => {
                self.messages.remove(index);
            }
            (_, true) => self.messages.push(ChatMessage::assistant(FALLBACK_REPLY)),
            (_, false) => message.content = FALLBACK_REPLY.to_string(),
        }
    }
}

/// Settles the in-flight reply if the sending future is dropped early
///
/// Every normal exit settles the reply itself, so on drop this only acts
/// when the future was abandoned mid-reply; that is treated as a cancel.
struct InFlight<'a> {
    session: &'a mut ChatSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.session.is_busy() {
            debug!("Send abandoned before the reply settled");
            self.session.fail_reply(&ChatError::Cancelled);
        }
    }
}
