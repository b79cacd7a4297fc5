//! Chat Message Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The student
    User,
    /// The guidance assistant
    Assistant,
    /// Instructions for the model
    System,
}

impl ChatRole {
    /// Role name on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// An image attached to a user message
///
/// The data is kept base64-encoded and never inspected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type such as `image/png`
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data_base64: String,
}

impl ImageAttachment {
    /// Create an attachment from already encoded data
    pub fn new(mime_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data_base64: data_base64.into(),
        }
    }

    /// The attachment as a `data:` URI
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

/// A message in the conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// Optional attached image
    pub image: Option<ImageAttachment>,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
    /// Whether the message is still being streamed
    pub streaming: bool,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            image: None,
            timestamp: Utc::now(),
            streaming: false,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Create an empty assistant message that will be filled while streaming
    #[must_use]
    pub fn streaming_assistant() -> Self {
        Self {
            streaming: true,
            ..Self::new(ChatRole::Assistant, String::new())
        }
    }

    /// Attach an image
    #[must_use]
    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Mark streaming as complete
    pub fn complete(&mut self) {
        self.streaming = false;
    }
}

/// A request for one assistant reply
#[derive(Clone, Debug, Default)]
pub struct ChatRequest {
    /// Conversation so far, oldest first, ending with the user's message
    pub messages: Vec<ChatMessage>,
    /// System prompt sent ahead of the conversation
    pub system: Option<String>,
    /// Model override (backend default when `None`)
    pub model: Option<String>,
    /// Sampling temperature (backend default when `None`)
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Create a request over a conversation
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set system prompt
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_assistant_starts_empty() {
        let mut msg = ChatMessage::streaming_assistant();
        assert_eq!(msg.role, ChatRole::Assistant);
        assert!(msg.content.is_empty());
        assert!(msg.streaming);
        msg.complete();
        assert!(!msg.streaming);
    }

    #[test]
    fn test_image_data_uri() {
        let image = ImageAttachment::new("image/png", "iVBORw0KGgo=");
        assert_eq!(image.data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![ChatMessage::user("Hi")])
            .with_system("Be kind")
            .with_model("llama3.2")
            .with_temperature(5.0);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.system.as_deref(), Some("Be kind"));
        assert_eq!(request.model.as_deref(), Some("llama3.2"));
        assert_eq!(request.temperature, Some(2.0));
    }

    #[test]
    fn test_message_ids_are_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }
}
