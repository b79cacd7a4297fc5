//! Guidance Chat
//!
//! Streaming conversation with a chat-completion backend.
//!
//! # Layers
//!
//! ```text
//! ┌──────────────┐   ReplyEvent    ┌──────────────┐   bytes   ┌──────────┐
//! │ ChatSession  │ ◄────────────── │ ChatBackend  │ ◄──────── │  HTTP    │
//! │ (history,    │   mpsc channel  │ (spawned     │           │  body    │
//! │  busy flag)  │                 │  pump task)  │           └──────────┘
//! └──────────────┘                 └──────┬───────┘
//!                                         │ feed / finish
//!                                  ┌──────▼───────┐
//!                                  │StreamDecoder │
//!                                  └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let backend = Arc::new(OpenAiCompatBackend::new(&config.chat)?);
//! let mut session = ChatSession::new(backend);
//! session.send("Which stream after 10th?", None, |msg| render(msg)).await?;
//! ```

pub mod client;
pub mod decoder;
pub mod error;
pub mod messages;
pub mod session;

pub use client::{pump_stream, ChatBackend, OpenAiCompatBackend, ReplyEvent, ReplyStream};
pub use decoder::{DecodeError, DecodeEvent, DecodeOutcome, DecoderLimits, StreamDecoder};
pub use error::{ChatError, GENERIC_STATUS_MESSAGE};
pub use messages::{ChatMessage, ChatRequest, ChatRole, ImageAttachment, MessageId};
pub use session::{ChatSession, FALLBACK_REPLY};
