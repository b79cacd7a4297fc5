//! Guidance Core - Engine Room of the Career Guidance Portal
//!
//! This crate holds the logic behind the student career-guidance portal,
//! independent of any UI framework. A terminal front end, a web server or a
//! desktop shell can all drive it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Front ends                                │
//! │        ┌─────────┐      ┌─────────┐      ┌────────────────┐      │
//! │        │   CLI   │      │  Web UI │      │ Desktop / Test │      │
//! │        └────┬────┘      └────┬────┘      └───────┬────────┘      │
//! │             └────────────────┴───────────────────┘               │
//! └──────────────────────────────┼───────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────────┐
//! │                       GUIDANCE CORE                               │
//! │  ┌────────────┐  ┌─────────────────────────┐  ┌───────────────┐  │
//! │  │    Quiz    │  │          Chat           │  │    Catalog    │  │
//! │  │   engine   │  │ session → client →      │  │  (injected,   │  │
//! │  │            │  │ SSE decoder             │  │   read-only)  │  │
//! │  └─────┬──────┘  └─────────────────────────┘  └───────┬───────┘  │
//! │        └────────────── career lookup ─────────────────┘          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`QuizEngine`]: Questionnaire state machine producing career recommendations
//! - [`StreamDecoder`]: Incremental decoder for `data:` event-stream replies
//! - [`ChatSession`]: Conversation history with a single in-flight reply
//! - [`CatalogProvider`]: Read-only reference data (careers, colleges, ...)
//! - [`GuidanceConfig`]: Layered configuration (file, environment, CLI)
//!
//! # Quick Start
//!
//! ```ignore
//! use guidance_core::{QuestionBank, QuizEngine, StaticCatalog};
//!
//! let catalog = StaticCatalog::builtin()?;
//! let mut quiz = QuizEngine::new(QuestionBank::builtin()?, &catalog);
//! quiz.start();
//! quiz.advance("q1-build")?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod chat;
pub mod config;
pub mod quiz;

// Re-exports for convenience
pub use catalog::favorites::{FavoriteError, FavoriteRef, FavoriteStore, InMemoryFavorites, UserId};
pub use catalog::{
    CatalogError, CatalogKind, CatalogProvider, Career, CareerCategory, College, CollegeType,
    Course, CourseLevel, CourseMode, EducationLevel, GovernmentJob, JobSector, ResourceKind,
    Scholarship, StaticCatalog, WellbeingResource,
};
pub use chat::{
    ChatBackend, ChatError, ChatMessage, ChatRequest, ChatRole, ChatSession, DecodeError,
    DecodeEvent, DecoderLimits, ImageAttachment, MessageId, OpenAiCompatBackend, ReplyEvent,
    ReplyStream, StreamDecoder, FALLBACK_REPLY,
};
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env,
    CatalogSettings, ChatSettings, ConfigError, ConfigOverrides, ConfigSource, GuidanceConfig,
    GuidanceToml, QuizSettings,
};
pub use quiz::{
    CareerTag, Question, QuestionBank, QuestionBankError, QuizEngine, QuizError, QuizOption,
    QuizState, Recommendation,
};
