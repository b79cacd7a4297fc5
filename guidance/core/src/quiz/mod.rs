//! Career Quiz
//!
//! A fixed multiple-choice questionnaire whose answers are tagged with the
//! careers they suit. The engine tallies tags across answers and recommends
//! the most frequent careers that the catalog knows about.
//!
//! # Usage
//!
//! ```ignore
//! use guidance_core::quiz::{QuestionBank, QuizEngine, QuizState};
//!
//! let mut quiz = QuizEngine::new(QuestionBank::builtin()?, &catalog);
//! quiz.start();
//! while let Some(question) = quiz.current_question() {
//!     let choice = question.options[0].id.clone();
//!     quiz.advance(&choice)?;
//! }
//! assert_eq!(quiz.state(), QuizState::ShowingResults);
//! let top = quiz.results();
//! ```

mod bank;
mod engine;
mod tags;

pub use bank::{Question, QuestionBank, QuestionBankError, QuizOption};
pub use engine::{rank_tags, QuizEngine, QuizError, QuizState, Recommendation, DEFAULT_TOP_N};
pub use tags::{CareerTag, UnknownCareerTag};
