//! Question Bank
//!
//! The fixed questionnaire the quiz walks through. The built-in bank is
//! compiled in from `data/questions.toml`; authored banks can be loaded from
//! the same TOML shape and go through identical validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tags::CareerTag;
use crate::catalog::CatalogProvider;

const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.toml");

/// Errors raised while loading a question bank
#[derive(Debug, Error)]
pub enum QuestionBankError {
    /// Failed to read the bank file
    #[error("failed to read question bank: {0}")]
    Read(#[from] std::io::Error),

    /// TOML was malformed or named an unknown career tag
    #[error("failed to parse question bank: {0}")]
    Parse(#[from] toml::de::Error),

    /// The bank has no questions at all
    #[error("question bank is empty")]
    Empty,

    /// A question offers nothing to choose
    #[error("question {question} has no options")]
    NoOptions {
        /// Offending question id
        question: u32,
    },

    /// Two options of one question share an id
    #[error("question {question} has duplicate option id {option:?}")]
    DuplicateOption {
        /// Offending question id
        question: u32,
        /// The repeated option id
        option: String,
    },
}

/// One selectable answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Option id, unique within its question
    pub id: String,
    /// Text shown to the student
    pub label: String,
    /// Careers this answer counts towards
    pub tags: Vec<CareerTag>,
}

/// One multiple-choice question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Ordinal id
    pub id: u32,
    /// Question text
    pub prompt: String,
    /// Options in display order
    pub options: Vec<QuizOption>,
}

impl Question {
    /// Look up an option by id
    #[must_use]
    pub fn option(&self, id: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[derive(Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

/// An ordered, validated list of questions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from already constructed questions
    ///
    /// # Errors
    ///
    /// Returns an error if the bank is empty, a question has no options, or
    /// option ids repeat within a question.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        for question in &questions {
            if question.options.is_empty() {
                return Err(QuestionBankError::NoOptions {
                    question: question.id,
                });
            }
            let mut seen = HashSet::new();
            for option in &question.options {
                if !seen.insert(option.id.as_str()) {
                    return Err(QuestionBankError::DuplicateOption {
                        question: question.id,
                        option: option.id.clone(),
                    });
                }
            }
        }
        Ok(Self { questions })
    }

    /// The five questions shipped with the portal
    ///
    /// # Errors
    ///
    /// Only fails if the embedded content is broken.
    pub fn builtin() -> Result<Self, QuestionBankError> {
        Self::from_toml_str(BUILTIN_QUESTIONS)
    }

    /// Parse and validate a bank from TOML
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown career tags, or any of the
    /// structural problems checked by [`QuestionBank::new`].
    pub fn from_toml_str(content: &str) -> Result<Self, QuestionBankError> {
        let file: BankFile = toml::from_str(content)?;
        Self::new(file.questions)
    }

    /// Load a bank from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Questions in order
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a validated bank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Tags used by the bank that the catalog has no career entry for
    #[must_use]
    pub fn unmatched_tags(&self, catalog: &dyn CatalogProvider) -> Vec<CareerTag> {
        let mut missing: Vec<CareerTag> = self
            .questions
            .iter()
            .flat_map(|q| q.options.iter())
            .flat_map(|o| o.tags.iter().copied())
            .filter(|tag| catalog.career(*tag).is_none())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}
