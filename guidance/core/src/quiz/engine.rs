//! Quiz Engine
//!
//! Walks a student through the question bank and turns the accumulated
//! answer tags into ranked career recommendations.
//!
//! # State Machine
//!
//! ```text
//!  NotStarted ──start──▶ Answering(0) ──advance──▶ Answering(1) ─ … ─▶ ShowingResults
//!                            ▲   │                     │                     │
//!                            │   └──────◀── go_back ───┘                     │
//!                            └──────────────────── reset ◀───────────────────┘
//! ```
//!
//! Every answer is stored twice: appended to the flat accumulator that the
//! ranking reads, and pushed as one batch so `go_back` can undo exactly the
//! tags the previous answer contributed, whatever the option's size.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::bank::{Question, QuestionBank};
use super::tags::CareerTag;
use crate::catalog::CatalogProvider;

/// Default number of careers shown on the results screen
pub const DEFAULT_TOP_N: usize = 5;

/// Errors from driving the quiz out of order
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuizError {
    /// An answer arrived while no question was on screen
    #[error("quiz is not waiting for an answer (state: {0:?})")]
    NotAnswering(QuizState),

    /// The option id does not belong to the current question
    #[error("question {question} has no option {option:?}")]
    UnknownOption {
        /// Current question id
        question: u32,
        /// Option id that was given
        option: String,
    },
}

/// Where the student is in the quiz
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QuizState {
    /// Intro screen, nothing answered
    NotStarted,
    /// Question at this index is on screen
    Answering(usize),
    /// All questions answered
    ShowingResults,
}

/// A ranked career match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// The matched career
    pub tag: CareerTag,
    /// How many chosen answers counted towards it
    pub frequency: usize,
}

/// Rank accumulated tags into recommendations
///
/// Counts every occurrence, orders by descending count with ties kept in
/// first-encounter order, keeps the first `top_n`, then drops tags the
/// `known` lookup does not contain. Truncation happens before filtering, so
/// fewer than `top_n` results can come back.
#[must_use]
pub fn rank_tags(
    accumulator: &[CareerTag],
    known: &HashSet<CareerTag>,
    top_n: usize,
) -> Vec<Recommendation> {
    let mut order: Vec<CareerTag> = Vec::new();
    let mut counts: HashMap<CareerTag, usize> = HashMap::new();
    for tag in accumulator {
        let count = counts.entry(*tag).or_insert(0);
        if *count == 0 {
            order.push(*tag);
        }
        *count += 1;
    }

    let mut ranked: Vec<Recommendation> = order
        .into_iter()
        .map(|tag| Recommendation {
            tag,
            frequency: counts[&tag],
        })
        .collect();
    // sort_by is stable: equal counts keep encounter order
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(top_n);
    ranked.retain(|r| known.contains(&r.tag));
    ranked
}

/// The quiz state machine
#[derive(Clone, Debug)]
pub struct QuizEngine {
    bank: QuestionBank,
    known: HashSet<CareerTag>,
    top_n: usize,
    state: QuizState,
    accumulator: Vec<CareerTag>,
    batches: Vec<Vec<CareerTag>>,
}

impl QuizEngine {
    /// Create an engine over `bank`, filtering results against the careers
    /// present in `catalog`
    #[must_use]
    pub fn new(bank: QuestionBank, catalog: &dyn CatalogProvider) -> Self {
        let unmatched = bank.unmatched_tags(catalog);
        if !unmatched.is_empty() {
            tracing::warn!(
                tags = ?unmatched,
                "Question bank uses careers missing from the catalog; they will never be recommended"
            );
        }
        let known = catalog.careers().iter().map(|c| c.tag).collect();
        Self::with_known(bank, known)
    }

    /// Create an engine with an explicit set of recommendable careers
    #[must_use]
    pub fn with_known(bank: QuestionBank, known: HashSet<CareerTag>) -> Self {
        Self {
            bank,
            known,
            top_n: DEFAULT_TOP_N,
            state: QuizState::NotStarted,
            accumulator: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// Change how many careers the results keep (minimum 1)
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Question currently on screen, if any
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::Answering(index) => self.bank.get(index),
            _ => None,
        }
    }

    /// All tags collected so far, in answer order
    #[must_use]
    pub fn accumulator(&self) -> &[CareerTag] {
        &self.accumulator
    }

    /// Number of questions answered
    #[must_use]
    pub fn answered(&self) -> usize {
        self.batches.len()
    }

    /// Number of questions in the bank
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    /// Leave the intro screen; no-op once started
    pub fn start(&mut self) {
        if self.state == QuizState::NotStarted {
            self.state = QuizState::Answering(0);
        }
    }

    /// Answer the current question with the option `option_id`
    ///
    /// # Errors
    ///
    /// Returns an error if no question is on screen or the option does not
    /// belong to it.
    pub fn advance(&mut self, option_id: &str) -> Result<QuizState, QuizError> {
        let question = self
            .current_question()
            .ok_or(QuizError::NotAnswering(self.state))?;
        let option = question
            .option(option_id)
            .ok_or_else(|| QuizError::UnknownOption {
                question: question.id,
                option: option_id.to_string(),
            })?;
        let tags = option.tags.clone();
        self.advance_tags(&tags)
    }

    /// Answer the current question with a raw tag list
    ///
    /// # Errors
    ///
    /// Returns an error if no question is on screen.
    pub fn advance_tags(&mut self, tags: &[CareerTag]) -> Result<QuizState, QuizError> {
        let QuizState::Answering(index) = self.state else {
            return Err(QuizError::NotAnswering(self.state));
        };

        self.accumulator.extend_from_slice(tags);
        self.batches.push(tags.to_vec());

        self.state = if index + 1 >= self.bank.len() {
            QuizState::ShowingResults
        } else {
            QuizState::Answering(index + 1)
        };
        debug!(
            question = index,
            added = tags.len(),
            total = self.accumulator.len(),
            state = ?self.state,
            "Quiz answer recorded"
        );
        Ok(self.state)
    }

    /// Undo the previous answer
    ///
    /// From `Answering(i)` with `i > 0` this returns to `Answering(i - 1)`;
    /// from `ShowingResults` it returns to the last question. Returns `false`
    /// when there is nothing to undo.
    pub fn go_back(&mut self) -> bool {
        let target = match self.state {
            QuizState::Answering(index) if index > 0 => index - 1,
            QuizState::ShowingResults if !self.batches.is_empty() => self.batches.len() - 1,
            _ => return false,
        };
        let Some(batch) = self.batches.pop() else {
            return false;
        };
        let keep = self.accumulator.len() - batch.len();
        self.accumulator.truncate(keep);
        self.state = QuizState::Answering(target);
        debug!(
            removed = batch.len(),
            total = self.accumulator.len(),
            state = ?self.state,
            "Quiz answer undone"
        );
        true
    }

    /// Clear every answer and return to the first question
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.batches.clear();
        self.state = QuizState::Answering(0);
    }

    /// Ranked careers for the answers given so far
    #[must_use]
    pub fn recommendations(&self) -> Vec<Recommendation> {
        rank_tags(&self.accumulator, &self.known, self.top_n)
    }

    /// Ranked careers, available once every question is answered
    #[must_use]
    pub fn results(&self) -> Option<Vec<Recommendation>> {
        (self.state == QuizState::ShowingResults).then(|| self.recommendations())
    }
}
