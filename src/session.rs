use std::collections::HashSet;

use thiserror::Error;

use crate::quiz::QuizQuestion;

/// Rejected session transitions. These are user-facing conditions, not bugs:
/// a UI surfaces the message and leaves the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no quiz is in progress")]
    NotInProgress,
    #[error("select an answer first")]
    NothingSelected,
    #[error("this question was already submitted")]
    AlreadySubmitted,
    #[error("submit an answer before moving on")]
    NotSubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress { index: usize },
    Completed,
}

/// Client-held quiz progress: one pointer walking an immutable question
/// list, one locked-in answer per question, a running score.
///
/// Every mutation is an explicit user-triggered transition; a rejected
/// transition changes nothing. `correct_answer` is only ever compared by
/// equality, so an out-of-range index from the model is simply never
/// matchable.
#[derive(Debug, Default)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    selected: Vec<Option<usize>>,
    submitted: HashSet<usize>,
    score: usize,
    completed: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh run over `questions`, replacing any prior session.
    /// An empty list leaves the session in `NotStarted`.
    pub fn begin(&mut self, questions: Vec<QuizQuestion>) {
        self.selected = vec![None; questions.len()];
        self.questions = questions;
        self.current = 0;
        self.submitted = HashSet::new();
        self.score = 0;
        self.completed = false;
    }

    /// Discards questions, answers, and score.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Picks (or re-picks) an option for the current question. Locked once
    /// the question is submitted.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), SessionError> {
        self.require_in_progress()?;
        if self.submitted.contains(&self.current) {
            return Err(SessionError::AlreadySubmitted);
        }
        self.selected[self.current] = Some(option_index);
        Ok(())
    }

    /// Locks in the current selection and scores it. Returns whether the
    /// submission was correct.
    pub fn submit_answer(&mut self) -> Result<bool, SessionError> {
        self.require_in_progress()?;
        if self.submitted.contains(&self.current) {
            return Err(SessionError::AlreadySubmitted);
        }
        let Some(selection) = self.selected[self.current] else {
            return Err(SessionError::NothingSelected);
        };

        self.submitted.insert(self.current);
        let correct = selection == self.questions[self.current].correct_answer;
        if correct {
            self.score += 1;
        }
        Ok(correct)
    }

    /// Moves to the next question, or completes the session when the
    /// current question is the last one. Requires the current question to
    /// have been submitted.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.require_in_progress()?;
        if !self.submitted.contains(&self.current) {
            return Err(SessionError::NotSubmitted);
        }
        if self.current + 1 == self.questions.len() {
            self.completed = true;
        } else {
            self.current += 1;
        }
        Ok(())
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::InProgress { .. } => Ok(()),
            _ => Err(SessionError::NotInProgress),
        }
    }

    // ── Read-only views ──

    pub fn state(&self) -> SessionState {
        if self.questions.is_empty() {
            SessionState::NotStarted
        } else if self.completed {
            SessionState::Completed
        } else {
            SessionState::InProgress {
                index: self.current,
            }
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Selection for the current question, if any.
    pub fn selected_answer(&self) -> Option<usize> {
        self.selected.get(self.current).copied().flatten()
    }

    pub fn is_current_submitted(&self) -> bool {
        self.submitted.contains(&self.current)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
