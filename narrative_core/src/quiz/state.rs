//! Quiz state machine.

use serde::{Deserialize, Serialize};
use story_graph::QuizQuestion;

/// Where the player is in the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizPhase {
    /// Waiting for an answer to question `index`.
    Answering { index: usize },
    /// Question `index` was answered with option `selected`; the explanation
    /// is showing.
    Reviewing { index: usize, selected: usize },
    /// Every question has been answered.
    Completed,
}

impl QuizPhase {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            QuizPhase::Answering { .. } => "answering",
            QuizPhase::Reviewing { .. } => "reviewing",
            QuizPhase::Completed => "completed",
        }
    }
}

/// User actions inside the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    SelectOption(usize),
    Advance,
}

/// Precondition violations on quiz transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Cannot {action} while the quiz is {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("Question {question} has {available} option(s), index {index} is out of range")]
    OptionOutOfRange {
        question: usize,
        index: usize,
        available: usize,
    },
}

/// Progress through the quiz.
///
/// The question index and score only move forward; a new quiz starts from a
/// new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizState {
    pub phase: QuizPhase,
    pub score: usize,
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizState {
    /// Start at the first question with nothing scored.
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Answering { index: 0 },
            score: 0,
        }
    }

    /// Apply an event against the question list, producing the next state.
    pub fn apply(self, questions: &[QuizQuestion], event: QuizEvent) -> Result<Self, QuizError> {
        match event {
            QuizEvent::SelectOption(option) => self.select(questions, option),
            QuizEvent::Advance => self.advance(questions),
        }
    }

    fn select(self, questions: &[QuizQuestion], option: usize) -> Result<Self, QuizError> {
        let index = match self.phase {
            QuizPhase::Answering { index } => index,
            // First answer is final.
            QuizPhase::Reviewing { .. } => return Ok(self),
            QuizPhase::Completed => {
                return Err(QuizError::WrongPhase {
                    action: "select an option",
                    phase: self.phase.name(),
                })
            }
        };

        let available = questions.get(index).map_or(0, |q| q.option_count());
        if option >= available {
            return Err(QuizError::OptionOutOfRange {
                question: index,
                index: option,
                available,
            });
        }

        let correct = questions[index].is_correct(option);
        Ok(Self {
            phase: QuizPhase::Reviewing {
                index,
                selected: option,
            },
            score: if correct { self.score + 1 } else { self.score },
        })
    }

    fn advance(self, questions: &[QuizQuestion]) -> Result<Self, QuizError> {
        let QuizPhase::Reviewing { index, .. } = self.phase else {
            return Err(QuizError::WrongPhase {
                action: "advance",
                phase: self.phase.name(),
            });
        };

        let phase = if index + 1 < questions.len() {
            QuizPhase::Answering { index: index + 1 }
        } else {
            QuizPhase::Completed
        };

        Ok(Self { phase, ..self })
    }

    /// Index of the question on screen, `None` once completed.
    pub fn question_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Answering { index } | QuizPhase::Reviewing { index, .. } => Some(index),
            QuizPhase::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == QuizPhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::new("q1", "One?")
                .with_options(["a", "b", "c"])
                .with_correct_answer(1),
            QuizQuestion::new("q2", "Two?")
                .with_options(["a", "b"])
                .with_correct_answer(0),
        ]
    }

    #[test]
    fn test_correct_answer_scores() {
        let qs = questions();
        let state = QuizState::new().apply(&qs, QuizEvent::SelectOption(1)).unwrap();

        assert_eq!(state.score, 1);
        assert_eq!(state.phase, QuizPhase::Reviewing { index: 0, selected: 1 });
    }

    #[test]
    fn test_wrong_answer_does_not_score() {
        let qs = questions();
        let state = QuizState::new().apply(&qs, QuizEvent::SelectOption(2)).unwrap();

        assert_eq!(state.score, 0);
        assert_eq!(state.phase, QuizPhase::Reviewing { index: 0, selected: 2 });
    }

    #[test]
    fn test_second_selection_is_ignored() {
        let qs = questions();
        let first = QuizState::new().apply(&qs, QuizEvent::SelectOption(0)).unwrap();
        let second = first.apply(&qs, QuizEvent::SelectOption(1)).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.score, 0);
    }

    #[test]
    fn test_option_out_of_range() {
        let qs = questions();
        let err = QuizState::new().apply(&qs, QuizEvent::SelectOption(3)).unwrap_err();

        assert_eq!(
            err,
            QuizError::OptionOutOfRange {
                question: 0,
                index: 3,
                available: 3,
            }
        );
    }

    #[test]
    fn test_advance_requires_answer() {
        let qs = questions();
        let err = QuizState::new().apply(&qs, QuizEvent::Advance).unwrap_err();
        assert!(matches!(err, QuizError::WrongPhase { phase: "answering", .. }));
    }

    #[test]
    fn test_full_run_completes() {
        let qs = questions();
        let state = QuizState::new()
            .apply(&qs, QuizEvent::SelectOption(1))
            .unwrap()
            .apply(&qs, QuizEvent::Advance)
            .unwrap();

        assert_eq!(state.phase, QuizPhase::Answering { index: 1 });
        assert_eq!(state.question_index(), Some(1));

        let state = state
            .apply(&qs, QuizEvent::SelectOption(0))
            .unwrap()
            .apply(&qs, QuizEvent::Advance)
            .unwrap();

        assert!(state.is_completed());
        assert_eq!(state.score, 2);
        assert_eq!(state.question_index(), None);

        let err = state.apply(&qs, QuizEvent::SelectOption(0)).unwrap_err();
        assert!(matches!(err, QuizError::WrongPhase { phase: "completed", .. }));
        let err = state.apply(&qs, QuizEvent::Advance).unwrap_err();
        assert!(matches!(err, QuizError::WrongPhase { .. }));
    }
}
