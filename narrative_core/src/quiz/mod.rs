//! Quiz Engine - scores the comprehension quiz that follows the story.
//!
//! The engine moves through three phases per run:
//! 1. **Answering**: a question is on screen, waiting for a choice
//! 2. **Reviewing**: the choice is locked in and the explanation is showing
//! 3. **Completed**: every question is done and a reward tier can be read

mod reward;
mod state;

pub use reward::*;
pub use state::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use story_graph::{QuizQuestion, StoryGraph};

/// What the player sees after locking in an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback<'a> {
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: &'a str,
}

/// Final results of a completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub tier: RewardTier,
    pub perfect: bool,
}

/// Drives a [`QuizState`] over the graph's question list.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    graph: Arc<StoryGraph>,
    state: QuizState,
}

impl QuizEngine {
    pub fn new(graph: Arc<StoryGraph>) -> Self {
        Self {
            graph,
            state: QuizState::new(),
        }
    }

    fn questions(&self) -> &[QuizQuestion] {
        self.graph.questions()
    }

    fn apply(&mut self, event: QuizEvent) -> Result<&QuizState, QuizError> {
        self.state = self.state.apply(self.graph.questions(), event)?;
        Ok(&self.state)
    }

    /// Lock in an answer for the current question.
    ///
    /// Calling this again before advancing leaves the first answer in place.
    pub fn select_option(&mut self, option: usize) -> Result<&QuizState, QuizError> {
        let before = self.state;
        let after = *self.apply(QuizEvent::SelectOption(option))?;

        if before != after {
            tracing::debug!(
                option,
                score = after.score,
                correct = after.score > before.score,
                "Quiz answer recorded"
            );
        }
        Ok(&self.state)
    }

    /// Move past the explanation to the next question, or finish.
    pub fn advance(&mut self) -> Result<&QuizState, QuizError> {
        self.apply(QuizEvent::Advance)?;

        if self.state.is_completed() {
            tracing::info!(
                score = self.state.score,
                total = self.total(),
                "Quiz completed"
            );
        }
        Ok(&self.state)
    }

    /// The reward tier for a completed quiz.
    pub fn reward(&self) -> Result<RewardTier, QuizError> {
        if !self.state.is_completed() {
            return Err(QuizError::WrongPhase {
                action: "compute a reward",
                phase: self.state.phase.name(),
            });
        }

        Ok(RewardTier::for_score(self.state.score, self.total()))
    }

    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        let tier = self.reward()?;
        Ok(QuizSummary {
            score: self.state.score,
            total: self.total(),
            tier,
            perfect: self.state.score == self.total(),
        })
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn score(&self) -> usize {
        self.state.score
    }

    pub fn total(&self) -> usize {
        self.questions().len()
    }

    /// The question on screen, `None` once completed.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.state
            .question_index()
            .and_then(|index| self.questions().get(index))
    }

    /// Feedback for the locked-in answer while reviewing.
    pub fn answer_feedback(&self) -> Option<AnswerFeedback<'_>> {
        let QuizPhase::Reviewing { index, selected } = self.state.phase else {
            return None;
        };
        let question = self.questions().get(index)?;

        Some(AnswerFeedback {
            selected,
            correct_index: question.correct_answer,
            is_correct: question.is_correct(selected),
            explanation: &question.explanation,
        })
    }

    /// Zero-based position and question count.
    pub fn progress(&self) -> (usize, usize) {
        let index = self.state.question_index().unwrap_or(self.total());
        (index, self.total())
    }

    pub fn has_next_question(&self) -> bool {
        self.state
            .question_index()
            .is_some_and(|index| index + 1 < self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> QuizEngine {
        QuizEngine::new(Arc::new(StoryGraph::bundled().unwrap()))
    }

    /// Answer every question, getting the first `correct` of them right.
    fn run(engine: &mut QuizEngine, correct: usize) {
        for i in 0..engine.total() {
            let question = engine.current_question().unwrap().clone();
            let option = if i < correct {
                question.correct_answer
            } else {
                (question.correct_answer + 1) % question.option_count()
            };
            engine.select_option(option).unwrap();
            engine.advance().unwrap();
        }
    }

    #[test]
    fn test_reward_mapping_over_bundled_quiz() {
        let expected = [
            (4, RewardTier::Gold),
            (3, RewardTier::Silver),
            (2, RewardTier::Bronze),
            (1, RewardTier::Participation),
            (0, RewardTier::Participation),
        ];

        for (correct, tier) in expected {
            let mut quiz = engine();
            run(&mut quiz, correct);
            assert_eq!(quiz.score(), correct);
            assert_eq!(quiz.reward().unwrap(), tier);
        }
    }

    #[test]
    fn test_reward_requires_completion() {
        let mut quiz = engine();
        assert!(quiz.reward().is_err());

        quiz.select_option(0).unwrap();
        assert!(matches!(
            quiz.reward(),
            Err(QuizError::WrongPhase { phase: "reviewing", .. })
        ));
    }

    #[test]
    fn test_answer_feedback() {
        let mut quiz = engine();
        assert!(quiz.answer_feedback().is_none());

        // q1: the East India Company is option 1
        quiz.select_option(0).unwrap();
        let feedback = quiz.answer_feedback().unwrap();

        assert_eq!(feedback.selected, 0);
        assert_eq!(feedback.correct_index, 1);
        assert!(!feedback.is_correct);
        assert!(feedback.explanation.contains("East India Company"));
    }

    #[test]
    fn test_selection_cannot_be_changed() {
        let mut quiz = engine();
        quiz.select_option(0).unwrap();
        quiz.select_option(1).unwrap();

        assert_eq!(quiz.score(), 0);
        assert_eq!(
            quiz.state().phase,
            QuizPhase::Reviewing { index: 0, selected: 0 }
        );
    }

    #[test]
    fn test_progress_and_summary() {
        let mut quiz = engine();
        assert_eq!(quiz.progress(), (0, 4));
        assert!(quiz.has_next_question());

        run(&mut quiz, 4);

        assert_eq!(quiz.progress(), (4, 4));
        assert!(!quiz.has_next_question());

        let summary = quiz.summary().unwrap();
        assert_eq!(summary.score, 4);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.tier, RewardTier::Gold);
        assert!(summary.perfect);
    }
}
