//! Comprehension quiz questions.

use serde::{Deserialize, Serialize};

use crate::QuestionId;

/// A multiple-choice question asked after the story ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer.
    pub correct_answer: usize,
    /// Shown once the question has been answered.
    pub explanation: String,
}

impl QuizQuestion {
    pub fn new(id: impl Into<QuestionId>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options: Vec::new(),
            correct_answer: 0,
            explanation: String::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_correct_answer(mut self, index: usize) -> Self {
        self.correct_answer = index;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_builder() {
        let q = QuizQuestion::new("q1", "What is a cipher?")
            .with_options(["A steam engine", "A secret code"])
            .with_correct_answer(1)
            .with_explanation("Ciphers hide messages.");

        assert_eq!(q.option_count(), 2);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }
}
