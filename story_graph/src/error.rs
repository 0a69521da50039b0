//! Load-time integrity errors.

use crate::{NodeId, QuestionId};

/// Errors raised while loading or validating story content.
///
/// All of these are fatal: a story that fails validation never produces a
/// [`StoryGraph`](crate::StoryGraph).
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Failed to parse story TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse story JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Story contains no nodes")]
    EmptyStory,

    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("Start node '{0}' does not exist")]
    MissingStart(NodeId),

    #[error("Choice {choice} of node '{node}' points at unknown node '{target}'")]
    DanglingChoice {
        node: NodeId,
        choice: usize,
        target: NodeId,
    },

    #[error("Node '{node}' declares terminal = {declared} but has {choices} choice(s)")]
    TerminalMismatch {
        node: NodeId,
        declared: bool,
        choices: usize,
    },

    #[error("Hotspot '{hotspot}' of node '{node}' lies outside the 0-100 range")]
    HotspotOutOfBounds { node: NodeId, hotspot: String },

    #[error("Story has no quiz questions")]
    NoQuestions,

    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("Question '{0}' needs at least two options")]
    TooFewOptions(QuestionId),

    #[error("Question '{question}' marks option {index} correct but only has {options}")]
    CorrectAnswerOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },
}
