//! Crate-wide error type.

use story_graph::StoryError;

use crate::config::ConfigError;
use crate::media::{DecodeError, NarrationError, ProviderError, StoreError};
use crate::narrative::NarrativeError;
use crate::quiz::QuizError;

/// Any error surfaced by the narrative core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Story(#[from] StoryError),

    #[error(transparent)]
    Narrative(#[from] NarrativeError),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Narration(#[from] NarrationError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
