//! Session facade - one playthrough of the story with its media.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use story_graph::{StoryGraph, StoryNode};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::media::{
    AudioSink, ImageOutcome, MediaOrchestrator, MediaProvider, NarrationOutcome, NarrationStatus,
};
use crate::narrative::{Mode, NarrativeEngine, NarrativeError, NarrativeState};
use crate::quiz::{QuizEngine, QuizState, QuizSummary, RewardTier};

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The narrative engine and the media orchestrator, kept in step.
///
/// Every narrative transition re-activates the current node in the
/// orchestrator, so media requested for a node the player has left is
/// discarded when it arrives. The media futures own what they need, so the
/// player can keep moving while a request is outstanding.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    engine: NarrativeEngine,
    media: Arc<MediaOrchestrator>,
}

impl Session {
    pub fn new(
        graph: Arc<StoryGraph>,
        config: MediaConfig,
        provider: Arc<dyn MediaProvider>,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        Self::with_media(graph, MediaOrchestrator::new(config, provider, sink))
    }

    /// Start a session over an already configured orchestrator.
    pub fn with_media(graph: Arc<StoryGraph>, media: MediaOrchestrator) -> Self {
        let engine = NarrativeEngine::new(graph);
        media.activate(engine.current_id());

        let id = SessionId::new();
        tracing::info!(session = %id, start = %engine.current_id(), "Session started");
        Self {
            id,
            engine,
            media: Arc::new(media),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn engine(&self) -> &NarrativeEngine {
        &self.engine
    }

    pub fn media(&self) -> &MediaOrchestrator {
        &self.media
    }

    pub fn state(&self) -> &NarrativeState {
        self.engine.state()
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn current_node(&self) -> &StoryNode {
        self.engine.current_node()
    }

    pub fn quiz(&self) -> Option<&QuizEngine> {
        self.engine.quiz()
    }

    /// Follow a choice and make the new node the media target.
    pub fn choose(&mut self, choice_index: usize) -> Result<&StoryNode> {
        let node = self.engine.choose(choice_index)?;
        self.media.activate(&node.id);
        Ok(node)
    }

    /// Leave the ending for the quiz. Narration stops.
    pub fn enter_quiz(&mut self) -> Result<&QuizState> {
        let quiz = self.engine.enter_quiz()?;
        self.media.stop_narration();
        Ok(quiz.state())
    }

    pub fn select_option(&mut self, option: usize) -> Result<&QuizState> {
        Ok(self.quiz_mut()?.select_option(option)?)
    }

    pub fn advance(&mut self) -> Result<&QuizState> {
        Ok(self.quiz_mut()?.advance()?)
    }

    pub fn reward(&self) -> Result<RewardTier> {
        Ok(self.active_quiz()?.reward()?)
    }

    pub fn summary(&self) -> Result<QuizSummary> {
        Ok(self.active_quiz()?.summary()?)
    }

    /// Back to the start with a clean history, no quiz and an empty cache.
    pub fn restart(&mut self) -> Result<()> {
        self.engine.restart()?;
        self.media.reset();
        self.media.activate(self.engine.current_id());

        tracing::info!(session = %self.id, "Session restarted");
        Ok(())
    }

    /// Resolve the illustration for the current node.
    ///
    /// Comes back [`ImageOutcome::Stale`] if the player moves on first.
    pub fn illustrate(&self) -> impl Future<Output = ImageOutcome> + Send + 'static {
        let media = Arc::clone(&self.media);
        let node = self.engine.current_node().clone();
        async move { media.resolve_image(&node).await }
    }

    /// Narrate the current node.
    pub fn play_narration(
        &self,
    ) -> impl Future<Output = Result<NarrationOutcome>> + Send + 'static {
        let media = Arc::clone(&self.media);
        let node = self.engine.current_node().clone();
        async move { Ok(media.play_narration(&node).await?) }
    }

    pub fn toggle_narration(
        &self,
    ) -> impl Future<Output = Result<NarrationOutcome>> + Send + 'static {
        let media = Arc::clone(&self.media);
        let node = self.engine.current_node().clone();
        async move { Ok(media.toggle_narration(&node).await?) }
    }

    pub fn stop_narration(&self) -> bool {
        self.media.stop_narration()
    }

    pub fn narration_status(&self) -> NarrationStatus {
        self.media.narration_status()
    }

    fn active_quiz(&self) -> Result<&QuizEngine, NarrativeError> {
        self.engine.quiz().ok_or(NarrativeError::WrongMode {
            expected: Mode::Quiz,
            actual: self.engine.mode(),
        })
    }

    fn quiz_mut(&mut self) -> Result<&mut QuizEngine, NarrativeError> {
        let actual = self.engine.mode();
        self.engine.quiz_mut().ok_or(NarrativeError::WrongMode {
            expected: Mode::Quiz,
            actual,
        })
    }
}
