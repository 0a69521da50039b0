//! Narrative Engine - choice-driven traversal of the story graph.
//!
//! The engine owns the current-node pointer, the visit history and, once the
//! player reaches an ending and asks for it, the quiz. Every mutation goes
//! through [`NarrativeState::apply`], so the same transitions can be tested
//! without an engine.

mod state;

pub use state::*;

use std::sync::Arc;
use story_graph::{NodeId, StoryGraph, StoryNode};

use crate::quiz::QuizEngine;

/// Owns the narrative state for one playthrough.
#[derive(Debug, Clone)]
pub struct NarrativeEngine {
    graph: Arc<StoryGraph>,
    state: NarrativeState,
    /// Arena slot of `state.current`.
    slot: usize,
    quiz: Option<QuizEngine>,
}

impl NarrativeEngine {
    /// Start at the graph's start node.
    pub fn new(graph: Arc<StoryGraph>) -> Self {
        let state = NarrativeState::new(&graph);
        let slot = graph.start_slot();
        Self {
            graph,
            state,
            slot,
            quiz: None,
        }
    }

    fn apply(&mut self, event: NarrativeEvent) -> Result<(), NarrativeError> {
        let state = self.state.clone().apply(&self.graph, event)?;
        self.slot = self
            .graph
            .slot(state.current.as_str())
            .ok_or_else(|| NarrativeError::UnknownNode(state.current.clone()))?;
        self.state = state;
        Ok(())
    }

    /// The node the player is reading.
    pub fn current_node(&self) -> &StoryNode {
        self.graph.node_at(self.slot)
    }

    /// Follow a choice on the current node.
    pub fn choose(&mut self, choice_index: usize) -> Result<&StoryNode, NarrativeError> {
        self.apply(NarrativeEvent::Choose(choice_index))?;

        tracing::debug!(
            node = %self.state.current,
            depth = self.state.history.len(),
            "Advanced story"
        );
        Ok(self.current_node())
    }

    /// Leave a terminal node for the quiz.
    pub fn enter_quiz(&mut self) -> Result<&mut QuizEngine, NarrativeError> {
        self.apply(NarrativeEvent::EnterQuiz)?;

        tracing::debug!(ending = %self.state.current, "Entering quiz");
        Ok(self
            .quiz
            .insert(QuizEngine::new(Arc::clone(&self.graph))))
    }

    /// Back to the start node with an empty history and no quiz.
    pub fn restart(&mut self) -> Result<(), NarrativeError> {
        self.apply(NarrativeEvent::Restart)?;
        self.quiz = None;
        Ok(())
    }

    pub fn state(&self) -> &NarrativeState {
        &self.state
    }

    pub fn current_id(&self) -> &NodeId {
        &self.state.current
    }

    pub fn history(&self) -> &[NodeId] {
        &self.state.history
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn graph(&self) -> &Arc<StoryGraph> {
        &self.graph
    }

    /// The running quiz, if the player has entered it.
    pub fn quiz(&self) -> Option<&QuizEngine> {
        self.quiz.as_ref()
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizEngine> {
        self.quiz.as_mut()
    }

    /// Whether there is any progress to throw away.
    pub fn can_restart(&self) -> bool {
        !self.state.history.is_empty() || self.state.mode == Mode::Quiz
    }
}
