//! Narrative state and its pure transition function.

use serde::{Deserialize, Serialize};
use story_graph::{NodeId, StoryGraph, StoryNode};

/// Which part of the session the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Story,
    Quiz,
}

/// User actions that move the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeEvent {
    /// Follow the choice at this index on the current node.
    Choose(usize),
    /// Leave a terminal node for the quiz.
    EnterQuiz,
    /// Back to the start node with a clean history.
    Restart,
}

/// Precondition violations on narrative transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarrativeError {
    #[error("Node '{node}' has {available} choice(s), index {index} is out of range")]
    ChoiceOutOfRange {
        node: NodeId,
        index: usize,
        available: usize,
    },

    #[error("Node '{0}' is terminal and has no choices")]
    TerminalNode(NodeId),

    #[error("Node '{0}' is not terminal, the quiz is not available yet")]
    NotTerminal(NodeId),

    #[error("Operation requires {expected:?} mode but the session is in {actual:?} mode")]
    WrongMode { expected: Mode, actual: Mode },

    #[error("Node '{0}' does not exist in this story")]
    UnknownNode(NodeId),
}

/// Where the player is in the story and how they got there.
///
/// A state built by [`NarrativeState::new`] and moved only by
/// [`NarrativeState::apply`] always names a node of its graph. Transitions
/// on a state whose `current` is not in the graph fail with
/// [`NarrativeError::UnknownNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeState {
    pub current: NodeId,
    /// Previously visited nodes, oldest first.
    pub history: Vec<NodeId>,
    pub mode: Mode,
}

impl NarrativeState {
    /// Fresh state at the start of the graph.
    pub fn new(graph: &StoryGraph) -> Self {
        Self {
            current: graph.start_id().clone(),
            history: Vec::new(),
            mode: Mode::Story,
        }
    }

    /// Apply an event, producing the next state.
    pub fn apply(self, graph: &StoryGraph, event: NarrativeEvent) -> Result<Self, NarrativeError> {
        match event {
            NarrativeEvent::Choose(index) => self.choose(graph, index),
            NarrativeEvent::EnterQuiz => self.enter_quiz(graph),
            NarrativeEvent::Restart => Ok(Self::new(graph)),
        }
    }

    fn choose(mut self, graph: &StoryGraph, index: usize) -> Result<Self, NarrativeError> {
        self.expect_mode(Mode::Story)?;

        let node = resolve(graph, &self.current)?;
        if node.is_terminal() {
            return Err(NarrativeError::TerminalNode(self.current));
        }

        let next = node
            .choice(index)
            .map(|choice| choice.next_node_id.clone())
            .ok_or_else(|| NarrativeError::ChoiceOutOfRange {
                node: self.current.clone(),
                index,
                available: node.choices.len(),
            })?;

        let previous = std::mem::replace(&mut self.current, next);
        self.history.push(previous);
        Ok(self)
    }

    fn enter_quiz(mut self, graph: &StoryGraph) -> Result<Self, NarrativeError> {
        self.expect_mode(Mode::Story)?;

        if !resolve(graph, &self.current)?.is_terminal() {
            return Err(NarrativeError::NotTerminal(self.current));
        }

        self.mode = Mode::Quiz;
        Ok(self)
    }

    fn expect_mode(&self, expected: Mode) -> Result<(), NarrativeError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(NarrativeError::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }
}

fn resolve<'g>(graph: &'g StoryGraph, id: &NodeId) -> Result<&'g StoryNode, NarrativeError> {
    graph
        .node(id.as_str())
        .ok_or_else(|| NarrativeError::UnknownNode(id.clone()))
}
