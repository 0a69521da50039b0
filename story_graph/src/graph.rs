//! Story Graph - the validated, immutable arena of narrative nodes.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{NodeId, QuizQuestion, StoryError, StoryNode};

/// The directed graph of story nodes plus the quiz that follows it.
///
/// Nodes live in a flat arena and are addressed by id through an index map.
/// The only way to obtain a graph is through [`StoryGraph::new`] (or the
/// loaders built on it), which enforces referential integrity, so every
/// choice target and the start id are guaranteed to resolve.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    nodes: Vec<StoryNode>,
    index: HashMap<NodeId, usize>,
    start: usize,
    questions: Vec<QuizQuestion>,
}

impl StoryGraph {
    /// Build and validate a graph.
    pub fn new(
        start: impl Into<NodeId>,
        nodes: Vec<StoryNode>,
        questions: Vec<QuizQuestion>,
    ) -> Result<Self, StoryError> {
        let start = start.into();

        if nodes.is_empty() {
            return Err(StoryError::EmptyStory);
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), slot).is_some() {
                return Err(StoryError::DuplicateNode(node.id.clone()));
            }
        }

        let start = *index
            .get(&start)
            .ok_or_else(|| StoryError::MissingStart(start.clone()))?;

        for node in &nodes {
            for (choice, edge) in node.choices.iter().enumerate() {
                if !index.contains_key(&edge.next_node_id) {
                    return Err(StoryError::DanglingChoice {
                        node: node.id.clone(),
                        choice,
                        target: edge.next_node_id.clone(),
                    });
                }
            }

            if let Some(hotspot) = node.hotspots.iter().find(|h| !h.in_bounds()) {
                return Err(StoryError::HotspotOutOfBounds {
                    node: node.id.clone(),
                    hotspot: hotspot.id.clone(),
                });
            }
        }

        validate_questions(&questions)?;

        let graph = Self {
            nodes,
            index,
            start,
            questions,
        };

        for id in graph.unreachable_nodes() {
            tracing::warn!(node = %id, "Story node is unreachable from the start node");
        }

        tracing::debug!(
            nodes = graph.node_count(),
            questions = graph.questions.len(),
            "Loaded story graph"
        );

        Ok(graph)
    }

    /// Get a node by id.
    pub fn node(&self, id: &str) -> Option<&StoryNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    /// Check if a node exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Arena slot of a node, stable for the lifetime of the graph.
    pub fn slot(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn start_slot(&self) -> usize {
        self.start
    }

    /// Node at an arena slot.
    ///
    /// # Panics
    ///
    /// If `slot` was not obtained from this graph.
    pub fn node_at(&self, slot: usize) -> &StoryNode {
        &self.nodes[slot]
    }

    pub fn start_id(&self) -> &NodeId {
        &self.nodes[self.start].id
    }

    pub fn start_node(&self) -> &StoryNode {
        &self.nodes[self.start]
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Quiz questions in the order they are asked.
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// All terminal nodes in document order.
    pub fn endings(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.iter().filter(|n| n.is_terminal())
    }

    /// Nodes that no sequence of choices from the start node can reach.
    pub fn unreachable_nodes(&self) -> Vec<&NodeId> {
        let mut seen = HashSet::from([self.start]);
        let mut queue = VecDeque::from([self.start]);

        while let Some(slot) = queue.pop_front() {
            for choice in &self.nodes[slot].choices {
                if let Some(&next) = self.index.get(&choice.next_node_id) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        self.nodes
            .iter()
            .enumerate()
            .filter(|(slot, _)| !seen.contains(slot))
            .map(|(_, node)| &node.id)
            .collect()
    }
}

fn validate_questions(questions: &[QuizQuestion]) -> Result<(), StoryError> {
    if questions.is_empty() {
        return Err(StoryError::NoQuestions);
    }

    let mut ids = HashSet::new();
    for q in questions {
        if !ids.insert(&q.id) {
            return Err(StoryError::DuplicateQuestion(q.id.clone()));
        }
        if q.options.len() < 2 {
            return Err(StoryError::TooFewOptions(q.id.clone()));
        }
        if q.correct_answer >= q.options.len() {
            return Err(StoryError::CorrectAnswerOutOfRange {
                question: q.id.clone(),
                index: q.correct_answer,
                options: q.options.len(),
            });
        }
    }

    Ok(())
}
