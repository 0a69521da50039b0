//! Story documents - loading graphs from TOML or JSON.

use serde::Deserialize;

use crate::{Choice, Hotspot, NodeId, QuizQuestion, StoryError, StoryGraph, StoryNode};

/// The story that ships with the crate.
const BUNDLED_STORY: &str = include_str!("../content/secrets_of_empires.toml");

/// On-disk shape of a story.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryDocument {
    pub start: NodeId,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// A node as written in a story document.
///
/// Documents may carry an explicit `terminal` flag; when present it has to
/// agree with the choice list.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub image_prompt: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default)]
    pub terminal: Option<bool>,
}

impl TryFrom<NodeRecord> for StoryNode {
    type Error = StoryError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        if let Some(declared) = record.terminal {
            if declared != record.choices.is_empty() {
                return Err(StoryError::TerminalMismatch {
                    node: record.id,
                    declared,
                    choices: record.choices.len(),
                });
            }
        }

        Ok(StoryNode {
            id: record.id,
            title: record.title,
            content: record.content,
            image_prompt: record.image_prompt,
            image_path: record.image_path,
            choices: record.choices,
            hotspots: record.hotspots,
        })
    }
}

impl StoryDocument {
    /// Validate the document and build the graph.
    pub fn into_graph(self) -> Result<StoryGraph, StoryError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(StoryNode::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        StoryGraph::new(self.start, nodes, self.questions)
    }
}

impl StoryGraph {
    /// Load a story from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, StoryError> {
        let document: StoryDocument = toml::from_str(source)?;
        document.into_graph()
    }

    /// Load a story from a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, StoryError> {
        let document: StoryDocument = serde_json::from_str(source)?;
        document.into_graph()
    }

    /// Load the bundled *Secrets of Empires* story.
    pub fn bundled() -> Result<Self, StoryError> {
        Self::from_toml_str(BUNDLED_STORY)
    }
}
