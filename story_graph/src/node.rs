//! Story node definitions - the beats of the narrative graph.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// A labeled edge from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next_node_id: NodeId,
}

impl Choice {
    pub fn new(text: impl Into<String>, next_node_id: impl Into<NodeId>) -> Self {
        Self {
            text: text.into(),
            next_node_id: next_node_id.into(),
        }
    }
}

/// A clickable region over a node's illustration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    /// Horizontal position, percent of image width (0-100).
    pub x: f32,
    /// Vertical position, percent of image height (0-100).
    pub y: f32,
    pub label: String,
    pub description: String,
}

impl Hotspot {
    pub fn new(
        id: impl Into<String>,
        x: f32,
        y: f32,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            label: label.into(),
            description: description.into(),
        }
    }

    /// Check that both coordinates lie in the normalized 0-100 range.
    pub fn in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// One narrative beat.
///
/// A node is terminal iff it has no choices; there is no separate flag to keep
/// in sync once the node has been loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: NodeId,
    pub title: String,

    /// Narrative text. Paragraphs are separated by newlines.
    pub content: String,

    /// Prompt handed to the media provider to paint this scene.
    pub image_prompt: String,

    /// Pre-rendered illustration shipped with the story, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

impl StoryNode {
    /// Create a terminal node with empty text.
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            image_prompt: String::new(),
            image_path: None,
            choices: Vec::new(),
            hotspots: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = prompt.into();
        self
    }

    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn with_choice(mut self, text: impl Into<String>, next: impl Into<NodeId>) -> Self {
        self.choices.push(Choice::new(text, next));
        self
    }

    pub fn with_hotspot(mut self, hotspot: Hotspot) -> Self {
        self.hotspots.push(hotspot);
        self
    }

    /// Whether this node ends the current playthrough branch.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }

    /// The narrative text split into non-blank paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    /// Get a choice by index.
    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    /// Find a hotspot by id.
    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }
}
