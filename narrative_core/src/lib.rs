//! # Narrative Core
//!
//! The runtime of the interactive history story. This crate walks the
//! `story_graph`, scores the comprehension quiz that follows an ending, and
//! resolves an illustration and a narration for whichever node is on screen.
//!
//! ## Core Components
//!
//! - **narrative**: Choice-driven traversal with visit history
//! - **quiz**: Question phases, scoring and reward tiers
//! - **media**: PCM decoding, per-session cache, provider seams and the orchestrator
//! - **session**: One playthrough, keeping the engines and media in step
//!
//! ## Design Philosophy
//!
//! - **Explicit State**: Every transition is a pure `apply(state, event)`
//! - **Stale Means Dropped**: Async media is tagged with the node it was asked for and discarded if the player moved on
//! - **Degrade, Don't Fail**: A missing picture or voice never stops the story

pub mod config;
pub mod error;
pub mod media;
pub mod narrative;
pub mod quiz;
pub mod session;

pub use config::*;
pub use error::{Error, Result};
pub use media::*;
pub use narrative::*;
pub use quiz::*;
pub use session::*;
