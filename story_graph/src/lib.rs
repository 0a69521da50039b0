//! # Story Graph
//!
//! The immutable story content for *Secrets of Empires*: narrative nodes, the
//! choices linking them, illustration hotspots and the comprehension quiz.
//! This crate only holds data and its load-time validation; traversal lives in
//! `narrative_core`.
//!
//! ## Loading
//!
//! Every graph is built through the same validated path, whether it comes from
//! a TOML or JSON document or from the bundled story. A graph that exists is a
//! graph whose choices all resolve and whose quiz answers all index into their
//! options.

pub mod error;
pub mod graph;
pub mod ids;
pub mod loader;
pub mod node;
pub mod quiz;

pub use error::*;
pub use graph::*;
pub use ids::*;
pub use loader::*;
pub use node::*;
pub use quiz::*;
