//! Media pipeline: illustrations and narration for story nodes.
//!
//! - `audio`: PCM16 decoding
//! - `cache`: write-once per-session media cache
//! - `provider`: the generative provider and audio sink seams
//! - `orchestrator`: ties them together per active node

mod audio;
mod cache;
mod orchestrator;
mod provider;

pub use audio::*;
pub use cache::*;
pub use orchestrator::*;
pub use provider::*;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
