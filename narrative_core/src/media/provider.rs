//! External media collaborators: the generative provider and the audio output.

use async_trait::async_trait;
use std::sync::Arc;

use super::AudioBuffer;

/// Errors raised by a media provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Media provider is not configured")]
    NotConfigured,

    #[error("Media provider request failed: {0}")]
    Request(String),
}

/// Produces illustrations and narration from text.
///
/// Both calls may take arbitrarily long. `Ok(None)` (nothing produced) and
/// `Err(_)` are ordinary outcomes the caller recovers from.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Paint an illustration for the prompt.
    async fn synthesize_image(&self, prompt: &str) -> Result<Option<Vec<u8>>, ProviderError>;

    /// Speak the text as raw 16-bit PCM.
    async fn synthesize_speech(&self, text: &str) -> Result<Option<Vec<u8>>, ProviderError>;
}

/// Where decoded narration is played.
///
/// The orchestrator always calls [`stop`](AudioSink::stop) before
/// [`start`](AudioSink::start), so a sink only ever has one sound going.
pub trait AudioSink: Send + Sync {
    fn start(&self, buffer: Arc<AudioBuffer>);
    fn stop(&self);
}

/// A sink that discards audio, for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn start(&self, buffer: Arc<AudioBuffer>) {
        tracing::debug!(frames = buffer.frame_count(), "Discarding narration audio");
    }

    fn stop(&self) {}
}
