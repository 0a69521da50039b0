//! Media Orchestrator - resolves a node's illustration and narration.
//!
//! Resolution goes cache first, then the provider. Three rules shape it:
//! 1. **Single flight**: one provider call per (node, kind) at a time; later
//!    requests join the outstanding one
//! 2. **Generations**: every request is tagged with the active node's
//!    generation and its result is dropped if the tag no longer matches
//! 3. **Exclusive playback**: the sink is stopped before any narration starts
//!
//! The sink is only ever called with the state lock released, so a sink may
//! report [`MediaOrchestrator::playback_finished`] from inside `stop`.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use story_graph::{NodeId, StoryNode};

use super::{
    decode_pcm16, lock, AudioBuffer, AudioSink, DecodeError, MediaCache, MediaKey, MediaProvider,
    Payload, ProviderError,
};
use crate::config::MediaConfig;

type SharedFetch = Shared<BoxFuture<'static, Option<Payload>>>;
type ProviderCall = BoxFuture<'static, Result<Option<Vec<u8>>, ProviderError>>;

/// Where an illustration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Painted by the provider.
    Generated(Payload),
    /// The node's bundled image.
    Static(String),
    /// Synthesis failed.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illustration {
    pub node: NodeId,
    pub source: ImageSource,
    pub from_cache: bool,
}

/// Result of resolving an illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Ready(Illustration),
    /// The node stopped being active while the request was outstanding.
    Stale,
}

/// Result of a narration request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationOutcome {
    Playing { node: NodeId, duration: Duration },
    Stopped,
    /// The node changed or narration was stopped while loading.
    Stale,
}

/// Why narration could not be played this time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarrationError {
    #[error("Narration unavailable for node '{0}'")]
    Unavailable(NodeId),

    #[error("Narration payload is malformed: {0}")]
    Decode(#[from] DecodeError),
}

/// What the narration control should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    /// The last attempt failed; a new attempt may succeed.
    Unavailable,
}

struct Pending {
    ticket: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct ActiveState {
    node: Option<NodeId>,
    /// Bumped whenever the active node changes.
    generation: u64,
    /// Bumped on node change and on explicit stop.
    narration: u64,
    status: NarrationStatus,
    /// Decoded narration of the active node.
    decoded: Option<Arc<AudioBuffer>>,
}

impl ActiveState {
    fn is_active(&self, node: &NodeId) -> bool {
        self.node.as_ref() == Some(node)
    }

    /// Whether a narration request issued under `ticket` may still play.
    fn is_current(&self, node: &NodeId, ticket: u64) -> bool {
        self.narration == ticket && self.is_active(node)
    }
}

/// Per-session controller for illustrations and narration.
pub struct MediaOrchestrator {
    config: MediaConfig,
    provider: Arc<dyn MediaProvider>,
    sink: Arc<dyn AudioSink>,
    cache: Arc<MediaCache>,
    pending: Arc<Mutex<HashMap<MediaKey, Pending>>>,
    tickets: AtomicU64,
    active: Mutex<ActiveState>,
    /// Serializes calls into the sink. Taken before `active`, never after.
    playback: Mutex<()>,
}

impl std::fmt::Debug for MediaOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaOrchestrator")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl MediaOrchestrator {
    /// Create an orchestrator backed by an in-memory session store.
    pub fn new(
        config: MediaConfig,
        provider: Arc<dyn MediaProvider>,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        let cache = MediaCache::in_memory(config.cache_capacity_bytes);
        Self::with_cache(config, provider, sink, cache)
    }

    pub fn with_cache(
        config: MediaConfig,
        provider: Arc<dyn MediaProvider>,
        sink: Arc<dyn AudioSink>,
        cache: MediaCache,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
            cache: Arc::new(cache),
            pending: Arc::new(Mutex::new(HashMap::new())),
            tickets: AtomicU64::new(0),
            active: Mutex::new(ActiveState::default()),
            playback: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    /// Make `node` the node on screen.
    ///
    /// Outstanding requests for the previous node will come back stale and
    /// any narration stops.
    pub fn activate(&self, node: &NodeId) {
        let _playback = lock(&self.playback);
        {
            let mut active = lock(&self.active);
            active.node = Some(node.clone());
            active.generation += 1;
            active.narration += 1;
            active.status = NarrationStatus::Idle;
            active.decoded = None;

            tracing::debug!(node = %node, generation = active.generation, "Activated media node");
        }
        self.sink.stop();
    }

    /// Forget everything cached for this session.
    pub fn reset(&self) {
        self.cache.clear();
        lock(&self.pending).clear();

        let _playback = lock(&self.playback);
        {
            let mut active = lock(&self.active);
            active.node = None;
            active.generation += 1;
            active.narration += 1;
            active.status = NarrationStatus::Idle;
            active.decoded = None;
        }
        self.sink.stop();
    }

    /// Resolve the illustration for an active node.
    pub async fn resolve_image(&self, node: &StoryNode) -> ImageOutcome {
        let Some(generation) = self.generation_for(&node.id) else {
            return ImageOutcome::Stale;
        };

        if self.config.prefer_static_images {
            if let Some(path) = &node.image_path {
                return ImageOutcome::Ready(Illustration {
                    node: node.id.clone(),
                    source: ImageSource::Static(path.clone()),
                    from_cache: false,
                });
            }
        }

        let key = MediaKey::image(node.id.clone());
        if let Some(payload) = self.cache.get(&key) {
            return ImageOutcome::Ready(Illustration {
                node: node.id.clone(),
                source: ImageSource::Generated(payload),
                from_cache: true,
            });
        }

        let prompt = self.config.image_prompt(&node.image_prompt);
        let provider = Arc::clone(&self.provider);
        let payload = self
            .fetch(key, move || {
                async move { provider.synthesize_image(&prompt).await }.boxed()
            })
            .await;

        if !self.still_active(&node.id, generation) {
            tracing::debug!(node = %node.id, "Discarding stale illustration");
            return ImageOutcome::Stale;
        }

        let source = match payload {
            Some(payload) => ImageSource::Generated(payload),
            None => ImageSource::Placeholder(self.config.placeholder_image.clone()),
        };

        ImageOutcome::Ready(Illustration {
            node: node.id.clone(),
            source,
            from_cache: false,
        })
    }

    /// Synthesize (or reuse) the node's narration and play it.
    pub async fn play_narration(
        &self,
        node: &StoryNode,
    ) -> Result<NarrationOutcome, NarrationError> {
        let (ticket, decoded) = {
            let mut active = lock(&self.active);
            if !active.is_active(&node.id) {
                return Ok(NarrationOutcome::Stale);
            }
            let decoded = active.decoded.clone();
            if decoded.is_none() {
                active.status = NarrationStatus::Loading;
            }
            (active.narration, decoded)
        };

        if let Some(buffer) = decoded {
            return Ok(self.start_playback(&node.id, ticket, buffer));
        }

        let key = MediaKey::audio(node.id.clone());
        let payload = match self.cache.get(&key) {
            Some(payload) => Some(payload),
            None => {
                let text = node.content.clone();
                let provider = Arc::clone(&self.provider);
                self.fetch(key, move || {
                    async move { provider.synthesize_speech(&text).await }.boxed()
                })
                .await
            }
        };

        let buffer = {
            let mut active = lock(&self.active);
            if !active.is_current(&node.id, ticket) {
                tracing::debug!(node = %node.id, "Discarding stale narration");
                return Ok(NarrationOutcome::Stale);
            }

            let Some(payload) = payload else {
                active.status = NarrationStatus::Unavailable;
                return Err(NarrationError::Unavailable(node.id.clone()));
            };

            match decode_pcm16(&payload, self.config.audio_format) {
                Ok(buffer) => {
                    let buffer = Arc::new(buffer);
                    active.decoded = Some(Arc::clone(&buffer));
                    buffer
                }
                Err(e) => {
                    tracing::warn!(node = %node.id, error = %e, "Failed to decode narration");
                    active.status = NarrationStatus::Unavailable;
                    return Err(e.into());
                }
            }
        };

        Ok(self.start_playback(&node.id, ticket, buffer))
    }

    /// Stop narration if it is playing, otherwise start it.
    pub async fn toggle_narration(
        &self,
        node: &StoryNode,
    ) -> Result<NarrationOutcome, NarrationError> {
        if self.narration_status() == NarrationStatus::Playing {
            self.stop_narration();
            return Ok(NarrationOutcome::Stopped);
        }
        self.play_narration(node).await
    }

    /// Stop any sound and drop outstanding narration requests.
    ///
    /// Returns whether narration was playing.
    pub fn stop_narration(&self) -> bool {
        let _playback = lock(&self.playback);
        let was_playing = {
            let mut active = lock(&self.active);
            let was_playing = active.status == NarrationStatus::Playing;
            active.narration += 1;
            active.status = NarrationStatus::Idle;
            was_playing
        };
        self.sink.stop();
        was_playing
    }

    /// Record that the sink reached the end of the current narration.
    pub fn playback_finished(&self) {
        let mut active = lock(&self.active);
        if active.status == NarrationStatus::Playing {
            active.status = NarrationStatus::Idle;
        }
    }

    pub fn narration_status(&self) -> NarrationStatus {
        lock(&self.active).status
    }

    /// Number of provider calls currently outstanding.
    pub fn in_flight(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Stop whatever is sounding and start `buffer`, unless `ticket` went
    /// stale while the caller was not holding the playback lock.
    fn start_playback(
        &self,
        node: &NodeId,
        ticket: u64,
        buffer: Arc<AudioBuffer>,
    ) -> NarrationOutcome {
        let _playback = lock(&self.playback);
        if !lock(&self.active).is_current(node, ticket) {
            tracing::debug!(node = %node, "Discarding stale narration");
            return NarrationOutcome::Stale;
        }

        let duration = buffer.duration();
        self.sink.stop();
        self.sink.start(buffer);
        lock(&self.active).status = NarrationStatus::Playing;

        tracing::debug!(node = %node, ?duration, "Playing narration");
        NarrationOutcome::Playing {
            node: node.clone(),
            duration,
        }
    }

    fn generation_for(&self, node: &NodeId) -> Option<u64> {
        let active = lock(&self.active);
        active.is_active(node).then_some(active.generation)
    }

    fn still_active(&self, node: &NodeId, generation: u64) -> bool {
        let active = lock(&self.active);
        active.generation == generation && active.is_active(node)
    }

    /// Join the outstanding request for `key`, or start one with `call`.
    ///
    /// The shared future writes a successful payload to the cache (unless the
    /// cache was cleared in the meantime) and removes its own pending entry.
    fn fetch<F>(&self, key: MediaKey, call: F) -> SharedFetch
    where
        F: FnOnce() -> ProviderCall,
    {
        let mut pending = lock(&self.pending);
        if let Some(entry) = pending.get(&key) {
            tracing::debug!(key = %key, "Joining in-flight media request");
            return entry.fetch.clone();
        }

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        let epoch = self.cache.epoch();
        let cache = Arc::clone(&self.cache);
        let table = Arc::clone(&self.pending);
        let request = call();
        let task_key = key.clone();

        tracing::debug!(key = %key, "Requesting media from provider");
        let fetch = async move {
            let payload = match request.await {
                Ok(Some(bytes)) => Some(Payload::from(bytes)),
                Ok(None) => {
                    tracing::warn!(key = %task_key, "Media provider returned nothing");
                    None
                }
                Err(e) => {
                    tracing::warn!(key = %task_key, error = %e, "Media provider failed");
                    None
                }
            };

            if let Some(payload) = &payload {
                cache.put_if_current(epoch, &task_key, Arc::clone(payload));
            }

            let mut table = lock(&table);
            if table.get(&task_key).is_some_and(|entry| entry.ticket == ticket) {
                table.remove(&task_key);
            }

            payload
        }
        .boxed()
        .shared();

        pending.insert(
            key,
            Pending {
                ticket,
                fetch: fetch.clone(),
            },
        );
        fetch
    }
}
