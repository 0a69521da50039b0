use async_trait::async_trait;
use narrative_core::{
    AudioBuffer, AudioSink, Error, ImageOutcome, ImageSource, MediaConfig, MediaKey,
    MediaProvider, Mode, NarrationOutcome, NarrationStatus, NarrativeError, ProviderError,
    QuizPhase, RewardTier, Session, SilentSink,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use story_graph::StoryGraph;
use tokio::sync::Notify;

#[derive(Default)]
struct CountingProvider {
    images: AtomicUsize,
    speech: AtomicUsize,
}

#[async_trait]
impl MediaProvider for CountingProvider {
    async fn synthesize_image(&self, prompt: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.images.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(Some(prompt.as_bytes().to_vec()))
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.speech.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        // One silent sample per word.
        let words = text.split_whitespace().count();
        Ok(Some(vec![0; words * 2]))
    }
}

/// Holds every request until the gate is opened.
#[derive(Default)]
struct GatedProvider {
    calls: AtomicUsize,
    gate: Notify,
}

impl GatedProvider {
    async fn wait_for_call(&self) {
        while self.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl MediaProvider for GatedProvider {
    async fn synthesize_image(&self, _prompt: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(Some(b"painting".to_vec()))
    }

    async fn synthesize_speech(&self, _text: &str) -> Result<Option<Vec<u8>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(Some(vec![0; 64]))
    }
}

#[derive(Default)]
struct CountingSink {
    playing: Mutex<Option<Arc<AudioBuffer>>>,
    starts: AtomicUsize,
}

impl AudioSink for CountingSink {
    fn start(&self, buffer: Arc<AudioBuffer>) {
        let mut playing = self.playing.lock().unwrap();
        assert!(playing.is_none(), "two narrations sounding at once");
        *playing = Some(buffer);
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.playing.lock().unwrap().take();
    }
}

fn session(provider: &Arc<CountingProvider>, sink: &Arc<CountingSink>) -> Session {
    Session::new(
        Arc::new(StoryGraph::bundled().unwrap()),
        MediaConfig::default(),
        provider.clone(),
        sink.clone(),
    )
}

#[tokio::test]
async fn test_full_playthrough_to_gold() {
    let provider = Arc::new(CountingProvider::default());
    let sink = Arc::new(CountingSink::default());
    let mut session = session(&provider, &sink);

    assert_eq!(session.current_node().title, "London, 1851");
    assert!(matches!(session.illustrate().await, ImageOutcome::Ready(_)));

    assert_eq!(session.choose(0).unwrap().id.as_str(), "army_intro");
    assert_eq!(session.choose(1).unwrap().id.as_str(), "signal_success");
    assert!(session.current_node().is_terminal());

    let err = session.choose(0).unwrap_err();
    assert!(matches!(err, Error::Narrative(NarrativeError::TerminalNode(_))));

    let state = session.enter_quiz().unwrap();
    assert_eq!(state.phase, QuizPhase::Answering { index: 0 });
    assert_eq!(session.mode(), Mode::Quiz);

    for answer in [1, 2, 1, 2] {
        session.select_option(answer).unwrap();
        session.advance().unwrap();
    }

    assert_eq!(session.reward().unwrap(), RewardTier::Gold);
    let summary = session.summary().unwrap();
    assert_eq!((summary.score, summary.total), (4, 4));
    assert!(summary.perfect);
}

#[tokio::test]
async fn test_second_answer_does_not_change_score() {
    let provider = Arc::new(CountingProvider::default());
    let mut session = session(&provider, &Arc::default());

    session.choose(0).unwrap();
    session.choose(1).unwrap();
    session.enter_quiz().unwrap();

    session.select_option(0).unwrap();
    let state = *session.select_option(1).unwrap();
    assert_eq!(state.score, 0);
    assert_eq!(state.phase, QuizPhase::Reviewing { index: 0, selected: 0 });

    for answer in [2, 0, 0] {
        session.advance().unwrap();
        session.select_option(answer).unwrap();
    }
    session.advance().unwrap();

    assert_eq!(session.reward().unwrap(), RewardTier::Participation);
}

#[tokio::test]
async fn test_visited_nodes_stay_cached() {
    let provider = Arc::new(CountingProvider::default());
    let mut session = session(&provider, &Arc::default());

    session.illustrate().await;
    session.choose(3).unwrap();
    session.illustrate().await;
    session.choose(0).unwrap();

    assert!(session.media().cache().get(&MediaKey::image("start")).is_some());
    assert!(session.media().cache().get(&MediaKey::image("exhibition_intro")).is_some());
    assert_eq!(provider.images.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_illustrations_call_provider_once() {
    let provider = Arc::new(CountingProvider::default());
    let session = session(&provider, &Arc::default());

    let outcomes = tokio::join!(session.illustrate(), session.illustrate(), session.illustrate());

    // Whoever resolves last may find the shared result already cached.
    let sources: Vec<ImageSource> = [outcomes.0, outcomes.1, outcomes.2]
        .into_iter()
        .map(|outcome| match outcome {
            ImageOutcome::Ready(illustration) => illustration.source,
            ImageOutcome::Stale => panic!("expected an illustration"),
        })
        .collect();
    assert!(matches!(sources[0], ImageSource::Generated(_)));
    assert!(sources.iter().all(|source| *source == sources[0]));
    assert_eq!(provider.images.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_choice_while_illustrating_discards_result() {
    let provider = Arc::new(GatedProvider::default());
    let mut session = Session::new(
        Arc::new(StoryGraph::bundled().unwrap()),
        MediaConfig::default(),
        provider.clone(),
        Arc::new(SilentSink),
    );

    let pending = tokio::spawn(session.illustrate());
    provider.wait_for_call().await;

    session.choose(0).unwrap();
    provider.gate.notify_one();

    assert_eq!(pending.await.unwrap(), ImageOutcome::Stale);
    // Kept for a later visit to the same node.
    assert!(session.media().cache().get(&MediaKey::image("start")).is_some());
}

#[tokio::test]
async fn test_restart_while_narration_loads() {
    let provider = Arc::new(GatedProvider::default());
    let sink = Arc::new(CountingSink::default());
    let mut session = Session::new(
        Arc::new(StoryGraph::bundled().unwrap()),
        MediaConfig::default(),
        provider.clone(),
        sink.clone(),
    );

    let pending = tokio::spawn(session.play_narration());
    provider.wait_for_call().await;

    session.restart().unwrap();
    provider.gate.notify_one();

    assert_eq!(pending.await.unwrap().unwrap(), NarrationOutcome::Stale);
    assert_eq!(session.narration_status(), NarrationStatus::Idle);
    assert_eq!(sink.starts.load(Ordering::SeqCst), 0);
    assert!(session.media().cache().get(&MediaKey::audio("start")).is_none());
}

#[tokio::test]
async fn test_illustration_prompt_carries_style() {
    let provider = Arc::new(CountingProvider::default());
    let session = session(&provider, &Arc::default());

    let ImageOutcome::Ready(illustration) = session.illustrate().await else {
        panic!("expected an illustration");
    };
    let ImageSource::Generated(bytes) = illustration.source else {
        panic!("expected a generated image");
    };

    // The mock paints the prompt it was given.
    let prompt = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(prompt.starts_with("Classic Victorian storybook illustration"));
    assert!(prompt.contains("Scene: "));
}

#[tokio::test]
async fn test_narration_is_exclusive_and_stops_on_move() {
    let provider = Arc::new(CountingProvider::default());
    let sink = Arc::new(CountingSink::default());
    let mut session = session(&provider, &sink);

    let outcome = session.play_narration().await.unwrap();
    assert!(matches!(outcome, NarrationOutcome::Playing { .. }));

    // Restarting the narration stops the first one before starting again.
    session.play_narration().await.unwrap();
    assert_eq!(sink.starts.load(Ordering::SeqCst), 2);
    assert_eq!(provider.speech.load(Ordering::SeqCst), 1);

    session.choose(0).unwrap();
    assert!(sink.playing.lock().unwrap().is_none());
    assert_eq!(session.narration_status(), NarrationStatus::Idle);

    let first = session.toggle_narration().await.unwrap();
    assert!(matches!(
        first,
        NarrationOutcome::Playing { ref node, .. } if node.as_str() == "army_intro"
    ));
    assert_eq!(session.toggle_narration().await.unwrap(), NarrationOutcome::Stopped);
    assert!(sink.playing.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_restart_resets_everything() {
    let provider = Arc::new(CountingProvider::default());
    let sink = Arc::new(CountingSink::default());
    let mut session = session(&provider, &sink);

    session.illustrate().await;
    session.play_narration().await.unwrap();
    session.choose(0).unwrap();
    session.choose(0).unwrap();
    session.choose(1).unwrap();
    session.enter_quiz().unwrap();
    session.select_option(1).unwrap();

    session.restart().unwrap();

    assert_eq!(session.current_node().id.as_str(), "start");
    assert!(session.state().history.is_empty());
    assert_eq!(session.mode(), Mode::Story);
    assert!(session.quiz().is_none());
    assert!(session.media().cache().get(&MediaKey::image("start")).is_none());
    assert!(session.media().cache().get(&MediaKey::audio("start")).is_none());
    assert!(sink.playing.lock().unwrap().is_none());

    session.illustrate().await;
    assert_eq!(provider.images.load(Ordering::SeqCst), 2);
}
