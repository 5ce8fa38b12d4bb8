//! Playback controller for native video elements
//!
//! Owns the transient UI state of one player. Intents come in as method
//! calls, state changes go out through a `watch` channel. UI state updates
//! optimistically; a play request that later fails reverts it.

use crate::core::listeners::Subscription;
use crate::core::media::{
    ContainerId, FullscreenChange, FullscreenHost, MediaElement, MediaEvent, PlayRequest,
};
use crate::error::{ErrorCode, MediaError, Result, ShowreelError};
use crate::types::{PlaybackPhase, PlaybackState};
use log::{debug, warn};
use tokio::sync::watch;

/// A play instruction that has not settled yet
pub struct PendingPlay {
    generation: u64,
    request: PlayRequest,
}

impl PendingPlay {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a seek intent did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekOutcome {
    Applied { percent: f64 },
    /// Metadata not loaded yet, or no usable position
    Ignored,
}

/// Controller for one native media element
pub struct PlaybackController<M: MediaElement> {
    media: M,
    container: ContainerId,
    state: PlaybackState,
    /// Bumped on every play/pause intent; older outcomes are stale
    generation: u64,
    events: Subscription<MediaEvent>,
    notifier: watch::Sender<PlaybackState>,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Take ownership of a freshly mounted element. Starts paused and muted.
    pub fn new(mut media: M, container: ContainerId) -> Self {
        let state = PlaybackState::default();
        media.set_muted(state.is_muted);
        let events = media.events();
        let (notifier, _) = watch::channel(state);

        Self {
            media,
            container,
            state,
            generation: 0,
            events,
            notifier,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.notifier.subscribe()
    }

    fn update(&mut self, change: impl FnOnce(&mut PlaybackState)) {
        let before = self.state;
        change(&mut self.state);
        if self.state != before {
            self.notifier.send_replace(self.state);
        }
    }

    /// Flip between playing and paused.
    ///
    /// Returns the pending request when this starts playback; hand it to
    /// [`settle_play`](Self::settle_play) or [`await_play`](Self::await_play).
    pub fn toggle_play(&mut self) -> Option<PendingPlay> {
        self.generation += 1;

        if self.state.is_playing {
            self.media.pause();
            self.update(|s| s.is_playing = false);
            return None;
        }

        let request = self.media.play();
        self.update(|s| s.is_playing = true);
        Some(PendingPlay {
            generation: self.generation,
            request,
        })
    }

    /// Reconcile UI state with the outcome of a play request
    pub fn settle_play(&mut self, generation: u64, outcome: std::result::Result<(), MediaError>) {
        let current = generation == self.generation;

        match outcome {
            Ok(()) if current => {}
            Ok(()) => {
                // A newer pause won; make sure the element agrees
                if !self.state.is_playing && !self.media.is_paused() {
                    self.media.pause();
                }
            }
            Err(err) if current => {
                warn!("{:?}: {}", ErrorCode::PlaybackBlocked, err);
                self.update(|s| s.is_playing = false);
            }
            Err(err) => debug!("Ignoring stale play outcome: {}", err),
        }
    }

    /// Wait for a pending play to settle, then reconcile
    pub async fn await_play(&mut self, pending: PendingPlay) {
        let PendingPlay {
            generation,
            request,
        } = pending;
        let outcome = request.await;
        self.settle_play(generation, outcome);
    }

    /// Toggle and wait for the outcome
    pub async fn toggle_play_settled(&mut self) {
        if let Some(pending) = self.toggle_play() {
            self.await_play(pending).await;
        }
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.state.is_muted;
        self.media.set_muted(muted);
        self.update(|s| s.is_muted = muted);
    }

    /// Jump to `fraction` of the media. Out-of-range input is clamped.
    pub fn seek_to_fraction(&mut self, fraction: f64) -> SeekOutcome {
        if fraction.is_nan() {
            return SeekOutcome::Ignored;
        }

        let duration = self.media.duration();
        if !(duration.is_finite() && duration > 0.0) {
            debug!("{:?}: metadata not loaded", ErrorCode::SeekIgnored);
            return SeekOutcome::Ignored;
        }

        let fraction = fraction.clamp(0.0, 1.0);
        let percent = fraction * 100.0;
        self.media.set_current_time(fraction * duration);
        self.update(|s| s.progress_percent = percent);
        SeekOutcome::Applied { percent }
    }

    /// Seek from a click at `offset_x` on a progress bar `width` wide
    pub fn seek_from_pointer(&mut self, offset_x: f64, width: f64) -> SeekOutcome {
        if !(width > 0.0) {
            return SeekOutcome::Ignored;
        }
        self.seek_to_fraction(offset_x / width)
    }

    pub fn on_time_update(&mut self) {
        let duration = self.media.duration();
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        let percent = (self.media.current_time() / duration * 100.0).clamp(0.0, 100.0);
        self.update(|s| s.progress_percent = percent);
    }

    /// Media reached its end: rewind and wait for the next play
    pub fn on_ended(&mut self) {
        self.update(|s| {
            s.is_playing = false;
            s.progress_percent = 0.0;
        });
        if self.media.current_time() != 0.0 {
            self.media.set_current_time(0.0);
        }
    }

    /// Playback stopped from outside
    fn on_external_pause(&mut self) {
        if self.state.is_playing {
            self.generation += 1;
            self.update(|s| s.is_playing = false);
        }
    }

    /// Enter fullscreen for this player, or leave it if anything is fullscreen
    pub fn request_fullscreen<H: FullscreenHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        let outcome = if host.fullscreen_element().is_some() {
            host.exit_fullscreen()
        } else {
            host.request_fullscreen(self.container)
        };
        outcome.map_err(|e| ShowreelError::Fullscreen(e.to_string()))
    }

    pub fn on_fullscreen_change(&mut self, change: FullscreenChange) {
        let active = change.element == Some(self.container);
        self.update(|s| s.is_fullscreen = active);
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedData => self.update(|s| s.is_loading = false),
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Pause => self.on_external_pause(),
            MediaEvent::LoadedMetadata | MediaEvent::ContextMenu | MediaEvent::DragStart => {}
        }
    }

    /// Apply every element event queued since the last pump
    pub fn pump(&mut self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::listeners::EventHub;
    use crate::core::media::{AutoplayPolicy, SimulatedMedia, SimulatedScreen};
    use tokio_test::{assert_err, assert_ok, assert_pending, assert_ready, task};

    fn controller(policy: AutoplayPolicy) -> (PlaybackController<SimulatedMedia>, SimulatedMedia) {
        let media = SimulatedMedia::new(policy);
        let probe = media.clone();
        (PlaybackController::new(media, ContainerId(1)), probe)
    }

    fn assert_agrees(player: &PlaybackController<SimulatedMedia>, probe: &SimulatedMedia) {
        assert_eq!(player.state().is_playing, !probe.is_paused());
    }

    #[test]
    fn test_mounts_paused_and_muted() {
        let (player, probe) = controller(AutoplayPolicy::Allow);
        let state = player.state();
        assert!(!state.is_playing);
        assert!(state.is_muted);
        assert!(state.is_loading);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(player.phase(), PlaybackPhase::Idle);
        assert!(probe.is_muted());
    }

    #[tokio::test]
    async fn test_toggle_play_starts_and_pauses() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);

        player.toggle_play_settled().await;
        assert_eq!(player.phase(), PlaybackPhase::Playing);
        assert_agrees(&player, &probe);

        player.toggle_play_settled().await;
        assert!(!player.state().is_playing);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_blocked_play_reverts() {
        let (mut player, probe) = controller(AutoplayPolicy::BlockAll);

        let pending = player.toggle_play().unwrap();
        // Optimistic until the outcome arrives
        assert!(player.state().is_playing);

        player.await_play(pending).await;
        assert!(!player.state().is_playing);
        assert_eq!(player.phase(), PlaybackPhase::Idle);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_unmuted_autoplay_is_blocked_but_muted_is_not() {
        let (mut player, probe) = controller(AutoplayPolicy::BlockUnmuted);
        player.toggle_play_settled().await;
        assert!(player.state().is_playing);

        player.toggle_play_settled().await;
        player.toggle_mute();
        player.toggle_play_settled().await;
        assert!(!player.state().is_playing);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_double_toggle_last_intent_wins() {
        let (mut player, probe) = controller(AutoplayPolicy::Manual);

        let first = player.toggle_play().unwrap();
        assert!(player.toggle_play().is_none());

        player.await_play(first).await;
        assert!(!player.state().is_playing);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_play_pause_play_settles_playing() {
        let (mut player, probe) = controller(AutoplayPolicy::Manual);

        let first = player.toggle_play().unwrap();
        assert!(player.toggle_play().is_none());
        let third = player.toggle_play().unwrap();
        let generation = third.generation();

        let mut waiting = task::spawn(third.request);
        assert_pending!(waiting.poll());
        assert!(probe.settle_next(Ok(())));
        let outcome = assert_ready!(waiting.poll());
        assert_eq!(outcome, Ok(()));

        player.await_play(first).await;
        player.settle_play(generation, outcome);
        assert!(player.state().is_playing);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_stale_success_is_paused_again() {
        let (mut player, probe) = controller(AutoplayPolicy::Manual);

        let pending = player.toggle_play().unwrap();
        let generation = pending.generation();
        player.toggle_play();

        // Element reports success after the pause intent
        drop(pending);
        let mut media = probe.clone();
        probe.set_policy(AutoplayPolicy::Allow);
        assert_ok!(media.play().await);
        assert!(!probe.is_paused());

        player.settle_play(generation, Ok(()));
        assert!(!player.state().is_playing);
        assert_agrees(&player, &probe);
    }

    #[tokio::test]
    async fn test_time_update_then_end_rewinds() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        probe.load(10.0);
        player.pump();
        assert!(!player.state().is_loading);

        player.toggle_play_settled().await;
        probe.advance(5.0);
        player.pump();
        assert_eq!(player.state().progress_percent, 50.0);
        assert_eq!(player.phase(), PlaybackPhase::Playing);

        probe.advance(5.0);
        player.pump();
        let state = player.state();
        assert!(!state.is_playing);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(probe.current_time(), 0.0);
        assert_eq!(player.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_ended_at_rest_changes_nothing() {
        let (mut player, _probe) = controller(AutoplayPolicy::Allow);
        let mut changes = player.subscribe();
        let before = player.state();

        player.on_ended();

        assert_eq!(player.state(), before);
        assert!(!changes.has_changed().unwrap());
    }

    #[test]
    fn test_time_update_without_duration_keeps_progress() {
        let (mut player, _probe) = controller(AutoplayPolicy::Allow);
        player.on_time_update();
        assert_eq!(player.state().progress_percent, 0.0);
        assert!(!player.state().progress_percent.is_nan());
    }

    #[test]
    fn test_seek_before_metadata_is_ignored() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        assert_eq!(player.seek_to_fraction(0.5), SeekOutcome::Ignored);
        assert_eq!(player.state().progress_percent, 0.0);
        assert_eq!(probe.current_time(), 0.0);
    }

    #[test]
    fn test_seek_clamps_and_applies() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        probe.load(10.0);

        assert_eq!(player.seek_to_fraction(0.25), SeekOutcome::Applied { percent: 25.0 });
        assert_eq!(probe.current_time(), 2.5);

        assert_eq!(player.seek_to_fraction(1.7), SeekOutcome::Applied { percent: 100.0 });
        assert_eq!(player.seek_to_fraction(-3.0), SeekOutcome::Applied { percent: 0.0 });
        assert_eq!(player.seek_to_fraction(f64::NAN), SeekOutcome::Ignored);
        assert_eq!(player.state().progress_percent, 0.0);
    }

    #[test]
    fn test_seek_from_pointer() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        probe.load(8.0);

        let outcome = player.seek_from_pointer(30.0, 120.0);
        assert_eq!(outcome, SeekOutcome::Applied { percent: 25.0 });
        assert_eq!(probe.current_time(), 2.0);
        assert_eq!(player.seek_from_pointer(30.0, 0.0), SeekOutcome::Ignored);
    }

    #[test]
    fn test_toggle_mute_reflects_on_element() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        let mut changes = player.subscribe();

        player.toggle_mute();
        assert!(!probe.is_muted());
        assert!(changes.has_changed().unwrap());
        assert!(!changes.borrow_and_update().is_muted);

        player.toggle_mute();
        assert!(probe.is_muted());
    }

    #[test]
    fn test_fullscreen_follows_change_events() {
        let hub = EventHub::new();
        let mut changes = hub.subscribe();
        let mut screen = SimulatedScreen::new(hub);
        let (mut player, _probe) = controller(AutoplayPolicy::Allow);

        assert_ok!(player.request_fullscreen(&mut screen));
        // Nothing changes until the document reports it
        assert!(!player.state().is_fullscreen);
        for change in changes.drain() {
            player.on_fullscreen_change(change);
        }
        assert!(player.state().is_fullscreen);

        assert_ok!(player.request_fullscreen(&mut screen));
        for change in changes.drain() {
            player.on_fullscreen_change(change);
        }
        assert!(!player.state().is_fullscreen);
    }

    #[test]
    fn test_other_container_fullscreen_is_not_ours() {
        let (mut player, _probe) = controller(AutoplayPolicy::Allow);
        player.on_fullscreen_change(FullscreenChange {
            element: Some(ContainerId(99)),
        });
        assert!(!player.state().is_fullscreen);
    }

    #[test]
    fn test_fullscreen_failure_is_reported() {
        struct Refusing;
        impl FullscreenHost for Refusing {
            fn fullscreen_element(&self) -> Option<ContainerId> {
                None
            }
            fn request_fullscreen(&mut self, _: ContainerId) -> std::result::Result<(), MediaError> {
                Err(MediaError::NotAllowed("no gesture".into()))
            }
            fn exit_fullscreen(&mut self) -> std::result::Result<(), MediaError> {
                Ok(())
            }
        }

        let (mut player, _probe) = controller(AutoplayPolicy::Allow);
        let err = assert_err!(player.request_fullscreen(&mut Refusing));
        assert!(matches!(err, ShowreelError::Fullscreen(_)));
    }

    #[tokio::test]
    async fn test_external_pause() {
        let (mut player, probe) = controller(AutoplayPolicy::Allow);
        probe.load(10.0);
        player.toggle_play_settled().await;
        probe.advance(2.0);

        probe.interrupt();
        player.pump();
        assert_eq!(player.phase(), PlaybackPhase::Paused);
        assert_agrees(&player, &probe);
    }

    #[test]
    fn test_drop_releases_listener() {
        let (player, probe) = controller(AutoplayPolicy::Allow);
        assert_eq!(probe.listener_count(), 1);
        drop(player);
        assert_eq!(probe.listener_count(), 0);
    }
}
