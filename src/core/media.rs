//! Media element and fullscreen seams
//!
//! [`MediaElement`] is what a [`PlaybackController`](crate::core::player::PlaybackController)
//! drives; [`FullscreenHost`] is the document-level fullscreen API. The
//! simulated implementations back the terminal front end and the tests.

use crate::core::listeners::{EventHub, Interceptor, Subscription};
use crate::error::MediaError;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Events a media element reports to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    LoadedMetadata,
    LoadedData,
    TimeUpdate,
    /// Playback stopped without the controller asking
    Pause,
    Ended,
    ContextMenu,
    DragStart,
}

// ============================================
// Play requests
// ============================================

/// Eventual outcome of a play instruction
pub struct PlayRequest {
    rx: oneshot::Receiver<Result<(), MediaError>>,
}

/// Settles the paired [`PlayRequest`]
pub struct PlaySettler {
    tx: oneshot::Sender<Result<(), MediaError>>,
}

impl PlayRequest {
    pub fn channel() -> (PlaySettler, PlayRequest) {
        let (tx, rx) = oneshot::channel();
        (PlaySettler { tx }, PlayRequest { rx })
    }

    /// A request that has already settled
    pub fn ready(outcome: Result<(), MediaError>) -> Self {
        let (settler, request) = Self::channel();
        settler.settle(outcome);
        request
    }
}

impl PlaySettler {
    pub fn settle(self, outcome: Result<(), MediaError>) {
        // Receiver gone means nobody cares about the outcome any more
        let _ = self.tx.send(outcome);
    }
}

impl Future for PlayRequest {
    type Output = Result<(), MediaError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(MediaError::Aborted)))
    }
}

// ============================================
// Traits
// ============================================

/// A native media element owned by exactly one controller
pub trait MediaElement {
    /// Begin playback; the outcome arrives later
    fn play(&mut self) -> PlayRequest;
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    /// Media length in seconds; NaN until metadata has loaded
    fn duration(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Attach a listener for this element's events
    fn events(&self) -> Subscription<MediaEvent>;
    /// Attach a listener that may suppress an event's default action
    fn intercept(&self, intercept: Interceptor<MediaEvent>) -> Subscription<MediaEvent>;
}

/// Identifies a player container for fullscreen purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u64);

/// Document-level fullscreen change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenChange {
    pub element: Option<ContainerId>,
}

/// The document's fullscreen API
pub trait FullscreenHost {
    fn fullscreen_element(&self) -> Option<ContainerId>;
    fn request_fullscreen(&mut self, container: ContainerId) -> Result<(), MediaError>;
    fn exit_fullscreen(&mut self) -> Result<(), MediaError>;

    /// `container` left the document; fullscreen ends if it held it
    fn release(&mut self, container: ContainerId) -> Result<(), MediaError> {
        if self.fullscreen_element() == Some(container) {
            self.exit_fullscreen()
        } else {
            Ok(())
        }
    }
}

// ============================================
// Simulated element
// ============================================

/// When the simulated element lets playback start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    /// Every play request succeeds immediately
    #[default]
    Allow,
    /// Unmuted playback is refused
    BlockUnmuted,
    /// Every play request is refused
    BlockAll,
    /// Requests stay pending until [`SimulatedMedia::settle_next`]
    Manual,
}

struct SimState {
    paused: bool,
    muted: bool,
    current_time: f64,
    duration: f64,
    policy: AutoplayPolicy,
    pending: VecDeque<PlaySettler>,
}

/// In-memory media element. Clones share the same element, so a test can
/// keep a handle to inspect what the controller did.
#[derive(Clone)]
pub struct SimulatedMedia {
    state: Arc<Mutex<SimState>>,
    events: EventHub<MediaEvent>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new(AutoplayPolicy::default())
    }
}

impl SimulatedMedia {
    pub fn new(policy: AutoplayPolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                paused: true,
                muted: false,
                current_time: 0.0,
                duration: f64::NAN,
                policy,
                pending: VecDeque::new(),
            })),
            events: EventHub::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_policy(&self, policy: AutoplayPolicy) {
        self.lock().policy = policy;
    }

    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    /// Metadata and first frame arrive
    pub fn load(&self, duration: f64) {
        self.lock().duration = duration;
        self.events.emit(MediaEvent::LoadedMetadata);
        self.events.emit(MediaEvent::LoadedData);
    }

    /// Let playback run for `seconds`, firing time updates and `ended`
    pub fn advance(&self, seconds: f64) {
        let ended = {
            let mut state = self.lock();
            if state.paused || !state.duration.is_finite() {
                return;
            }
            state.current_time = (state.current_time + seconds).min(state.duration);
            let ended = state.current_time >= state.duration;
            if ended {
                state.paused = true;
            }
            ended
        };

        self.events.emit(MediaEvent::TimeUpdate);
        if ended {
            self.events.emit(MediaEvent::Ended);
        }
    }

    /// Playback stops from outside the controller
    pub fn interrupt(&self) {
        let was_playing = {
            let mut state = self.lock();
            let was_playing = !state.paused;
            state.paused = true;
            was_playing
        };
        if was_playing {
            self.events.emit(MediaEvent::Pause);
        }
    }

    /// Emit a raw element event
    pub fn dispatch(&self, event: MediaEvent) -> bool {
        self.events.emit(event).default_prevented
    }

    pub fn pending_plays(&self) -> usize {
        self.lock().pending.len()
    }

    /// Settle the oldest pending play request (manual policy)
    pub fn settle_next(&self, outcome: Result<(), MediaError>) -> bool {
        let settler = {
            let mut state = self.lock();
            let Some(settler) = state.pending.pop_front() else {
                return false;
            };
            if outcome.is_ok() {
                state.paused = false;
            }
            settler
        };
        settler.settle(outcome);
        true
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }
}

impl MediaElement for SimulatedMedia {
    fn play(&mut self) -> PlayRequest {
        let mut state = self.lock();
        let policy = state.policy;
        let outcome = match policy {
            AutoplayPolicy::Allow => Ok(()),
            AutoplayPolicy::BlockUnmuted if !state.muted => Err(MediaError::NotAllowed(
                "unmuted autoplay requires a user gesture".into(),
            )),
            AutoplayPolicy::BlockUnmuted => Ok(()),
            AutoplayPolicy::BlockAll => {
                Err(MediaError::NotAllowed("playback disabled".into()))
            }
            AutoplayPolicy::Manual => {
                let (settler, request) = PlayRequest::channel();
                state.pending.push_back(settler);
                return request;
            }
        };
        if outcome.is_ok() {
            state.paused = false;
        }
        PlayRequest::ready(outcome)
    }

    fn pause(&mut self) {
        let pending: Vec<PlaySettler> = {
            let mut state = self.lock();
            state.paused = true;
            state.pending.drain(..).collect()
        };
        for settler in pending {
            settler.settle(Err(MediaError::Aborted));
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.lock().muted = muted;
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.lock();
        state.current_time = if state.duration.is_finite() {
            seconds.clamp(0.0, state.duration)
        } else {
            0.0
        };
    }

    fn events(&self) -> Subscription<MediaEvent> {
        self.events.subscribe()
    }

    fn intercept(&self, intercept: Interceptor<MediaEvent>) -> Subscription<MediaEvent> {
        self.events.intercept(intercept)
    }
}

// ============================================
// Simulated screen
// ============================================

/// In-memory document fullscreen state that announces changes
pub struct SimulatedScreen {
    current: Option<ContainerId>,
    changes: EventHub<FullscreenChange>,
}

impl SimulatedScreen {
    pub fn new(changes: EventHub<FullscreenChange>) -> Self {
        Self {
            current: None,
            changes,
        }
    }

    fn set(&mut self, element: Option<ContainerId>) {
        if self.current != element {
            self.current = element;
            self.changes.emit(FullscreenChange { element });
        }
    }
}

impl FullscreenHost for SimulatedScreen {
    fn fullscreen_element(&self) -> Option<ContainerId> {
        self.current
    }

    fn request_fullscreen(&mut self, container: ContainerId) -> Result<(), MediaError> {
        self.set(Some(container));
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), MediaError> {
        if self.current.is_none() {
            return Err(MediaError::Unsupported("document is not fullscreen".into()));
        }
        self.set(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_allow_policy_starts_playback() {
        let mut media = SimulatedMedia::default();
        assert_ok!(media.play().await);
        assert!(!media.is_paused());
    }

    #[tokio::test]
    async fn test_block_unmuted_policy() {
        let mut media = SimulatedMedia::new(AutoplayPolicy::BlockUnmuted);
        assert_err!(media.play().await);
        assert!(media.is_paused());

        media.set_muted(true);
        assert_ok!(media.play().await);
    }

    #[tokio::test]
    async fn test_pause_aborts_pending_play() {
        let mut media = SimulatedMedia::new(AutoplayPolicy::Manual);
        let request = media.play();
        assert_eq!(media.pending_plays(), 1);

        media.pause();
        assert_eq!(request.await, Err(MediaError::Aborted));
        assert_eq!(media.pending_plays(), 0);
    }

    #[test]
    fn test_advance_to_end_fires_ended() {
        let mut media = SimulatedMedia::default();
        let mut events = media.events();
        media.load(10.0);
        drop(media.play());

        media.advance(4.0);
        media.advance(100.0);

        assert_eq!(media.current_time(), 10.0);
        assert!(media.is_paused());
        assert_eq!(
            events.drain(),
            vec![
                MediaEvent::LoadedMetadata,
                MediaEvent::LoadedData,
                MediaEvent::TimeUpdate,
                MediaEvent::TimeUpdate,
                MediaEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_screen_announces_changes() {
        let hub = EventHub::new();
        let mut changes = hub.subscribe();
        let mut screen = SimulatedScreen::new(hub);

        assert_ok!(screen.request_fullscreen(ContainerId(3)));
        assert_eq!(screen.fullscreen_element(), Some(ContainerId(3)));
        assert_ok!(screen.exit_fullscreen());
        assert_err!(screen.exit_fullscreen());

        assert_eq!(
            changes.drain(),
            vec![
                FullscreenChange { element: Some(ContainerId(3)) },
                FullscreenChange { element: None },
            ]
        );
    }

    #[test]
    fn test_release_only_exits_for_holder() {
        let hub = EventHub::new();
        let mut screen = SimulatedScreen::new(hub);

        assert_ok!(screen.release(ContainerId(1)));
        assert_ok!(screen.request_fullscreen(ContainerId(2)));
        assert_ok!(screen.release(ContainerId(1)));
        assert_eq!(screen.fullscreen_element(), Some(ContainerId(2)));

        assert_ok!(screen.release(ContainerId(2)));
        assert_eq!(screen.fullscreen_element(), None);
    }
}
