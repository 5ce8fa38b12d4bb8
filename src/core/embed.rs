//! Embedded frame tracking (YouTube players, booking widget)
//!
//! We have no playback control over an embed. All we track is whether the
//! frame loaded, and what to offer when it did not.

use crate::core::listeners::{EventHub, Subscription};
use crate::error::{ErrorCode, Result, ShowreelError};
use crate::types::VideoKind;
use log::warn;
use std::time::Duration;

/// Signals an embedded frame reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedSignal {
    Load,
    Error(String),
}

/// What the frame is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedPurpose {
    Video(VideoKind),
    Booking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedState {
    Loading,
    Loaded,
    Failed { reason: String },
}

pub struct EmbedFrame {
    url: String,
    fallback_url: String,
    purpose: EmbedPurpose,
    state: EmbedState,
    timeout: Duration,
    signals: Subscription<EmbedSignal>,
}

impl EmbedFrame {
    /// Mount a frame. The returned hub is the frame's signal target.
    pub fn mount(
        url: impl Into<String>,
        fallback_url: impl Into<String>,
        purpose: EmbedPurpose,
        timeout: Duration,
    ) -> (Self, EventHub<EmbedSignal>) {
        let hub = EventHub::new();
        let frame = Self {
            url: url.into(),
            fallback_url: fallback_url.into(),
            purpose,
            state: EmbedState::Loading,
            timeout,
            signals: hub.subscribe(),
        };
        (frame, hub)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    pub fn purpose(&self) -> EmbedPurpose {
        self.purpose
    }

    pub fn state(&self) -> &EmbedState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == EmbedState::Loading
    }

    pub fn on_load(&mut self) {
        self.state = EmbedState::Loaded;
    }

    pub fn on_error(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("{:?}: {} ({})", ErrorCode::EmbedLoadFailure, self.url, reason);
        self.state = EmbedState::Failed { reason };
    }

    fn apply(&mut self, signal: EmbedSignal) {
        match signal {
            EmbedSignal::Load => self.on_load(),
            EmbedSignal::Error(reason) => self.on_error(reason),
        }
    }

    /// Apply queued signals without waiting
    pub fn pump(&mut self) {
        for signal in self.signals.drain() {
            self.apply(signal);
        }
    }

    /// Wait for the frame to load, failing after the configured timeout
    pub async fn wait_loaded(&mut self) -> Result<()> {
        self.pump();

        if self.state == EmbedState::Loading {
            let received = tokio::time::timeout(self.timeout, self.signals.next()).await;
            match received {
                Ok(Some(signal)) => self.apply(signal),
                Ok(None) => self.on_error("frame went away"),
                Err(_) => self.on_error(format!("no load after {:?}", self.timeout)),
            }
        }

        match self.state {
            EmbedState::Loaded => Ok(()),
            EmbedState::Failed { ref reason } => Err(ShowreelError::EmbedLoad {
                url: self.url.clone(),
                reason: reason.clone(),
            }),
            EmbedState::Loading => Ok(()),
        }
    }

    /// Inline message shown in place of a failed frame
    pub fn fallback_message(&self) -> Option<String> {
        match self.state {
            EmbedState::Failed { .. } => Some(format!(
                "Couldn't load this {}. Open it in a new tab: {}",
                match self.purpose {
                    EmbedPurpose::Booking => "calendar",
                    EmbedPurpose::Video(_) => "video",
                },
                self.fallback_url
            )),
            _ => None,
        }
    }
}

/// Check that an embed URL answers, as a stand-in for the frame's load signal
pub async fn check_reachable(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<()> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ShowreelError::Network(format!(
            "HTTP {}: {}",
            response.status(),
            url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn frame(timeout_ms: u64) -> (EmbedFrame, EventHub<EmbedSignal>) {
        EmbedFrame::mount(
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=0",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            EmbedPurpose::Video(VideoKind::YouTubeStandard),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test]
    async fn test_load_signal_clears_loading() {
        let (mut frame, hub) = frame(1_000);
        assert!(frame.is_loading());

        hub.emit(EmbedSignal::Load);
        assert_ok!(frame.wait_loaded().await);
        assert_eq!(frame.state(), &EmbedState::Loaded);
        assert!(frame.fallback_message().is_none());
    }

    #[tokio::test]
    async fn test_error_signal_offers_fallback() {
        let (mut frame, hub) = frame(1_000);
        hub.emit(EmbedSignal::Error("refused to connect".into()));

        let err = assert_err!(frame.wait_loaded().await);
        assert_eq!(err.code(), ErrorCode::EmbedLoadFailure);
        let message = frame.fallback_message().unwrap();
        assert!(message.contains("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn test_timeout_fails_frame() {
        let (mut frame, _hub) = frame(20);
        assert_err!(frame.wait_loaded().await);
        assert!(matches!(frame.state(), EmbedState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_booking_fallback_wording() {
        let (mut frame, _hub) = EmbedFrame::mount(
            "https://tidycal.com/x",
            "https://tidycal.com/x",
            EmbedPurpose::Booking,
            Duration::from_secs(1),
        );
        frame.on_error("blocked");
        assert!(frame.fallback_message().unwrap().starts_with("Couldn't load this calendar"));
        // A late load still wins
        frame.on_load();
        assert_ok!(frame.wait_loaded().await);
    }
}
