//! Type definitions for showreel
//!
//! Source of truth for all data structures.

use serde::{Deserialize, Serialize};

// ============================================
// Source Types
// ============================================

/// A raw video source as supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl VideoSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            poster: None,
        }
    }
}

/// How a source is played back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    /// Directly playable media file
    NativeFile,
    /// Regular YouTube video, rendered through the embed frame
    YouTubeStandard,
    /// Short-form YouTube video (`/shorts/` or `youtu.be/`)
    YouTubeShort,
}

impl VideoKind {
    pub fn is_embed(self) -> bool {
        !matches!(self, Self::NativeFile)
    }
}

/// Render-ready representation of a source. Derived, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDescriptor {
    pub kind: VideoKind,
    /// Direct media URL for native files, embed URL for YouTube kinds
    pub playable_url: String,
    pub poster_url: Option<String>,
    /// Extracted 11-character YouTube ID
    pub video_id: Option<String>,
}

impl VideoDescriptor {
    /// Empty URLs resolve to a native descriptor with nothing to play
    pub fn is_playable(&self) -> bool {
        !self.playable_url.is_empty()
    }

    pub fn badge(&self) -> Badge {
        match self.kind {
            VideoKind::NativeFile => Badge::None,
            VideoKind::YouTubeStandard => Badge::YouTube,
            VideoKind::YouTubeShort => Badge::Shorts,
        }
    }
}

/// Cosmetic badge shown on a gallery card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    None,
    YouTube,
    Shorts,
}

// ============================================
// Playback Types
// ============================================

/// Transient UI state of one native player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    /// 0..=100
    pub progress_percent: f64,
    pub is_fullscreen: bool,
    /// True until the element reports its first frame
    pub is_loading: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_muted: true,
            progress_percent: 0.0,
            is_fullscreen: false,
            is_loading: true,
        }
    }
}

/// Coarse playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Paused at progress 0, before first play or after the media ended
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        if self.is_playing {
            PlaybackPhase::Playing
        } else if self.progress_percent == 0.0 {
            PlaybackPhase::Idle
        } else {
            PlaybackPhase::Paused
        }
    }
}

/// Cross-item coordination in a gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPolicy {
    /// Every item plays on its own
    #[default]
    Independent,
    /// Starting one item pauses every other playing item
    Exclusive,
}

// ============================================
// Gallery Types
// ============================================

/// Card aspect ratio for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    #[default]
    Horizontal,
    Vertical,
}

/// A showcase category (one gallery tab)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aspect: Aspect,
}

/// A video entry as stored in a catalog or returned by the video list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryVideo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Known media length, used by the simulated player
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl GalleryVideo {
    pub fn source(&self) -> VideoSource {
        VideoSource {
            url: self.video_url.clone(),
            poster: self.poster.clone(),
        }
    }
}

/// A category together with its videos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    #[serde(default)]
    pub videos: Vec<GalleryVideo>,
}

/// The full set of groups a gallery can show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub groups: Vec<CategoryGroup>,
}

impl Catalog {
    pub fn group(&self, category_id: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category.id == category_id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.groups.iter().map(|g| &g.category)
    }
}

/// Which category is currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub active_category_id: String,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local catalog file (empty = built-in demo catalog)
    pub catalog_path: String,
    /// Remote video list endpoint, queried per category
    pub endpoint: Option<String>,
    /// Category shown first (default: "youtube")
    pub default_category: String,
    /// Cross-item coordination
    pub playback_policy: PlaybackPolicy,
    /// Seconds to wait for an embed to load (default: 10)
    pub embed_timeout_secs: u64,
    /// Booking widget URL
    pub booking_url: String,
    /// Editor command (default: "nvim")
    pub editor: String,
    /// Fixed seed for decorative jitter
    pub decor_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: String::new(),
            endpoint: None,
            default_category: "youtube".into(),
            playback_policy: PlaybackPolicy::default(),
            embed_timeout_secs: 10,
            booking_url: "https://tidycal.com/showreel/discovery-call".into(),
            editor: "nvim".into(),
            decor_seed: None,
        }
    }
}

// ============================================
// Selector Types
// ============================================

/// Item displayed in selector menu
#[derive(Debug, Clone)]
pub struct MenuItem<T> {
    /// Display text
    pub label: String,
    /// Underlying value
    pub value: T,
}

// ============================================
// State Machine Types
// ============================================

/// Interactive front end state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Pick a category tab
    Tabs,
    /// Look at the active category's cards
    Browse,
    /// Drive the player at this index
    Control(usize),
    /// Open the booking widget
    Booking,
    /// Exit application
    Exit,
}
