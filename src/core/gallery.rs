//! Category-filtered video gallery
//!
//! The gallery owns no playback state of its own. Each visible item gets its
//! own controller (native files) or embed frame (YouTube). Switching category
//! unmounts every item and mounts the new set fresh.

use crate::core::embed::{EmbedFrame, EmbedPurpose, EmbedSignal};
use crate::core::listeners::{EventHub, Subscription};
use crate::core::media::{
    AutoplayPolicy, ContainerId, FullscreenChange, FullscreenHost, MediaElement, SimulatedMedia,
};
use crate::core::player::{PendingPlay, PlaybackController};
use crate::core::protection::{ContentGuard, KeyPress, ShortcutDeterrent};
use crate::core::youtube;
use crate::error::{Result, ShowreelError};
use crate::types::{
    Catalog, Category, CategorySelection, GalleryVideo, PlaybackPolicy, VideoDescriptor,
};
use log::{debug, info, warn};
use std::time::Duration;

/// Creates media elements for native items
pub trait MediaBackend {
    type Element: MediaElement;

    fn mount(&self, video: &GalleryVideo, descriptor: &VideoDescriptor) -> Self::Element;

    /// Called once the element's controller is listening
    fn start_loading(&self, _element: &Self::Element, _video: &GalleryVideo) {}
}

/// Backend handing out [`SimulatedMedia`] that loads immediately
#[derive(Debug, Clone, Copy)]
pub struct SimulatedBackend {
    pub autoplay: AutoplayPolicy,
    /// Used when a video does not say how long it is
    pub default_duration: f64,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            autoplay: AutoplayPolicy::Allow,
            default_duration: 60.0,
        }
    }
}

impl MediaBackend for SimulatedBackend {
    type Element = SimulatedMedia;

    fn mount(&self, _video: &GalleryVideo, _descriptor: &VideoDescriptor) -> SimulatedMedia {
        SimulatedMedia::new(self.autoplay)
    }

    fn start_loading(&self, element: &SimulatedMedia, video: &GalleryVideo) {
        element.load(video.duration_secs.unwrap_or(self.default_duration));
    }
}

/// Page-level event targets the gallery attaches to
#[derive(Clone, Default)]
pub struct Document {
    pub keydown: EventHub<KeyPress>,
    pub fullscreen: EventHub<FullscreenChange>,
}

#[derive(Debug, Clone, Copy)]
pub struct GalleryOptions {
    pub policy: PlaybackPolicy,
    pub embed_timeout: Duration,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            policy: PlaybackPolicy::default(),
            embed_timeout: Duration::from_secs(10),
        }
    }
}

/// How a mounted item plays
pub enum ItemPlayer<M: MediaElement> {
    Native {
        controller: PlaybackController<M>,
        fullscreen: Subscription<FullscreenChange>,
        _guard: ContentGuard,
    },
    Embed {
        frame: EmbedFrame,
        signals: EventHub<EmbedSignal>,
    },
    /// Empty source, nothing to render
    Unplayable,
}

/// One mounted card
pub struct GalleryItem<M: MediaElement> {
    video: GalleryVideo,
    descriptor: VideoDescriptor,
    player: ItemPlayer<M>,
}

impl<M: MediaElement> GalleryItem<M> {
    pub fn video(&self) -> &GalleryVideo {
        &self.video
    }

    pub fn descriptor(&self) -> &VideoDescriptor {
        &self.descriptor
    }

    pub fn player(&self) -> &ItemPlayer<M> {
        &self.player
    }

    pub fn controller(&self) -> Option<&PlaybackController<M>> {
        match self.player {
            ItemPlayer::Native { ref controller, .. } => Some(controller),
            _ => None,
        }
    }

    pub fn controller_mut(&mut self) -> Option<&mut PlaybackController<M>> {
        match self.player {
            ItemPlayer::Native { ref mut controller, .. } => Some(controller),
            _ => None,
        }
    }

    pub fn frame(&self) -> Option<&EmbedFrame> {
        match self.player {
            ItemPlayer::Embed { ref frame, .. } => Some(frame),
            _ => None,
        }
    }

    pub fn frame_mut(&mut self) -> Option<&mut EmbedFrame> {
        match self.player {
            ItemPlayer::Embed { ref mut frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Signal target of an embed, for whoever observes the frame's load
    pub fn embed_signals(&self) -> Option<&EventHub<EmbedSignal>> {
        match self.player {
            ItemPlayer::Embed { ref signals, .. } => Some(signals),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.controller().is_some_and(|c| c.state().is_playing)
    }

    pub fn is_loading(&self) -> bool {
        match self.player {
            ItemPlayer::Native { ref controller, .. } => controller.state().is_loading,
            ItemPlayer::Embed { ref frame, .. } => frame.is_loading(),
            ItemPlayer::Unplayable => false,
        }
    }

    fn pump(&mut self) {
        match self.player {
            ItemPlayer::Native {
                ref mut controller,
                ref mut fullscreen,
                ..
            } => {
                controller.pump();
                for change in fullscreen.drain() {
                    controller.on_fullscreen_change(change);
                }
            }
            ItemPlayer::Embed { ref mut frame, .. } => frame.pump(),
            ItemPlayer::Unplayable => {}
        }
    }
}

/// What a settled toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Playing,
    Paused,
    /// The play request was refused and the item reverted to paused
    Blocked,
    /// Embeds and unplayable items
    Ignored,
}

/// A play started through the gallery, tied to the mount it came from
pub struct GalleryPending {
    epoch: u64,
    index: usize,
    pending: PendingPlay,
}

pub struct VideoGallery<B: MediaBackend> {
    backend: B,
    catalog: Catalog,
    selection: CategorySelection,
    options: GalleryOptions,
    items: Vec<GalleryItem<B::Element>>,
    /// Bumped on every remount
    epoch: u64,
    next_container: u64,
    /// Containers of unmounted native items, not yet released on the host
    detached: Vec<ContainerId>,
    fullscreen: EventHub<FullscreenChange>,
    _deterrent: ShortcutDeterrent,
}

impl<B: MediaBackend> VideoGallery<B> {
    /// Mount the gallery on `initial_category`, or the first category if absent
    pub fn new(
        catalog: Catalog,
        backend: B,
        document: &Document,
        options: GalleryOptions,
        initial_category: &str,
    ) -> Result<Self> {
        let Some(first) = catalog.groups.first() else {
            return Err(ShowreelError::EmptyCatalog);
        };

        let active = if catalog.group(initial_category).is_some() {
            initial_category.to_string()
        } else {
            warn!(
                "Category {} not in catalog, starting on {}",
                initial_category, first.category.id
            );
            first.category.id.clone()
        };

        let mut gallery = Self {
            backend,
            catalog,
            selection: CategorySelection {
                active_category_id: active,
            },
            options,
            items: Vec::new(),
            epoch: 0,
            next_container: 0,
            detached: Vec::new(),
            fullscreen: document.fullscreen.clone(),
            _deterrent: ShortcutDeterrent::attach(&document.keydown),
        };
        gallery.mount_active();
        Ok(gallery)
    }

    fn mount_active(&mut self) {
        let videos = self
            .catalog
            .group(&self.selection.active_category_id)
            .map(|g| g.videos.clone())
            .unwrap_or_default();

        self.items = videos.into_iter().map(|video| self.mount_item(video)).collect();

        for item in &self.items {
            if let ItemPlayer::Native { ref controller, .. } = item.player {
                self.backend.start_loading(controller.media(), &item.video);
            }
        }
        self.pump();
    }

    fn unmount(&mut self) {
        self.detached.extend(
            self.items
                .iter()
                .filter_map(|item| item.controller().map(|c| c.container())),
        );
        self.items.clear();
        self.epoch += 1;
    }

    fn mount_item(&mut self, video: GalleryVideo) -> GalleryItem<B::Element> {
        let descriptor = youtube::resolve_source(&video.source());

        let player = if !descriptor.is_playable() {
            debug!("Nothing playable for {}", video.id);
            ItemPlayer::Unplayable
        } else if descriptor.kind.is_embed() {
            let (frame, signals) = EmbedFrame::mount(
                descriptor.playable_url.clone(),
                youtube::fallback_url(&descriptor),
                EmbedPurpose::Video(descriptor.kind),
                self.options.embed_timeout,
            );
            ItemPlayer::Embed { frame, signals }
        } else {
            let element = self.backend.mount(&video, &descriptor);
            let container = ContainerId(self.next_container);
            self.next_container += 1;
            let guard = ContentGuard::attach(&element);
            ItemPlayer::Native {
                controller: PlaybackController::new(element, container),
                fullscreen: self.fullscreen.subscribe(),
                _guard: guard,
            }
        };

        GalleryItem {
            video,
            descriptor,
            player,
        }
    }

    /// Switch tabs. Returns whether anything was remounted.
    pub fn select_category(&mut self, category_id: &str) -> Result<bool> {
        if self.catalog.group(category_id).is_none() {
            return Err(ShowreelError::UnknownCategory(category_id.to_string()));
        }
        if self.selection.active_category_id == category_id {
            return Ok(false);
        }

        // Drop the old players before mounting new ones
        self.unmount();
        self.selection.active_category_id = category_id.to_string();
        info!("Showing category {}", category_id);
        self.mount_active();
        Ok(true)
    }

    /// Swap in a fresh video list for a category, remounting if it is active
    pub fn replace_videos(&mut self, category_id: &str, videos: Vec<GalleryVideo>) -> Result<()> {
        let Some(group) = self
            .catalog
            .groups
            .iter_mut()
            .find(|g| g.category.id == category_id)
        else {
            return Err(ShowreelError::UnknownCategory(category_id.to_string()));
        };
        group.videos = videos;

        if self.selection.active_category_id == category_id {
            self.unmount();
            self.mount_active();
        }
        Ok(())
    }

    /// Toggle one item. Embeds control themselves, so they pass through.
    pub fn toggle_play(&mut self, index: usize) -> Option<GalleryPending> {
        let starting = match self.items.get(index)?.player {
            ItemPlayer::Native { ref controller, .. } => !controller.state().is_playing,
            ItemPlayer::Embed { .. } => {
                debug!("Item {} is an embed; playback is up to the frame", index);
                return None;
            }
            ItemPlayer::Unplayable => return None,
        };

        if starting && self.options.policy == PlaybackPolicy::Exclusive {
            for (i, item) in self.items.iter_mut().enumerate() {
                if i == index || !item.is_playing() {
                    continue;
                }
                if let Some(other) = item.controller_mut() {
                    other.toggle_play();
                }
            }
        }

        let pending = self.items.get_mut(index)?.controller_mut()?.toggle_play()?;
        Some(GalleryPending {
            epoch: self.epoch,
            index,
            pending,
        })
    }

    /// Wait for a play started with [`toggle_play`](Self::toggle_play)
    pub async fn settle(&mut self, pending: GalleryPending) {
        if pending.epoch != self.epoch {
            debug!("Dropping play outcome for an unmounted item");
            return;
        }
        if let Some(controller) = self
            .items
            .get_mut(pending.index)
            .and_then(|item| item.controller_mut())
        {
            controller.await_play(pending.pending).await;
        }
    }

    /// Toggle and wait for the outcome
    pub async fn toggle_play_settled(&mut self, index: usize) -> ToggleOutcome {
        if self.item(index).and_then(|item| item.controller()).is_none() {
            return ToggleOutcome::Ignored;
        }
        let Some(pending) = self.toggle_play(index) else {
            return ToggleOutcome::Paused;
        };
        self.settle(pending).await;

        if self.item(index).is_some_and(|item| item.is_playing()) {
            ToggleOutcome::Playing
        } else {
            ToggleOutcome::Blocked
        }
    }

    /// Let the host drop fullscreen held by an unmounted item
    pub fn release_detached<H: FullscreenHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        for container in std::mem::take(&mut self.detached) {
            host.release(container)
                .map_err(|e| ShowreelError::Fullscreen(e.to_string()))?;
        }
        self.pump();
        Ok(())
    }

    pub fn request_fullscreen<H: FullscreenHost + ?Sized>(
        &mut self,
        index: usize,
        host: &mut H,
    ) -> Result<()> {
        self.release_detached(host)?;
        let outcome = match self.items.get_mut(index).and_then(|item| item.controller_mut()) {
            Some(controller) => controller.request_fullscreen(host),
            None => Ok(()),
        };
        self.pump();
        outcome
    }

    /// Apply queued element, fullscreen and embed events
    pub fn pump(&mut self) {
        for item in &mut self.items {
            item.pump();
        }
    }

    pub fn items(&self) -> &[GalleryItem<B::Element>] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&GalleryItem<B::Element>> {
        self.items.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut GalleryItem<B::Element>> {
        self.items.get_mut(index)
    }

    pub fn playing_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_playing()).count()
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    pub fn active_category(&self) -> Option<&Category> {
        self.catalog
            .group(&self.selection.active_category_id)
            .map(|g| &g.category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.catalog.categories()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> PlaybackPolicy {
        self.options.policy
    }

    /// Placeholder text for a category with no videos
    pub fn empty_message(&self) -> Option<String> {
        if !self.items.is_empty() {
            return None;
        }
        let name = self
            .active_category()
            .map(|c| c.name.as_str())
            .unwrap_or("this");
        Some(format!(
            "No Videos Available. There are no videos in the {} category yet.",
            name
        ))
    }
}
