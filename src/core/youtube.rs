//! YouTube URL detection and source resolution

use crate::error::ErrorCode;
use crate::types::{VideoDescriptor, VideoKind, VideoSource};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

const EMBED_PARAMS: &str = "autoplay=0&controls=1&modestbranding=1&rel=0";

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:youtube\.com/(?:shorts/|watch\?v=)|youtu\.be/)([^"&?/\s]{11})"#)
        .expect("Invalid regex")
});

/// Build YouTube embed URL from video ID
pub fn build_embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{}?{}", video_id, EMBED_PARAMS)
}

/// Build YouTube watch URL from video ID
pub fn build_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Build YouTube thumbnail URL from video ID
pub fn build_thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// Extract the 11-character video ID from a watch, shorts or youtu.be URL
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether the URL superficially points at YouTube
pub fn looks_like_youtube(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Short-form heuristic. Cosmetic only.
pub fn is_short_form(url: &str) -> bool {
    url.contains("/shorts/") || url.contains("youtu.be/")
}

/// Resolve a raw URL into a descriptor.
///
/// Pure: the same input always yields the same descriptor. YouTube-looking
/// URLs with no extractable ID degrade to a native file.
pub fn resolve(url: &str) -> VideoDescriptor {
    resolve_reported(url).0
}

/// Like [`resolve`], also reporting whether the result was degraded
pub fn resolve_reported(url: &str) -> (VideoDescriptor, Option<ErrorCode>) {
    if let Some(id) = extract_video_id(url) {
        let kind = if is_short_form(url) {
            VideoKind::YouTubeShort
        } else {
            VideoKind::YouTubeStandard
        };
        let descriptor = VideoDescriptor {
            kind,
            playable_url: build_embed_url(id),
            poster_url: Some(build_thumbnail_url(id)),
            video_id: Some(id.to_string()),
        };
        return (descriptor, None);
    }

    let degraded = looks_like_youtube(url);
    if degraded {
        debug!("No video ID in YouTube-looking URL, treating as file: {}", url);
    }

    let descriptor = VideoDescriptor {
        kind: VideoKind::NativeFile,
        playable_url: url.to_string(),
        poster_url: None,
        video_id: None,
    };
    (descriptor, degraded.then_some(ErrorCode::ResolutionDegraded))
}

/// Resolve a configured source, carrying its poster for native files
pub fn resolve_source(source: &VideoSource) -> VideoDescriptor {
    let mut descriptor = resolve(&source.url);
    if descriptor.kind == VideoKind::NativeFile {
        descriptor.poster_url = source.poster.clone();
    }
    descriptor
}

/// URL to offer when an embed cannot be shown inline
pub fn fallback_url(descriptor: &VideoDescriptor) -> String {
    match descriptor.video_id {
        Some(ref id) => build_watch_url(id),
        None => descriptor.playable_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url_is_standard() {
        let d = resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42");
        assert_eq!(d.kind, VideoKind::YouTubeStandard);
        assert_eq!(
            d.playable_url,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=0&controls=1&modestbranding=1&rel=0"
        );
        assert_eq!(d.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_short_link_and_shorts_path_are_short() {
        let d = resolve("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(d.kind, VideoKind::YouTubeShort);
        assert!(d.playable_url.contains("/embed/dQw4w9WgXcQ?"));

        let d = resolve("https://youtube.com/shorts/abcdefghijk");
        assert_eq!(d.kind, VideoKind::YouTubeShort);
        assert!(d.playable_url.contains("/embed/abcdefghijk?"));
    }

    #[test]
    fn test_local_file_passes_through() {
        let d = resolve("/videos/case-study.mp4");
        assert_eq!(d.kind, VideoKind::NativeFile);
        assert_eq!(d.playable_url, "/videos/case-study.mp4");
        assert!(d.video_id.is_none());
    }

    #[test]
    fn test_empty_url_is_unplayable_native() {
        let d = resolve("");
        assert_eq!(d.kind, VideoKind::NativeFile);
        assert!(!d.is_playable());
    }

    #[test]
    fn test_youtube_without_id_degrades() {
        let url = "https://www.youtube.com/channel/UCxyz";
        let (d, code) = resolve_reported(url);
        assert_eq!(d.kind, VideoKind::NativeFile);
        assert_eq!(d.playable_url, url);
        assert_eq!(code, Some(ErrorCode::ResolutionDegraded));

        let (_, code) = resolve_reported("https://youtu.be/short");
        assert_eq!(code, Some(ErrorCode::ResolutionDegraded));
    }

    #[test]
    fn test_resolve_is_pure() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "/videos/a.mp4",
            "https://youtube.com/watch",
            "",
        ] {
            assert_eq!(resolve(url), resolve(url));
        }
    }

    #[test]
    fn test_fallback_is_watch_url() {
        let d = resolve("https://youtube.com/shorts/abcdefghijk");
        assert_eq!(fallback_url(&d), "https://www.youtube.com/watch?v=abcdefghijk");
        let d = resolve("/videos/a.mp4");
        assert_eq!(fallback_url(&d), "/videos/a.mp4");
    }

    #[test]
    fn test_native_source_keeps_poster() {
        let source = VideoSource {
            url: "/videos/a.mp4".into(),
            poster: Some("/posters/a.jpg".into()),
        };
        assert_eq!(resolve_source(&source).poster_url.as_deref(), Some("/posters/a.jpg"));

        let source = VideoSource {
            url: "https://youtu.be/dQw4w9WgXcQ".into(),
            poster: Some("/posters/ignored.jpg".into()),
        };
        assert_eq!(
            resolve_source(&source).poster_url.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }
}
