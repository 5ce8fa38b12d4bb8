//! Remote video list

use crate::error::{Result, ShowreelError};
use crate::types::GalleryVideo;
use log::{info, warn};
use serde::Deserialize;

/// Build the per-category list URL
fn build_list_url(endpoint: &str, category_id: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}category={}",
        endpoint,
        separator,
        urlencoding::encode(category_id)
    )
}

/// The endpoint answers with either a bare array or a wrapped one
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<GalleryVideo>),
    Wrapped { videos: Vec<GalleryVideo> },
}

/// Decode HTML entities in a string
fn decode_html_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).to_string()
}

/// Parse a list response body
fn parse_list(body: &str) -> Result<Vec<GalleryVideo>> {
    let response: ListResponse = serde_json::from_str(body)?;
    let videos = match response {
        ListResponse::Bare(videos) => videos,
        ListResponse::Wrapped { videos } => videos,
    };

    Ok(videos
        .into_iter()
        .map(|mut v| {
            v.title = decode_html_entities(&v.title);
            v.description = v.description.as_deref().map(decode_html_entities);
            v
        })
        .collect())
}

/// Fetch the videos of one category. No retry, no cache.
pub async fn fetch_videos(
    client: &reqwest::Client,
    endpoint: &str,
    category_id: &str,
) -> Result<Vec<GalleryVideo>> {
    let url = build_list_url(endpoint, category_id);
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(ShowreelError::Network(format!(
            "HTTP {}: {}",
            response.status(),
            url
        )));
    }

    let body = response.text().await?;
    parse_list(&body)
}

/// Where a category's videos came from
#[derive(Debug, Clone, PartialEq)]
pub enum VideoList {
    Remote(Vec<GalleryVideo>),
    /// Endpoint failed; showing the local entries instead
    Demo(Vec<GalleryVideo>),
}

impl VideoList {
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }

    pub fn into_videos(self) -> Vec<GalleryVideo> {
        match self {
            Self::Remote(videos) | Self::Demo(videos) => videos,
        }
    }
}

/// Fetch a category, falling back to `demo` on any error
pub async fn fetch_or_demo(
    client: &reqwest::Client,
    endpoint: &str,
    category_id: &str,
    demo: Vec<GalleryVideo>,
) -> VideoList {
    match fetch_videos(client, endpoint, category_id).await {
        Ok(videos) => {
            info!("Fetched {} videos for {}", videos.len(), category_id);
            VideoList::Remote(videos)
        }
        Err(e) => {
            warn!("Video list for {} unavailable, showing demo content: {}", category_id, e);
            VideoList::Demo(demo)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_list_url() {
        assert_eq!(
            build_list_url("https://api.example.com/videos", "ads-vsl"),
            "https://api.example.com/videos?category=ads-vsl"
        );
        assert_eq!(
            build_list_url("https://api.example.com/videos?limit=4", "ads & vsl"),
            "https://api.example.com/videos?limit=4&category=ads%20%26%20vsl"
        );
    }

    #[test]
    fn test_parse_bare_and_wrapped() {
        let bare = r#"[{"_id":"1","title":"Tom &amp; Jerry","videoUrl":"/v/1.mp4"}]"#;
        let videos = parse_list(bare).unwrap();
        assert_eq!(videos[0].title, "Tom & Jerry");

        let wrapped = r#"{"videos":[{"_id":"2","title":"B","videoUrl":"https://youtu.be/dQw4w9WgXcQ","description":"&lt;3"}]}"#;
        let videos = parse_list(wrapped).unwrap();
        assert_eq!(videos[0].id, "2");
        assert_eq!(videos[0].description.as_deref(), Some("<3"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_list(r#"{"items":[]}"#).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let client = reqwest::Client::new();
        let demo = vec![GalleryVideo {
            id: "demo".into(),
            title: "Demo".into(),
            description: None,
            video_url: "/videos/demo.mp4".into(),
            poster: None,
            category: None,
            duration_secs: None,
        }];
        let list = fetch_or_demo(&client, "http://127.0.0.1:9/videos", "saas", demo.clone()).await;
        assert!(list.is_demo());
        assert_eq!(list.into_videos(), demo);
    }
}
