//! Local catalog file and the built-in demo catalog

use crate::error::{Result, ShowreelError};
use crate::types::{Aspect, Catalog, Category, CategoryGroup, GalleryVideo};
use crate::utils::paths::{ensure_dir, get_catalog_path};
use log::info;
use std::path::Path;
use tokio::fs;

fn category(id: &str, name: &str, aspect: Aspect) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        aspect,
    }
}

fn demo_video(id: &str, title: &str, url: &str, duration_secs: Option<f64>) -> GalleryVideo {
    GalleryVideo {
        id: id.into(),
        title: title.into(),
        description: None,
        video_url: url.into(),
        poster: None,
        category: None,
        duration_secs,
    }
}

/// Showcase categories with a few sample entries each
pub fn demo_catalog() -> Catalog {
    Catalog {
        groups: vec![
            CategoryGroup {
                category: category("youtube", "YouTube", Aspect::Horizontal),
                videos: vec![
                    demo_video(
                        "yt-1",
                        "Channel trailer",
                        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                        None,
                    ),
                    demo_video("yt-2", "Long-form edit", "/videos/long-form.mp4", Some(94.0)),
                ],
            },
            CategoryGroup {
                category: category("shorts", "Shorts", Aspect::Vertical),
                videos: vec![
                    demo_video("sh-1", "Hook in 3s", "https://youtube.com/shorts/abcdefghijk", None),
                    demo_video("sh-2", "Podcast clip", "https://youtu.be/dQw4w9WgXcQ", None),
                    demo_video("sh-3", "Reel cut", "/videos/reel-cut.mp4", Some(28.0)),
                ],
            },
            CategoryGroup {
                category: category("saas", "SaaS", Aspect::Horizontal),
                videos: vec![
                    demo_video("saas-1", "Product walkthrough", "/videos/walkthrough.mp4", Some(75.0)),
                    demo_video("saas-2", "Feature launch", "/videos/launch.mp4", Some(42.0)),
                ],
            },
            CategoryGroup {
                category: category("ads-vsl", "Ads & VSL", Aspect::Horizontal),
                videos: vec![demo_video("ads-1", "Case study", "/videos/case-study.mp4", Some(60.0))],
            },
        ],
    }
}

/// Load a catalog file
pub async fn load_catalog_from(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path).await?;
    let catalog: Catalog = serde_json::from_str(&content)?;
    if catalog.groups.is_empty() {
        return Err(ShowreelError::EmptyCatalog);
    }
    Ok(catalog)
}

/// Pick the catalog: explicit path, then the default file, then the demo
pub async fn load_catalog(explicit: &str) -> Result<Catalog> {
    if !explicit.is_empty() {
        return load_catalog_from(Path::new(explicit)).await;
    }

    let default_path = get_catalog_path();
    if Path::new(&default_path).exists() {
        info!("Loading catalog from {}", default_path);
        return load_catalog_from(Path::new(&default_path)).await;
    }

    info!("No catalog file, using demo catalog");
    Ok(demo_catalog())
}

/// Save a catalog file
pub async fn save_catalog_to(path: &Path, catalog: &Catalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(&parent.to_string_lossy()).await?;
    }
    let content = serde_json::to_string_pretty(catalog)?;
    fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_catalog_categories() {
        let catalog = demo_catalog();
        let ids: Vec<&str> = catalog.categories().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["youtube", "shorts", "saas", "ads-vsl"]);
        assert_eq!(catalog.group("shorts").unwrap().category.aspect, Aspect::Vertical);
    }

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        save_catalog_to(&path, &demo_catalog()).await.unwrap();
        assert_eq!(load_catalog_from(&path).await.unwrap(), demo_catalog());
        assert_eq!(
            load_catalog(&path.to_string_lossy()).await.unwrap(),
            demo_catalog()
        );
    }

    #[tokio::test]
    async fn test_empty_catalog_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"groups":[]}"#).await.unwrap();
        assert!(matches!(
            load_catalog_from(&path).await,
            Err(ShowreelError::EmptyCatalog)
        ));
    }
}
