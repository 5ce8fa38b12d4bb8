//! Terminal rendering of the gallery chrome

use crate::core::decor::Jitter;
use crate::core::embed::EmbedState;
use crate::core::gallery::{GalleryItem, ItemPlayer};
use crate::core::media::MediaElement;
use crate::types::{Aspect, Badge, Category};
use colored::{ColoredString, Colorize};

const BAR_WIDTH: usize = 30;

/// Format seconds as "m:ss"
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "--:--".into();
    }
    let total = seconds as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Filled/unfilled progress bar, `width` cells wide
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "{}{}",
        "━".repeat(filled).blue(),
        "─".repeat(width - filled).dimmed()
    )
}

/// A line of sparkles scattered by `jitter`
pub fn starfield(jitter: &mut Jitter, width: usize, count: usize) -> String {
    let mut cells = vec![' '; width];
    for particle in jitter.particles(count) {
        let column = ((particle.left_percent / 100.0) * width as f64) as usize;
        if let Some(cell) = cells.get_mut(column) {
            *cell = if particle.delay_secs < 7.5 { '✦' } else { '·' };
        }
    }
    cells.into_iter().collect()
}

pub fn badge(badge: Badge) -> Option<ColoredString> {
    match badge {
        Badge::None => None,
        Badge::YouTube => Some(" YouTube ".white().bold().on_red()),
        Badge::Shorts => Some(" SHORTS ".white().bold().on_magenta()),
    }
}

/// Category tabs with the active one highlighted
pub fn tab_bar<'a>(categories: impl Iterator<Item = &'a Category>, active: &str) -> String {
    categories
        .map(|c| {
            let label = format!(" {} ", c.name);
            if c.id == active {
                label.white().bold().on_blue().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn header(jitter: &mut Jitter) -> String {
    let stars = starfield(jitter, 48, 10);
    format!(
        "{}\n{}\n{}\n{}",
        stars.blue(),
        "OUR WORK".blue().bold(),
        format!("Some of our {}", "featured projects".cyan().bold()),
        "Explore our work across different platforms and formats".dimmed()
    )
}

/// Floating category tags, each offset by its pulse delay
pub fn tags<'a>(jitter: &mut Jitter, categories: impl Iterator<Item = &'a Category>) -> String {
    categories
        .map(|c| {
            let offset = (jitter.tag_delay() * 2.0).round() as usize;
            format!("{}{}", " ".repeat(offset), format!(" {} ", c.name).black().on_cyan())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn aspect_label(aspect: Aspect) -> &'static str {
    match aspect {
        Aspect::Horizontal => "16:9",
        Aspect::Vertical => "9:16",
    }
}

/// One gallery card
pub fn card<M: MediaElement>(index: usize, item: &GalleryItem<M>, aspect: Aspect) -> String {
    let video = item.video();
    let mut title = format!("[{}] {}", index + 1, video.title.bold());
    if let Some(b) = badge(item.descriptor().badge()) {
        title = format!("{} {}", title, b);
    }
    if item.is_playing() {
        title = format!("{} {}", title, "● PLAYING".blue());
    }
    title = format!("{} {}", title, aspect_label(aspect).dimmed());

    let mut lines = vec![title];
    if let Some(ref description) = video.description {
        lines.push(format!("    {}", description.dimmed()));
    }

    let status = match item.player() {
        ItemPlayer::Native { controller, .. } => {
            let state = controller.state();
            if state.is_loading {
                "loading...".dimmed().to_string()
            } else {
                let media = controller.media();
                format!(
                    "{} {} {} / {} {}{}",
                    if state.is_playing { "❚❚" } else { "▶" },
                    progress_bar(state.progress_percent, BAR_WIDTH),
                    format_time(media.current_time()),
                    format_time(media.duration()),
                    if state.is_muted { "🔇" } else { "🔊" },
                    if state.is_fullscreen { " ⛶" } else { "" },
                )
            }
        }
        ItemPlayer::Embed { frame, .. } => match frame.state() {
            EmbedState::Loading => format!("{} {}", "embed loading...".dimmed(), frame.url()),
            EmbedState::Loaded => format!("embedded player: {}", frame.url()),
            EmbedState::Failed { .. } => frame
                .fallback_message()
                .unwrap_or_default()
                .yellow()
                .to_string(),
        },
        ItemPlayer::Unplayable => "no playable source".dimmed().to_string(),
    };
    lines.push(format!("    {}", status));

    lines.join("\n")
}
