//! showreel - browse a video showcase in your terminal
//!
//! Resolves YouTube and file sources, and drives the gallery's players
//! against simulated media elements.

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use showreel::core::catalog::fetch_or_demo;
use showreel::core::decor::Jitter;
use showreel::core::embed::{check_reachable, EmbedFrame, EmbedPurpose, EmbedSignal};
use showreel::core::gallery::{
    Document, GalleryOptions, SimulatedBackend, ToggleOutcome, VideoGallery,
};
use showreel::core::media::{AutoplayPolicy, SimulatedScreen};
use showreel::core::player::SeekOutcome;
use showreel::core::youtube;
use showreel::storage::{catalog, config};
use showreel::types::{AppState, Aspect, Config, MenuItem, PlaybackPolicy};
use showreel::ui::{menu, render};
use showreel::utils::{logging, paths::ensure_app_dirs};

type Gallery = VideoGallery<SimulatedBackend>;

/// Browse a video showcase in your terminal.
#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Video URLs to resolve instead of opening the gallery
    #[arg(trailing_var_arg = true)]
    urls: Vec<String>,

    /// Category to open first
    #[arg(short, long)]
    category: Option<String>,

    /// Catalog file to load
    #[arg(long)]
    catalog: Option<String>,

    /// Only one video plays at a time
    #[arg(short = 'x', long)]
    exclusive: bool,

    /// Refuse unmuted playback, like a browser without a user gesture
    #[arg(long)]
    block_autoplay: bool,

    /// Skip network requests (video list, embed checks)
    #[arg(long)]
    offline: bool,

    /// Open the booking widget
    #[arg(short, long)]
    book: bool,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Player actions offered in the control menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    TogglePlay,
    ToggleMute,
    Seek,
    Advance,
    Fullscreen,
    OpenExternally,
    Back,
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Print descriptors for URLs given on the command line
fn print_resolved(urls: &[String]) {
    for url in urls {
        let (descriptor, degraded) = youtube::resolve_reported(url);
        println!("{}", url.bold());
        println!("  kind:     {:?}", descriptor.kind);
        println!("  playable: {}", descriptor.playable_url);
        if let Some(ref poster) = descriptor.poster_url {
            println!("  poster:   {}", poster);
        }
        if let Some(code) = degraded {
            println!("  {}", format!("{:?}: no video ID found, treated as a file", code).yellow());
        }
    }
}

/// Signal embed loads for the active items by checking they answer
async fn check_embeds(gallery: &mut Gallery, client: &reqwest::Client, cfg: &Config, offline: bool) {
    let timeout = Duration::from_secs(cfg.embed_timeout_secs);
    let targets: Vec<_> = gallery
        .items()
        .iter()
        .filter_map(|item| {
            let signals = item.embed_signals()?.clone();
            Some((item.frame()?.url().to_string(), signals))
        })
        .collect();

    for (url, signals) in targets {
        if offline {
            signals.emit(EmbedSignal::Load);
            continue;
        }
        let progress = spinner(format!("Loading embed {}", url));
        let outcome = check_reachable(client, &url, timeout).await;
        progress.finish_and_clear();
        match outcome {
            Ok(()) => signals.emit(EmbedSignal::Load),
            Err(e) => signals.emit(EmbedSignal::Error(e.to_string())),
        };
    }
    gallery.pump();
}

/// Pull the active category from the endpoint, if there is one
async fn refresh_active(
    gallery: &mut Gallery,
    screen: &mut SimulatedScreen,
    client: &reqwest::Client,
    cfg: &Config,
    offline: bool,
) {
    if let (Some(endpoint), false) = (cfg.endpoint.as_deref(), offline) {
        let category_id = gallery.selection().active_category_id.clone();
        let local = gallery
            .catalog()
            .group(&category_id)
            .map(|g| g.videos.clone())
            .unwrap_or_default();

        let list = fetch_or_demo(client, endpoint, &category_id, local).await;
        if list.is_demo() {
            println!("{}", "Showing demo content".dimmed());
        } else if let Err(e) = gallery.replace_videos(&category_id, list.into_videos()) {
            eprintln!("{} {}", "Error:".red(), e);
        }
    }
    if let Err(e) = gallery.release_detached(screen) {
        eprintln!("{} {}", "Error:".red(), e);
    }
    check_embeds(gallery, client, cfg, offline).await;
}

fn active_aspect(gallery: &Gallery) -> Aspect {
    gallery
        .active_category()
        .map(|c| c.aspect)
        .unwrap_or_default()
}

fn print_gallery(gallery: &Gallery) {
    let active = gallery.selection().active_category_id.clone();
    println!("\n{}\n", render::tab_bar(gallery.categories(), &active));

    if let Some(message) = gallery.empty_message() {
        println!("{}", message.yellow());
        println!("{}", "Check back later for new content.".dimmed());
        return;
    }

    let aspect = active_aspect(gallery);
    for (index, item) in gallery.items().iter().enumerate() {
        println!("{}\n", render::card(index, item, aspect));
    }
}

async fn apply_intent(
    gallery: &mut Gallery,
    screen: &mut SimulatedScreen,
    index: usize,
    intent: Intent,
) {
    match intent {
        Intent::TogglePlay => {
            if gallery.toggle_play_settled(index).await == ToggleOutcome::Blocked {
                println!("{}", "Playback was blocked. Unmute or select play again.".yellow());
            }
        }
        Intent::ToggleMute => {
            if let Some(controller) = gallery.item_mut(index).and_then(|i| i.controller_mut()) {
                controller.toggle_mute();
            }
        }
        Intent::Seek => {
            let Some(percent) = menu::prompt_percent("Seek to (%)") else {
                return;
            };
            if let Some(controller) = gallery.item_mut(index).and_then(|i| i.controller_mut()) {
                if controller.seek_to_fraction(percent / 100.0) == SeekOutcome::Ignored {
                    println!("{}", "Not ready to seek yet.".dimmed());
                }
            }
        }
        Intent::Advance => {
            if let Some(controller) = gallery.item(index).and_then(|i| i.controller()) {
                controller.media().advance(5.0);
            }
        }
        Intent::Fullscreen => {
            if let Err(e) = gallery.request_fullscreen(index, screen) {
                eprintln!("{} {}", "Error:".red(), e);
            }
        }
        Intent::OpenExternally => {
            if let Some(item) = gallery.item(index) {
                println!(
                    "{} {}",
                    "Open in a new tab:".green(),
                    youtube::fallback_url(item.descriptor())
                );
            }
        }
        Intent::Back => {}
    }
    gallery.pump();
}

fn control_menu(gallery: &Gallery, index: usize) -> Vec<MenuItem<Intent>> {
    let item = |label: &str, value| MenuItem {
        label: label.into(),
        value,
    };

    let Some(controller) = gallery.item(index).and_then(|i| i.controller()) else {
        return vec![
            item("🔗 Open in a new tab", Intent::OpenExternally),
            item("⬅ Back", Intent::Back),
        ];
    };

    let state = controller.state();
    vec![
        item(if state.is_playing { "❚❚ Pause" } else { "▶ Play" }, Intent::TogglePlay),
        item(if state.is_muted { "🔊 Unmute" } else { "🔇 Mute" }, Intent::ToggleMute),
        item("⇥ Seek", Intent::Seek),
        item("⏩ Advance 5s", Intent::Advance),
        item(
            if state.is_fullscreen { "⛶ Exit fullscreen" } else { "⛶ Fullscreen" },
            Intent::Fullscreen,
        ),
        item("⬅ Back", Intent::Back),
    ]
}

async fn open_booking(client: &reqwest::Client, cfg: &Config, offline: bool) {
    let timeout = Duration::from_secs(cfg.embed_timeout_secs);
    let (mut frame, signals) =
        EmbedFrame::mount(&cfg.booking_url, &cfg.booking_url, EmbedPurpose::Booking, timeout);

    if offline {
        signals.emit(EmbedSignal::Load);
    } else {
        let progress = spinner("Loading calendar...".into());
        match check_reachable(client, &cfg.booking_url, timeout).await {
            Ok(()) => signals.emit(EmbedSignal::Load),
            Err(e) => signals.emit(EmbedSignal::Error(e.to_string())),
        };
        progress.finish_and_clear();
    }

    match frame.wait_loaded().await {
        Ok(()) => println!("{} {}", "Live booking:".green(), frame.url()),
        Err(_) => {
            if let Some(message) = frame.fallback_message() {
                println!("{}", message.yellow());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Ensure app directories exist
    ensure_app_dirs().await?;

    // Handle --edit flag
    if cli.edit {
        let cfg = config::load_config().await?;
        config::edit_config(&cfg.editor).await?;
        return Ok(());
    }

    // Handle URL arguments
    if !cli.urls.is_empty() {
        print_resolved(&cli.urls);
        return Ok(());
    }

    let cfg = config::load_config().await?;
    let client = reqwest::Client::new();

    if cli.book {
        open_booking(&client, &cfg, cli.offline).await;
        return Ok(());
    }

    let catalog_path = cli.catalog.clone().unwrap_or_else(|| cfg.catalog_path.clone());
    let catalog = catalog::load_catalog(&catalog_path).await?;

    let options = GalleryOptions {
        policy: if cli.exclusive {
            PlaybackPolicy::Exclusive
        } else {
            cfg.playback_policy
        },
        embed_timeout: Duration::from_secs(cfg.embed_timeout_secs),
    };
    let backend = SimulatedBackend {
        autoplay: if cli.block_autoplay {
            AutoplayPolicy::BlockUnmuted
        } else {
            AutoplayPolicy::Allow
        },
        ..SimulatedBackend::default()
    };
    let initial = cli.category.clone().unwrap_or_else(|| cfg.default_category.clone());

    let document = Document::default();
    let mut screen = SimulatedScreen::new(document.fullscreen.clone());
    let mut gallery = VideoGallery::new(catalog, backend, &document, options, &initial)?;

    let mut jitter = Jitter::new(cfg.decor_seed);
    println!("{}", render::header(&mut jitter));
    println!("{}", render::tags(&mut jitter, gallery.categories()));
    refresh_active(&mut gallery, &mut screen, &client, &cfg, cli.offline).await;

    // State machine
    let mut state = AppState::Browse;

    while state != AppState::Exit {
        match state {
            AppState::Tabs => {
                let menu_items: Vec<MenuItem<String>> = gallery
                    .categories()
                    .map(|c| MenuItem {
                        label: c.name.clone(),
                        value: c.id.clone(),
                    })
                    .collect();

                state = match menu::select(&menu_items, "Select Category") {
                    Some(id) => {
                        match gallery.select_category(&id) {
                            Ok(true) => refresh_active(&mut gallery, &mut screen, &client, &cfg, cli.offline).await,
                            Ok(false) => {}
                            Err(e) => eprintln!("{} {}", "Error:".red(), e),
                        }
                        AppState::Browse
                    }
                    None => AppState::Exit,
                };
            }

            AppState::Browse => {
                print_gallery(&gallery);

                let mut menu_items: Vec<MenuItem<AppState>> = gallery
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(i, item)| MenuItem {
                        label: format!("🎬 {}", item.video().title),
                        value: AppState::Control(i),
                    })
                    .collect();
                menu_items.push(MenuItem { label: "🗂  Switch category".into(), value: AppState::Tabs });
                menu_items.push(MenuItem { label: "📅 Book a call".into(), value: AppState::Booking });
                menu_items.push(MenuItem { label: "👋 Quit".into(), value: AppState::Exit });

                state = menu::select(&menu_items, "Select Video").unwrap_or(AppState::Exit);
            }

            AppState::Control(index) => {
                let Some(item) = gallery.item(index) else {
                    state = AppState::Browse;
                    continue;
                };
                println!("\n{}\n", render::card(index, item, active_aspect(&gallery)));

                let intent = menu::select(&control_menu(&gallery, index), "Player")
                    .unwrap_or(Intent::Back);
                if intent == Intent::Back {
                    state = AppState::Browse;
                    continue;
                }
                apply_intent(&mut gallery, &mut screen, index, intent).await;
            }

            AppState::Booking => {
                open_booking(&client, &cfg, cli.offline).await;
                state = AppState::Browse;
            }

            AppState::Exit => break,
        }
    }

    println!("👋 Thanks for watching.");
    Ok(())
}
