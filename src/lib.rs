//! showreel library
//!
//! Video source resolution, native playback control and the category
//! gallery behind the `showreel` CLI.

pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
