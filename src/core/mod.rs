//! Core: source resolution, playback control, gallery composition

pub mod catalog;
pub mod decor;
pub mod embed;
pub mod gallery;
pub mod listeners;
pub mod media;
pub mod player;
pub mod protection;
pub mod youtube;
