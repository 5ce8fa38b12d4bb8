//! Terminal UI: rendering and menus

pub mod menu;
pub mod render;
