//! Storage modules: config, catalog

pub mod catalog;
pub mod config;
