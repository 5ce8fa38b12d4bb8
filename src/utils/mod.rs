//! Utilities: paths, logging

pub mod logging;
pub mod paths;
