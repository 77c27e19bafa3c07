//! Command-line front end for tabio.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
