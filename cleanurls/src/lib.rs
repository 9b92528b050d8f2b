// cleanurls/src/lib.rs
//! # cleanurls CLI Application
//!
//! This crate provides the command-line interface on top of `clearurls-core`:
//! cleaning URLs, generating embedded provider sets and checking rule sources.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use cli::{Cli, Commands};
