//! Command-line interface definitions and helpers.
//!
//! This module contains the CLI argument parsing and subcommand handlers.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction};
pub use commands::{apply_overrides, handle_config_action, list_devices};
