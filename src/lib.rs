//! camview library crate.
//!
//! This module exposes the viewer components for the binary and for
//! integration testing.

pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod input;
pub mod mailbox;
pub mod menu;
pub mod permissions;
pub mod render;
pub mod viewer;
