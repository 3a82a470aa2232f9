//! Unitdeck Daemon Library
//!
//! This crate provides the core functionality for the unitdeck daemon, the
//! backend of a web control panel for a host's systemd service manager. It
//! executes service inventory, lifecycle, and unit-file operations requested
//! via Unix socket.

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod inventory;
pub mod protocol;
pub mod runner;
pub mod socket;
pub mod update;
pub mod validation;
