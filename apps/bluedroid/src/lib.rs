//! # Bluedroid Library
//!
//! This library exposes the platform adapters and CLI commands for testing
//! and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod platform;

// Re-export bluedroid_core for convenience
pub use bluedroid_core;
