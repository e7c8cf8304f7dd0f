//! Common utilities and types shared across Media Gateway components.

#![warn(clippy::pedantic)]

/// Module for common configuration
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;
