#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for brisk.
//!
//! This crate provides pure helper functions with no logging/tracing dependencies.
//! Logging is handled by the embedding binary to keep this library lightweight.

pub mod paths;
