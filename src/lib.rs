//! anime-motion library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod leonardo;
pub mod pipeline;
