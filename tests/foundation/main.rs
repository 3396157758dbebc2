//! Integration tests for Layer 0: Foundation
//!
//! Tests for errors, diagnostics, metadata maps, and configuration.

mod config;
mod diagnostics;
mod errors;
mod metadata;
