//! Integration tests for Layer 3: Parser
//!
//! Tests for multi-header modules, dependency ordering, failure
//! propagation, and graph snapshots.

mod enums;
mod modules;
mod snapshot;
mod structs;
