//! Integration tests for Layer 2: Model
//!
//! Tests for the type graph, property types, specifier registries, and
//! source units.

mod graph;
mod properties;
mod source_units;
mod specifiers;
