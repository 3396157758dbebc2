//! Reflector: annotation-driven reflection compiler front end
//!
//! This crate re-exports all layers of the Reflector system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: reflector_parser     Declaration parsers, fixup, validation, resolver
//! Layer 2: reflector_model      Type graph, property model, specifier registries
//! Layer 1: reflector_syntax     Lexer, token stream, comment formatting
//! Layer 0: reflector_foundation Errors, diagnostics, metadata, configuration
//! ```

pub use reflector_foundation as foundation;
pub use reflector_model as model;
pub use reflector_parser as parser;
pub use reflector_syntax as syntax;
