//! Declaration parsers and cross-file resolution for Reflector.
//!
//! This crate provides:
//! - [`Session`] - Process-scoped parse state: graph, units, and diagnostics
//! - [`HeaderParser`] - The per-file declaration parser
//! - [`parse_module`] / [`parse_header`] - Dependency-ordered parsing
//! - [`fixup`] - Delegate property binding after a file is read
//! - [`validate`] - Property markup and interface conformance checks
//! - [`doc_policy`] - Documentation policy warnings
//! - `snapshot` - `MessagePack` snapshots of a parsed session (feature `serde`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod directive;
pub mod doc_policy;
pub mod fixup;
pub mod header;
mod nest;
pub mod resolver;
pub mod session;
#[cfg(feature = "serde")]
pub mod snapshot;
pub mod validate;

pub use header::{HeaderParser, Specifier};
pub use resolver::{CompilationResult, Prescan, parse_header, parse_module, prescan, resolve};
pub use session::Session;
