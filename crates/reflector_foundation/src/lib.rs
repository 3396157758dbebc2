//! Errors, diagnostics, metadata maps, and configuration for Reflector.
//!
//! This crate provides:
//! - [`Error`] - Fatal error type with location context
//! - [`Diagnostics`] - Non-fatal diagnostic sink mirrored to `log`
//! - [`MetaData`] - Persistent metadata map attached to declarations
//! - [`ParserConfig`] - Session configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod metadata;

pub use config::{DocumentationPolicy, GeneratedCodeVersion, IntrinsicType, ParserConfig};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, ErrorContext, ErrorKind, PendingPair};
pub use metadata::MetaData;

/// Result type alias using the Reflector error type.
pub type Result<T> = std::result::Result<T, Error>;
