//! End-to-end tests across all layers
//!
//! Configuration from TOML, a multi-header module, diagnostics, and a
//! snapshot written to disk and read back.

mod pipeline;
