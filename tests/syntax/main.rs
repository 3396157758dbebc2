//! Integration tests for Layer 1: Syntax
//!
//! Tests for the lexer, the token stream, and tooltip formatting.

mod comments;
mod lexer;
mod stream;
