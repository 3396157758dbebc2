//! Tokenization for Reflector.
//!
//! This crate provides:
//! - [`Lexer`] - C-family tokenizer that attaches leading comments to tokens
//! - [`TokenSource`] - The seam the parser consumes tokens through
//! - [`TokenStream`] - One-slot lookahead and unget over any source
//! - [`format_comment_for_tooltip`] - Doc comment to tooltip normalisation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod comment;
pub mod lexer;
pub mod span;
pub mod stream;
pub mod token;

pub use comment::format_comment_for_tooltip;
pub use lexer::Lexer;
pub use span::Span;
pub use stream::{TokenSource, TokenStream, error_at};
pub use token::{Token, TokenKind};
