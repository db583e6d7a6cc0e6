//! Crate-level error type.
//!
//! Malformed *source code* is never an error anywhere in this crate; it is
//! recorded as per-scope AST issues and extraction continues. The only hard
//! failures are unreadable files and asking for a language nobody registered.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopegraphError {
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("unsupported file extension: '{0}'")]
    UnsupportedExtension(String),

    #[error("failed to parse file: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
