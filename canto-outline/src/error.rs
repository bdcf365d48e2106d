//! Error types for outline operations
//!
//! Hard errors exist only at the structured XML boundary; everything inside
//! the engine degrades per item and is reported through
//! [`crate::diagnostics::Diagnostics`] instead.

use std::fmt;

#[derive(Debug, Clone)]
pub enum OutlineError {
    /// The structured XML surface could not be read or written.
    Xml(String),
}

impl fmt::Display for OutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineError::Xml(msg) => write!(f, "structured outline: {}", msg),
        }
    }
}

impl std::error::Error for OutlineError {}

pub type OutlineResult<T> = Result<T, OutlineError>;
