//! Helper error types
//!
//! Typed failures for the helpers that can reject their input. Everything
//! else in the crate is total and returns sentinel values instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HelperError {
    /// The input does not describe a valid calendar instant
    #[error("Invalid date provided: {0}")]
    InvalidInput(String),
}

pub type HelperResult<T> = Result<T, HelperError>;
