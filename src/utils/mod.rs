//! Utility functions
//!
//! Pure helpers for cloning, formatting and validating [`Value`](crate::Value)s.
//! None of them keep state between calls.

pub mod cloning;
pub mod formatting;
pub mod validation;
