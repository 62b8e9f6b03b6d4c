//! Input validation and sanitization
//!
//! Email shape checks and HTML escaping for user-provided text. Both
//! helpers are total: non-string input yields `false` or an empty string
//! rather than an error.

use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

/// Non-whitespace local part, exactly one `@`, and a dotted domain
static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Checks that a string has the conventional `local@domain.tld` shape
///
/// This is a shape check only; it does not resolve the domain or follow
/// every rule of RFC 5322.
pub fn validate_email(email: &str) -> bool {
    match &*EMAIL_PATTERN {
        Some(pattern) => pattern.is_match(email),
        None => false,
    }
}

/// Like [`validate_email`], but accepts any value
///
/// # Returns
/// `false` for anything that is not a string.
pub fn is_valid_email(input: &Value) -> bool {
    input.as_str().is_some_and(validate_email)
}

/// Escapes HTML special characters
///
/// Replaces `&`, `<`, `>`, `"`, `'` and `/` with their entity forms. The
/// string is scanned once, so entities produced here are never escaped a
/// second time.
///
/// # Security
/// The output is safe to embed in HTML text and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Sanitizes user input for display
///
/// # Returns
/// The HTML-escaped string, or an empty string for non-string input.
pub fn sanitize_input(input: &Value) -> String {
    input.as_str().map(escape_html).unwrap_or_default()
}
