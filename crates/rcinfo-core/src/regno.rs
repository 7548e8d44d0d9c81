//! Registration number validation.
//!
//! Accepted shape: two letters, one or two digits, one or two letters, one to
//! four digits (`JK03N1234`, `MH12AB1`). Upper case only.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::LookupError;

const PATTERN: &str = r"^[A-Z]{2}[0-9]{1,2}[A-Z]{1,2}[0-9]{1,4}$";

/// Shown when input is rejected.
pub const FORMAT_HINT: &str = "Format: XX00XX0000\nExample: JK03N1234";

pub const INVALID_INPUT: &str = "Please enter a valid vehicle registration number.";

fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PATTERN).expect("registration pattern compiles"))
}

/// A registration number that matched the accepted pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegNo(String);

impl RegNo {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if `input` is exactly a registration number.
pub fn is_valid(input: &str) -> bool {
    pattern().is_match(input)
}

/// Validate raw input as typed (no trimming, no case folding).
pub fn validate(input: &str) -> Result<RegNo, LookupError> {
    if is_valid(input) {
        Ok(RegNo(input.to_string()))
    } else {
        Err(LookupError::Validation(input.to_string()))
    }
}

/// Trim and upper-case, then validate. Used by the web form.
pub fn normalize(input: &str) -> Result<RegNo, LookupError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    validate(&cleaned)
}
