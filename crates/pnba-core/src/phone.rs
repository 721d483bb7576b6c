use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

/// Normalized E.164-like phone number: a leading `+` followed by digits only.
///
/// All session and pending-auth state is keyed by this type, so normalization
/// happens exactly once, at the operation boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and normalize a raw phone number.
    ///
    /// Separator characters commonly pasted along with numbers (spaces,
    /// dashes, dots, parentheses) are stripped; anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let mut digits = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => {
                    return Err(Error::InvalidPhone(format!("unexpected character {c:?}")));
                }
            }
        }

        // E.164 allows at most 15 digits; very short strings are typos.
        if !(6..=15).contains(&digits.len()) {
            return Err(Error::InvalidPhone(format!(
                "expected 6 to 15 digits, got {}",
                digits.len()
            )));
        }

        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits without the leading `+` (the form the provider expects).
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
