use std::borrow::Borrow;
use std::fmt;

use crate::SessionError;

/// Longest nickname accepted, in characters.
pub const MAX_NICKNAME_LEN: usize = 32;

/// A validated player name.
///
/// Comparison is exact and case-sensitive: `"ann"` and `"Ann"` are
/// different players. Names are never normalized, so leading or trailing
/// whitespace is rejected rather than trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nickname(String);

impl Nickname {
    /// # Errors
    /// [`SessionError::InvalidNickname`] if the name is empty, longer than
    /// [`MAX_NICKNAME_LEN`], starts or ends with whitespace, or contains a
    /// control character.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        let invalid = || SessionError::InvalidNickname(raw.to_string());

        if raw.is_empty() || raw.chars().count() > MAX_NICKNAME_LEN {
            return Err(invalid());
        }
        if raw.trim() != raw || raw.chars().any(char::is_control) {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Nickname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Nickname {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Nickname {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Nickname {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
