//! Caller identity types.

use std::fmt;

use quota_core::defaults::{ADMIN_CLASS, MAX_USER_ID_LEN, STANDARD_CLASS};
use serde::{Deserialize, Serialize};

use crate::error::LimiterError;

/// Opaque identifier of an authenticated caller.
///
/// Only constructed through [`UserId::parse`], so a value of this type is
/// always non-empty, at most 255 bytes and free of whitespace and control
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, LimiterError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(LimiterError::InvalidCaller("user id is empty".into()));
        }
        if raw.len() > MAX_USER_ID_LEN {
            return Err(LimiterError::InvalidCaller(format!(
                "user id longer than {MAX_USER_ID_LEN} bytes"
            )));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LimiterError::InvalidCaller(
                "user id contains whitespace or control characters".into(),
            ));
        }
        Ok(Self(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

/// Coarse-grained caller tier used to pick a quota policy.
///
/// Class names are case-insensitive; they are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UserClass(String);

impl UserClass {
    /// Create a class tag from any string.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    /// Privileged class (unlimited by default).
    pub fn admin() -> Self {
        Self(ADMIN_CLASS.to_string())
    }

    /// Regular class (five requests per day by default).
    pub fn standard() -> Self {
        Self(STANDARD_CLASS.to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserClass {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for UserClass {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<UserClass> for String {
    fn from(c: UserClass) -> Self {
        c.0
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
