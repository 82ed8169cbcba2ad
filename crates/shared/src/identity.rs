//! Caller identity used to partition tenant storage.
//!
//! An identity is an opaque string taken from the `Authorization` header.
//! It is never validated: any value selects (or creates) its own isolated
//! store. Requests without one share the `"default"` tenant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity used when the credential carries none.
pub const DEFAULT_IDENTITY: &str = "default";

const IDENTITY_MARKER: &str = "Identity=";
const ESCAPE: char = '~';

/// Tenant partition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity from a raw value.
    ///
    /// Surrounding whitespace is trimmed; a blank value selects the default
    /// identity.
    #[must_use]
    pub fn new(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Resolves the identity carried by an `Authorization` header value.
    ///
    /// The identity is whatever follows `Identity=` up to the next `;` or the
    /// end of the value. A marker directly followed by `;` does not count.
    #[must_use]
    pub fn from_authorization(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Self::default();
        };

        header
            .match_indices(IDENTITY_MARKER)
            .map(|(at, marker)| &header[at + marker.len()..])
            .map(|rest| rest.split(';').next().unwrap_or_default())
            .find(|value| !value.is_empty())
            .map_or_else(Self::default, Self::new)
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the shared default identity.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_IDENTITY
    }

    /// Directory name holding this identity's storage.
    ///
    /// `[A-Za-z0-9_.-]` pass through unchanged (a leading `.` excepted);
    /// every other byte is written as `~XX`. The mapping is injective, so
    /// distinct identities never share a directory, and it never yields
    /// `.`, `..` or a path separator.
    #[must_use]
    pub fn dir_name(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for (i, byte) in self.0.bytes().enumerate() {
            let passthrough = byte.is_ascii_alphanumeric()
                || byte == b'_'
                || byte == b'-'
                || (byte == b'.' && i > 0);
            if passthrough {
                out.push(char::from(byte));
            } else {
                out.push(ESCAPE);
                out.push_str(&format!("{byte:02X}"));
            }
        }
        out
    }

    /// Recovers the identity from a directory produced by [`Self::dir_name`].
    ///
    /// Returns `None` for names that no identity maps to.
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let mut bytes = Vec::with_capacity(name.len());
        let mut rest = name.as_bytes();
        while let Some((&first, tail)) = rest.split_first() {
            if first == b'~' {
                let hex = tail.get(..2)?;
                let hex = std::str::from_utf8(hex).ok()?;
                bytes.push(u8::from_str_radix(hex, 16).ok()?);
                rest = &tail[2..];
            } else {
                bytes.push(first);
                rest = tail;
            }
        }

        let value = String::from_utf8(bytes).ok()?;
        let identity = Self(value);
        (!identity.0.is_empty() && identity.dir_name() == name).then_some(identity)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self(DEFAULT_IDENTITY.to_string())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
