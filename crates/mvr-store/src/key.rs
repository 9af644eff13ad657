use std::fmt;

use crate::error::{StoreError, StoreResult};

/// A normalized storage key: `/`-separated parts, no leading or trailing
/// separator, no empty, `.` or `..` parts. The empty key is the root.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(String);

impl Key {
    /// The root key. Listing it enumerates the whole store.
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Normalize `key`, trimming leading and trailing `/`.
    pub fn new(key: &str) -> StoreResult<Self> {
        let trimmed = key.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for part in trimmed.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                    reason: format!("invalid part {part:?}"),
                });
            }
            if part.contains('\\') || part.chars().any(char::is_control) {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                    reason: format!("part {part:?} contains a forbidden character"),
                });
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Append one or more parts.
    pub fn join(&self, suffix: &str) -> StoreResult<Self> {
        let suffix = Self::new(suffix)?;
        Ok(match (self.is_root(), suffix.is_root()) {
            (true, _) => suffix,
            (_, true) => self.clone(),
            _ => Self(format!("{}/{}", self.0, suffix.0)),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|p| !p.is_empty())
    }

    /// The enclosing key, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once('/') {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::root(),
        })
    }

    /// The final part, empty for the root.
    pub fn last_part(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Component-wise prefix test: `a/b` starts with `a` but not with `a/b/c`
    /// or `a/` + `bc`.
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.strip_prefix(prefix).is_some()
    }

    /// The remainder of `self` after `prefix`, empty when equal.
    pub fn strip_prefix(&self, prefix: &Key) -> Option<&str> {
        if prefix.is_root() {
            return Some(&self.0);
        }
        let rest = self.0.strip_prefix(prefix.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Key {
    type Error = StoreError;

    fn try_from(value: &str) -> StoreResult<Self> {
        Self::new(value)
    }
}
