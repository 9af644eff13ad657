use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// Suffix that marks a mutable, unreleased version.
pub const SNAPSHOT: &str = "SNAPSHOT";

/// A syntactically valid artifact version.
///
/// Accepted versions are non-empty, start with an ASCII letter or digit, use
/// only `[A-Za-z0-9._+-]`, and never contain `..`. Ordering follows Maven
/// conventions closely enough to sort a package's version list: numeric
/// segments compare numerically and well-known qualifiers rank below the
/// plain release (`1.0-rc1 < 1.0-SNAPSHOT < 1.0 < 1.0-sp1`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Parse and validate a version string.
    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoordinateError::InvalidVersion(s.to_string()))
        }
    }

    /// Returns `true` if `s` would parse as a [`Version`].
    pub fn is_valid(s: &str) -> bool {
        let Some(first) = s.chars().next() else {
            return false;
        };
        first.is_ascii_alphanumeric()
            && !s.contains("..")
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `-SNAPSHOT` versions and their timestamped forms.
    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.0)
    }

    /// The directory-level version: timestamped snapshots collapse to
    /// `X-SNAPSHOT`, every other version is returned unchanged.
    pub fn base_version(&self) -> String {
        base_version(&self.0)
    }

    fn tokens(&self) -> Vec<Token> {
        tokenize(&self.0)
    }
}

/// Returns `true` if `version` is snapshot-qualified.
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT) || timestamp_prefix(version).is_some()
}

/// See [`Version::base_version`].
pub fn base_version(version: &str) -> String {
    match timestamp_prefix(version) {
        Some(prefix) => format!("{prefix}-{SNAPSHOT}"),
        None => version.to_string(),
    }
}

/// For a timestamped snapshot `1.0-20240101.120000-3`, return `1.0`.
pub(crate) fn timestamp_prefix(version: &str) -> Option<&str> {
    let (head, build) = version.rsplit_once('-')?;
    if build.is_empty() || !build.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (prefix, stamp) = head.rsplit_once('-')?;
    let (date, time) = stamp.split_once('.')?;
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    if prefix.is_empty() || !digits(date, 8) || !digits(time, 6) {
        return None;
    }
    Some(prefix)
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Version {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Num(u64),
    Qualifier(String),
}

/// Rank of the implicit qualifier of a plain release (`1.0` == `1.0-ga`).
const RELEASE_RANK: u8 = 5;

fn qualifier_rank(q: &str) -> u8 {
    match q {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn tokenize(version: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut digits = false;

    let flush = |current: &mut String, tokens: &mut Vec<Token>, digits: bool| {
        if current.is_empty() {
            return;
        }
        let token = if digits {
            current
                .parse()
                .map(Token::Num)
                .unwrap_or_else(|_| Token::Qualifier(current.clone()))
        } else {
            Token::Qualifier(current.to_ascii_lowercase())
        };
        tokens.push(token);
        current.clear();
    };

    for c in version.chars() {
        if matches!(c, '.' | '-' | '_' | '+') {
            flush(&mut current, &mut tokens, digits);
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != digits {
            flush(&mut current, &mut tokens, digits);
        }
        digits = is_digit;
        current.push(c);
    }
    flush(&mut current, &mut tokens, digits);
    tokens
}

/// Totally ordered sort key of one token position. `None` pads the shorter
/// version and sorts with `0` and the release qualifiers:
/// `1` == `1.0` == `1-ga` before the string tiebreak.
fn sort_key(token: Option<&Token>) -> (u8, u64, u8, &str) {
    match token {
        None | Some(Token::Num(0)) => (1, 0, RELEASE_RANK, ""),
        Some(Token::Num(n)) => (3, *n, 0, ""),
        Some(Token::Qualifier(q)) => match qualifier_rank(q) {
            RELEASE_RANK => (1, 0, RELEASE_RANK, ""),
            rank if rank < RELEASE_RANK => (0, 0, rank, q),
            rank => (2, 0, rank, q),
        },
    }
}

impl Ord for Version {
    /// Maven-like order. Versions whose tokens compare equal fall back to
    /// string order, so `Ord` stays consistent with `Eq`.
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.tokens(), other.tokens());
        let len = a.len().max(b.len());
        (0..len)
            .map(|i| sort_key(a.get(i)).cmp(&sort_key(b.get(i))))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
