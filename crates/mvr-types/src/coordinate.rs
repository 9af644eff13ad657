//! Artifact and metadata coordinates, and their repository paths.
//!
//! Repository layout:
//!
//! ```text
//! {group as path}/{artifact}/maven-metadata.xml
//! {group as path}/{artifact}/{baseVersion}/{artifact}-{version}[-{classifier}].{extension}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;
use crate::version::{self, Version, SNAPSHOT};

/// File name of the per-package metadata document.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// First path segment of the staging area. Never addressable by clients.
pub const STAGING_ROOT: &str = ".upload";

/// Checksum file extensions understood by the repository.
pub const CHECKSUM_EXTENSIONS: [&str; 4] = ["md5", "sha1", "sha256", "sha512"];

// ---------------------------------------------------------------------------
// ArtifactCoordinate
// ---------------------------------------------------------------------------

/// Identifies one file of one artifact version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    group_id: String,
    artifact_id: String,
    version: Version,
    base_version: String,
    extension: String,
    classifier: Option<String>,
}

impl ArtifactCoordinate {
    /// Build a coordinate, validating every field.
    ///
    /// A blank classifier is treated as absent.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        version: &str,
        extension: &str,
        classifier: Option<&str>,
    ) -> Result<Self, CoordinateError> {
        validate_group(group_id)?;
        validate_token("artifactId", artifact_id)?;
        validate_extension(extension)?;
        let classifier = match classifier.filter(|c| !c.trim().is_empty()) {
            Some(c) => {
                validate_token("classifier", c)?;
                if c.contains('.') {
                    return Err(CoordinateError::InvalidField {
                        field: "classifier",
                        value: c.to_string(),
                    });
                }
                Some(c.to_string())
            }
            None => None,
        };
        let version = Version::parse(version)?;
        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            base_version: version.base_version(),
            version,
            extension: extension.to_string(),
            classifier,
        })
    }

    /// Parse `group:artifact:extension[:classifier]:version`.
    pub fn parse(coords: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = coords.split(':').collect();
        match parts.as_slice() {
            [g, a, e, v] => Self::new(g, a, v, e, None),
            [g, a, e, c, v] => Self::new(g, a, v, e, Some(c)),
            _ if parts.len() < 4 => Err(CoordinateError::coords(
                coords,
                format!("expected at least 4 segments, got {}", parts.len()),
            )),
            _ => Err(CoordinateError::coords(
                coords,
                format!("expected at most 5 segments, got {}", parts.len()),
            )),
        }
    }

    /// Parse a repository-relative file path.
    pub fn from_path(path: &str) -> Result<Self, CoordinateError> {
        let segments = split_path(path)?;
        let n = segments.len();
        if n < 4 {
            return Err(CoordinateError::path(
                path,
                format!("artifact path needs at least 4 segments, got {n}"),
            ));
        }
        let group_id = segments[..n - 3].join(".");
        let artifact_id = segments[n - 3];
        let base = segments[n - 2];
        let file = segments[n - 1];

        let rest = file
            .strip_prefix(artifact_id)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(|| {
                CoordinateError::path(path, format!("file name must start with '{artifact_id}-'"))
            })?;
        let (version, tail) = split_version(base, rest)
            .ok_or_else(|| CoordinateError::path(path, format!("file name does not match version '{base}'")))?;

        let (classifier, extension) = if let Some(t) = tail.strip_prefix('-') {
            let (c, e) = t
                .split_once('.')
                .ok_or_else(|| CoordinateError::path(path, "missing extension"))?;
            (Some(c), e)
        } else if let Some(e) = tail.strip_prefix('.') {
            (None, e)
        } else {
            return Err(CoordinateError::path(path, "missing extension"));
        };
        if classifier.is_some_and(str::is_empty) {
            return Err(CoordinateError::path(path, "empty classifier"));
        }
        Self::new(&group_id, artifact_id, version, extension, classifier)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Concrete version, possibly a timestamped snapshot.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Directory-level version (`1.0-SNAPSHOT` for any snapshot of `1.0`).
    pub fn base_version(&self) -> &str {
        &self.base_version
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.is_snapshot()
    }

    /// `{artifact}-{version}[-{classifier}].{extension}`
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.artifact_id, self.version);
        if let Some(c) = &self.classifier {
            name.push('-');
            name.push_str(c);
        }
        name.push('.');
        name.push_str(&self.extension);
        name
    }

    /// `{group as path}/{artifact}`
    pub fn package_path(&self) -> String {
        package_path(&self.group_id, &self.artifact_id)
    }

    /// Full repository-relative path of this file.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.package_path(), self.base_version, self.file_name())
    }

    /// The metadata coordinate of the package this file belongs to.
    pub fn package(&self) -> MetadataCoordinate {
        MetadataCoordinate {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            checksum: None,
        }
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        write!(f, ":{}", self.version)
    }
}

impl std::str::FromStr for ArtifactCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split `{version}{tail}` from the part of a file name that follows
/// `{artifact}-`, given the directory-level version.
fn split_version<'a>(base: &str, rest: &'a str) -> Option<(&'a str, &'a str)> {
    if let Some(tail) = rest.strip_prefix(base) {
        return Some((&rest[..base.len()], tail));
    }
    // Timestamped snapshot: `1.0-20240101.120000-3` inside `1.0-SNAPSHOT/`.
    let stem = base.strip_suffix(SNAPSHOT)?;
    let after = rest.strip_prefix(stem)?;
    let bytes = after.as_bytes();
    let stamp_len = "yyyyMMdd.HHmmss-".len();
    if bytes.len() <= stamp_len || bytes[8] != b'.' || bytes[15] != b'-' {
        return None;
    }
    let build_len = bytes[stamp_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if build_len == 0 {
        return None;
    }
    let end = stem.len() + stamp_len + build_len;
    let version = &rest[..end];
    if version::base_version(version) != base {
        return None;
    }
    Some((version, &rest[end..]))
}

// ---------------------------------------------------------------------------
// MetadataCoordinate
// ---------------------------------------------------------------------------

/// Identifies a package's `maven-metadata.xml`, optionally one of its
/// checksum siblings (`maven-metadata.xml.sha1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataCoordinate {
    group_id: String,
    artifact_id: String,
    checksum: Option<String>,
}

impl MetadataCoordinate {
    pub fn new(group_id: &str, artifact_id: &str) -> Result<Self, CoordinateError> {
        validate_group(group_id)?;
        validate_token("artifactId", artifact_id)?;
        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            checksum: None,
        })
    }

    /// Parse a path ending in `maven-metadata.xml` (or one of its checksum
    /// files). Group and artifact are inferred from the parent segments.
    pub fn from_path(path: &str) -> Result<Self, CoordinateError> {
        let segments = split_path(path)?;
        let n = segments.len();
        let checksum = metadata_checksum(segments[n - 1])
            .ok_or_else(|| CoordinateError::path(path, format!("file name is not {METADATA_FILE}")))?;
        if n < 3 {
            return Err(CoordinateError::path(
                path,
                format!("metadata path needs at least 3 segments, got {n}"),
            ));
        }
        let mut coord = Self::from_segments(path, &segments[..n - 1])?;
        coord.checksum = checksum.map(str::to_string);
        Ok(coord)
    }

    fn from_segments(path: &str, segments: &[&str]) -> Result<Self, CoordinateError> {
        let n = segments.len();
        Self::new(&segments[..n - 1].join("."), segments[n - 1])
            .map_err(|e| CoordinateError::path(path, e.to_string()))
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Checksum extension when this addresses a checksum of the document.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// The same package, addressing the metadata document itself.
    pub fn document(&self) -> Self {
        Self {
            checksum: None,
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        match &self.checksum {
            Some(ext) => format!("{METADATA_FILE}.{ext}"),
            None => METADATA_FILE.to_string(),
        }
    }

    /// `{group as path}/{artifact}`
    pub fn package_path(&self) -> String {
        package_path(&self.group_id, &self.artifact_id)
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.package_path(), self.file_name())
    }
}

impl fmt::Display for MetadataCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// `Some(None)` for the document itself, `Some(Some(ext))` for a checksum
/// file, `None` for anything else.
fn metadata_checksum(file: &str) -> Option<Option<&str>> {
    if file == METADATA_FILE {
        return Some(None);
    }
    let ext = file.strip_prefix(METADATA_FILE)?.strip_prefix('.')?;
    CHECKSUM_EXTENSIONS.contains(&ext).then_some(Some(ext))
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// Any addressable repository file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Coordinate {
    Artifact(ArtifactCoordinate),
    Metadata(MetadataCoordinate),
}

impl Coordinate {
    /// Parse a repository-relative path. Paths whose file name is the
    /// metadata document (or one of its checksums) become
    /// [`Coordinate::Metadata`]; everything else must be an artifact file.
    pub fn parse(path: &str) -> Result<Self, CoordinateError> {
        let file = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        if metadata_checksum(file).is_some() {
            MetadataCoordinate::from_path(path).map(Self::Metadata)
        } else {
            ArtifactCoordinate::from_path(path).map(Self::Artifact)
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Artifact(a) => a.path(),
            Self::Metadata(m) => m.path(),
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            Self::Artifact(a) => a.group_id(),
            Self::Metadata(m) => m.group_id(),
        }
    }

    pub fn artifact_id(&self) -> &str {
        match self {
            Self::Artifact(a) => a.artifact_id(),
            Self::Metadata(m) => m.artifact_id(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact(a) => a.fmt(f),
            Self::Metadata(m) => write!(f, "{m}:{}", m.file_name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn package_path(group_id: &str, artifact_id: &str) -> String {
    format!("{}/{}", group_id.replace('.', "/"), artifact_id)
}

/// Split a repository path into segments, rejecting traversal, empty
/// segments and the staging root.
fn split_path(path: &str) -> Result<Vec<&str>, CoordinateError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Err(CoordinateError::path(path, "empty path"));
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    for segment in &segments {
        if segment.is_empty() || *segment == "." || *segment == ".." {
            return Err(CoordinateError::path(path, format!("invalid segment {segment:?}")));
        }
    }
    if segments[0] == STAGING_ROOT {
        return Err(CoordinateError::path(path, "staging area is not addressable"));
    }
    Ok(segments)
}

fn is_token_char(c: char) -> bool {
    !(c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | ':'))
}

fn validate_token(field: &'static str, value: &str) -> Result<(), CoordinateError> {
    if value.is_empty() || !value.chars().all(is_token_char) || value == "." || value == ".." {
        return Err(CoordinateError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_group(group_id: &str) -> Result<(), CoordinateError> {
    validate_token("groupId", group_id)?;
    if group_id.split('.').any(str::is_empty) {
        return Err(CoordinateError::InvalidField {
            field: "groupId",
            value: group_id.to_string(),
        });
    }
    Ok(())
}

fn validate_extension(extension: &str) -> Result<(), CoordinateError> {
    validate_token("extension", extension)?;
    if extension.starts_with('.') || extension.ends_with('.') {
        return Err(CoordinateError::InvalidField {
            field: "extension",
            value: extension.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_colon_coordinates() {
        let c = ArtifactCoordinate::parse("com.example:abc:jar:1.0").unwrap();
        assert_eq!(c.group_id(), "com.example");
        assert_eq!(c.artifact_id(), "abc");
        assert_eq!(c.extension(), "jar");
        assert_eq!(c.classifier(), None);
        assert_eq!(c.version().as_str(), "1.0");
        assert_eq!(c.to_string(), "com.example:abc:jar:1.0");
    }

    #[test]
    fn parses_colon_coordinates_with_classifier() {
        let c = ArtifactCoordinate::parse("com.example:abc:jar:sources:1.0").unwrap();
        assert_eq!(c.classifier(), Some("sources"));
        assert_eq!(c.path(), "com/example/abc/1.0/abc-1.0-sources.jar");
    }

    #[test]
    fn rejects_short_colon_coordinates() {
        let err = ArtifactCoordinate::parse("com.example:abc:1.0").unwrap_err();
        assert!(matches!(err, CoordinateError::MalformedCoordinates { .. }));
        assert!(ArtifactCoordinate::parse("a:b:c:d:e:f").is_err());
    }

    #[test]
    fn blank_classifier_is_absent() {
        let c = ArtifactCoordinate::new("g", "a", "1", "jar", Some("  ")).unwrap();
        assert_eq!(c.classifier(), None);
        assert_eq!(c.file_name(), "a-1.jar");
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(ArtifactCoordinate::new("", "a", "1", "jar", None).is_err());
        assert!(ArtifactCoordinate::new("g", "", "1", "jar", None).is_err());
        assert!(ArtifactCoordinate::new("g", "a", "1", "", None).is_err());
        assert!(ArtifactCoordinate::new("g..x", "a", "1", "jar", None).is_err());
    }

    #[test]
    fn formats_repository_path() {
        let c = ArtifactCoordinate::new("com.artipie", "asto", "0.20.2", "pom", None).unwrap();
        assert_eq!(c.path(), "com/artipie/asto/0.20.2/asto-0.20.2.pom");
        assert_eq!(c.package_path(), "com/artipie/asto");
    }

    #[test]
    fn parses_artifact_path() {
        let c = ArtifactCoordinate::from_path("/com/example/abc/0.1/abc-0.1.jar").unwrap();
        assert_eq!(c.group_id(), "com.example");
        assert_eq!(c.artifact_id(), "abc");
        assert_eq!(c.base_version(), "0.1");
        assert_eq!(c.extension(), "jar");
    }

    #[test]
    fn parses_compound_extension_and_checksum_files() {
        let c = ArtifactCoordinate::from_path("org/x/lib/2.0/lib-2.0.tar.gz").unwrap();
        assert_eq!(c.extension(), "tar.gz");
        let c = ArtifactCoordinate::from_path("org/x/lib/2.0/lib-2.0-sources.jar.sha1").unwrap();
        assert_eq!(c.classifier(), Some("sources"));
        assert_eq!(c.extension(), "jar.sha1");
    }

    #[test]
    fn parses_timestamped_snapshot_file() {
        let path = "com/example/abc/1.0-SNAPSHOT/abc-1.0-20240101.120000-3-tests.jar";
        let c = ArtifactCoordinate::from_path(path).unwrap();
        assert_eq!(c.version().as_str(), "1.0-20240101.120000-3");
        assert_eq!(c.base_version(), "1.0-SNAPSHOT");
        assert_eq!(c.classifier(), Some("tests"));
        assert!(c.is_snapshot());
        assert_eq!(c.path(), path);
    }

    #[test]
    fn rejects_file_not_matching_directory() {
        assert!(ArtifactCoordinate::from_path("com/example/abc/1.0/other-1.0.jar").is_err());
        assert!(ArtifactCoordinate::from_path("com/example/abc/1.0/abc-2.0.jar").is_err());
        assert!(ArtifactCoordinate::from_path("com/example/abc/1.0/abc-1.0").is_err());
        assert!(ArtifactCoordinate::from_path("com/example/abc/1.0/abc-1.0-.jar").is_err());
    }

    #[test]
    fn rejects_short_and_traversing_paths() {
        assert!(ArtifactCoordinate::from_path("abc/1.0/abc-1.0.jar").is_err());
        assert!(Coordinate::parse("com/../abc/1.0/abc-1.0.jar").is_err());
        assert!(Coordinate::parse("com//abc/1.0/abc-1.0.jar").is_err());
        assert!(Coordinate::parse("").is_err());
    }

    #[test]
    fn staging_area_is_not_addressable() {
        let err = Coordinate::parse("/.upload/com/example/abc/1.0/abc-1.0.jar").unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn parses_metadata_path() {
        let c = Coordinate::parse("/com/example/abc/maven-metadata.xml").unwrap();
        let Coordinate::Metadata(m) = c else {
            panic!("expected metadata coordinate");
        };
        assert_eq!(m.group_id(), "com.example");
        assert_eq!(m.artifact_id(), "abc");
        assert_eq!(m.checksum(), None);
        assert_eq!(m.path(), "com/example/abc/maven-metadata.xml");
    }

    #[test]
    fn parses_metadata_checksum_path() {
        let c = Coordinate::parse("com/example/abc/maven-metadata.xml.sha1").unwrap();
        let Coordinate::Metadata(m) = c else {
            panic!("expected metadata coordinate");
        };
        assert_eq!(m.checksum(), Some("sha1"));
        assert_eq!(m.path(), "com/example/abc/maven-metadata.xml.sha1");
        assert_eq!(m.document().path(), "com/example/abc/maven-metadata.xml");
    }

    #[test]
    fn rejects_metadata_without_group() {
        assert!(Coordinate::parse("abc/maven-metadata.xml").is_err());
        assert!(Coordinate::parse("maven-metadata.xml").is_err());
    }

    #[test]
    fn artifact_package_matches_metadata() {
        let a = ArtifactCoordinate::parse("com.example:abc:pom:1.0").unwrap();
        assert_eq!(a.package(), MetadataCoordinate::new("com.example", "abc").unwrap());
    }

    #[test]
    fn classifier_may_contain_separators() {
        let path = "com/example/abc/1.0-SNAPSHOT/abc-1.0-20240101.120000-3-linux-x86_64.tar.gz";
        let Coordinate::Artifact(c) = Coordinate::parse(path).unwrap() else {
            panic!("expected artifact");
        };
        assert_eq!(c.version().as_str(), "1.0-20240101.120000-3");
        assert_eq!(c.classifier(), Some("linux-x86_64"));
        assert_eq!(c.extension(), "tar.gz");
        assert_eq!(c.path(), path);
    }

    fn group() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..4).prop_map(|parts| parts.join("."))
    }

    fn coordinate() -> impl Strategy<Value = ArtifactCoordinate> {
        (
            group(),
            "[a-z][a-z0-9-]{0,8}",
            "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}(-SNAPSHOT|-20[0-9]{6}\\.[0-9]{6}-[1-9][0-9]?)?",
            "(jar|pom|war|tar\\.gz|jar\\.sha1)",
            prop::option::of("[a-z0-9][a-z0-9_-]{0,10}"),
        )
            .prop_map(|(g, a, v, e, c)| {
                ArtifactCoordinate::new(&g, &a, &v, &e, c.as_deref()).unwrap()
            })
    }

    proptest! {
        #[test]
        fn path_roundtrip(c in coordinate()) {
            let parsed = Coordinate::parse(&c.path()).unwrap();
            prop_assert_eq!(parsed, Coordinate::Artifact(c));
        }

        #[test]
        fn colon_roundtrip(c in coordinate()) {
            let parsed = ArtifactCoordinate::parse(&c.to_string()).unwrap();
            prop_assert_eq!(parsed, c);
        }
    }
}
