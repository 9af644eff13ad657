use mvr_crypto::ChecksumAlgorithm;
use mvr_types::{MetadataCoordinate, METADATA_FILE, STAGING_ROOT};

use crate::error::{RepositoryError, RepositoryResult};

/// What an upload path addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PutTarget {
    /// Any file staged as is: artifacts, their checksums, version-level
    /// snapshot metadata.
    Artifact { path: String },
    /// Candidate package metadata.
    Metadata(MetadataCoordinate),
    /// Checksum of the package metadata.
    Checksum {
        package: MetadataCoordinate,
        algorithm: ChecksumAlgorithm,
    },
}

impl PutTarget {
    /// Classify an upload path.
    ///
    /// A `maven-metadata.xml` directly below a `*SNAPSHOT*` directory is a
    /// version-level document and is staged like any other file.
    pub fn classify(path: &str) -> RepositoryResult<Self> {
        let path = path.trim_start_matches('/');
        let segments = segments(path)?;
        let (file, dirs) = segments
            .split_last()
            .ok_or_else(|| RepositoryError::Parse("empty path".into()))?;
        let version_level = dirs.last().is_some_and(|d| d.contains("SNAPSHOT"));

        if !version_level {
            if *file == METADATA_FILE {
                return Ok(Self::Metadata(MetadataCoordinate::from_path(path)?));
            }
            if let Some(algorithm) = file
                .strip_prefix(METADATA_FILE)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(ChecksumAlgorithm::from_extension)
            {
                let package = MetadataCoordinate::from_path(path)?.document();
                return Ok(Self::Checksum { package, algorithm });
            }
        }

        if segments.len() < 4 {
            return Err(RepositoryError::Parse(format!(
                "{path}: expected {{group}}/{{artifact}}/{{version}}/{{file}}"
            )));
        }
        Ok(Self::Artifact {
            path: path.to_string(),
        })
    }
}

fn segments(path: &str) -> RepositoryResult<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').collect();
    let invalid = |reason: &str| RepositoryError::Parse(format!("{path}: {reason}"));
    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
        return Err(invalid("invalid segment"));
    }
    if segments[0] == STAGING_ROOT {
        return Err(invalid("staging area is not addressable"));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_metadata() {
        let target = PutTarget::classify("/com/example/abc/maven-metadata.xml").unwrap();
        assert_eq!(
            target,
            PutTarget::Metadata(MetadataCoordinate::new("com.example", "abc").unwrap())
        );
    }

    #[test]
    fn metadata_checksums() {
        for alg in ChecksumAlgorithm::ALL {
            let path = format!("com/example/abc/maven-metadata.xml.{}", alg.extension());
            match PutTarget::classify(&path).unwrap() {
                PutTarget::Checksum { package, algorithm } => {
                    assert_eq!(algorithm, alg);
                    assert_eq!(package.checksum(), None);
                    assert_eq!(package.to_string(), "com.example:abc");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn snapshot_directory_metadata_is_plain() {
        for path in [
            "com/example/abc/2.0-SNAPSHOT/maven-metadata.xml",
            "com/example/abc/2.0-SNAPSHOT/maven-metadata.xml.sha1",
            "com/example/abc/1.0/abc-1.0.jar",
            "com/example/abc/1.0/abc-1.0.jar.sha1",
        ] {
            assert_eq!(
                PutTarget::classify(path).unwrap(),
                PutTarget::Artifact { path: path.into() }
            );
        }
    }

    #[test]
    fn rejects_bad_paths() {
        for path in [
            "",
            "/",
            "abc.jar",
            "com/abc.jar",
            "com/example/../abc/1.0/abc-1.0.jar",
            ".upload/com/example/abc/1.0/abc-1.0.jar",
            "com//abc/1.0/abc-1.0.jar",
            "abc/maven-metadata.xml",
        ] {
            let err = PutTarget::classify(path).unwrap_err();
            assert_eq!(err.status_code(), 400, "{path}");
        }
    }
}
