use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use mvr_types::{version, Version};

use crate::deploy::DeployMetadata;
use crate::document::{MavenMetadata, Versioning, Versions};

/// Everything the merge reads. Gathered by the caller while it holds the
/// package's exclusive section.
#[derive(Clone, Debug)]
pub struct MergeInput<'a> {
    pub group_id: &'a str,
    pub artifact_id: &'a str,
    /// Version directories already published under the package.
    pub published: &'a [String],
    /// The version being committed.
    pub new_version: &'a Version,
    /// See [`previous_release`].
    pub previous_release: Option<String>,
}

/// `lastUpdated` timestamp: `yyyyMMddHHmmss`, UTC.
pub fn format_last_updated(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Compute the document to publish.
///
/// `versions` is the published set plus the new version, deduplicated and
/// sorted; names that are not valid versions are dropped. `latest` is the new
/// version. `release` is the new version unless it is a snapshot, in which
/// case the previous release carries over.
pub fn merge(input: MergeInput<'_>, now: DateTime<Utc>) -> MavenMetadata {
    let mut versions: BTreeSet<Version> = BTreeSet::new();
    for name in input.published {
        match Version::parse(name) {
            Ok(v) => {
                versions.insert(v);
            }
            Err(_) => tracing::debug!(name = %name, "skipping non-version directory"),
        }
    }
    versions.insert(input.new_version.clone());

    let release = if input.new_version.is_snapshot() {
        input.previous_release
    } else {
        Some(input.new_version.to_string())
    };

    MavenMetadata {
        group_id: Some(input.group_id.to_string()),
        artifact_id: Some(input.artifact_id.to_string()),
        version: None,
        versioning: Some(Versioning {
            latest: Some(input.new_version.to_string()),
            release,
            versions: Some(Versions {
                version: versions.into_iter().map(String::from).collect(),
            }),
            last_updated: Some(format_last_updated(now)),
        }),
    }
}

/// The release a snapshot commit carries over: the durable document's
/// release when it names one, else the candidate's own release if that is a
/// non-snapshot version already published or being committed, else none.
pub fn previous_release(
    durable: Option<&MavenMetadata>,
    candidate: &DeployMetadata,
    published: &[String],
    new_version: &Version,
) -> Option<String> {
    if let Some(release) = durable.and_then(MavenMetadata::release) {
        return Some(release.to_string());
    }
    let release = candidate.release().ok()?;
    let known = release == new_version.as_str() || published.iter().any(|v| v == release);
    (known && !version::is_snapshot(release)).then(|| release.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn run(published: &[&str], new: &str, previous: Option<&str>) -> MavenMetadata {
        let published = strings(published);
        let new = Version::parse(new).unwrap();
        merge(
            MergeInput {
                group_id: "com.example",
                artifact_id: "abc",
                published: &published,
                new_version: &new,
                previous_release: previous.map(str::to_string),
            },
            now(),
        )
    }

    #[test]
    fn first_release() {
        let doc = run(&[], "1.0", None);
        assert_eq!(doc.versions(), vec!["1.0"]);
        assert_eq!(doc.latest(), Some("1.0"));
        assert_eq!(doc.release(), Some("1.0"));
        assert_eq!(doc.group_id(), Some("com.example"));
        assert_eq!(doc.artifact_id(), Some("abc"));
    }

    #[test]
    fn second_release() {
        let doc = run(&["1.0"], "2.0", Some("1.0"));
        assert_eq!(doc.versions(), vec!["1.0", "2.0"]);
        assert_eq!(doc.latest(), Some("2.0"));
        assert_eq!(doc.release(), Some("2.0"));
    }

    #[test]
    fn snapshot_keeps_previous_release() {
        let doc = run(&["1.0"], "2.0-SNAPSHOT", Some("1.0"));
        assert_eq!(doc.versions(), vec!["1.0", "2.0-SNAPSHOT"]);
        assert_eq!(doc.latest(), Some("2.0-SNAPSHOT"));
        assert_eq!(doc.release(), Some("1.0"));
    }

    #[test]
    fn snapshot_without_release() {
        let doc = run(&[], "1.0-SNAPSHOT", None);
        assert_eq!(doc.release(), None);
        assert_eq!(doc.latest(), Some("1.0-SNAPSHOT"));
    }

    #[test]
    fn versions_sorted_and_non_versions_dropped() {
        let doc = run(&["0.20.2", "0.11.1", ".hidden", "0.15"], "0.18", None);
        assert_eq!(doc.versions(), vec!["0.11.1", "0.15", "0.18", "0.20.2"]);
        assert_eq!(doc.latest(), Some("0.18"));
    }

    #[test]
    fn stamps_last_updated() {
        assert_eq!(run(&[], "1.0", None).last_updated(), Some("20240102030405"));
    }

    fn deploy(release: &str) -> DeployMetadata {
        let xml = format!("<metadata><versioning><release>{release}</release></versioning></metadata>");
        DeployMetadata::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn previous_release_prefers_durable_document() {
        let durable = run(&[], "1.0", None);
        let snapshot = Version::parse("2.0-SNAPSHOT").unwrap();
        let got = previous_release(Some(&durable), &deploy("0.9"), &strings(&["1.0"]), &snapshot);
        assert_eq!(got.as_deref(), Some("1.0"));
    }

    #[test]
    fn previous_release_from_candidate_only_when_known() {
        let snapshot = Version::parse("2.0-SNAPSHOT").unwrap();
        let published = strings(&["1.0"]);
        assert_eq!(
            previous_release(None, &deploy("1.0"), &published, &snapshot).as_deref(),
            Some("1.0")
        );
        assert_eq!(previous_release(None, &deploy("1.5"), &published, &snapshot), None);
        assert_eq!(
            previous_release(None, &deploy("2.0-SNAPSHOT"), &published, &snapshot),
            None
        );
    }

    fn version_name() -> impl Strategy<Value = String> {
        "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}(-SNAPSHOT|-rc[1-3])?"
    }

    fn merge_plain(published: &[String], new: &Version) -> MavenMetadata {
        merge(
            MergeInput {
                group_id: "g",
                artifact_id: "a",
                published,
                new_version: new,
                previous_release: None,
            },
            now(),
        )
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(
            published in prop::collection::vec(version_name(), 0..8),
            new in version_name(),
        ) {
            let new = Version::parse(&new).unwrap();
            let once = merge_plain(&published, &new);
            let listed: Vec<String> = once.versions().into_iter().map(str::to_string).collect();
            let twice = merge_plain(&listed, &new);

            prop_assert_eq!(once.versions(), twice.versions());
            prop_assert_eq!(once.latest(), twice.latest());
            let unique: BTreeSet<&str> = twice.versions().into_iter().collect();
            prop_assert_eq!(unique.len(), twice.versions().len());
        }

        #[test]
        fn merge_never_loses_versions(
            published in prop::collection::vec(version_name(), 0..8),
            new in version_name(),
        ) {
            let new = Version::parse(&new).unwrap();
            let doc = merge_plain(&published, &new);
            let listed = doc.versions();
            for v in &published {
                prop_assert!(listed.contains(&v.as_str()));
            }
            prop_assert!(listed.contains(&new.as_str()));
            prop_assert_eq!(doc.latest(), Some(new.as_str()));
        }
    }
}
