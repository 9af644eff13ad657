use serde::{Deserialize, Serialize};

use crate::error::{MetadataError, MetadataResult};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// `maven-metadata.xml`, restricted to the elements the repository reads
/// and writes. Unknown elements are ignored on parse and dropped on write.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "metadata", rename_all = "camelCase")]
pub struct MavenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Versions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub version: Vec<String>,
}

/// Trimmed, non-empty element text.
fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl MavenMetadata {
    /// Parse a document. The input must be UTF-8.
    pub fn from_xml(bytes: &[u8]) -> MetadataResult<Self> {
        let xml = std::str::from_utf8(bytes).map_err(|e| MetadataError::Parse(e.to_string()))?;
        quick_xml::de::from_str(xml).map_err(|e| MetadataError::Parse(e.to_string()))
    }

    /// Render with an XML declaration and two-space indentation.
    pub fn to_xml(&self) -> MetadataResult<String> {
        let mut xml = String::from(XML_DECLARATION);
        xml.push('\n');
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        self.serialize(ser)
            .map_err(|e| MetadataError::Serialize(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn group_id(&self) -> Option<&str> {
        text(&self.group_id)
    }

    pub fn artifact_id(&self) -> Option<&str> {
        text(&self.artifact_id)
    }

    pub fn latest(&self) -> Option<&str> {
        self.versioning.as_ref().and_then(|v| text(&v.latest))
    }

    pub fn release(&self) -> Option<&str> {
        self.versioning.as_ref().and_then(|v| text(&v.release))
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.versioning.as_ref().and_then(|v| text(&v.last_updated))
    }

    /// The listed versions, trimmed, blanks skipped, in document order.
    pub fn versions(&self) -> Vec<&str> {
        self.versioning
            .as_ref()
            .and_then(|v| v.versions.as_ref())
            .map(|v| {
                v.version
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
