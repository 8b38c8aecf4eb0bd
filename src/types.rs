//! Shared types threaded through every pipeline stage.
//!
//! A [`Site`] is created by [`scan`](crate::scan), handed by value to each
//! plugin, rewritten in place by [`render`](crate::render) and finally read by
//! [`emit`](crate::emit). All of these types serialize to JSON: the same
//! representation is used for template contexts and for the external plugin
//! protocol, so field names here are part of the public contract.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The whole build-time model of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Site {
    /// Absolute path of the project root.
    pub source_root: PathBuf,
    /// Content pages in discovery order.
    pub pages: Vec<Page>,
    /// Static assets in discovery order.
    pub resources: Vec<Resource>,
    /// Layout templates keyed by path relative to `templates/`.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

/// One content file that becomes one output file (plus an optional redirect stub).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub meta: PageMeta,
    /// Source text after discovery, final markup after rendering.
    pub data: String,
}

/// Page metadata: resolved locations plus pass-through front-matter.
///
/// Serialized with the same key names front-matter uses (`altUrl`, not
/// `alt_url`) so templates read `page.altUrl` the way authors wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: PageKind,
    /// Public URL of the page.
    pub url: String,
    /// Output path relative to the output root.
    pub path: String,
    /// True when `url` came from front-matter rather than the file name.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom_url: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_path: Option<String>,
    /// Layout template name, always carrying an extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
    /// Every other front-matter key, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageMeta {
    /// Look up a pass-through front-matter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Content kind, derived from the source file extension.
///
/// Serialized as the bare extension (`"md"`, `"html"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageKind {
    Markdown,
    Html,
    Xml,
    /// Anything else; rendered as a passthrough.
    Other(String),
}

impl PageKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "md" => PageKind::Markdown,
            "html" => PageKind::Html,
            "xml" => PageKind::Xml,
            other => PageKind::Other(other.to_string()),
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            PageKind::Markdown => "md",
            PageKind::Html => "html",
            PageKind::Xml => "xml",
            PageKind::Other(ext) => ext,
        }
    }
}

impl From<String> for PageKind {
    fn from(ext: String) -> Self {
        PageKind::from_extension(&ext)
    }
}

impl From<PageKind> for String {
    fn from(kind: PageKind) -> Self {
        kind.extension().to_string()
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A static asset copied through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Output path relative to the resource output root (same as source path).
    pub path: String,
    /// False only for `text/*` assets that decoded as UTF-8.
    pub binary: bool,
    pub data: ResourceData,
}

/// Resource contents. Binary data serializes as a JSON byte array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceData {
    Text(String),
    Binary(Vec<u8>),
}

impl ResourceData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResourceData::Text(text) => text.as_bytes(),
            ResourceData::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_meta() -> PageMeta {
        let mut extra = Map::new();
        extra.insert("title".to_string(), json!("Hello"));
        PageMeta {
            id: 3,
            kind: PageKind::Markdown,
            url: "/new/".to_string(),
            path: "new/index.html".to_string(),
            custom_url: true,
            alt_url: Some("/old".to_string()),
            alt_path: Some("old/index.html".to_string()),
            template: Some("post.html".to_string()),
            skip: false,
            extra,
        }
    }

    #[test]
    fn page_kind_from_extension() {
        assert_eq!(PageKind::from_extension("md"), PageKind::Markdown);
        assert_eq!(PageKind::from_extension("html"), PageKind::Html);
        assert_eq!(PageKind::from_extension("xml"), PageKind::Xml);
        assert_eq!(
            PageKind::from_extension("txt"),
            PageKind::Other("txt".to_string())
        );
    }

    #[test]
    fn meta_serializes_with_front_matter_key_names() {
        let value = serde_json::to_value(sample_meta()).unwrap();
        assert_eq!(value["type"], "md");
        assert_eq!(value["altUrl"], "/old");
        assert_eq!(value["altPath"], "old/index.html");
        assert_eq!(value["title"], "Hello");
        assert!(value.get("skip").is_none());
    }

    #[test]
    fn meta_deserializes_extra_keys_into_map() {
        let meta: PageMeta = serde_json::from_value(json!({
            "id": 0,
            "type": "html",
            "url": "/a.html",
            "path": "a.html",
            "tags": ["x", "y"],
        }))
        .unwrap();
        assert_eq!(meta.kind, PageKind::Html);
        assert!(!meta.custom_url);
        assert_eq!(meta.get("tags"), Some(&json!(["x", "y"])));
    }

    #[test]
    fn binary_resource_data_survives_json() {
        let resource = Resource {
            path: "logo.png".to_string(),
            binary: true,
            data: ResourceData::Binary(vec![0x89, b'P', b'N', b'G', 0]),
        };
        let json = serde_json::to_string(&resource).unwrap();
        let back: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn text_resource_data_is_a_json_string() {
        let data = ResourceData::Text("body {}".to_string());
        assert_eq!(serde_json::to_value(&data).unwrap(), json!("body {}"));
        assert_eq!(data.len(), 7);
    }
}
