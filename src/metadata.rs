//! Front-matter parsing and page metadata resolution.
//!
//! A page may start with a JSON object, separated from its body by one blank
//! line:
//!
//! ```text
//! {"url": "/new/", "altUrl": "/old", "template": "post", "title": "Moved"}
//!
//! # Moved
//!
//! This page lives at /new/ now.
//! ```
//!
//! Detection is a sniff: the file counts as having front-matter when its
//! trimmed text starts with `{`. A body that genuinely begins with a brace
//! needs an empty `{}` block in front of it.
//!
//! ## Recognized keys
//!
//! | Key | Effect |
//! |-----|--------|
//! | `url` | Public URL; also decides the output path |
//! | `altUrl` | Second URL that redirects to `url` |
//! | `template` | Layout to wrap the rendered body in (`.html` assumed) |
//! | `skip` | Emit the body verbatim, bypassing render |
//!
//! Everything else is kept as-is and exposed to templates as `page.<key>`.
//! Keys the pipeline computes itself (`id`, `type`, `path`, `customUrl`) are
//! overwritten.
//!
//! ## Resolution order
//!
//! 1. `path` starts as the source-relative path (`.md` → `.html`)
//! 2. `altPath` is derived from `altUrl` against that path
//! 3. `path` is replaced by the normalized `url`, or `url` defaults to `/` + `path`
//! 4. the directory-index convention is applied to `path`
//! 5. `template` gets its default extension

use crate::paths;
use crate::types::{PageKind, PageMeta};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Keys the resolver owns; front-matter values for them are discarded.
const COMPUTED_KEYS: &[&str] = &["id", "type", "path", "customUrl"];

/// Front-matter as written by the author, before resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    pub url: Option<String>,
    pub alt_url: Option<String>,
    pub template: Option<String>,
    pub skip: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Split a page into its front-matter block (if any) and body.
///
/// The block ends at the first blank line; a file that is all front-matter
/// has an empty body.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    if !text.trim_start().starts_with('{') {
        return (None, text);
    }
    match text.split_once("\n\n") {
        Some((block, body)) => (Some(block), body),
        None => (Some(text), ""),
    }
}

/// Parse a front-matter block. Fails on invalid JSON, a non-object, or a
/// recognized key with the wrong type.
pub fn parse_front_matter(block: &str) -> Result<FrontMatter, serde_json::Error> {
    serde_json::from_str(block)
}

/// Resolve the full metadata of a page from its id, source-relative path
/// and front-matter.
pub fn resolve_page_meta(id: usize, source_path: &str, front: FrontMatter) -> PageMeta {
    let kind = PageKind::from_extension(paths::extension(source_path).unwrap_or(""));
    let mut path = match kind {
        PageKind::Markdown => paths::markdown_to_html(source_path),
        _ => source_path.to_string(),
    };

    let alt_url = front.alt_url.filter(|u| !u.is_empty());
    let alt_path = alt_url
        .as_deref()
        .map(|alt| paths::with_directory_index(&paths::normalize(alt, &path)));

    let (url, custom_url) = match front.url.filter(|u| !u.is_empty()) {
        Some(url) => {
            path = paths::normalize(&url, &path);
            (url, true)
        }
        None => (format!("/{path}"), false),
    };
    let path = paths::with_directory_index(&path);

    let template = front
        .template
        .filter(|t| !t.is_empty())
        .map(|t| paths::template_name(&t));

    let mut extra = front.extra;
    for key in COMPUTED_KEYS {
        extra.remove(*key);
    }

    PageMeta {
        id,
        kind,
        url,
        path,
        custom_url,
        alt_url,
        alt_path,
        template,
        skip: front.skip.unwrap_or(false),
        extra,
    }
}
