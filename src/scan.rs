//! Project scanning.
//!
//! Stage 1 of the build pipeline. Reads a project directory into a [`Site`]:
//!
//! ```text
//! project/
//! ├── config.toml               # Plugin list and options (optional)
//! ├── pages/                    # Content, any nesting
//! │   ├── index.md
//! │   ├── about.html
//! │   └── blog/
//! │       └── first-post.md
//! ├── templates/                # Layouts (.html only), any nesting
//! │   ├── post.html
//! │   └── partials/footer.html
//! └── res/                      # Static assets, copied unchanged
//!     ├── style.css
//!     └── logo.png
//! ```
//!
//! Entries are visited in file-name order, so page ids and iteration order
//! are stable from run to run. Hidden files and directories are ignored. A
//! missing subtree is an empty collection, not an error.
//!
//! Page metadata resolution (front-matter, URLs, output paths) lives in
//! [`metadata`](crate::metadata).

use crate::metadata;
use crate::paths;
use crate::types::{Page, Resource, ResourceData, Site};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const PAGES_DIR: &str = "pages";
pub const TEMPLATES_DIR: &str = "templates";
pub const RESOURCES_DIR: &str = "res";

/// Only files with this extension are loaded as templates.
pub const TEMPLATE_EXTENSION: &str = "html";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("malformed front-matter in {path}: {source}")]
    MalformedFrontMatter {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Scan a project root into a fully populated [`Site`].
pub fn scan(root: &Path) -> Result<Site, ScanError> {
    let source_root = fs::canonicalize(root).map_err(|source| ScanError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let pages = scan_pages(&source_root.join(PAGES_DIR))?;
    let templates = scan_templates(&source_root.join(TEMPLATES_DIR))?;
    let resources = scan_resources(&source_root.join(RESOURCES_DIR))?;

    tracing::info!(
        pages = pages.len(),
        templates = templates.len(),
        resources = resources.len(),
        "scanned {}",
        source_root.display()
    );

    Ok(Site {
        source_root,
        pages,
        resources,
        templates,
    })
}

/// Read one page from its text. `source_path` is relative to `pages/`.
///
/// `file` is only used to annotate errors.
pub fn read_page(id: usize, source_path: &str, text: &str, file: &Path) -> Result<Page, ScanError> {
    let (block, body) = metadata::split_front_matter(text);
    let front = match block {
        Some(block) => metadata::parse_front_matter(block).map_err(|source| {
            ScanError::MalformedFrontMatter {
                path: file.to_path_buf(),
                source,
            }
        })?,
        None => metadata::FrontMatter::default(),
    };

    let meta = metadata::resolve_page_meta(id, source_path, front);
    tracing::debug!(id, source = source_path, path = %meta.path, url = %meta.url, "page");
    Ok(Page {
        meta,
        data: body.to_string(),
    })
}

fn scan_pages(dir: &Path) -> Result<Vec<Page>, ScanError> {
    list_files(dir)?
        .into_iter()
        .enumerate()
        .map(|(id, (file, rel))| {
            let text = read_text(&file)?;
            read_page(id, &rel, &text, &file)
        })
        .collect()
}

fn scan_templates(dir: &Path) -> Result<BTreeMap<String, String>, ScanError> {
    let mut templates = BTreeMap::new();
    for (file, rel) in list_files(dir)? {
        if paths::extension(&rel) != Some(TEMPLATE_EXTENSION) {
            tracing::debug!(template = %rel, "ignoring non-template file");
            continue;
        }
        templates.insert(rel, read_text(&file)?);
    }
    Ok(templates)
}

fn scan_resources(dir: &Path) -> Result<Vec<Resource>, ScanError> {
    list_files(dir)?
        .into_iter()
        .map(|(file, rel)| {
            let bytes = fs::read(&file).map_err(|source| ScanError::Io {
                path: file.clone(),
                source,
            })?;
            Ok(classify_resource(rel, bytes))
        })
        .collect()
}

/// Build a resource from its bytes, decoding `text/*` assets as UTF-8.
///
/// A text asset that is not valid UTF-8 is kept as binary so it is still
/// copied byte for byte.
pub fn classify_resource(path: String, bytes: Vec<u8>) -> Resource {
    if paths::is_binary(&path) {
        return Resource {
            path,
            binary: true,
            data: ResourceData::Binary(bytes),
        };
    }
    match String::from_utf8(bytes) {
        Ok(text) => Resource {
            path,
            binary: false,
            data: ResourceData::Text(text),
        },
        Err(err) => {
            tracing::warn!(resource = %path, "text resource is not valid UTF-8, copying as binary");
            Resource {
                path,
                binary: true,
                data: ResourceData::Binary(err.into_bytes()),
            }
        }
    }
}

/// All regular files under `dir` as `(absolute path, /-separated relative path)`,
/// sorted by file name at every level.
fn list_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, ScanError> {
    if !dir.is_dir() {
        tracing::debug!("{} not found, skipping", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.into_path(), rel));
    }
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn read_text(file: &Path) -> Result<String, ScanError> {
    fs::read_to_string(file).map_err(|source| ScanError::Io {
        path: file.to_path_buf(),
        source,
    })
}
