//! Output materialization.
//!
//! Stage 4 of the build pipeline. Writes the rendered [`Site`] to disk:
//!
//! ```text
//! project/site/
//! ├── index.html                # one file per page, at its resolved path
//! ├── blog/first-post.html
//! ├── new/index.html
//! ├── old/index.html            # redirect stub for altUrl "/old"
//! └── res/                      # resources, byte for byte
//!     ├── style.css
//!     └── logo.png
//! ```
//!
//! Pages are written first, then resources. The first failure aborts the
//! stage; files written before it are left in place.

use crate::paths;
use crate::types::{Page, Resource, Site};
use maud::{DOCTYPE, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output directory, relative to the project root.
pub const OUTPUT_DIR: &str = "site";

/// Resource directory, relative to the output root.
pub const RESOURCE_OUTPUT_DIR: &str = "res";

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What [`emit`] wrote, for reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitReport {
    /// Output root the paths below are relative to.
    pub root: PathBuf,
    /// Page paths, relative to the output root.
    pub pages: Vec<String>,
    /// Redirect stub paths, relative to the output root.
    pub redirects: Vec<String>,
    pub resources: usize,
}

/// `<project>/site`.
pub fn output_root(project: &Path) -> PathBuf {
    project.join(OUTPUT_DIR)
}

/// Something with a place in the output tree.
trait OutputItem {
    /// Path relative to the directory the item is written under.
    fn output_path(&self) -> &str;
    fn bytes(&self) -> &[u8];
    /// `(stub path, target url)` of an alternate location, if any.
    fn redirect(&self) -> Option<(&str, &str)> {
        None
    }
}

impl OutputItem for Page {
    fn output_path(&self) -> &str {
        &self.meta.path
    }

    fn bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    fn redirect(&self) -> Option<(&str, &str)> {
        let alt = self.meta.alt_path.as_deref()?;
        Some((alt, &self.meta.url))
    }
}

impl OutputItem for Resource {
    fn output_path(&self) -> &str {
        &self.path
    }

    fn bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

/// Write the site under `<source_root>/site`.
pub fn emit(site: &Site) -> Result<EmitReport, EmitError> {
    emit_to(site, &output_root(&site.source_root))
}

/// Write the site under an explicit output root.
pub fn emit_to(site: &Site, root: &Path) -> Result<EmitReport, EmitError> {
    let mut report = EmitReport {
        root: root.to_path_buf(),
        ..EmitReport::default()
    };

    for page in &site.pages {
        let written = write_item(root, page)?;
        tracing::debug!(page = %written.display(), "wrote");
        report.pages.push(page.meta.path.clone());
        if let Some((alt, url)) = page.redirect() {
            write_output(&target(root, alt), redirect_stub(url).as_bytes())?;
            tracing::debug!(from = alt, to = url, "wrote redirect");
            report.redirects.push(alt.to_string());
        }
    }

    let resource_root = root.join(RESOURCE_OUTPUT_DIR);
    for resource in &site.resources {
        write_item(&resource_root, resource)?;
        report.resources += 1;
    }

    tracing::info!(
        pages = report.pages.len(),
        redirects = report.redirects.len(),
        resources = report.resources,
        "emitted {}",
        root.display()
    );
    Ok(report)
}

fn write_item(root: &Path, item: &impl OutputItem) -> Result<PathBuf, EmitError> {
    let path = target(root, item.output_path());
    write_output(&path, item.bytes())?;
    Ok(path)
}

/// Join a `/`-separated relative path onto `root`.
///
/// Plugins may rewrite paths after scanning, so `..` is folded again here:
/// the result always stays under `root`.
fn target(root: &Path, rel: &str) -> PathBuf {
    paths::fold_segments(rel)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Create the parent directory of `path` (and its ancestors).
fn prepare(path: &Path) -> Result<(), EmitError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        }),
        None => Ok(()),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), EmitError> {
    prepare(path)?;
    fs::write(path, bytes).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// An HTML document that immediately sends the browser to `url`.
pub fn redirect_stub(url: &str) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta http-equiv="refresh" content=(format!("0; url={url}"));
            }
        }
    }
    .into_string()
}

/// Remove the output directory if present.
pub fn clean_output(root: &Path) -> Result<(), EmitError> {
    if !root.exists() {
        return Ok(());
    }
    tracing::debug!("removing {}", root.display());
    fs::remove_dir_all(root).map_err(|source| EmitError::Write {
        path: root.to_path_buf(),
        source,
    })
}
