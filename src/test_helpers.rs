//! Shared test utilities for the pressroom test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = scan(tmp.path()).unwrap();
//!
//! let page = find_page(&site, "blog/first-post.html");
//! assert_eq!(page.meta.url, "/blog/first-post.html");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::scan;
use crate::types::{Page, Resource, Site};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a text file under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    write_bytes(root, rel, contents.as_bytes());
}

/// Write a binary file under `root`, creating parent directories.
pub fn write_bytes(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Build an in-memory site from `(path relative to pages/, source text)`
/// pairs, exactly as scanning would. Ids follow slice order.
pub fn site_with_pages(pages: &[(&str, &str)]) -> Site {
    let pages = pages
        .iter()
        .enumerate()
        .map(|(id, (source_path, text))| {
            scan::read_page(id, source_path, text, Path::new(source_path)).unwrap()
        })
        .collect();
    Site {
        source_root: "/project".into(),
        pages,
        ..Site::default()
    }
}

// =========================================================================
// Site lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by output path. Panics if not found.
pub fn find_page<'a>(site: &'a Site, path: &str) -> &'a Page {
    site.pages
        .iter()
        .find(|p| p.meta.path == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = site.pages.iter().map(|p| p.meta.path.as_str()).collect();
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}

/// Find a resource by path relative to `res/`. Panics if not found.
pub fn find_resource<'a>(site: &'a Site, path: &str) -> &'a Resource {
    site.resources
        .iter()
        .find(|r| r.path == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = site.resources.iter().map(|r| r.path.as_str()).collect();
            panic!("resource '{path}' not found. Available: {paths:?}")
        })
}
