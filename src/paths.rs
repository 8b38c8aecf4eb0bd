//! URL and output-path normalization.
//!
//! Every page lands at a path relative to the output root. These helpers turn
//! declared URLs into such paths and apply the directory-index convention:
//!
//! - `/about/` → `about/index.html` (absolute URL, leading slash stripped)
//! - `archive.html` declared by `blog/post.md` → `blog/archive.html`
//!   (relative URL, resolved against the source file's directory)
//! - `../feed.xml` declared by `blog/post.md` → `feed.xml`
//!
//! Paths always use `/` separators, regardless of platform. Nothing here
//! touches the filesystem. MIME classification is delegated to `mime_guess`.

use mime_guess::{Mime, mime};

/// File name appended to extensionless paths.
pub const DIRECTORY_INDEX: &str = "index.html";

/// Resolve a declared URL into a root-relative output path.
///
/// A leading `/` marks the URL as root-relative: the slash is stripped.
/// Anything else is joined to the *directory* of `current`. `.` and `..`
/// segments are folded lexically; `..` never climbs above the output root.
/// A trailing `/` survives so [`with_directory_index`] still sees a directory.
pub fn normalize(url: &str, current: &str) -> String {
    match url.strip_prefix('/') {
        Some(rooted) => fold_segments(rooted),
        None => {
            let dir = parent(current);
            if dir.is_empty() {
                fold_segments(url)
            } else {
                fold_segments(&format!("{dir}/{url}"))
            }
        }
    }
}

/// Append [`DIRECTORY_INDEX`] when `path` has no file extension.
pub fn with_directory_index(path: &str) -> String {
    if has_extension(path) {
        return path.to_string();
    }
    let dir = path.trim_end_matches('/');
    if dir.is_empty() {
        DIRECTORY_INDEX.to_string()
    } else {
        format!("{dir}/{DIRECTORY_INDEX}")
    }
}

/// Extension of the last path segment, without the dot.
///
/// Dotfiles (`.htaccess`) and paths ending in `/` have no extension.
pub fn extension(path: &str) -> Option<&str> {
    if path.ends_with('/') {
        return None;
    }
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(&name[dot + 1..]),
    }
}

pub fn has_extension(path: &str) -> bool {
    extension(path).is_some()
}

/// Replace a trailing `.md` with `.html`; other paths are returned unchanged.
pub fn markdown_to_html(path: &str) -> String {
    match path.strip_suffix(".md") {
        Some(stem) => format!("{stem}.html"),
        None => path.to_string(),
    }
}

/// Give a template name the `.html` extension when it has none.
pub fn template_name(name: &str) -> String {
    if has_extension(name) {
        name.to_string()
    } else {
        format!("{name}.html")
    }
}

/// Everything before the last `/`, or `""` for top-level paths.
pub fn parent(path: &str) -> &str {
    path.rfind('/').map(|slash| &path[..slash]).unwrap_or("")
}

fn file_name(path: &str) -> &str {
    path.rfind('/').map(|slash| &path[slash + 1..]).unwrap_or(path)
}

/// Fold `.` and `..` lexically. `..` at the top is dropped.
pub(crate) fn fold_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    let mut folded = segments.join("/");
    if !folded.is_empty() && (path.ends_with('/') || path.ends_with("/.")) {
        folded.push('/');
    }
    folded
}

/// MIME type for a file name, guessed from its extension.
///
/// Unknown or missing extensions give `application/octet-stream`.
pub fn mime_type(path: &str) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// True when the file should be read and written as bytes: anything that is
/// not `text/*`.
pub fn is_binary(path: &str) -> bool {
    mime_type(path).type_() != mime::TEXT
}
