//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Pages are listed by positional index and title, with locations shown as
//! indented context lines. Pages without a `title` fall back to their output
//! path in parentheses, so the path is visibly standing in for a name.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Pages
//! 001 About
//!     URL: /about.html
//!     Layout: post.html
//! 002 (blog/first-post.html)
//!     URL: /blog/first-post.html
//! 003 Moved
//!     URL: /new/
//!     Redirect: /old
//!
//! Templates
//!     partials/footer.html
//!     post.html
//!
//! Resources
//!     img/logo.png (binary)
//!     style.css
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 About → about.html
//! 002 First Post → blog/first-post.html
//!
//! Checked 2 pages, nothing written
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 About → about.html
//! 002 First Post → blog/first-post.html
//! 003 Moved → new/index.html
//!
//! Redirects
//!     old/index.html → /new/
//!
//! Wrote 3 pages, 1 redirect, 2 resources to site/
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::emit::EmitReport;
use crate::types::{Page, Site};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Page header: index + title, or the output path in parens when untitled.
///
/// ```text
/// 001 About
/// 002 (feed.xml)
/// ```
fn page_header(index: usize, page: &Page) -> String {
    match page.meta.get("title").and_then(|t| t.as_str()) {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), page.meta.path),
    }
}

/// `1 page`, `2 pages`.
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scanned inventory: pages, templates, resources.
pub fn format_scan_output(site: &Site) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, page) in site.pages.iter().enumerate() {
        lines.push(page_header(i + 1, page));
        lines.push(format!("    URL: {}", page.meta.url));
        if let Some(alt) = &page.meta.alt_url {
            lines.push(format!("    Redirect: {alt}"));
        }
        if let Some(layout) = &page.meta.template {
            lines.push(format!("    Layout: {layout}"));
        }
        if page.meta.skip {
            lines.push("    Skipped".to_string());
        }
    }

    if !site.templates.is_empty() {
        lines.push(String::new());
        lines.push("Templates".to_string());
        lines.extend(site.templates.keys().map(|name| format!("    {name}")));
    }

    if !site.resources.is_empty() {
        lines.push(String::new());
        lines.push("Resources".to_string());
        for resource in &site.resources {
            if resource.binary {
                lines.push(format!("    {} (binary)", resource.path));
            } else {
                lines.push(format!("    {}", resource.path));
            }
        }
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(site: &Site) {
    for line in format_scan_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Check / build output
// ============================================================================

fn page_lines(site: &Site) -> Vec<String> {
    site.pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{} \u{2192} {}", page_header(i + 1, page), page.meta.path))
        .collect()
}

/// Format the result of a dry run: every page with its would-be output path.
pub fn format_check_output(site: &Site) -> Vec<String> {
    let mut lines = page_lines(site);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Checked {}, nothing written", plural(site.pages.len(), "page")));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}

/// Format the result of a full build.
///
/// `project_root` shortens the output directory in the summary line.
pub fn format_build_output(site: &Site, report: &EmitReport, project_root: &Path) -> Vec<String> {
    let mut lines = page_lines(site);

    let redirects: Vec<String> = site
        .pages
        .iter()
        .filter_map(|page| {
            let alt = page.meta.alt_path.as_deref()?;
            Some(format!("    {} \u{2192} {}", alt, page.meta.url))
        })
        .collect();
    if !redirects.is_empty() {
        lines.push(String::new());
        lines.push("Redirects".to_string());
        lines.extend(redirects);
    }

    let root = report
        .root
        .strip_prefix(project_root)
        .unwrap_or(&report.root);
    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {}, {} to {}/",
        plural(report.pages.len(), "page"),
        plural(report.redirects.len(), "redirect"),
        plural(report.resources, "resource"),
        root.display()
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(site: &Site, report: &EmitReport, project_root: &Path) {
    for line in format_build_output(site, report, project_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
