//! Plugins bundled in the `core/` namespace.

use super::{Plugin, PluginFailure};
use crate::metadata::{self, FrontMatter};
use crate::paths;
use crate::render::TemplateEngine;
use crate::types::{Page, PageKind, Site};
use serde_json::Value;

/// Output path of the page `core/sitemap` appends.
pub const SITEMAP_PATH: &str = "sitemap.xml";

/// Body of the sitemap page. Rendered like any xml page, so it lists the
/// site as it stands after the whole plugin chain.
const SITEMAP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{%- for p in site.pages %}{% if p.meta.path != page.path %}
  <url><loc>{{ p.meta.url }}</loc></url>
{%- endif %}{% endfor %}
</urlset>
"#;

/// `core/drafts`: drops every page whose front-matter sets `"draft": true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftsPlugin;

impl Plugin for DraftsPlugin {
    fn apply(&self, mut site: Site, _: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        let before = site.pages.len();
        site.pages
            .retain(|page| page.meta.get("draft") != Some(&Value::Bool(true)));
        let dropped = before - site.pages.len();
        if dropped > 0 {
            tracing::info!(dropped, "removed draft pages");
        }
        Ok(site)
    }
}

/// `core/titles`: gives every markdown page a `title` value.
///
/// Pages that already set one in front-matter keep it. Otherwise the first
/// `# heading` line is used, falling back to the output file name with
/// dashes turned into spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitlesPlugin;

impl Plugin for TitlesPlugin {
    fn apply(&self, mut site: Site, _: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        for page in &mut site.pages {
            if page.meta.kind != PageKind::Markdown || page.meta.get("title").is_some() {
                continue;
            }
            let title = heading_title(&page.data).unwrap_or_else(|| path_title(&page.meta.path));
            tracing::debug!(page = %page.meta.path, %title, "title");
            page.meta.extra.insert("title".to_string(), Value::String(title));
        }
        Ok(site)
    }
}

/// `core/sitemap`: appends a `sitemap.xml` page listing the URL of every
/// other page.
///
/// A project that already has a page at `sitemap.xml` keeps its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapPlugin;

impl Plugin for SitemapPlugin {
    fn apply(&self, mut site: Site, _: &mut TemplateEngine) -> Result<Site, PluginFailure> {
        if site.pages.iter().any(|page| page.meta.path == SITEMAP_PATH) {
            tracing::debug!("{SITEMAP_PATH} already present, leaving it alone");
            return Ok(site);
        }
        let meta = metadata::resolve_page_meta(site.pages.len(), SITEMAP_PATH, FrontMatter::default());
        tracing::debug!(pages = site.pages.len(), "adding {SITEMAP_PATH}");
        site.pages.push(Page {
            meta,
            data: SITEMAP_TEMPLATE.to_string(),
        });
        Ok(site)
    }
}

fn heading_title(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}

/// `blog/first-post.html` → `first post`, `new/index.html` → `new`.
fn path_title(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.split_once('.').map_or(file, |(stem, _)| stem);
    let name = if stem == "index" {
        paths::parent(path)
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(stem)
    } else {
        stem
    };
    name.replace('-', " ")
}
