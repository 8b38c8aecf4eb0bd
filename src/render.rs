//! Page rendering.
//!
//! Stage 3 of the build pipeline. Every page not marked `skip` is rewritten in
//! place:
//!
//! | Kind | Body |
//! |------|------|
//! | `html`, `xml` | evaluated as a Tera template with `page` and `site` |
//! | `md` | converted by [`markdown::render`], raw markup preserved |
//! | anything else | left as-is |
//!
//! Then, if the page names a layout, the layout is evaluated with `content`
//! (the body, embedded unescaped), `page` and `site`, and its output becomes
//! the page.
//!
//! Tera rejects lookups of undefined variables. A layout shared by pages
//! that may omit a front-matter key has to read it through `default`:
//!
//! ```text
//! <title>{{ page.title | default(value="") }}</title>
//! ```
//!
//! ## Template context
//!
//! `site` is a view of the live [`Site`]: pages (metadata and current body),
//! resources (path and binary flag, no contents) and template names. Pages
//! are rendered in order, so a page sees the rendered output of the pages
//! before it and the source of the pages after it.
//!
//! ## The engine handle
//!
//! [`TemplateEngine`] is created before the plugin chain runs and handed to
//! every plugin, so plugins can register filters, functions and partials.
//! Layouts from `templates/` are loaded after the chain, which lets plugins
//! add or replace entries in [`Site::templates`] too.

use crate::config::{MarkdownConfig, TemplatesConfig};
use crate::markdown;
use crate::paths;
use crate::types::{Page, PageKind, PageMeta, Site};
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};
use thiserror::Error;

/// Names the page body is compiled under; the suffix drives autoescaping.
const PAGE_TEMPLATE_HTML: &str = "__page__.html";
const PAGE_TEMPLATE_XML: &str = "__page__.xml";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot compile {name}: {message}")]
    TemplateCompile { name: String, message: String },
    #[error("cannot render {name}: {message}")]
    TemplateRender { name: String, message: String },
}

/// Shared template engine, handed to plugins and used for every page.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(config: &TemplatesConfig) -> Self {
        let mut tera = Tera::default();
        if !config.autoescape {
            tera.autoescape_on(vec![]);
        }
        Self { tera }
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Mutable access for plugins registering filters, functions or partials.
    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }

    /// Register every cached template under its relative path.
    ///
    /// All templates are added in one batch so `{% extends %}` and
    /// `{% include %}` can refer to each other regardless of name order.
    pub fn load_templates<'a, I>(&mut self, templates: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let batch: Vec<(&str, &str)> = templates
            .into_iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
            .collect();
        let count = batch.len();
        self.tera
            .add_raw_templates(batch)
            .map_err(|e| RenderError::TemplateCompile {
                name: "templates".to_string(),
                message: describe(&e),
            })?;
        tracing::debug!("loaded {count} template(s)");
        Ok(())
    }

    /// Compile a page body as a template and evaluate it.
    pub fn render_body(
        &mut self,
        kind: &PageKind,
        body: &str,
        context: &Context,
        page_path: &str,
    ) -> Result<String, RenderError> {
        let name = match kind {
            PageKind::Xml => PAGE_TEMPLATE_XML,
            _ => PAGE_TEMPLATE_HTML,
        };
        self.tera
            .add_raw_template(name, body)
            .map_err(|e| RenderError::TemplateCompile {
                name: page_path.to_string(),
                message: describe(&e),
            })?;
        self.tera
            .render(name, context)
            .map_err(|e| RenderError::TemplateRender {
                name: page_path.to_string(),
                message: describe(&e),
            })
    }

    /// Evaluate a registered layout.
    pub fn render_layout(
        &self,
        layout: &str,
        context: &Context,
        page_path: &str,
    ) -> Result<String, RenderError> {
        self.tera
            .render(layout, context)
            .map_err(|e| RenderError::TemplateRender {
                name: format!("{page_path} (layout {layout})"),
                message: describe(&e),
            })
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

/// Flatten a Tera error and its causes into one line.
fn describe(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut cause = error.source();
    while let Some(err) = cause {
        messages.push(err.to_string());
        cause = err.source();
    }
    messages.join(": ")
}

/// What templates see as `site`.
#[derive(Serialize)]
struct SiteView<'a> {
    source_root: &'a Path,
    pages: &'a [Page],
    resources: Vec<ResourceView<'a>>,
    templates: Vec<&'a str>,
}

#[derive(Serialize)]
struct ResourceView<'a> {
    path: &'a str,
    binary: bool,
}

impl<'a> SiteView<'a> {
    fn of(site: &'a Site) -> Self {
        Self {
            source_root: &site.source_root,
            pages: &site.pages,
            resources: site
                .resources
                .iter()
                .map(|r| ResourceView {
                    path: &r.path,
                    binary: r.binary,
                })
                .collect(),
            templates: site.templates.keys().map(String::as_str).collect(),
        }
    }
}

fn page_context(meta: &PageMeta, site: &Site) -> Context {
    let mut context = Context::new();
    context.insert("page", meta);
    context.insert("site", &SiteView::of(site));
    context
}

/// Render every page of the site in order.
pub fn render(
    site: &mut Site,
    engine: &mut TemplateEngine,
    markdown: &MarkdownConfig,
) -> Result<(), RenderError> {
    let mut rendered = 0usize;
    for index in 0..site.pages.len() {
        if site.pages[index].meta.skip {
            tracing::debug!(path = %site.pages[index].meta.path, "skipped");
            continue;
        }
        let (data, path) = render_page(&site.pages[index], site, engine, markdown)?;
        let page = &mut site.pages[index];
        page.data = data;
        page.meta.path = path;
        rendered += 1;
    }
    tracing::info!("rendered {rendered} of {} page(s)", site.pages.len());
    Ok(())
}

/// Render one page against the site, returning its new body and path.
pub fn render_page(
    page: &Page,
    site: &Site,
    engine: &mut TemplateEngine,
    markdown: &MarkdownConfig,
) -> Result<(String, String), RenderError> {
    let meta = &page.meta;
    let mut path = meta.path.clone();

    let body = match &meta.kind {
        PageKind::Html | PageKind::Xml => {
            let context = page_context(meta, site);
            engine.render_body(&meta.kind, &page.data, &context, &meta.path)?
        }
        PageKind::Markdown => {
            if !meta.custom_url {
                path = paths::markdown_to_html(&path);
            }
            markdown::render(&page.data, markdown)
        }
        PageKind::Other(ext) => {
            tracing::debug!(path = %meta.path, kind = %ext, "no renderer, passing through");
            page.data.clone()
        }
    };

    let body = match &meta.template {
        Some(layout) => {
            let mut context = page_context(meta, site);
            context.insert("content", &body);
            engine.render_layout(layout, &context, &meta.path)?
        }
        None => body,
    };

    tracing::debug!(path = %path, layout = ?meta.template, "rendered");
    Ok((body, path))
}
