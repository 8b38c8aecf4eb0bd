//! # Pressroom
//!
//! A static site builder. A project directory of pages, layouts and assets
//! becomes a plain tree of files under `site/`, ready for any file server.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! One owned [`Site`](types::Site) value moves through four stages:
//!
//! ```text
//! 1. Scan      pages/ templates/ res/  →  Site      (filesystem → model)
//! 2. Plugins   Site                    →  Site      (configured transforms, in order)
//! 3. Render    &mut Site                            (markdown, Tera templates, layouts)
//! 4. Emit      &Site                   →  site/     (files + redirect stubs)
//! ```
//!
//! Stages never share state except through the `Site` and the
//! [`TemplateEngine`](render::TemplateEngine) handle, which is created before
//! the plugin chain so plugins can register filters and functions on it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks `pages/`, `templates/` and `res/` into a `Site` |
//! | [`plugins`] | Stage 2: plugin identifiers, resolver, bundled and external plugins |
//! | [`render`] | Stage 3: template engine wrapper, page and layout rendering |
//! | [`emit`] | Stage 4: writes pages, resources and redirect stubs |
//! | [`pipeline`] | Runs the stages in order; top-level [`BuildError`](pipeline::BuildError) |
//! | [`metadata`] | Front-matter parsing and URL / output path resolution |
//! | [`markdown`] | Markdown conversion that keeps raw markup blocks untouched |
//! | [`paths`] | URL normalization, directory index, extension and MIME helpers |
//! | [`config`] | `config.toml` loading, validation and the stock config |
//! | [`types`] | Shared types (`Site`, `Page`, `Resource`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Front-Matter Is JSON
//!
//! A page may start with a JSON object followed by a blank line. JSON is the
//! same format plugins exchange and templates see, so a key written by an
//! author, a plugin or a template reads the same everywhere.
//!
//! ## Plugins Are Whole-Site Transforms
//!
//! A plugin gets the entire site and returns it. Ordering is the order in
//! `config.toml`, nothing else. In-process plugins implement
//! [`Plugin`](plugins::Plugin); anything else is an executable speaking JSON
//! over stdin and stdout, so plugins can be written in any language.
//!
//! ## Raw Markup Survives Markdown
//!
//! Blocks of HTML inside markdown pages are copied into the output byte for
//! byte instead of being reinterpreted by the converter. See [`markdown`].

pub mod config;
pub mod emit;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod plugins;
pub mod render;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
