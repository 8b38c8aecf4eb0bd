//! Markdown rendering that leaves embedded markup alone.
//!
//! Markdown converters reflow and escape raw HTML in surprising ways,
//! especially multi-line blocks. Any paragraph whose text starts with `<` is
//! therefore lifted out before conversion and put back afterwards:
//!
//! ```text
//! # Title                         # Title
//!
//! <figure>              protect   %%rawhtml0%%          convert → restore
//!   <img src="a.png">   ───────►                        ───────────────►  <h1>Title</h1>
//! </figure>                       Some *text*.                            <figure>…</figure>
//!                                                                         <p>Some <em>text</em>.</p>
//! Some *text*.
//! ```
//!
//! The side table ([`RawBlocks`]) belongs to a single [`render`] call and is
//! never shared between pages.

use crate::config::MarkdownConfig;
use pulldown_cmark::{Options, Parser, html};

const TOKEN_OPEN: &str = "%%rawhtml";
const TOKEN_CLOSE: &str = "%%";

/// Raw markup blocks lifted out of one page, indexed by placeholder number.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawBlocks(Vec<String>);

impl RawBlocks {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

fn placeholder(index: usize) -> String {
    format!("{TOKEN_OPEN}{index}{TOKEN_CLOSE}")
}

/// Index encoded in a converter output line that is exactly a
/// paragraph-wrapped placeholder.
fn wrapped_placeholder_index(line: &str) -> Option<usize> {
    line.strip_prefix("<p>")?
        .strip_suffix("</p>")?
        .strip_prefix(TOKEN_OPEN)?
        .strip_suffix(TOKEN_CLOSE)?
        .parse()
        .ok()
}

/// Replace every blank-line-separated paragraph that starts with `<` by a
/// placeholder token.
pub fn protect(text: &str) -> (String, RawBlocks) {
    let mut blocks = Vec::new();
    let protected = text
        .split("\n\n")
        .map(|block| {
            if block.trim_start().starts_with('<') {
                blocks.push(block.to_string());
                placeholder(blocks.len() - 1)
            } else {
                block.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    if !blocks.is_empty() {
        tracing::debug!("protected {} raw markup block(s)", blocks.len());
    }
    (protected, RawBlocks(blocks))
}

/// Put the stored blocks back in place of their paragraph-wrapped placeholders.
///
/// A placeholder that the converter did not emit as a paragraph of its own
/// (or whose index is unknown) is left untouched.
pub fn restore(rendered: &str, blocks: &RawBlocks) -> String {
    if blocks.is_empty() {
        return rendered.to_string();
    }
    rendered
        .split('\n')
        .map(|line| {
            wrapped_placeholder_index(line)
                .and_then(|index| blocks.get(index))
                .unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// pulldown-cmark options for the configured extensions.
pub fn parser_options(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    options.set(Options::ENABLE_TABLES, config.tables);
    options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
    options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
    options.set(Options::ENABLE_TASKLISTS, config.tasklists);
    options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
    options
}

/// Plain markdown → HTML conversion.
pub fn to_html(text: &str, config: &MarkdownConfig) -> String {
    let parser = Parser::new_ext(text, parser_options(config));
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Convert a markdown body, passing raw markup paragraphs through verbatim.
pub fn render(text: &str, config: &MarkdownConfig) -> String {
    let (protected, blocks) = protect(text);
    let converted = to_html(&protected, config);
    restore(&converted, &blocks)
}
