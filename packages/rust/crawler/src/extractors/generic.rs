//! Generic (fallback) extractor.
//!
//! Works on arbitrary HTML pages: picks a content root with readability-style
//! selectors, drops page chrome, and flattens the remaining tree into text
//! with one logical line per block element.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use linkshelf_shared::{ExtractedContent, Result};

use super::Extractor;
use crate::fetch::FetchedPage;

/// Elements never rendered as content.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "nav", "header", "footer",
    "aside", "form", "button", "canvas", "object", "embed", "head",
];

/// Blocks followed by a blank line.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "dl", "table", "blockquote", "section",
    "article", "figure", "details",
];

/// Blocks that start and end a line.
const LINE_TAGS: &[&str] = &[
    "address", "dd", "div", "dt", "fieldset", "figcaption", "li", "main", "summary", "tr",
    "caption", "thead", "tbody", "tfoot", "dialog",
];

/// Content root candidates, most specific first.
const ROOT_SELECTORS: &[&str] = &["main", "article", r#"[role="main"]"#, ".content", "#content"];

static ROOTS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ROOT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("root selector"))
        .collect()
});
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("body selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("title selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("h1 selector"));
static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").expect("meta selector"));

/// Extractor that works on any HTML page.
pub struct GenericExtractor;

impl Extractor for GenericExtractor {
    fn name(&self) -> &str {
        "generic"
    }

    fn extract(&self, doc: &Html, page: &FetchedPage) -> Result<ExtractedContent> {
        Ok(ExtractedContent {
            raw_text: extract_text(doc),
            title: extract_title(doc),
            description: extract_description(doc),
            source_url: page.requested_url.clone(),
            domain: page.domain(),
            extracted_at: page.fetched_at,
            extractor_name: self.name().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// `<title>`, then `og:title`, then the first `<h1>`.
pub fn extract_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| meta_content(doc, "og:title"))
        .or_else(|| {
            doc.select(&H1)
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .find(|t| !t.is_empty())
        })
}

/// `meta[name=description]`, then `og:description`.
pub fn extract_description(doc: &Html) -> Option<String> {
    meta_content(doc, "description").or_else(|| meta_content(doc, "og:description"))
}

/// Content of the first `<meta>` whose `name` or `property` matches `key`,
/// compared case-insensitively.
fn meta_content(doc: &Html, key: &str) -> Option<String> {
    doc.select(&META)
        .filter(|el| {
            let v = el.value();
            v.attr("name")
                .or_else(|| v.attr("property"))
                .is_some_and(|n| n.eq_ignore_ascii_case(key))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|c| !c.is_empty())
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Flatten the content root of `doc` into block-structured text.
pub fn extract_text(doc: &Html) -> String {
    for selector in ROOTS.iter() {
        if let Some(root) = doc.select(selector).next() {
            let text = render_text(root);
            if !text.is_empty() {
                return text;
            }
        }
    }
    doc.select(&BODY).next().map(render_text).unwrap_or_default()
}

fn render_text(root: ElementRef<'_>) -> String {
    let mut out = TextBuilder::default();
    walk(root, &mut out);
    out.finish()
}

fn walk(element: ElementRef<'_>, out: &mut TextBuilder) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name)
                    || el.attr("hidden").is_some()
                    || el.attr("aria-hidden") == Some("true")
                {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };

                match name {
                    "br" => out.break_line(),
                    "hr" => out.paragraph_break(),
                    "pre" => {
                        out.paragraph_break();
                        out.push_preformatted(&child_el.text().collect::<String>());
                        out.paragraph_break();
                    }
                    "td" | "th" => {
                        out.push(" ");
                        walk(child_el, out);
                        out.push(" ");
                    }
                    _ if PARAGRAPH_TAGS.contains(&name) => {
                        out.paragraph_break();
                        walk(child_el, out);
                        out.paragraph_break();
                    }
                    _ if LINE_TAGS.contains(&name) => {
                        out.break_line();
                        walk(child_el, out);
                        out.break_line();
                    }
                    _ => walk(child_el, out),
                }
            }
            _ => {}
        }
    }
}

/// Accumulates inline text into lines.
#[derive(Default)]
struct TextBuilder {
    lines: Vec<String>,
    current: String,
}

impl TextBuilder {
    fn push(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = collapse_whitespace(&self.current);
        self.current.clear();
        if !line.is_empty() {
            self.lines.push(line);
        }
    }

    fn paragraph_break(&mut self) {
        self.break_line();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Preformatted text keeps its line structure.
    fn push_preformatted(&mut self, text: &str) {
        self.break_line();
        for line in text.trim_matches('\n').lines() {
            self.lines.push(line.trim_end().to_string());
        }
    }

    fn finish(mut self) -> String {
        self.break_line();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
