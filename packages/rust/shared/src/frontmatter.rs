//! Ordered YAML-style frontmatter block.
//!
//! Only flat `key: scalar` pairs are supported, which is all the pipeline
//! writes. Insertion order is preserved by both [`Frontmatter::render`] and
//! [`Frontmatter::parse`].

use crate::error::{LinkshelfError, Result};

const DELIMITER: &str = "---";

/// Ordered mapping of frontmatter keys to scalar values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, String)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a `---` delimited block ending in a newline.
    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&render_scalar(value));
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }

    /// Parse a document that starts with a frontmatter block.
    ///
    /// Returns the frontmatter and the body that follows it, with the single
    /// separating blank line removed.
    pub fn parse(document: &str) -> Result<(Self, &str)> {
        let rest = document
            .strip_prefix("---\n")
            .or_else(|| document.strip_prefix("---\r\n"))
            .ok_or_else(|| LinkshelfError::parse("document does not start with frontmatter"))?;

        let mut frontmatter = Self::new();
        let mut offset = 0;

        for line in rest.split_inclusive('\n') {
            offset += line.len();
            let line = line.trim_end_matches(['\n', '\r']);

            if line == DELIMITER {
                let body = &rest[offset..];
                let body = body
                    .strip_prefix('\n')
                    .or_else(|| body.strip_prefix("\r\n"))
                    .unwrap_or(body);
                return Ok((frontmatter, body));
            }

            if line.trim().is_empty() {
                continue;
            }

            let (key, raw_value) = line
                .split_once(':')
                .ok_or_else(|| LinkshelfError::parse(format!("malformed frontmatter line: {line}")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(LinkshelfError::parse(format!("empty frontmatter key: {line}")));
            }
            frontmatter.insert(key, parse_scalar(raw_value.trim())?);
        }

        Err(LinkshelfError::parse("unterminated frontmatter block"))
    }
}

/// Render a scalar, quoting it when a plain YAML scalar would change meaning.
fn render_scalar(value: &str) -> String {
    if needs_quotes(value) {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    const RESERVED: [&str; 8] = ["true", "false", "yes", "no", "null", "~", "on", "off"];
    const LEADING: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
        '`',
    ];

    value.is_empty()
        || value.trim() != value
        || value.starts_with(LEADING)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || value.contains(['\n', '\r', '"', '\\'])
        || RESERVED.contains(&value.to_lowercase().as_str())
}

fn parse_scalar(raw: &str) -> Result<String> {
    let Some(inner) = raw.strip_prefix('"') else {
        return Ok(raw.to_string());
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or_else(|| LinkshelfError::parse(format!("unterminated quoted value: {raw}")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Ok(out)
}
