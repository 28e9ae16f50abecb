//! Resource list loading, validation, and deduplication.
//!
//! The input is a JSON array of resource objects. Curated lists are often
//! built by pasting exported batches one after another, so a file holding
//! several top-level arrays (`[...] [...]` or `[...],\n[...]`) is accepted and
//! its arrays concatenated. Anything else is a [`LinkshelfError::Format`].

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use linkshelf_shared::{LinkshelfError, Resource, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Counters describing what the loader saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Entries found in the input.
    pub total: usize,
    /// Entries that passed validation (duplicates included).
    pub valid: usize,
    /// Entries skipped for a missing or unsupported URL.
    pub invalid: usize,
    /// Valid entries dropped because their URL was already seen.
    pub duplicates: usize,
}

/// Validated, deduplicated resources in input order.
#[derive(Debug, Clone)]
pub struct LoadedResources {
    pub resources: Vec<Resource>,
    pub stats: LoadStats,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Read and validate the resource list at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<LoadedResources> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        LinkshelfError::format(format!("cannot read resource list {}: {e}", path.display()))
    })?;

    let loaded = parse(&content)?;

    info!(
        total = loaded.stats.total,
        valid = loaded.stats.valid,
        invalid = loaded.stats.invalid,
        duplicates = loaded.stats.duplicates,
        "resources loaded"
    );

    Ok(loaded)
}

/// Parse, validate, and deduplicate resources from JSON text.
pub fn parse(content: &str) -> Result<LoadedResources> {
    let entries = parse_entries(content.trim_start_matches('\u{feff}'))?;
    let today = Utc::now().date_naive();

    let mut stats = LoadStats {
        total: entries.len(),
        ..LoadStats::default()
    };
    let mut seen = HashSet::new();
    let mut resources = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let resource = match resource_from_value(entry, today) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(index, error = %e, "skipping invalid resource");
                stats.invalid += 1;
                continue;
            }
        };
        stats.valid += 1;

        if !seen.insert(resource.identity_key()) {
            debug!(url = %resource.url, "duplicate URL, keeping first occurrence");
            stats.duplicates += 1;
            continue;
        }

        resources.push(resource);
    }

    Ok(LoadedResources { resources, stats })
}

// ---------------------------------------------------------------------------
// JSON structure
// ---------------------------------------------------------------------------

fn parse_entries(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => return Ok(items),
        Ok(other) => {
            return Err(LinkshelfError::format(format!(
                "expected a JSON array of resources, found {}",
                json_kind(&other)
            )));
        }
        Err(e) => debug!(error = %e, "single-array parse failed, trying concatenated arrays"),
    }

    let fragments = split_array_fragments(content)?;
    if fragments.is_empty() {
        return Err(LinkshelfError::format("no JSON array found in input"));
    }

    let mut items = Vec::new();
    for (index, fragment) in fragments.iter().enumerate() {
        let parsed: Vec<Value> = serde_json::from_str(fragment).map_err(|e| {
            LinkshelfError::format(format!("array fragment {} is not valid JSON: {e}", index + 1))
        })?;
        items.extend(parsed);
    }

    warn!(
        fragments = fragments.len(),
        entries = items.len(),
        "input holds several top-level arrays, concatenating them"
    );
    Ok(items)
}

/// Split text into its top-level `[...]` fragments.
///
/// Brackets inside JSON strings are ignored. Only whitespace and commas may
/// appear between fragments.
fn split_array_fragments(content: &str) -> Result<Vec<&str>> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '[' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    fragments.push(&content[start..=i]);
                }
            }
            c if depth == 0 && (c.is_whitespace() || c == ',') => {}
            c if depth == 0 => {
                return Err(LinkshelfError::format(format!(
                    "unexpected {c:?} at byte {i} outside a JSON array"
                )));
            }
            _ => {}
        }
    }

    if depth != 0 || in_string {
        return Err(LinkshelfError::format("unterminated JSON array in input"));
    }

    Ok(fragments)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Entry validation
// ---------------------------------------------------------------------------

fn resource_from_value(value: Value, today: NaiveDate) -> Result<Resource> {
    let Value::Object(mut map) = value else {
        return Err(LinkshelfError::validation(format!(
            "entry is {}, not an object",
            json_kind(&value)
        )));
    };

    let url = match map.remove("url") {
        Some(Value::String(url)) => url.trim().to_string(),
        Some(other) => {
            return Err(LinkshelfError::validation(format!(
                "url is {}, not a string",
                json_kind(&other)
            )));
        }
        None => return Err(LinkshelfError::validation("missing required field 'url'")),
    };

    if url.is_empty() {
        return Err(LinkshelfError::validation("empty 'url'"));
    }

    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(LinkshelfError::validation(format!("unsupported URL scheme: {url}")));
    }

    let title = take_string(&mut map, "title");
    let type_hint = take_string(&mut map, "type_hint").or_else(|| take_string(&mut map, "type"));
    let first_seen = take_string(&mut map, "first_seen")
        .and_then(|raw| parse_date(&raw))
        .unwrap_or(today);

    Ok(Resource {
        url,
        title,
        type_hint,
        first_seen,
        extra_fields: map,
    })
}

/// Remove `key` if it holds a non-blank string. Other value types stay in the map.
fn take_string(map: &mut serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        _ => return None,
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
