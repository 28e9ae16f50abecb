//! Text cleanup pipeline applied to extracted page text.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Run the full cleanup pipeline on raw extracted text.
pub(crate) fn run_pipeline(text: &str) -> String {
    let mut result = decode_entities(text);

    result = normalize_whitespace(&result);
    result = clean_blank_lines(&result);
    result = trim_blank_edges(&result);

    result
}

/// Decode entities and collapse whitespace in a single-line value.
pub(crate) fn clean_inline(value: &str) -> String {
    collapse_line(&decode_entities(value))
}

// ---------------------------------------------------------------------------
// Pass 1: Decode HTML entities
// ---------------------------------------------------------------------------

/// Decode named, decimal, and hex character references.
///
/// Unknown names and invalid code points are left untouched.
pub(crate) fn decode_entities(text: &str) -> String {
    static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]{1,31}));")
            .expect("valid regex")
    });

    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };

            match decoded {
                Some(c) if c != '\0' => c.to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "bull" => '\u{2022}',
        "middot" => '\u{b7}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "deg" => '\u{b0}',
        "times" => '\u{d7}',
        "euro" => '\u{20ac}',
        "pound" => '\u{a3}',
        "shy" => '\u{ad}',
        "zwj" => '\u{200d}',
        "zwnj" => '\u{200c}',
        _ => return None,
    };
    Some(c)
}

// ---------------------------------------------------------------------------
// Pass 2: Normalize whitespace within lines
// ---------------------------------------------------------------------------

/// Collapse whitespace runs (non-breaking spaces included) and trim each line.
fn normalize_whitespace(text: &str) -> String {
    text.lines().map(collapse_line).collect::<Vec<_>>().join("\n")
}

fn collapse_line(line: &str) -> String {
    // `split_whitespace` already treats U+00A0 as whitespace.
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Pass 3: Clean up excessive blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 3+ blank lines into exactly 2.
fn clean_blank_lines(text: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(text, "\n\n\n").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: Trim leading and trailing blank lines
// ---------------------------------------------------------------------------

fn trim_blank_edges(text: &str) -> String {
    text.trim_matches('\n').to_string()
}
