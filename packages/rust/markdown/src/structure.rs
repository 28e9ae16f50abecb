//! Heading detection for flat extracted text.
//!
//! Page text arrives as one line per block, with blank lines after
//! paragraph-level blocks. A short standalone line that does not read like a
//! sentence is promoted to a markdown heading.

use std::sync::LazyLock;

use regex::Regex;

/// Lines at least this many characters long are never headings.
const MAX_HEADING_CHARS: usize = 80;

/// Trailing characters that mark a line as prose.
const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', ';', ',', ':'];

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+•]\s|\d+[.)]\s)").expect("valid regex"));

/// Promote heading candidates to markdown headings.
///
/// The first candidate becomes `#` unless the text already has a level-1
/// heading; every later distinct candidate becomes `##`. A candidate whose
/// text repeats the level-1 heading is left as a paragraph.
pub(crate) fn structure_headings(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut h1: Option<String> = lines
        .iter()
        .find_map(|l| l.strip_prefix("# ").map(|t| t.trim().to_string()));

    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if !is_heading_candidate(&lines, i) {
            out.push((*line).to_string());
            continue;
        }

        let repeats_title = h1.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(line));
        if repeats_title {
            out.push((*line).to_string());
        } else if h1.is_none() {
            h1 = Some((*line).to_string());
            out.push(format!("# {line}"));
        } else {
            out.push(format!("## {line}"));
        }
    }
    out.join("\n")
}

/// Text of the first level-1 heading, if any.
pub(crate) fn first_h1(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn is_heading_candidate(lines: &[&str], i: usize) -> bool {
    let line = lines[i];
    if line.is_empty()
        || line.chars().count() >= MAX_HEADING_CHARS
        || !line.chars().any(char::is_alphabetic)
        || is_markdown_heading(line)
        || LIST_ITEM_RE.is_match(line)
        || line.ends_with(SENTENCE_ENDINGS)
    {
        return false;
    }

    let preceded_by_break = i == 0 || lines[i - 1].is_empty();
    let followed_by_break = lines
        .get(i + 1)
        .is_some_and(|next| next.is_empty() || is_markdown_heading(next));

    preceded_by_break && followed_by_break
}

fn is_markdown_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}
