//! URL-based content type detection.
//!
//! Rules are tried in priority order (GitHub, YouTube, blog, article); the
//! first match wins. A URL that cannot be parsed, or has no host, is `other`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use linkshelf_shared::{Category, CategoryMetadata, ClassifiedResource, Resource};

/// Hosts that serve GitHub repositories.
const GITHUB_HOSTS: &[&str] = &["github.com"];

/// Hosts that serve YouTube watch pages.
const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "m.youtube.com", "music.youtube.com"];

/// YouTube path prefixes followed by a video ID segment.
const YOUTUBE_ID_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// Path segments that mark a blog post.
const BLOG_SEGMENTS: &[&str] = &["blog", "blogs", "post", "posts"];

/// Blogging platforms matched by exact host.
const BLOG_HOSTS: &[&str] = &["medium.com", "dev.to", "hashnode.dev", "substack.com"];

/// Blogging platforms matched by host suffix.
const BLOG_HOST_SUFFIXES: &[&str] = &[
    ".medium.com",
    ".substack.com",
    ".hashnode.dev",
    ".wordpress.com",
    ".blogspot.com",
    ".ghost.io",
];

/// Host prefixes used by self-hosted blogs.
const BLOG_HOST_PREFIXES: &[&str] = &["blog.", "blogs."];

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{4,}$").expect("video id regex"));

/// Classify a resource by its URL.
pub fn classify(resource: Resource) -> ClassifiedResource {
    let (category, metadata) = classify_url(&resource.url);
    debug!(url = %resource.url, %category, "classified resource");
    ClassifiedResource {
        resource,
        category,
        metadata,
    }
}

/// Classify a raw URL, returning its category and captured identifiers.
pub fn classify_url(raw: &str) -> (Category, CategoryMetadata) {
    let mut metadata = CategoryMetadata::new();

    let Ok(url) = Url::parse(raw.trim()) else {
        return (Category::Other, metadata);
    };
    let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
        return (Category::Other, metadata);
    };

    let host = host.to_lowercase();
    metadata.insert("domain".into(), host.clone());

    let bare_host = host.strip_prefix("www.").unwrap_or(&host);
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if let Some((owner, repo)) = match_github(bare_host, &segments) {
        metadata.insert("full_name".into(), format!("{owner}/{repo}"));
        metadata.insert("owner".into(), owner);
        metadata.insert("repo".into(), repo);
        return (Category::GithubRepo, metadata);
    }

    if let Some(video_id) = match_youtube(bare_host, &url, &segments) {
        metadata.insert("video_id".into(), video_id);
        return (Category::YoutubeVideo, metadata);
    }

    if is_blog(bare_host, &segments) {
        return (Category::BlogPost, metadata);
    }

    (Category::Article, metadata)
}

fn match_github(host: &str, segments: &[&str]) -> Option<(String, String)> {
    if !GITHUB_HOSTS.contains(&host) {
        return None;
    }
    let [owner, repo, ..] = segments else {
        return None;
    };
    let repo: &str = repo;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(((*owner).to_string(), repo.to_string()))
}

fn match_youtube(host: &str, url: &Url, segments: &[&str]) -> Option<String> {
    let candidate = if host == "youtu.be" {
        segments.first().map(|s| (*s).to_string())
    } else if YOUTUBE_HOSTS.contains(&host) {
        match segments {
            ["watch", ..] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            [prefix, id, ..] if YOUTUBE_ID_PREFIXES.contains(prefix) => Some((*id).to_string()),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID_RE.is_match(id))
}

fn is_blog(host: &str, segments: &[&str]) -> bool {
    let path_match = segments
        .iter()
        .any(|segment| BLOG_SEGMENTS.contains(&segment.to_lowercase().as_str()));

    path_match
        || BLOG_HOSTS.contains(&host)
        || BLOG_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
        || BLOG_HOST_PREFIXES.iter().any(|prefix| host.starts_with(prefix))
}
