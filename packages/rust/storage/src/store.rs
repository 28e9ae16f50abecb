//! Markdown document storage.
//!
//! Documents land at `<output_root>/<directory>/<slug>.md`. The directory is
//! an explicit override, the category's fixed directory, or the domain slug.
//! Name collisions get a numeric suffix; nothing is ever overwritten.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{info, instrument};
use url::Url;

use linkshelf_shared::{ClassifiedResource, LinkshelfError, ProcessedDocument, Result};

use crate::write_atomic;

/// Maximum slug length in characters.
const MAX_SLUG_CHARS: usize = 80;

/// Maximum slug length in bytes, leaving room for `-N.md` under the
/// 255-byte filename limit.
const MAX_SLUG_BYTES: usize = 150;

/// Stem used when neither the title nor the URL yields a slug.
const FALLBACK_STEM: &str = "index";

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub files_written: usize,
    pub bytes_written: u64,
}

/// Writes processed documents under a fixed output root.
///
/// Safe to share across tasks: path allocation is serialized so two
/// resources resolving to the same name never race for it.
#[derive(Debug)]
pub struct StorageManager {
    output_root: PathBuf,
    allocated: Mutex<HashSet<PathBuf>>,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl StorageManager {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            allocated: Mutex::new(HashSet::new()),
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn stats(&self) -> StorageStats {
        StorageStats {
            files_written: self.files_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }

    /// Write `doc` and return the path it was written to.
    #[instrument(skip_all, fields(url = %resource.resource.url))]
    pub fn store(
        &self,
        doc: &ProcessedDocument,
        resource: &ClassifiedResource,
        explicit_category: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.output_root.join(directory_for(resource, explicit_category));
        std::fs::create_dir_all(&dir).map_err(|e| storage_error(&dir, &e))?;

        let stem = file_stem(doc.title.as_deref(), &resource.resource.url);
        let path = self.allocate(&dir, &stem);

        let contents = doc.render();
        if let Err(e) = write_atomic(&path, contents.as_bytes()) {
            self.release(&path);
            return Err(e);
        }

        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(contents.len() as u64, Ordering::Relaxed);
        info!(path = %path.display(), bytes = contents.len(), "document stored");

        Ok(path)
    }

    /// Reserve the first free `stem.md`, `stem-1.md`, `stem-2.md`, ...
    fn allocate(&self, dir: &Path, stem: &str) -> PathBuf {
        let mut allocated = self.allocated.lock().unwrap_or_else(PoisonError::into_inner);
        let mut n = 0usize;
        loop {
            let name = if n == 0 {
                format!("{stem}.md")
            } else {
                format!("{stem}-{n}.md")
            };
            let candidate = dir.join(name);
            if !allocated.contains(&candidate) && !candidate.exists() {
                allocated.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }

    fn release(&self, path: &Path) {
        self.allocated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }
}

/// Output directory name for a resource.
pub fn directory_for(resource: &ClassifiedResource, explicit_category: Option<&str>) -> String {
    if let Some(dir) = explicit_category.map(slugify).filter(|s| !s.is_empty()) {
        return dir;
    }
    if let Some(dir) = resource.category.directory() {
        return dir.to_string();
    }
    let domain = resource.domain();
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    let slug = slugify(domain);
    if slug.is_empty() {
        resource.category.as_str().to_string()
    } else {
        slug
    }
}

/// File stem from the title, else the last URL path segment, else `index`.
pub fn file_stem(title: Option<&str>, url: &str) -> String {
    title
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| last_path_segment(url).as_deref().map(slugify).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let segment = segment
        .strip_suffix(".html")
        .or_else(|| segment.strip_suffix(".htm"))
        .unwrap_or(segment);
    Some(segment.to_string())
}

/// Lowercase, replace non-alphanumeric runs with `-`, trim, cap the length.
///
/// The cap is 80 characters or 150 bytes, whichever is hit first, cut on a
/// char boundary.
pub fn slugify(text: &str) -> String {
    let joined = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let mut end = 0;
    for (count, (i, c)) in joined.char_indices().enumerate() {
        if count == MAX_SLUG_CHARS || i + c.len_utf8() > MAX_SLUG_BYTES {
            break;
        }
        end = i + c.len_utf8();
    }
    joined[..end].trim_end_matches('-').to_string()
}

fn storage_error(path: &Path, e: &std::io::Error) -> LinkshelfError {
    LinkshelfError::Storage(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_shared::{Category, CategoryMetadata, Frontmatter, Resource};

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("linkshelf-store-{}", uuid::Uuid::now_v7()))
    }

    fn classified(url: &str, category: Category, domain: &str) -> ClassifiedResource {
        let mut metadata = CategoryMetadata::new();
        if !domain.is_empty() {
            metadata.insert("domain".into(), domain.into());
        }
        ClassifiedResource {
            resource: Resource::new(url),
            category,
            metadata,
        }
    }

    fn document(title: Option<&str>, body: &str) -> ProcessedDocument {
        let mut frontmatter = Frontmatter::new();
        frontmatter.insert("title", title.unwrap_or("Untitled"));
        ProcessedDocument {
            frontmatter,
            markdown_body: body.into(),
            title: title.map(String::from),
        }
    }

    #[test]
    fn slugify_rules() {
        assert_eq!(slugify("Example Domain"), "example-domain");
        assert_eq!(slugify("  Rust: The Book (2nd ed.)  "), "rust-the-book-2nd-ed");
        assert_eq!(slugify("---"), "");
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.chars().count() <= MAX_SLUG_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slugify_caps_multibyte_text_by_bytes() {
        let slug = slugify(&"日本語".repeat(25));
        assert_eq!(slug, "日本語".repeat(16) + "日本");
        assert_eq!(slug.len(), MAX_SLUG_BYTES);

        // A cut that would split a char backs off to the previous boundary.
        let slug = slugify(&format!("a{}", "語".repeat(60)));
        assert_eq!(slug.len(), 148);
        assert!(slug.is_char_boundary(slug.len()));
    }

    #[test]
    fn stem_falls_back_to_url_then_index() {
        assert_eq!(file_stem(Some("Hello World"), "https://x.com/a"), "hello-world");
        assert_eq!(file_stem(None, "https://x.com/docs/Getting_Started.html"), "getting-started");
        assert_eq!(file_stem(Some("!!!"), "https://x.com/page.htm"), "page");
        assert_eq!(file_stem(None, "http://example.com"), "index");
        assert_eq!(file_stem(None, "not a url"), "index");
    }

    #[test]
    fn directories_by_category_and_override() {
        let repo = classified("https://github.com/a/b", Category::GithubRepo, "github.com");
        assert_eq!(directory_for(&repo, None), "github-repos");
        assert_eq!(directory_for(&repo, Some("AI Tools")), "ai-tools");

        let article = classified("https://www.example.com/x", Category::Article, "www.example.com");
        assert_eq!(directory_for(&article, None), "example-com");

        let other = classified("::", Category::Other, "");
        assert_eq!(directory_for(&other, None), "other");
    }

    #[test]
    fn store_writes_rendered_document() {
        let root = temp_root();
        let storage = StorageManager::new(&root);
        let resource = classified("http://example.com", Category::Article, "example.com");
        let doc = document(Some("Example Domain"), "# Example Domain\n\nBody.");

        let path = storage.store(&doc, &resource, None).unwrap();

        assert_eq!(path, root.join("example-com").join("example-domain.md"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, doc.render());
        assert_eq!(storage.stats().files_written, 1);
        assert_eq!(storage.stats().bytes_written, written.len() as u64);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn collisions_get_numeric_suffix_without_overwriting() {
        let root = temp_root();
        let storage = StorageManager::new(&root);
        let resource = classified("http://example.com", Category::Article, "example.com");

        let first = storage
            .store(&document(Some("Example Domain"), "first"), &resource, None)
            .unwrap();
        let second = storage
            .store(&document(Some("Example Domain"), "second"), &resource, None)
            .unwrap();
        let third = storage
            .store(&document(Some("Example Domain"), "third"), &resource, None)
            .unwrap();

        assert!(first.ends_with("example-domain.md"));
        assert!(second.ends_with("example-domain-1.md"));
        assert!(third.ends_with("example-domain-2.md"));
        assert!(std::fs::read_to_string(&first).unwrap().ends_with("first\n"));
        assert!(std::fs::read_to_string(&second).unwrap().ends_with("second\n"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn existing_files_from_earlier_runs_are_respected() {
        let root = temp_root();
        let dir = root.join("blog-posts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("launch.md"), "old").unwrap();

        let storage = StorageManager::new(&root);
        let resource = classified("https://example.com/blog/launch", Category::BlogPost, "example.com");
        let path = storage
            .store(&document(Some("Launch"), "new"), &resource, None)
            .unwrap();

        assert_eq!(path, dir.join("launch-1.md"));
        assert_eq!(std::fs::read_to_string(dir.join("launch.md")).unwrap(), "old");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn long_multibyte_titles_are_stored() {
        let root = temp_root();
        let storage = StorageManager::new(&root);
        let resource = classified("https://example.jp/a", Category::Article, "example.jp");
        let title = "日本語".repeat(25);

        let first = storage
            .store(&document(Some(&title), "first"), &resource, None)
            .unwrap();
        let second = storage
            .store(&document(Some(&title), "second"), &resource, None)
            .unwrap();

        let stem = "日本語".repeat(16) + "日本";
        assert_eq!(first, root.join("example-jp").join(format!("{stem}.md")));
        assert_eq!(second, root.join("example-jp").join(format!("{stem}-1.md")));
        assert!(std::fs::read_to_string(&second).unwrap().ends_with("second\n"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn unwritable_root_is_storage_error() {
        let root = temp_root();
        std::fs::create_dir_all(root.parent().unwrap()).unwrap();
        // A regular file where the output root directory should be.
        std::fs::write(&root, "not a directory").unwrap();

        let storage = StorageManager::new(&root);
        let resource = classified("http://example.com", Category::Article, "example.com");
        let err = storage
            .store(&document(Some("X"), "body"), &resource, None)
            .unwrap_err();
        assert!(matches!(err, LinkshelfError::Storage(_)));
        assert_eq!(storage.stats().files_written, 0);

        let _ = std::fs::remove_file(&root);
    }
}
