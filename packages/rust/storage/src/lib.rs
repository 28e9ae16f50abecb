//! Filesystem persistence: markdown documents and the processing log.
//!
//! - [`StorageManager`] places documents under the output root
//! - [`ProcessingLog`] tracks one outcome per URL across runs
//!
//! Every write goes through [`write_atomic`].

mod log;
mod store;

use std::io::Write;
use std::path::Path;

use linkshelf_shared::{LinkshelfError, Result};

pub use log::ProcessingLog;
pub use store::{StorageManager, StorageStats, directory_for, file_stem, slugify};

/// Write `bytes` to `path` via a temp file in the same directory and a rename.
///
/// The temp name does not embed the target name, so it fits whenever the
/// target does. On failure the temp file is removed and `path` is left
/// untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if path.file_name().is_none() {
        return Err(LinkshelfError::Storage(format!(
            "{}: not a file path",
            path.display()
        )));
    }
    let temp = path.with_file_name(format!(".{}.tmp", uuid::Uuid::now_v7()));

    let result = std::fs::File::create(&temp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&temp, path));

    result.map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        LinkshelfError::Storage(format!("{}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_contents_and_leaves_no_temp() {
        let dir = std::env::temp_dir().join(format!("linkshelf-atomic-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.md");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.md")]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_atomic_handles_names_near_the_length_limit() {
        let dir = std::env::temp_dir().join(format!("linkshelf-atomic-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        // 243 bytes of name plus ".md" is right at the common 255-byte limit.
        let path = dir.join(format!("{}.md", "語".repeat(81)));
        assert_eq!(path.file_name().unwrap().len(), 246);

        write_atomic(&path, b"long").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "long");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_atomic_into_missing_directory_fails_cleanly() {
        let path = std::env::temp_dir()
            .join(format!("linkshelf-missing-{}", uuid::Uuid::now_v7()))
            .join("doc.md");
        let err = write_atomic(&path, b"x").unwrap_err();
        assert!(matches!(err, LinkshelfError::Storage(_)));
        assert!(!path.exists());
    }
}
