//! Content-root validation and page discovery
//!
//! Resolves the user-supplied target directory to a canonical path, walks it
//! for `.html` documents, and security-checks relative page paths before they
//! are turned into URLs.

use crate::CaptureError;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Canonicalizes and verifies the target content root.
///
/// Symlinks are resolved; the result is an absolute path. Purely a
/// validation step, no side effects.
pub fn validate_directory(path: &Path) -> Result<PathBuf, CaptureError> {
    let resolved = std::fs::canonicalize(path)
        .map_err(|_| CaptureError::DirectoryNotFound(path.to_path_buf()))?;

    let metadata = std::fs::metadata(&resolved)
        .map_err(|_| CaptureError::DirectoryNotFound(path.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(CaptureError::NotADirectory(resolved));
    }

    Ok(resolved)
}

/// Recursively enumerates `.html` files under `root`, returning root-relative
/// paths with `/` separators, sorted for stable logs.
///
/// Unreadable entries are logged and skipped. An empty result is a valid
/// empty run, not an error.
pub fn discover_pages(root: &Path) -> Vec<String> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let Some(relative) = relative.to_str() else {
            warn!("Skipping non-UTF-8 path: {}", entry.path().display());
            continue;
        };
        pages.push(relative.replace(std::path::MAIN_SEPARATOR, "/"));
    }

    pages.sort();
    pages
}

/// Rejects relative page paths that are absolute or contain parent-directory
/// components. Fails closed; the caller treats this as a per-page failure.
pub fn validate_page_path(page_path: &str) -> Result<(), CaptureError> {
    let path = Path::new(page_path);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)));

    if escapes {
        return Err(CaptureError::UnsafePath(page_path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory_missing() {
        let err = validate_directory(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CaptureError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_validate_directory_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("page.html");
        std::fs::write(&file, "<html></html>").unwrap();

        let err = validate_directory(&file).unwrap_err();
        assert!(matches!(err, CaptureError::NotADirectory(_)));
    }

    #[test]
    fn test_validate_directory_canonicalizes() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let resolved = validate_directory(&dir.path().join("a/./b")).unwrap();
        assert_eq!(resolved, nested.canonicalize().unwrap());
        assert!(resolved.is_absolute());
    }

    #[test]
    fn test_discover_pages_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/inner")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("sub/page.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("sub/inner/deep.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not html").unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();

        let pages = discover_pages(dir.path());
        assert_eq!(
            pages,
            vec!["index.html", "sub/inner/deep.html", "sub/page.html"]
        );
    }

    #[test]
    fn test_discover_pages_empty() {
        let dir = TempDir::new().unwrap();
        assert!(discover_pages(dir.path()).is_empty());
    }

    #[test]
    fn test_validate_page_path() {
        assert!(validate_page_path("index.html").is_ok());
        assert!(validate_page_path("sub/page.html").is_ok());
        assert!(validate_page_path("a/b/c.html").is_ok());

        assert!(matches!(
            validate_page_path("../escape.html"),
            Err(CaptureError::UnsafePath(_))
        ));
        assert!(matches!(
            validate_page_path("sub/../../escape.html"),
            Err(CaptureError::UnsafePath(_))
        ));
        assert!(matches!(
            validate_page_path("/etc/passwd"),
            Err(CaptureError::UnsafePath(_))
        ));
    }
}
