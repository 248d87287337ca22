//! Output-path derivation and the run-scoped directory-creation cache

use crate::CaptureError;
use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// Run-scoped set of output directories already materialized on disk.
///
/// `ensure` skips the filesystem entirely on a cache hit; this is a
/// performance optimization under high page/device fan-out, correctness never
/// depends on it. Two workers racing to create the same not-yet-cached
/// directory are both served by `create_dir_all`, which treats an existing
/// directory as success.
#[derive(Debug, Default)]
pub struct DirCache {
    created: DashSet<PathBuf>,
}

impl DirCache {
    pub fn new() -> Self {
        Self {
            created: DashSet::new(),
        }
    }

    pub async fn ensure(&self, path: &Path) -> Result<(), CaptureError> {
        if self.created.contains(path) {
            return Ok(());
        }
        tokio::fs::create_dir_all(path).await?;
        self.created.insert(path.to_path_buf());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

/// Keeps only ASCII alphanumerics, so "iPhone 16 Pro Max" becomes
/// "iPhone16ProMax".
pub fn sanitize_device_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Derives the output file for a (page, device) pair:
/// `<output_root>/<page-dir>/<SanitizedDevice>_<stem>.png`.
pub fn output_path(output_root: &Path, page_path: &str, device_name: &str) -> PathBuf {
    let page = Path::new(page_path);
    let stem = page
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(page_path);
    let file_name = format!("{}_{stem}.png", sanitize_device_name(device_name));

    match page.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => output_root.join(dir).join(file_name),
        _ => output_root.join(file_name),
    }
}
