//! Content file discovery.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file found under a root, with its `/`-separated path relative to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub path: PathBuf,
    pub rel: String,
}

impl ContentFile {
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Directory part of `rel`, empty for files at the root
    pub fn rel_dir(&self) -> &str {
        self.rel.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Recursively list files under `root` whose extension is in `exts`
/// (case-insensitive; an empty list matches every file), sorted by relative
/// path. Hidden files and directories are skipped. A missing root yields
/// nothing.
pub fn find_files(root: &Path, exts: &[String]) -> Vec<ContentFile> {
    find_files_filtered(root, exts, |_| true)
}

/// Like [`find_files`], also skipping directories for which `keep_dir`
/// returns false
pub fn find_files_filtered<F>(root: &Path, exts: &[String], keep_dir: F) -> Vec<ContentFile>
where
    F: Fn(&Path) -> bool,
{
    let mut files: Vec<ContentFile> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && (!e.file_type().is_dir() || keep_dir(e.path())))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            exts.is_empty()
                || e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| exts.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(ContentFile {
                path: e.path().to_path_buf(),
                rel,
            })
        })
        .collect();

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    files
}
