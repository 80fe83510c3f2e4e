//! Post-process cache: optimized copies plus zero-byte hash markers.
//!
//! Layout under the cache root:
//!
//! ```text
//! postprocess/files/<relative path>       optimized copy
//! postprocess/hash/<encoded path>_<hash>  marker
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// A 256-bit blake3 content hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Hash a file's bytes with blake3
pub fn content_hash(path: &Path) -> io::Result<ContentHash> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(ContentHash(*hasher.finalize().as_bytes()))
}

/// Flatten a relative path into a single file name component
pub fn encode_path(rel: &str) -> String {
    rel.replace(['/', '\\'], "-")
}

/// State of an output file with respect to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Not processed for this content: optimize it
    Stale,
    /// Unchanged since it was processed; the cached copy can be restored
    Cached,
    /// Already the optimized copy
    Optimized,
}

#[derive(Debug, Clone)]
pub struct PostProcessCache {
    files_dir: PathBuf,
    hash_dir: PathBuf,
}

impl PostProcessCache {
    pub fn new(cache_root: &Path) -> Self {
        let root = cache_root.join("postprocess");
        Self {
            files_dir: root.join("files"),
            hash_dir: root.join("hash"),
        }
    }

    pub fn cached_file(&self, rel: &str) -> PathBuf {
        self.files_dir.join(rel)
    }

    pub fn marker(&self, rel: &str, hash: ContentHash) -> PathBuf {
        self.hash_dir
            .join(format!("{}_{}", encode_path(rel), hash.to_hex()))
    }

    /// Compare an output file hashing to `hash` against the store.
    ///
    /// Markers are keyed by the hash of the file before optimization. A file
    /// that was already optimized in place matches the cached copy instead.
    pub fn check(&self, rel: &str, hash: ContentHash) -> io::Result<Freshness> {
        let cached = self.cached_file(rel);
        if !cached.is_file() {
            return Ok(Freshness::Stale);
        }
        let matches_copy = content_hash(&cached)? == hash;

        if self.marker(rel, hash).is_file() {
            return Ok(if matches_copy {
                Freshness::Optimized
            } else {
                Freshness::Cached
            });
        }
        if matches_copy && self.has_marker(rel)? {
            return Ok(Freshness::Optimized);
        }
        Ok(Freshness::Stale)
    }

    fn has_marker(&self, rel: &str) -> io::Result<bool> {
        Ok(!self.markers(rel)?.is_empty())
    }

    /// Marker file names of `rel` with their hex suffix
    fn markers(&self, rel: &str) -> io::Result<Vec<(PathBuf, String)>> {
        let entries = match fs::read_dir(&self.hash_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let prefix = format!("{}_", encode_path(rel));
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(suffix) = name.strip_prefix(&prefix) else {
                continue;
            };
            if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
                continue;
            }
            found.push((entry.path(), suffix.to_string()));
        }
        Ok(found)
    }

    /// Copy the cached optimized file back over `target`
    pub fn restore(&self, rel: &str, target: &Path) -> io::Result<()> {
        fs::copy(self.cached_file(rel), target)?;
        Ok(())
    }

    /// Delete every marker of `rel` except the one for `keep`.
    ///
    /// Only names made of the encoded path, `_`, and a hex digest are touched.
    pub fn remove_stale(&self, rel: &str, keep: Option<ContentHash>) -> io::Result<usize> {
        let keep = keep.map(ContentHash::to_hex);
        let mut removed = 0;
        for (path, suffix) in self.markers(rel)? {
            if keep.as_deref() == Some(suffix.as_str()) {
                continue;
            }
            fs::remove_file(path)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Copy the optimized file into the store and write its marker
    pub fn store(&self, rel: &str, hash: ContentHash, optimized: &Path) -> io::Result<()> {
        let cached = self.cached_file(rel);
        if let Some(parent) = cached.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(optimized, &cached)?;

        fs::create_dir_all(&self.hash_dir)?;
        File::create(self.marker(rel, hash))?;
        Ok(())
    }
}
