//! List command implementation.

use crate::console;
use crate::ListKind;
use anyhow::{Context, Result};
use poole_core::loader::find_files;
use poole_core::Config;
use std::path::Path;

/// Print `- <relative path>` for every content file of the requested kind
pub fn list_content(site: &Path, kind: ListKind) -> Result<()> {
    let config = Config::load(site).context("Failed to load config")?;
    let (label, dir) = match kind {
        ListKind::Pages => ("pages", config.pages_dir()),
        ListKind::Posts => ("posts", config.posts_dir()),
    };

    console::info(format!("List {label}"));
    for file in find_files(&dir, &config.content.ext) {
        println!("- {}", file.rel);
    }
    Ok(())
}
