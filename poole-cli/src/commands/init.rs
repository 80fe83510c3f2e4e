//! Init command implementation.

use crate::console;
use anyhow::{bail, Context, Result};
use include_dir::{include_dir, Dir};
use poole_core::config::{BUILD_ROOT, CONFIG_FILENAME};
use std::fs;
use std::path::Path;

/// Starter files written into a new build root
static SCAFFOLD: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/scaffold");

/// Create `<site>/_poole` with a config, a default layout and a home page
pub fn init_site(site: &Path, force: bool) -> Result<()> {
    console::info("Initializing new website");

    let build_root = site.join(BUILD_ROOT);
    if build_root.join(CONFIG_FILENAME).exists() {
        if !force {
            bail!("The website is already initialized (use --force to start over)");
        }
        fs::remove_dir_all(&build_root)
            .with_context(|| format!("Failed to remove {:?}", build_root))?;
    }

    fs::create_dir_all(&build_root)
        .with_context(|| format!("Failed to create {:?}", build_root))?;
    console::done(format!("{BUILD_ROOT} directory created"));

    extract(&build_root, CONFIG_FILENAME)?;
    console::done("Config file created");

    create_dirs(&build_root, &["layouts"])?;
    console::done("Layouts directory created");

    extract(&build_root, "layouts/default.html")?;
    console::done("Default layout file created");

    create_dirs(&build_root, &["assets/css", "assets/img", "assets/js"])?;
    console::done("Assets directory created");

    create_dirs(&build_root, &["content/pages", "content/posts"])?;
    console::done("Content directory created");

    extract(&build_root, "content/pages/index.md")?;
    console::done("Default content file created");

    Ok(())
}

fn create_dirs(root: &Path, dirs: &[&str]) -> Result<()> {
    for dir in dirs {
        let path = root.join(dir);
        fs::create_dir_all(&path).with_context(|| format!("Failed to create {:?}", path))?;
    }
    Ok(())
}

fn extract(root: &Path, rel: &str) -> Result<()> {
    let file = SCAFFOLD
        .get_file(rel)
        .with_context(|| format!("Missing embedded scaffold file {rel}"))?;
    let target = root.join(rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, file.contents()).with_context(|| format!("Failed to write {:?}", target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_is_embedded() {
        for rel in [CONFIG_FILENAME, "layouts/default.html", "content/pages/index.md"] {
            assert!(SCAFFOLD.get_file(rel).is_some(), "{rel} missing");
        }
    }

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path(), false).unwrap();

        let root = dir.path().join(BUILD_ROOT);
        for dir in ["assets/css", "assets/img", "assets/js", "content/posts", "layouts"] {
            assert!(root.join(dir).is_dir(), "{dir} missing");
        }

        let config = poole_core::Config::load(dir.path()).unwrap();
        assert_eq!(config.site.name, "Poole");
        assert!(config.deploy.repository.is_none());
    }

    #[test]
    fn test_init_refuses_existing_site_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path(), false).unwrap();
        let marker = dir.path().join(BUILD_ROOT).join("content/pages/extra.md");
        fs::write(&marker, "extra").unwrap();

        let err = init_site(dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
        assert!(marker.exists());

        init_site(dir.path(), true).unwrap();
        assert!(!marker.exists());
    }
}
