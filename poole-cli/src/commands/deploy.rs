//! Deploy command: mirror the output into a sibling git checkout and push it.

use crate::console;
use anyhow::{bail, Context, Result};
use poole_core::{Config, ConfigError};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Push the generated output to `deploy.repository` on `deploy.branch`
pub fn deploy_site(site: &Path) -> Result<()> {
    let config = Config::load(site).context("Failed to load config")?;
    let repository = config
        .deploy
        .repository
        .as_deref()
        .filter(|repo| !repo.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField("deploy.repository".to_string()))?;
    let branch = config.deploy.branch.as_str();
    let remote = config.deploy.remote.as_str();

    let output_dir = config.output_dir();
    if !output_dir.is_dir() {
        bail!(
            "Output directory {:?} not found, run `poole generate` first",
            output_dir
        );
    }

    let deploy_dir = deploy_dir(site)?;
    console::info(format!("Deploy website to {repository} ({branch})"));

    let first_deploy = !deploy_dir.join(".git").is_dir();
    fs::create_dir_all(&deploy_dir)
        .with_context(|| format!("Failed to create {:?}", deploy_dir))?;
    clear_except_git(&deploy_dir)?;
    let copied = mirror(&output_dir, &deploy_dir)?;
    tracing::debug!(dir = %deploy_dir.display(), files = copied, "Output mirrored");

    let git = Git::new(&deploy_dir);
    if first_deploy {
        git.run(&["init"])?;
    }
    git.run(&["config", "core.autocrlf", "false"])?;
    git.run(&["add", "-A"])?;

    if git.has_changes()? {
        let verb = if first_deploy { "Create" } else { "Update" };
        git.run(&["commit", "-m", &format!("{verb} {branch} via Poole")])?;
    } else {
        console::info("Nothing to commit");
    }

    if first_deploy {
        git.run(&["branch", "-M", branch])?;
        git.run(&["remote", "add", remote, repository])?;
    }
    git.run(&["push", remote, branch, "--force"])?;

    console::done(format!("Deployed {copied} files"));
    Ok(())
}

/// `<parent>/.<site dir name>`
fn deploy_dir(site: &Path) -> Result<PathBuf> {
    let site = site
        .canonicalize()
        .with_context(|| format!("Failed to resolve {:?}", site))?;
    let name = site
        .file_name()
        .and_then(OsStr::to_str)
        .context("Site directory has no name")?;
    let parent = site.parent().context("Site directory has no parent")?;
    Ok(parent.join(format!(".{name}")))
}

fn clear_except_git(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name() == ".git" {
            continue;
        }
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("Failed to remove {:?}", path))?;
    }
    Ok(())
}

/// Copy every file of `from` into `to`, keeping relative paths
fn mirror(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(from)?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Runs git inside a fixed working directory
struct Git<'a> {
    dir: &'a Path,
}

impl<'a> Git<'a> {
    fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(self.dir);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        tracing::debug!(?args, "git");
        let output = self
            .command(args)
            .output()
            .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    fn has_changes(&self) -> Result<bool> {
        let output = self
            .command(&["status", "--porcelain"])
            .output()
            .context("Failed to run git status")?;
        Ok(!output.stdout.is_empty())
    }
}
