//! Generate command implementation.

use super::serve::serve_site;
use crate::console;
use anyhow::{Context, Result};
use poole_core::config::override_value;
use poole_core::{BuildOptions, HookRegistry};
use poole_render::open_site;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub serve: bool,
    pub port: u16,
    pub dry_run: bool,
    pub force: bool,
}

/// Run the build pipeline, then optionally serve the result
pub fn generate_site(site: &Path, options: GenerateOptions) -> Result<()> {
    console::info("Generate website");

    let overrides = if options.serve {
        let base_url = format!("http://localhost:{}", options.port);
        console::warn(format!(
            "site.base_url set to {base_url}; re-generate before deploy"
        ));
        override_value("site.base_url", base_url)
    } else {
        serde_yaml::Value::Null
    };

    let mut builder = open_site(site, overrides).context("Failed to load site")?;
    print_progress(builder.hooks_mut());

    let report = builder.build(BuildOptions {
        dry_run: options.dry_run,
        force: options.force,
    })?;
    console::done(format!("Time: {:.2}s", report.elapsed().as_secs_f64()));

    if options.serve && !options.dry_run {
        serve_site(site, options.port)?;
    }
    Ok(())
}

/// Print each step that ran with its messages
fn print_progress(hooks: &mut HookRegistry) {
    hooks.after_step(|event| {
        if event.skipped {
            return;
        }
        console::info(format!("{}/{} {}", event.position, event.total, event.step));
        for message in event.messages {
            console::done(message);
        }
    });
}
