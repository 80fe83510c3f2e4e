//! # poole-render
//!
//! Layout rendering library for poole.
//!
//! Site layouts are Tera templates read from the layouts directory at
//! build time. A compiled-in Askama layout stands in for `default.html`
//! when the site doesn't provide one.

pub mod layouts;
pub mod templates;

pub use layouts::Layouts;
pub use templates::{DefaultLayout, NavLink};

use poole_core::{BuildError, Builder, Config};
use std::path::Path;

/// Load the site's config and layouts and return a builder ready to run.
///
/// `overrides` is merged into the config file before it is read, see
/// [`Config::load_with_overrides`].
pub fn open_site(site_root: &Path, overrides: serde_yaml::Value) -> Result<Builder, BuildError> {
    let config = Config::load_with_overrides(site_root, overrides)?;
    let layouts = Layouts::load(&config.layouts_dir()).map_err(BuildError::Layouts)?;
    Builder::new(config, Box::new(layouts))
}
