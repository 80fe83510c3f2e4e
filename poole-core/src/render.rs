//! Renderer seam: the layout engine interface and the per-page context.

use crate::models::{Page, DEFAULT_MENU};
use crate::site::Site;
use serde_json::{json, Value};
use thiserror::Error;

/// Layout used when a page names none, or names one that doesn't exist
pub const DEFAULT_LAYOUT: &str = "default.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render layout {layout}: {message}")]
    Template { layout: String, message: String },

    #[error("Failed to build render context: {0}")]
    Context(String),
}

/// A template engine loaded from the layouts directory
pub trait LayoutEngine {
    fn has_layout(&self, name: &str) -> bool;

    /// Render `layout` with `context`. Output is not escaped.
    fn render(&self, layout: &str, context: &Value) -> Result<String, RenderError>;
}

/// File name of the layout a page asks for, falling back to the default
pub fn resolve_layout(engine: &dyn LayoutEngine, requested: Option<&str>) -> String {
    let Some(name) = requested else {
        return DEFAULT_LAYOUT.to_string();
    };
    let file = if name.ends_with(".html") {
        name.to_string()
    } else {
        format!("{name}.html")
    };
    if engine.has_layout(&file) {
        file
    } else {
        tracing::debug!(layout = name, "Layout not found, using default");
        DEFAULT_LAYOUT.to_string()
    }
}

/// Full template context for one page
pub fn page_context(site: &Site<'_>, page: &Page) -> Result<Value, RenderError> {
    let lang = page
        .variables
        .get("language")
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| site.language());

    let variables =
        serde_json::to_value(&page.variables).map_err(|e| RenderError::Context(e.to_string()))?;
    let nav = serde_json::to_value(site.menus().get(DEFAULT_MENU))
        .map_err(|e| RenderError::Context(e.to_string()))?;

    Ok(json!({
        "site": site.to_context(Some(lang))?,
        "author": site.section("author")?,
        "deploy": site.section("deploy")?,
        "title": page.title,
        "path": page.path,
        "content": page.content,
        "nav": nav,
        "page": variables,
        "menus": serde_json::to_value(site.menus()).map_err(|e| RenderError::Context(e.to_string()))?,
    }))
}
