//! Runtime layouts loaded from the site's layouts directory.

use crate::templates::DefaultLayout;
use askama::Template;
use poole_core::loader::find_files;
use poole_core::render::{LayoutEngine, RenderError, DEFAULT_LAYOUT};
use serde_json::Value;
use std::error::Error as _;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

/// Every file under the layouts directory, registered by its relative path
pub struct Layouts {
    tera: Tera,
}

impl Layouts {
    /// Load all layouts at once so `extends` and `include` resolve across files.
    /// A missing directory yields an engine with only the built-in default.
    pub fn load(dir: &Path) -> Result<Self, RenderError> {
        let mut sources = Vec::new();
        for file in find_files(dir, &[]) {
            let contents = fs::read_to_string(&file.path).map_err(|e| RenderError::Template {
                layout: file.rel.clone(),
                message: e.to_string(),
            })?;
            sources.push((file.rel, contents));
        }
        tracing::debug!(dir = %dir.display(), count = sources.len(), "Loading layouts");
        Self::from_sources(sources)
    }

    pub fn from_sources<I>(sources: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("slugify", slugify_filter);
        tera.add_raw_templates(sources)
            .map_err(|e| template_error("layouts", &e))?;
        Ok(Self { tera })
    }

    /// Names of the site's own layouts, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    fn has_own(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

impl LayoutEngine for Layouts {
    fn has_layout(&self, name: &str) -> bool {
        name == DEFAULT_LAYOUT || self.has_own(name)
    }

    fn render(&self, layout: &str, context: &Value) -> Result<String, RenderError> {
        if !self.has_own(layout) && layout == DEFAULT_LAYOUT {
            return DefaultLayout::from_context(context)
                .render()
                .map_err(|e| RenderError::Template {
                    layout: layout.to_string(),
                    message: e.to_string(),
                });
        }

        let context =
            Context::from_value(context.clone()).map_err(|e| RenderError::Context(e.to_string()))?;
        self.tera
            .render(layout, &context)
            .map_err(|e| template_error(layout, &e))
    }
}

impl std::fmt::Debug for Layouts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layouts")
            .field("names", &self.names())
            .finish()
    }
}

/// Tera keeps the useful part of a failure in the source chain
fn template_error(layout: &str, err: &tera::Error) -> RenderError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    RenderError::Template {
        layout: layout.to_string(),
        message,
    }
}

fn slugify_filter(
    value: &tera::Value,
    _args: &std::collections::HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let text = tera::try_get_value!("slugify", "value", String, value);
    Ok(tera::Value::String(poole_core::slugify(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layouts(sources: &[(&str, &str)]) -> Layouts {
        Layouts::from_sources(
            sources
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_output_is_not_escaped() {
        let engine = layouts(&[("default.html", "<main>{{ content }}</main>")]);
        let html = engine
            .render("default.html", &json!({ "content": "<p>a & b</p>" }))
            .unwrap();
        assert_eq!(html, "<main><p>a & b</p></main>");
    }

    #[test]
    fn test_extends_across_files() {
        let engine = layouts(&[
            ("base.html", "[{% block body %}{% endblock %}]"),
            (
                "page.html",
                "{% extends \"base.html\" %}{% block body %}{{ title | upper }}{% endblock %}",
            ),
        ]);
        let html = engine.render("page.html", &json!({ "title": "hi" })).unwrap();
        assert_eq!(html, "[HI]");
    }

    #[test]
    fn test_default_layout_is_always_available() {
        let engine = layouts(&[]);
        assert!(engine.has_layout("default.html"));
        assert!(!engine.has_layout("post.html"));

        let context = json!({
            "site": { "name": "Demo", "base_url": "http://example.com/", "language": "en", "time": 0 },
            "title": "Home",
            "content": "<p>Hello</p>",
            "nav": [{ "title": "About", "path": "about" }],
        });
        let html = engine.render("default.html", &context).unwrap();
        assert!(html.contains("<title>Home - Demo</title>"));
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains(r#"<a href="http://example.com/about">About</a>"#));
        assert!(html.contains("Demo 1970"));
    }

    #[test]
    fn test_site_default_overrides_builtin() {
        let engine = layouts(&[("default.html", "own:{{ title }}")]);
        let html = engine.render("default.html", &json!({ "title": "x" })).unwrap();
        assert_eq!(html, "own:x");
    }

    #[test]
    fn test_slugify_filter() {
        let engine = layouts(&[("t.html", "{{ title | slugify }}")]);
        let html = engine.render("t.html", &json!({ "title": "Hello World" })).unwrap();
        assert_eq!(html, "hello-world");
    }

    #[test]
    fn test_render_error_names_layout() {
        let engine = layouts(&[("broken.html", "{{ missing.field }}")]);
        let err = engine.render("broken.html", &json!({})).unwrap_err();
        match err {
            RenderError::Template { layout, .. } => assert_eq!(layout, "broken.html"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error_fails_load() {
        let result = Layouts::from_sources(vec![("bad.html".to_string(), "{% if %}".to_string())]);
        assert!(matches!(result, Err(RenderError::Template { .. })));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(dir.path().join("default.html"), "{% include \"partials/nav.html\" %}").unwrap();
        fs::write(dir.path().join("partials/nav.html"), "nav").unwrap();

        let engine = Layouts::load(dir.path()).unwrap();
        assert_eq!(engine.names(), vec!["default.html", "partials/nav.html"]);
        assert_eq!(engine.render("default.html", &json!({})).unwrap(), "nav");

        let missing = Layouts::load(&dir.path().join("nope")).unwrap();
        assert!(missing.names().is_empty());
    }
}
