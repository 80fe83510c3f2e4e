//! Configuration parsing, merging and language-aware lookup.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hidden directory holding config, layouts, assets, content and cache
pub const BUILD_ROOT: &str = "_poole";

/// Config file name inside the build root
pub const CONFIG_FILENAME: &str = "config.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown hook in config: {0}")]
    UnknownHook(String),
}

/// Main configuration struct matching the `config.yml` schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,

    #[serde(default)]
    pub author: AuthorConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub postprocess: PostProcessConfig,

    /// Vocabulary (plural, as used in front matter) to singular term name
    #[serde(default = "default_taxonomies")]
    pub taxonomies: BTreeMap<String, String>,

    /// Per-language override trees, e.g. `languages.fr.site.name`
    #[serde(default)]
    pub languages: BTreeMap<String, Value>,

    /// Free-form data exposed to templates as `site.data`
    #[serde(default)]
    pub data: Value,

    /// Built-in hooks to attach to the pipeline, by name
    #[serde(default)]
    pub hooks: Vec<String>,

    // Site root the build root and output are resolved against
    #[serde(skip)]
    root: PathBuf,

    // Merged raw tree used for dotted lookups
    #[serde(skip)]
    raw: Value,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    String::from("en")
}

fn default_taxonomies() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("tags".to_string(), "tag".to_string()),
        ("categories".to_string(), "category".to_string()),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub baseline: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Any other key under `site`, passed through to templates
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub home: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_branch() -> String {
    String::from("gh-pages")
}

fn default_remote() -> String {
    String::from("github")
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            repository: None,
            branch: default_branch(),
            remote: default_remote(),
        }
    }
}

/// Directory layout. Everything but `output` is relative to the build root;
/// `output` is relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_content")]
    pub content: PathBuf,

    #[serde(default = "default_layouts")]
    pub layouts: PathBuf,

    #[serde(default = "default_assets")]
    pub assets: PathBuf,

    #[serde(default = "default_cache")]
    pub cache: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_content() -> PathBuf {
    PathBuf::from("content")
}

fn default_layouts() -> PathBuf {
    PathBuf::from("layouts")
}

fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}

fn default_cache() -> PathBuf {
    PathBuf::from("cache")
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content(),
            layouts: default_layouts(),
            assets: default_assets(),
            cache: default_cache(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Extensions (without dot) of files treated as content
    #[serde(default = "default_content_ext")]
    pub ext: Vec<String>,

    /// Extra named link references available to every page body
    #[serde(default)]
    pub links: BTreeMap<String, String>,

    /// Timeout in seconds for fetching a page `source`
    #[serde(default = "default_source_timeout")]
    pub source_timeout: u64,
}

fn default_content_ext() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_source_timeout() -> u64 {
    10
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            ext: default_content_ext(),
            links: BTreeMap::new(),
            source_timeout: default_source_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_css")]
    pub css: PostProcessType,

    #[serde(default = "default_js")]
    pub js: PostProcessType,

    #[serde(default = "default_html")]
    pub html: PostProcessType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessType {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Absent means the type's default extensions; an empty list is an error
    #[serde(default)]
    pub ext: Option<Vec<String>>,
}

impl PostProcessType {
    pub fn extensions(&self, kind: &str) -> Vec<String> {
        match &self.ext {
            Some(ext) => ext.clone(),
            None => default_extensions(kind),
        }
    }
}

fn default_extensions(kind: &str) -> Vec<String> {
    let exts: &[&str] = match kind {
        "css" => &["css"],
        "js" => &["js"],
        "html" => &["html", "htm"],
        _ => &[],
    };
    exts.iter().map(|e| e.to_string()).collect()
}

fn default_css() -> PostProcessType {
    PostProcessType {
        enabled: true,
        ext: None,
    }
}

fn default_js() -> PostProcessType {
    PostProcessType {
        enabled: true,
        ext: None,
    }
}

fn default_html() -> PostProcessType {
    PostProcessType {
        enabled: false,
        ext: None,
    }
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            css: default_css(),
            js: default_js(),
            html: default_html(),
        }
    }
}

impl PostProcessConfig {
    /// Settings for one optimizer type (`css`, `js`, `html`)
    pub fn for_kind(&self, kind: &str) -> Option<&PostProcessType> {
        match kind {
            "css" => Some(&self.css),
            "js" => Some(&self.js),
            "html" => Some(&self.html),
            _ => None,
        }
    }
}

impl Config {
    /// Load `<site_root>/_poole/config.yml`
    pub fn load(site_root: &Path) -> Result<Self, ConfigError> {
        Self::load_with_overrides(site_root, Value::Null)
    }

    /// Load the config file and merge `overrides` into it before the build starts
    pub fn load_with_overrides(site_root: &Path, overrides: Value) -> Result<Self, ConfigError> {
        let path = site_root.join(BUILD_ROOT).join(CONFIG_FILENAME);
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&contents, site_root, overrides)
    }

    /// Build a config from YAML text, with the site root used for path resolution
    pub fn from_yaml(contents: &str, site_root: &Path, overrides: Value) -> Result<Self, ConfigError> {
        let mut raw: Value = serde_yaml::from_str(contents)?;
        merge_values(&mut raw, overrides);

        let mut config: Config = serde_yaml::from_value(raw.clone())?;
        config.root = site_root.to_path_buf();
        config.raw = raw;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("site.base_url".to_string()));
        }
        if self.content.ext.is_empty() {
            return Err(ConfigError::MissingField("content.ext".to_string()));
        }
        Ok(())
    }

    pub fn site_root(&self) -> &Path {
        &self.root
    }

    /// Hidden directory holding the site sources
    pub fn build_root(&self) -> PathBuf {
        self.root.join(BUILD_ROOT)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.resolve_build_path(&self.paths.content)
    }

    /// Root of the page tree; index keys are computed relative to it
    pub fn pages_dir(&self) -> PathBuf {
        self.content_dir().join("pages")
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir().join("posts")
    }

    pub fn layouts_dir(&self) -> PathBuf {
        self.resolve_build_path(&self.paths.layouts)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.resolve_build_path(&self.paths.assets)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.resolve_build_path(&self.paths.cache)
    }

    pub fn output_dir(&self) -> PathBuf {
        if self.paths.output.is_absolute() {
            self.paths.output.clone()
        } else {
            self.root.join(&self.paths.output)
        }
    }

    fn resolve_build_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.build_root().join(path)
        }
    }

    /// Base URL without trailing slash (a bare "/" is kept as is)
    pub fn base_url(&self) -> String {
        normalize_base_url(&self.site.base_url)
    }

    /// Get a value by dotted path (e.g. "site.name"), preferring the override
    /// for `lang` and falling back to the default tree.
    pub fn get(&self, key: &str, lang: Option<&str>) -> Option<&Value> {
        if let Some(tree) = lang.and_then(|l| self.languages.get(l)) {
            if let Some(value) = lookup(tree, key) {
                return Some(value);
            }
        }
        lookup(&self.raw, key)
    }

    /// A whole top-level section with the `lang` overrides merged over it
    pub fn section(&self, name: &str, lang: Option<&str>) -> Value {
        let mut section = lookup(&self.raw, name).cloned().unwrap_or(Value::Null);
        if let Some(overlay) = lang
            .and_then(|l| self.languages.get(l))
            .and_then(|tree| lookup(tree, name))
        {
            merge_values(&mut section, overlay.clone());
        }
        section
    }
}

/// Strip whitespace and trailing slashes from a base URL
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return "/".to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}

fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = tree;
    for part in key.split('.') {
        current = current.as_mapping()?.get(part)?;
    }
    Some(current)
}

/// Recursively replace values of `base` with those of `overlay`; mappings merge key by key.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                let nested = value.is_mapping() && base_map.get(&key).is_some_and(Value::is_mapping);
                match base_map.get_mut(&key) {
                    Some(existing) if nested => merge_values(existing, value),
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Build a nested override tree from a dotted key, e.g. `site.base_url`
pub fn override_value(key: &str, value: impl Into<Value>) -> Value {
    key.rsplit('.').fold(value.into(), |inner, part| {
        let mut map = Mapping::new();
        map.insert(Value::String(part.to_string()), inner);
        Value::Mapping(map)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
site:
  name: "Poole"
  baseline: "Light and easy"
  base_url: "http://localhost:8000/"
  language: en
  twitter: "@poole"
author:
  name: "Jane"
languages:
  fr:
    site:
      name: "Poole FR"
data:
  answer: 42
"#;

    fn sample() -> Config {
        Config::from_yaml(SAMPLE, Path::new("/srv/site"), Value::Null).unwrap()
    }

    #[test]
    fn test_default_values() {
        let config = sample();

        assert_eq!(config.deploy.branch, "gh-pages");
        assert_eq!(config.deploy.remote, "github");
        assert_eq!(config.content.ext, vec!["md", "markdown"]);
        assert_eq!(config.content.source_timeout, 10);
        assert!(config.postprocess.enabled);
        assert!(config.postprocess.css.enabled);
        assert!(!config.postprocess.html.enabled);
        assert_eq!(config.postprocess.html.extensions("html"), vec!["html", "htm"]);
        assert_eq!(config.taxonomies.get("tags"), Some(&"tag".to_string()));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/site/_site"));
        assert_eq!(
            config.pages_dir(),
            PathBuf::from("/srv/site/_poole/content/pages")
        );
        assert_eq!(
            config.cache_dir(),
            PathBuf::from("/srv/site/_poole/cache")
        );
    }

    fn scalar(config: &Config, key: &str, lang: Option<&str>) -> Option<String> {
        match config.get(key, lang)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_get_nested_value() {
        let config = sample();

        assert_eq!(scalar(&config, "site.name", None), Some("Poole".into()));
        assert_eq!(scalar(&config, "author.name", None), Some("Jane".into()));
        assert_eq!(scalar(&config, "data.answer", None), Some("42".into()));
        assert_eq!(scalar(&config, "nonexistent.key", None), None);
        assert!(config.get("site.twitter", None).is_some());
        assert_eq!(
            config.site.extra.get("twitter"),
            Some(&Value::String("@poole".into()))
        );
    }

    #[test]
    fn test_language_fallback() {
        let config = sample();

        assert_eq!(scalar(&config, "site.name", Some("fr")), Some("Poole FR".into()));
        // Not overridden for fr: falls back to the default tree
        assert_eq!(
            scalar(&config, "site.baseline", Some("fr")),
            Some("Light and easy".into())
        );
        // Unknown language behaves like no language
        assert_eq!(scalar(&config, "site.name", Some("de")), Some("Poole".into()));

        let section = config.section("site", Some("fr"));
        assert_eq!(section["name"], Value::String("Poole FR".into()));
        assert_eq!(section["baseline"], Value::String("Light and easy".into()));
    }

    #[test]
    fn test_overrides_are_merged_before_build() {
        let overrides = override_value("site.base_url", "http://localhost:8000");
        let config = Config::from_yaml(SAMPLE, Path::new("/srv/site"), overrides).unwrap();

        assert_eq!(config.site.base_url, "http://localhost:8000");
        // Siblings of the overridden key survive
        assert_eq!(config.site.name, "Poole");
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        let result = Config::from_yaml("site:\n  name: x\n", Path::new("."), Value::Null);
        match result {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "site.base_url"),
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://example.com/"), "http://example.com");
        assert_eq!(normalize_base_url(" /blog// "), "/blog");
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("/"), "/");
    }
}
