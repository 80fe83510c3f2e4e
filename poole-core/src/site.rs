//! Read-only site view handed to layouts.

use crate::config::Config;
use crate::models::{Collection, Menus, Taxonomies};
use crate::render::RenderError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Language-aware view over the configuration and the aggregate collections
pub struct Site<'a> {
    config: &'a Config,
    pages: &'a Collection,
    menus: &'a Menus,
    taxonomies: &'a Taxonomies,
    static_files: &'a [String],
    time: DateTime<Utc>,
}

/// Page summary exposed in `site.pages`
#[derive(Debug, Serialize)]
struct PageSummary<'a> {
    id: &'a str,
    title: &'a str,
    path: &'a str,
    url: String,
}

impl<'a> Site<'a> {
    pub fn new(
        config: &'a Config,
        pages: &'a Collection,
        menus: &'a Menus,
        taxonomies: &'a Taxonomies,
        static_files: &'a [String],
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            pages,
            menus,
            taxonomies,
            static_files,
            time,
        }
    }

    /// Configuration value at a dotted key, for the default language
    pub fn get(&self, key: &str) -> Option<&'a serde_yaml::Value> {
        self.config.get(key, Some(self.language()))
    }

    pub fn language(&self) -> &'a str {
        &self.config.site.language
    }

    pub fn menus(&self) -> &'a Menus {
        self.menus
    }

    pub fn taxonomies(&self) -> &'a Taxonomies {
        self.taxonomies
    }

    pub fn data(&self) -> &'a serde_yaml::Value {
        &self.config.data
    }

    /// Files under the assets directory, relative and `/`-separated
    pub fn static_files(&self) -> &'a [String] {
        self.static_files
    }

    /// Published pages only
    pub fn pages(&self) -> Collection {
        self.pages.published()
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// A top-level config section as JSON
    pub fn section(&self, name: &str) -> Result<Value, RenderError> {
        to_json(&self.config.section(name, None))
    }

    /// The `site` template variable: the site section resolved for `lang`,
    /// plus the derived views.
    pub fn to_context(&self, lang: Option<&str>) -> Result<Value, RenderError> {
        let lang = lang.unwrap_or_else(|| self.language());
        let mut site = match to_json(&self.config.section("site", Some(lang)))? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let base_url = self.config.base_url();
        let pages: Vec<PageSummary> = self
            .pages
            .iter()
            .filter(|p| p.is_published())
            .map(|p| PageSummary {
                id: &p.id,
                title: &p.title,
                path: &p.path,
                url: join_url(&base_url, &p.output_rel_path()),
            })
            .collect();

        site.insert("base_url".into(), json!(base_url));
        site.insert("language".into(), json!(lang));
        site.insert("menus".into(), to_json(self.menus)?);
        site.insert("taxonomies".into(), to_json(self.taxonomies)?);
        site.insert("data".into(), to_json(self.data())?);
        site.insert("static".into(), json!(self.static_files));
        site.insert("time".into(), json!(self.time.timestamp()));
        site.insert("pages".into(), to_json(&pages)?);

        Ok(Value::Object(site))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, RenderError> {
    serde_json::to_value(value).map_err(|e| RenderError::Context(e.to_string()))
}

/// Join a normalized base URL and a relative output path
pub fn join_url(base_url: &str, rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    if base_url == "/" {
        format!("/{rel}")
    } else {
        format!("{base_url}/{rel}")
    }
}
