//! Askama template definitions.

use askama::Template;
use chrono::{DateTime, Datelike};
use serde_json::Value;

/// A link in the navigation menu
#[derive(Debug, Clone)]
pub struct NavLink {
    pub url: String,
    pub title: String,
}

/// Layout used when the site ships no `default.html`
#[derive(Template)]
#[template(path = "default.html", escape = "none")]
pub struct DefaultLayout {
    pub language: String,
    pub site_name: String,
    pub baseline: String,
    pub base_url: String,
    pub title: String,
    pub nav: Vec<NavLink>,
    pub content: String,
    pub year: String,
}

fn str_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl DefaultLayout {
    /// Pick the fields the built-in layout shows out of a page context
    pub fn from_context(context: &Value) -> Self {
        let base_url = str_at(context, "/site/base_url");
        let prefix = base_url.trim_end_matches('/');
        let nav = context["nav"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| NavLink {
                        url: format!("{}/{}", prefix, str_at(item, "/path")),
                        title: str_at(item, "/title"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let year = context
            .pointer("/site/time")
            .and_then(Value::as_i64)
            .and_then(year_of)
            .unwrap_or_default();

        Self {
            language: str_at(context, "/site/language"),
            site_name: str_at(context, "/site/name"),
            baseline: str_at(context, "/site/baseline"),
            base_url,
            title: str_at(context, "/title"),
            nav,
            content: str_at(context, "/content"),
            year,
        }
    }
}

/// Calendar year of a unix timestamp
fn year_of(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|date| date.year().to_string())
}
