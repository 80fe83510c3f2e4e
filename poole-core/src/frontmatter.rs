//! Front matter splitting and conversion.
//!
//! Two block styles are recognized at the very start of a content file:
//! an HTML comment holding `key = value` lines, and a `---` fenced YAML block.

use crate::models::{FrontMatter, Variable};
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Invalid YAML front matter: {source}\n{block}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
        block: String,
    },

    #[error("Can't parse INI front matter at line {line}\n{block}")]
    Ini { line: usize, block: String },

    #[error("Front matter is not a mapping\n{0}")]
    NotAMapping(String),
}

/// Front matter block style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ini,
    Yaml,
}

static INI_REGEX: OnceLock<Regex> = OnceLock::new();
static YAML_REGEX: OnceLock<Regex> = OnceLock::new();

fn ini_regex() -> &'static Regex {
    INI_REGEX.get_or_init(|| Regex::new(r"(?s)^<!--(.+?)-->\r?\n?(.*)$").unwrap())
}

fn yaml_regex() -> &'static Regex {
    YAML_REGEX.get_or_init(|| {
        // The block group is lazy-optional so `---\n---` closes at once
        Regex::new(r"(?s)^---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n(.*))?$").unwrap()
    })
}

/// Split raw file content into an optional front matter block and the body.
pub fn split_front_matter(content: &str) -> (Option<(&str, Format)>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if let Some(caps) = ini_regex().captures(content) {
        let block = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        return (Some((block, Format::Ini)), body);
    }

    if let Some(caps) = yaml_regex().captures(content) {
        let block = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());
        return (Some((block, Format::Yaml)), body);
    }

    (None, content)
}

/// Convert a front matter block into typed variables
pub fn convert_front_matter(block: &str, format: Format) -> Result<FrontMatter, FrontMatterError> {
    match format {
        Format::Ini => parse_ini(block),
        Format::Yaml => parse_yaml(block),
    }
}

/// Split and convert in one go. Files without a block get empty front matter
/// and their full content as body.
///
/// # Example
///
/// ```
/// use poole_core::frontmatter::parse_front_matter;
///
/// let content = "<!--\ntitle = Home\nmenu = nav\n-->\n# Hello\n";
///
/// let (fm, body) = parse_front_matter(content).unwrap();
/// assert_eq!(fm.title(), Some("Home"));
/// assert_eq!(fm.menu(), Some("nav"));
/// assert!(body.starts_with("# Hello"));
/// ```
pub fn parse_front_matter(content: &str) -> Result<(FrontMatter, String), FrontMatterError> {
    match split_front_matter(content) {
        (Some((block, format)), body) => Ok((convert_front_matter(block, format)?, body.to_string())),
        (None, body) => Ok((FrontMatter::default(), body.to_string())),
    }
}

fn parse_yaml(block: &str) -> Result<FrontMatter, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    let value: Value = serde_yaml::from_str(block).map_err(|source| FrontMatterError::Yaml {
        source,
        block: block.to_string(),
    })?;

    match value {
        Value::Null => Ok(FrontMatter::default()),
        Value::Mapping(map) => Ok(map
            .into_iter()
            .filter_map(|(k, v)| Some((yaml_key(k)?, yaml_to_variable(v)?)))
            .collect()),
        _ => Err(FrontMatterError::NotAMapping(block.to_string())),
    }
}

fn yaml_key(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Null entries are dropped, tagged values are unwrapped
fn yaml_to_variable(value: Value) -> Option<Variable> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(Variable::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Variable::Integer(i)),
            None => n.as_f64().map(Variable::Float),
        },
        Value::String(s) => Some(Variable::String(s)),
        Value::Sequence(items) => Some(Variable::List(
            items.into_iter().filter_map(yaml_to_variable).collect(),
        )),
        Value::Mapping(map) => Some(Variable::Map(
            map.into_iter()
                .filter_map(|(k, v)| Some((yaml_key(k)?, yaml_to_variable(v)?)))
                .collect(),
        )),
        Value::Tagged(tagged) => yaml_to_variable(tagged.value),
    }
}

fn parse_ini(block: &str) -> Result<FrontMatter, FrontMatterError> {
    let mut root: BTreeMap<String, Variable> = BTreeMap::new();
    let mut section: Option<String> = None;

    for (idx, raw_line) in block.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        let error = || FrontMatterError::Ini {
            line: idx + 1,
            block: block.to_string(),
        };

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            if name.is_empty() {
                return Err(error());
            }
            root.entry(name.to_string())
                .or_insert_with(|| Variable::Map(BTreeMap::new()));
            section = Some(name.to_string());
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(error)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(error());
        }
        let value = ini_value(value.trim());

        let target = match &section {
            Some(name) => match root.get_mut(name) {
                Some(Variable::Map(map)) => map,
                _ => return Err(error()),
            },
            None => &mut root,
        };

        match key.strip_suffix("[]") {
            Some(list_key) => {
                let slot = target
                    .entry(list_key.trim().to_string())
                    .or_insert_with(|| Variable::List(Vec::new()));
                match slot {
                    Variable::List(items) => items.push(value),
                    _ => return Err(error()),
                }
            }
            None => {
                target.insert(key.to_string(), value);
            }
        }
    }

    Ok(root.into_iter().collect())
}

fn ini_value(raw: &str) -> Variable {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Variable::String(raw[1..raw.len() - 1].to_string());
        }
    }

    match raw.to_lowercase().as_str() {
        "true" | "on" | "yes" => return Variable::Bool(true),
        "false" | "off" | "no" | "none" => return Variable::Bool(false),
        _ => {}
    }

    if let Ok(i) = raw.parse::<i64>() {
        return Variable::Integer(i);
    }
    if raw.contains('.') {
        if let Ok(f) = raw.parse::<f64>() {
            return Variable::Float(f);
        }
    }

    Variable::String(raw.to_string())
}
