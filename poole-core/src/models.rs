//! Content model structs for pages, collections, menus and taxonomies.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Index key of a page sitting directly at the content root
pub const HOME_KEY: &str = "home";

/// Menu that always exists, even when no page declares it
pub const DEFAULT_MENU: &str = "nav";

/// Reserved front matter keys
pub mod keys {
    pub const TITLE: &str = "title";
    pub const LAYOUT: &str = "layout";
    pub const MENU: &str = "menu";
    pub const PUBLISHED: &str = "published";
    pub const SOURCE: &str = "source";
}

/// A front matter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variable {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Variable>),
    Map(BTreeMap<String, Variable>),
}

impl Variable {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variable::String(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness the way INI and YAML authors expect it
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variable::Bool(b) => Some(*b),
            Variable::Integer(i) => Some(*i != 0),
            Variable::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Flatten a scalar or a list of scalars into strings
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            Variable::String(s) => vec![s.clone()],
            Variable::Integer(i) => vec![i.to_string()],
            Variable::Float(f) => vec![f.to_string()],
            Variable::Bool(b) => vec![b.to_string()],
            Variable::List(items) => items.iter().flat_map(Variable::to_strings).collect(),
            Variable::Map(_) => Vec::new(),
        }
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable::String(value.to_string())
    }
}

/// Typed front matter: reserved keys have accessors, everything else passes
/// through to templates untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontMatter {
    vars: BTreeMap<String, Variable>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.vars.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Variable) -> Option<Variable> {
        self.vars.insert(key.into(), value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.vars.iter()
    }

    fn str_of(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Variable::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.str_of(keys::TITLE)
    }

    pub fn layout(&self) -> Option<&str> {
        self.str_of(keys::LAYOUT)
    }

    pub fn menu(&self) -> Option<&str> {
        self.str_of(keys::MENU)
    }

    pub fn source(&self) -> Option<&str> {
        self.str_of(keys::SOURCE)
    }

    /// Pages are published unless front matter says otherwise
    pub fn published(&self) -> bool {
        self.get(keys::PUBLISHED)
            .and_then(Variable::as_bool)
            .unwrap_or(true)
    }
}

impl FromIterator<(String, Variable)> for FrontMatter {
    fn from_iter<T: IntoIterator<Item = (String, Variable)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// A single content unit
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Index key: sub-directory relative to the content root, or `home`
    pub id: String,

    /// Output directory relative to the output root ("" for the root)
    pub path: String,

    /// Output file name, e.g. "about.html"
    pub basename: String,

    /// Source file relative to the content root
    pub source_path: PathBuf,

    /// Display title (front matter or capitalized file stem)
    pub title: String,

    /// Resolved layout file name, e.g. "default.html"
    pub layout: String,

    /// Original front matter
    pub variables: FrontMatter,

    /// Raw body (without front matter)
    pub body: String,

    /// Rendered HTML body
    pub content: String,
}

impl Page {
    /// Output path relative to the output root, `/`-separated
    pub fn output_rel_path(&self) -> String {
        if self.path.is_empty() {
            self.basename.clone()
        } else {
            format!("{}/{}", self.path, self.basename)
        }
    }

    pub fn is_published(&self) -> bool {
        self.variables.published()
    }
}

/// Pages keyed by index key, in first-insertion order.
///
/// Inserting a page under an existing key replaces the earlier page in place.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pages: Vec<Page>,
    index: HashMap<String, usize>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page, returning the page it replaced if the key was taken
    pub fn insert(&mut self, page: Page) -> Option<Page> {
        match self.index.get(&page.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.pages[idx], page)),
            None => {
                self.index.insert(page.id.clone(), self.pages.len());
                self.pages.push(page);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Page> {
        self.index.get(id).map(|&idx| &self.pages[idx])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// New collection holding clones of the pages matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> Collection
    where
        F: Fn(&Page) -> bool,
    {
        let mut filtered = Collection::new();
        for page in self.pages.iter().filter(|p| predicate(p)) {
            filtered.insert(page.clone());
        }
        filtered
    }

    pub fn published(&self) -> Collection {
        self.filter(Page::is_published)
    }

    /// Pages sorted by output path
    pub fn sorted_by_name(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.iter().collect();
        pages.sort_by_key(|p| p.output_rel_path());
        pages
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// A menu link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub title: String,
    pub path: String,
}

/// Named menus, each in discovery order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Menus(BTreeMap<String, Vec<MenuEntry>>);

impl Menus {
    pub fn new() -> Self {
        Self(BTreeMap::from([(DEFAULT_MENU.to_string(), Vec::new())]))
    }

    pub fn push(&mut self, menu: &str, entry: MenuEntry) {
        self.0.entry(menu.to_string()).or_default().push(entry);
    }

    pub fn get(&self, menu: &str) -> &[MenuEntry] {
        self.0.get(menu).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Menus {
    fn default() -> Self {
        Self::new()
    }
}

/// A page listed under a taxonomy term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyEntry {
    pub title: String,
    pub path: String,
    pub url: String,
}

/// Vocabulary → term → pages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Taxonomies(BTreeMap<String, BTreeMap<String, Vec<TaxonomyEntry>>>);

impl Taxonomies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a vocabulary shows up even when no page uses it
    pub fn declare(&mut self, vocabulary: &str) {
        self.0.entry(vocabulary.to_string()).or_default();
    }

    pub fn add(&mut self, vocabulary: &str, term: &str, entry: TaxonomyEntry) {
        self.0
            .entry(vocabulary.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default()
            .push(entry);
    }

    pub fn terms(&self, vocabulary: &str) -> Option<&BTreeMap<String, Vec<TaxonomyEntry>>> {
        self.0.get(vocabulary)
    }

    pub fn vocabularies(&self) -> usize {
        self.0.len()
    }

    pub fn term_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}
