//! Markdown body conversion.

use crate::slug::slugify;
use pulldown_cmark::{html, BrokenLink, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::BTreeMap;

/// Reference name that always resolves to the site base URL
pub const BASE_URL_LINK: &str = "base_url";

/// Converts Markdown bodies to HTML.
///
/// Reference-style links whose label matches a predefined link
/// (`[Home][base_url]`) resolve without a definition in the document.
pub struct BodyConverter {
    options: Options,
    links: BTreeMap<String, String>,
}

impl BodyConverter {
    pub fn new(base_url: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let mut links = BTreeMap::new();
        links.insert(BASE_URL_LINK.to_string(), base_url.to_string());

        Self { options, links }
    }

    /// Add named link placeholders; `base_url` can't be redefined
    pub fn with_links<'a, I>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, url) in links {
            let name = name.to_lowercase();
            if name != BASE_URL_LINK {
                self.links.insert(name, url.clone());
            }
        }
        self
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        self.links.get(&reference.trim().to_lowercase()).cloned()
    }

    pub fn convert(&self, markdown: &str) -> String {
        let callback = |link: BrokenLink| {
            self.resolve(&link.reference)
                .map(|url| (CowStr::from(url), CowStr::from("")))
        };
        let parser = Parser::new_with_broken_link_callback(markdown, self.options, Some(callback));
        let events: Vec<Event> = parser.collect();

        let events = attach_heading_ids(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

/// Give headings without an explicit `{#id}` a slug of their text
fn attach_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut ids = Vec::new();
    let mut current: Option<String> = None;
    for event in &events {
        match event {
            Event::Start(Tag::Heading { .. }) => current = Some(String::new()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(title) = current.as_mut() {
                    title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(title) = current.take() {
                    ids.push(slugify(&title));
                }
            }
            _ => {}
        }
    }

    let mut ids = ids.into_iter();
    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let next = ids.next().filter(|s| !s.is_empty());
                let id = id.or_else(|| next.map(CowStr::from));
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        })
        .collect()
}
