use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::converter::BodyConverter;
use crate::fetch::{SourceFetcher, SourceLocation};
use crate::frontmatter::parse_front_matter;
use crate::loader::ContentFile;
use crate::models::{Collection, MenuEntry, Menus, Page, HOME_KEY};
use crate::render::resolve_layout;
use crate::slug::ucfirst;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Turns content files into pages and collects menus
#[derive(Debug, Default)]
pub struct LoadPages;

impl Step for LoadPages {
    fn name(&self) -> &str {
        "Loading pages"
    }

    fn init(&mut self, builder: &Builder, _options: &BuildOptions) -> Result<bool, BuildError> {
        Ok(!builder.content_files.is_empty())
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let config = &builder.config;
        let converter = BodyConverter::new(&config.base_url()).with_links(&config.content.links);
        let mut fetcher = SourceFetcher::new(Duration::from_secs(config.content.source_timeout));

        let mut pages = Collection::new();
        let mut menus = Menus::new();
        let total = builder.content_files.len();

        for (idx, file) in builder.content_files.iter().enumerate() {
            let page = load_page(file, builder, &converter, &mut fetcher)?;

            // Drafts stay out of menus
            if let Some(menu) = page.variables.menu().filter(|_| page.is_published()) {
                menus.push(
                    menu,
                    MenuEntry {
                        title: page.title.clone(),
                        path: page.path.clone(),
                    },
                );
            }

            let id = page.id.clone();
            if let Some(previous) = pages.insert(page) {
                tracing::warn!(
                    id = %id,
                    replaced = %previous.source_path.display(),
                    by = %file.rel,
                    "Page overwritten"
                );
            }
            progress.advance(idx + 1, total, None);
        }

        let count = pages.len();
        let menu_count = menus.len();
        progress.message(format!("{count} pages loaded"));

        builder.pages = pages;
        builder.menus = menus;

        Ok(StepPayload::Pages {
            pages: count,
            menus: menu_count,
        })
    }
}

/// Index key and output directory of a content file
pub(crate) fn index_key(file: &ContentFile) -> (String, String) {
    match file.rel_dir() {
        "" => (HOME_KEY.to_string(), String::new()),
        dir => (dir.to_string(), dir.to_string()),
    }
}

fn load_page(
    file: &ContentFile,
    builder: &Builder,
    converter: &BodyConverter,
    fetcher: &mut SourceFetcher,
) -> Result<Page, BuildError> {
    let raw = fs::read_to_string(&file.path).map_err(BuildError::io(&file.path))?;
    let (variables, mut body) =
        parse_front_matter(&raw).map_err(|source| BuildError::FrontMatter {
            path: file.path.clone(),
            source,
        })?;

    if let Some(source) = variables.source() {
        let base_dir = file.path.parent().unwrap_or(Path::new("."));
        let location = SourceLocation::parse(source, base_dir);
        body = fetcher
            .fetch(&location)
            .map_err(|source| BuildError::Source {
                path: file.path.clone(),
                source,
            })?;
    }

    let (id, path) = index_key(file);
    let stem = file.stem();
    let title = variables
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| ucfirst(stem));
    let layout = resolve_layout(builder.renderer(), variables.layout());
    let content = converter.convert(&body);

    Ok(Page {
        id,
        path,
        basename: format!("{stem}.html"),
        source_path: file.rel.clone().into(),
        title,
        layout,
        variables,
        body,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::testing::{builder, serve_once, site, write};
    use crate::step::LoadContent;

    fn load(builder: &mut Builder) -> Result<StepPayload, BuildError> {
        let options = BuildOptions::default();
        let mut progress = Progress::new("test");
        if LoadContent.init(builder, &options)? {
            LoadContent.process(builder, &mut progress)?;
        }
        let mut step = LoadPages;
        assert!(step.init(builder, &options)?);
        step.process(builder, &mut progress)
    }

    #[test]
    fn test_home_and_sub_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(
            dir.path(),
            "_poole/content/pages/index.md",
            "<!--\ntitle = Home\nmenu = nav\n-->\nWelcome [home][base_url]",
        );
        write(
            dir.path(),
            "_poole/content/pages/about/about.md",
            "---\ntitle: About\n---\nAbout us",
        );

        let payload = load(&mut b).unwrap();
        assert_eq!(payload, StepPayload::Pages { pages: 2, menus: 1 });

        let home = b.pages().get(HOME_KEY).unwrap();
        assert_eq!(home.title, "Home");
        assert_eq!(home.output_rel_path(), "index.html");
        assert!(home.content.contains(r#"<a href="http://example.com">home</a>"#));

        let about = b.pages().get("about").unwrap();
        assert_eq!(about.output_rel_path(), "about/about.html");
        assert_eq!(about.layout, "default.html");

        assert_eq!(
            b.menus().get("nav"),
            &[MenuEntry {
                title: "Home".into(),
                path: String::new()
            }]
        );
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/contact/contact.md", "No front matter");

        load(&mut b).unwrap();
        let page = b.pages().get("contact").unwrap();
        assert_eq!(page.title, "Contact");
        assert!(page.variables.is_empty());
        assert_eq!(page.body, "No front matter");
    }

    #[test]
    fn test_layout_resolution() {
        let dir = tempfile::tempdir().unwrap();
        site(dir.path(), "");
        let mut b = builder(dir.path(), &["default.html", "post.html"]);
        write(dir.path(), "_poole/content/pages/a/a.md", "---\nlayout: post\n---\n");
        write(dir.path(), "_poole/content/pages/b/b.md", "---\nlayout: missing\n---\n");

        load(&mut b).unwrap();
        assert_eq!(b.pages().get("a").unwrap().layout, "post.html");
        assert_eq!(b.pages().get("b").unwrap().layout, "default.html");
    }

    #[test]
    fn test_same_index_key_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/blog/first.md", "---\ntitle: First\n---\n");
        write(dir.path(), "_poole/content/pages/blog/second.md", "---\ntitle: Second\n---\n");

        load(&mut b).unwrap();
        assert_eq!(b.pages().len(), 1);
        let page = b.pages().get("blog").unwrap();
        assert_eq!(page.title, "Second");
        assert_eq!(page.output_rel_path(), "blog/second.html");
    }

    #[test]
    fn test_menu_entries_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/b/b.md", "---\ntitle: Bravo\nmenu: nav\n---\n");
        write(dir.path(), "_poole/content/pages/a/a.md", "---\ntitle: Alpha\nmenu: nav\n---\n");
        write(dir.path(), "_poole/content/pages/c/c.md", "---\ntitle: Charlie\nmenu: footer\n---\n");

        load(&mut b).unwrap();
        let nav: Vec<_> = b.menus().get("nav").iter().map(|e| (e.title.as_str(), e.path.as_str())).collect();
        assert_eq!(nav, vec![("Alpha", "a"), ("Bravo", "b")]);
        assert_eq!(b.menus().get("footer")[0].title, "Charlie");
    }

    #[test]
    fn test_unpublished_pages_stay_out_of_menus() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/index.md", "---\ntitle: Home\nmenu: nav\n---\nhi");
        write(
            dir.path(),
            "_poole/content/pages/draft/draft.md",
            "---\ntitle: Draft\nmenu: nav\npublished: false\n---\n",
        );

        load(&mut b).unwrap();
        let nav: Vec<_> = b.menus().get("nav").iter().map(|e| e.title.as_str()).collect();
        assert_eq!(nav, vec!["Home"]);
        // The draft is still loaded, just not linked
        assert!(b.pages().get("draft").is_some());
    }

    #[test]
    fn test_remote_source_becomes_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        let base = serve_once("200 OK", "Fetched *remotely*");
        write(
            dir.path(),
            "_poole/content/pages/remote/remote.md",
            &format!("---\nsource: {base}/remote.md\n---\nIgnored body"),
        );

        load(&mut b).unwrap();
        let page = b.pages().get("remote").unwrap();
        assert_eq!(page.body, "Fetched *remotely*");
        assert!(page.content.contains("<em>remotely</em>"));
    }

    #[test]
    fn test_source_replaces_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/shared/readme.md", "# Imported");
        write(
            dir.path(),
            "_poole/content/pages/readme/readme.md",
            "---\nsource: ../../shared/readme.md\n---\nIgnored body",
        );

        load(&mut b).unwrap();
        let page = b.pages().get("readme").unwrap();
        assert_eq!(page.body, "# Imported");
        assert!(page.content.contains("Imported</h1>"));
    }

    #[test]
    fn test_source_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(
            dir.path(),
            "_poole/content/pages/x/x.md",
            "---\nsource: nowhere.md\n---\n",
        );

        assert!(matches!(load(&mut b), Err(BuildError::Source { .. })));
    }

    #[test]
    fn test_malformed_front_matter_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut b = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/x/x.md", "<!--\nbroken line\n-->\n");

        let err = load(&mut b).unwrap_err();
        assert!(matches!(err, BuildError::FrontMatter { .. }));
        assert!(err.to_string().contains("broken line"));
    }
}
