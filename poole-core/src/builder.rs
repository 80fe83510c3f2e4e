//! Build context shared by every step, and the errors a build can raise.

use crate::{
    cache::PostProcessCache,
    config::{Config, ConfigError},
    fetch::FetchError,
    frontmatter::FrontMatterError,
    hooks::HookRegistry,
    loader::ContentFile,
    models::{Collection, Menus, Taxonomies},
    optimize::OptimizeError,
    pipeline::StepRunner,
    render::{LayoutEngine, RenderError},
    site::Site,
    step::{default_steps, BuildOptions, BuildReport},
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Front matter error in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("Can't load source of {path:?}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: FetchError,
    },

    #[error("Can't render {page}: {source}")]
    Render {
        page: String,
        #[source]
        source: RenderError,
    },

    #[error("Can't load layouts: {0}")]
    Layouts(#[source] RenderError),

    #[error("{path:?}: {source}")]
    Optimize {
        path: PathBuf,
        #[source]
        source: OptimizeError,
    },

    #[error("The config key postprocess.{0}.ext is empty")]
    EmptyExtensions(String),

    #[error("step \"{step}\" failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// Closure wrapping an I/O error with the path it happened on
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
        move |source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The innermost error, past step wrappers
    pub fn root(&self) -> &BuildError {
        match self {
            BuildError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Build state. Created with the resolved config; steps fill it in order.
pub struct Builder {
    pub(crate) config: Config,
    pub(crate) renderer: Box<dyn LayoutEngine>,
    pub(crate) hooks: HookRegistry,
    pub(crate) content_files: Vec<ContentFile>,
    pub(crate) pages: Collection,
    pub(crate) menus: Menus,
    pub(crate) taxonomies: Taxonomies,
    pub(crate) static_files: Vec<String>,
    pub(crate) time: DateTime<Utc>,
}

impl Builder {
    /// Fails on config problems the steps can't recover from, such as an
    /// unknown hook name.
    pub fn new(config: Config, renderer: Box<dyn LayoutEngine>) -> Result<Self, BuildError> {
        let hooks = HookRegistry::from_names(&config.hooks)?;
        Ok(Self {
            config,
            renderer,
            hooks,
            content_files: Vec::new(),
            pages: Collection::new(),
            menus: Menus::new(),
            taxonomies: Taxonomies::new(),
            static_files: Vec::new(),
            time: Utc::now(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn renderer(&self) -> &dyn LayoutEngine {
        self.renderer.as_ref()
    }

    pub fn content_files(&self) -> &[ContentFile] {
        &self.content_files
    }

    pub fn pages(&self) -> &Collection {
        &self.pages
    }

    pub fn menus(&self) -> &Menus {
        &self.menus
    }

    pub fn taxonomies(&self) -> &Taxonomies {
        &self.taxonomies
    }

    pub fn static_files(&self) -> &[String] {
        &self.static_files
    }

    pub fn site(&self) -> Site<'_> {
        Site::new(
            &self.config,
            &self.pages,
            &self.menus,
            &self.taxonomies,
            &self.static_files,
            self.time,
        )
    }

    pub fn postprocess_cache(&self) -> PostProcessCache {
        PostProcessCache::new(&self.config.cache_dir())
    }

    /// Run the generate pipeline
    pub fn build(&mut self, options: BuildOptions) -> Result<BuildReport, BuildError> {
        tracing::info!(
            site = %self.config.site_root().display(),
            dry_run = options.dry_run,
            force = options.force,
            "Generating site"
        );
        let mut runner = StepRunner::new(default_steps());
        runner.run(self, &options)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("site_root", &self.config.site_root())
            .field("content_files", &self.content_files.len())
            .field("pages", &self.pages.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}
