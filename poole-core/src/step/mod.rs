//! Build steps and the values they report.

mod complete;
mod content_load;
mod content_parse;
mod postprocess;
mod render;
mod static_copy;
mod taxonomies;

pub use complete::{WriteMarker, MARKER_CONTENT, MARKER_FILENAME};
pub use content_load::LoadContent;
pub use content_parse::LoadPages;
pub use postprocess::PostProcess;
pub use render::RenderPages;
pub use static_copy::CopyAssets;
pub use taxonomies::BuildTaxonomies;

use crate::builder::{BuildError, Builder};
use serde::Serialize;
use std::time::Duration;

/// Flags for a single build run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Render but write nothing
    pub dry_run: bool,
    /// Reprocess post-process candidates even when their markers are fresh
    pub force: bool,
}

/// One stage of the build.
///
/// `init` only runs cheap checks and returns `false` when the step doesn't
/// apply to this run; `process` then never runs.
pub trait Step {
    fn name(&self) -> &str;

    fn init(&mut self, builder: &Builder, options: &BuildOptions) -> Result<bool, BuildError>;

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError>;
}

/// What a step produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepPayload {
    /// Step was skipped
    None,
    Content { files: usize },
    Pages { pages: usize, menus: usize },
    Taxonomies { vocabularies: usize, terms: usize },
    Rendered { written: usize },
    Assets { copied: usize },
    PostProcessed {
        kind: String,
        processed: usize,
        skipped: usize,
    },
    Completed { marker: String },
}

/// Progress and status messages of the running step
#[derive(Debug)]
pub struct Progress {
    step: String,
    current: usize,
    total: usize,
    messages: Vec<String>,
}

impl Progress {
    pub fn new(step: &str) -> Self {
        Self {
            step: step.to_string(),
            current: 0,
            total: 0,
            messages: Vec::new(),
        }
    }

    /// Record a human-readable status line
    pub fn message(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(step = %self.step, "{}", message);
        self.messages.push(message);
    }

    /// Record position `current` of `total`, with an optional status line
    pub fn advance(&mut self, current: usize, total: usize, message: Option<String>) {
        self.current = current;
        self.total = total;
        tracing::trace!(step = %self.step, current, total, "progress");
        if let Some(message) = message {
            self.message(message);
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.current, self.total)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub(crate) fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub skipped: bool,
    pub messages: Vec<String>,
    pub payload: StepPayload,
    pub elapsed: Duration,
}

/// Outcome of a whole run, one report per step in pipeline order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub steps: Vec<StepReport>,
}

impl BuildReport {
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn elapsed(&self) -> Duration {
        self.steps.iter().map(|s| s.elapsed).sum()
    }
}

/// Size in KB the way the post-process messages print it
pub(crate) fn kilobytes(bytes: u64) -> u64 {
    bytes.div_ceil(1000)
}

/// The generate pipeline, in order
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(LoadContent::default()),
        Box::new(LoadPages::default()),
        Box::new(BuildTaxonomies),
        Box::new(RenderPages::default()),
        Box::new(CopyAssets::default()),
        Box::new(PostProcess::css()),
        Box::new(PostProcess::js()),
        Box::new(PostProcess::html()),
        Box::new(WriteMarker::default()),
    ]
}
