use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::render::page_context;
use std::fs;

/// Renders every published page through its layout into the output tree
#[derive(Debug, Default)]
pub struct RenderPages {
    dry_run: bool,
}

impl Step for RenderPages {
    fn name(&self) -> &str {
        "Rendering pages"
    }

    fn init(&mut self, builder: &Builder, options: &BuildOptions) -> Result<bool, BuildError> {
        self.dry_run = options.dry_run;
        Ok(!builder.pages.is_empty())
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let output_dir = builder.config.output_dir();
        let site = builder.site();
        let pages: Vec<_> = builder.pages.iter().filter(|p| p.is_published()).collect();
        let total = pages.len();
        let mut written = 0;

        for (idx, page) in pages.into_iter().enumerate() {
            let rel = page.output_rel_path();
            let render_error = |source| BuildError::Render {
                page: rel.clone(),
                source,
            };

            let context = page_context(&site, page).map_err(render_error)?;
            let html = builder
                .renderer
                .render(&page.layout, &context)
                .map_err(render_error)?;

            if self.dry_run {
                progress.advance(idx + 1, total, None);
                continue;
            }

            let target = output_dir.join(&rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
            }
            if target.exists() {
                fs::remove_file(&target).map_err(BuildError::io(&target))?;
                progress.message(format!("Delete {rel}"));
            }
            fs::write(&target, html).map_err(BuildError::io(&target))?;
            written += 1;
            progress.advance(idx + 1, total, Some(format!("Write {rel}")));
        }

        if self.dry_run {
            progress.message(format!("{total} pages rendered (dry run)"));
        }

        Ok(StepPayload::Rendered { written })
    }
}
