use super::{kilobytes, BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::cache::{content_hash, Freshness};
use crate::loader::find_files_filtered;
use crate::optimize::{CssOptimizer, HtmlOptimizer, JsOptimizer, Optimizer};
use std::fs;

/// Optimizes output files of one type in place, skipping those the
/// post-process cache already knows.
pub struct PostProcess {
    name: String,
    optimizer: Box<dyn Optimizer>,
    force: bool,
}

impl PostProcess {
    pub fn new(optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            name: format!("Optimizing {}", optimizer.kind()),
            optimizer,
            force: false,
        }
    }

    pub fn css() -> Self {
        Self::new(Box::new(CssOptimizer))
    }

    pub fn js() -> Self {
        Self::new(Box::new(JsOptimizer))
    }

    pub fn html() -> Self {
        Self::new(Box::new(HtmlOptimizer::new()))
    }
}

impl Step for PostProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, builder: &Builder, options: &BuildOptions) -> Result<bool, BuildError> {
        self.force = options.force;
        if options.dry_run || !builder.config.postprocess.enabled {
            return Ok(false);
        }
        Ok(builder
            .config
            .postprocess
            .for_kind(self.optimizer.kind())
            .is_some_and(|settings| settings.enabled))
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let kind = self.optimizer.kind();
        let exts = builder
            .config
            .postprocess
            .for_kind(kind)
            .map(|settings| settings.extensions(kind))
            .unwrap_or_default();
        if exts.is_empty() {
            return Err(BuildError::EmptyExtensions(kind.to_string()));
        }

        let output_dir = builder.config.output_dir();
        let build_root = builder.config.build_root();
        let files: Vec<_> = find_files_filtered(&output_dir, &exts, |dir| dir != build_root)
            .into_iter()
            .filter(|f| !is_minified(&f.rel, &exts))
            .collect();

        if files.is_empty() {
            progress.message("No files");
            return Ok(StepPayload::PostProcessed {
                kind: kind.to_string(),
                processed: 0,
                skipped: 0,
            });
        }

        let cache = builder.postprocess_cache();
        let max = files.len();
        let mut processed = 0;
        let mut skipped = 0;

        for (idx, file) in files.iter().enumerate() {
            let hash = content_hash(&file.path).map_err(BuildError::io(&file.path))?;
            let freshness = if self.force {
                Freshness::Stale
            } else {
                cache.check(&file.rel, hash).map_err(BuildError::io(&file.path))?
            };

            match freshness {
                Freshness::Optimized => {
                    skipped += 1;
                    continue;
                }
                Freshness::Cached => {
                    cache
                        .restore(&file.rel, &file.path)
                        .map_err(BuildError::io(&file.path))?;
                    tracing::debug!(file = %file.rel, "Restored from post-process cache");
                    skipped += 1;
                    continue;
                }
                Freshness::Stale => {}
            }

            let source = fs::read(&file.path).map_err(BuildError::io(&file.path))?;
            let optimized =
                self.optimizer
                    .optimize(&source)
                    .map_err(|source| BuildError::Optimize {
                        path: file.path.clone(),
                        source,
                    })?;

            cache
                .remove_stale(&file.rel, None)
                .map_err(BuildError::io(&file.path))?;
            fs::write(&file.path, &optimized).map_err(BuildError::io(&file.path))?;
            cache
                .store(&file.rel, hash, &file.path)
                .map_err(BuildError::io(&file.path))?;
            processed += 1;

            let (before, after) = (source.len() as u64, optimized.len() as u64);
            let message = if after < before {
                format!(
                    "{} ({} KB -> {} KB)",
                    file.rel,
                    kilobytes(before),
                    kilobytes(after)
                )
            } else {
                file.rel.clone()
            };
            progress.advance(idx + 1, max, Some(message));
        }

        if processed == 0 {
            progress.message("Nothing to do");
        } else {
            progress.message(format!("{processed} processed, {skipped} skipped"));
        }

        Ok(StepPayload::PostProcessed {
            kind: kind.to_string(),
            processed,
            skipped,
        })
    }
}

/// `*.min.<ext>` files are left alone
fn is_minified(rel: &str, exts: &[String]) -> bool {
    let lower = rel.to_lowercase();
    exts.iter()
        .any(|ext| lower.ends_with(&format!(".min.{}", ext.to_lowercase())))
}
