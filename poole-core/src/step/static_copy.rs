use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::loader::find_files;
use std::fs;

/// Directory under the output root receiving the assets tree
pub const ASSETS_OUTPUT_DIR: &str = "assets";

/// Mirrors the assets directory into `<output>/assets`
#[derive(Debug, Default)]
pub struct CopyAssets;

impl Step for CopyAssets {
    fn name(&self) -> &str {
        "Copying assets"
    }

    fn init(&mut self, builder: &Builder, options: &BuildOptions) -> Result<bool, BuildError> {
        Ok(!options.dry_run && builder.config.assets_dir().is_dir())
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let target_root = builder.config.output_dir().join(ASSETS_OUTPUT_DIR);
        let files = find_files(&builder.config.assets_dir(), &[]);
        let total = files.len();

        for (idx, file) in files.iter().enumerate() {
            let target = target_root.join(&file.rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
            }
            fs::copy(&file.path, &target).map_err(BuildError::io(&file.path))?;
            progress.advance(idx + 1, total, None);
        }

        progress.message(match total {
            0 => "No files".to_string(),
            n => format!("{n} files copied"),
        });
        Ok(StepPayload::Assets { copied: total })
    }
}
