use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use std::fs;

pub const MARKER_FILENAME: &str = "README.md";
pub const MARKER_CONTENT: &str = "Powered by Poole.";

/// Writes the completion marker into the output root
#[derive(Debug, Default)]
pub struct WriteMarker;

impl Step for WriteMarker {
    fn name(&self) -> &str {
        "Writing completion marker"
    }

    fn init(&mut self, _builder: &Builder, options: &BuildOptions) -> Result<bool, BuildError> {
        Ok(!options.dry_run)
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let output_dir = builder.config.output_dir();
        fs::create_dir_all(&output_dir).map_err(BuildError::io(&output_dir))?;

        let marker = output_dir.join(MARKER_FILENAME);
        fs::write(&marker, MARKER_CONTENT).map_err(BuildError::io(&marker))?;
        progress.message(format!("Write {MARKER_FILENAME}"));

        Ok(StepPayload::Completed {
            marker: MARKER_FILENAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::testing::site;

    #[test]
    fn test_marker_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = site(dir.path(), "");
        let marker = dir.path().join("_site").join(MARKER_FILENAME);
        fs::create_dir_all(marker.parent().unwrap()).unwrap();
        fs::write(&marker, "stale").unwrap();

        let mut step = WriteMarker;
        assert!(step.init(&builder, &BuildOptions::default()).unwrap());
        let mut progress = Progress::new(step.name());
        step.process(&mut builder, &mut progress).unwrap();

        assert_eq!(fs::read_to_string(&marker).unwrap(), MARKER_CONTENT);
    }
}
