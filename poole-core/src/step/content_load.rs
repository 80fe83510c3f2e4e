use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::loader::find_files;

/// Lists content files under the pages directory
#[derive(Debug, Default)]
pub struct LoadContent;

impl Step for LoadContent {
    fn name(&self) -> &str {
        "Loading content"
    }

    fn init(&mut self, builder: &Builder, _options: &BuildOptions) -> Result<bool, BuildError> {
        let dir = builder.config.pages_dir();
        if !dir.is_dir() {
            tracing::warn!(path = %dir.display(), "Content directory not found");
            return Ok(false);
        }
        Ok(true)
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let files = find_files(&builder.config.pages_dir(), &builder.config.content.ext);
        let count = files.len();

        progress.message(match count {
            0 => "No files".to_string(),
            1 => "1 file found".to_string(),
            n => format!("{n} files found"),
        });
        builder.content_files = files;

        Ok(StepPayload::Content { files: count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::testing::{site, write};

    #[test]
    fn test_lists_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = site(dir.path(), "");
        write(dir.path(), "_poole/content/pages/index.md", "Home");
        write(dir.path(), "_poole/content/pages/about/about.md", "About");
        write(dir.path(), "_poole/content/pages/about/photo.jpg", "");

        let mut step = LoadContent;
        assert!(step.init(&builder, &BuildOptions::default()).unwrap());
        let mut progress = Progress::new(step.name());
        let payload = step.process(&mut builder, &mut progress).unwrap();

        assert_eq!(payload, StepPayload::Content { files: 2 });
        let rels: Vec<_> = builder.content_files().iter().map(|f| f.rel.as_str()).collect();
        assert_eq!(rels, vec!["about/about.md", "index.md"]);
        assert_eq!(progress.messages().to_vec(), vec!["2 files found".to_string()]);
    }

    #[test]
    fn test_missing_content_dir_is_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let builder = site(dir.path(), "");
        assert!(!LoadContent.init(&builder, &BuildOptions::default()).unwrap());
    }
}
