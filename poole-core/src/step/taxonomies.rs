use super::{BuildOptions, Progress, Step, StepPayload};
use crate::builder::{BuildError, Builder};
use crate::loader::find_files;
use crate::models::{Taxonomies, TaxonomyEntry};
use crate::site::join_url;

/// Groups published pages by the configured vocabularies and lists static
/// assets
#[derive(Debug, Default)]
pub struct BuildTaxonomies;

impl Step for BuildTaxonomies {
    fn name(&self) -> &str {
        "Building taxonomies"
    }

    fn init(&mut self, _builder: &Builder, _options: &BuildOptions) -> Result<bool, BuildError> {
        Ok(true)
    }

    fn process(
        &mut self,
        builder: &mut Builder,
        progress: &mut Progress,
    ) -> Result<StepPayload, BuildError> {
        let base_url = builder.config.base_url();
        let mut taxonomies = Taxonomies::new();

        for plural in builder.config.taxonomies.keys() {
            taxonomies.declare(plural);
        }

        for page in builder.pages.iter().filter(|p| p.is_published()) {
            for plural in builder.config.taxonomies.keys() {
                let Some(terms) = page.variables.get(plural) else {
                    continue;
                };
                for term in terms.to_strings() {
                    let term = term.trim();
                    if term.is_empty() {
                        continue;
                    }
                    taxonomies.add(
                        plural,
                        term,
                        TaxonomyEntry {
                            title: page.title.clone(),
                            path: page.path.clone(),
                            url: join_url(&base_url, &page.output_rel_path()),
                        },
                    );
                }
            }
        }

        let static_files: Vec<String> = find_files(&builder.config.assets_dir(), &[])
            .into_iter()
            .map(|f| f.rel)
            .collect();

        let vocabularies = taxonomies.vocabularies();
        let terms = taxonomies.term_count();
        progress.message(format!(
            "{vocabularies} vocabularies, {terms} terms, {} static files",
            static_files.len()
        ));

        builder.taxonomies = taxonomies;
        builder.static_files = static_files;

        Ok(StepPayload::Taxonomies {
            vocabularies,
            terms,
        })
    }
}
