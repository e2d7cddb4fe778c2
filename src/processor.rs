use crate::aggregate::{summarize, Partition};
use crate::classifier::NameClassifier;
use crate::config::Config;
use crate::error::Result;
use crate::report::{export_summary, write_summary};
use crate::resolver::{Prompter, Resolver};
use crate::source::{load_rows, write_snapshot};
use crate::state::ClassificationStore;
use crate::types::Summary;
use crate::validate::validate_rows;
use std::io::Write;
use tracing::info;

/// Runs the audit: load, validate, resolve, summarize, export
pub struct AuditProcessor {
    config: Config,
}

impl AuditProcessor {
    /// Create a new processor with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline, writing the summary to `out`.
    ///
    /// The prompter is only consulted when classification is not skipped.
    pub fn run<P: Prompter, W: Write>(&self, prompter: P, out: &mut W) -> Result<Summary> {
        let config = &self.config;

        let rows = load_rows(&config.source)?;
        if let Some(snapshot) = &config.snapshot_file {
            write_snapshot(snapshot, &rows)?;
        }
        let initiatives = validate_rows(&rows)?;
        info!(count = initiatives.len(), "validated initiatives");

        let mut store = ClassificationStore::open(
            config.words_path(),
            config.manual_path(),
            config.seed.clone(),
        )?;

        if config.skip_classification {
            info!("skipping interactive classification");
        } else {
            Resolver::new(&mut store, prompter).resolve(Partition::classifiable(&initiatives))?;
        }

        let classifier = NameClassifier::new(store.lexicon(), store.manual());
        let summary = summarize(&initiatives, &classifier);

        write_summary(out, &config.source.to_string(), &summary)?;

        if config.export {
            export_summary(&config.export_file, &summary)?;
        }

        Ok(summary)
    }
}
