use crate::error::{Error, Result};
use crate::source::DatasetSource;
use crate::state::ClassifiedWords;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE: &str = "projects.json";
pub const DEFAULT_CONFIG_FILE: &str = "initiative-audit.yml";
pub const DEFAULT_WORDS_FILE: &str = "classified-words.json";
pub const DEFAULT_MANUAL_FILE: &str = "manual-classifications.json";
pub const DEFAULT_EXPORT_FILE: &str = "results.json";

/// Leading words shipped with the tool, merged with the persisted lexicon
pub const SEED_POSITIVE: &[&str] = &[
    "für",
    "pro",
    "erweiterung",
    "weiterführung",
    "erhalt",
    "rettung",
    "einführung",
    "rettet",
];
pub const SEED_NEGATIVE: &[&str] = &["gegen", "verhinderung", "kein"];

pub fn seed_lexicon() -> ClassifiedWords {
    ClassifiedWords::new(SEED_POSITIVE.iter().copied(), SEED_NEGATIVE.iter().copied())
}

/// Configuration for one audit run
#[derive(Debug, Clone)]
pub struct Config {
    pub source: DatasetSource,
    /// Directory holding the classification state files
    pub state_dir: PathBuf,
    pub words_file: PathBuf,
    pub manual_file: PathBuf,
    pub export: bool,
    pub export_file: PathBuf,
    pub skip_classification: bool,
    /// Where to store a fetched dataset for offline runs
    pub snapshot_file: Option<PathBuf>,
    pub seed: ClassifiedWords,
}

impl Config {
    /// Create a new default configuration
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: DatasetSource::from(source.into().as_str()),
            state_dir: PathBuf::from("."),
            words_file: PathBuf::from(DEFAULT_WORDS_FILE),
            manual_file: PathBuf::from(DEFAULT_MANUAL_FILE),
            export: false,
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            skip_classification: false,
            snapshot_file: None,
            seed: seed_lexicon(),
        }
    }

    /// Path of the classified-words document
    pub fn words_path(&self) -> PathBuf {
        self.state_dir.join(&self.words_file)
    }

    /// Path of the manual-classifications document
    pub fn manual_path(&self) -> PathBuf {
        self.state_dir.join(&self.manual_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let DatasetSource::File(path) = &self.source {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("Dataset path is empty".to_string()));
            }
        }

        if self.state_dir.exists() && !self.state_dir.is_dir() {
            return Err(Error::Config(format!(
                "State directory is not a directory: {}",
                self.state_dir.display()
            )));
        }

        if self.words_path() == self.manual_path() {
            return Err(Error::Config(format!(
                "Classified words and manual classifications share one file: {}",
                self.words_path().display()
            )));
        }

        if self.snapshot_file.is_some() && !self.source.is_remote() {
            return Err(Error::Config(
                "A snapshot can only be written for a remote source".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

/// Settings read from the optional YAML config file. Every key is optional;
/// command-line flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub words_file: Option<PathBuf>,
    pub manual_file: Option<PathBuf>,
    pub export_file: Option<PathBuf>,
    pub snapshot_file: Option<PathBuf>,
    pub lexicon: Option<SeedLexicon>,
}

/// Seed lexicon override
#[derive(Debug, Default, Deserialize)]
pub struct SeedLexicon {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

/// Load and parse an initiative-audit.yml file
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default settings
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            config: Config::new(source),
        }
    }

    /// Start from the values of a config file
    pub fn from_file_config(file: FileConfig) -> Self {
        let mut builder = Self::new(file.source.as_deref().unwrap_or(DEFAULT_SOURCE));
        if let Some(dir) = file.state_dir {
            builder = builder.state_dir(dir);
        }
        if let Some(words) = file.words_file {
            builder.config.words_file = words;
        }
        if let Some(manual) = file.manual_file {
            builder.config.manual_file = manual;
        }
        if let Some(export) = file.export_file {
            builder = builder.export_file(export);
        }
        if let Some(snapshot) = file.snapshot_file {
            builder = builder.snapshot_file(snapshot);
        }
        if let Some(lexicon) = file.lexicon {
            builder = builder.seed(ClassifiedWords::new(lexicon.positive, lexicon.negative));
        }
        builder
    }

    /// Set the dataset source (path or http(s) URL)
    pub fn source(mut self, source: &str) -> Self {
        self.config.source = DatasetSource::from(source);
        self
    }

    /// Set the state directory
    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.state_dir = dir.into();
        self
    }

    /// Enable or disable the JSON export
    pub fn export(mut self, export: bool) -> Self {
        self.config.export = export;
        self
    }

    /// Set the export file
    pub fn export_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.export_file = path.into();
        self
    }

    /// Skip the interactive resolver
    pub fn skip_classification(mut self, skip: bool) -> Self {
        self.config.skip_classification = skip;
        self
    }

    /// Write fetched rows to a snapshot file
    pub fn snapshot_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_file = Some(path.into());
        self
    }

    /// Replace the seed lexicon
    pub fn seed(mut self, seed: ClassifiedWords) -> Self {
        self.config.seed = seed;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
