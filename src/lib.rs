//! Validation and name-connotation analysis of citizen-initiative records.
//!
//! Raw rows from the initiative database are validated into typed records,
//! split by outcome, and every name is classified as positive, negative or
//! neutral through a leading-word lexicon plus manual per-record overrides.
//! Unresolved names can be classified interactively; all decisions persist
//! across runs.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod normalize;
pub mod processor;
pub mod report;
pub mod resolver;
pub mod source;
pub mod state;
pub mod types;
pub mod validate;

pub use aggregate::{summarize, Partition};
pub use classifier::NameClassifier;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use normalize::{extract_first_word, starts_with_word};
pub use processor::AuditProcessor;
pub use resolver::{LinePrompter, Prompter, Resolver};
pub use source::DatasetSource;
pub use state::{ClassificationStore, ClassifiedWords, ManualClassifications, StateLoad};
pub use types::{BucketSummary, Connotation, Initiative, Outcome, Summary};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::processor::AuditProcessor;
    pub use crate::resolver::{LinePrompter, Prompter};
    pub use crate::types::{Connotation, Initiative, Outcome, Summary};
}
