use crate::classifier::NameClassifier;
use crate::types::{BucketSummary, Connotation, Initiative, Outcome, Summary};
use std::collections::HashSet;

/// Initiatives split by outcome, input order kept within each bucket
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub positive: Vec<&'a Initiative>,
    pub failed: Vec<&'a Initiative>,
    pub other: Vec<&'a Initiative>,
}

impl<'a> Partition<'a> {
    pub fn new(initiatives: &'a [Initiative]) -> Self {
        let mut partition = Partition::default();
        for initiative in initiatives {
            match initiative.outcome() {
                Outcome::Positive => partition.positive.push(initiative),
                Outcome::Failed => partition.failed.push(initiative),
                Outcome::Other => partition.other.push(initiative),
            }
        }
        partition
    }

    /// Records of the positive and failed buckets, in input order. These are
    /// the records whose name connotation is reported.
    pub fn classifiable(initiatives: &'a [Initiative]) -> impl Iterator<Item = &'a Initiative> {
        initiatives
            .iter()
            .filter(|i| i.outcome() != Outcome::Other)
    }
}

/// Count names per connotation within one bucket.
///
/// Neutral is the bucket minus the positive and negative ids, so a record is
/// counted exactly once.
pub fn summarize_bucket(bucket: &[&Initiative], classifier: &NameClassifier) -> BucketSummary {
    let all: HashSet<i64> = bucket.iter().map(|i| i.id).collect();
    let mut positive = HashSet::new();
    let mut negative = HashSet::new();

    for initiative in bucket {
        match classifier.classify(initiative) {
            Connotation::Positive => {
                positive.insert(initiative.id);
            }
            Connotation::Negative => {
                negative.insert(initiative.id);
            }
            Connotation::Neutral => {}
        }
    }
    let negative: HashSet<i64> = negative.difference(&positive).copied().collect();
    let neutral = all
        .iter()
        .filter(|id| !positive.contains(*id) && !negative.contains(*id))
        .count();

    BucketSummary {
        total: all.len(),
        with_positive_name: positive.len(),
        with_negative_name: negative.len(),
        neutral,
    }
}

/// Summary over the whole dataset
pub fn summarize(initiatives: &[Initiative], classifier: &NameClassifier) -> Summary {
    let partition = Partition::new(initiatives);
    Summary {
        total: initiatives.len(),
        without_status: initiatives.iter().filter(|i| !i.has_status()).count(),
        positive: summarize_bucket(&partition.positive, classifier),
        failed: summarize_bucket(&partition.failed, classifier),
    }
}
