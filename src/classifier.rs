use crate::normalize::starts_with_word;
use crate::state::{ClassifiedWords, ManualClassifications};
use crate::types::{Connotation, Initiative};

/// Decides the connotation of an initiative's name from the lexicon and the
/// manual overrides.
#[derive(Debug, Clone, Copy)]
pub struct NameClassifier<'a> {
    lexicon: &'a ClassifiedWords,
    manual: &'a ManualClassifications,
}

impl<'a> NameClassifier<'a> {
    pub fn new(lexicon: &'a ClassifiedWords, manual: &'a ManualClassifications) -> Self {
        Self { lexicon, manual }
    }

    /// Manual overrides and lexicon matches land in the same bucket; positive
    /// is checked before negative.
    pub fn classify(&self, initiative: &Initiative) -> Connotation {
        classify(initiative, self.lexicon, self.manual)
    }

    /// Connotation from the lexicon alone
    pub fn lexicon_match(&self, initiative: &Initiative) -> Option<Connotation> {
        lexicon_match(initiative, self.lexicon)
    }

    /// A record is resolved once the lexicon matches its name or any manual
    /// set holds its id.
    pub fn is_resolved(&self, initiative: &Initiative) -> bool {
        self.manual.contains(initiative.id) || self.lexicon_match(initiative).is_some()
    }

    /// Records still needing an operator decision, in input order
    pub fn unresolved<'r, I>(&self, initiatives: I) -> Vec<&'r Initiative>
    where
        I: IntoIterator<Item = &'r Initiative>,
    {
        initiatives
            .into_iter()
            .filter(|i| !self.is_resolved(i))
            .collect()
    }
}

pub fn classify(
    initiative: &Initiative,
    lexicon: &ClassifiedWords,
    manual: &ManualClassifications,
) -> Connotation {
    let name = initiative.name.as_deref();
    if manual.positive.contains(&initiative.id) || starts_with_word(name, &lexicon.positive) {
        Connotation::Positive
    } else if manual.negative.contains(&initiative.id)
        || starts_with_word(name, &lexicon.negative)
    {
        Connotation::Negative
    } else {
        Connotation::Neutral
    }
}

pub fn lexicon_match(initiative: &Initiative, lexicon: &ClassifiedWords) -> Option<Connotation> {
    let name = initiative.name.as_deref();
    if starts_with_word(name, &lexicon.positive) {
        Some(Connotation::Positive)
    } else if starts_with_word(name, &lexicon.negative) {
        Some(Connotation::Negative)
    } else {
        None
    }
}
