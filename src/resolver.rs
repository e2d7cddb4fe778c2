//! Interactive classification of initiatives the lexicon and the manual
//! overrides do not cover yet.
//!
//! Each record moves through a small state machine:
//!
//! ```text
//! Unresolved ─► AwaitingRecordDecision ─┬─ p / n / enter ─► Resolved
//!                      ▲                ├─ w ─► AwaitingWordDecision ─┐
//!                      │                └─ other ─┐                   │
//!                      └──────────────────────────┴───────────────────┘
//! ```
//!
//! Every decision is persisted before the next prompt.

use crate::classifier::NameClassifier;
use crate::error::{Error, Result};
use crate::normalize::extract_first_word;
use crate::state::ClassificationStore;
use crate::types::{Connotation, Initiative};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Source of operator answers
pub trait Prompter {
    /// Show `prompt` and return the answer line without its line ending.
    /// Fails with [`Error::PromptClosed`] once input is exhausted.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Show an informational line
    fn say(&mut self, message: &str) -> Result<()>;
}

/// Prompter over any line reader and writer
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::PromptClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

/// Operator answer for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDecision {
    Positive,
    Negative,
    Neutral,
    ClassifyWord,
    Retry,
}

impl From<&str> for RecordDecision {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "p" => RecordDecision::Positive,
            "n" => RecordDecision::Negative,
            "w" => RecordDecision::ClassifyWord,
            "" => RecordDecision::Neutral,
            _ => RecordDecision::Retry,
        }
    }
}

/// Operator answer for a leading word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordDecision {
    Positive,
    Negative,
    Ignore,
}

impl From<&str> for WordDecision {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "p" => WordDecision::Positive,
            "n" => WordDecision::Negative,
            _ => WordDecision::Ignore,
        }
    }
}

/// Per-record resolution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    Unresolved,
    AwaitingRecordDecision,
    AwaitingWordDecision { word: String },
    Resolved(Connotation),
}

/// What a resolver session changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub words_added: usize,
    /// Records that became resolved through a word added earlier in the session
    pub skipped: usize,
    /// Operator input ended before every record was resolved
    pub interrupted: bool,
}

impl ResolveTally {
    pub fn resolved(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    fn count(&mut self, connotation: Connotation) {
        match connotation {
            Connotation::Positive => self.positive += 1,
            Connotation::Negative => self.negative += 1,
            Connotation::Neutral => self.neutral += 1,
        }
    }
}

const RECORD_PROMPT: &str = "p = positive, n = negative, w = classify first word, enter = neutral: ";

/// Drives the prompt loop against the classification store
pub struct Resolver<'s, P> {
    store: &'s mut ClassificationStore,
    prompter: P,
}

impl<'s, P: Prompter> Resolver<'s, P> {
    pub fn new(store: &'s mut ClassificationStore, prompter: P) -> Self {
        Self { store, prompter }
    }

    /// Ask the operator about every unresolved candidate, in input order.
    pub fn resolve<'r, I>(&mut self, candidates: I) -> Result<ResolveTally>
    where
        I: IntoIterator<Item = &'r Initiative>,
    {
        let pending: Vec<&'r Initiative> = {
            let classifier = NameClassifier::new(self.store.lexicon(), self.store.manual());
            classifier.unresolved(candidates)
        };
        let total = pending.len();
        let mut tally = ResolveTally::default();

        if total == 0 {
            info!("no unresolved initiatives");
            return Ok(tally);
        }
        info!(count = total, "resolving unclassified initiatives");

        for (index, initiative) in pending.into_iter().enumerate() {
            if self.is_resolved(initiative) {
                debug!(id = initiative.id, "resolved by a word added this session");
                tally.skipped += 1;
                continue;
            }

            self.prompter.say("")?;
            self.prompter.say(&format!(
                "[{}/{}] {}",
                index + 1,
                total,
                initiative.display_name()
            ))?;

            match self.resolve_one(initiative, &mut tally) {
                Ok(connotation) => tally.count(connotation),
                Err(Error::PromptClosed) => {
                    info!(
                        resolved = tally.resolved(),
                        remaining = total - index,
                        "operator input closed, stopping"
                    );
                    tally.interrupted = true;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            positive = tally.positive,
            negative = tally.negative,
            neutral = tally.neutral,
            words_added = tally.words_added,
            "classification session finished"
        );
        Ok(tally)
    }

    fn is_resolved(&self, initiative: &Initiative) -> bool {
        NameClassifier::new(self.store.lexicon(), self.store.manual()).is_resolved(initiative)
    }

    /// Run one record's state machine to `Resolved`.
    fn resolve_one(
        &mut self,
        initiative: &Initiative,
        tally: &mut ResolveTally,
    ) -> Result<Connotation> {
        let mut state = ResolveState::Unresolved;
        loop {
            state = match state {
                ResolveState::Unresolved => ResolveState::AwaitingRecordDecision,
                ResolveState::AwaitingRecordDecision => self.await_record(initiative)?,
                ResolveState::AwaitingWordDecision { word } => {
                    if self.await_word(&word)? {
                        tally.words_added += 1;
                    }
                    ResolveState::AwaitingRecordDecision
                }
                ResolveState::Resolved(connotation) => return Ok(connotation),
            };
        }
    }

    fn await_record(&mut self, initiative: &Initiative) -> Result<ResolveState> {
        let answer = self.prompter.ask(RECORD_PROMPT)?;
        let connotation = match RecordDecision::from(answer.as_str()) {
            RecordDecision::Positive => Connotation::Positive,
            RecordDecision::Negative => Connotation::Negative,
            RecordDecision::Neutral => Connotation::Neutral,
            RecordDecision::ClassifyWord => {
                let word = initiative
                    .name
                    .as_deref()
                    .map(extract_first_word)
                    .unwrap_or_default();
                if word.is_empty() {
                    self.prompter.say("No word to classify.")?;
                    return Ok(ResolveState::AwaitingRecordDecision);
                }
                if self.store.lexicon().contains(&word) {
                    self.prompter
                        .say(&format!("'{}' is already classified.", word))?;
                    return Ok(ResolveState::AwaitingRecordDecision);
                }
                return Ok(ResolveState::AwaitingWordDecision { word });
            }
            RecordDecision::Retry => return Ok(ResolveState::AwaitingRecordDecision),
        };

        self.store.classify_manually(initiative.id, connotation)?;
        Ok(ResolveState::Resolved(connotation))
    }

    /// Returns whether the word was added to the lexicon.
    fn await_word(&mut self, word: &str) -> Result<bool> {
        let answer = self.prompter.ask(&format!(
            "Classify word '{}' (p = positive, n = negative, anything else = ignore): ",
            word
        ))?;
        match WordDecision::from(answer.as_str()) {
            WordDecision::Positive => self.store.add_word(word, Connotation::Positive),
            WordDecision::Negative => self.store.add_word(word, Connotation::Negative),
            WordDecision::Ignore => Ok(false),
        }
    }
}
