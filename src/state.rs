//! Persisted classification state: the leading-word lexicon and the manual
//! per-initiative overrides.
//!
//! Both artifacts are independent JSON documents. Every mutation is written
//! back immediately as a full document, so an interrupted session loses at
//! most the decision that was in flight.

use crate::error::{Error, Result};
use crate::normalize::extract_first_word;
use crate::types::Connotation;
use chrono::Utc;
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Leading words that decide a name's connotation regardless of the record.
///
/// Entries are kept in the same canonical form as a name's leading word, so
/// hand-written entries like `Für` still match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WordSets")]
pub struct ClassifiedWords {
    pub positive: IndexSet<String>,
    pub negative: IndexSet<String>,
}

#[derive(Deserialize)]
struct WordSets {
    #[serde(default)]
    positive: Vec<String>,
    #[serde(default)]
    negative: Vec<String>,
}

impl From<WordSets> for ClassifiedWords {
    fn from(sets: WordSets) -> Self {
        ClassifiedWords::new(sets.positive, sets.negative)
    }
}

fn canonical_words<I>(words: I) -> IndexSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|word| extract_first_word(word.as_ref()))
        .filter(|word| !word.is_empty())
        .collect()
}

impl ClassifiedWords {
    /// Build a lexicon, canonicalizing every entry and dropping empty ones
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: canonical_words(positive),
            negative: canonical_words(negative),
        }
    }

    /// True if `word` is in either set
    pub fn contains(&self, word: &str) -> bool {
        self.positive.contains(word) || self.negative.contains(word)
    }

    /// Add `word` to the set for `connotation`. Words already known to either
    /// set and neutral connotations are ignored; returns whether it was added.
    pub fn insert(&mut self, word: impl Into<String>, connotation: Connotation) -> bool {
        let word: String = word.into();
        let word = extract_first_word(&word);
        if word.is_empty() || self.contains(&word) {
            return false;
        }
        match connotation {
            Connotation::Positive => self.positive.insert(word),
            Connotation::Negative => self.negative.insert(word),
            Connotation::Neutral => false,
        }
    }

    /// Union of both lexicons, `self` first
    pub fn merged(&self, other: &ClassifiedWords) -> ClassifiedWords {
        ClassifiedWords {
            positive: self.positive.union(&other.positive).cloned().collect(),
            negative: self.negative.union(&other.negative).cloned().collect(),
        }
    }

    /// Words listed as both positive and negative
    pub fn overlaps(&self) -> Vec<&str> {
        self.positive
            .intersection(&self.negative)
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Manual per-initiative overrides keyed by initiative id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClassifications {
    pub positive: IndexSet<i64>,
    pub negative: IndexSet<i64>,
    pub neutral: IndexSet<i64>,
}

impl ManualClassifications {
    pub fn set(&self, connotation: Connotation) -> &IndexSet<i64> {
        match connotation {
            Connotation::Positive => &self.positive,
            Connotation::Negative => &self.negative,
            Connotation::Neutral => &self.neutral,
        }
    }

    fn set_mut(&mut self, connotation: Connotation) -> &mut IndexSet<i64> {
        match connotation {
            Connotation::Positive => &mut self.positive,
            Connotation::Negative => &mut self.negative,
            Connotation::Neutral => &mut self.neutral,
        }
    }

    /// Manual connotation of `id`. If the id sits in several sets the first
    /// of positive, negative, neutral wins.
    pub fn connotation_of(&self, id: i64) -> Option<Connotation> {
        ALL_CONNOTATIONS
            .into_iter()
            .find(|c| self.set(*c).contains(&id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.connotation_of(id).is_some()
    }

    /// Record a manual decision. Re-adding the same decision is a no-op
    /// (`Ok(false)`); adding an id that already carries a different decision
    /// fails.
    pub fn insert(&mut self, id: i64, connotation: Connotation) -> Result<bool> {
        match self.connotation_of(id) {
            Some(existing) if existing == connotation => Ok(false),
            Some(existing) => Err(Error::ConflictingClassification {
                id,
                existing,
                requested: connotation,
            }),
            None => Ok(self.set_mut(connotation).insert(id)),
        }
    }

    /// Ids present in more than one set, with every set they appear in
    pub fn overlaps(&self) -> Vec<(i64, Vec<Connotation>)> {
        let mut ids: IndexSet<i64> = IndexSet::new();
        for c in ALL_CONNOTATIONS {
            ids.extend(self.set(c).iter().copied());
        }
        ids.into_iter()
            .filter_map(|id| {
                let sets: Vec<Connotation> = ALL_CONNOTATIONS
                    .into_iter()
                    .filter(|c| self.set(*c).contains(&id))
                    .collect();
                (sets.len() > 1).then_some((id, sets))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const ALL_CONNOTATIONS: [Connotation; 3] = [
    Connotation::Positive,
    Connotation::Negative,
    Connotation::Neutral,
];

/// Outcome of reading one persisted state document
#[derive(Debug)]
pub enum StateLoad<T> {
    Loaded(T),
    /// No file yet, expected on a first run
    Absent,
    /// The file could not be decoded. Its bytes were copied to `backup`
    /// before the state was reset.
    Corrupt { reason: String, backup: PathBuf },
}

impl<T: Default> StateLoad<T> {
    pub fn into_state(self) -> T {
        match self {
            StateLoad::Loaded(state) => state,
            StateLoad::Absent | StateLoad::Corrupt { .. } => T::default(),
        }
    }
}

/// Read a state document. A file that does not decode is copied aside
/// first; if it cannot be read or copied the load fails, since the next save
/// would overwrite it.
pub fn load_state<T: DeserializeOwned>(path: &Path) -> Result<StateLoad<T>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StateLoad::Absent),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&contents) {
        Ok(state) => Ok(StateLoad::Loaded(state)),
        Err(e) => Ok(StateLoad::Corrupt {
            reason: e.to_string(),
            backup: backup_corrupt(path)?,
        }),
    }
}

fn backup_corrupt(path: &Path) -> Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".corrupt-{}", stamp));
    let backup = PathBuf::from(name);
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Write a state document atomically: temp file in the same directory, then
/// rename over the target.
pub fn save_state<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, state)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Owner of all mutable classification state for a run
#[derive(Debug)]
pub struct ClassificationStore {
    words_path: PathBuf,
    manual_path: PathBuf,
    seed: ClassifiedWords,
    words: ClassifiedWords,
    manual: ManualClassifications,
    lexicon: ClassifiedWords,
}

impl ClassificationStore {
    /// Load both documents. Each load is independent; a missing or corrupt
    /// file yields empty state for that document only. Fails if a file
    /// exists but cannot be read or backed up.
    pub fn open(
        words_path: impl Into<PathBuf>,
        manual_path: impl Into<PathBuf>,
        seed: ClassifiedWords,
    ) -> Result<Self> {
        let words_path = words_path.into();
        let manual_path = manual_path.into();

        let words = match load_state::<ClassifiedWords>(&words_path)? {
            StateLoad::Absent => {
                warn!(path = %words_path.display(), "no classified words yet, starting empty");
                ClassifiedWords::default()
            }
            load => report_load("classified words", &words_path, load),
        };

        let manual = match load_state::<ManualClassifications>(&manual_path)? {
            StateLoad::Absent => {
                info!(path = %manual_path.display(), "no manual classifications yet, starting empty");
                ManualClassifications::default()
            }
            load => report_load("manual classifications", &manual_path, load),
        };

        for (id, sets) in manual.overlaps() {
            warn!(
                id,
                sets = ?sets,
                "initiative has conflicting manual classifications, using {}",
                sets[0]
            );
        }

        let store = Self::from_parts(words_path, manual_path, seed, words, manual);
        for word in store.lexicon.overlaps() {
            warn!(word, "word is listed as both positive and negative, using positive");
        }
        Ok(store)
    }

    /// Build a store from in-memory state without touching the filesystem
    pub fn from_parts(
        words_path: impl Into<PathBuf>,
        manual_path: impl Into<PathBuf>,
        seed: ClassifiedWords,
        words: ClassifiedWords,
        manual: ManualClassifications,
    ) -> Self {
        let lexicon = seed.merged(&words);
        Self {
            words_path: words_path.into(),
            manual_path: manual_path.into(),
            seed,
            words,
            manual,
            lexicon,
        }
    }

    /// Seed words merged with the persisted words
    pub fn lexicon(&self) -> &ClassifiedWords {
        &self.lexicon
    }

    /// Persisted words only
    pub fn words(&self) -> &ClassifiedWords {
        &self.words
    }

    pub fn manual(&self) -> &ManualClassifications {
        &self.manual
    }

    /// Add a lexicon word and persist. Returns whether the word was new.
    pub fn add_word(&mut self, word: &str, connotation: Connotation) -> Result<bool> {
        if self.lexicon.contains(word) || !self.words.insert(word, connotation) {
            return Ok(false);
        }
        self.lexicon = self.seed.merged(&self.words);
        self.save_words()?;
        debug!(word, %connotation, "added word to lexicon");
        Ok(true)
    }

    /// Record a manual decision for an initiative and persist.
    pub fn classify_manually(&mut self, id: i64, connotation: Connotation) -> Result<bool> {
        let added = self.manual.insert(id, connotation)?;
        if added {
            self.save_manual()?;
            debug!(id, %connotation, "stored manual classification");
        }
        Ok(added)
    }

    pub fn save_words(&self) -> Result<()> {
        save_state(&self.words_path, &self.words)
    }

    pub fn save_manual(&self) -> Result<()> {
        save_state(&self.manual_path, &self.manual)
    }
}

fn report_load<T: Default>(what: &str, path: &Path, load: StateLoad<T>) -> T {
    if let StateLoad::Corrupt { reason, backup } = &load {
        warn!(
            path = %path.display(),
            backup = %backup.display(),
            "{} file is corrupt ({}), backed up and starting empty",
            what,
            reason
        );
    }
    load.into_state()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ClassificationStore {
        ClassificationStore::open(
            dir.path().join("words.json"),
            dir.path().join("manual.json"),
            ClassifiedWords::new(["für"], ["gegen"]),
        )
        .unwrap()
    }

    #[test]
    fn test_words_round_trip_collapses_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.json");
        fs::write(
            &path,
            r#"{"positive": ["pro", "erhalt", "pro"], "negative": ["kein", "kein"]}"#,
        )
        .unwrap();

        let words: ClassifiedWords = load_state(&path).unwrap().into_state();
        assert_eq!(words.positive.len(), 2);
        assert_eq!(words.negative.len(), 1);

        save_state(&path, &words).unwrap();
        let reloaded: ClassifiedWords = load_state(&path).unwrap().into_state();
        assert_eq!(reloaded, words);
    }

    #[test]
    fn test_manual_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("manual.json");
        let mut manual = ManualClassifications::default();
        manual.insert(3, Connotation::Positive).unwrap();
        manual.insert(9, Connotation::Neutral).unwrap();
        manual.insert(4, Connotation::Negative).unwrap();

        save_state(&path, &manual).unwrap();
        match load_state::<ManualClassifications>(&path).unwrap() {
            StateLoad::Loaded(loaded) => assert_eq!(loaded, manual),
            other => panic!("expected loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_state() {
        let dir = TempDir::new().unwrap();
        let load = load_state::<ClassifiedWords>(&dir.path().join("missing.json")).unwrap();
        assert!(matches!(load, StateLoad::Absent));
    }

    #[test]
    fn test_corrupt_state_is_backed_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.json");
        fs::write(&path, r#"{"positive": [1, "two"]}"#).unwrap();

        match load_state::<ManualClassifications>(&path).unwrap() {
            StateLoad::Corrupt { backup, .. } => {
                assert_eq!(
                    fs::read_to_string(backup).unwrap(),
                    r#"{"positive": [1, "two"]}"#
                );
            }
            other => panic!("expected corrupt state with backup, got {:?}", other),
        }

        let store = store_in(&dir);
        assert!(store.manual().is_empty());
    }

    #[test]
    fn test_manual_insert_rejects_second_set() {
        let mut manual = ManualClassifications::default();
        assert!(manual.insert(1, Connotation::Positive).unwrap());
        assert!(!manual.insert(1, Connotation::Positive).unwrap());
        let err = manual.insert(1, Connotation::Neutral).unwrap_err();
        assert!(matches!(
            err,
            Error::ConflictingClassification {
                id: 1,
                existing: Connotation::Positive,
                requested: Connotation::Neutral
            }
        ));
    }

    #[test]
    fn test_overlaps_detected() {
        let manual = ManualClassifications {
            positive: [1, 2].into_iter().collect(),
            negative: [2].into_iter().collect(),
            neutral: [3, 2].into_iter().collect(),
        };
        let overlaps = manual.overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].0, 2);
        assert_eq!(overlaps[0].1.len(), 3);
        assert_eq!(manual.connotation_of(2), Some(Connotation::Positive));
    }

    #[test]
    fn test_store_persists_every_mutation() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(store.add_word("erhalt", Connotation::Positive).unwrap());
        // seed words are never duplicated into the persisted lexicon
        assert!(!store.add_word("für", Connotation::Positive).unwrap());
        assert!(store.classify_manually(42, Connotation::Negative).unwrap());

        let reopened = store_in(&dir);
        assert!(reopened.words().positive.contains("erhalt"));
        assert!(!reopened.words().positive.contains("für"));
        assert!(reopened.lexicon().positive.contains("für"));
        assert_eq!(reopened.manual().connotation_of(42), Some(Connotation::Negative));
    }

    #[test]
    fn test_words_and_manual_load_independently() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("words.json"), "not json").unwrap();
        save_state(
            &dir.path().join("manual.json"),
            &ManualClassifications {
                neutral: [7].into_iter().collect(),
                ..Default::default()
            },
        )
        .unwrap();

        let store = store_in(&dir);
        assert!(store.words().is_empty());
        assert_eq!(store.manual().connotation_of(7), Some(Connotation::Neutral));
    }

    #[test]
    fn test_undecodable_bytes_are_backed_up_before_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.json");
        let original = b"{\"positive\":[1,2,3],\"negative\":[\xff],\"neutral\":[]}".to_vec();
        fs::write(&path, &original).unwrap();

        let mut store = store_in(&dir);
        assert!(store.manual().is_empty());
        store.classify_manually(9, Connotation::Neutral).unwrap();

        let backups: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("manual.json.corrupt-"))
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), original);
    }

    #[test]
    fn test_unreadable_state_fails_to_open() {
        let dir = TempDir::new().unwrap();
        // a directory where the words file should be cannot be read
        fs::create_dir(dir.path().join("words.json")).unwrap();
        let result = ClassificationStore::open(
            dir.path().join("words.json"),
            dir.path().join("manual.json"),
            ClassifiedWords::default(),
        );
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_words_are_canonicalized() {
        let words = ClassifiedWords::new(["Für", " Erhalt!", "", "42"], ["GEGEN"]);
        assert_eq!(
            words.positive.iter().map(String::as_str).collect::<Vec<_>>(),
            ["für", "erhalt"]
        );
        assert!(words.negative.contains("gegen"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.json");
        fs::write(&path, r#"{"positive": ["Rettet", "rettet"], "negative": ["Kein"]}"#).unwrap();
        let loaded: ClassifiedWords = load_state(&path).unwrap().into_state();
        assert_eq!(loaded, ClassifiedWords::new(["rettet"], ["kein"]));
    }

    #[test]
    fn test_word_overlaps_detected() {
        let words = ClassifiedWords::new(["für", "pro"], ["Pro", "gegen"]);
        assert_eq!(words.overlaps(), vec!["pro"]);
        assert!(ClassifiedWords::new(["für"], ["gegen"]).overlaps().is_empty());
    }
}
