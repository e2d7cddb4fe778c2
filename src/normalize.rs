//! Leading-word normalization used for lexicon matching.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn non_letters() -> &'static Regex {
    static NON_LETTERS: OnceLock<Regex> = OnceLock::new();
    NON_LETTERS.get_or_init(|| Regex::new(r"\P{L}").unwrap())
}

/// Lowercase and NFKC-normalize `text`.
///
/// German has no locale-specific lowercase tailoring, so Unicode default case
/// mapping gives the German result (`Ä` → `ä`, `ẞ` → `ß`). The second
/// lowercase pass catches compatibility characters that NFKC folds into
/// uppercase letters (`ℌ` → `H`).
pub fn fold(text: &str) -> String {
    text.to_lowercase().nfkc().collect::<String>().to_lowercase()
}

/// Canonical first word of `text`: folded, first whitespace-separated token,
/// with everything that is not a Unicode letter removed.
pub fn extract_first_word(text: &str) -> String {
    let folded = fold(text);
    match folded.split_whitespace().next() {
        Some(token) => non_letters().replace_all(token, "").into_owned(),
        None => String::new(),
    }
}

/// True if the leading word of `text` starts with any of `words`.
///
/// Prefix matching is intentional so inflected forms match their stem
/// (`für` matches `fürs`). Missing text and empty lexicon entries never match.
pub fn starts_with_word<I, S>(text: Option<&str>, words: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(text) = text else {
        return false;
    };
    let first = extract_first_word(text);
    if first.is_empty() {
        return false;
    }
    words.into_iter().any(|word| {
        let word = word.as_ref();
        !word.is_empty() && first.starts_with(word)
    })
}
