//! Localized exercise content and its slicing into levels.
//!
//! Every game draws its items from one ordered list per language. Level `n`
//! uses the five items starting at `(n - 1) * 5`; when a language has fewer
//! items than that, slots wrap around to the start of the list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ProgressError;
use crate::model::{ITEMS_PER_LEVEL, LevelKey, check_item_index};

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zu,
    Af,
    Tn,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Zu, Language::Af, Language::Tn];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zu => "zu",
            Language::Af => "af",
            Language::Tn => "tn",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error type for parsing a language code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLanguageError {
    raw: String,
}

impl fmt::Display for ParseLanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language code: {}", self.raw)
    }
}

impl std::error::Error for ParseLanguageError {}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ParseLanguageError { raw: s.to_owned() })
    }
}

//
// ─── EXERCISE ITEMS ────────────────────────────────────────────────────────────
//

/// Find the word in a passage that matches a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordHuntItem {
    pub passage: String,
    pub prompt: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub distractors: Vec<String>,
}

impl WordHuntItem {
    /// True if the tapped word, stripped of `.,!?`, is an accepted answer.
    #[must_use]
    pub fn accepts(&self, word: &str) -> bool {
        let clean: String = word
            .chars()
            .filter(|c| !matches!(c, '.' | ',' | '!' | '?'))
            .collect();
        self.answers.iter().any(|answer| *answer == clean)
    }
}

/// Sentence rebuilt word by word and then read aloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAloudItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syllables: Option<String>,
}

impl ReadAloudItem {
    /// The sentence split into the word cards shown to the player.
    #[must_use]
    pub fn words(&self) -> Vec<&str> {
        self.text.split(' ').collect()
    }

    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, chosen: &[S]) -> bool {
        let sentence: Vec<&str> = chosen.iter().map(AsRef::as_ref).collect();
        sentence.join(" ") == self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlankItem {
    pub sentence: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FillBlankItem {
    #[must_use]
    pub fn accepts(&self, option: &str) -> bool {
        option == self.answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBuilderItem {
    pub hint: String,
    pub tiles: Vec<String>,
    pub answer: String,
}

impl WordBuilderItem {
    /// True if the placed tiles spell the answer.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, placed: &[S]) -> bool {
        !placed.is_empty() && placed.iter().map(AsRef::as_ref).collect::<String>() == self.answer
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Per-language item lists for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentCatalog<T> {
    by_language: HashMap<Language, Vec<T>>,
}

impl<T> Default for ContentCatalog<T> {
    fn default() -> Self {
        Self {
            by_language: HashMap::new(),
        }
    }
}

impl<T> ContentCatalog<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_language(mut self, language: Language, items: Vec<T>) -> Self {
        self.by_language.insert(language, items);
        self
    }

    /// Items for `language`, falling back to English when the language is missing.
    #[must_use]
    pub fn items(&self, language: Language) -> &[T] {
        self.by_language
            .get(&language)
            .or_else(|| self.by_language.get(&Language::En))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The (up to five) items belonging to `level`.
    #[must_use]
    pub fn level_items(&self, language: Language, level: LevelKey) -> &[T] {
        let items = self.items(language);
        let start = level.index() * ITEMS_PER_LEVEL;
        if start >= items.len() {
            return &[];
        }
        let end = (start + ITEMS_PER_LEVEL).min(items.len());
        &items[start..end]
    }

    /// The item shown in slot `index` of `level`.
    ///
    /// Short levels wrap to `items[index % len]`. Returns `Ok(None)` only when
    /// there is no content at all for the language.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidItemIndex` if `index >= 5`.
    pub fn item(
        &self,
        language: Language,
        level: LevelKey,
        index: usize,
    ) -> Result<Option<&T>, ProgressError> {
        let index = check_item_index(index)?;
        if let Some(item) = self.level_items(language, level).get(index) {
            return Ok(Some(item));
        }
        let items = self.items(language);
        if items.is_empty() {
            return Ok(None);
        }
        Ok(items.get(index % items.len()))
    }
}
