//! Stateful spell checking session composing base and user dictionaries.
//!
//! A [`DictionarySession`] owns the loaded dictionaries and the active
//! key-proximity map and answers `spell` and `suggest` queries. The query
//! path is read-only and infallible: malformed input degrades to empty
//! results, never to an error. Base dictionaries are strictly read-only
//! after load and may be shared across sessions and threads; the user
//! dictionary is exclusive to its session and guarded by a writer lock.

mod ranking;
mod types;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::debug_span;

use keylex_core::dict::{Dictionary, DictionaryError, MutableDictionary};
use keylex_core::fuzzy::{FuzzySearchType, MAX_COST};
use keylex_core::proximity::KeyProximityMap;

pub use keylex_core::request::SuggestionRequestFlags;
pub use types::{
    SpellingResult, SuggestionCandidate, RESULT_ATTR_DONT_SHOW_UI_FOR_SUGGESTIONS,
    RESULT_ATTR_HAS_RECOMMENDED_SUGGESTIONS, RESULT_ATTR_IN_THE_DICTIONARY,
    RESULT_ATTR_LOOKS_LIKE_GRAMMAR_ERROR, RESULT_ATTR_LOOKS_LIKE_TYPO, RESULT_UNSPECIFIED,
    SUGGESTION_CANDIDATE_MAX_CONFIDENCE, SUGGESTION_CANDIDATE_MIN_CONFIDENCE,
};

pub struct DictionarySession {
    base_dictionaries: Vec<Arc<Dictionary>>,
    user_dictionary: Option<RwLock<MutableDictionary>>,
    pub locale_tag: String,
    pub key_proximity_map: KeyProximityMap,
}

impl DictionarySession {
    pub fn new() -> Self {
        Self {
            base_dictionaries: Vec::new(),
            user_dictionary: None,
            locale_tag: String::from("en_us"),
            key_proximity_map: KeyProximityMap::new(),
        }
    }

    /// Append a newly loaded immutable base dictionary.
    pub fn load_base_dictionary(&mut self, path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        let dict = Dictionary::load(path)?;
        self.add_base_dictionary(Arc::new(dict));
        Ok(())
    }

    /// Append an already loaded base dictionary (shared read-only).
    pub fn add_base_dictionary(&mut self, dict: Arc<Dictionary>) {
        self.base_dictionaries.push(dict);
    }

    /// Replace (or set) the session's mutable user dictionary. A missing
    /// file yields a fresh empty dictionary persisting to that path.
    pub fn load_user_dictionary(&mut self, path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        let dict = MutableDictionary::open(path)?;
        self.user_dictionary = Some(RwLock::new(dict));
        Ok(())
    }

    pub fn base_dictionaries(&self) -> &[Arc<Dictionary>] {
        &self.base_dictionaries
    }

    /// The session-owned user dictionary. Whole-dictionary operations such
    /// as `adjust_scores_if_necessary` must run under the write half of
    /// this lock.
    pub fn user_dictionary(&self) -> Option<&RwLock<MutableDictionary>> {
        self.user_dictionary.as_ref()
    }

    /// Check `word` against the primary base dictionary, producing typo
    /// suggestions on a miss. Context words are accepted for future n-gram
    /// conditioning and not yet consumed.
    pub fn spell(
        &self,
        word: &str,
        _prev_words: &[String],
        _next_words: &[String],
        flags: SuggestionRequestFlags,
    ) -> SpellingResult {
        if word.is_empty() {
            return SpellingResult::unspecified();
        }
        let Some(primary) = self.base_dictionaries.first() else {
            return SpellingResult::unspecified();
        };
        if primary.contains(word) {
            return SpellingResult::valid_word();
        }

        let _span = debug_span!("spell", %word).entered();
        let mut results: Vec<SuggestionCandidate> = Vec::new();
        let max_count = flags.max_suggestion_count();
        primary.root().fuzzy_search(
            FuzzySearchType::ProximityWithoutSelf,
            MAX_COST,
            flags,
            &self.key_proximity_map,
            word,
            |text, node, cost| {
                let confidence = confidence_of(node.properties.absolute_score, primary);
                ranking::collect_candidate(&mut results, max_count, text, cost, confidence);
            },
        );

        let suggestions = results.into_iter().map(|c| c.text).collect();
        SpellingResult::typo(suggestions, false)
    }

    /// Populate `results` with ranked correction and completion candidates
    /// for `word`. Context words are accepted and reserved.
    pub fn suggest(
        &self,
        word: &str,
        _prev_words: &[String],
        flags: SuggestionRequestFlags,
        results: &mut Vec<SuggestionCandidate>,
    ) {
        results.clear();
        if word.is_empty() {
            return;
        }
        let Some(primary) = self.base_dictionaries.first() else {
            return;
        };

        let _span = debug_span!("suggest", %word).entered();
        let max_count = flags.max_suggestion_count();
        primary.root().fuzzy_search(
            FuzzySearchType::ProximityOrPrefix,
            MAX_COST,
            flags,
            &self.key_proximity_map,
            word,
            |text, node, cost| {
                let confidence = confidence_of(node.properties.absolute_score, primary);
                ranking::collect_candidate(results, max_count, text, cost, confidence);
            },
        );
    }

    /// Every unigram across all base dictionaries, in traversal order,
    /// deduplicated on first occurrence.
    pub fn list_words(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for dict in &self.base_dictionaries {
            dict.for_each_word(|word, _| {
                if seen.insert(word.to_string()) {
                    words.push(word.to_string());
                }
            });
        }
        words
    }

    /// Normalized unigram frequency in [0.0, 1.0] from the first base
    /// dictionary containing `word`; 0.0 when absent.
    pub fn word_frequency(&self, word: &str) -> f64 {
        for dict in &self.base_dictionaries {
            if let Some(props) = dict.ngram_properties(&[word]) {
                let max_score = dict.max_unigram_score();
                if max_score == 0 {
                    return 0.0;
                }
                return f64::from(props.absolute_score) / f64::from(max_score);
            }
        }
        0.0
    }
}

impl Default for DictionarySession {
    fn default() -> Self {
        Self::new()
    }
}

fn confidence_of(absolute_score: u32, primary: &Dictionary) -> f64 {
    let max_score = primary.max_unigram_score();
    if max_score == 0 {
        return 0.0;
    }
    f64::from(absolute_score) / f64::from(max_score)
}
