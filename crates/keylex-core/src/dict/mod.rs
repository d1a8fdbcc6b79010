//! N-gram dictionaries and their `.fldic` persistence.
//!
//! [`Dictionary`] is the read-only variant loaded from disk and shared
//! across sessions. [`MutableDictionary`] owns a `Dictionary` and adds the
//! write API (insert, remove, score adjustment, persist); the immutable
//! variant carries no mutation surface at all, so "mutating an immutable
//! dictionary" is unrepresentable rather than a runtime error.

mod fldic;
#[cfg(test)]
mod tests;

pub use fldic::{DictionaryHeader, FLDIC_SCHEMA_V0_DRAFT1};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::trie::{NgramProperties, TrieNode, SCORE_MAX};
use crate::unicode;

/// Unified error type for dictionary text I/O.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{}:{line}: {message}", path.display())]
    Serialization {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

#[derive(Debug)]
pub struct Dictionary {
    pub header: DictionaryHeader,
    root_node: TrieNode,
    shortcuts: BTreeMap<String, String>,
    max_unigram_score: u32,
    max_bigram_score: u32,
    max_trigram_score: u32,
    src_path: PathBuf,
    dst_path: PathBuf,
}

impl Dictionary {
    fn new_empty() -> Self {
        Self {
            header: DictionaryHeader::default(),
            root_node: TrieNode::new(),
            shortcuts: BTreeMap::new(),
            max_unigram_score: 0,
            max_bigram_score: 0,
            max_trigram_score: 0,
            src_path: PathBuf::new(),
            dst_path: PathBuf::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        Self::load_with_dst(path, path)
    }

    pub fn load_with_dst(
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
    ) -> Result<Self, DictionaryError> {
        let src_path = src_path.as_ref();
        let file = File::open(src_path)?;
        let mut dict = fldic::read_dictionary(BufReader::new(file), src_path)?;
        dict.src_path = src_path.to_path_buf();
        dict.dst_path = dst_path.as_ref().to_path_buf();
        debug!(path = %src_path.display(), "loaded dictionary");
        Ok(dict)
    }

    pub fn root(&self) -> &TrieNode {
        &self.root_node
    }

    pub fn shortcuts(&self) -> &BTreeMap<String, String> {
        &self.shortcuts
    }

    pub fn max_unigram_score(&self) -> u32 {
        self.max_unigram_score
    }

    pub fn max_bigram_score(&self) -> u32 {
        self.max_bigram_score
    }

    pub fn max_trigram_score(&self) -> u32 {
        self.max_trigram_score
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn dst_path(&self) -> &Path {
        &self.dst_path
    }

    /// Exact unigram membership.
    pub fn contains(&self, word: &str) -> bool {
        self.root_node.resolve(&unicode::segment(word)).is_some()
    }

    /// Properties of the n-gram chain `words` (level 1..=8), if present.
    pub fn ngram_properties(&self, words: &[&str]) -> Option<&NgramProperties> {
        let (first, rest) = words.split_first()?;
        let mut node = self.root_node.resolve(&unicode::segment(first))?;
        for word in rest {
            node = node
                .subsequent_words()?
                .resolve(&unicode::segment(word))?;
        }
        Some(&node.properties)
    }

    /// Visit every unigram with its joined text and properties, in the
    /// deterministic trie walk order.
    pub fn for_each_word<F>(&self, mut action: F)
    where
        F: FnMut(&str, &NgramProperties),
    {
        self.root_node
            .for_each(|key, node| action(&key.concat(), &node.properties));
    }
}

/// Mutable handle to a terminal's properties. Folds the final score into the
/// owning dictionary's per-level maximum when dropped, so the max-score
/// accumulators stay correct however callers mutate the properties.
pub struct PropertiesMut<'a> {
    properties: &'a mut NgramProperties,
    max_score: &'a mut u32,
}

impl Deref for PropertiesMut<'_> {
    type Target = NgramProperties;

    fn deref(&self) -> &NgramProperties {
        self.properties
    }
}

impl DerefMut for PropertiesMut<'_> {
    fn deref_mut(&mut self) -> &mut NgramProperties {
        self.properties
    }
}

impl Drop for PropertiesMut<'_> {
    fn drop(&mut self) {
        *self.max_score = (*self.max_score).max(self.properties.absolute_score);
    }
}

/// Halving kicks in before the 24-bit score field can overflow under
/// long-running incremental learning.
const SCORE_ADJUSTMENT_THRESHOLD: u32 = SCORE_MAX - 128;

pub struct MutableDictionary {
    dict: Dictionary,
}

impl MutableDictionary {
    pub fn new_empty() -> Self {
        Self {
            dict: Dictionary::new_empty(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        Ok(Self {
            dict: Dictionary::load(path)?,
        })
    }

    pub fn load_with_dst(
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
    ) -> Result<Self, DictionaryError> {
        Ok(Self {
            dict: Dictionary::load_with_dst(src_path, dst_path)?,
        })
    }

    /// Open from file, returning an empty dictionary persisting to `path`
    /// if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(dict) => Ok(dict),
            Err(DictionaryError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                let mut dict = Self::new_empty();
                dict.set_dst_path(path);
                Ok(dict)
            }
            Err(e) => Err(e),
        }
    }

    pub fn as_dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.dict
    }

    pub fn set_dst_path(&mut self, path: impl AsRef<Path>) {
        self.dict.dst_path = path.as_ref().to_path_buf();
    }

    /// Insert a unigram and return its properties for post-hoc mutation.
    pub fn insert(&mut self, word1: &str) -> PropertiesMut<'_> {
        let node = self.dict.root_node.insert(&unicode::segment(word1));
        PropertiesMut {
            properties: &mut node.properties,
            max_score: &mut self.dict.max_unigram_score,
        }
    }

    pub fn insert_bigram(&mut self, word1: &str, word2: &str) -> PropertiesMut<'_> {
        let node = self
            .dict
            .root_node
            .insert(&unicode::segment(word1))
            .subsequent_words_or_create()
            .insert(&unicode::segment(word2));
        PropertiesMut {
            properties: &mut node.properties,
            max_score: &mut self.dict.max_bigram_score,
        }
    }

    pub fn insert_trigram(
        &mut self,
        word1: &str,
        word2: &str,
        word3: &str,
    ) -> PropertiesMut<'_> {
        let node = self
            .dict
            .root_node
            .insert(&unicode::segment(word1))
            .subsequent_words_or_create()
            .insert(&unicode::segment(word2))
            .subsequent_words_or_create()
            .insert(&unicode::segment(word3));
        PropertiesMut {
            properties: &mut node.properties,
            max_score: &mut self.dict.max_trigram_score,
        }
    }

    /// Un-mark the unigram terminal. The node's n-gram chains become
    /// unreachable and are dropped on the next persist. No-op when absent.
    pub fn remove(&mut self, word1: &str) {
        if let Some(node) = self.dict.root_node.resolve_mut(&unicode::segment(word1)) {
            node.is_terminal = false;
            node.properties = NgramProperties::default();
        }
    }

    pub fn remove_bigram(&mut self, word1: &str, word2: &str) {
        let Some(node) = self.dict.root_node.resolve_mut(&unicode::segment(word1)) else {
            return;
        };
        let Some(next) = node.subsequent_words_mut() else {
            return;
        };
        if let Some(node) = next.resolve_mut(&unicode::segment(word2)) {
            node.is_terminal = false;
            node.properties = NgramProperties::default();
        }
    }

    pub fn remove_trigram(&mut self, word1: &str, word2: &str, word3: &str) {
        let Some(node) = self.dict.root_node.resolve_mut(&unicode::segment(word1)) else {
            return;
        };
        let Some(next) = node.subsequent_words_mut() else {
            return;
        };
        let Some(node) = next.resolve_mut(&unicode::segment(word2)) else {
            return;
        };
        let Some(next) = node.subsequent_words_mut() else {
            return;
        };
        if let Some(node) = next.resolve_mut(&unicode::segment(word3)) {
            node.is_terminal = false;
            node.properties = NgramProperties::default();
        }
    }

    /// Duplicate keys overwrite.
    pub fn add_shortcut(&mut self, key: impl Into<String>, expansion: impl Into<String>) {
        self.dict.shortcuts.insert(key.into(), expansion.into());
    }

    /// Halve (floor) every score at any n-gram level whose maximum is close
    /// enough to `SCORE_MAX` to overflow soon. Whole-dictionary operation;
    /// `&mut self` guarantees no reader observes a half-adjusted state.
    /// Returns whether any level was adjusted.
    pub fn adjust_scores_if_necessary(&mut self) -> bool {
        let adj_unigrams = self.dict.max_unigram_score > SCORE_ADJUSTMENT_THRESHOLD;
        let adj_bigrams = self.dict.max_bigram_score > SCORE_ADJUSTMENT_THRESHOLD;
        let adj_trigrams = self.dict.max_trigram_score > SCORE_ADJUSTMENT_THRESHOLD;
        if !adj_unigrams && !adj_bigrams && !adj_trigrams {
            return false;
        }

        self.dict.root_node.for_each_terminal_mut(&mut |node1| {
            if adj_unigrams {
                node1.properties.absolute_score /= 2;
            }
            if !adj_bigrams && !adj_trigrams {
                return;
            }
            if let Some(bigrams) = node1.subsequent_words_mut() {
                bigrams.for_each_terminal_mut(&mut |node2| {
                    if adj_bigrams {
                        node2.properties.absolute_score /= 2;
                    }
                    if !adj_trigrams {
                        return;
                    }
                    if let Some(trigrams) = node2.subsequent_words_mut() {
                        trigrams.for_each_terminal_mut(&mut |node3| {
                            node3.properties.absolute_score /= 2;
                        });
                    }
                });
            }
        });

        if adj_unigrams {
            self.dict.max_unigram_score /= 2;
        }
        if adj_bigrams {
            self.dict.max_bigram_score /= 2;
        }
        if adj_trigrams {
            self.dict.max_trigram_score /= 2;
        }
        debug!(adj_unigrams, adj_bigrams, adj_trigrams, "adjusted scores");
        true
    }

    /// Serialize to `dst_path`.
    pub fn persist(&self) -> Result<(), DictionaryError> {
        let file = File::create(&self.dict.dst_path)?;
        let mut writer = BufWriter::new(file);
        fldic::write_dictionary(&mut writer, &self.dict)?;
        writer.flush()?;
        debug!(path = %self.dict.dst_path.display(), "persisted dictionary");
        Ok(())
    }
}

impl Default for MutableDictionary {
    fn default() -> Self {
        Self::new_empty()
    }
}
