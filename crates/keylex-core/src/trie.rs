//! Grapheme-keyed prefix tree with nested n-gram tries.
//!
//! Every terminal node carries [`NgramProperties`] and may own a
//! *subsequent-words* trie: a full child trie whose terminals name the next
//! word in an n-gram chain rooted at this terminal. The structure is a strict
//! tree of trees; each node exclusively owns its children and its
//! subsequent-words trie.

use std::collections::BTreeMap;

/// Scores use 24 bits so the properties of a terminal pack into one word
/// on the serialized side.
pub const SCORE_MAX: u32 = 0x00FF_FFFF;
pub const SCORE_MIN: u32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NgramProperties {
    pub absolute_score: u32,
    pub is_possibly_offensive: bool,
    pub is_hidden_by_user: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct TrieNode {
    pub properties: NgramProperties,
    pub is_terminal: bool,
    children: BTreeMap<String, TrieNode>,
    subsequent_words: Option<Box<TrieNode>>,
}

/// The serialization format uses TAB and LF as structure, so keys whose
/// first byte is a control byte are invisible to [`TrieNode::for_each`].
pub(crate) fn starts_with_ctrl_byte(grapheme: &str) -> bool {
    matches!(grapheme.bytes().next(), Some(b) if b < 0x20)
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk (and create) child nodes along `key`, mark the last node
    /// terminal, and return it. Idempotent, except that the returned node
    /// keeps any preexisting properties.
    pub fn insert(&mut self, key: &[String]) -> &mut TrieNode {
        let mut node = self;
        for grapheme in key {
            node = node.children.entry(grapheme.clone()).or_default();
        }
        node.is_terminal = true;
        node
    }

    /// Resolve `key` to its terminal node, if present.
    pub fn resolve(&self, key: &[String]) -> Option<&TrieNode> {
        let mut node = self;
        for grapheme in key {
            node = node.children.get(grapheme.as_str())?;
        }
        node.is_terminal.then_some(node)
    }

    pub fn resolve_mut(&mut self, key: &[String]) -> Option<&mut TrieNode> {
        let mut node = self;
        for grapheme in key {
            node = node.children.get_mut(grapheme.as_str())?;
        }
        node.is_terminal.then_some(node)
    }

    /// Children in ascending grapheme order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &TrieNode)> {
        self.children.iter().map(|(g, n)| (g.as_str(), n))
    }

    pub fn subsequent_words(&self) -> Option<&TrieNode> {
        self.subsequent_words.as_deref()
    }

    pub fn subsequent_words_mut(&mut self) -> Option<&mut TrieNode> {
        self.subsequent_words.as_deref_mut()
    }

    /// Lazily allocate and return the nested next-word trie.
    pub fn subsequent_words_or_create(&mut self) -> &mut TrieNode {
        self.subsequent_words.get_or_insert_with(Default::default)
    }

    /// Deterministic pre-order walk invoking `action` for every terminal
    /// with the accumulated grapheme key. Children are visited in ascending
    /// key order; children keyed by a control byte are skipped.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&[String], &TrieNode),
    {
        let mut prefix = Vec::new();
        self.for_each_inner(&mut prefix, &mut action);
    }

    fn for_each_inner<F>(&self, prefix: &mut Vec<String>, action: &mut F)
    where
        F: FnMut(&[String], &TrieNode),
    {
        if self.is_terminal {
            action(prefix, self);
        }
        for (grapheme, child) in &self.children {
            if starts_with_ctrl_byte(grapheme) {
                continue;
            }
            prefix.push(grapheme.clone());
            child.for_each_inner(prefix, action);
            prefix.pop();
        }
    }

    /// Mutable walk over every terminal node of this trie (this n-gram
    /// level only; subsequent-words tries are not entered).
    pub(crate) fn for_each_terminal_mut<F>(&mut self, action: &mut F)
    where
        F: FnMut(&mut TrieNode),
    {
        if self.is_terminal {
            action(self);
        }
        for child in self.children.values_mut() {
            child.for_each_terminal_mut(action);
        }
    }
}
