//! Fuzzy trie search.
//!
//! A Damerau–Levenshtein-style walk over a trie: one dynamic-programming
//! row is maintained per trie depth, so descending into a child costs a
//! single row update and the whole candidate set is enumerated without ever
//! being materialized. Substitutions are cheaper for opposite-case graphemes
//! and for keys that are physical neighbors on the active keyboard layout.

use tracing::{debug, debug_span};

use crate::proximity::KeyProximityMap;
use crate::request::SuggestionRequestFlags;
use crate::trie::TrieNode;
use crate::unicode;

pub const MAX_COST: u32 = 6;
pub const COST_IS_EQUAL: u32 = 0;
pub const COST_IS_OPPOSITE_CASE: u32 = 1;
pub const COST_INSERT: u32 = 2;
pub const COST_DELETE: u32 = 2;
pub const COST_SUBSTITUTE_DEFAULT: u32 = 2;
pub const COST_SUBSTITUTE_IN_PROXIMITY: u32 = 1;
pub const COST_TRANSPOSE: u32 = 1;
pub const PENALTY_DEFAULT: u32 = 0;
pub const PENALTY_START_OF_STR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzySearchType {
    /// Report any terminal within the cost bound.
    Proximity,
    /// Like `Proximity`, but never report the query word itself.
    ProximityWithoutSelf,
    /// Like `Proximity`, and prefix completions of the query are welcome
    /// (each extension grapheme pays `COST_INSERT`).
    ProximityOrPrefix,
}

struct FuzzySearchState<'a> {
    search_type: FuzzySearchType,
    max_cost: u32,
    flags: SuggestionRequestFlags,
    proximity: &'a KeyProximityMap,
    /// Query graphemes behind a sentinel at index 0.
    word_chars: Vec<String>,
    /// Same positions, each grapheme case-swapped. Computed once here so
    /// the inner loop is a plain comparison.
    word_chars_opposite_case: Vec<String>,
    prefix_chars: Vec<String>,
    /// DP matrix, row-major by prefix depth.
    distances: Vec<Vec<u32>>,
}

impl<'a> FuzzySearchState<'a> {
    fn new(
        search_type: FuzzySearchType,
        max_cost: u32,
        flags: SuggestionRequestFlags,
        proximity: &'a KeyProximityMap,
        word: &'a str,
    ) -> Self {
        let mut word_chars = vec![String::new()];
        word_chars.extend(unicode::segment(word));
        let word_chars_opposite_case = word_chars
            .iter()
            .map(|g| unicode::swap_case(g))
            .collect();
        let mut state = Self {
            search_type,
            max_cost,
            flags,
            proximity,
            word_chars,
            word_chars_opposite_case,
            prefix_chars: Vec::new(),
            distances: Vec::new(),
        };
        state.set_prefix_grapheme_at(0, "");
        state
    }

    fn ensure_capacity_for(&mut self, prefix_index: usize) {
        while self.prefix_chars.len() <= prefix_index {
            self.prefix_chars.push(String::new());
        }
        while self.distances.len() <= prefix_index {
            self.distances.push(vec![0; self.word_chars.len()]);
        }
    }

    fn set_prefix_grapheme_at(&mut self, prefix_index: usize, grapheme: &str) {
        self.ensure_capacity_for(prefix_index);
        self.prefix_chars[prefix_index] = grapheme.to_string();

        if prefix_index == 0 {
            for i in 0..self.word_chars.len() {
                self.distances[0][i] = i as u32 * COST_INSERT;
            }
            return;
        }

        self.distances[prefix_index][0] = prefix_index as u32 * COST_INSERT;
        for i in 1..self.word_chars.len() {
            let penalty = if prefix_index == 1 && i == 1 {
                PENALTY_START_OF_STR
            } else {
                PENALTY_DEFAULT
            };

            let substitution_cost = if self.word_chars[i] == grapheme {
                COST_IS_EQUAL
            } else if self.word_chars_opposite_case[i] == grapheme {
                // no position penalty for a mere case flip
                COST_IS_OPPOSITE_CASE
            } else if self.proximity.is_in_proximity(grapheme, &self.word_chars[i]) {
                COST_SUBSTITUTE_IN_PROXIMITY + penalty
            } else {
                COST_SUBSTITUTE_DEFAULT + penalty
            };

            let mut cost = (self.distances[prefix_index - 1][i] + COST_INSERT)
                .min(self.distances[prefix_index][i - 1] + COST_DELETE)
                .min(self.distances[prefix_index - 1][i - 1] + substitution_cost);

            // Adjacent swap: reach back two cells so a single transposition
            // costs COST_TRANSPOSE in total rather than a substitution pair.
            if prefix_index > 1
                && i > 1
                && self.prefix_chars[prefix_index - 1] == self.word_chars[i]
                && grapheme == self.word_chars[i - 1]
            {
                cost = cost
                    .min(self.distances[prefix_index - 2][i - 2] + COST_TRANSPOSE + penalty);
            }

            self.distances[prefix_index][i] = cost;
        }
    }

    /// Distance from the prefix at this depth to the full query.
    fn edit_distance_at(&self, prefix_index: usize) -> u32 {
        self.distances[prefix_index][self.word_chars.len() - 1]
    }

    fn prefix_str_at(&self, prefix_index: usize) -> String {
        self.prefix_chars[1..=prefix_index].concat()
    }

    /// A branch is abandoned once its cost provably exceeds the bound:
    /// while the prefix is shorter than the query the diagonal cell is the
    /// relevant lower bound, afterwards the full-query distance is.
    ///
    /// The comparison is strict. A prefix may sit exactly at the bound and
    /// still recover (matching tail graphemes pull the full-query distance
    /// back down), so killing branches at equality loses valid candidates.
    fn is_dead_end_at(&self, prefix_index: usize) -> bool {
        if prefix_index + 1 < self.word_chars.len() {
            self.distances[prefix_index][prefix_index] > self.max_cost
        } else {
            self.edit_distance_at(prefix_index) > self.max_cost
        }
    }

    fn is_exact_query_at(&self, prefix_index: usize) -> bool {
        prefix_index + 1 == self.word_chars.len()
            && self.prefix_chars[1..=prefix_index] == self.word_chars[1..]
    }
}

fn search_recursive<F>(
    node: &TrieNode,
    state: &mut FuzzySearchState<'_>,
    prefix_index: usize,
    on_result: &mut F,
) where
    F: FnMut(&str, &TrieNode, u32),
{
    let cost = state.edit_distance_at(prefix_index);
    if node.is_terminal && cost <= state.max_cost {
        let suppressed = node.properties.is_hidden_by_user
            || (node.properties.is_possibly_offensive
                && !state.flags.allow_possibly_offensive())
            || (state.search_type == FuzzySearchType::ProximityWithoutSelf
                && state.is_exact_query_at(prefix_index))
            || prefix_index == 0;
        if !suppressed {
            let prefix = state.prefix_str_at(prefix_index);
            on_result(&prefix, node, cost);
        }
    }

    if state.is_dead_end_at(prefix_index) {
        return;
    }

    for (grapheme, child) in node.children() {
        state.set_prefix_grapheme_at(prefix_index + 1, grapheme);
        search_recursive(child, state, prefix_index + 1, on_result);
    }
}

impl TrieNode {
    /// Enumerate all stored words within `max_cost` of `word`, invoking
    /// `on_result` with the word, its terminal node, and the traversal cost.
    /// Emission order follows the trie walk: ascending grapheme key at every
    /// node. An empty query yields nothing.
    pub fn fuzzy_search<F>(
        &self,
        search_type: FuzzySearchType,
        max_cost: u32,
        flags: SuggestionRequestFlags,
        proximity: &KeyProximityMap,
        word: &str,
        mut on_result: F,
    ) where
        F: FnMut(&str, &TrieNode, u32),
    {
        if word.is_empty() {
            return;
        }
        let _span = debug_span!("fuzzy_search", %word, max_cost).entered();

        let mut state = FuzzySearchState::new(search_type, max_cost, flags, proximity, word);
        let mut emitted = 0usize;
        search_recursive(self, &mut state, 0, &mut |text, node, cost| {
            emitted += 1;
            on_result(text, node, cost);
        });
        debug!(emitted, "fuzzy search finished");
    }
}
