mod spelling;

use std::sync::Arc;

use keylex_core::dict::{Dictionary, MutableDictionary};
use keylex_core::proximity::KeyProximityMap;

use super::*;

// Standard QWERTY adjacency, including diagonal neighbors.
const QWERTY_PROXIMITY_JSON: &str = r#"{
    "q": ["w", "a", "s"],
    "w": ["q", "e", "a", "s", "d"],
    "e": ["w", "r", "s", "d", "f"],
    "r": ["e", "t", "d", "f", "g"],
    "t": ["r", "y", "f", "g", "h"],
    "y": ["t", "u", "g", "h", "j"],
    "u": ["y", "i", "h", "j", "k"],
    "i": ["u", "o", "j", "k", "l"],
    "o": ["i", "p", "k", "l"],
    "p": ["o", "l"],
    "a": ["q", "w", "s", "z", "x"],
    "s": ["a", "w", "e", "d", "x", "z"],
    "d": ["s", "e", "r", "f", "c", "x"],
    "f": ["d", "r", "t", "g", "v", "c"],
    "g": ["f", "t", "y", "h", "b", "v"],
    "h": ["g", "y", "u", "j", "n", "b"],
    "j": ["h", "u", "i", "k", "m", "n"],
    "k": ["j", "i", "o", "l", "m"],
    "l": ["k", "o", "p"],
    "z": ["a", "s", "x"],
    "x": ["z", "s", "d", "c"],
    "c": ["x", "d", "f", "v"],
    "v": ["c", "f", "g", "b"],
    "b": ["v", "g", "h", "n"],
    "n": ["b", "h", "j", "m"],
    "m": ["n", "j", "k"]
}"#;

pub(super) fn qwerty_proximity() -> KeyProximityMap {
    KeyProximityMap::from_reader(QWERTY_PROXIMITY_JSON.as_bytes()).unwrap()
}

pub(super) fn make_base_dict(words: &[(&str, u32)]) -> Arc<Dictionary> {
    let mut dict = MutableDictionary::new_empty();
    for (word, score) in words {
        dict.insert(word).absolute_score = *score;
    }
    Arc::new(dict.into_dictionary())
}

pub(super) fn make_session(dict: Arc<Dictionary>) -> DictionarySession {
    let mut session = DictionarySession::new();
    session.add_base_dictionary(dict);
    session.key_proximity_map = qwerty_proximity();
    session
}

pub(super) fn default_flags() -> SuggestionRequestFlags {
    SuggestionRequestFlags::with(8, false, false)
}
