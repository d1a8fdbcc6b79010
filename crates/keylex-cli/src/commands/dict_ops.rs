//! One-shot dictionary inspection and query commands.

use keylex_core::dict::Dictionary;
use keylex_core::proximity::KeyProximityMap;
use keylex_core::trie::TrieNode;
use keylex_session::{DictionarySession, SuggestionRequestFlags};

fn count_ngrams(node: &TrieNode, counts: &mut Vec<u64>, level: usize) {
    if counts.len() <= level {
        counts.resize(level + 1, 0);
    }
    node.for_each(|_, terminal| {
        counts[level] += 1;
        if let Some(subsequent) = terminal.subsequent_words() {
            count_ngrams(subsequent, counts, level + 1);
        }
    });
}

pub fn info(dict_file: &str) -> i32 {
    let dict = match Dictionary::load(dict_file) {
        Ok(dict) => dict,
        Err(error) => {
            eprintln!("Fatal: {error}");
            return 1;
        }
    };

    println!("schema:       {}", dict.header.schema);
    println!("name:         {}", dict.header.name);
    println!("locales:      {}", dict.header.locales.join(","));
    println!("generated_by: {}", dict.header.generated_by);
    let mut counts = Vec::new();
    count_ngrams(dict.root(), &mut counts, 0);
    for (level, count) in counts.iter().enumerate() {
        println!("{}-grams:      {count}", level + 1);
    }
    println!(
        "max scores:   {} / {} / {}",
        dict.max_unigram_score(),
        dict.max_bigram_score(),
        dict.max_trigram_score()
    );
    0
}

pub fn lookup(dict_file: &str, words: &[String]) -> i32 {
    let dict = match Dictionary::load(dict_file) {
        Ok(dict) => dict,
        Err(error) => {
            eprintln!("Fatal: {error}");
            return 1;
        }
    };

    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    match dict.ngram_properties(&words) {
        Some(properties) => {
            println!("score:                 {}", properties.absolute_score);
            println!("is_possibly_offensive: {}", properties.is_possibly_offensive);
            println!("is_hidden_by_user:     {}", properties.is_hidden_by_user);
            0
        }
        None => {
            println!("n-gram not found");
            0
        }
    }
}

fn make_session(dict_file: &str, proximity_file: Option<&str>) -> Result<DictionarySession, i32> {
    let mut session = DictionarySession::new();
    if let Err(error) = session.load_base_dictionary(dict_file) {
        eprintln!("Fatal: {error}");
        return Err(1);
    }
    if let Some(path) = proximity_file {
        match KeyProximityMap::load_from_file(path) {
            Ok(map) => session.key_proximity_map = map,
            Err(error) => {
                eprintln!("Fatal: {error}");
                return Err(1);
            }
        }
    }
    Ok(session)
}

pub fn spell(
    dict_file: &str,
    word: &str,
    max_suggestion_count: u8,
    allow_possibly_offensive: bool,
    proximity_file: Option<&str>,
) -> i32 {
    let session = match make_session(dict_file, proximity_file) {
        Ok(session) => session,
        Err(code) => return code,
    };
    let flags = SuggestionRequestFlags::with(max_suggestion_count, allow_possibly_offensive, false);
    let result = session.spell(word, &[], &[], flags);

    if result.is_in_dictionary() {
        println!("\"{word}\" is in the dictionary");
    } else if result.looks_like_typo() {
        println!("\"{word}\" looks like a typo");
        for suggestion in &result.suggestions {
            println!("  {suggestion}");
        }
    } else {
        println!("no result for \"{word}\"");
    }
    0
}

pub fn suggest(
    dict_file: &str,
    word: &str,
    max_suggestion_count: u8,
    allow_possibly_offensive: bool,
    proximity_file: Option<&str>,
) -> i32 {
    let session = match make_session(dict_file, proximity_file) {
        Ok(session) => session,
        Err(code) => return code,
    };
    let flags = SuggestionRequestFlags::with(max_suggestion_count, allow_possibly_offensive, false);
    let mut results = Vec::new();
    session.suggest(word, &[], flags, &mut results);

    for candidate in &results {
        println!(
            "{}\t(distance {}, confidence {:.3})",
            candidate.text, candidate.edit_distance, candidate.confidence
        );
    }
    0
}
