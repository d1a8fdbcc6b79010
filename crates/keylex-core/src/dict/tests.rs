use std::io::BufReader;
use std::path::Path;

use super::fldic::read_dictionary;
use super::*;
use crate::trie::SCORE_MAX;

fn read_str(input: &str) -> Result<Dictionary, DictionaryError> {
    read_dictionary(BufReader::new(input.as_bytes()), Path::new("test.fldic"))
}

fn sample_dictionary() -> MutableDictionary {
    let mut dict = MutableDictionary::new_empty();
    dict.dict.header.name = String::from("words_en");
    dict.dict.header.locales = vec![String::from("en-US")];
    dict.dict.header.generated_by = String::from("keylex test");
    dict.insert("hello").absolute_score = 1000;
    dict.insert("help").absolute_score = 500;
    dict.insert("helm").absolute_score = 200;
    dict.insert("damn").is_possibly_offensive = true;
    dict.insert("secret").is_hidden_by_user = true;
    dict.insert_bigram("hello", "world").absolute_score = 30;
    dict.insert_trigram("hello", "world", "again").absolute_score = 5;
    dict
}

#[test]
fn test_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.fldic");

    let mut dict = sample_dictionary();
    dict.set_dst_path(&path);
    dict.persist().unwrap();

    let reloaded = Dictionary::load(&path).unwrap();
    assert_eq!(reloaded.header, dict.as_dictionary().header);
    assert_eq!(reloaded.root(), dict.as_dictionary().root());
    assert_eq!(
        reloaded.max_unigram_score(),
        dict.as_dictionary().max_unigram_score()
    );
    assert_eq!(
        reloaded.max_bigram_score(),
        dict.as_dictionary().max_bigram_score()
    );
    assert_eq!(
        reloaded.max_trigram_score(),
        dict.as_dictionary().max_trigram_score()
    );

    // serialize -> deserialize -> serialize is byte-identical
    let mut first = Vec::new();
    fldic::write_dictionary(&mut first, dict.as_dictionary()).unwrap();
    let mut second = Vec::new();
    fldic::write_dictionary(&mut second, &reloaded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_round_trip_unicode_words() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unicode.fldic");

    let mut dict = MutableDictionary::new_empty();
    dict.insert("año").absolute_score = 10;
    dict.insert("cafe\u{301}").absolute_score = 20;
    dict.set_dst_path(&path);
    dict.persist().unwrap();

    let reloaded = Dictionary::load(&path).unwrap();
    assert!(reloaded.contains("año"));
    assert!(reloaded.contains("cafe\u{301}"));
    assert_eq!(reloaded.root(), dict.as_dictionary().root());
}

#[test]
fn test_serialized_output_shape() {
    let mut dict = MutableDictionary::new_empty();
    dict.dict.header.name = String::from("tiny");
    dict.insert("b").absolute_score = 2;
    dict.insert("a").absolute_score = 1;
    dict.insert("damn").is_possibly_offensive = true;
    dict.insert_bigram("a", "b").absolute_score = 3;

    let mut out = Vec::new();
    fldic::write_dictionary(&mut out, dict.as_dictionary()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        format!(
            "schema={FLDIC_SCHEMA_V0_DRAFT1}\n\
             name=tiny\n\
             generated_by=\n\
             \n\
             [words]\n\
             a\t1\n\
             \tb\t3\n\
             b\t2\n\
             damn\t0\to\n"
        )
    );
}

#[test]
fn test_deserialize_header_defaults_and_unknown_keys() {
    let dict = read_str(
        "name=test\nfancy_future_key=whatever\n\n[words]\nword\t5\n",
    )
    .unwrap();
    assert_eq!(dict.header.schema, FLDIC_SCHEMA_V0_DRAFT1);
    assert_eq!(dict.header.name, "test");
    assert!(dict.header.locales.is_empty());
    assert!(dict.contains("word"));
}

#[test]
fn test_deserialize_locales_list() {
    let dict = read_str("locales=en-US, en-GB\n\n[words]\n").unwrap();
    assert_eq!(dict.header.locales, vec!["en-US", "en-GB"]);
}

#[test]
fn test_deserialize_skips_unknown_sections() {
    let dict = read_str(
        "name=t\n\n[wishlist]\nignored\t1\n[words]\nkept\t1\n[shortcuts]\nalso\tignored\n",
    )
    .unwrap();
    assert!(dict.contains("kept"));
    assert!(!dict.contains("ignored"));
    assert!(!dict.contains("also"));
}

#[test]
fn test_deserialize_ngram_levels() {
    let dict = read_str(
        "\n[words]\nhello\t100\n\tworld\t10\n\t\tagain\t2\nhelp\t50\n",
    )
    .unwrap();
    assert_eq!(dict.ngram_properties(&["hello"]).unwrap().absolute_score, 100);
    assert_eq!(
        dict.ngram_properties(&["hello", "world"]).unwrap().absolute_score,
        10
    );
    assert_eq!(
        dict.ngram_properties(&["hello", "world", "again"])
            .unwrap()
            .absolute_score,
        2
    );
    assert_eq!(dict.ngram_properties(&["help"]).unwrap().absolute_score, 50);
    assert!(dict.ngram_properties(&["help", "world"]).is_none());
    assert_eq!(dict.max_unigram_score(), 100);
    assert_eq!(dict.max_bigram_score(), 10);
    assert_eq!(dict.max_trigram_score(), 2);
}

#[test]
fn test_deserialize_flags() {
    let dict = read_str("\n[words]\ncrap\t9\toh\n").unwrap();
    let props = dict.ngram_properties(&["crap"]).unwrap();
    assert!(props.is_possibly_offensive);
    assert!(props.is_hidden_by_user);
    assert_eq!(props.absolute_score, 9);
}

#[test]
fn test_deserialize_rejects_level_jump() {
    let err = read_str("\n[words]\nhello\t1\n\t\tskip\t1\n").unwrap_err();
    assert!(matches!(
        err,
        DictionaryError::Serialization { line: 4, .. }
    ));
}

#[test]
fn test_deserialize_rejects_orphan_ngram() {
    let err = read_str("\n[words]\n\torphan\t1\n").unwrap_err();
    assert!(matches!(err, DictionaryError::Serialization { .. }));
}

#[test]
fn test_deserialize_rejects_level_past_cap() {
    let mut input = String::from("\n[words]\n");
    for level in 1..=9usize {
        input.push_str(&"\t".repeat(level - 1));
        input.push_str(&format!("w{level}\t1\n"));
    }
    let err = read_str(&input).unwrap_err();
    assert!(matches!(err, DictionaryError::Serialization { .. }));
}

#[test]
fn test_deserialize_rejects_malformed_score() {
    let err = read_str("\n[words]\nword\tmany\n").unwrap_err();
    assert!(matches!(err, DictionaryError::Serialization { .. }));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let err = Dictionary::load("/nonexistent/missing.fldic").unwrap_err();
    assert!(matches!(err, DictionaryError::Io(_)));
}

#[test]
fn test_open_missing_file_creates_empty_mutable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.fldic");
    let mut dict = MutableDictionary::open(&path).unwrap();
    dict.insert("mine").absolute_score = 1;
    dict.persist().unwrap();
    assert!(Dictionary::load(&path).unwrap().contains("mine"));
}

#[test]
fn test_max_scores_track_posthoc_mutation() {
    let mut dict = MutableDictionary::new_empty();
    dict.insert("a").absolute_score = 10;
    assert_eq!(dict.as_dictionary().max_unigram_score(), 10);

    // post-hoc increments through the returned handle are folded in
    let mut props = dict.insert("b");
    props.absolute_score += 25;
    drop(props);
    assert_eq!(dict.as_dictionary().max_unigram_score(), 25);

    dict.insert_bigram("a", "b").absolute_score = 7;
    assert_eq!(dict.as_dictionary().max_bigram_score(), 7);
    assert_eq!(dict.as_dictionary().max_unigram_score(), 25);
}

#[test]
fn test_remove_clears_terminal() {
    let mut dict = MutableDictionary::new_empty();
    dict.insert("keep").absolute_score = 1;
    dict.insert("drop").absolute_score = 2;
    dict.insert_bigram("keep", "going").absolute_score = 3;
    dict.insert_trigram("keep", "going", "strong").absolute_score = 4;

    dict.remove("drop");
    assert!(!dict.as_dictionary().contains("drop"));
    assert!(dict.as_dictionary().contains("keep"));

    dict.remove_trigram("keep", "going", "strong");
    assert!(dict
        .as_dictionary()
        .ngram_properties(&["keep", "going", "strong"])
        .is_none());

    dict.remove_bigram("keep", "going");
    assert!(dict.as_dictionary().ngram_properties(&["keep", "going"]).is_none());

    // removing something absent is a no-op
    dict.remove("never-there");
    assert!(dict.as_dictionary().contains("keep"));
}

#[test]
fn test_removed_ngrams_are_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("removed.fldic");

    let mut dict = MutableDictionary::new_empty();
    dict.insert("keep").absolute_score = 1;
    dict.insert("drop").absolute_score = 2;
    dict.insert_bigram("drop", "chain").absolute_score = 3;
    dict.remove("drop");
    dict.set_dst_path(&path);
    dict.persist().unwrap();

    let reloaded = Dictionary::load(&path).unwrap();
    assert!(reloaded.contains("keep"));
    assert!(!reloaded.contains("drop"));
    assert!(reloaded.ngram_properties(&["drop", "chain"]).is_none());
}

#[test]
fn test_shortcuts_overwrite_on_duplicate_key() {
    let mut dict = MutableDictionary::new_empty();
    dict.add_shortcut("brb", "be right back");
    dict.add_shortcut("brb", "bathroom break");
    assert_eq!(
        dict.as_dictionary().shortcuts().get("brb").map(String::as_str),
        Some("bathroom break")
    );
}

#[test]
fn test_load_with_dst_separates_paths() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("base.fldic");
    let dst = dir.path().join("copy.fldic");

    let mut dict = MutableDictionary::new_empty();
    dict.insert("word").absolute_score = 1;
    dict.set_dst_path(&src);
    dict.persist().unwrap();

    let mut copy = MutableDictionary::load_with_dst(&src, &dst).unwrap();
    assert_eq!(copy.as_dictionary().src_path(), src);
    assert_eq!(copy.as_dictionary().dst_path(), dst);
    copy.insert("extra").absolute_score = 2;
    copy.persist().unwrap();

    // the source file is untouched
    assert!(!Dictionary::load(&src).unwrap().contains("extra"));
    assert!(Dictionary::load(&dst).unwrap().contains("extra"));
}

#[test]
fn test_adjust_scores_halves_overflowing_level() {
    let mut dict = MutableDictionary::new_empty();
    dict.insert("big").absolute_score = SCORE_MAX - 10;
    dict.insert("small").absolute_score = 100;
    dict.insert_bigram("big", "small").absolute_score = 40;

    assert!(dict.adjust_scores_if_necessary());
    assert_eq!(
        dict.as_dictionary().ngram_properties(&["big"]).unwrap().absolute_score,
        (SCORE_MAX - 10) / 2
    );
    assert_eq!(
        dict.as_dictionary().ngram_properties(&["small"]).unwrap().absolute_score,
        50
    );
    // bigram level was not over the threshold
    assert_eq!(
        dict.as_dictionary()
            .ngram_properties(&["big", "small"])
            .unwrap()
            .absolute_score,
        40
    );
    assert_eq!(dict.as_dictionary().max_unigram_score(), (SCORE_MAX - 10) / 2);
    assert_eq!(dict.as_dictionary().max_bigram_score(), 40);

    // already back under the threshold
    assert!(!dict.adjust_scores_if_necessary());
}

#[test]
fn test_for_each_word_order() {
    let dict = sample_dictionary();
    let mut words = Vec::new();
    dict.as_dictionary().for_each_word(|word, _| words.push(word.to_string()));
    assert_eq!(words, vec!["damn", "hello", "helm", "help", "secret"]);
}
