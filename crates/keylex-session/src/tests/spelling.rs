use keylex_core::dict::MutableDictionary;

use super::*;

#[test]
fn test_word_in_dictionary() {
    let session = make_session(make_base_dict(&[("hello", 1000)]));
    let result = session.spell("hello", &[], &[], default_flags());
    assert_eq!(result.suggestion_attributes, RESULT_ATTR_IN_THE_DICTIONARY);
    assert!(result.suggestions.is_empty());
}

#[test]
fn test_empty_word_is_unspecified() {
    let session = make_session(make_base_dict(&[("hello", 1000)]));
    let result = session.spell("", &[], &[], default_flags());
    assert_eq!(result.suggestion_attributes, RESULT_UNSPECIFIED);
}

#[test]
fn test_no_dictionaries_is_unspecified() {
    let session = DictionarySession::new();
    let result = session.spell("hello", &[], &[], default_flags());
    assert_eq!(result.suggestion_attributes, RESULT_UNSPECIFIED);
}

#[test]
fn test_transposed_word_is_typo_with_suggestion() {
    let session = make_session(make_base_dict(&[("hello", 1000)]));
    let result = session.spell("helol", &[], &[], default_flags());
    assert!(result.looks_like_typo());
    assert_eq!(result.suggestions, vec!["hello"]);
}

#[test]
fn test_offensive_suggestions_filtered_by_default() {
    let mut dict = MutableDictionary::new_empty();
    {
        let mut props = dict.insert("fuck");
        props.absolute_score = 10;
        props.is_possibly_offensive = true;
    }
    dict.insert("duck").absolute_score = 900;
    let session = make_session(std::sync::Arc::new(dict.into_dictionary()));

    let result = session.spell("fck", &[], &[], default_flags());
    assert!(result.looks_like_typo());
    assert!(result.suggestions.iter().any(|s| s == "duck"));
    assert!(result.suggestions.iter().all(|s| s != "fuck"));

    let allowing = SuggestionRequestFlags::with(8, true, false);
    let result = session.spell("fck", &[], &[], allowing);
    assert!(result.suggestions.iter().any(|s| s == "fuck"));
}

#[test]
fn test_case_only_difference_is_typo() {
    let session = make_session(make_base_dict(&[("Hello", 1000)]));

    let result = session.spell("Hello", &[], &[], default_flags());
    assert!(result.is_in_dictionary());

    let result = session.spell("hello", &[], &[], default_flags());
    assert!(result.looks_like_typo());
    assert_eq!(result.suggestions, vec!["Hello"]);
}

#[test]
fn test_hidden_words_do_not_surface() {
    let mut dict = MutableDictionary::new_empty();
    {
        let mut props = dict.insert("hidden");
        props.absolute_score = 500;
        props.is_hidden_by_user = true;
    }
    dict.insert("hinder").absolute_score = 100;
    let session = make_session(std::sync::Arc::new(dict.into_dictionary()));

    let result = session.spell("hiddne", &[], &[], default_flags());
    assert!(result.suggestions.iter().all(|s| s != "hidden"));
}
