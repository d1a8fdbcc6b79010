pub mod dict_ops;
pub mod googlengram;
pub mod wiktextract;
pub mod wordlist;

/// Dictionary words consist of alphabetic graphemes plus apostrophe and
/// hyphen; everything else is dropped by the preprocessors.
pub(crate) fn validate_word(word: &str) -> bool {
    word.chars()
        .all(|cp| cp.is_alphabetic() || cp == '\'' || cp == '-')
}
