//! The `.fldic` text format: UTF-8, LF-terminated lines, a `key=value`
//! header block, then a `[words]` section whose leading TAB count encodes
//! the n-gram level (1..=8).

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::trie::{starts_with_ctrl_byte, NgramProperties, TrieNode};
use crate::unicode;

use super::{Dictionary, DictionaryError};

// The schema URL doubles as a format version string; recognizing other
// schemas is how future revisions slot in.
pub const FLDIC_SCHEMA_V0_DRAFT1: &str =
    "https://florisboard.org/schemas/fldic/v0~draft1/dictionary.txt";

const FLDIC_ASSIGNMENT: char = '=';
const FLDIC_LIST_SEPARATOR: &str = ",";
const FLDIC_SEPARATOR: char = '\t';

const FLDIC_HEADER_SCHEMA: &str = "schema";
const FLDIC_HEADER_NAME: &str = "name";
const FLDIC_HEADER_LOCALES: &str = "locales";
const FLDIC_HEADER_GENERATED_BY: &str = "generated_by";

const FLDIC_SECTION_WORDS: &str = "[words]";

const FLDIC_FLAG_IS_POSSIBLY_OFFENSIVE: char = 'o';
const FLDIC_FLAG_IS_HIDDEN_BY_USER: char = 'h';

const FLDIC_MAX_NGRAM_LEVEL: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryHeader {
    pub schema: String,
    pub name: String,
    /// BCP 47 tags, serialized comma-separated.
    pub locales: Vec<String>,
    pub generated_by: String,
}

impl Default for DictionaryHeader {
    fn default() -> Self {
        Self {
            schema: FLDIC_SCHEMA_V0_DRAFT1.to_string(),
            name: String::new(),
            locales: Vec::new(),
            generated_by: String::new(),
        }
    }
}

impl DictionaryHeader {
    /// Consume `key=value` lines until the first blank line. Unknown keys
    /// and lines without an assignment are ignored. Returns the number of
    /// lines read.
    fn read_from<R: BufRead>(&mut self, reader: &mut R) -> io::Result<usize> {
        let mut line_count = 0;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_count += 1;
            let trimmed = unicode::trim(&line);
            if trimmed.is_empty() {
                break;
            }
            let Some((key, value)) = trimmed.split_once(FLDIC_ASSIGNMENT) else {
                continue;
            };
            let key = unicode::trim(key);
            let value = unicode::trim(value);
            if value.is_empty() {
                continue;
            }
            match key {
                FLDIC_HEADER_SCHEMA => self.schema = value.to_string(),
                FLDIC_HEADER_NAME => self.name = value.to_string(),
                FLDIC_HEADER_LOCALES => {
                    self.locales = unicode::split(value, FLDIC_LIST_SEPARATOR)
                        .into_iter()
                        .map(unicode::trim)
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                FLDIC_HEADER_GENERATED_BY => self.generated_by = value.to_string(),
                _ => {} // tolerate unknown header keys
            }
        }
        Ok(line_count)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{FLDIC_HEADER_SCHEMA}{FLDIC_ASSIGNMENT}{}", self.schema)?;
        writeln!(writer, "{FLDIC_HEADER_NAME}{FLDIC_ASSIGNMENT}{}", self.name)?;
        if !self.locales.is_empty() {
            writeln!(
                writer,
                "{FLDIC_HEADER_LOCALES}{FLDIC_ASSIGNMENT}{}",
                self.locales.join(FLDIC_LIST_SEPARATOR)
            )?;
        }
        writeln!(
            writer,
            "{FLDIC_HEADER_GENERATED_BY}{FLDIC_ASSIGNMENT}{}",
            self.generated_by
        )?;
        writeln!(writer)?;
        Ok(())
    }
}

fn serialization_error(path: &Path, line: usize, message: impl Into<String>) -> DictionaryError {
    DictionaryError::Serialization {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

pub(super) fn read_dictionary<R: BufRead>(
    mut reader: R,
    path: &Path,
) -> Result<Dictionary, DictionaryError> {
    let mut dict = Dictionary::new_empty();
    let mut line_num = dict.header.read_from(&mut reader)?;

    // Word chains of the enclosing levels; entry L-1 is the parent chain of
    // a level-L line. Re-walking the trie per line sidesteps holding one
    // mutable parent reference per level.
    let mut level_words: Vec<Vec<String>> = Vec::new();
    let mut in_words_section = true;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_num += 1;
        let content = line.strip_suffix('\n').unwrap_or(&line);
        if content.is_empty() {
            continue;
        }
        if content.starts_with('[') {
            in_words_section = unicode::trim(content) == FLDIC_SECTION_WORDS;
            continue;
        }
        if !in_words_section {
            continue; // tolerate unknown sections
        }

        let tabs = content.bytes().take_while(|b| *b == b'\t').count();
        let level = tabs + 1;
        if level > FLDIC_MAX_NGRAM_LEVEL {
            return Err(serialization_error(
                path,
                line_num,
                format!("cannot process n-gram levels greater than {FLDIC_MAX_NGRAM_LEVEL}"),
            ));
        }
        if level > level_words.len() + 1 {
            return Err(serialization_error(
                path,
                line_num,
                "n-gram line without a corresponding parent",
            ));
        }

        let mut parts = content[tabs..].split(FLDIC_SEPARATOR);
        let word = unicode::trim(parts.next().unwrap_or(""));
        let Some(score_part) = parts.next() else {
            continue;
        };
        if word.is_empty() {
            continue;
        }
        let score: u32 = unicode::trim(score_part)
            .parse()
            .map_err(|_| serialization_error(path, line_num, "malformed score"))?;

        let mut properties = NgramProperties {
            absolute_score: score,
            ..Default::default()
        };
        if let Some(flags_part) = parts.next() {
            for flag in unicode::trim(flags_part).chars() {
                match flag {
                    FLDIC_FLAG_IS_POSSIBLY_OFFENSIVE => properties.is_possibly_offensive = true,
                    FLDIC_FLAG_IS_HIDDEN_BY_USER => properties.is_hidden_by_user = true,
                    _ => {}
                }
            }
        }

        level_words.truncate(level - 1);
        let mut node = &mut dict.root_node;
        for parent in &level_words {
            node = node
                .resolve_mut(parent)
                .ok_or_else(|| {
                    serialization_error(path, line_num, "n-gram line without a corresponding parent")
                })?
                .subsequent_words_or_create();
        }
        let word_chars = unicode::segment(word);
        node.insert(&word_chars).properties = properties;

        match level {
            1 => dict.max_unigram_score = dict.max_unigram_score.max(score),
            2 => dict.max_bigram_score = dict.max_bigram_score.max(score),
            3 => dict.max_trigram_score = dict.max_trigram_score.max(score),
            _ => {}
        }
        level_words.push(word_chars);
    }

    Ok(dict)
}

pub(super) fn write_dictionary<W: Write>(
    writer: &mut W,
    dict: &Dictionary,
) -> io::Result<()> {
    dict.header.write_to(writer)?;
    writeln!(writer, "{FLDIC_SECTION_WORDS}")?;
    write_ngrams(writer, &dict.root_node, 1)
}

fn write_ngrams<W: Write>(writer: &mut W, base_node: &TrieNode, level: usize) -> io::Result<()> {
    let mut prefix = String::new();
    write_ngrams_inner(writer, base_node, level, &mut prefix)
}

fn write_ngrams_inner<W: Write>(
    writer: &mut W,
    node: &TrieNode,
    level: usize,
    prefix: &mut String,
) -> io::Result<()> {
    if node.is_terminal && !prefix.is_empty() {
        for _ in 1..level {
            writer.write_all(b"\t")?;
        }
        write!(
            writer,
            "{prefix}{FLDIC_SEPARATOR}{}",
            node.properties.absolute_score
        )?;
        if node.properties.is_possibly_offensive || node.properties.is_hidden_by_user {
            writer.write_all(b"\t")?;
            if node.properties.is_possibly_offensive {
                write!(writer, "{FLDIC_FLAG_IS_POSSIBLY_OFFENSIVE}")?;
            }
            if node.properties.is_hidden_by_user {
                write!(writer, "{FLDIC_FLAG_IS_HIDDEN_BY_USER}")?;
            }
        }
        writeln!(writer)?;
        if let Some(subsequent) = node.subsequent_words() {
            write_ngrams(writer, subsequent, level + 1)?;
        }
    }
    for (grapheme, child) in node.children() {
        if starts_with_ctrl_byte(grapheme) {
            continue;
        }
        let len = prefix.len();
        prefix.push_str(grapheme);
        write_ngrams_inner(writer, child, level, prefix)?;
        prefix.truncate(len);
    }
    Ok(())
}
