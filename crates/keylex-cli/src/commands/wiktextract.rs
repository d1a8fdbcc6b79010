//! Wiktextract preprocessing: build an `.fldic` dictionary from a
//! kaikki.org line-JSON dump.
//!
//! Each input line is one JSON object describing a (word, part-of-speech)
//! entry with its senses. Evidence is aggregated per (word, pos), then
//! merged across parts of speech and `form_of`/`alt_of` chains before a
//! keep/offensive/exclude decision is made per word.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use keylex_core::dict::{DictionaryError, MutableDictionary};

use super::validate_word;

pub const DEFAULT_CONFIG_PATH: &str = "data/wiktextract-config.json";
pub const DEFAULT_FILTER_NAME: &str = "root";

/// The plain merge looks at the word's own parts of speech only; the
/// form-of-aware merge follows base-form references two levels deep.
const MERGING_MAX_DEPTH: u8 = 0;
const MERGING_MAX_DEPTH_WITH_FORM_OF: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid filter regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

// --- Config ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    project_specific_words: Vec<String>,
    filters: Vec<RawFilter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFilter {
    name: String,
    excluded: RawRuleSet,
    offensive: RawRuleSet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRuleSet {
    words: Vec<String>,
    tags: Vec<String>,
    categories: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct FilterRule {
    words: Vec<Regex>,
    tags: Vec<String>,
    categories: Vec<String>,
}

impl FilterRule {
    fn compile(raw: RawRuleSet) -> Result<Self, ConfigError> {
        let mut words = Vec::with_capacity(raw.words.len());
        for pattern in raw.words {
            // rule regexes match the whole word, not a substring
            let regex = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|source| ConfigError::InvalidRegex { pattern, source })?;
            words.push(regex);
        }
        Ok(Self {
            words,
            tags: raw.tags,
            categories: raw.categories,
        })
    }

    fn matches(&self, word: &str, tags: &[String], categories: &[String]) -> bool {
        self.words.iter().any(|regex| regex.is_match(word))
            || self.tags.iter().any(|tag| tags.contains(tag))
            || self
                .categories
                .iter()
                .any(|category| categories.contains(category))
    }
}

#[derive(Debug, Default, Clone)]
pub struct Filter {
    pub name: String,
    excluded: FilterRule,
    offensive: FilterRule,
}

/// Matches nothing: every sense counts as normal.
fn fallback_filter() -> &'static Filter {
    static FALLBACK: OnceLock<Filter> = OnceLock::new();
    FALLBACK.get_or_init(|| Filter {
        name: String::from("fallback"),
        ..Default::default()
    })
}

#[derive(Debug, Default)]
pub struct WiktextractConfig {
    project_specific_words: Vec<String>,
    filters: Vec<Filter>,
}

impl WiktextractConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let mut filters = Vec::with_capacity(raw.filters.len());
        for raw_filter in raw.filters {
            filters.push(Filter {
                name: raw_filter.name,
                excluded: FilterRule::compile(raw_filter.excluded)?,
                offensive: FilterRule::compile(raw_filter.offensive)?,
            });
        }
        Ok(Self {
            project_specific_words: raw.project_specific_words,
            filters,
        })
    }

    /// Select by name, fall back to `root`, then to the permissive filter.
    pub fn get_filter(&self, filter_name: &str) -> &Filter {
        self.filters
            .iter()
            .find(|f| f.name == filter_name)
            .or_else(|| self.filters.iter().find(|f| f.name == DEFAULT_FILTER_NAME))
            .unwrap_or_else(|| fallback_filter())
    }
}

// --- Input records ---

#[derive(Debug, Deserialize)]
struct RawEntry {
    word: Option<String>,
    pos: Option<String>,
    senses: Option<Vec<RawSense>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSense {
    tags: Vec<String>,
    categories: Vec<RawCategory>,
    form_of: Vec<RawWordRef>,
    alt_of: Vec<RawWordRef>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawWordRef {
    word: String,
}

// --- Evidence aggregation ---

#[derive(Debug, Default, Clone)]
struct WordEvaluator {
    form_ofs: Vec<String>,
    exclusion_count: u32,
    offensive_count: u32,
    normal_count: u32,
}

impl WordEvaluator {
    fn is_word_excluded(&self) -> bool {
        self.exclusion_count >= self.offensive_count && self.exclusion_count >= self.normal_count
    }

    fn is_word_offensive(&self) -> bool {
        self.offensive_count >= self.normal_count
    }
}

type ParsedData = BTreeMap<String, BTreeMap<String, WordEvaluator>>;

/// Fold `pos_evaluator` into `target` with weight `depth + 1`, then follow
/// its base-form references with the same part of speech up to `max_depth`.
fn merge_evaluator_counts(
    parsed_data: &ParsedData,
    target: &mut WordEvaluator,
    pos_evaluator: &WordEvaluator,
    pos: &str,
    max_depth: u8,
    depth: u8,
) {
    let weight = u32::from(depth) + 1;
    target.exclusion_count += weight * pos_evaluator.exclusion_count;
    target.offensive_count += weight * pos_evaluator.offensive_count;
    target.normal_count += weight * pos_evaluator.normal_count;
    if depth >= max_depth {
        return;
    }
    for form_of in &pos_evaluator.form_ofs {
        if let Some(base_evaluator) = parsed_data.get(form_of).and_then(|m| m.get(pos)) {
            merge_evaluator_counts(parsed_data, target, base_evaluator, pos, max_depth, depth + 1);
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PreprocessorStats {
    #[serde(rename = "_parse_duration_in_seconds")]
    parse_duration_in_seconds: u64,
    #[serde(rename = "_total_raw_words")]
    total_raw_words: u64,
    #[serde(rename = "_total_raw_senses")]
    total_raw_senses: u64,
    #[serde(rename = "_total_words_excluded")]
    total_words_excluded: u64,
    #[serde(rename = "_total_words_offensive")]
    total_words_offensive: u64,
    #[serde(rename = "_total_words_normal")]
    total_words_normal: u64,
    pos_stats: BTreeMap<String, u64>,
    tag_stats: BTreeMap<String, u64>,
    category_stats: BTreeMap<String, u64>,
}

pub struct WiktextractPreprocessor {
    config: WiktextractConfig,
    dict: MutableDictionary,
    parsed_data: ParsedData,
    stats: PreprocessorStats,
}

impl WiktextractPreprocessor {
    pub fn new(config: WiktextractConfig) -> Self {
        Self {
            config,
            dict: MutableDictionary::new_empty(),
            parsed_data: ParsedData::new(),
            stats: PreprocessorStats::default(),
        }
    }

    pub fn stats(&self) -> &PreprocessorStats {
        &self.stats
    }

    pub fn dictionary(&self) -> &MutableDictionary {
        &self.dict
    }

    /// Stream the wiktextract dump, aggregate evidence, decide per word and
    /// insert the kept words. All insertion happens on this single writer.
    pub fn build_dictionary(
        &mut self,
        src_path: impl AsRef<Path>,
        filter_name: &str,
    ) -> Result<(), io::Error> {
        let parse_start = Instant::now();
        let reader = BufReader::new(File::open(src_path)?);
        for line in reader.lines() {
            self.aggregate_line(&line?, filter_name);
        }
        self.insert_parsed_words();
        self.insert_project_specific_words();
        self.stats.parse_duration_in_seconds = parse_start.elapsed().as_secs();
        info!(
            words = self.stats.total_raw_words,
            senses = self.stats.total_raw_senses,
            "finished wiktextract parse"
        );
        Ok(())
    }

    fn aggregate_line(&mut self, line: &str, filter_name: &str) {
        let entry: RawEntry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(error) => {
                debug!(%error, "skipping malformed input line");
                return;
            }
        };
        let (Some(word), Some(pos), Some(senses)) = (entry.word, entry.pos, entry.senses) else {
            return;
        };

        self.stats.total_raw_words += 1;
        *self.stats.pos_stats.entry(pos.clone()).or_default() += 1;
        let filter = self.config.get_filter(filter_name);
        let word_data = self
            .parsed_data
            .entry(word.clone())
            .or_default()
            .entry(pos)
            .or_default();

        for sense in senses {
            self.stats.total_raw_senses += 1;
            for tag in &sense.tags {
                *self.stats.tag_stats.entry(tag.clone()).or_default() += 1;
            }
            let category_names: Vec<String> =
                sense.categories.into_iter().map(|c| c.name).collect();
            for category in &category_names {
                *self.stats.category_stats.entry(category.clone()).or_default() += 1;
            }
            if let Some(reference) = sense.form_of.first().or_else(|| sense.alt_of.first()) {
                word_data.form_ofs.push(reference.word.clone());
            }

            if filter.excluded.matches(&word, &sense.tags, &category_names) {
                word_data.exclusion_count += 1;
            } else if filter.offensive.matches(&word, &sense.tags, &category_names) {
                word_data.offensive_count += 1;
            } else {
                word_data.normal_count += 1;
            }
        }
    }

    fn insert_parsed_words(&mut self) {
        for (word, pos_map) in &self.parsed_data {
            let mut evaluator = WordEvaluator::default();
            let mut evaluator_with_fo = WordEvaluator::default();
            for (pos, pos_evaluator) in pos_map {
                merge_evaluator_counts(
                    &self.parsed_data,
                    &mut evaluator,
                    pos_evaluator,
                    pos,
                    MERGING_MAX_DEPTH,
                    0,
                );
                merge_evaluator_counts(
                    &self.parsed_data,
                    &mut evaluator_with_fo,
                    pos_evaluator,
                    pos,
                    MERGING_MAX_DEPTH_WITH_FORM_OF,
                    0,
                );
            }

            if evaluator.is_word_excluded()
                || evaluator_with_fo.is_word_excluded()
                || !validate_word(word)
            {
                self.stats.total_words_excluded += 1;
            } else if evaluator_with_fo.is_word_offensive() {
                self.stats.total_words_offensive += 1;
                let mut properties = self.dict.insert(word);
                properties.absolute_score += evaluator_with_fo.offensive_count;
                properties.is_possibly_offensive = true;
            } else {
                self.stats.total_words_normal += 1;
                self.dict.insert(word).absolute_score += evaluator_with_fo.normal_count;
            }
        }
    }

    fn insert_project_specific_words(&mut self) {
        for word in &self.config.project_specific_words {
            self.dict.insert(word).absolute_score += 1;
        }
    }

    pub fn persist_dictionary(&mut self, dst_path: impl AsRef<Path>) -> Result<(), DictionaryError> {
        self.dict.set_dst_path(dst_path);
        self.dict.persist()
    }

    pub fn persist_stats(&self, stats_path: impl AsRef<Path>) -> Result<(), io::Error> {
        let file = File::create(stats_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.stats)?;
        Ok(())
    }
}

/// Run the full `prep-wiktextract` action. Returns the process exit code.
pub fn prep_wiktextract(
    src_path: &str,
    dst_path: &str,
    config_path: &str,
    filter_name: &str,
    stats_path: Option<&str>,
) -> i32 {
    let src_path = src_path.trim();
    let dst_path = dst_path.trim();
    let config_path = config_path.trim();
    let filter_name = filter_name.trim();

    if src_path.is_empty() {
        eprintln!("Fatal: No source path specified! Aborting.");
        return 1;
    }
    if !Path::new(src_path).exists() {
        eprintln!("Fatal: Given source path '{src_path}' does not exist! Aborting.");
        return 1;
    }
    if dst_path.is_empty() {
        eprintln!("Fatal: No destination path specified! Aborting.");
        return 1;
    }
    if config_path.is_empty() {
        eprintln!("Fatal: No config path specified! Aborting.");
        return 1;
    }
    if !Path::new(config_path).exists() {
        eprintln!("Fatal: Given config path '{config_path}' does not exist! Aborting.");
        return 1;
    }
    if filter_name.is_empty() {
        eprintln!("Fatal: No filter name specified! Aborting.");
        return 1;
    }

    let config = match WiktextractConfig::load(config_path) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Fatal: Failed to load config: {error}");
            return 1;
        }
    };
    let mut preprocessor = WiktextractPreprocessor::new(config);
    if let Err(error) = preprocessor.build_dictionary(src_path, filter_name) {
        eprintln!("Fatal: Failed to read wiktextract data: {error}");
        return 1;
    }
    if let Err(error) = preprocessor.persist_dictionary(dst_path) {
        eprintln!("Fatal: Failed to write dictionary: {error}");
        return 1;
    }
    if let Some(stats_path) = stats_path {
        let stats_path = stats_path.trim();
        if !stats_path.is_empty() {
            if let Err(error) = preprocessor.persist_stats(stats_path) {
                eprintln!("Fatal: Failed to write statistics: {error}");
                return 1;
            }
        }
    }
    0
}
