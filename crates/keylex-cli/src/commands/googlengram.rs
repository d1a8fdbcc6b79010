//! Google Books unigram preprocessing: build an `.fldic` dictionary from a
//! v3 unigram dataset directory.
//!
//! The dataset consists of a `totalcounts-1` file (TAB-separated
//! `year,match_count,page_count,volume_count` records) and partition files
//! in which each line is a word followed by TAB-separated
//! `year,match_count,volume_count` triples. A word's raw weight is its mean
//! yearly share of all matches; weights are normalized against the heaviest
//! word across all loaded partitions before insertion.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use keylex_core::dict::MutableDictionary;

pub const TOTALCOUNTS_FILE_NAME: &str = "totalcounts-1";

/// Normalized weights are scaled into the 16-bit range so that repeated
/// partition merges stay far below the 24-bit score cap.
const WEIGHT_SCALE: f64 = u16::MAX as f64;

fn word_validation_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[\p{Alphabetic}'-]+$").expect("word regex must be valid"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearlyCounts {
    pub matches: u64,
    pub pages: u64,
    pub volumes: u64,
}

#[derive(Debug, Default)]
pub struct TotalCounts {
    counts_by_year: BTreeMap<u16, YearlyCounts>,
}

impl TotalCounts {
    /// Parse a `totalcounts-1` file: records separated by TAB, each record
    /// `year,match_count,page_count,volume_count`. Malformed records are
    /// skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let content = std::fs::read_to_string(path)?;
        let mut counts = Self::default();
        for record in content.split('\t') {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            let fields: Vec<&str> = record.split(',').collect();
            if fields.len() != 4 {
                continue;
            }
            let (Ok(year), Ok(matches), Ok(pages), Ok(volumes)) = (
                fields[0].parse(),
                fields[1].parse(),
                fields[2].parse(),
                fields[3].parse(),
            ) else {
                continue;
            };
            counts.counts_by_year.insert(
                year,
                YearlyCounts {
                    matches,
                    pages,
                    volumes,
                },
            );
        }
        Ok(counts)
    }

    pub fn counts_of_year(&self, year: u16) -> YearlyCounts {
        self.counts_by_year.get(&year).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.counts_by_year.is_empty()
    }
}

#[derive(Debug)]
struct Unigram {
    word: String,
    weight: f64,
}

#[derive(Debug, Default)]
struct Partition {
    name: String,
    data: Vec<Unigram>,
    entry_count: u64,
    skip_count: u64,
    max_weight: f64,
}

/// Words that are URLs, e-mail addresses, `_NUM`-tagged tokens, or contain
/// anything but alphabetic graphemes, apostrophe, and hyphen are skipped.
fn check_raw_word(word: &str) -> bool {
    if word.starts_with("https://") || word.starts_with("http://") || word.starts_with("www.") {
        return false;
    }
    if word.contains('@') {
        return false;
    }
    if word.ends_with("_NUM") {
        return false;
    }
    word_validation_regex().is_match(word)
}

#[derive(Debug, Default)]
pub struct GoogleUnigramDatabase {
    database: BTreeMap<String, u16>,
    total_counts: TotalCounts,
}

impl GoogleUnigramDatabase {
    /// Load the dataset at `path`: the total counts file plus every
    /// partition listed in `partitions` (file names relative to `path`).
    pub fn load(path: &Path, partitions: &[PathBuf]) -> Result<Self, io::Error> {
        let mut db = Self {
            database: BTreeMap::new(),
            total_counts: TotalCounts::load(path.join(TOTALCOUNTS_FILE_NAME))?,
        };
        let mut loaded = Vec::with_capacity(partitions.len());
        for partition_path in partitions {
            let partition = db.load_partition(partition_path)?;
            info!(
                name = %partition.name,
                entries = partition.entry_count,
                skipped = partition.skip_count,
                "loaded partition"
            );
            loaded.push(partition);
        }
        db.normalize_and_insert_partitions(loaded);
        Ok(db)
    }

    fn load_partition(&self, partition_path: &Path) -> Result<Partition, io::Error> {
        let mut partition = Partition {
            name: partition_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        };

        let reader = BufReader::new(File::open(partition_path)?);
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let Some(word) = fields.next() else {
                continue;
            };
            partition.entry_count += 1;
            if !check_raw_word(word) {
                debug!(word, "skipping raw word");
                partition.skip_count += 1;
                continue;
            }

            let mut weight_sum = 0.0;
            let mut weight_count = 0u64;
            for token in fields {
                if token.is_empty() {
                    continue;
                }
                let year_fields: Vec<&str> = token.split(',').collect();
                if year_fields.len() != 3 {
                    continue;
                }
                let (Ok(year), Ok(matches)) =
                    (year_fields[0].parse::<u16>(), year_fields[1].parse::<u64>())
                else {
                    continue;
                };
                let yearly = self.total_counts.counts_of_year(year);
                if yearly.matches == 0 {
                    continue;
                }
                weight_sum += matches as f64 / yearly.matches as f64;
                weight_count += 1;
            }

            let weight = if weight_count > 0 {
                weight_sum / weight_count as f64
            } else {
                0.0
            };
            if weight > partition.max_weight {
                partition.max_weight = weight;
            }
            partition.data.push(Unigram {
                word: word.to_string(),
                weight,
            });
        }
        Ok(partition)
    }

    /// Scale each word's weight against the heaviest word across all
    /// partitions and fold it into the database. Re-occurring words
    /// accumulate.
    fn normalize_and_insert_partitions(&mut self, partitions: Vec<Partition>) {
        let max_weight = partitions
            .iter()
            .map(|p| p.max_weight)
            .fold(0.0f64, f64::max);
        if max_weight <= 0.0 {
            return;
        }

        for partition in partitions {
            for unigram in partition.data {
                let norm_weight = (WEIGHT_SCALE * (unigram.weight / max_weight)).round() as u32;
                let existing = u32::from(self.database.get(&unigram.word).copied().unwrap_or(0));
                let combined = (existing + norm_weight).min(u32::from(u16::MAX)) as u16;
                if combined > 0 {
                    self.database.insert(unigram.word, combined);
                }
            }
        }
    }

    pub fn word_weight(&self, word: &str) -> u16 {
        self.database.get(word).copied().unwrap_or(0)
    }

    pub fn into_dictionary(self) -> MutableDictionary {
        let mut dict = MutableDictionary::new_empty();
        for (word, weight) in self.database {
            dict.insert(&word).absolute_score = u32::from(weight);
        }
        dict
    }
}

/// Partition file names in a v3 unigram directory look like
/// `1-00019-of-00024`.
fn discover_partitions(dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
    let mut partitions = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && name.starts_with("1-") && name.contains("-of-") {
            partitions.push(entry.path());
        }
    }
    partitions.sort();
    Ok(partitions)
}

/// Run the full `prep-googlengram` action. Returns the process exit code.
pub fn prep_googlengram(src_dir: &str, dst_path: &str, partition: Option<&str>) -> i32 {
    let src_dir = src_dir.trim();
    let dst_path = dst_path.trim();

    if src_dir.is_empty() {
        eprintln!("Fatal: No source directory specified! Aborting.");
        return 1;
    }
    let src = Path::new(src_dir);
    if !src.is_dir() {
        eprintln!("Fatal: Given source path '{src_dir}' is not a directory! Aborting.");
        return 1;
    }
    if !src.join(TOTALCOUNTS_FILE_NAME).exists() {
        eprintln!("Fatal: Source directory has no '{TOTALCOUNTS_FILE_NAME}' file! Aborting.");
        return 1;
    }
    if dst_path.is_empty() {
        eprintln!("Fatal: No destination path specified! Aborting.");
        return 1;
    }

    let partitions = match partition {
        Some(name) => vec![src.join(name.trim())],
        None => match discover_partitions(src) {
            Ok(partitions) if !partitions.is_empty() => partitions,
            Ok(_) => {
                eprintln!("Fatal: No partition files found in '{src_dir}'! Aborting.");
                return 1;
            }
            Err(error) => {
                eprintln!("Fatal: Failed to list '{src_dir}': {error}");
                return 1;
            }
        },
    };

    let database = match GoogleUnigramDatabase::load(src, &partitions) {
        Ok(database) => database,
        Err(error) => {
            eprintln!("Fatal: Failed to load unigram data: {error}");
            return 1;
        }
    };
    let mut dict = database.into_dictionary();
    dict.set_dst_path(dst_path);
    if let Err(error) = dict.persist() {
        eprintln!("Fatal: Failed to write dictionary: {error}");
        return 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use keylex_core::dict::Dictionary;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn test_totalcounts_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            TOTALCOUNTS_FILE_NAME,
            "2000,1000,10,5\t2001,2000,20,6\tgarbage\t2002,fail,1,1\t",
        );
        let counts = TotalCounts::load(&path).unwrap();
        assert_eq!(
            counts.counts_of_year(2000),
            YearlyCounts {
                matches: 1000,
                pages: 10,
                volumes: 5
            }
        );
        assert_eq!(counts.counts_of_year(2001).matches, 2000);
        assert_eq!(counts.counts_of_year(2002), YearlyCounts::default());
        assert_eq!(counts.counts_of_year(1999), YearlyCounts::default());
    }

    #[test]
    fn test_check_raw_word() {
        assert!(check_raw_word("hello"));
        assert!(check_raw_word("don't"));
        assert!(check_raw_word("well-known"));
        assert!(check_raw_word("naïve"));
        assert!(!check_raw_word("https://example.org"));
        assert!(!check_raw_word("www.example.org"));
        assert!(!check_raw_word("user@example.org"));
        assert!(!check_raw_word("42_NUM"));
        assert!(!check_raw_word("hello_NOUN"));
        assert!(!check_raw_word("12345"));
    }

    #[test]
    fn test_partition_weighting_and_normalization() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), TOTALCOUNTS_FILE_NAME, "2000,1000,10,5\t2001,2000,20,6\t");
        // "the" has the full share both years; "rare" half a share in one
        let partition = write_file(
            dir.path(),
            "1-00000-of-00001",
            "the\t2000,1000,3\t2001,2000,4\nrare\t2000,500,2\nwww.spam.com\t2000,100,1\n",
        );

        let db = GoogleUnigramDatabase::load(dir.path(), &[partition]).unwrap();
        assert_eq!(db.word_weight("the"), u16::MAX);
        assert_eq!(db.word_weight("rare"), u16::MAX / 2 + 1);
        assert_eq!(db.word_weight("www.spam.com"), 0);
    }

    #[test]
    fn test_reoccurring_words_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), TOTALCOUNTS_FILE_NAME, "2000,1000,10,5\t");
        let first = write_file(dir.path(), "1-00000-of-00002", "the\t2000,1000,3\n");
        let second = write_file(dir.path(), "1-00001-of-00002", "the\t2000,1000,3\n");

        let db = GoogleUnigramDatabase::load(dir.path(), &[first, second]).unwrap();
        // saturates instead of wrapping past the scale
        assert_eq!(db.word_weight("the"), u16::MAX);
    }

    #[test]
    fn test_prep_googlengram_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), TOTALCOUNTS_FILE_NAME, "2000,1000,10,5\t");
        write_file(
            dir.path(),
            "1-00000-of-00001",
            "hello\t2000,800,3\nworld\t2000,400,2\n",
        );
        let dst = dir.path().join("out.fldic");

        let code = prep_googlengram(
            dir.path().to_str().unwrap(),
            dst.to_str().unwrap(),
            None,
        );
        assert_eq!(code, 0);

        let dict = Dictionary::load(&dst).unwrap();
        assert_eq!(
            dict.ngram_properties(&["hello"]).unwrap().absolute_score,
            u32::from(u16::MAX)
        );
        assert_eq!(
            dict.ngram_properties(&["world"]).unwrap().absolute_score,
            u32::from(u16::MAX / 2) + 1
        );
    }

    #[test]
    fn test_prep_googlengram_validation() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.fldic");
        // no totalcounts file yet
        assert_eq!(
            prep_googlengram(dir.path().to_str().unwrap(), dst.to_str().unwrap(), None),
            1
        );
        assert_eq!(prep_googlengram("", dst.to_str().unwrap(), None), 1);
        assert_eq!(prep_googlengram(dir.path().to_str().unwrap(), "", None), 1);
    }
}
