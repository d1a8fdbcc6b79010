//! Wortschatz corpora preprocessing: build an `.fldic` dictionary from a
//! ranked word list.
//!
//! Word list lines are TAB-separated `rank<TAB>word<TAB>frequency` records.
//! Words containing anything but alphabetic graphemes, apostrophe, and
//! hyphen are skipped, as are structurally short lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::info;

use keylex_core::dict::MutableDictionary;
use keylex_core::unicode;

use super::validate_word;

const SEPARATOR: char = '\t';

/// Read a ranked word list into `dict`. Returns how many words were taken.
pub fn read_wordlist_into_dictionary(
    word_list_path: impl AsRef<Path>,
    dict: &mut MutableDictionary,
) -> Result<u64, io::Error> {
    let reader = BufReader::new(File::open(word_list_path)?);
    let mut taken = 0u64;
    for line in reader.lines() {
        let line = line?;
        let columns: Vec<&str> = unicode::trim(&line).split(SEPARATOR).collect();
        if columns.len() < 3 {
            continue;
        }

        let word = columns[1];
        if word.is_empty() || !validate_word(word) {
            continue;
        }
        let Ok(score) = columns[2].parse::<u32>() else {
            continue;
        };

        dict.insert(word).absolute_score = score;
        taken += 1;
    }
    Ok(taken)
}

/// Run the full `prep-wordlist` action. Returns the process exit code.
pub fn prep_wordlist(src_path: &str, dst_path: &str) -> i32 {
    let src_path = src_path.trim();
    let dst_path = dst_path.trim();

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

    let mut dict = MutableDictionary::new_empty();
    let taken = match read_wordlist_into_dictionary(src_path, &mut dict) {
        Ok(taken) => taken,
        Err(error) => {
            eprintln!("Fatal: Failed to read word list: {error}");
            return 1;
        }
    };
    info!(taken, "read word list");

    dict.set_dst_path(dst_path);
    if let Err(error) = dict.persist() {
        eprintln!("Fatal: Failed to write dictionary: {error}");
        return 1;
    }
    0
}
