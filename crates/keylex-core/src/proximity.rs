//! Physical key adjacency, loaded from a layout-specific JSON object of the
//! form `{ "a": ["q", "w", "s", "z"], ... }`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct KeyProximityMap {
    data: HashMap<String, Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProximityMapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl KeyProximityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `actual` has an adjacency entry that contains `assumed`.
    pub fn is_in_proximity(&self, assumed: &str, actual: &str) -> bool {
        self.data
            .get(actual)
            .is_some_and(|keys| keys.iter().any(|k| k == assumed))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Duplicate keys in the JSON resolve to the last-written set.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProximityMapError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ProximityMapError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}
