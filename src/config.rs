//! Corpus and query defaults
//!
//! Everything has a default, so a config file only needs the keys it
//! wants to change.

use crate::collocations::Measure;
use crate::error::{ConfigError, FetchError, LoadError};
use crate::loader::SplitSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default page size for search results
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// N-gram defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NgramSettings {
    pub n: usize,
    pub top: usize,
}

impl Default for NgramSettings {
    fn default() -> Self {
        Self { n: 2, top: 30 }
    }
}

/// Collocation defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationSettings {
    pub window: usize,
    pub top: usize,
    pub measure: Measure,
}

impl Default for CollocationSettings {
    fn default() -> Self {
        Self {
            window: 2,
            top: 30,
            measure: Measure::TScore,
        }
    }
}

/// Where the corpus comes from and how queries behave by default
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Known splits, in load order
    pub splits: Vec<SplitSource>,
    pub page_size: usize,
    pub ngrams: NgramSettings,
    pub collocations: CollocationSettings,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            splits: vec![
                SplitSource::new("train", "./data/qpm_philotis-ud-train.conllu"),
                SplitSource::new("dev", "./data/qpm_philotis-ud-dev.conllu"),
                SplitSource::new("test", "./data/qpm_philotis-ud-test.conllu"),
            ],
            page_size: DEFAULT_PAGE_SIZE,
            ngrams: NgramSettings::default(),
            collocations: CollocationSettings::default(),
        }
    }
}

impl CorpusConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn split(&self, name: &str) -> Option<&SplitSource> {
        self.splits.iter().find(|s| s.name == name)
    }

    /// Sources for the named splits, in the order given. An unknown name
    /// fails the same way a retrieval would.
    pub fn select(&self, names: &[&str]) -> Result<Vec<SplitSource>, LoadError> {
        names
            .iter()
            .map(|&name| {
                self.split(name)
                    .cloned()
                    .ok_or_else(|| LoadError::Retrieval {
                        split: name.to_string(),
                        source: FetchError::UnknownSplit(name.to_string()),
                    })
            })
            .collect()
    }
}
