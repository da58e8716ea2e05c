//! Retrieval and loading of corpus splits
//!
//! Raw text for each split comes from a `Fetch` implementation; that call
//! is the only asynchronous step. Parsing is synchronous and reports
//! progress through `ParseEvents`.
//!
//! # Examples
//!
//! ```no_run
//! use conllu_explorer::{FileFetcher, SplitSource, load};
//!
//! # async fn run() -> Result<(), conllu_explorer::LoadError> {
//! let splits = vec![
//!     SplitSource::new("train", "data/en-ud-train.conllu"),
//!     SplitSource::new("dev", "data/en-ud-dev.conllu.gz"),
//! ];
//! let sentences = load(&FileFetcher, &splits, |split, fraction| {
//!     println!("{split}: {:.0}%", fraction * 100.0);
//! })
//! .await?;
//! println!("{} sentences", sentences.len());
//! # Ok(())
//! # }
//! ```

use crate::conllu::{ConlluReader, ParseEvent};
use crate::error::{ConfigError, FetchError, LoadError};
use crate::sentence::Sentence;
use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of the raw text of a split
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieve the complete text at `location`
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Reads splits from the local filesystem. Files ending in `.gz` are
/// decompressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait]
impl Fetch for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = PathBuf::from(location);
        let bytes = tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        decode(&path, bytes)
    }
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, FetchError> {
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut text = String::new();
        MultiGzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::InvalidData => FetchError::Encoding {
                    path: path.to_path_buf(),
                },
                _ => FetchError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            })?;
        Ok(text)
    } else {
        String::from_utf8(bytes).map_err(|_| FetchError::Encoding {
            path: path.to_path_buf(),
        })
    }
}

/// A named split and where to fetch it from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSource {
    pub name: String,
    pub location: String,
}

impl SplitSource {
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_string(),
        }
    }

    /// One split per file matching a glob pattern, in sorted path order.
    /// The split is named after the last `-`-separated part of the file
    /// stem, so `en_ewt-ud-train.conllu` becomes `train`.
    pub fn discover(pattern: &str) -> Result<Vec<Self>, ConfigError> {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        paths.sort();
        Ok(paths
            .iter()
            .map(|path| Self {
                name: split_name(path),
                location: path.to_string_lossy().into_owned(),
            })
            .collect())
    }
}

fn split_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file.split('.').next().unwrap_or_default();
    stem.rsplit('-').next().unwrap_or(stem).to_string()
}

/// Sentence count of one loaded split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub split: String,
    pub sentences: usize,
}

/// Parse one split's text, forwarding progress events
pub fn parse_split(
    text: &str,
    split: &str,
    mut on_progress: impl FnMut(&str, f64),
) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    for event in ConlluReader::new(text, split).events() {
        match event {
            ParseEvent::Progress(fraction) => on_progress(split, fraction),
            ParseEvent::Finished(parsed) => sentences = parsed,
        }
    }
    sentences
}

/// Fetch and parse splits one after another, concatenating their
/// sentences in the given order. The first retrieval failure aborts the
/// whole load.
pub async fn load<F>(
    fetcher: &F,
    splits: &[SplitSource],
    mut on_progress: impl FnMut(&str, f64),
) -> Result<Vec<Sentence>, LoadError>
where
    F: Fetch + ?Sized,
{
    let (sentences, _) = load_with_report(fetcher, splits, &mut on_progress).await?;
    Ok(sentences)
}

/// Like `load`, also returning per-split sentence counts
pub async fn load_with_report<F>(
    fetcher: &F,
    splits: &[SplitSource],
    mut on_progress: impl FnMut(&str, f64),
) -> Result<(Vec<Sentence>, Vec<SplitReport>), LoadError>
where
    F: Fetch + ?Sized,
{
    if splits.is_empty() {
        warn!("no splits selected; the corpus will be empty");
    }

    let mut sentences = Vec::new();
    let mut reports = Vec::with_capacity(splits.len());
    for split in splits {
        let text = fetcher
            .fetch(&split.location)
            .await
            .map_err(|source| LoadError::Retrieval {
                split: split.name.clone(),
                source,
            })?;
        let parsed = parse_split(&text, &split.name, &mut on_progress);
        debug!(split = %split.name, sentences = parsed.len(), "parsed split");
        reports.push(SplitReport {
            split: split.name.clone(),
            sentences: parsed.len(),
        });
        sentences.extend(parsed);
    }
    Ok((sentences, reports))
}
