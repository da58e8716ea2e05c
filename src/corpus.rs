//! Corpus snapshots and the session that publishes them
//!
//! A `Snapshot` bundles the frozen sentences with the index built from
//! them. Queries take a snapshot and return new values; nothing is
//! mutated after construction. A `Session` holds the current snapshot and
//! replaces it wholesale on reload, so a caller holding an older
//! `Arc<Snapshot>` keeps a consistent view.

use crate::collocations::{CollocationRow, Measure, collocations};
use crate::config::CorpusConfig;
use crate::error::LoadError;
use crate::index::{Index, build_index};
use crate::loader::{Fetch, SplitReport, load_with_report};
use crate::ngrams::{TokenSource, ngrams};
use crate::searcher::{Page, SearchQuery, SearchResult, SentenceHit, paginate, search};
use crate::sentence::Sentence;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Which sentences an n-gram count covers
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    All,
    /// Sentences of a prior search; an empty result means the whole corpus
    Results(&'a SearchResult),
}

/// Frozen sentences plus their index
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    sentences: Vec<Sentence>,
    index: Index,
    reports: Vec<SplitReport>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Finalize and index `sentences`
    pub fn build(mut sentences: Vec<Sentence>) -> Self {
        let index = build_index(&mut sentences);
        Self {
            sentences,
            index,
            reports: Vec::new(),
        }
    }

    fn with_reports(mut self, reports: Vec<SplitReport>) -> Self {
        self.reports = reports;
        self
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentence(&self, uid: usize) -> Option<&Sentence> {
        self.sentences.get(uid)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Sentence counts per split, in load order
    pub fn reports(&self) -> &[SplitReport] {
        &self.reports
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn search(&self, query: &SearchQuery) -> SearchResult {
        search(&self.sentences, query)
    }

    /// Resolve the hits of a page to their sentences
    pub fn resolve<'a>(
        &'a self,
        hits: &'a [SentenceHit],
    ) -> impl Iterator<Item = (&'a Sentence, &'a [usize])> + 'a {
        hits.iter()
            .filter_map(|hit| Some((self.sentence(hit.uid)?, hit.positions.as_slice())))
    }

    /// Top n-grams; `top` is at least 1
    pub fn ngrams(&self, scope: Scope<'_>, n: usize, top: usize) -> Vec<(String, usize)> {
        let source = match scope {
            Scope::Results(result) if !result.is_empty() => {
                TokenSource::Results(&self.sentences, result)
            }
            _ => TokenSource::Corpus(&self.sentences),
        };
        ngrams(source, n, top.max(1))
    }

    /// Collocates of `target`; `window` and `top` are at least 1
    pub fn collocations(
        &self,
        target: &str,
        window: usize,
        top: usize,
        measure: Measure,
    ) -> Vec<CollocationRow> {
        collocations(&self.sentences, target, window.max(1), top.max(1), measure)
    }
}

/// Holds the configuration and the currently published snapshot
pub struct Session {
    config: CorpusConfig,
    current: RwLock<Arc<Snapshot>>,
}

impl Session {
    pub fn new(config: CorpusConfig) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// The snapshot new queries should use
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current snapshot
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Arc::clone(&snapshot);
        snapshot
    }

    /// Load the named splits, build a new snapshot and publish it. On
    /// failure the current snapshot is left untouched.
    pub async fn reload<F>(
        &self,
        fetcher: &F,
        splits: &[&str],
        on_progress: impl FnMut(&str, f64),
    ) -> Result<Arc<Snapshot>, LoadError>
    where
        F: Fetch + ?Sized,
    {
        let sources = self.config.select(splits)?;
        let (sentences, reports) = load_with_report(fetcher, &sources, on_progress).await?;
        let snapshot = Snapshot::build(sentences).with_reports(reports);
        info!(
            sentences = snapshot.sentences.len(),
            splits = sources.len(),
            "corpus loaded"
        );
        Ok(self.publish(snapshot))
    }

    /// Page of a result using the configured page size
    pub fn page<'a>(&self, result: &'a SearchResult, page: usize) -> Page<'a> {
        paginate(result, page, self.config.page_size)
    }

    /// N-grams with the configured order and size
    pub fn default_ngrams(&self, snapshot: &Snapshot, scope: Scope<'_>) -> Vec<(String, usize)> {
        let settings = &self.config.ngrams;
        snapshot.ngrams(scope, settings.n, settings.top)
    }

    /// Collocations with the configured window, size and measure
    pub fn default_collocations(&self, snapshot: &Snapshot, target: &str) -> Vec<CollocationRow> {
        let settings = &self.config.collocations;
        snapshot.collocations(target, settings.window, settings.top, settings.measure)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CorpusConfig::default())
    }
}
