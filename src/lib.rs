//! conllu-explorer: indexing, search and corpus statistics for CoNLL-U
//!
//! Loads one or more treebank splits, indexes them, and answers token
//! searches with linguistic filters, n-gram counts and collocation
//! statistics (PMI, t-score).

// Core modules (leaves first)
mod bytes; // Line splitting and field helpers
pub mod collocations; // PMI / t-score collocates
pub mod config; // Corpus and query defaults
pub mod conllu; // CoNLL-U parsing
pub mod corpus; // Snapshots and the session that publishes them
pub mod error;
pub mod index; // Inverted hit lists and frequency tables
pub mod loader; // Split retrieval (async) and progress reporting
pub mod ngrams; // N-gram frequency counts
pub mod pattern; // Wildcard pattern compilation
pub mod searcher; // Token search and pagination
pub mod sentence; // Sentence and token records

// Re-exports for convenience
pub use collocations::{CollocationRow, Measure, collocations};
pub use config::CorpusConfig;
pub use conllu::{ConlluReader, ParseEvent, parse_conllu};
pub use corpus::{Scope, Session, Snapshot};
pub use error::{ConfigError, FetchError, LoadError, PatternError, UnknownMeasure};
pub use index::{ChartKind, Hit, Index, build_index};
pub use loader::{Fetch, FileFetcher, SplitSource, load};
pub use ngrams::{TokenSource, ngrams};
pub use pattern::{MatchOptions, Matcher};
pub use searcher::{
    FeatureFilter, MatchTarget, Page, SearchQuery, SearchResult, SentenceHit, paginate, search,
};
pub use sentence::{DependencyArc, Features, Sentence, Token};
