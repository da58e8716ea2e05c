//! Token search over a loaded corpus
//!
//! The search pipeline:
//! 1. Compile the query pattern into a `Matcher` (once per query)
//! 2. Skip sentences outside the length bounds
//! 3. Filter each token by UPOS, deprel and feature
//! 4. Test the surviving tokens' form or lemma against the matcher
//! 5. Record sentences with at least one match, in corpus order

use crate::pattern::{MatchOptions, Matcher};
use crate::sentence::{Sentence, Token};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

pub const DEFAULT_MIN_LEN: usize = 1;
pub const DEFAULT_MAX_LEN: usize = 9999;

/// Token attribute the pattern is tested against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTarget {
    #[default]
    Form,
    /// Lemma, falling back to the form when the lemma is empty
    Lemma,
}

/// Require a morphological feature, optionally with a value substring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFilter {
    pub key: String,
    /// Compared case-insensitively; empty means any value
    #[serde(default)]
    pub value: String,
}

impl FeatureFilter {
    fn accepts(&self, token: &Token) -> bool {
        let key = self.key.trim();
        if key.is_empty() {
            return true;
        }
        let Some(value) = token.feats.get(key).filter(|v| !v.is_empty()) else {
            return false;
        };
        let wanted = self.value.trim();
        wanted.is_empty() || value.to_lowercase().contains(&wanted.to_lowercase())
    }
}

/// A structured search request. `SearchQuery::default()` matches every
/// token of every sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Wildcard pattern; empty matches everything that passes the filters
    pub pattern: String,
    pub target: MatchTarget,
    pub case_sensitive: bool,
    pub substring: bool,
    /// Allowed UPOS tags (empty = any)
    pub upos: BTreeSet<String>,
    /// Allowed dependency relations (empty = any)
    pub deprels: BTreeSet<String>,
    pub feature: Option<FeatureFilter>,
    /// Inclusive sentence length bounds, in tokens
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            target: MatchTarget::Form,
            case_sensitive: false,
            substring: false,
            upos: BTreeSet::new(),
            deprels: BTreeSet::new(),
            feature: None,
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl SearchQuery {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            ..Self::default()
        }
    }

    pub fn target(mut self, target: MatchTarget) -> Self {
        self.target = target;
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn substring(mut self, yes: bool) -> Self {
        self.substring = yes;
        self
    }

    pub fn upos<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upos = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn deprels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn feature(mut self, key: &str, value: &str) -> Self {
        self.feature = Some(FeatureFilter {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn length(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            substring: self.substring,
        }
    }

    fn accepts_length(&self, len: usize) -> bool {
        (self.min_len..=self.max_len).contains(&len)
    }

    fn accepts_token(&self, token: &Token) -> bool {
        if !self.upos.is_empty() && !self.upos.contains(&token.upos) {
            return false;
        }
        if !self.deprels.is_empty() && !self.deprels.contains(&token.deprel) {
            return false;
        }
        match &self.feature {
            Some(filter) => filter.accepts(token),
            None => true,
        }
    }

    fn subject<'t>(&self, token: &'t Token) -> &'t str {
        match self.target {
            MatchTarget::Form => &token.form,
            MatchTarget::Lemma => token.lemma_or_form(),
        }
    }
}

/// Matching tokens of one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceHit {
    pub uid: usize,
    /// Positions into `Sentence::tokens`, ascending
    pub positions: Vec<usize>,
}

/// Sentences with at least one match, in corpus order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub hits: Vec<SentenceHit>,
}

impl SearchResult {
    /// Number of matching sentences
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SentenceHit> {
        self.hits.iter()
    }

    /// Number of matching tokens across all sentences
    pub fn token_count(&self) -> usize {
        self.hits.iter().map(|h| h.positions.len()).sum()
    }

    pub fn uids(&self) -> impl Iterator<Item = usize> + '_ {
        self.hits.iter().map(|h| h.uid)
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a SentenceHit;
    type IntoIter = std::slice::Iter<'a, SentenceHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Search sentences with a structured query
///
/// Sentences are identified in the result by their `uid`, so they should
/// have been through `build_index`. A pattern that fails to compile
/// yields an empty result.
pub fn search(sentences: &[Sentence], query: &SearchQuery) -> SearchResult {
    let matcher = match Matcher::compile(&query.pattern, query.match_options()) {
        Ok(matcher) => matcher,
        Err(e) => {
            warn!("{e}");
            return SearchResult::default();
        }
    };
    search_with(sentences, query, &matcher)
}

/// Search with an already compiled matcher. The matcher's own options
/// decide case handling and substring mode; the query supplies the target
/// and the filters.
pub fn search_with(sentences: &[Sentence], query: &SearchQuery, matcher: &Matcher) -> SearchResult {
    let hits = sentences
        .iter()
        .filter(|sentence| query.accepts_length(sentence.len()))
        .filter_map(|sentence| {
            let positions: Vec<usize> = sentence
                .tokens
                .iter()
                .enumerate()
                .filter(|(_, token)| query.accepts_token(token))
                .filter(|(_, token)| {
                    matcher.matches_everything() || matcher.is_match(query.subject(token))
                })
                .map(|(position, _)| position)
                .collect();
            (!positions.is_empty()).then_some(SentenceHit {
                uid: sentence.uid,
                positions,
            })
        })
        .collect();
    SearchResult { hits }
}

/// One page of a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub hits: &'a [SentenceHit],
    /// Requested page (1-based)
    pub page: usize,
    pub total_pages: usize,
}

impl Page<'_> {
    /// Bring a page number into `[1, total_pages]`
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice out page `page` (1-based; 0 is read as 1) of `page_size` hits.
/// Pages past the end are empty; `total_pages` is never less than 1.
pub fn paginate(result: &SearchResult, page: usize, page_size: usize) -> Page<'_> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total = result.hits.len();
    let total_pages = total.div_ceil(page_size).max(1);

    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Page {
        hits: &result.hits[start..end],
        page,
        total_pages,
    }
}
