//! N-gram frequency counts
//!
//! Windows of `n` consecutive surface forms, lower-cased and joined with
//! a single space. Windows never cross a sentence boundary. Equal counts
//! keep the order in which the n-grams were first seen.

use crate::searcher::SearchResult;
use crate::sentence::Sentence;
use rustc_hash::FxHashMap;

pub const MIN_ORDER: usize = 1;
pub const MAX_ORDER: usize = 5;

/// Sentences to count over
#[derive(Debug, Clone, Copy)]
pub enum TokenSource<'a> {
    /// Every sentence of the corpus
    Corpus(&'a [Sentence]),
    /// Only the sentences referenced by a search result, looked up by uid
    Results(&'a [Sentence], &'a SearchResult),
}

impl<'a> TokenSource<'a> {
    pub fn sentences(&self) -> Box<dyn Iterator<Item = &'a Sentence> + 'a> {
        match *self {
            TokenSource::Corpus(sentences) => Box::new(sentences.iter()),
            TokenSource::Results(sentences, result) => {
                Box::new(result.uids().filter_map(move |uid| sentences.get(uid)))
            }
        }
    }
}

/// Frequency table that remembers first-seen order
#[derive(Debug, Default)]
pub(crate) struct Tally {
    slots: FxHashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub(crate) fn add(&mut self, key: String) {
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub(crate) fn get(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, |&slot| self.entries[slot].1)
    }

    pub(crate) fn into_entries(self) -> Vec<(String, usize)> {
        self.entries
    }
}

/// The `top` most frequent n-grams of order `n` (clamped to 1..=5), by
/// descending count
pub fn ngrams(source: TokenSource<'_>, n: usize, top: usize) -> Vec<(String, usize)> {
    let n = n.clamp(MIN_ORDER, MAX_ORDER);
    let mut tally = Tally::default();

    for sentence in source.sentences() {
        if sentence.tokens.len() < n {
            continue;
        }
        let forms: Vec<String> = sentence
            .tokens
            .iter()
            .map(|t| t.form.to_lowercase())
            .collect();
        for window in forms.windows(n) {
            tally.add(window.join(" "));
        }
    }

    let mut entries = tally.into_entries();
    // stable sort keeps first-seen order among ties
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(top);
    entries
}
