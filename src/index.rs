//! Inverted indices and frequency tables over a loaded corpus
//!
//! The index is built once per load and never updated. Hits refer back
//! into the sentence store by `(uid, position)`.

use crate::sentence::Sentence;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// One occurrence of a form or lemma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Hit {
    /// Sentence uid
    pub uid: usize,
    /// Token position within the sentence (0-based)
    pub position: usize,
}

/// Which frequency table to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Upos,
    Lemma,
    Form,
}

impl ChartKind {
    /// Number of bars a chart of this kind shows by default
    pub fn default_limit(self) -> usize {
        match self {
            ChartKind::Upos => 30,
            ChartKind::Lemma | ChartKind::Form => 25,
        }
    }
}

/// Table sizes, for logging and status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub sentences: usize,
    pub tokens: usize,
    pub forms: usize,
    pub lemmas: usize,
    pub upos_tags: usize,
}

/// Read-only index over a frozen sentence sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    form_hits: FxHashMap<String, Vec<Hit>>,
    lemma_hits: FxHashMap<String, Vec<Hit>>,
    form_counts: FxHashMap<String, usize>,
    lemma_counts: FxHashMap<String, usize>,
    upos_counts: FxHashMap<String, usize>,
    feat_keys: BTreeSet<String>,
    upos_tags: BTreeSet<String>,
    deprels: BTreeSet<String>,
    sentence_count: usize,
    token_count: usize,
}

/// Assign uids, finalize sentence ids and text, and index the result
pub fn build_index(sentences: &mut [Sentence]) -> Index {
    for (uid, sentence) in sentences.iter_mut().enumerate() {
        sentence.finalize(uid);
    }
    let index = Index::build(sentences);
    let summary = index.summary();
    info!(
        sentences = summary.sentences,
        tokens = summary.tokens,
        forms = summary.forms,
        lemmas = summary.lemmas,
        upos = summary.upos_tags,
        "index built"
    );
    index
}

impl Index {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from sentences whose uids are already assigned
    pub fn build(sentences: &[Sentence]) -> Self {
        let mut index = Self::new();

        for sentence in sentences {
            index.add_sentence(sentence);
        }

        index
    }

    fn add_sentence(&mut self, sentence: &Sentence) {
        self.sentence_count += 1;

        for (position, token) in sentence.tokens.iter().enumerate() {
            let hit = Hit {
                uid: sentence.uid,
                position,
            };
            let form_key = token.form.to_lowercase();
            let lemma_key = if token.lemma.is_empty() {
                form_key.clone()
            } else {
                token.lemma.to_lowercase()
            };

            self.form_hits.entry(form_key.clone()).or_default().push(hit);
            self.lemma_hits
                .entry(lemma_key.clone())
                .or_default()
                .push(hit);
            *self.form_counts.entry(form_key).or_default() += 1;
            *self.lemma_counts.entry(lemma_key).or_default() += 1;

            if !token.upos.is_empty() {
                *self.upos_counts.entry(token.upos.clone()).or_default() += 1;
                if !self.upos_tags.contains(&token.upos) {
                    self.upos_tags.insert(token.upos.clone());
                }
            }
            if !token.deprel.is_empty() && !self.deprels.contains(&token.deprel) {
                self.deprels.insert(token.deprel.clone());
            }
            for key in token.feats.keys() {
                if !self.feat_keys.contains(key) {
                    self.feat_keys.insert(key.to_string());
                }
            }

            self.token_count += 1;
        }
    }

    /// Occurrences of a form, compared case-insensitively
    pub fn form_hits(&self, form: &str) -> &[Hit] {
        self.form_hits
            .get(&form.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Occurrences of a lemma, compared case-insensitively
    pub fn lemma_hits(&self, lemma: &str) -> &[Hit] {
        self.lemma_hits
            .get(&lemma.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn form_count(&self, form: &str) -> usize {
        self.form_counts
            .get(&form.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn lemma_count(&self, lemma: &str) -> usize {
        self.lemma_counts
            .get(&lemma.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// UPOS counts are case-sensitive
    pub fn upos_count(&self, upos: &str) -> usize {
        self.upos_counts.get(upos).copied().unwrap_or(0)
    }

    /// Distinct feature names, sorted
    pub fn feature_keys(&self) -> &BTreeSet<String> {
        &self.feat_keys
    }

    /// Distinct UPOS tags, sorted
    pub fn upos_tags(&self) -> &BTreeSet<String> {
        &self.upos_tags
    }

    /// Distinct dependency relations, sorted
    pub fn deprels(&self) -> &BTreeSet<String> {
        &self.deprels
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_count
    }

    /// The `limit` most frequent entries of a table, by descending count
    /// and then by key
    pub fn top_counts(&self, kind: ChartKind, limit: usize) -> Vec<(&str, usize)> {
        let table = match kind {
            ChartKind::Upos => &self.upos_counts,
            ChartKind::Lemma => &self.lemma_counts,
            ChartKind::Form => &self.form_counts,
        };
        let mut entries: Vec<(&str, usize)> =
            table.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            sentences: self.sentence_count,
            tokens: self.token_count,
            forms: self.form_counts.len(),
            lemmas: self.lemma_counts.len(),
            upos_tags: self.upos_counts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::parse_conllu;

    const DOGS: &str = "# sent_id = d1
1\tThe\tthe\tDET\tDT\tDefinite=Def\t2\tdet\t_\t_
2\tdog\tdog\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\t_
3\tbarks\tbark\tVERB\tVBZ\tTense=Pres\t0\troot\t_\t_

1\tDog\tdog\tNOUN\tNN\t_\t2\tnsubj\t_\t_
2\tsees\tsee\tVERB\tVBZ\t_\t0\troot\t_\t_
3\tdog\tdog\tNOUN\tNN\t_\t2\tobj\t_\t_

1\tdog\tdog\tNOUN\tNN\t_\t0\troot\t_\t_
2\tDog\tdog\tNOUN\tNN\t_\t1\tappos\t_\t_
";

    fn corpus() -> Vec<Sentence> {
        parse_conllu(DOGS, "train")
    }

    #[test]
    fn test_index_building() {
        let mut sentences = corpus();
        let index = build_index(&mut sentences);

        assert_eq!(index.form_count("dog"), 5);
        assert_eq!(index.form_count("DOG"), 5);
        assert_eq!(index.form_hits("dog").len(), 5);
        assert_eq!(index.lemma_count("dog"), 5);
        assert_eq!(index.upos_count("NOUN"), 5);
        assert_eq!(index.upos_count("noun"), 0);
        assert_eq!(index.token_count(), 8);
        assert_eq!(index.sentence_count(), 3);
    }

    #[test]
    fn test_hits_follow_corpus_order() {
        let mut sentences = corpus();
        let index = build_index(&mut sentences);

        let hits: Vec<(usize, usize)> = index
            .form_hits("Dog")
            .iter()
            .map(|h| (h.uid, h.position))
            .collect();
        assert_eq!(hits, vec![(0, 1), (1, 0), (1, 2), (2, 0), (2, 1)]);
        assert!(index.lemma_hits("cat").is_empty());
    }

    #[test]
    fn test_sentence_finalization() {
        let mut sentences = corpus();
        build_index(&mut sentences);

        assert_eq!(sentences[0].uid, 0);
        assert_eq!(sentences[0].id, "d1");
        assert_eq!(sentences[1].id, "s-1");
        assert_eq!(sentences[2].uid, 2);
        assert_eq!(sentences[2].id, "s-2");
    }

    #[test]
    fn test_category_sets() {
        let mut sentences = corpus();
        let index = build_index(&mut sentences);

        let upos: Vec<_> = index.upos_tags().iter().map(String::as_str).collect();
        assert_eq!(upos, vec!["DET", "NOUN", "VERB"]);
        let feats: Vec<_> = index.feature_keys().iter().map(String::as_str).collect();
        assert_eq!(feats, vec!["Definite", "Number", "Tense"]);
        assert!(index.deprels().contains("appos"));
        assert_eq!(index.deprels().len(), 5);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut sentences = corpus();
        let first = build_index(&mut sentences);
        let snapshot = sentences.clone();
        let second = build_index(&mut sentences);

        assert_eq!(first, second);
        assert_eq!(sentences, snapshot);
    }

    #[test]
    fn test_top_counts() {
        let mut sentences = corpus();
        let index = build_index(&mut sentences);

        let top = index.top_counts(ChartKind::Upos, 2);
        assert_eq!(top, vec![("NOUN", 5), ("VERB", 2)]);

        let forms = index.top_counts(ChartKind::Form, ChartKind::Form.default_limit());
        assert_eq!(forms[0], ("dog", 5));
        // ties are broken by key
        assert_eq!(forms[1], ("barks", 1));
        assert_eq!(forms.len(), 4);
    }

    #[test]
    fn test_empty_corpus() {
        let index = build_index(&mut []);
        assert_eq!(index.token_count(), 0);
        assert!(index.top_counts(ChartKind::Lemma, 10).is_empty());
        assert!(index.upos_tags().is_empty());
    }

    #[test]
    fn test_summary() {
        let mut sentences = corpus();
        let summary = build_index(&mut sentences).summary();
        assert_eq!(
            summary,
            IndexSummary {
                sentences: 3,
                tokens: 8,
                forms: 4,
                lemmas: 4,
                upos_tags: 3,
            }
        );
    }
}
