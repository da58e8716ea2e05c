//! Sentence and token records
//!
//! Sentences own their tokens outright; everything else in the crate
//! refers to them by `(uid, position)` rather than by reference.

use serde::Serialize;
use std::collections::BTreeMap;

/// Morphological features of a token (FEATS column)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Features(BTreeMap<String, String>);

impl Features {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Features {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A single token line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// ID column; `None` if it did not start with a number
    pub id: Option<usize>,
    pub form: String,
    /// Falls back to the form when the column is `_` or empty
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: Features,
    /// HEAD column; `Some(0)` is the root, `None` if unparseable
    pub head: Option<usize>,
    pub deprel: String,
    pub misc: String,
}

impl Token {
    /// Build a token with the given surface columns and no syntax
    pub fn new(id: usize, form: &str, lemma: &str, upos: &str) -> Self {
        Self {
            id: Some(id),
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: upos.to_string(),
            xpos: String::new(),
            feats: Features::new(),
            head: None,
            deprel: String::new(),
            misc: String::new(),
        }
    }

    /// Lemma, or the form if the lemma is empty
    #[inline]
    pub fn lemma_or_form(&self) -> &str {
        if self.lemma.is_empty() {
            &self.form
        } else {
            &self.lemma
        }
    }

    /// ID of the governing token, if there is one
    #[inline]
    pub fn governor(&self) -> Option<usize> {
        self.head.filter(|&h| h > 0)
    }
}

/// A dependency edge between two tokens of the same sentence, expressed
/// as positions into `Sentence::tokens`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyArc<'a> {
    pub head: usize,
    pub dependent: usize,
    pub deprel: &'a str,
}

/// A sentence (one blank-line-delimited block)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Position in the loaded corpus, assigned by `build_index`
    pub uid: usize,
    pub id: String,
    pub text: String,
    /// Name of the split the sentence was loaded from
    pub split: String,
    pub tokens: Vec<Token>,
    pub meta: BTreeMap<String, String>,
}

impl Sentence {
    pub fn new(split: &str) -> Self {
        Self {
            split: split.to_string(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Position of the token whose ID column equals `id`
    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.tokens.iter().position(|t| t.id == Some(id))
    }

    /// Dependency arcs of the sentence in token order. Tokens attached to
    /// the root, or whose head does not name a token here, are skipped.
    pub fn arcs(&self) -> Vec<DependencyArc<'_>> {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(dependent, token)| {
                let head = self.position_of(token.governor()?)?;
                Some(DependencyArc {
                    head,
                    dependent,
                    deprel: &token.deprel,
                })
            })
            .collect()
    }

    /// Fill in `uid`, and default `id`/`text` from metadata
    pub(crate) fn finalize(&mut self, uid: usize) {
        self.uid = uid;
        if self.text.is_empty() {
            if let Some(text) = self.meta.get("text") {
                self.text = text.clone();
            }
        }
        if self.id.is_empty() {
            self.id = match self.meta.get("sent_id") {
                Some(id) => id.clone(),
                None => format!("s-{uid}"),
            };
        }
    }
}
