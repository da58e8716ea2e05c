//! Collocation statistics
//!
//! Tokens are keyed by lemma (falling back to form), lower-cased. For a
//! target key, every other token within `window` positions of an
//! occurrence, inside the same sentence, counts as one co-occurrence.
//!
//! With `N` total tokens, `f(x)` the corpus frequency of `x` and `c` the
//! co-occurrence count:
//!
//! - PMI = log2(c * N / max(1, f(target) * f(ctx)))
//! - E = f(target) * f(ctx) / N
//! - t-score = (c - E) / sqrt(max(1, c))
//!
//! The t-score divides by `sqrt(c)`, not by the usual variance estimate.

use crate::error::UnknownMeasure;
use crate::ngrams::Tally;
use crate::sentence::Sentence;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Association measure used to rank collocates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measure {
    #[serde(rename = "pmi")]
    Pmi,
    #[default]
    #[serde(rename = "t-score", alias = "tscore")]
    TScore,
}

impl FromStr for Measure {
    type Err = UnknownMeasure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pmi" => Ok(Measure::Pmi),
            "t-score" | "tscore" | "t" => Ok(Measure::TScore),
            _ => Err(UnknownMeasure(s.to_string())),
        }
    }
}

/// One collocate of the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollocationRow {
    pub token: String,
    /// Co-occurrences with the target inside the window
    pub count: usize,
    pub pmi: f64,
    pub t_score: f64,
}

impl CollocationRow {
    pub fn score(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Pmi => self.pmi,
            Measure::TScore => self.t_score,
        }
    }
}

#[inline]
fn key(sentence: &Sentence, position: usize) -> String {
    sentence.tokens[position].lemma_or_form().to_lowercase()
}

/// Collocates of `target` within `window` tokens either side, ranked by
/// `measure` (ties keep first-seen order) and cut to `top`
pub fn collocations(
    sentences: &[Sentence],
    target: &str,
    window: usize,
    top: usize,
    measure: Measure,
) -> Vec<CollocationRow> {
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return Vec::new();
    }

    let mut total_tokens = 0usize;
    let mut target_count = 0usize;
    let mut marginal = Tally::default();
    let mut co = Tally::default();

    for sentence in sentences {
        let keys: Vec<String> = (0..sentence.tokens.len())
            .map(|i| key(sentence, i))
            .collect();
        for (idx, k) in keys.iter().enumerate() {
            total_tokens += 1;
            marginal.add(k.clone());
            if *k != target {
                continue;
            }
            target_count += 1;
            let start = idx.saturating_sub(window);
            let end = idx.saturating_add(window).min(keys.len() - 1);
            for (j, ctx) in keys.iter().enumerate().take(end + 1).skip(start) {
                if j != idx {
                    co.add(ctx.clone());
                }
            }
        }
    }

    if total_tokens == 0 {
        return Vec::new();
    }
    let n = total_tokens as f64;
    let f_target = target_count as f64;

    let mut rows: Vec<CollocationRow> = co
        .into_entries()
        .into_iter()
        .map(|(token, count)| {
            let f_ctx = marginal.get(&token).max(1) as f64;
            let c = count as f64;
            let pmi = (c * n / (f_target * f_ctx).max(1.0)).log2();
            let expected = f_target * f_ctx / n;
            let t_score = (c - expected) / c.max(1.0).sqrt();
            CollocationRow {
                token,
                count,
                pmi,
                t_score,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.score(measure).total_cmp(&a.score(measure)));
    rows.truncate(top);
    rows
}
