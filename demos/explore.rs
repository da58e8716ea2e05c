//! Load a treebank and print a quick overview
//!
//! Usage:
//!   cargo run --example explore -- [CONFIG.json | GLOB] [PATTERN]
//!
//! With a `.json` argument the splits come from that config; any other
//! argument is a glob of CoNLL-U files (e.g. `data/*-ud-*.conllu`).
//! Without arguments the default config is used.

use conllu_explorer::{
    ChartKind, CorpusConfig, FileFetcher, MatchTarget, Scope, SearchQuery, Session, SplitSource,
};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(arg) if arg.ends_with(".json") => CorpusConfig::from_file(&arg)?,
        Some(pattern) => CorpusConfig {
            splits: SplitSource::discover(&pattern)?,
            ..CorpusConfig::default()
        },
        None => CorpusConfig::default(),
    };
    let pattern = args.next().unwrap_or_else(|| "*".to_string());

    let names: Vec<String> = config.splits.iter().map(|s| s.name.clone()).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let session = Session::new(config);

    let snapshot = session
        .reload(&FileFetcher, &names, |split, fraction| {
            info!("loading {split}: {:.0}%", fraction * 100.0);
        })
        .await?;
    for report in snapshot.reports() {
        println!("{}: {} sentences", report.split, report.sentences);
    }

    println!("\nTop UPOS tags:");
    for (tag, count) in snapshot.index().top_counts(ChartKind::Upos, 10) {
        println!("  {tag:<8} {count}");
    }

    let query = SearchQuery::new(&pattern).target(MatchTarget::Lemma);
    let result = snapshot.search(&query);
    println!(
        "\nLemma `{pattern}`: {} tokens in {} sentences",
        result.token_count(),
        result.len()
    );
    let page = session.page(&result, 1);
    for (sentence, positions) in snapshot.resolve(page.hits) {
        let words: Vec<String> = sentence
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if positions.contains(&i) {
                    format!("[{}]", t.form)
                } else {
                    t.form.clone()
                }
            })
            .collect();
        println!("  {} ({}): {}", sentence.id, sentence.split, words.join(" "));
    }
    println!("  page {} / {}", page.page, page.total_pages);

    println!("\nTop bigrams in the results:");
    for (gram, count) in session.default_ngrams(&snapshot, Scope::Results(&result)) {
        println!("  {gram:<24} {count}");
    }

    if let Some((lemma, _)) = snapshot.index().top_counts(ChartKind::Lemma, 1).first() {
        println!("\nCollocates of `{lemma}`:");
        for row in session.default_collocations(&snapshot, lemma) {
            println!(
                "  {:<16} {:>5} {:>8.2} {:>8.2}",
                row.token, row.count, row.pmi, row.t_score
            );
        }
    }

    Ok(())
}
