use conllu_explorer::{
    Measure, SearchQuery, Snapshot, TokenSource, build_index, collocations, ngrams, parse_conllu,
    search,
};
use divan::{Bencher, black_box};

fn main() {
    divan::main();
}

const WORDS: [(&str, &str, &str); 8] = [
    ("The", "the", "DET"),
    ("dog", "dog", "NOUN"),
    ("chased", "chase", "VERB"),
    ("a", "a", "DET"),
    ("cat", "cat", "NOUN"),
    ("running", "run", "VERB"),
    ("quickly", "quickly", "ADV"),
    (".", ".", "PUNCT"),
];

/// Synthetic treebank of `n` sentences
fn synthetic(n: usize) -> String {
    let mut text = String::new();
    for s in 0..n {
        text.push_str(&format!("# sent_id = s{s}\n"));
        let len = 3 + s % 12;
        for i in 0..len {
            let (form, lemma, upos) = WORDS[(s + i * 3) % WORDS.len()];
            text.push_str(&format!(
                "{}\t{form}\t{lemma}\t{upos}\t_\tNumber=Sing\t0\tdep\t_\t_\n",
                i + 1
            ));
        }
        text.push('\n');
    }
    text
}

#[divan::bench(sample_count = 10)]
fn parse(bencher: Bencher) {
    let text = synthetic(20_000);
    bencher.bench_local(|| black_box(parse_conllu(black_box(&text), "train")));
}

#[divan::bench(sample_count = 10)]
fn index(bencher: Bencher) {
    let sentences = parse_conllu(&synthetic(20_000), "train");
    bencher.bench_local(|| {
        let mut sentences = sentences.clone();
        black_box(build_index(&mut sentences))
    });
}

#[divan::bench(sample_count = 10)]
fn wildcard_search(bencher: Bencher) {
    let snapshot = Snapshot::build(parse_conllu(&synthetic(20_000), "train"));
    let query = SearchQuery::new("c*t").upos(["NOUN"]);
    bencher.bench_local(|| black_box(search(snapshot.sentences(), &query)));
}

#[divan::bench(sample_count = 10)]
fn trigrams(bencher: Bencher) {
    let snapshot = Snapshot::build(parse_conllu(&synthetic(20_000), "train"));
    bencher.bench_local(|| black_box(ngrams(TokenSource::Corpus(snapshot.sentences()), 3, 30)));
}

#[divan::bench(sample_count = 10)]
fn collocates(bencher: Bencher) {
    let snapshot = Snapshot::build(parse_conllu(&synthetic(20_000), "train"));
    bencher.bench_local(|| {
        black_box(collocations(snapshot.sentences(), "cat", 2, 30, Measure::TScore))
    });
}
