//! CoNLL-U parsing
//!
//! Parses CoNLL-U text into `Sentence` records. The reader is tolerant:
//! rows with fewer than 8 columns are dropped, unparseable numbers become
//! `None`, and blocks without any token rows produce no sentence.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::bytes::{Lines, count_lines, leading_number, underscore_whitespace};
use crate::sentence::{Features, Sentence, Token};

/// Number of lines between two progress events
pub const PROGRESS_INTERVAL: usize = 500;

/// Columns that must be present for a token row to be kept
const MIN_COLUMNS: usize = 8;

/// Accumulates lines into the sentence currently being read
#[derive(Debug)]
struct Accumulator {
    split: String,
    current: Option<Sentence>,
}

impl Accumulator {
    fn new(split: &str) -> Self {
        Self {
            split: split.to_string(),
            current: None,
        }
    }

    fn current(&mut self) -> &mut Sentence {
        let split = &self.split;
        self.current.get_or_insert_with(|| Sentence::new(split))
    }

    /// Feed one physical line; returns a sentence when a blank line
    /// completes one
    fn push_line(&mut self, line: &str) -> Option<Sentence> {
        if line.trim().is_empty() {
            return self.flush();
        }

        if line.starts_with('#') {
            if let Some((key, value)) = parse_comment(line) {
                self.current().meta.insert(key, value);
            }
            return None;
        }

        let token = parse_token(line);
        let sentence = self.current();
        if let Some(token) = token {
            sentence.tokens.push(token);
        }
        None
    }

    fn flush(&mut self) -> Option<Sentence> {
        self.current.take().filter(|s| !s.tokens.is_empty())
    }
}

/// CoNLL-U reader that iterates over the sentences of an in-memory text
pub struct ConlluReader<'a> {
    lines: Lines<'a>,
    acc: Accumulator,
    line_num: usize,
    total_lines: usize,
}

impl<'a> ConlluReader<'a> {
    /// Create a reader over `text`, tagging every sentence with `split`.
    /// A leading byte order mark is skipped.
    pub fn new(text: &'a str, split: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: Lines::new(text),
            acc: Accumulator::new(split),
            line_num: 0,
            total_lines: count_lines(text),
        }
    }

    /// Lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_num
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Fraction of lines consumed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.total_lines == 0 {
            1.0
        } else {
            self.line_num as f64 / self.total_lines as f64
        }
    }

    /// Turn the reader into a stream of progress events
    pub fn events(self) -> ParseEvents<'a> {
        ParseEvents {
            reader: self,
            sentences: Vec::new(),
            next_report: PROGRESS_INTERVAL,
            state: EventState::Reading,
        }
    }
}

impl Iterator for ConlluReader<'_> {
    type Item = Sentence;

    fn next(&mut self) -> Option<Sentence> {
        // Read lines until a blank line completes a sentence, or EOF
        loop {
            match self.lines.next() {
                Some(line) => {
                    self.line_num += 1;
                    if let Some(sentence) = self.acc.push_line(line) {
                        return Some(sentence);
                    }
                }
                None => return self.acc.flush(),
            }
        }
    }
}

/// Event yielded while parsing a whole text
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// Fraction of lines consumed so far
    Progress(f64),
    /// All sentences, in source order. Always the last event.
    Finished(Vec<Sentence>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventState {
    Reading,
    Complete,
    Done,
}

/// Lazy parse that interleaves progress reports with the work. Dropping it
/// early simply stops parsing.
pub struct ParseEvents<'a> {
    reader: ConlluReader<'a>,
    sentences: Vec<Sentence>,
    next_report: usize,
    state: EventState,
}

impl Iterator for ParseEvents<'_> {
    type Item = ParseEvent;

    fn next(&mut self) -> Option<ParseEvent> {
        match self.state {
            EventState::Done => None,
            EventState::Complete => {
                self.state = EventState::Done;
                Some(ParseEvent::Finished(std::mem::take(&mut self.sentences)))
            }
            EventState::Reading => loop {
                if self.reader.lines_read() >= self.next_report {
                    self.next_report =
                        (self.reader.lines_read() / PROGRESS_INTERVAL + 1) * PROGRESS_INTERVAL;
                    return Some(ParseEvent::Progress(self.reader.progress()));
                }
                match self.reader.next() {
                    Some(sentence) => self.sentences.push(sentence),
                    None => {
                        self.state = EventState::Complete;
                        return Some(ParseEvent::Progress(1.0));
                    }
                }
            },
        }
    }
}

/// Parse a whole text into sentences
pub fn parse_conllu(text: &str, split: &str) -> Vec<Sentence> {
    ConlluReader::new(text, split).collect()
}

/// Parse a comment line of the form `# key = value`
fn parse_comment(line: &str) -> Option<(String, String)> {
    let body = line.trim_start_matches('#');
    let (key, value) = body.split_once('=')?;
    let key = underscore_whitespace(key.trim());
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().to_string()))
}

/// Parse a token row; `None` if it has too few columns
fn parse_token(line: &str) -> Option<Token> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return None;
    }

    let form = fields[1].to_string();
    let lemma = match fields[2] {
        "" | "_" => form.clone(),
        lemma => lemma.to_string(),
    };

    Some(Token {
        id: leading_number(fields[0]),
        form,
        lemma,
        upos: fields[3].to_string(),
        xpos: fields[4].to_string(),
        feats: parse_features(fields[5]),
        head: leading_number(fields[6]),
        deprel: fields[7].to_string(),
        misc: fields.get(9).map(|s| s.to_string()).unwrap_or_default(),
    })
}

/// Parse the FEATS column (`Key=Value|Key=Value`)
pub fn parse_features(s: &str) -> Features {
    let mut feats = Features::new();

    if matches!(s, "" | "_" | "-") {
        return feats;
    }

    for pair in s.split('|') {
        if let Some((key, value)) = pair.split_once('=') {
            if !key.is_empty() && !value.is_empty() {
                feats.insert(key, value);
            }
        }
    }

    feats
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SENTENCES: &str = "# sent_id = a-1
# text = The dog runs.
1\tThe\tthe\tDET\tDT\tDefinite=Def|PronType=Art\t2\tdet\t_\t_
2\tdog\tdog\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\t_
3\truns\trun\tVERB\tVBZ\t_\t0\troot\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_

# text = Cats sleep.
1\tCats\tcat\tNOUN\tNNS\tNumber=Plur\t2\tnsubj\t_\t_
2\tsleep\tsleep\tVERB\tVBP\t_\t0\troot\t_\t_
";

    #[test]
    fn test_parse_simple_sentence() {
        let sentences = parse_conllu(TWO_SENTENCES, "train");

        assert_eq!(sentences.len(), 2);
        let first = &sentences[0];
        assert_eq!(first.split, "train");
        assert_eq!(first.tokens.len(), 4);
        assert_eq!(first.meta.get("sent_id").map(String::as_str), Some("a-1"));
        assert_eq!(
            first.meta.get("text").map(String::as_str),
            Some("The dog runs.")
        );

        let runs = &first.tokens[2];
        assert_eq!(runs.form, "runs");
        assert_eq!(runs.lemma, "run");
        assert_eq!(runs.upos, "VERB");
        assert_eq!(runs.xpos, "VBZ");
        assert_eq!(runs.head, Some(0));
        assert_eq!(runs.deprel, "root");
        assert_eq!(runs.misc, "SpaceAfter=No");
    }

    #[test]
    fn test_trailing_sentence_is_flushed() {
        // second sentence has no terminating blank line
        let sentences = parse_conllu(TWO_SENTENCES, "dev");
        assert_eq!(sentences[1].tokens.len(), 2);
        assert_eq!(sentences[1].tokens[0].form, "Cats");
    }

    #[test]
    fn test_block_count() {
        let text = "1\ta\ta\tX\t_\t_\t0\troot\n\n\n\n\
                    1\tb\tb\tX\t_\t_\t0\troot\n\
                    2\tc\tc\tX\t_\t_\t1\tdep\n\n\
                    1\td\td\tX\t_\t_\t0\troot\n\n";
        let sentences = parse_conllu(text, "test");
        assert_eq!(sentences.len(), 3);
        assert_eq!(
            sentences.iter().map(Sentence::len).collect::<Vec<_>>(),
            vec![1, 2, 1]
        );
    }

    #[test]
    fn test_ids_increase_in_source_order() {
        let sentences = parse_conllu(TWO_SENTENCES, "train");
        for sent in &sentences {
            let ids: Vec<_> = sent.tokens.iter().map(|t| t.id.unwrap()).collect();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(ids[0], 1);
        }
    }

    #[test]
    fn test_metadata_only_block_is_dropped() {
        let text = "# newdoc id = d1\n# sent_id = x\n\n1\ta\ta\tX\t_\t_\t0\troot\t_\t_\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].meta.is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let text = "1\ttoo\tfew\tcolumns\n\
                    2\tok\tok\tX\t_\t_\t0\troot\n\
                    garbage\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].tokens.len(), 1);
        assert_eq!(sentences[0].tokens[0].form, "ok");
    }

    #[test]
    fn test_block_of_malformed_rows_only() {
        let text = "# sent_id = x\n1\tbad\n\n";
        assert!(parse_conllu(text, "train").is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let text = "# text = hi\r\n1\thi\thi\tINTJ\t_\t_\t0\troot\t_\t_\r\n\r\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].tokens[0].misc, "_");
        assert_eq!(sentences[0].meta["text"], "hi");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let text = "\u{feff}# sent_id = first\n# text = Hi\n1\tHi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences[0].meta.get("sent_id").map(String::as_str), Some("first"));
        assert_eq!(sentences[0].meta.len(), 2);

        let text = "\u{feff}1\tHi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences[0].tokens[0].id, Some(1));
        assert_eq!(sentences[0].tokens[0].form, "Hi");
    }

    #[test]
    fn test_non_numeric_columns() {
        let text = "1-2\tdon't\t_\t_\t_\t_\t_\t_\t_\t_\n\
                    x\tdo\tdo\tAUX\t_\t_\troot?\taux\t_\t_\n";
        let sentences = parse_conllu(text, "train");
        let toks = &sentences[0].tokens;
        assert_eq!(toks[0].id, Some(1));
        assert_eq!(toks[0].lemma, "don't");
        assert_eq!(toks[0].head, None);
        assert_eq!(toks[1].id, None);
        assert_eq!(toks[1].head, None);
        assert_eq!(toks[1].governor(), None);
    }

    #[test]
    fn test_parse_comment() {
        assert_eq!(
            parse_comment("# sent_id = s1"),
            Some(("sent_id".to_string(), "s1".to_string()))
        );
        assert_eq!(
            parse_comment("## source  file =  a = b "),
            Some(("source_file".to_string(), "a = b".to_string()))
        );
        assert_eq!(parse_comment("# newdoc"), None);
        assert_eq!(parse_comment("#  = value"), None);
    }

    #[test]
    fn test_duplicate_metadata_overwrites() {
        let text = "# text = one\n# text = two\n1\ta\ta\tX\t_\t_\t0\troot\n";
        let sentences = parse_conllu(text, "train");
        assert_eq!(sentences[0].meta["text"], "two");
    }

    #[test]
    fn test_parse_features() {
        let feats = parse_features("Case=Nom|Number=Sing");
        assert_eq!(feats.len(), 2);
        assert_eq!(feats.get("Case"), Some("Nom"));
        assert_eq!(feats.get("Number"), Some("Sing"));

        assert!(parse_features("_").is_empty());
        assert!(parse_features("-").is_empty());
        assert!(parse_features("").is_empty());
    }

    #[test]
    fn test_parse_features_drops_incomplete_segments() {
        let feats = parse_features("Case=|=Nom|Foo|Mood=Ind");
        assert_eq!(feats.len(), 1);
        assert_eq!(feats.get("Mood"), Some("Ind"));
    }

    #[test]
    fn test_events_end_with_finished() {
        let events: Vec<_> = ConlluReader::new(TWO_SENTENCES, "train")
            .events()
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ParseEvent::Progress(1.0));
        match &events[1] {
            ParseEvent::Finished(sentences) => assert_eq!(sentences.len(), 2),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_events_report_progress_periodically() {
        let mut text = String::new();
        for i in 0..600 {
            text.push_str(&format!("1\tw{i}\tw\tX\t_\t_\t0\troot\t_\t_\n\n"));
        }
        let events: Vec<_> = ConlluReader::new(&text, "train").events().collect();

        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                ParseEvent::Progress(p) => Some(*p),
                ParseEvent::Finished(_) => None,
            })
            .collect();
        // 1200 lines -> reports near 500, 1000, then the final 1.0
        assert_eq!(fractions.len(), 3);
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(*fractions.last().unwrap(), 1.0);

        let Some(ParseEvent::Finished(sentences)) = events.last() else {
            panic!("missing Finished event");
        };
        assert_eq!(*sentences, parse_conllu(&text, "train"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_conllu("", "train").is_empty());
        assert!(parse_conllu("\n\n  \n", "train").is_empty());
        let reader = ConlluReader::new("", "train");
        assert_eq!(reader.progress(), 1.0);
    }
}
