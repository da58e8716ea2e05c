//! Low-level text helpers shared by the parser
//!
//! Line splitting is done with `memchr` so that very large treebanks are
//! scanned without per-character branching.

use memchr::{memchr2, memchr2_iter};

/// Iterator over the physical lines of a text, accepting `\n`, `\r\n`
/// and bare `\r` as terminators. Terminators are not included.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text.as_bytes()[self.pos..];
        match memchr2(b'\n', b'\r', rest) {
            Some(i) => {
                let line = &self.text[self.pos..self.pos + i];
                // \r\n counts as a single terminator
                let width = if rest[i] == b'\r' && rest.get(i + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                self.pos += i + width;
                Some(line)
            }
            None => {
                let line = &self.text[self.pos..];
                self.pos = self.text.len();
                Some(line)
            }
        }
    }
}

/// Count the lines `Lines` would yield for `text`
pub fn count_lines(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut last_end = 0;
    let mut skip_lf_at = None;
    for i in memchr2_iter(b'\n', b'\r', bytes) {
        if skip_lf_at == Some(i) {
            last_end = i + 1;
            continue;
        }
        count += 1;
        last_end = i + 1;
        skip_lf_at = (bytes[i] == b'\r').then_some(i + 1);
    }
    if last_end < bytes.len() {
        count += 1;
    }
    count
}

/// Collapse every run of whitespace to a single underscore
pub fn underscore_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Parse the leading decimal digits of a field (`"3"`, `"1-2"` -> 1)
#[inline]
pub fn leading_number(field: &str) -> Option<usize> {
    atoi::atoi::<usize>(field.trim_start().as_bytes())
}
