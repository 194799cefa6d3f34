//! Line tokenizer shared by every result-file parser.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{ParseError, ParseResult};

/// Longest physical line handed out as one row, in bytes including the
/// newline. Longer lines continue on the next row.
pub const MAX_LINE: usize = 1024;

/// Delimiters for history, load and stability files.
pub const TABLE_DELIMITERS: &str = " :,\t\r\n";

/// Slice files also split on underscores (`Cut_1_at_X`).
pub const SLICE_DELIMITERS: &str = " :,_\t\r\n";

pub type Row = Vec<String>;

/// Split one line on any delimiter character, dropping empty tokens.
pub fn tokenize(line: &str, delimiters: &str) -> Row {
    line.split(|c: char| delimiters.contains(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads rows of tokens with one row of push-back.
pub struct RowScanner<R> {
    reader: R,
    delimiters: &'static str,
    carry: Vec<u8>,
    pushed: Option<Row>,
    line: usize,
}

impl RowScanner<BufReader<File>> {
    pub fn open(path: &Path, what: &'static str, delimiters: &'static str) -> ParseResult<Self> {
        let file = File::open(path).map_err(|source| ParseError::Open {
            what,
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), delimiters))
    }
}

impl<R: BufRead> RowScanner<R> {
    pub fn new(reader: R, delimiters: &'static str) -> Self {
        Self {
            reader,
            delimiters,
            carry: Vec::new(),
            pushed: None,
            line: 0,
        }
    }

    /// Line number of the most recently read row, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next row, `Some(vec![])` for a blank line, `None` at end of input.
    pub fn next_row(&mut self) -> ParseResult<Option<Row>> {
        if let Some(row) = self.pushed.take() {
            return Ok(Some(row));
        }

        let mut buf = std::mem::take(&mut self.carry);
        if buf.is_empty() {
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ParseError::Read {
                    line: self.line + 1,
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
        }

        if buf.len() > MAX_LINE - 1 {
            let mut cut = MAX_LINE - 1;
            while cut > 0 && !is_char_boundary(&buf, cut) {
                cut -= 1;
            }
            self.carry = buf.split_off(cut);
        } else {
            self.line += 1;
        }

        let text = String::from_utf8_lossy(&buf);
        Ok(Some(tokenize(&text, self.delimiters)))
    }

    /// Hand `row` out again on the next call.
    pub fn push_back(&mut self, row: Row) {
        self.pushed = Some(row);
    }
}

fn is_char_boundary(bytes: &[u8], index: usize) -> bool {
    // UTF-8 continuation bytes are 0b10xx_xxxx.
    bytes.get(index).is_none_or(|b| (b & 0xC0) != 0x80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn scanner(text: &str, delims: &'static str) -> RowScanner<Cursor<Vec<u8>>> {
        RowScanner::new(Cursor::new(text.as_bytes().to_vec()), delims)
    }

    #[test]
    fn splits_and_reports_blank_and_eof() {
        let mut s = scanner("Mach_ : 0.3 Mach\n\n  a,b\tc", TABLE_DELIMITERS);
        assert_eq!(s.next_row().unwrap(), Some(vec!["Mach_".into(), "0.3".into(), "Mach".into()]));
        assert_eq!(s.next_row().unwrap(), Some(vec![]));
        assert_eq!(s.next_row().unwrap(), Some(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(s.line(), 3);
        assert_eq!(s.next_row().unwrap(), None);
    }

    #[test]
    fn slice_delimiters_split_underscores() {
        let row = tokenize("BLOCK Cut_1_at_X:_2.000000\n", SLICE_DELIMITERS);
        assert_eq!(row, vec!["BLOCK", "Cut", "1", "at", "X", "2.000000"]);
    }

    #[test]
    fn crlf_is_stripped() {
        assert_eq!(tokenize("1 2\r\n", TABLE_DELIMITERS), vec!["1", "2"]);
    }

    #[test]
    fn push_back_returns_row_once() {
        let mut s = scanner("a\nb\n", TABLE_DELIMITERS);
        let a = s.next_row().unwrap().unwrap();
        s.push_back(a.clone());
        assert_eq!(s.next_row().unwrap(), Some(a));
        assert_eq!(s.next_row().unwrap(), Some(vec!["b".to_string()]));
    }

    #[test]
    fn long_lines_continue_on_next_row() {
        let long = format!("{} tail\n", "x".repeat(MAX_LINE + 10));
        let mut s = scanner(&long, TABLE_DELIMITERS);
        let first = s.next_row().unwrap().unwrap();
        assert_eq!(first[0].len(), MAX_LINE - 1);
        let second = s.next_row().unwrap().unwrap();
        assert_eq!(second, vec!["x".repeat(11), "tail".to_string()]);
        assert_eq!(s.next_row().unwrap(), None);
    }

    proptest! {
        #[test]
        fn tokens_never_contain_delimiters(line in "[a-z0-9 :,\t_.]{0,80}") {
            for t in tokenize(&line, SLICE_DELIMITERS) {
                prop_assert!(!t.is_empty());
                prop_assert!(!t.contains(|c: char| SLICE_DELIMITERS.contains(c)));
            }
        }
    }
}
