//! Line-oriented reading and whitespace tokenization shared by the text
//! readers.
//!
//! Both interchange formats are strictly positional: a fixed number of lines
//! per block and a fixed number of tokens per line. [`LineSource`] hands out
//! one [`Line`] at a time and remembers where it is, so every parse failure
//! can name the file and the 1-based line it came from.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::BridgeError;

/// A forward-only reader over the lines of one text stream.
pub(crate) struct LineSource<R> {
    reader: R,
    path: PathBuf,
    line_num: usize,
    buf: String,
}

impl<R: BufRead> LineSource<R> {
    pub(crate) fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line_num: 0,
            buf: String::new(),
        }
    }

    /// Loads the next line into the buffer; `false` at end of stream.
    fn advance(&mut self) -> Result<bool, BridgeError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(false);
        }
        self.line_num += 1;
        Ok(true)
    }

    fn current(&self) -> Line<'_> {
        Line {
            text: self.buf.trim_end_matches(['\n', '\r']),
            path: &self.path,
            number: self.line_num,
        }
    }

    /// Reads the next line; running out of input is a parse error.
    pub(crate) fn next_line(&mut self, what: &str) -> Result<Line<'_>, BridgeError> {
        if !self.advance()? {
            return Err(BridgeError::Parse {
                path: self.path.clone(),
                line: self.line_num + 1,
                message: format!("unexpected end of file, expected {what}"),
            });
        }
        Ok(self.current())
    }

    /// Checks that the next line is exactly `token` (surrounding whitespace
    /// ignored).
    pub(crate) fn expect_magic(&mut self, token: &'static str) -> Result<(), BridgeError> {
        let found = if self.advance()? {
            self.current().text.trim()
        } else {
            ""
        };
        if found != token {
            return Err(BridgeError::Format {
                path: self.path.clone(),
                expected: token,
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Discards `count` lines whose content is not interpreted.
    pub(crate) fn skip(&mut self, count: usize, what: &str) -> Result<(), BridgeError> {
        for _ in 0..count {
            self.next_line(what)?;
        }
        Ok(())
    }

    /// Discards one line if there is one; end of stream is accepted.
    pub(crate) fn skip_trailing(&mut self) -> Result<(), BridgeError> {
        self.advance()?;
        Ok(())
    }

    /// Reads a line holding a single non-negative count.
    pub(crate) fn next_count(&mut self, field: &str) -> Result<usize, BridgeError> {
        self.next_line(field)?.single(field)
    }
}

/// One line of input together with its location.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Line<'a> {
    text: &'a str,
    path: &'a Path,
    number: usize,
}

impl<'a> Line<'a> {
    #[cfg(any(test, feature = "fuzzing"))]
    pub(crate) fn new(text: &'a str, path: &'a Path, number: usize) -> Self {
        Self { text, path, number }
    }

    pub(crate) fn tokens(&self) -> Vec<&'a str> {
        self.text.split_whitespace().collect()
    }

    /// Tokenizes the line and requires exactly `expected` tokens.
    pub(crate) fn exact_tokens(
        &self,
        expected: usize,
        what: &str,
    ) -> Result<Vec<&'a str>, BridgeError> {
        let tokens = self.tokens();
        if tokens.len() != expected {
            return Err(self.error(format!(
                "expected {expected} tokens for {what}, found {}",
                tokens.len()
            )));
        }
        Ok(tokens)
    }

    /// Tokenizes the line and returns the first `expected` tokens; extra
    /// trailing tokens are allowed.
    pub(crate) fn leading_tokens(
        &self,
        expected: usize,
        what: &str,
    ) -> Result<Vec<&'a str>, BridgeError> {
        let mut tokens = self.tokens();
        if tokens.len() < expected {
            return Err(self.error(format!(
                "expected at least {expected} tokens for {what}, found {}",
                tokens.len()
            )));
        }
        tokens.truncate(expected);
        Ok(tokens)
    }

    /// Parses the whole (trimmed) line as one value.
    pub(crate) fn single<T: FromStr>(&self, field: &str) -> Result<T, BridgeError> {
        self.parse(self.text.trim(), field)
    }

    /// Parses one token, naming the field in the error.
    pub(crate) fn parse<T: FromStr>(&self, raw: &str, field: &str) -> Result<T, BridgeError> {
        raw.parse::<T>().map_err(|_| {
            self.error(format!(
                "invalid {field} '{raw}'; expected {}",
                expected_kind::<T>()
            ))
        })
    }

    /// Parses a fixed group of floating-point tokens.
    pub(crate) fn parse_f64s<const N: usize>(
        &self,
        tokens: &[&str],
        fields: [&str; N],
    ) -> Result<[f64; N], BridgeError> {
        debug_assert!(tokens.len() >= N);
        let mut values = [0.0; N];
        for ((value, raw), field) in values.iter_mut().zip(tokens).zip(fields) {
            *value = self.parse(raw, field)?;
        }
        Ok(values)
    }

    /// Parses every token on the line as an integer.
    pub(crate) fn parse_all_i32(&self, field: &str) -> Result<Vec<i32>, BridgeError> {
        self.text
            .split_whitespace()
            .map(|raw| self.parse(raw, field))
            .collect()
    }

    /// Converts a loop counter into a record index.
    pub(crate) fn record_index(&self, counter: usize) -> Result<i32, BridgeError> {
        i32::try_from(counter)
            .map_err(|_| self.error(format!("record index {counter} does not fit in i32")))
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> BridgeError {
        BridgeError::Parse {
            path: self.path.to_path_buf(),
            line: self.number,
            message: message.into(),
        }
    }
}

fn expected_kind<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    if name.starts_with('f') {
        "floating-point number"
    } else if name.starts_with('u') {
        "non-negative integer"
    } else {
        "integer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> LineSource<&[u8]> {
        LineSource::new(text.as_bytes(), Path::new("test.txt"))
    }

    #[test]
    fn magic_accepts_surrounding_whitespace() {
        let mut src = source("  NVM_V3 \r\n");
        src.expect_magic("NVM_V3").expect("magic should match");
    }

    #[test]
    fn magic_mismatch_is_format_error() {
        let mut src = source("NVM_V2\n");
        let err = src.expect_magic("NVM_V3").unwrap_err();
        match err {
            BridgeError::Format {
                expected, found, ..
            } => {
                assert_eq!(expected, "NVM_V3");
                assert_eq!(found, "NVM_V2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn magic_on_empty_stream_is_format_error() {
        let err = source("").expect_magic("PATCHES").unwrap_err();
        assert!(matches!(err, BridgeError::Format { .. }));
    }

    #[test]
    fn next_line_reports_line_number_at_eof() {
        let mut src = source("a\nb\n");
        src.skip(2, "header").expect("two lines available");
        match src.next_line("count").unwrap_err() {
            BridgeError::Parse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("count"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn next_count_rejects_negative_values() {
        let err = source("-4\n").next_count("ncam").unwrap_err();
        assert!(matches!(err, BridgeError::Parse { line: 1, .. }));
    }

    #[test]
    fn skip_trailing_accepts_end_of_stream() {
        let mut src = source("");
        src.skip_trailing().expect("eof is fine");
    }

    #[test]
    fn exact_tokens_checks_arity() {
        let path = Path::new("x");
        let line = Line::new("1 2 3", path, 9);
        assert_eq!(line.exact_tokens(3, "position").expect("arity"), ["1", "2", "3"]);
        let err = line.exact_tokens(4, "position").unwrap_err();
        assert!(matches!(err, BridgeError::Parse { line: 9, .. }));
    }

    #[test]
    fn parse_names_the_field() {
        let path = Path::new("x");
        let line = Line::new("1.0 abc", path, 2);
        let err = line.parse_f64s(&line.tokens(), ["x", "y"]).unwrap_err();
        assert!(err.to_string().contains("invalid y 'abc'"));
    }

    #[test]
    fn parse_all_i32_keeps_order() {
        let path = Path::new("x");
        let line = Line::new(" 3 7  -2 ", path, 1);
        assert_eq!(line.parse_all_i32("camera index").expect("ints"), vec![3, 7, -2]);
        assert!(Line::new("", path, 1)
            .parse_all_i32("camera index")
            .expect("empty")
            .is_empty());
    }
}
