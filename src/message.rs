//! Parsed message view and header access.
//!
//! MIME parsing itself is delegated to `mailparse`; this module only keeps
//! the resulting header lines in document order and answers lookups on them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures of the acquisition layer. The analysis itself never fails.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("File not found - {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to parse message: {0}")]
    Parse(#[from] mailparse::MailParseError),
}

/// Immutable header view of one message.
///
/// Headers are an ordered multimap: one entry per physical header line, in
/// the order they appear in the source document. Names keep their original
/// spelling; lookups compare them ASCII case-insensitively.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    headers: Vec<(String, String)>,
}

impl ParsedMessage {
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Parse a raw RFC 5322 message. Header values are unfolded but
    /// otherwise kept as written: encoded-words are not decoded.
    pub fn parse(raw: &[u8]) -> Result<Self, AnalyzerError> {
        let mail = mailparse::parse_mail(raw)?;
        let headers = mail
            .headers
            .iter()
            .map(|header| (header.get_key(), unfold(header.get_value_raw())))
            .collect::<Vec<_>>();

        log::debug!("Parsed message with {} header lines", headers.len());
        Ok(Self { headers })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AnalyzerError::NotFound(path.to_path_buf())
            } else {
                AnalyzerError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(&raw)
    }

    /// All values of `name`, in document order. Empty when the header is absent.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// First value of `name` in document order, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Join folded continuation lines: a line break followed by whitespace
/// becomes just the whitespace.
fn unfold(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if matches!(chars.peek(), Some(' ') | Some('\t')) => {}
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}
