use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Location of the read cursor within one input file.
///
/// Updated in place by every read primitive; each file handle owns its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub source: String,
    pub line: u64,
    pub col: u64,
}

impl Position {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line: 0,
            col: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file: {}, line: {}, column: {}",
            self.source, self.line, self.col
        )
    }
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("malformed file")]
    MalformedFile,
    #[error("malformed file: missing ID")]
    MissingId,
    #[error("malformed file: missing sequence")]
    MissingSequence,
    #[error("malformed file: missing quality scores")]
    MissingQuality,
    #[error("malformed file: bad quality score token {token:?}")]
    BadQualityToken { token: String },
    #[error(
        "malformed file: sequence length ({seq}) does not match the number of quality scores ({quals})"
    )]
    LengthMismatch { seq: usize, quals: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error ({pos}): {source}")]
    Io {
        #[source]
        source: io::Error,
        pos: Position,
    },
    #[error("parse error ({pos}): {source}")]
    Parse {
        #[source]
        source: ParseErrorKind,
        pos: Position,
    },
    #[error("failed to write output: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io_err(source: io::Error, pos: Position) -> Self {
        Self::Io { source, pos }
    }
    pub(crate) fn parse_err(source: ParseErrorKind, pos: Position) -> Self {
        Self::Parse { source, pos }
    }
}
