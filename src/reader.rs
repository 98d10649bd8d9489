use crate::error::{Error, ParseErrorKind, Position};
use crate::record::SequenceRecord;
use crate::token::TokenReader;
use crate::util::{looks_like_gzip, open_file};

#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Input layout of one parsing channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Interleaved records: `@id`, sequence body, `+`, ASCII-offset quality.
    Fastq,
    /// Sequence-only records: `>id`, line-wrapped sequence body.
    Fasta,
    /// Quality-only records: `>id`, whitespace-separated integer scores.
    Qual,
}

impl FileKind {
    /// Byte that opens a record.
    fn header(self) -> u8 {
        match self {
            FileKind::Fastq => b'@',
            FileKind::Fasta | FileKind::Qual => b'>',
        }
    }

    /// Byte that terminates the sequence body.
    fn separator(self) -> u8 {
        match self {
            FileKind::Fastq => b'+',
            FileKind::Fasta | FileKind::Qual => b'>',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    AwaitingRecord,
    ReadingIdentifier,
    ReadingSequence,
    ReadingQuality,
}

/// One file handle being parsed: read primitives, layout, machine state.
struct Channel {
    tokens: TokenReader,
    kind: FileKind,
    state: ParseState,
}

impl Channel {
    fn new(rdr: Box<dyn BufRead + Send>, source: impl Into<String>, kind: FileKind) -> Self {
        Self {
            tokens: TokenReader::new(rdr, source),
            kind,
            state: ParseState::AwaitingRecord,
        }
    }

    fn io_err(&self, e: io::Error) -> Error {
        Error::io_err(e, self.tokens.pos.clone())
    }

    fn parse_err(&self, kind: ParseErrorKind) -> Error {
        Error::parse_err(kind, self.tokens.pos.clone())
    }

    /// Drive this channel through one full record cycle.
    ///
    /// `Ok(false)` means end of input, which is only legal at a record
    /// boundary; any structural problem inside a record is a hard error.
    fn run_cycle(&mut self, rec: &mut SequenceRecord, scratch: &mut Vec<u8>) -> Result<bool, Error> {
        debug_assert_eq!(self.state, ParseState::AwaitingRecord);
        loop {
            match self.state {
                ParseState::AwaitingRecord => {
                    match self.tokens.skip_ws_read().map_err(|e| self.io_err(e))? {
                        None => return Ok(false),
                        Some(b) if b == self.kind.header() => {
                            self.state = ParseState::ReadingIdentifier;
                        }
                        Some(_) => return Err(self.parse_err(ParseErrorKind::MalformedFile)),
                    }
                }
                ParseState::ReadingIdentifier => {
                    scratch.clear();
                    let n = self
                        .tokens
                        .read_until(scratch, b'\n', true)
                        .map_err(|e| self.io_err(e))?;
                    if n < 1 {
                        return Err(self.parse_err(ParseErrorKind::MissingId));
                    }
                    match self.kind {
                        FileKind::Fastq | FileKind::Fasta => {
                            rec.id.push_str(&String::from_utf8_lossy(scratch));
                            self.state = ParseState::ReadingSequence;
                        }
                        FileKind::Qual => {
                            // the companion file's own identifier is not propagated
                            self.state = ParseState::ReadingQuality;
                        }
                    }
                }
                ParseState::ReadingSequence => {
                    let n = self
                        .tokens
                        .read_until(&mut rec.seq, self.kind.separator(), true)
                        .map_err(|e| self.io_err(e))?;
                    if n < 1 {
                        return Err(self.parse_err(ParseErrorKind::MissingSequence));
                    }
                    match self.kind {
                        FileKind::Fasta => {
                            // the peeked '>' opens the next record; it stays pushed back
                            self.state = ParseState::AwaitingRecord;
                        }
                        FileKind::Fastq => {
                            // consume the '+' separator just peeked
                            let _ = self.tokens.skip_ws_read().map_err(|e| self.io_err(e))?;
                            self.state = ParseState::ReadingQuality;
                        }
                        FileKind::Qual => unreachable!("state machine malfunction"),
                    }
                }
                ParseState::ReadingQuality => {
                    scratch.clear();
                    let n = self
                        .tokens
                        .read_until(scratch, self.kind.header(), false)
                        .map_err(|e| self.io_err(e))?;
                    if n < 1 {
                        return Err(self.parse_err(ParseErrorKind::MissingQuality));
                    }
                    self.decode_quality(scratch, rec)?;
                    // the peeked header opens the next record; it stays pushed back
                    self.state = ParseState::AwaitingRecord;
                }
            }
            if self.state == ParseState::AwaitingRecord {
                return Ok(true);
            }
        }
    }

    fn decode_quality(&self, raw: &[u8], rec: &mut SequenceRecord) -> Result<(), Error> {
        match self.kind {
            FileKind::Qual => {
                for token in raw.split(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
                    if token.is_empty() {
                        continue;
                    }
                    let score = std::str::from_utf8(token)
                        .ok()
                        .and_then(|t| t.parse::<i32>().ok())
                        .ok_or_else(|| {
                            self.parse_err(ParseErrorKind::BadQualityToken {
                                token: String::from_utf8_lossy(token).into_owned(),
                            })
                        })?;
                    rec.quals.push(score);
                }
            }
            FileKind::Fastq => {
                // encoding: chr(score + 33); layout whitespace is not data
                for &b in raw {
                    if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                        rec.quals.push(b as i32 - 33);
                    }
                }
            }
            FileKind::Fasta => unreachable!("state machine malfunction"),
        }
        Ok(())
    }
}

/// Streaming record reader over an interleaved FASTQ file or a paired
/// FASTA/QUAL pair, one normalized [`SequenceRecord`] per call.
///
/// The primary channel's state machine runs a full cycle first; a configured
/// companion quality channel then runs its own cycle before the call
/// returns. Both channels track independent positions for diagnostics.
pub struct RecordReader {
    primary: Channel,
    companion: Option<Channel>,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for RecordReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordReader")
            .field("primary", &self.primary.kind)
            .field("companion", &self.companion.as_ref().map(|c| c.kind))
            .finish_non_exhaustive()
    }
}

impl RecordReader {
    /// Open an interleaved FASTQ input. `.gz` is auto-detected by extension
    /// or magic bytes.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let rdr = open_source(path)?;
        log::debug!("reading interleaved input from {}", path.display());
        Ok(Self {
            primary: Channel::new(rdr, path.display().to_string(), FileKind::Fastq),
            companion: None,
            scratch: Vec::with_capacity(256),
        })
    }

    /// Open a sequence-only FASTA input paired with a quality-only QUAL
    /// input. Both may independently be gzip-compressed.
    pub fn from_paths<P: AsRef<Path>>(fasta: P, qual: P) -> Result<Self, Error> {
        let fasta = fasta.as_ref();
        let qual = qual.as_ref();
        let frdr = open_source(fasta)?;
        let qrdr = open_source(qual)?;
        log::debug!(
            "reading paired input from {} and {}",
            fasta.display(),
            qual.display()
        );
        Ok(Self {
            primary: Channel::new(frdr, fasta.display().to_string(), FileKind::Fasta),
            companion: Some(Channel::new(qrdr, qual.display().to_string(), FileKind::Qual)),
            scratch: Vec::with_capacity(256),
        })
    }

    /// Wrap an in-memory or otherwise pre-opened interleaved source.
    /// `source` names the input in error positions.
    pub fn from_bufread<R: BufRead + Send + 'static>(rdr: R, source: impl Into<String>) -> Self {
        Self {
            primary: Channel::new(Box::new(rdr), source, FileKind::Fastq),
            companion: None,
            scratch: Vec::with_capacity(256),
        }
    }

    /// Wrap pre-opened sequence and quality sources.
    pub fn from_bufreads<R, Q>(
        seq_rdr: R,
        seq_source: impl Into<String>,
        qual_rdr: Q,
        qual_source: impl Into<String>,
    ) -> Self
    where
        R: BufRead + Send + 'static,
        Q: BufRead + Send + 'static,
    {
        Self {
            primary: Channel::new(Box::new(seq_rdr), seq_source, FileKind::Fasta),
            companion: Some(Channel::new(Box::new(qual_rdr), qual_source, FileKind::Qual)),
            scratch: Vec::with_capacity(256),
        }
    }

    /// Parse the next record into `rec`, reusing its buffers.
    ///
    /// Returns `Ok(false)` when the input is exhausted. Every malformed
    /// condition is an error carrying the offending file, line and column;
    /// there is no resynchronization past one.
    pub fn read_into(&mut self, rec: &mut SequenceRecord) -> Result<bool, Error> {
        rec.clear();
        if !self.primary.run_cycle(rec, &mut self.scratch)? {
            return Ok(false);
        }
        if let Some(companion) = &mut self.companion {
            // an exhausted companion contributes zero scores; the length
            // check below reports the shortfall
            let _ = companion.run_cycle(rec, &mut self.scratch)?;
        }
        if rec.quals.len() != rec.seq.len() {
            let channel = self.companion.as_ref().unwrap_or(&self.primary);
            return Err(Error::parse_err(
                ParseErrorKind::LengthMismatch {
                    seq: rec.seq.len(),
                    quals: rec.quals.len(),
                },
                channel.tokens.pos.clone(),
            ));
        }
        Ok(true)
    }

    /// Current position of the primary channel, for diagnostics.
    pub fn position(&self) -> &Position {
        &self.primary.tokens.pos
    }

    /// Owning iterator over records. Convenient for small inputs; callers
    /// that care about allocation reuse should loop `read_into` instead.
    pub fn records(self) -> Records {
        Records {
            reader: self,
            rec: SequenceRecord::new(),
        }
    }
}

/// Iterator adapter yielding owned records; see [`RecordReader::records`].
pub struct Records {
    reader: RecordReader,
    rec: SequenceRecord,
}

impl Iterator for Records {
    type Item = Result<SequenceRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_into(&mut self.rec) {
            Ok(true) => Some(Ok(self.rec.clone())),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn open_source(path: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    let open_err = |e: io::Error| Error::Open {
        path: path.to_path_buf(),
        source: e,
    };
    let f = open_file(path).map_err(open_err)?;
    let mut rdr = BufReader::with_capacity(256 * 1024, f);
    let is_gz = path.extension().and_then(|s| s.to_str()) == Some("gz")
        || looks_like_gzip(rdr.fill_buf().map_err(open_err)?);

    if is_gz {
        #[cfg(feature = "gzip")]
        {
            let dec = MultiGzDecoder::new(rdr);
            Ok(Box::new(BufReader::with_capacity(256 * 1024, dec)))
        }
        #[cfg(not(feature = "gzip"))]
        {
            Err(open_err(io::Error::new(
                io::ErrorKind::Unsupported,
                "gzip input requires the `gzip` feature",
            )))
        }
    } else {
        Ok(Box::new(rdr))
    }
}
