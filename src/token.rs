use std::io::{self, BufRead};

use crate::error::Position;

/// Byte-level read primitives over one input handle.
///
/// Owns the handle's [`Position`] and a one-byte pushback slot. The pushback
/// makes the un-peek of record header/separator bytes explicit, and it is the
/// only form of "rewind" anywhere, so non-seekable sources (gzip streams,
/// pipes) work.
pub(crate) struct TokenReader {
    rdr: Box<dyn BufRead + Send>,
    pushback: Option<u8>,
    pub(crate) pos: Position,
}

impl TokenReader {
    pub(crate) fn new(rdr: Box<dyn BufRead + Send>, source: impl Into<String>) -> Self {
        Self {
            rdr,
            pushback: None,
            pos: Position::new(source),
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.take() {
            return Ok(Some(b));
        }
        let buf = self.rdr.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let b = buf[0];
        self.rdr.consume(1);
        Ok(Some(b))
    }

    /// Push one byte back; the next read returns it. The position is left
    /// untouched: a caller that already counted the byte uncounts it first.
    fn unread(&mut self, byte: u8) {
        debug_assert!(self.pushback.is_none());
        self.pushback = Some(byte);
    }

    /// Skip space, tab, CR and newline; return the first other byte, or
    /// `None` at end of input. The returned byte is counted as consumed.
    pub(crate) fn skip_ws_read(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                None => return Ok(None),
                Some(b'\n') => {
                    self.pos.line += 1;
                    self.pos.col = 0;
                }
                Some(b) => {
                    self.pos.col += 1;
                    if !matches!(b, b' ' | b'\t' | b'\r') {
                        return Ok(Some(b));
                    }
                }
            }
        }
    }

    /// Append bytes to `buf` until `until` or end of input.
    ///
    /// The delimiter is never left consumed: it is pushed back for the next
    /// read. A newline ends the physical line; with `trim` the line break and
    /// any following whitespace are dropped and scanning continues on the
    /// next line (unless the next non-whitespace byte is the delimiter or
    /// end of input), without `trim` the newline is appended verbatim. CR
    /// bytes are treated as line-ending decoration and never appended.
    ///
    /// Returns the number of counted bytes; appended newlines are not
    /// counted. 0 means nothing was read, a missing field at the caller.
    pub(crate) fn read_until(
        &mut self,
        buf: &mut Vec<u8>,
        until: u8,
        trim: bool,
    ) -> io::Result<usize> {
        let mut total = 0usize;
        loop {
            match self.next_byte()? {
                None => return Ok(total),
                Some(b) if b == until => {
                    self.unread(b);
                    return Ok(total);
                }
                Some(b'\n') => {
                    self.pos.line += 1;
                    self.pos.col = 0;
                    if trim {
                        match self.skip_ws_read()? {
                            None => return Ok(total),
                            Some(c) if c == until => {
                                // skip_ws_read counted c; un-peeking rewinds
                                self.pos.col -= 1;
                                self.unread(c);
                                return Ok(total);
                            }
                            Some(c) => {
                                buf.push(c);
                                total += 1;
                            }
                        }
                    } else {
                        buf.push(b'\n');
                    }
                }
                Some(b'\r') => {
                    self.pos.col += 1;
                }
                Some(b) => {
                    self.pos.col += 1;
                    buf.push(b);
                    total += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn reader(data: &'static str) -> TokenReader {
        TokenReader::new(Box::new(BufReader::new(data.as_bytes())), "test")
    }

    #[test]
    fn skip_ws_tracks_lines_and_columns() {
        let mut t = reader("  \n\tx");
        assert_eq!(t.skip_ws_read().unwrap(), Some(b'x'));
        assert_eq!(t.pos.line, 1);
        assert_eq!(t.pos.col, 2);
        assert_eq!(t.skip_ws_read().unwrap(), None);
    }

    #[test]
    fn read_until_stops_before_delimiter() {
        let mut t = reader("abc+def");
        let mut buf = Vec::new();
        assert_eq!(t.read_until(&mut buf, b'+', true).unwrap(), 3);
        assert_eq!(buf, b"abc");
        // the delimiter is pushed back, not consumed
        assert_eq!(t.skip_ws_read().unwrap(), Some(b'+'));
    }

    #[test]
    fn read_until_trim_joins_wrapped_lines() {
        let mut t = reader("abc\ndef\n+rest");
        let mut buf = Vec::new();
        assert_eq!(t.read_until(&mut buf, b'+', true).unwrap(), 6);
        assert_eq!(buf, b"abcdef");
        assert_eq!(t.skip_ws_read().unwrap(), Some(b'+'));
    }

    #[test]
    fn read_until_untrimmed_keeps_newlines() {
        let mut t = reader("ab\ncd\n@");
        let mut buf = Vec::new();
        assert_eq!(t.read_until(&mut buf, b'@', false).unwrap(), 4);
        assert_eq!(buf, b"ab\ncd\n");
        assert_eq!(t.skip_ws_read().unwrap(), Some(b'@'));
    }

    #[test]
    fn read_until_drops_carriage_returns() {
        let mut t = reader("ab\r\ncd\r\n>");
        let mut buf = Vec::new();
        assert_eq!(t.read_until(&mut buf, b'>', true).unwrap(), 4);
        assert_eq!(buf, b"abcd");
    }
}
