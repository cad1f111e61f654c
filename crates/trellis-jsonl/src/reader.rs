//! Line-oriented JSONL reading.
//!
//! [`JsonlReader`] tracks 1-based line numbers so that every warning can point
//! at the exact line of the file that was skipped.

use crate::Result;
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async line reader for JSONL data.
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Wraps `reader` in a buffered JSONL reader positioned before line 1.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// The 1-based number of the last line returned, or 0 before any read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next raw line without its terminator, paired with its
    /// 1-based line number.
    ///
    /// Returns `Ok(None)` at end of input. The line is returned as bytes so
    /// that callers can decide how to treat invalid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the underlying reader fails.
    pub async fn next_line(&mut self) -> Result<Option<(usize, &[u8])>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut end = self.buf.len();
        if end > 0 && self.buf[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.buf[end - 1] == b'\r' {
            end -= 1;
        }
        Ok(Some((self.line_number, &self.buf[..end])))
    }

    /// Decodes every remaining line as `T`, collecting warnings for lines
    /// that cannot be decoded.
    ///
    /// Blank lines are ignored without a warning.
    ///
    /// # Errors
    ///
    /// Only I/O failures are errors; decoding problems become warnings.
    pub async fn read_resilient<T: DeserializeOwned>(&mut self) -> Result<(Vec<T>, Vec<Warning>)> {
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        while let Some((line_number, bytes)) = self.next_line().await? {
            let Ok(line) = std::str::from_utf8(bytes) else {
                tracing::warn!(line_number, "Skipping line with invalid UTF-8");
                warnings.push(Warning::SkippedLine {
                    line_number,
                    reason: "invalid UTF-8".to_string(),
                });
                continue;
            };

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<T>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "Skipping malformed JSONL line");
                    warnings.push(Warning::MalformedJson {
                        line_number,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok((records, warnings))
    }
}

/// Reads a whole JSONL file, skipping lines that fail to decode.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be opened or read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    JsonlReader::new(file).read_resilient().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: u32,
    }

    #[tokio::test]
    async fn new_reader_starts_at_line_zero() {
        let reader = JsonlReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(reader.line_number(), 0);
    }

    #[tokio::test]
    async fn next_line_strips_crlf() {
        let mut reader = JsonlReader::new(Cursor::new(b"a\r\nb\n".to_vec()));
        assert_eq!(reader.next_line().await.unwrap(), Some((1, &b"a"[..])));
        assert_eq!(reader.next_line().await.unwrap(), Some((2, &b"b"[..])));
        assert_eq!(reader.next_line().await.unwrap(), None);
        assert_eq!(reader.line_number(), 2);
    }

    #[tokio::test]
    async fn last_line_without_newline_is_read() {
        let mut reader = JsonlReader::new(Cursor::new(b"{\"id\":1}\n{\"id\":2}".to_vec()));
        let (records, warnings) = reader.read_resilient::<Record>().await.unwrap();
        assert_eq!(records, vec![Record { id: 1 }, Record { id: 2 }]);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let mut reader = JsonlReader::new(Cursor::new(b"\n   \n{\"id\":3}\n\n".to_vec()));
        let (records, warnings) = reader.read_resilient::<Record>().await.unwrap();
        assert_eq!(records, vec![Record { id: 3 }]);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_becomes_skipped_line() {
        let mut data = b"{\"id\":1}\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'\n']);
        data.extend_from_slice(b"{\"id\":2}\n");
        let mut reader = JsonlReader::new(Cursor::new(data));

        let (records, warnings) = reader.read_resilient::<Record>().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), "skipped_line");
        assert_eq!(warnings[0].line_number(), 2);
    }
}
