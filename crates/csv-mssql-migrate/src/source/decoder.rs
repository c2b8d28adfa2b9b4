//! Delimited file decoding.
//!
//! Splits a file into its header fields and a forward-only stream of data
//! records. No quoting rules and no type coercion are applied: every line is
//! split on the delimiter and handed on as text. Lines whose field count does
//! not match the header, blank lines included, are passed through unchanged.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{MigrateError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Builds decoders for files using a single-byte delimiter.
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder {
    delimiter: char,
}

impl RecordDecoder {
    /// Create a decoder. The delimiter must be a single ASCII character.
    pub fn new(delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() {
            return Err(MigrateError::Config(format!(
                "delimiter must be an ASCII character, got {:?}",
                delimiter
            )));
        }
        Ok(Self { delimiter })
    }

    /// Open a file and read its header line.
    pub fn open(&self, path: &Path) -> Result<DecodedFile<File>> {
        let file = File::open(path)?;
        self.decode(file, &path.display().to_string())
    }

    /// Read the header line from any reader.
    ///
    /// A blank first line is still the header; it yields one unnamed column.
    pub fn decode<R: Read>(&self, reader: R, name: &str) -> Result<DecodedFile<R>> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(MigrateError::EmptyInput(name.to_string()));
        }

        let line = trim_line_ending(&buf);
        let line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
        let header = std::str::from_utf8(line)
            .map_err(|_| MigrateError::InvalidEncoding { line: 1 })?;

        Ok(DecodedFile {
            header: split_fields(header, self.delimiter),
            records: Records {
                reader,
                delimiter: self.delimiter,
                buf,
                ordinal: 0,
                line: 1,
                done: false,
            },
        })
    }
}

/// Drop one trailing `\n` and then one trailing `\r`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_string).collect()
}

/// A file positioned just after its header line.
pub struct DecodedFile<R> {
    /// Raw header fields, still carrying their type clauses.
    pub header: Vec<String>,

    /// Remaining lines, one record each.
    pub records: Records<R>,
}

/// One data line split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based ordinal among the data records of the file.
    pub ordinal: usize,

    /// 1-based line number in the file.
    pub line: u64,

    /// Raw fields in line order. A blank line is a single empty field.
    pub fields: Vec<String>,
}

impl Record {
    /// The leading field, used to identify the record in messages.
    pub fn key(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }
}

/// Lazy, single-pass stream of records.
///
/// A line that is not valid UTF-8 yields an error item and the stream
/// continues with the next line. A read error ends the stream after being
/// reported once.
pub struct Records<R> {
    reader: BufReader<R>,
    delimiter: char,
    buf: Vec<u8>,
    ordinal: usize,
    line: u64,
    done: bool,
}

impl<R: Read> Iterator for Records<R> {
    type Item = (usize, Result<Record>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf);
        if let Ok(0) = read {
            self.done = true;
            return None;
        }

        self.ordinal += 1;
        self.line += 1;
        let ordinal = self.ordinal;

        let item = match read {
            Ok(_) => match std::str::from_utf8(trim_line_ending(&self.buf)) {
                Ok(text) => Ok(Record {
                    ordinal,
                    line: self.line,
                    fields: split_fields(text, self.delimiter),
                }),
                Err(_) => Err(MigrateError::InvalidEncoding { line: self.line }),
            },
            Err(e) => {
                self.done = true;
                Err(MigrateError::from(e))
            }
        };
        Some((ordinal, item))
    }
}
