use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use encoding::all::UTF_8;
use encoding::{DecoderTrap, EncodingRef};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result, RowResult},
    Row,
};

fn decode(data: &ByteRecord, encoding: EncodingRef) -> Row {
    let mut row = Row::with_capacity(data.as_slice().len(), data.len());

    for item in data.iter() {
        // with DecoderTrap::Replace decoding always succeeds
        match encoding.decode(item, DecoderTrap::Replace) {
            Ok(s) => row.push_field(&s),
            Err(s) => row.push_field(&s),
        }
    }

    row
}

fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Drops the spaces and tabs surrounding each field, leaving quoted content
/// alone, so that `a, "x,y" ` reads as the fields `a` and `x,y`.
///
/// Works on bytes, so it expects an ASCII compatible encoding.
struct SurroundingSpaces<R> {
    inner: R,
    chunk: Vec<u8>,
    out: Vec<u8>,
    pos: usize,
    pending: Vec<u8>,
    in_quotes: bool,
    closed_quote: bool,
    field_start: bool,
    eof: bool,
}

impl<R: Read> SurroundingSpaces<R> {
    fn new(inner: R) -> SurroundingSpaces<R> {
        SurroundingSpaces {
            inner,
            chunk: vec![0; 8 * 1024],
            out: Vec::new(),
            pos: 0,
            pending: Vec::new(),
            in_quotes: false,
            closed_quote: false,
            field_start: true,
            eof: false,
        }
    }

    fn push(&mut self, byte: u8) {
        if self.in_quotes {
            self.out.push(byte);

            if byte == b'"' {
                self.in_quotes = false;
                self.closed_quote = true;
            }

            return;
        }

        if self.closed_quote {
            self.closed_quote = false;

            // a doubled quote is an escaped one, still inside the field
            if byte == b'"' {
                self.out.push(byte);
                self.in_quotes = true;

                return;
            }
        }

        match byte {
            b if is_blank(b) => {
                if !self.field_start {
                    self.pending.push(b);
                }
            }
            b',' | b'\n' | b'\r' => {
                self.pending.clear();
                self.out.push(byte);
                self.field_start = true;
            }
            _ => {
                // a quote only opens a quoted field at its start
                if byte == b'"' && self.field_start {
                    self.in_quotes = true;
                }

                self.out.extend(self.pending.drain(..));
                self.out.push(byte);
                self.field_start = false;
            }
        }
    }
}

impl<R: Read> Read for SurroundingSpaces<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.out.len() && !self.eof {
            self.out.clear();
            self.pos = 0;

            let n = self.inner.read(&mut self.chunk)?;

            if n == 0 {
                // trailing blanks of the last field
                self.pending.clear();
                self.eof = true;
            }

            for i in 0..n {
                let byte = self.chunk[i];
                self.push(byte);
            }
        }

        let n = std::cmp::min(buf.len(), self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

/// Raw rows of a CSV reader, decoded with the given encoding.
///
/// Every record is a row, the first one included: deciding which record
/// holds names is up to the resolver. Spaces and tabs around a field are
/// dropped, those inside quotes are kept, and rows may have different
/// lengths.
pub struct Records<R> {
    records: ByteRecordsIntoIter<SurroundingSpaces<R>>,
    encoding: EncodingRef,
}

impl<R: Read> Records<R> {
    pub fn new(reader: R, encoding: EncodingRef) -> Records<R> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(SurroundingSpaces::new(reader));

        Records {
            records: reader.into_byte_records(),
            encoding,
        }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = RowResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|result| {
            result
                .map(|record| decode(&record, self.encoding))
                .map_err(Error::SourceParse)
        })
    }
}

/// Something CSV text can be read from.
///
/// The reader is opened right before a resolution starts and dropped when it
/// finishes, whatever the outcome.
pub trait CsvSource {
    fn open(&self) -> Result<Box<dyn Read + '_>>;

    fn encoding(&self) -> EncodingRef {
        UTF_8
    }

    fn records(&self) -> Result<Records<Box<dyn Read + '_>>> {
        Ok(Records::new(self.open()?, self.encoding()))
    }
}

/// CSV text held in memory
#[derive(Clone)]
pub struct CsvValueSource {
    value: String,
    encoding: EncodingRef,
}

impl CsvValueSource {
    pub fn new<S: Into<String>>(value: S) -> CsvValueSource {
        CsvValueSource {
            value: value.into(),
            encoding: UTF_8,
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingRef) -> CsvValueSource {
        self.encoding = encoding;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl CsvSource for CsvValueSource {
    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.value.as_bytes()))
    }

    fn encoding(&self) -> EncodingRef {
        self.encoding
    }
}

/// A CSV file on disk
#[derive(Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    encoding: EncodingRef,
}

impl CsvFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> CsvFileSource {
        CsvFileSource {
            path: path.as_ref().to_path_buf(),
            encoding: UTF_8,
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingRef) -> CsvFileSource {
        self.encoding = encoding;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsvSource for CsvFileSource {
    fn open(&self) -> Result<Box<dyn Read + '_>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Box::new(file)),
            Err(source) => Err(Error::SourceAcquisition {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn encoding(&self) -> EncodingRef {
        self.encoding
    }
}

#[cfg(test)]
mod tests {
    use encoding::all::WINDOWS_1252;

    use super::{CsvFileSource, CsvSource, CsvValueSource, Records};
    use crate::{Error, Row};

    #[test]
    fn test_records_keep_first_row() {
        let rows: Vec<Row> = Records::new("a,b\n1,2\n".as_bytes(), encoding::all::UTF_8)
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["a", "b"]), Row::from(vec!["1", "2"])]);
    }

    #[test]
    fn test_records_trim_and_flexible() {
        let rows: Vec<Row> = CsvValueSource::new("a , b\n 1 ,\"x,y\",3\n4\n")
            .records()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(
            rows,
            vec![
                Row::from(vec!["a", "b"]),
                Row::from(vec!["1", "x,y", "3"]),
                Row::from(vec!["4"]),
            ]
        );
    }

    #[test]
    fn test_spaces_inside_quotes_are_kept() {
        let csv = "\"  padded  \",b\na, \"x,y\" \n\t\" q \"\t,z \r\n";

        let rows: Vec<Row> = CsvValueSource::new(csv)
            .records()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(
            rows,
            vec![
                Row::from(vec!["  padded  ", "b"]),
                Row::from(vec!["a", "x,y"]),
                Row::from(vec![" q ", "z"]),
            ]
        );
    }

    #[test]
    fn test_inner_spaces_of_unquoted_fields_are_kept() {
        let rows: Vec<Row> = Records::new("  new  york , a b\"c  ".as_bytes(), encoding::all::UTF_8)
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["new  york", "a b\"c"])]);
    }

    #[test]
    fn test_escaped_quote_keeps_field_quoted() {
        let rows: Vec<Row> = Records::new("\"x\"\" , y\",z\n".as_bytes(), encoding::all::UTF_8)
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["x\" , y", "z"])]);
    }

    #[test]
    fn test_embedded_newline_and_quotes() {
        let rows: Vec<Row> = CsvValueSource::new("\"multi\nline\",\"say \"\"hi\"\"\"\n")
            .records()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["multi\nline", "say \"hi\""])]);
    }

    #[test]
    fn test_file_source() {
        let rows: Vec<Row> = CsvFileSource::new("test/assets/people.csv")
            .records()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], Row::from(vec!["name", "age", "city"]));
    }

    #[test]
    fn test_different_encoding() {
        let rows: Vec<Row> = CsvFileSource::new("test/assets/windows1252/data.csv")
            .with_encoding(WINDOWS_1252)
            .records()
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["name"]), Row::from(vec!["árbol"])]);
    }

    #[test]
    fn test_missing_file() {
        match CsvFileSource::new("test/assets/nope.csv").open() {
            Err(Error::SourceAcquisition { path, .. }) => {
                assert_eq!(path.to_str(), Some("test/assets/nope.csv"))
            }
            Err(e) => panic!("unexpected {:?}", e),
            Ok(_) => panic!("file should not exist"),
        }
    }

    #[test]
    fn test_invalid_utf8_as_utf8_is_replaced() {
        let rows: Vec<Row> = Records::new(&b"caf\xe9\n"[..], encoding::all::UTF_8)
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows, vec![Row::from(vec!["caf\u{fffd}"])]);
    }
}
