//! YAML stream loading.
//!
//! This module reads YAML documents from standard input (or any reader) in
//! one of two modes:
//!
//! - [`InputMode::Buffered`] reads the whole stream before parsing it.
//! - [`InputMode::LineBuffered`] reads one line at a time and hands out each
//!   document as soon as the next document marker shows it is complete, so
//!   that a long-lived producer can be queried while it is still writing.
//!
//! Gzip-compressed input is detected from its magic bytes and decompressed
//! transparently in both modes.

use crate::document::node::YamlValue;
use crate::document::parser::parse_yaml_stream;
use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How the input stream is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Read everything, then parse.
    #[default]
    Buffered,
    /// Parse each document as soon as it is complete.
    LineBuffered,
}

/// Iterator over the documents of an input stream.
pub enum Documents {
    Buffered(std::vec::IntoIter<Result<YamlValue>>),
    Lines(LineDocuments<Box<dyn BufRead>>),
}

impl Iterator for Documents {
    type Item = Result<YamlValue>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Documents::Buffered(documents) => documents.next(),
            Documents::Lines(documents) => documents.next(),
        }
    }
}

/// Opens a YAML stream for reading documents.
///
/// # Errors
///
/// In buffered mode this fails when the input cannot be read, is not valid
/// gzip despite its magic bytes, or is not UTF-8. Malformed YAML is reported
/// by the returned iterator, after the documents preceding it.
///
/// # Examples
///
/// ```
/// use shyaml::file::loader::{load_documents, InputMode};
///
/// let input: &[u8] = b"a: 1\n---\nb: 2\n";
/// let docs: Vec<_> = load_documents(input, InputMode::Buffered)
///     .unwrap()
///     .collect::<anyhow::Result<_>>()
///     .unwrap();
/// assert_eq!(docs.len(), 2);
/// ```
pub fn load_documents<R: Read + 'static>(reader: R, mode: InputMode) -> Result<Documents> {
    let mut input = open_input(reader)?;
    match mode {
        InputMode::Buffered => {
            let mut buffer = Vec::new();
            input
                .read_to_end(&mut buffer)
                .context("Failed to read YAML input")?;
            let content = String::from_utf8(buffer).context("Invalid UTF-8 in YAML input")?;
            let documents = parse_yaml_stream(&content);
            log::debug!("parsed {} document(s) from buffered input", documents.len());
            Ok(Documents::Buffered(documents.into_iter()))
        }
        InputMode::LineBuffered => Ok(Documents::Lines(LineDocuments::new(input))),
    }
}

/// Wraps a reader, decompressing it when it starts with the gzip magic bytes.
pub fn open_input<R: Read + 'static>(reader: R) -> Result<Box<dyn BufRead>> {
    let mut buffered = BufReader::new(reader);
    let is_gzipped = buffered
        .fill_buf()
        .context("Failed to read YAML input")?
        .starts_with(&GZIP_MAGIC);

    if is_gzipped {
        log::debug!("input is gzip-compressed");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}

/// Documents read line by line.
///
/// Lines are accumulated until a `---` document start or a `...` document end
/// marker shows that the pending document is complete; it is then parsed and
/// handed out. Directives and comments preceding a `---` stay with the
/// document that follows them.
pub struct LineDocuments<R> {
    reader: R,
    pending: String,
    has_content: bool,
    ready: VecDeque<Result<YamlValue>>,
    finished: bool,
}

impl<R: BufRead> LineDocuments<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: String::new(),
            has_content: false,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Parses and queues the pending document text.
    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let source = std::mem::take(&mut self.pending);
        self.has_content = false;

        let documents = parse_yaml_stream(&source);
        log::debug!("line buffer: {} document(s) completed", documents.len());
        self.ready.extend(documents);
    }

    /// Reads one line and files it into the pending document.
    ///
    /// Returns false once the input is exhausted.
    fn read_line(&mut self) -> Result<bool> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Failed to read YAML input")?;
        if read == 0 {
            return Ok(false);
        }

        if is_marker(&line, "---") {
            if self.has_content {
                self.flush_pending();
            }
            self.pending.push_str(&line);
            self.has_content = true;
        } else if is_marker(&line, "...") {
            self.pending.push_str(&line);
            self.flush_pending();
        } else {
            let trimmed = line.trim_start();
            let is_preamble = trimmed.is_empty()
                || trimmed.starts_with('#')
                || (!self.has_content && trimmed.starts_with('%'));
            if !is_preamble {
                self.has_content = true;
            }
            self.pending.push_str(&line);
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for LineDocuments<R> {
    type Item = Result<YamlValue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(document) = self.ready.pop_front() {
                if document.is_err() {
                    self.finished = true;
                    self.ready.clear();
                }
                return Some(document);
            }
            if self.finished {
                return None;
            }
            match self.read_line() {
                Ok(true) => {}
                Ok(false) => {
                    self.flush_pending();
                    self.finished = true;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Whether `line` is a document marker: the marker at column 0 followed by
/// the end of the line or whitespace.
fn is_marker(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::YamlNumber;
    use std::io::Cursor;

    fn line_documents(input: &str) -> Vec<Result<YamlValue>> {
        LineDocuments::new(Cursor::new(input.to_string())).collect()
    }

    fn values(input: &str) -> Vec<YamlValue> {
        line_documents(input)
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_is_marker() {
        assert!(is_marker("---\n", "---"));
        assert!(is_marker("---", "---"));
        assert!(is_marker("--- !tag\n", "---"));
        assert!(is_marker("...\r\n", "..."));
        assert!(!is_marker("----\n", "---"));
        assert!(!is_marker(" ---\n", "---"));
        assert!(!is_marker("---a\n", "---"));
    }

    #[test]
    fn test_line_mode_single_document() {
        let docs = values("a: 1\nb: 2\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].len(), Some(2));
    }

    #[test]
    fn test_line_mode_splits_on_start_markers() {
        let docs = values("---\na: 1\n---\nb: 2\n---\n- 3\n");
        assert_eq!(docs.len(), 3);
        assert!(docs[0].is_mapping());
        assert!(docs[2].is_sequence());
    }

    #[test]
    fn test_line_mode_inline_document_after_marker() {
        let docs = values("--- first\n--- second\n");
        assert_eq!(
            docs,
            vec![
                YamlValue::String("first".into()),
                YamlValue::String("second".into())
            ]
        );
    }

    #[test]
    fn test_line_mode_end_marker() {
        let docs = values("a: 1\n...\n%YAML 1.1\n---\nb: 2\n");
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_line_mode_leading_comment_stays_with_document() {
        let docs = values("# header\n---\nvalue: 3\n");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_line_mode_trailing_marker_is_empty_document() {
        let docs = values("a: 1\n---\n");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1], YamlValue::Null);
    }

    #[test]
    fn test_line_mode_empty_input() {
        assert!(values("").is_empty());
    }

    #[test]
    fn test_line_mode_yields_documents_before_error() {
        let docs = line_documents("a: 1\n---\nb: [2\n---\nc: 3\n");
        assert_eq!(docs.len(), 2);
        assert!(docs[0].is_ok());
        assert!(docs[1].is_err());
    }

    #[test]
    fn test_line_mode_is_incremental() {
        // A reader that fails once the first document has been consumed
        // proves documents are produced before reading the whole input.
        struct FailAfter {
            data: Cursor<Vec<u8>>,
        }
        impl Read for FailAfter {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                match self.data.read(buf)? {
                    0 => Err(std::io::Error::other("stream closed")),
                    n => Ok(n),
                }
            }
        }

        let reader = BufReader::with_capacity(
            1,
            FailAfter {
                data: Cursor::new(b"x: 1\n---\n".to_vec()),
            },
        );
        let mut docs = LineDocuments::new(reader);
        let first = docs.next().unwrap().unwrap();
        assert!(first.is_mapping());
        assert!(docs.next().unwrap().is_err());
    }

    #[test]
    fn test_buffered_load() {
        let input: &[u8] = b"- 1\n- 2\n";
        let docs: Vec<_> = load_documents(input, InputMode::Buffered)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            docs,
            vec![YamlValue::Sequence(vec![
                YamlValue::Number(YamlNumber::Integer(1)),
                YamlValue::Number(YamlNumber::Integer(2)),
            ])]
        );
    }

    #[test]
    fn test_buffered_rejects_invalid_utf8() {
        let input: &[u8] = &[b'a', b':', b' ', 0xff, 0xfe];
        let err = load_documents(input, InputMode::Buffered).err().unwrap();
        assert!(err.to_string().contains("Invalid UTF-8"));
    }

    #[test]
    fn test_gzip_input_is_decompressed() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"name: packed\n").unwrap();
        let compressed = encoder.finish().unwrap();

        for mode in [InputMode::Buffered, InputMode::LineBuffered] {
            let docs: Vec<_> = load_documents(Cursor::new(compressed.clone()), mode)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(docs.len(), 1, "mode {:?}", mode);
            assert!(docs[0].is_mapping());
        }
    }

    #[test]
    fn test_corrupted_gzip_is_an_error() {
        let input: &[u8] = &[0x1f, 0x8b, 0x00, 0x01, 0x02];
        assert!(load_documents(input, InputMode::Buffered).is_err());
    }
}
