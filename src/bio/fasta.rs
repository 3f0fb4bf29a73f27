use crate::bio::sequence::SequenceRecord;
use crate::error::{ProtlocError, ProtlocResult};
use memmap2::Mmap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    combinator::opt,
    sequence::terminated,
    IResult,
};
use std::fs::File;
use std::path::Path;
use tracing::debug;

pub const HEADER_MARKER: u8 = b'>';

/// Records parsed from one FASTA source
#[derive(Debug, Clone, Default)]
pub struct ParsedFasta {
    pub records: Vec<SequenceRecord>,
    /// Longest sequence seen, 0 for empty input
    pub max_len: usize,
}

enum ScanState {
    ExpectHeader,
    Sequence { header: String, residues: String },
}

/// Take one line without its terminator; `\r\n`, `\n` and a lone `\r` all end a line
fn next_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        take_till(|b: u8| b == b'\r' || b == b'\n'),
        opt(alt((tag("\r\n"), tag("\n"), tag("\r")))),
    )(input)
}

fn line_str(line: &[u8], line_no: usize) -> ProtlocResult<&str> {
    std::str::from_utf8(line).map_err(|_| ProtlocError::Format {
        line: line_no,
        message: "line is not valid UTF-8".to_string(),
    })
}

/// Parse FASTA text, tagging every record with `label`.
///
/// A header directly followed by another header yields a record with an empty
/// sequence. Any non-header line before the first header is a format error.
pub fn parse_fasta_bytes(data: &[u8], label: Option<&str>) -> ProtlocResult<ParsedFasta> {
    let mut parsed = ParsedFasta::default();
    let mut state = ScanState::ExpectHeader;
    let mut remaining = data;
    let mut line_no = 0;

    let finish = |header: String, residues: String, parsed: &mut ParsedFasta| {
        if residues.is_empty() {
            debug!("Record {} has an empty sequence", header);
        }
        parsed.max_len = parsed.max_len.max(residues.len());
        parsed.records.push(
            SequenceRecord::new(header, residues).with_label(label.map(str::to_string)),
        );
    };

    while !remaining.is_empty() {
        let (rest, line) = next_line(remaining).map_err(|_| ProtlocError::Format {
            line: line_no + 1,
            message: "unreadable line".to_string(),
        })?;
        remaining = rest;
        line_no += 1;
        let text = line_str(line, line_no)?;

        state = match state {
            ScanState::ExpectHeader => {
                if line.first() != Some(&HEADER_MARKER) {
                    return Err(ProtlocError::Format {
                        line: line_no,
                        message: "expected a header line starting with '>'".to_string(),
                    });
                }
                ScanState::Sequence {
                    header: text.trim_end().to_string(),
                    residues: String::new(),
                }
            }
            ScanState::Sequence { header, mut residues } => {
                if line.first() == Some(&HEADER_MARKER) {
                    finish(header, residues, &mut parsed);
                    ScanState::Sequence {
                        header: text.trim_end().to_string(),
                        residues: String::new(),
                    }
                } else {
                    residues.push_str(text.trim_end());
                    ScanState::Sequence { header, residues }
                }
            }
        };
    }

    if let ScanState::Sequence { header, residues } = state {
        finish(header, residues, &mut parsed);
    }

    Ok(parsed)
}

pub fn parse_fasta_str(text: &str, label: Option<&str>) -> ProtlocResult<ParsedFasta> {
    parse_fasta_bytes(text.as_bytes(), label)
}

/// Parse a FASTA file in one shot
pub fn parse_fasta<P: AsRef<Path>>(path: P, label: Option<&str>) -> ProtlocResult<ParsedFasta> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(ParsedFasta::default());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    let parsed = parse_fasta_bytes(&mmap[..], label)?;
    debug!(
        "Parsed {} records from {} (max length {})",
        parsed.records.len(),
        path.display(),
        parsed.max_len
    );
    Ok(parsed)
}

/// Parse `{data_dir}/{name}.{extension}`
pub fn load_population<P: AsRef<Path>>(
    data_dir: P,
    name: &str,
    extension: &str,
    label: Option<&str>,
) -> ProtlocResult<ParsedFasta> {
    let path = data_dir.as_ref().join(format!("{}.{}", name, extension));
    parse_fasta(&path, label)
}
