//! Listing Parser Module
//!
//! Parses the technical listing printed by `7za l -slt -ba` into records.
//!
//! Each record is a block of `Key = Value` lines separated by blank lines.
//! Which keys are read, and where they land, is decided by [`FIELD_MAP`].

use chrono::NaiveDateTime;
use tracing::debug;

use crate::archive::entry::normalize_entry_name;

// == Field Mapping ==
/// Record field a listing key is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    EntryName,
    Size,
    Compressed,
    Attr,
    Modified,
    Checksum,
    Method,
    Block,
    Encrypted,
}

/// Listing key to record field. Keys not listed here are ignored.
const FIELD_MAP: &[(&str, Field)] = &[
    ("Path", Field::EntryName),
    ("Size", Field::Size),
    ("Packed Size", Field::Compressed),
    ("Attributes", Field::Attr),
    ("Modified", Field::Modified),
    ("CRC", Field::Checksum),
    ("Method", Field::Method),
    ("Block", Field::Block),
    ("Encrypted", Field::Encrypted),
];

// == Raw Listing Record ==
/// One entry as reported by the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListingRecord {
    /// Forward-slash path; directories end with `/`
    pub entry_name: String,
    pub is_directory: bool,
    pub size: u64,
    pub compressed: Option<u64>,
    pub attr: String,
    /// `YYYY-MM-DD` part of the modification stamp
    pub date: String,
    /// `HH:MM:SS[.fraction]` part of the modification stamp
    pub time: String,
    pub checksum: Option<String>,
    pub method: Option<String>,
    pub block: Option<String>,
    pub encrypted: bool,
}

impl RawListingRecord {
    pub fn modified(&self) -> Option<NaiveDateTime> {
        if self.date.is_empty() {
            return None;
        }
        let stamp = format!("{} {}", self.date, self.time);
        NaiveDateTime::parse_from_str(stamp.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
    }
}

/// Outcome of parsing one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBlock {
    Record(RawListingRecord),
    Skipped { reason: String },
}

// == Parsing ==
/// Parses every block, keeping the skipped ones with their reason.
pub fn parse_blocks(output: &str) -> Vec<ParsedBlock> {
    split_blocks(output).into_iter().map(parse_block).collect()
}

/// Parses the listing and keeps only well-formed records, in output order.
pub fn parse_listing(output: &str) -> Vec<RawListingRecord> {
    parse_blocks(output)
        .into_iter()
        .filter_map(|block| match block {
            ParsedBlock::Record(record) => Some(record),
            ParsedBlock::Skipped { reason } => {
                debug!("Skipping listing block: {}", reason);
                None
            }
        })
        .collect()
}

fn split_blocks(output: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: Vec<&str>) -> ParsedBlock {
    let mut record = RawListingRecord::default();
    let mut has_name = false;

    for line in lines {
        let Some((key, value)) = line.split_once(" = ").or_else(|| {
            // 7za prints `Key = ` with nothing after the separator for empty values
            line.strip_suffix(" =").map(|key| (key, ""))
        }) else {
            return ParsedBlock::Skipped {
                reason: format!("malformed line: {line:?}"),
            };
        };

        let Some(&(_, field)) = FIELD_MAP.iter().find(|(name, _)| *name == key.trim()) else {
            continue;
        };
        let value = value.trim();

        match field {
            Field::EntryName => {
                record.entry_name = normalize_entry_name(value);
                has_name = !value.is_empty();
            }
            Field::Size => match parse_number(value) {
                Ok(size) => record.size = size.unwrap_or(0),
                Err(reason) => return ParsedBlock::Skipped { reason },
            },
            Field::Compressed => match parse_number(value) {
                Ok(compressed) => record.compressed = compressed,
                Err(reason) => return ParsedBlock::Skipped { reason },
            },
            Field::Attr => record.attr = value.to_string(),
            Field::Modified => {
                let (date, time) = value.split_once(' ').unwrap_or((value, ""));
                record.date = date.to_string();
                record.time = time.to_string();
            }
            Field::Checksum => record.checksum = non_empty(value),
            Field::Method => record.method = non_empty(value),
            Field::Block => record.block = non_empty(value),
            Field::Encrypted => record.encrypted = value == "+",
        }
    }

    if !has_name {
        return ParsedBlock::Skipped {
            reason: "block has no Path".to_string(),
        };
    }

    record.is_directory = record.attr.contains('D');
    if record.is_directory && !record.entry_name.ends_with('/') {
        record.entry_name.push('/');
    }

    ParsedBlock::Record(record)
}

fn parse_number(value: &str) -> Result<Option<u64>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("not a number: {value:?}"))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
