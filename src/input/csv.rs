use crate::core::Waypoint;
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure of the import source as a whole
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read waypoint source{}", describe_path(.path))]
    Read {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("malformed waypoint source: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => ImportError::Read { path: None, source },
            kind => ImportError::Malformed(format!("{:?}", kind)),
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p: &Path| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Waypoints recovered from a bulk source
#[derive(Debug, Default)]
pub struct ParsedWaypoints {
    /// Valid rows, in source order
    pub waypoints: Vec<Waypoint>,
    /// Rows that did not yield a valid waypoint
    pub rejected: usize,
}

/// Parse header-less `lon,lat` rows, one per line
///
/// - Quotes are not special, so a stray `"` only spoils its own line
/// - Blank lines are skipped and not counted
/// - Columns after the first two are ignored
/// - A row with a missing, non-numeric or out-of-range field is rejected
///
/// Only a failure of the reader itself is an error.
pub fn parse_waypoints<R: Read>(reader: R) -> Result<ParsedWaypoints, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedWaypoints::default();
    let mut record = ByteRecord::new();

    while rdr.read_byte_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match parse_record(&record) {
            Some(waypoint) => parsed.waypoints.push(waypoint),
            None => {
                debug!("Rejected waypoint row at line {}", line);
                parsed.rejected += 1;
            }
        }
    }

    Ok(parsed)
}

fn parse_record(record: &ByteRecord) -> Option<Waypoint> {
    let lon = std::str::from_utf8(record.get(0)?).ok()?;
    let lat = std::str::from_utf8(record.get(1)?).ok()?;
    Waypoint::parse(lon, lat).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedWaypoints {
        parse_waypoints(text.as_bytes()).unwrap()
    }

    fn pairs(parsed: &ParsedWaypoints) -> Vec<(f64, f64)> {
        parsed.waypoints.iter().map(|w| (w.lon(), w.lat())).collect()
    }

    #[test]
    fn test_parse_mixed_rows() {
        let parsed = parse("10,20\nbad,row\n30,40");
        assert_eq!(pairs(&parsed), vec![(10.0, 20.0), (30.0, 40.0)]);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let parsed = parse("1,2\r\n\r\n3, 4\r\n\n");
        assert_eq!(pairs(&parsed), vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(parsed.rejected, 0);
    }

    #[test]
    fn test_short_and_empty_fields_rejected() {
        let parsed = parse("5\n,6\n7,\n8,9");
        assert_eq!(pairs(&parsed), vec![(8.0, 9.0)]);
        assert_eq!(parsed.rejected, 3);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let parsed = parse("1,2,120.5\n3,4,extra,more");
        assert_eq!(pairs(&parsed), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_header_row_counts_as_rejected() {
        let parsed = parse("longitude,latitude\n-0.12,51.5");
        assert_eq!(pairs(&parsed), vec![(-0.12, 51.5)]);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let parsed = parse("181,0\n0,-91\nNaN,0\n0,0");
        assert_eq!(pairs(&parsed), vec![(0.0, 0.0)]);
        assert_eq!(parsed.rejected, 3);
    }

    #[test]
    fn test_invalid_utf8_row_rejected() {
        let bytes: &[u8] = b"1,2\n\xff\xfe,3\n4,5\n";
        let parsed = parse_waypoints(bytes).unwrap();
        assert_eq!(pairs(&parsed), vec![(1.0, 2.0), (4.0, 5.0)]);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn test_stray_quote_only_rejects_its_line() {
        let parsed = parse("10,20\n\"5,6\n30,40\n50,60");
        assert_eq!(pairs(&parsed), vec![(10.0, 20.0), (30.0, 40.0), (50.0, 60.0)]);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn test_quotes_never_join_lines() {
        let parsed = parse("\"1\n2\",3\n30,40");
        assert_eq!(pairs(&parsed), vec![(30.0, 40.0)]);
        assert_eq!(parsed.rejected, 2);
    }

    #[test]
    fn test_quoted_fields_rejected() {
        let parsed = parse("\"10.5\",\"-3\"\n1,1");
        assert_eq!(pairs(&parsed), vec![(1.0, 1.0)]);
        assert_eq!(parsed.rejected, 1);
    }
}
