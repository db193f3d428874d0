//! Code tables: loads base (compressed) parity-check matrices and block-size
//! tables from a directory of plain-text files.
//!
//! Files follow the naming convention `H-<digits>` for a headerless,
//! comma-separated base matrix and `block-size-<digits>` for a CSV (with a
//! header row containing `n (bits)`) listing the supported code lengths for
//! that rate, where `<digits>` is the rate label with its `/` removed
//! (`"1/2"` <-> `H-12`, `"2/3A"` <-> `H-23A`).

use crate::expander::{self, expand};
use crate::sparse::SPMatrix;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading or parsing a code table.
#[derive(Debug, Error)]
pub enum Error {
    /// No base matrix is registered for the requested rate.
    #[error("no table registered for rate {0:?}")]
    InvalidRate(String),
    /// Failed to read a table file from disk.
    #[error("I/O error reading code tables: {0}")]
    Io(#[from] io::Error),
    /// A table file's contents could not be parsed.
    #[error("malformed table file {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
    /// Expanding a compressed base matrix failed.
    #[error(transparent)]
    Expand(#[from] expander::Error),
}

/// A source of LDPC base matrices and block-size tables, keyed by rate
/// label (e.g. `"1/2"`, `"2/3A"`).
pub trait CodeTables {
    /// The rate labels with a registered base matrix.
    fn code_rates(&self) -> Vec<String>;

    /// The code lengths (in bits) supported for `rate`.
    fn code_lengths(&self, rate: &str) -> Result<Vec<usize>, Error>;

    /// The compressed (un-expanded) base matrix for `rate`.
    fn compressed_h(&self, rate: &str) -> Result<Vec<Vec<i64>>, Error>;

    /// The fully expanded parity-check matrix for `rate` at code length `n`.
    fn expanded_h(&self, n: usize, rate: &str) -> Result<SPMatrix, Error> {
        let hb = self.compressed_h(rate)?;
        Ok(expand(&hb, n, rate)?)
    }

    /// The supported block sizes for `rate` (alias of [`code_lengths`](Self::code_lengths),
    /// kept as a separate name to mirror the on-disk `block-size-*` files).
    fn block_size(&self, rate: &str) -> Result<Vec<usize>, Error> {
        self.code_lengths(rate)
    }
}

/// [`CodeTables`] backed by a directory of `H-<digits>` and
/// `block-size-<digits>` files.
#[derive(Debug, Clone)]
pub struct FileCodeTables {
    compressed: BTreeMap<String, Vec<Vec<i64>>>,
    block_sizes: BTreeMap<String, Vec<usize>>,
}

impl FileCodeTables {
    /// Scans `dir` for `H-*` and `block-size-*` files and loads them.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the directory cannot be read, or
    /// [`Error::Parse`] if a matching file's contents are malformed.
    pub fn load(dir: impl AsRef<Path>) -> Result<FileCodeTables, Error> {
        let dir = dir.as_ref();
        let mut compressed = BTreeMap::new();
        let mut block_sizes = BTreeMap::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(digits) = name.strip_prefix("H-") {
                let rate = parse_rate(digits);
                let contents = fs::read_to_string(&path)?;
                let hb = parse_compressed_h(&contents).map_err(|reason| Error::Parse {
                    path: path.clone(),
                    reason,
                })?;
                compressed.insert(rate, hb);
            } else if let Some(digits) = name.strip_prefix("block-size-") {
                let rate = parse_rate(digits);
                let contents = fs::read_to_string(&path)?;
                let sizes = parse_block_sizes(&contents).map_err(|reason| Error::Parse {
                    path: path.clone(),
                    reason,
                })?;
                block_sizes.insert(rate, sizes);
            }
        }

        Ok(FileCodeTables {
            compressed,
            block_sizes,
        })
    }
}

impl CodeTables for FileCodeTables {
    fn code_rates(&self) -> Vec<String> {
        self.compressed.keys().cloned().collect()
    }

    fn code_lengths(&self, rate: &str) -> Result<Vec<usize>, Error> {
        self.block_sizes
            .get(rate)
            .cloned()
            .ok_or_else(|| Error::InvalidRate(rate.to_string()))
    }

    fn compressed_h(&self, rate: &str) -> Result<Vec<Vec<i64>>, Error> {
        self.compressed
            .get(rate)
            .cloned()
            .ok_or_else(|| Error::InvalidRate(rate.to_string()))
    }
}

/// Turns a filename's digit suffix (e.g. `"12"`, `"23A"`) into a rate label
/// (`"1/2"`, `"2/3A"`) by inserting a `/` after the first character.
fn parse_rate(digits: &str) -> String {
    let mut chars = digits.chars();
    let first = chars.next().map(|c| c.to_string()).unwrap_or_default();
    format!("{}/{}", first, chars.as_str())
}

/// Parses a headerless, comma-separated integer matrix, one row per line.
fn parse_compressed_h(contents: &str) -> Result<Vec<Vec<i64>>, String> {
    let mut rows = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("line {}: {e}", lineno + 1))
            })
            .collect::<Result<Vec<i64>, String>>()?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err("no data rows".to_string());
    }
    let width = rows[0].len();
    if rows.iter().any(|r| r.len() != width) {
        return Err("ragged row widths".to_string());
    }
    Ok(rows)
}

/// Parses a block-size CSV: a header row followed by one integer code
/// length per subsequent line, taken from the column named `n (bits)`.
fn parse_block_sizes(contents: &str) -> Result<Vec<usize>, String> {
    let mut lines = contents.lines();
    let header = lines.next().ok_or_else(|| "empty file".to_string())?;
    let col = header
        .split(',')
        .position(|h| h.trim() == "n (bits)")
        .ok_or_else(|| "missing 'n (bits)' column".to_string())?;

    let mut sizes = Vec::new();
    for (lineno, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let field = line
            .split(',')
            .nth(col)
            .ok_or_else(|| format!("line {}: missing column {col}", lineno + 2))?;
        let n = field
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("line {}: {e}", lineno + 2))?;
        sizes.push(n);
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rate_labels() {
        assert_eq!(parse_rate("12"), "1/2");
        assert_eq!(parse_rate("23A"), "2/3A");
        assert_eq!(parse_rate("23B"), "2/3B");
        assert_eq!(parse_rate("34"), "3/4");
        assert_eq!(parse_rate("56"), "5/6");
    }

    #[test]
    fn parses_compressed_h() {
        let text = "0,-1,2\n-1,0,-1\n";
        let hb = parse_compressed_h(text).unwrap();
        assert_eq!(hb, vec![vec![0, -1, 2], vec![-1, 0, -1]]);
    }

    #[test]
    fn rejects_ragged_compressed_h() {
        let text = "0,-1,2\n-1,0\n";
        assert!(parse_compressed_h(text).is_err());
    }

    #[test]
    fn parses_block_sizes_by_header_name() {
        let text = "rate,n (bits)\n1/2,576\n1/2,672\n1/2,768\n";
        let sizes = parse_block_sizes(text).unwrap();
        assert_eq!(sizes, vec![576, 672, 768]);
    }

    #[test]
    fn block_sizes_column_can_be_in_any_position() {
        let text = "n (bits),rate\n1920,2/3A\n2304,2/3A\n";
        let sizes = parse_block_sizes(text).unwrap();
        assert_eq!(sizes, vec![1920, 2304]);
    }

    #[test]
    fn rejects_missing_header() {
        let text = "rate,size\n1/2,576\n";
        assert!(parse_block_sizes(text).is_err());
    }

    #[test]
    fn file_code_tables_round_trips_through_a_temp_directory() {
        let dir = std::env::temp_dir().join(format!(
            "ldpc_wimax_tables_test_{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("H-12"), "0,-1\n-1,0\n").unwrap();
        fs::write(
            dir.join("block-size-12"),
            "n (bits),rate\n96,1/2\n192,1/2\n",
        )
        .unwrap();

        let tables = FileCodeTables::load(&dir).unwrap();
        assert_eq!(tables.code_rates(), vec!["1/2".to_string()]);
        assert_eq!(
            tables.compressed_h("1/2").unwrap(),
            vec![vec![0, -1], vec![-1, 0]]
        );
        assert_eq!(tables.block_size("1/2").unwrap(), vec![96, 192]);
        assert_eq!(tables.code_lengths("1/2").unwrap(), vec![96, 192]);

        let h = tables.expanded_h(96, "1/2").unwrap();
        assert_eq!(h.num_rows(), 8);
        assert_eq!(h.num_cols(), 8);

        assert!(matches!(
            tables.compressed_h("3/4"),
            Err(Error::InvalidRate(r)) if r == "3/4"
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
