//! Data file discovery and parsing for LJStream exports.
//!
//! An export file is tab-delimited text laid out as:
//!
//! ```text
//! line 1      12/9/2013              recording date (first column)
//! line 2      7:28:06 PM             recording time (first column)
//! lines 3-11  instrument preamble    ignored
//! line 12     Time  v0  v1 ...       column header
//! line 13+    0.000 1.2 3.4 ...      samples, first column = seconds since start
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use ljstream_core::error::{LoaderError, Result};
use ljstream_core::models::BaseTime;
use ljstream_core::options::FileOrder;
use regex::Regex;
use tracing::{debug, warn};

/// Lines before the column header: two time lines plus the preamble.
pub const PREAMBLE_LINES: usize = 11;

/// One parsed data file.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFile {
    pub path: PathBuf,
    /// Column names from line 12.
    pub header: Vec<String>,
    /// Numeric samples, each as wide as `header`.
    pub rows: Vec<Vec<f64>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the regular files directly inside `folder` whose name contains
/// `extension`, ordered per `order`.
///
/// The filter is a plain substring test, so `".dat"` also matches
/// `run.dat.bak`. Sub-directories are not descended into.
pub fn find_data_files(folder: &Path, extension: &str, order: FileOrder) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in walkdir::WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                return Err(LoaderError::FolderRead {
                    path: folder.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                let matches = e
                    .path()
                    .and_then(Path::file_name)
                    .is_some_and(|n| n.to_string_lossy().contains(extension));
                if matches {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Err(LoaderError::file_parse(path, e.to_string()));
                }
                warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().contains(extension)
        {
            files.push(entry.into_path());
        }
    }

    sort_files(&mut files, order);
    debug!(
        "Found {} files matching \"{}\" in {} ({} order)",
        files.len(),
        extension,
        folder.display(),
        order
    );
    Ok(files)
}

/// Read a whole data file into memory.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| LoaderError::file_parse(path, e.to_string()))
}

/// Extract the recording start from the first column of lines 1 and 2.
pub fn base_time_from_text(path: &Path, text: &str) -> Result<BaseTime> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut fragments: Vec<String> = Vec::with_capacity(2);
    for record in reader.records().take(2) {
        let record = record.map_err(|e| LoaderError::file_parse(path, e.to_string()))?;
        fragments.push(record.get(0).unwrap_or("").to_string());
    }

    match fragments.as_slice() {
        [date, time] => BaseTime::parse(date, time),
        _ => Err(LoaderError::TimeParse(format!(
            "{} has no date and time lines",
            path.display()
        ))),
    }
}

/// Parse the header (line 12) and samples (lines 13+) of a data file.
///
/// Every sample must be exactly as wide as the header and every cell must be
/// numeric; nothing is padded or coerced.
pub fn parse_data_text(path: &Path, text: &str) -> Result<DataFile> {
    let offset = header_offset(text).ok_or_else(|| {
        LoaderError::file_parse(
            path,
            format!(
                "expected at least {} lines, found {}",
                PREAMBLE_LINES + 1,
                text.lines().count()
            ),
        )
    })?;

    let body = &text[offset..];
    if body.lines().next().map_or(true, |l| l.trim().is_empty()) {
        return Err(LoaderError::file_parse(
            path,
            format!("header line {} is empty", PREAMBLE_LINES + 1),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| LoaderError::file_parse(path, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoaderError::file_parse(path, csv_error_reason(&e)))?;
        let line = record
            .position()
            .map_or(0, |p| p.line() + PREAMBLE_LINES as u64);

        let row = record
            .iter()
            .enumerate()
            .map(|(col, tok)| {
                tok.parse::<f64>().map_err(|_| {
                    LoaderError::file_parse(
                        path,
                        format!("line {line}, column {}: '{tok}' is not a number", col + 1),
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    debug!(
        "File {}: {} columns, {} rows",
        path.display(),
        header.len(),
        rows.len()
    );

    Ok(DataFile {
        path: path.to_path_buf(),
        header,
        rows,
    })
}

/// Read and parse a data file in one step.
pub fn parse_data_file(path: &Path) -> Result<DataFile> {
    let text = read_file(path)?;
    parse_data_text(path, &text)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Describe a csv error with line numbers counted from the top of the file.
fn csv_error_reason(e: &csv::Error) -> String {
    match e.kind() {
        csv::ErrorKind::UnequalLengths {
            pos: Some(pos),
            expected_len,
            len,
        } => format!(
            "line {}: {len} fields, expected {expected_len}",
            pos.line() + PREAMBLE_LINES as u64
        ),
        _ => match e.position() {
            Some(pos) => format!("line {}: {e}", pos.line() + PREAMBLE_LINES as u64),
            None => e.to_string(),
        },
    }
}

/// Byte offset of line 12, or `None` when the text ends before it.
fn header_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    let mut lines = text.split_inclusive('\n');
    for _ in 0..PREAMBLE_LINES {
        offset += lines.next()?.len();
    }
    lines.next()?;
    Some(offset)
}

fn sort_files(files: &mut [PathBuf], order: FileOrder) {
    match order {
        FileOrder::Listing => {}
        FileOrder::Lexical => files.sort_by(|a, b| a.file_name().cmp(&b.file_name())),
        FileOrder::Natural => {
            let re = name_segments_regex();
            files.sort_by(|a, b| natural_cmp_with(&re, &file_name(a), &file_name(b)));
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A run of a file name, digits compared by value.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NameSegment {
    /// Digits with leading zeros stripped; shorter means smaller.
    Digits { len: usize, digits: String },
    Text(String),
}

fn natural_key(re: &Regex, name: &str) -> Vec<NameSegment> {
    re.find_iter(name)
        .map(|m| {
            let s = m.as_str();
            if s.as_bytes()[0].is_ascii_digit() {
                let digits = s.trim_start_matches('0').to_string();
                NameSegment::Digits {
                    len: digits.len(),
                    digits,
                }
            } else {
                NameSegment::Text(s.to_string())
            }
        })
        .collect()
}

fn name_segments_regex() -> Regex {
    Regex::new(r"\d+|\D+").expect("regex is valid")
}

fn natural_cmp_with(re: &Regex, a: &str, b: &str) -> Ordering {
    natural_key(re, a)
        .cmp(&natural_key(re, b))
        .then_with(|| a.cmp(b))
}

/// Compare two file names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_with(&name_segments_regex(), a, b)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn dat_text(date: &str, time: &str, header: &str, rows: &[&str]) -> String {
        let mut lines = vec![date.to_string(), time.to_string()];
        for i in 0..9 {
            lines.push(format!("preamble {i}\tScan Rate\t100"));
        }
        lines.push(header.to_string());
        lines.extend(rows.iter().map(|r| r.to_string()));
        lines.join("\n") + "\n"
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "x").unwrap();
        path
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|p| file_name(p)).collect()
    }

    // ── find_data_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_data_files_substring_filter() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "run_0.dat");
        touch(dir.path(), "run_1.dat");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "run_1.dat.bak");

        let files = find_data_files(dir.path(), ".dat", FileOrder::Lexical).unwrap();
        assert_eq!(names(&files), vec!["run_0.dat", "run_1.dat", "run_1.dat.bak"]);
    }

    #[test]
    fn test_find_data_files_not_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested.dat");
        std::fs::create_dir_all(&sub).unwrap();
        touch(&sub, "inner.dat");
        touch(dir.path(), "outer.dat");

        let files = find_data_files(dir.path(), ".dat", FileOrder::Lexical).unwrap();
        assert_eq!(names(&files), vec!["outer.dat"]);
    }

    #[test]
    fn test_find_data_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        let files = find_data_files(dir.path(), ".dat", FileOrder::Listing).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_data_files_dangling_symlink_fails() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.dat");
        std::os::unix::fs::symlink("/nonexistent/ljstream-target", dir.path().join("b.dat"))
            .unwrap();

        let err = find_data_files(dir.path(), ".dat", FileOrder::Lexical).unwrap_err();
        match err {
            LoaderError::FileParse { path, .. } => assert!(path.ends_with("b.dat")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_find_data_files_skips_unrelated_dangling_symlink() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.dat");
        std::os::unix::fs::symlink("/nonexistent/ljstream-target", dir.path().join("notes.txt"))
            .unwrap();

        let files = find_data_files(dir.path(), ".dat", FileOrder::Lexical).unwrap();
        assert_eq!(names(&files), vec!["a.dat"]);
    }

    #[test]
    fn test_find_data_files_missing_folder() {
        let err = find_data_files(
            Path::new("/tmp/does-not-exist-ljstream-test-xyz"),
            ".dat",
            FileOrder::Lexical,
        )
        .unwrap_err();
        assert!(matches!(err, LoaderError::FolderRead { .. }));
    }

    #[test]
    fn test_find_data_files_natural_order() {
        let dir = TempDir::new().unwrap();
        for name in ["run_10.dat", "run_2.dat", "run_1.dat", "run_0.dat"] {
            touch(dir.path(), name);
        }

        let lexical = find_data_files(dir.path(), ".dat", FileOrder::Lexical).unwrap();
        assert_eq!(
            names(&lexical),
            vec!["run_0.dat", "run_1.dat", "run_10.dat", "run_2.dat"]
        );

        let natural = find_data_files(dir.path(), ".dat", FileOrder::Natural).unwrap();
        assert_eq!(
            names(&natural),
            vec!["run_0.dat", "run_1.dat", "run_2.dat", "run_10.dat"]
        );
    }

    #[test]
    fn test_find_data_files_listing_keeps_all() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.dat");
        touch(dir.path(), "a.dat");
        let mut files = names(&find_data_files(dir.path(), ".dat", FileOrder::Listing).unwrap());
        files.sort();
        assert_eq!(files, vec!["a.dat", "b.dat"]);
    }

    // ── natural_cmp ───────────────────────────────────────────────────────────

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("x_2.dat", "x_10.dat"), Ordering::Less);
        assert_eq!(natural_cmp("x_10.dat", "x_9.dat"), Ordering::Greater);
        assert_eq!(natural_cmp("x_02.dat", "x_2.dat"), Ordering::Less);
        assert_eq!(natural_cmp("a.dat", "a.dat"), Ordering::Equal);
        assert_eq!(natural_cmp("a_1.dat", "b_0.dat"), Ordering::Less);
    }

    // ── base_time_from_text ───────────────────────────────────────────────────

    #[test]
    fn test_base_time_from_text() {
        let text = dat_text("12/9/2013", "7:28:06 PM", "Time\tv0\tv1", &[]);
        let bt = base_time_from_text(Path::new("a.dat"), &text).unwrap();
        assert_eq!(bt.naive().to_string(), "2013-12-09 19:28:06");
    }

    #[test]
    fn test_base_time_uses_first_column_only() {
        let text = dat_text("1/1/2014\textra", "9:00:00 AM\tmore", "Time\tv0\tv1", &[]);
        let bt = base_time_from_text(Path::new("a.dat"), &text).unwrap();
        assert_eq!(bt.naive().to_string(), "2014-01-01 09:00:00");
    }

    #[test]
    fn test_base_time_malformed() {
        let text = dat_text("Time", "Channel", "Time\tv0\tv1", &[]);
        let err = base_time_from_text(Path::new("a.dat"), &text).unwrap_err();
        assert!(matches!(err, LoaderError::TimeParse(_)));
    }

    #[test]
    fn test_base_time_single_line() {
        let err = base_time_from_text(Path::new("a.dat"), "1/1/2014\n").unwrap_err();
        assert!(matches!(err, LoaderError::TimeParse(_)));
    }

    // ── parse_data_text ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_data_text_basic() {
        let text = dat_text(
            "1/1/2014",
            "9:00:00 AM",
            "Time\tv0\tv1",
            &["0.000\t1.5\t2.5", "0.010\t1.6\t2.6"],
        );
        let parsed = parse_data_text(Path::new("a.dat"), &text).unwrap();
        assert_eq!(parsed.header, vec!["Time", "v0", "v1"]);
        assert_eq!(parsed.rows, vec![vec![0.0, 1.5, 2.5], vec![0.01, 1.6, 2.6]]);
    }

    #[test]
    fn test_parse_data_text_crlf_and_scientific() {
        let text = dat_text("1/1/2014", "9:00:00 AM", "Time\tv0\tv1", &["1E-3\t-2.5e1\t0"])
            .replace('\n', "\r\n");
        let parsed = parse_data_text(Path::new("a.dat"), &text).unwrap();
        assert_eq!(parsed.rows, vec![vec![0.001, -25.0, 0.0]]);
    }

    #[test]
    fn test_parse_data_text_header_only() {
        let text = dat_text("1/1/2014", "9:00:00 AM", "Time\tv0\tv1", &[]);
        let parsed = parse_data_text(Path::new("a.dat"), &text).unwrap();
        assert_eq!(parsed.header.len(), 3);
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_parse_data_text_too_short() {
        let text = "1/1/2014\n9:00:00 AM\npreamble\n";
        let err = parse_data_text(Path::new("short.dat"), text).unwrap_err();
        match err {
            LoaderError::FileParse { path, reason } => {
                assert_eq!(path, PathBuf::from("short.dat"));
                assert!(reason.contains("at least 12 lines"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_data_text_ragged_row() {
        let text = dat_text(
            "1/1/2014",
            "9:00:00 AM",
            "Time\tv0\tv1",
            &["0.0\t1.0\t2.0", "0.1\t1.0"],
        );
        let err = parse_data_text(Path::new("a.dat"), &text).unwrap_err();
        match err {
            LoaderError::FileParse { reason, .. } => {
                assert!(reason.starts_with("line 14:"), "{reason}");
                assert!(reason.contains("2 fields, expected 3"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_data_text_non_numeric() {
        let text = dat_text(
            "1/1/2014",
            "9:00:00 AM",
            "Time\tv0\tv1",
            &["0.0\t1.0\t2.0", "0.1\toops\t2.0"],
        );
        let err = parse_data_text(Path::new("a.dat"), &text).unwrap_err();
        match err {
            LoaderError::FileParse { reason, .. } => {
                assert!(reason.contains("line 14"), "{reason}");
                assert!(reason.contains("column 2"), "{reason}");
                assert!(reason.contains("oops"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_data_file_missing() {
        let err = parse_data_file(Path::new("/tmp/ljstream-missing-file.dat")).unwrap_err();
        assert!(matches!(err, LoaderError::FileParse { .. }));
    }

    #[test]
    fn test_header_offset() {
        let text: String = (1..=12).map(|i| format!("l{i}\n")).collect();
        let offset = header_offset(&text).unwrap();
        assert!(text[offset..].starts_with("l12"));
        let short: String = (1..=11).map(|i| format!("l{i}\n")).collect();
        assert!(header_offset(&short).is_none());
    }
}
