//! Spreadsheet discovery and timestamp-column loading.
//!
//! Input paths may be files or directories; directories are walked for
//! spreadsheet exports. Each file yields the parsed [`EventTime`]s of its
//! timestamp column, or an error naming the file, row and offending value.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader};
use pulse_core::error::{PulseError, Result};
use pulse_core::time_utils::{parse_timestamp, EventTime};
use tracing::{debug, warn};

/// Extensions recognised as spreadsheet inputs (compared case-insensitively).
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// Decoder used for a given input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel or OpenDocument workbook, first worksheet.
    Workbook,
    /// Delimited text with a header line.
    Csv,
}

impl SourceFormat {
    /// Pick a decoder from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all spreadsheet files recursively under `dir`, sorted by path.
pub fn find_spreadsheet_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_spreadsheet(entry.path()))
        // Skip Office lock files such as `~$orders.xlsx`.
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with("~$"))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand the selected paths into the list of files to load.
///
/// Files are kept in the given order (even with an unknown extension, so
/// that the run reports it); directories are replaced by the spreadsheet
/// files found beneath them. Duplicates are dropped.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        let candidates = if path.is_dir() {
            let found = find_spreadsheet_files(path);
            debug!("Found {} spreadsheet files in {}", found.len(), path.display());
            found
        } else {
            vec![path.clone()]
        };

        for file in candidates {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    files
}

/// Read the timestamp column `column` from `path`.
///
/// Empty cells are skipped. Any other cell that is not a
/// `DD.MM.YYYY HH:MM:SS` string or a native date-time cell fails the read.
pub fn read_event_times(path: &Path, column: &str) -> Result<Vec<EventTime>> {
    let format = SourceFormat::from_path(path)
        .ok_or_else(|| PulseError::UnsupportedFormat(path.to_path_buf()))?;

    let events = match format {
        SourceFormat::Csv => read_csv(path, column)?,
        SourceFormat::Workbook => read_workbook(path, column)?,
    };

    debug!("Read {} timestamps from {}", events.len(), path.display());
    Ok(events)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Parse one text cell; `Ok(None)` for blank cells.
fn parse_text_cell(path: &Path, row: usize, raw: &str) -> Result<Option<EventTime>> {
    if raw.trim().is_empty() {
        debug!("Skipping empty timestamp at {}:{}", path.display(), row);
        return Ok(None);
    }
    parse_timestamp(raw)
        .map(|ts| Some(EventTime::from(ts)))
        .map_err(|_| PulseError::TimestampParse {
            path: path.to_path_buf(),
            row,
            value: raw.to_string(),
        })
}

/// Choose the CSV delimiter from the header line: `;`, `,` or tab, whichever
/// occurs most, `,` on ties.
fn sniff_delimiter(header_line: &str) -> u8 {
    let count = |c: char| header_line.matches(c).count();
    let (commas, semicolons, tabs) = (count(','), count(';'), count('\t'));
    if semicolons > commas && semicolons >= tabs {
        b';'
    } else if tabs > commas && tabs > semicolons {
        b'\t'
    } else {
        b','
    }
}

fn find_column<'a, I>(headers: I, column: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    headers.into_iter().position(|h| h.trim() == column)
}

fn read_csv(path: &Path, column: &str) -> Result<Vec<EventTime>> {
    let content = std::fs::read_to_string(path).map_err(|source| PulseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let header_line = content.lines().next().unwrap_or("");
    if header_line.trim().is_empty() {
        return Err(PulseError::EmptySheet(path.to_path_buf()));
    }

    let csv_error = |e: csv::Error| PulseError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(header_line))
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(csv_error)?.clone();
    let idx = find_column(headers.iter(), column).ok_or_else(|| PulseError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    })?;

    let mut events = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        let raw = record.get(idx).unwrap_or("");
        if let Some(event) = parse_text_cell(path, row, raw)? {
            events.push(event);
        }
    }

    Ok(events)
}

fn read_workbook(path: &Path, column: &str) -> Result<Vec<EventTime>> {
    let workbook_error = |message: String| PulseError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(workbook_error(e.to_string())),
        None => return Err(PulseError::EmptySheet(path.to_path_buf())),
    };

    // Row numbers reported to the user are 1-based sheet rows.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0) + 1;
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| PulseError::EmptySheet(path.to_path_buf()))?;
    let header_text: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
    let idx = find_column(header_text.iter().map(String::as_str), column).ok_or_else(|| {
        PulseError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }
    })?;

    let mut events = Vec::new();
    for (i, cells) in rows.enumerate() {
        let row = first_row + 1 + i;
        let parsed = match cells.get(idx).unwrap_or(&Data::Empty) {
            Data::Empty => None,
            Data::String(raw) => parse_text_cell(path, row, raw)?,
            cell @ (Data::DateTime(_) | Data::DateTimeIso(_)) => {
                let ts = cell.as_datetime().ok_or_else(|| PulseError::TimestampParse {
                    path: path.to_path_buf(),
                    row,
                    value: cell.to_string(),
                })?;
                Some(EventTime::from(ts))
            }
            other => {
                return Err(PulseError::TimestampParse {
                    path: path.to_path_buf(),
                    row,
                    value: other.to_string(),
                })
            }
        };
        if let Some(event) = parsed {
            events.push(event);
        }
    }

    Ok(events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::models::Weekday;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    // ── SourceFormat ──────────────────────────────────────────────────────────

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("orders.xlsx")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("orders.xls")),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(SourceFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    // ── sniff_delimiter ───────────────────────────────────────────────────────

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("id,created,total"), b',');
        assert_eq!(sniff_delimiter("id;created;total"), b';');
        assert_eq!(sniff_delimiter("id\tcreated\ttotal"), b'\t');
        assert_eq!(sniff_delimiter("created"), b',');
    }

    // ── find_spreadsheet_files / expand_paths ─────────────────────────────────

    #[test]
    fn test_find_spreadsheet_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("march");
        fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "b.xlsx", "");
        write_file(dir.path(), "a.csv", "");
        write_file(&sub, "c.XLS", "");
        write_file(dir.path(), "readme.txt", "");
        write_file(dir.path(), "~$b.xlsx", "");

        let files = find_spreadsheet_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.xlsx", "c.XLS"]);
    }

    #[test]
    fn test_find_spreadsheet_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_spreadsheet_files(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_expand_paths_mixes_files_and_dirs_without_duplicates() {
        let dir = TempDir::new().unwrap();
        let a = write_file(dir.path(), "a.csv", "");
        let b = write_file(dir.path(), "b.csv", "");

        let files = expand_paths(&[b.clone(), dir.path().to_path_buf(), a.clone()]);
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn test_expand_paths_empty() {
        assert!(expand_paths(&[]).is_empty());
    }

    // ── read_event_times (CSV) ────────────────────────────────────────────────

    #[test]
    fn test_read_csv_comma() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "orders.csv",
            "id,Created,total\n1, 15.01.2024 09:10:00 ,10\n2,16.01.2024 18:00:00,20\n",
        );

        let events = read_event_times(&path, "Created").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].weekday(), Weekday::Monday);
        assert_eq!(events[0].hour(), 9);
        assert_eq!(events[1].weekday(), Weekday::Tuesday);
        assert_eq!(events[1].hour(), 18);
    }

    #[test]
    fn test_read_csv_semicolon_with_bom_and_cyrillic_header() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "orders.csv",
            "\u{feff}Номер;Время создания\n1;20.01.2024 12:00:00\n",
        );

        let events = read_event_times(&path, "Время создания").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].weekday(), Weekday::Saturday);
    }

    #[test]
    fn test_read_csv_header_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "o.csv", "id, Created \n1,15.01.2024 09:10:00\n");
        assert_eq!(read_event_times(&path, "Created").unwrap().len(), 1);
    }

    #[test]
    fn test_read_csv_skips_empty_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "orders.csv",
            "id,Created\n1,15.01.2024 09:10:00\n2,   \n3\n4,15.01.2024 10:00:00\n",
        );
        assert_eq!(read_event_times(&path, "Created").unwrap().len(), 2);
    }

    #[test]
    fn test_read_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "orders.csv", "id,when\n1,15.01.2024 09:10:00\n");

        let err = read_event_times(&path, "Created").unwrap_err();
        assert!(matches!(err, PulseError::MissingColumn { ref column, .. } if column == "Created"));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_read_csv_malformed_timestamp_reports_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "orders.csv",
            "id,Created\n1,15.01.2024 09:10:00\n2,2024-01-15 09:10:00\n",
        );

        let err = read_event_times(&path, "Created").unwrap_err();
        match err {
            PulseError::TimestampParse { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "2024-01-15 09:10:00");
            }
            other => panic!("expected TimestampParse, got {other:?}"),
        }
    }

    #[test]
    fn test_read_csv_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "empty.csv", "");
        assert!(matches!(
            read_event_times(&path, "Created"),
            Err(PulseError::EmptySheet(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_event_times(&dir.path().join("gone.csv"), "Created").unwrap_err();
        assert!(matches!(err, PulseError::FileRead { .. }));
    }

    #[test]
    fn test_read_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "orders.txt", "Created\n15.01.2024 09:10:00\n");
        assert!(matches!(
            read_event_times(&path, "Created"),
            Err(PulseError::UnsupportedFormat(_))
        ));
    }

    // ── read_event_times (workbook) ───────────────────────────────────────────

    fn write_workbook(dir: &Path, name: &str, cells: &[(u32, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 1, " Время создания ").unwrap();
        for &(row, text) in cells {
            sheet.write_number(row, 0, f64::from(row)).unwrap();
            sheet.write_string(row, 1, text).unwrap();
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_workbook_text_and_native_datetimes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "id").unwrap();
        sheet.write_string(0, 1, " Время создания ").unwrap();
        sheet.write_number(1, 0, 1).unwrap();
        sheet.write_string(1, 1, "  15.01.2024 09:10:00 ").unwrap();
        // Row 3 has an id but no timestamp.
        sheet.write_number(2, 0, 2).unwrap();
        sheet.write_number(3, 0, 3).unwrap();
        let when = ExcelDateTime::from_ymd(2024, 1, 16)
            .unwrap()
            .and_hms(18, 30, 0)
            .unwrap();
        let format = Format::new().set_num_format("dd.mm.yyyy hh:mm:ss");
        sheet.write_datetime_with_format(3, 1, &when, &format).unwrap();
        workbook.save(&path).unwrap();

        let events = read_event_times(&path, "Время создания").unwrap();
        let stamps: Vec<String> = events
            .iter()
            .map(|e| e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
            .collect();
        assert_eq!(stamps, vec!["2024-01-15 09:10:00", "2024-01-16 18:30:00"]);
        assert_eq!(events[0].weekday(), Weekday::Monday);
        assert_eq!(events[1].weekday(), Weekday::Tuesday);
        assert_eq!(events[1].hour(), 18);
    }

    #[test]
    fn test_read_workbook_malformed_cell_reports_sheet_row() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(
            dir.path(),
            "orders.xlsx",
            &[(1, "15.01.2024 09:10:00"), (2, "2024-01-15")],
        );

        let err = read_event_times(&path, "Время создания").unwrap_err();
        match err {
            PulseError::TimestampParse { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "2024-01-15");
            }
            other => panic!("expected TimestampParse, got {other:?}"),
        }
    }

    #[test]
    fn test_read_workbook_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(dir.path(), "orders.xlsx", &[(1, "15.01.2024 09:10:00")]);
        assert!(matches!(
            read_event_times(&path, "Created"),
            Err(PulseError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_read_corrupt_workbook() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "orders.xlsx", "this is not a zip archive");
        let err = read_event_times(&path, "Created").unwrap_err();
        assert!(matches!(err, PulseError::Workbook { .. }));
        assert!(err.to_string().contains("orders.xlsx"));
    }
}
