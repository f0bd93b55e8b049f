// 📂 Row Source - CSV input for the blog batch
// Lazy, finite, in-order sequence of input rows

use crate::error::ReadError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Columns every input file must carry (extra columns are ignored)
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "average_revenue", "average_cost_to_start"];

// ============================================================================
// CORE TYPES
// ============================================================================

/// InputRow - one business from the input file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputRow {
    pub name: String,
    pub average_revenue: f64,
    pub average_cost_to_start: f64,

    /// Line in the input file (1-indexed, header is line 1)
    #[serde(skip)]
    pub line_number: u64,
}

// ============================================================================
// ROW SOURCE
// ============================================================================

/// RowSource - iterator over the rows of a CSV file
///
/// A malformed line yields an `Err` for that line only; the next call to
/// `next()` continues with the following line.
pub struct RowSource {
    headers: StringRecord,
    records: StringRecordsIntoIter<File>,
}

impl RowSource {
    /// Open a CSV file and validate its header row
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|source| ReadError::Open {
                path: path.display().to_string(),
                source,
            })?;

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ReadError::MissingColumn(column));
            }
        }

        Ok(RowSource {
            headers,
            records: reader.into_records(),
        })
    }

    fn decode(&self, record: &StringRecord) -> Result<InputRow, ReadError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let mut row: InputRow =
            record
                .deserialize(Some(&self.headers))
                .map_err(|e| ReadError::MalformedRow {
                    line,
                    message: e.to_string(),
                })?;

        if row.name.is_empty() {
            return Err(ReadError::MalformedRow {
                line,
                message: "empty name".to_string(),
            });
        }

        if !row.average_revenue.is_finite() || !row.average_cost_to_start.is_finite() {
            return Err(ReadError::MalformedRow {
                line,
                message: "numeric columns must be finite".to_string(),
            });
        }

        row.line_number = line;
        Ok(row)
    }
}

impl Iterator for RowSource {
    type Item = Result<InputRow, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(match record {
            Ok(record) => self.decode(&record),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Err(ReadError::MalformedRow {
                    line,
                    message: e.to_string(),
                })
            }
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_rows_in_file_order() {
        let file = write_csv(
            "name,average_revenue,average_cost_to_start\n\
             Smith Dental,450000,120000\n\
             Jones Accounting,300000.5,25000\n",
        );

        let rows: Vec<InputRow> = RowSource::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Smith Dental");
        assert_eq!(rows[0].average_revenue, 450000.0);
        assert_eq!(rows[0].line_number, 2);
        assert_eq!(rows[1].name, "Jones Accounting");
        assert_eq!(rows[1].average_revenue, 300000.5);
        assert_eq!(rows[1].average_cost_to_start, 25000.0);
        assert_eq!(rows[1].line_number, 3);
    }

    #[test]
    fn test_extra_columns_and_whitespace_are_tolerated() {
        let file = write_csv(
            "id,name,average_revenue,average_cost_to_start\n\
             7, Dr. Lee , 100 , 50 \n",
        );

        let rows: Vec<InputRow> = RowSource::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows[0].name, "Dr. Lee");
        assert_eq!(rows[0].average_revenue, 100.0);
        assert_eq!(rows[0].average_cost_to_start, 50.0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = RowSource::open(Path::new("/nonexistent/data.csv"));
        assert!(matches!(result, Err(ReadError::Open { .. })));
    }

    #[test]
    fn test_missing_column_is_read_error() {
        let file = write_csv("name,average_revenue\nSmith,1\n");
        let result = RowSource::open(file.path());
        assert!(matches!(
            result,
            Err(ReadError::MissingColumn("average_cost_to_start"))
        ));
    }

    #[test]
    fn test_malformed_line_is_skipped_not_fatal() {
        let file = write_csv(
            "name,average_revenue,average_cost_to_start\n\
             Good One,1,2\n\
             Bad Number,lots,2\n\
             ,3,4\n\
             Good Two,5,6\n",
        );

        let results: Vec<_> = RowSource::open(file.path()).unwrap().collect();
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ReadError::MalformedRow { line: 3, .. })
        ));
        assert!(matches!(
            results[2],
            Err(ReadError::MalformedRow { line: 4, .. })
        ));
        assert_eq!(results[3].as_ref().unwrap().name, "Good Two");
    }

    #[test]
    fn test_short_row_is_skipped_and_reading_continues() {
        let file = write_csv(
            "name,average_revenue,average_cost_to_start\n\
             Good One,1,2\n\
             Short Row,1\n\
             Good Two,5,6\n",
        );

        let results: Vec<_> = RowSource::open(file.path()).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(
            results[1],
            Err(ReadError::MalformedRow { line: 3, .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().name, "Good Two");
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let file = write_csv(
            "name,average_revenue,average_cost_to_start\n\
             Not A Number,NaN,3\n\
             Infinite Cost,1,inf\n\
             Negative Infinity,-inf,3\n\
             Fine Dental,1,3\n",
        );

        let results: Vec<_> = RowSource::open(file.path()).unwrap().collect();
        assert_eq!(results.len(), 4);
        for (i, line) in [(0, 2), (1, 3), (2, 4)] {
            assert!(
                matches!(&results[i], Err(ReadError::MalformedRow { line: l, .. }) if *l == line),
                "row on line {} should be rejected",
                line
            );
        }
        assert_eq!(results[3].as_ref().unwrap().name, "Fine Dental");
    }
}
