//! CSV writing for both dialects
//!
//! The oddball writer reproduces the export software's own quirks: the first
//! [`HEADER_ROWS`] rows are written as plain quoted fields, and in data rows the
//! first [`PREFIXED_COLUMNS`] columns wrap digit/hyphen content (and empty content)
//! as `="..."`.

use super::{CsvTable, Dialect};
use crate::domain::CsvError;

/// Rows written with header quoting in the oddball dialect
pub const HEADER_ROWS: usize = 4;

/// Leading data columns eligible for `="..."` wrapping
pub const PREFIXED_COLUMNS: usize = 5;

/// Serializes `table` in its own dialect
pub fn write_table(table: &CsvTable) -> Result<Vec<u8>, CsvError> {
    match table.dialect() {
        Dialect::Oddball => Ok(write_oddball(table.rows())),
        Dialect::Standard => write_standard(table.rows()),
    }
}

fn write_oddball(rows: &[Vec<String>]) -> Vec<u8> {
    let mut out = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index < HEADER_ROWS {
            out.push('"');
            out.push_str(&row.join("\",\""));
            out.push('"');
        } else {
            let fields: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(column, field)| oddball_data_field(column, field))
                .collect();
            out.push_str(&fields.join(","));
        }
        out.push_str("\r\n");
    }
    out.into_bytes()
}

fn oddball_data_field(column: usize, field: &str) -> String {
    if column < PREFIXED_COLUMNS && is_digits_or_hyphens(field) {
        format!("=\"{field}\"")
    } else {
        format!("\"{field}\"")
    }
}

/// Empty content also qualifies
fn is_digits_or_hyphens(field: &str) -> bool {
    field.bytes().all(|b| b.is_ascii_digit() || b == b'-')
}

fn write_standard(rows: &[Vec<String>]) -> Result<Vec<u8>, CsvError> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| CsvError::Write(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn header_rows(width: usize) -> Vec<Vec<String>> {
        (0..HEADER_ROWS)
            .map(|r| (0..width).map(|c| format!("h{r}{c}")).collect())
            .collect()
    }

    #[test]
    fn test_oddball_data_row_wrapping() {
        let mut rows = header_rows(7);
        rows.push(row(&["0", "1", "2", "3", "4", "5", "6"]));
        let table = CsvTable::new(Dialect::Oddball, rows).unwrap();

        let bytes = write_table(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let last_line = text.split_inclusive("\r\n").last().unwrap();
        assert_eq!(last_line, "=\"0\",=\"1\",=\"2\",=\"3\",=\"4\",\"5\",\"6\"\r\n");
    }

    #[test]
    fn test_oddball_empty_and_text_fields() {
        assert_eq!(oddball_data_field(0, ""), "=\"\"");
        assert_eq!(oddball_data_field(4, "-"), "=\"-\"");
        assert_eq!(oddball_data_field(3, "0x1234"), "\"0x1234\"");
        assert_eq!(oddball_data_field(5, ""), "\"\"");
        assert_eq!(oddball_data_field(6, "12"), "\"12\"");
    }

    #[test]
    fn test_oddball_header_rows_plain_quoted() {
        let rows = vec![row(&["5.10.50.85", "123", ""])];
        let table = CsvTable::new(Dialect::Oddball, rows).unwrap();
        assert_eq!(
            write_table(&table).unwrap(),
            b"\"5.10.50.85\",\"123\",\"\"\r\n".to_vec()
        );
    }

    #[test]
    fn test_oddball_round_trip() {
        let input = concat!(
            "\"Election\",\"5.10.50.85\",\"\",\"\",\"\",\"\"\r\n",
            "\"\",\"\",\"\",\"\",\"\",\"Contest\"\r\n",
            "\"\",\"\",\"\",\"\",\"\",\"Choice\"\r\n",
            "\"CvrNumber\",\"TabulatorNum\",\"BatchId\",\"RecordId\",\"ImprintedId\",\"Vote\"\r\n",
            "=\"1\",=\"5\",=\"10\",=\"3\",=\"5-10-3\",\"1\"\r\n",
            "=\"2\",=\"5\",=\"10\",=\"4\",=\"\",\"\"\r\n",
            "=\"3\",=\"5\",=\"10\",\"0x05\",\"a\"\"b\",\"x\"\r\n",
        );
        let table = CsvTable::parse(input.as_bytes()).unwrap();
        assert_eq!(table.dialect(), Dialect::Oddball);
        assert_eq!(write_table(&table).unwrap(), input.as_bytes().to_vec());
    }

    #[test]
    fn test_standard_round_trip() {
        let input = "a,\"b,c\",\"d\"\"e\"\n1,2,3\n,,\n";
        let table = CsvTable::parse(input.as_bytes()).unwrap();
        assert_eq!(table.dialect(), Dialect::Standard);
        assert_eq!(write_table(&table).unwrap(), input.as_bytes().to_vec());
    }
}
