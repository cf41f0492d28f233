//! CSV reading for both dialects

use super::{CsvTable, Dialect};
use crate::domain::{CsvError, OddballLineError};

/// Detects the dialect of `bytes` and parses them into a rectangular table
pub fn read_table(bytes: &[u8]) -> Result<CsvTable, CsvError> {
    let dialect = Dialect::detect(bytes).ok_or(CsvError::EmptyInput)?;
    let rows = match dialect {
        Dialect::Oddball => read_oddball(bytes)?,
        Dialect::Standard => read_standard(bytes)?,
    };
    let table = CsvTable::new(dialect, rows)?;

    tracing::debug!(dialect = %dialect, rows = table.len(), "CSV parsed");

    Ok(table)
}

fn read_oddball(bytes: &[u8]) -> Result<Vec<Vec<String>>, CsvError> {
    let mut rows = Vec::new();
    for (line_index, raw_line) in split_lines(bytes).enumerate() {
        let line = std::str::from_utf8(raw_line).map_err(|_| CsvError::InvalidUtf8 {
            line_index,
            line_hex: hex::encode(raw_line),
        })?;
        let fields = parse_oddball_line(line).map_err(|reason| CsvError::OddballLine {
            line_index,
            line: line.to_string(),
            reason,
        })?;
        rows.push(fields);
    }
    Ok(rows)
}

/// Splits on `\n`, drops one trailing `\r` per line and ignores a final empty segment
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn read_standard(bytes: &[u8]) -> Result<Vec<Vec<String>>, CsvError> {
    // Width is checked by the caller so the error names the row index
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CsvError::Standard(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Parses one oddball line into its fields
///
/// Each field starts with `"` or `="` and ends at the next lone `"`. A doubled
/// `""` inside a field is kept verbatim in the field content. A closing quote
/// must be followed by `,` or the end of the line.
///
/// # Examples
///
/// ```
/// use cvr_sanitizer::core::csv::parse_oddball_line;
///
/// assert_eq!(parse_oddball_line("=\"123\",\"abc\"").unwrap(), vec!["123", "abc"]);
/// assert_eq!(parse_oddball_line("\"c\"\"d\"").unwrap(), vec!["c\"\"d"]);
/// ```
pub fn parse_oddball_line(line: &str) -> Result<Vec<String>, OddballLineError> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'"' {
            i += 1;
        } else if bytes[i..].starts_with(b"=\"") {
            i += 2;
        } else {
            return Err(OddballLineError::MissingFieldPrefix(i));
        }

        if i >= bytes.len() {
            return Err(OddballLineError::UnexpectedEndOfLine);
        }

        let end = find_field_end(bytes, i)?;
        // Both bounds sit next to ASCII quotes so they are char boundaries
        fields.push(line[i..end].to_string());
        i = end + 1;

        if i == bytes.len() {
            break;
        }
        if bytes[i] == b',' {
            i += 1;
            continue;
        }
        return Err(OddballLineError::UnexpectedSeparator {
            found: line[i..].chars().next().unwrap_or_default(),
            offset: i,
        });
    }

    Ok(fields)
}

/// Returns the index of the quote closing the field starting at `start`
fn find_field_end(bytes: &[u8], start: usize) -> Result<usize, OddballLineError> {
    let mut escaped = false;
    for (i, byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'"' if escaped => escaped = false,
            b'"' if bytes.get(i + 1) == Some(&b'"') => escaped = true,
            b'"' => return Ok(i),
            _ => escaped = false,
        }
    }
    Err(OddballLineError::UnterminatedField)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("\"a\",\"b\",\"c\"", &["a", "b", "c"] ; "plain quoted")]
    #[test_case("=\"123\",=\"456\",=\"789\"", &["123", "456", "789"] ; "equals quoted")]
    #[test_case("\"ab\",\"c\"\"d\",\"ef\"", &["ab", "c\"\"d", "ef"] ; "doubled quote kept")]
    #[test_case("=\"\",\"\",\"x\"", &["", "", "x"] ; "empty fields")]
    #[test_case("\"a,b\",=\"-\"", &["a,b", "-"] ; "comma inside field")]
    #[test_case("\"ab\"\"\"", &["ab\"\""] ; "doubled quote before close")]
    #[test_case("\"a\",", &["a"] ; "trailing comma")]
    #[test_case("", &[] ; "empty line")]
    fn test_parse_oddball_line(line: &str, expected: &[&str]) {
        assert_eq!(parse_oddball_line(line).unwrap(), expected);
    }

    #[test]
    fn test_parse_oddball_line_errors() {
        assert_eq!(
            parse_oddball_line("a,\"b\""),
            Err(OddballLineError::MissingFieldPrefix(0))
        );
        assert_eq!(
            parse_oddball_line("\"a\",b"),
            Err(OddballLineError::MissingFieldPrefix(4))
        );
        assert_eq!(
            parse_oddball_line("\"a\",\""),
            Err(OddballLineError::UnexpectedEndOfLine)
        );
        assert_eq!(
            parse_oddball_line("\"abc"),
            Err(OddballLineError::UnterminatedField)
        );
        assert_eq!(
            parse_oddball_line("\"a\";\"b\""),
            Err(OddballLineError::UnexpectedSeparator {
                found: ';',
                offset: 3
            })
        );
    }

    #[test]
    fn test_read_oddball_table_with_crlf() {
        let table = read_table(b"\"h1\",\"h2\"\r\n=\"1\",\"x\"\r\n").unwrap();
        assert_eq!(table.dialect(), Dialect::Oddball);
        assert_eq!(
            table.rows(),
            &[
                vec!["h1".to_string(), "h2".to_string()],
                vec!["1".to_string(), "x".to_string()]
            ]
        );
    }

    #[test]
    fn test_read_oddball_without_final_newline() {
        let table = read_table(b"\"a\"\n\"b\"").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_read_oddball_reports_line_index() {
        let err = read_table(b"\"a\",\"b\"\r\n\"c\",d\r\n").unwrap_err();
        match err {
            CsvError::OddballLine {
                line_index, line, ..
            } => {
                assert_eq!(line_index, 1);
                assert_eq!(line, "\"c\",d");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_oddball_invalid_utf8() {
        let err = read_table(b"\"a\"\n\"\xff\"\n").unwrap_err();
        assert_eq!(
            err,
            CsvError::InvalidUtf8 {
                line_index: 1,
                line_hex: "22ff22".to_string()
            }
        );
    }

    #[test]
    fn test_read_ragged_table() {
        let err = read_table(b"\"a\",\"b\"\n\"c\"\n").unwrap_err();
        assert_eq!(
            err,
            CsvError::RaggedRow {
                row_index: 1,
                expected: 2,
                found: 1
            }
        );

        let err = read_table(b"a,b\nc,d\ne,f,g\n").unwrap_err();
        assert_eq!(
            err,
            CsvError::RaggedRow {
                row_index: 2,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_read_standard_table() {
        let table = read_table(b"a,\"b,c\",\"d\"\"e\"\n1,2,3\n").unwrap();
        assert_eq!(table.dialect(), Dialect::Standard);
        assert_eq!(table.rows()[0], vec!["a", "b,c", "d\"e"]);
        assert_eq!(table.rows()[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_read_empty_input() {
        assert_eq!(read_table(b"").unwrap_err(), CsvError::EmptyInput);
    }
}
