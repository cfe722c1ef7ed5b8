use std::collections::HashMap;
use tracing::{debug, info, warn};
use crate::domain::{
    error::ImportError,
    models::{RawRow, RawTable},
};

const STRAY_QUOTES: &[char] = &['"', '\''];

/// Parses exported CSV text into a header row and ordered data rows.
///
/// Line-oriented: quoted fields may contain commas and doubled quotes but
/// not line breaks. Short rows are padded with empty values, surplus fields
/// are dropped.
pub fn parse_csv(text: &str) -> Result<RawTable, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let (Some(header_line), Some(first_row)) = (lines.next(), lines.next()) else {
        warn!("CSV input has fewer than two non-blank lines");
        return Err(ImportError::ParseEmpty);
    };

    let headers = split_fields(header_line);
    debug!("CSV headers: {:?}", headers);
    info!("Found {} columns in CSV", headers.len());

    let mut rows = Vec::new();
    for (index, line) in std::iter::once(first_row).chain(lines).enumerate() {
        let fields = split_fields(line);
        if fields.len() < headers.len() {
            debug!("Row {} has {} of {} fields, padding", index + 1, fields.len(), headers.len());
        }

        let mut values = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            values.insert(header.clone(), fields.get(i).cloned().unwrap_or_default());
        }
        rows.push(RawRow { index, values });

        if rows.len() % 1000 == 0 {
            debug!("Processed {} CSV rows", rows.len());
        }
    }

    info!("Parsed {} rows from CSV", rows.len());
    Ok(RawTable { headers, rows })
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rest = line;

    loop {
        let trimmed = rest.trim_start();
        let (field, remainder) = match trimmed.strip_prefix('"').and_then(read_quoted) {
            Some(parsed) => parsed,
            None => read_unquoted(trimmed),
        };
        fields.push(field);

        match remainder.strip_prefix(',') {
            Some(next) => rest = next,
            None => break,
        }
    }

    fields
}

/// Reads the body of a quoted field, starting just after the opening quote.
/// Returns `None` when the quote is never closed on this line.
fn read_quoted(body: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '"' {
            value.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '"'))) {
            chars.next();
            value.push('"');
            continue;
        }

        let after = &body[i + 1..];
        let end = after.find(',').unwrap_or(after.len());
        value.push_str(after[..end].trim());
        return Some((value, &after[end..]));
    }

    None
}

fn read_unquoted(text: &str) -> (String, &str) {
    let end = text.find(',').unwrap_or(text.len());
    let raw = text[..end].trim();
    let raw = raw.strip_prefix(STRAY_QUOTES).unwrap_or(raw);
    let raw = raw.strip_suffix(STRAY_QUOTES).unwrap_or(raw);
    (raw.trim().to_string(), &text[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(table: &RawTable, row: usize) -> Vec<&str> {
        table
            .headers
            .iter()
            .map(|h| table.rows[row].value(h).unwrap())
            .collect()
    }

    #[test]
    fn test_parses_header_and_rows() {
        let table = parse_csv("Name,Phone,Address\nAli,+9715,Dubai\nSara,+9716,Sharjah\n").unwrap();

        assert_eq!(table.headers, vec!["Name", "Phone", "Address"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(values(&table, 0), vec!["Ali", "+9715", "Dubai"]);
        assert_eq!(table.rows[1].index, 1);
        assert!(table.rows.iter().all(|r| r.values.len() == 3));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let table = parse_csv("a,b\r\n\r\n1,2\r\n   \r\n3,4\r\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(values(&table, 1), vec!["3", "4"]);
    }

    #[test]
    fn test_quoted_comma_stays_in_one_field() {
        let table = parse_csv("name,city\nAli,\"Dubai, UAE\"\n").unwrap();
        assert_eq!(table.rows[0].value("city"), Some("Dubai, UAE"));
        assert_eq!(table.rows[0].values.len(), 2);
    }

    #[test]
    fn test_doubled_quote_decodes_to_one() {
        let table = parse_csv("note\n\"He said \"\"hi\"\"\"\nx\n").unwrap();
        assert_eq!(table.rows[0].value("note"), Some("He said \"hi\""));
    }

    #[test]
    fn test_unquoted_fields_are_trimmed_of_whitespace_and_stray_quotes() {
        let table = parse_csv(" 'Name' , \"Phone\"\n  Ali  , 'x\n").unwrap();
        assert_eq!(table.headers, vec!["Name", "Phone"]);
        assert_eq!(values(&table, 0), vec!["Ali", "x"]);
    }

    #[test]
    fn test_quoted_field_keeps_inner_padding() {
        let table = parse_csv("name,city\nAli,\"  Dubai  \"\n").unwrap();
        assert_eq!(table.rows[0].value("city"), Some("  Dubai  "));
    }

    #[test]
    fn test_text_after_closing_quote_is_appended() {
        let table = parse_csv("x,y\n\"a\"b,c\n\"a\"  ,c\n").unwrap();
        assert_eq!(values(&table, 0), vec!["ab", "c"]);
        assert_eq!(values(&table, 1), vec!["a", "c"]);
    }

    #[test]
    fn test_unterminated_quote_is_treated_as_stray() {
        let table = parse_csv("a,b\n\"open,close\n").unwrap();
        assert_eq!(values(&table, 0), vec!["open", "close"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = parse_csv("a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(values(&table, 0), vec!["1", "", ""]);
        assert_eq!(values(&table, 1), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_trailing_comma_yields_empty_field() {
        let table = parse_csv("a,b\n1,\n").unwrap();
        assert_eq!(values(&table, 0), vec!["1", ""]);
    }

    #[test]
    fn test_duplicate_header_uses_rightmost_value() {
        let table = parse_csv("phone,phone\n111,222\n").unwrap();
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.rows[0].value("phone"), Some("222"));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let table = parse_csv("\u{feff}Name,Phone\nAli,1\n").unwrap();
        assert_eq!(table.headers[0], "Name");
    }

    #[test]
    fn test_fewer_than_two_lines_is_empty() {
        assert!(matches!(parse_csv(""), Err(ImportError::ParseEmpty)));
        assert!(matches!(parse_csv("Name,Phone\n\n  \n"), Err(ImportError::ParseEmpty)));
    }

    #[test]
    fn test_row_count_matches_data_lines() {
        let mut text = String::from("h1,h2,h3,h4\n");
        for i in 0..250 {
            text.push_str(&format!("{i},a,b\n"));
        }
        let table = parse_csv(&text).unwrap();
        assert_eq!(table.rows.len(), 250);
        assert!(table.rows.iter().all(|r| r.values.len() == 4));
    }
}
