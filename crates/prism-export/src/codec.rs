//! CSV cell encoding and parsing
//!
//! Every cell is quoted, with embedded quotes doubled. Rows end with `\n`;
//! the parser also accepts `\r\n`.

/// Quote one cell
///
/// # Examples
///
/// ```
/// use prism_export::escape_cell;
///
/// assert_eq!(escape_cell("plain"), "\"plain\"");
/// assert_eq!(escape_cell("say \"hi\", twice"), "\"say \"\"hi\"\", twice\"");
/// ```
pub fn escape_cell(value: &str) -> String {
    let mut cell = String::with_capacity(value.len() + 2);
    cell.push('"');
    for c in value.chars() {
        if c == '"' {
            cell.push('"');
        }
        cell.push(c);
    }
    cell.push('"');
    cell
}

/// Encode a full row, terminator included
pub fn encode_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut row = cells
        .iter()
        .map(|cell| escape_cell(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

/// Split CSV text into rows of unescaped cells
///
/// Accepts quoted and unquoted cells. A trailing row terminator does not
/// produce an empty row.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut cell));
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
                row_started = false;
            }
            _ => {
                cell.push(c);
                row_started = true;
            }
        }
    }

    if row_started {
        row.push(cell);
        rows.push(row);
    }
    rows
}
