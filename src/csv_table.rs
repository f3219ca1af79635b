use std::mem::take;

/// Header + data rows of a comma-separated file.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub header: Vec<String>,
    /// (1-based line number, cells)
    pub rows: Vec<(usize, Vec<String>)>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Self {
        let mut rows = parse_rows(text).into_iter();
        let Some((_, header)) = rows.next() else {
            return Self::default();
        };
        let header = header
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        Self {
            header,
            rows: rows.collect(),
        }
    }

    /// Case-insensitive column lookup; the first matching alias wins.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.header
                .iter()
                .position(|h| h.eq_ignore_ascii_case(alias))
        })
    }
}

/// Quote-aware CSV splitter. Tolerates CRLF and skips blank lines.
pub fn parse_rows(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut row_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].trim().is_empty()) {
                    rows.push((row_line, take(&mut row)));
                } else {
                    row.clear();
                }
                line += 1;
                row_line = line;
            }
            c => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    row.push(field);
    if !(row.len() == 1 && row[0].trim().is_empty()) {
        rows.push((row_line, row));
    }
    rows
}

/// Quotes a cell when it contains a separator, quote or newline.
pub fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn format_row(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|c| escape_cell(c))
        .collect::<Vec<_>>()
        .join(",")
}
