//! Minimal STAR (Self-defining Text Archive and Retrieval) reader for
//! motive lists, plus a loop writer.
//!
//! Every data block keeps its verbatim text so that blocks a caller does not
//! understand can be written back unchanged. Tables record their byte span
//! inside that text, which lets a writer splice a regenerated table into the
//! surrounding block.

use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::fs;
use std::ops::Range;
use std::path::Path;

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarFile {
    /// Comments and blank lines ahead of the first data block.
    pub preamble: String,
    pub blocks: Vec<DataBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    pub name: String,
    pub tables: Vec<Table>,
    /// Block text from its `data_` line up to the next block header.
    pub raw: String,
    pub line_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// A `loop_` with column tags and rows.
    Loop,
    /// A run of `_key value` pairs, exposed as a single row.
    Pairs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub kind: TableKind,
    /// Column names without the leading underscore.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Byte range of the table inside the owning block's `raw` text.
    pub span: Range<usize>,
    pub line_start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
}

impl DataBlock {
    /// Text preceding `table` inside this block, including the `data_` line.
    pub fn head(&self, table: &Table) -> &str {
        &self.raw[..table.span.start]
    }

    /// Text following `table` up to the end of this block.
    pub fn tail(&self, table: &Table) -> &str {
        &self.raw[table.span.end..]
    }
}

impl StarFile {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ParseError {
            line: 0,
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let lines = split_lines(raw);
        let mut i = 0usize;

        while i < lines.len() {
            let trimmed = lines[i].text.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                i += 1;
                continue;
            }
            if block_name(trimmed).is_some() {
                break;
            }
            return Err(ParseError {
                line: i + 1,
                message: "expected `data_` block header".to_string(),
            });
        }

        let preamble = raw[..offset_at(&lines, i, raw.len())].to_string();
        let mut blocks = Vec::new();

        while i < lines.len() {
            let header = lines[i].text.trim();
            let name = block_name(header).unwrap_or_default().to_string();
            let block_start = lines[i].offset;
            let line_start = i + 1;
            i += 1;

            let mut tables = Vec::new();
            while i < lines.len() {
                let trimmed = lines[i].text.trim();
                if trimmed.is_empty() || is_comment(trimmed) {
                    i += 1;
                    continue;
                }
                if block_name(trimmed).is_some() {
                    break;
                }
                if is_loop_header(trimmed) {
                    let (table, next) = parse_loop(&lines, i)?;
                    tables.push(table);
                    i = next;
                    continue;
                }
                if trimmed.starts_with('_') {
                    let (table, next) = parse_pairs(&lines, i)?;
                    tables.push(table);
                    i = next;
                    continue;
                }
                return Err(ParseError {
                    line: i + 1,
                    message: format!("value outside of a loop in block `{name}`"),
                });
            }

            let block_end = offset_at(&lines, i, raw.len());
            for table in &mut tables {
                table.span = (table.span.start - block_start)..(table.span.end - block_start);
            }
            debug!("parsed STAR block `{}` with {} table(s)", name, tables.len());

            blocks.push(DataBlock {
                name,
                tables,
                raw: raw[block_start..block_end].to_string(),
                line_start,
            });
        }

        Ok(StarFile { preamble, blocks })
    }

    /// First table, in file order, that declares `column`.
    pub fn find_table(&self, column: &str) -> Option<(usize, usize)> {
        self.blocks.iter().enumerate().find_map(|(b, block)| {
            block
                .tables
                .iter()
                .position(|t| t.has_column(column))
                .map(|t| (b, t))
        })
    }

    /// Reassembles the file text from the preserved preamble and blocks.
    pub fn to_text(&self) -> String {
        let mut out = self.preamble.clone();
        for block in &self.blocks {
            out.push_str(&block.raw);
        }
        out
    }
}

/// Renders a `loop_` table. Values that would not survive tokenization are
/// quoted.
pub fn write_loop<S: AsRef<str>>(columns: &[&str], rows: &[Vec<S>]) -> String {
    let mut out = String::from("loop_\n");
    for column in columns {
        out.push('_');
        out.push_str(column);
        out.push('\n');
    }
    for row in rows {
        let line = row
            .iter()
            .map(|v| quote_value(v.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn quote_value(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '\'', '"'])
        || is_loop_header(value)
        || block_name(value).is_some();
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    if value.contains('\'') {
        Cow::Owned(format!("\"{value}\""))
    } else {
        Cow::Owned(format!("'{value}'"))
    }
}

struct Line<'a> {
    offset: usize,
    text: &'a str,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

fn split_lines(raw: &str) -> Vec<Line<'_>> {
    let mut offset = 0usize;
    raw.split_inclusive('\n')
        .map(|text| {
            let line = Line { offset, text };
            offset += text.len();
            line
        })
        .collect()
}

fn offset_at(lines: &[Line<'_>], i: usize, eof: usize) -> usize {
    lines.get(i).map_or(eof, |l| l.offset)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

fn block_name(line: &str) -> Option<&str> {
    let head = line.split_whitespace().next()?;
    if head.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data_")) {
        Some(&head[5..])
    } else {
        None
    }
}

fn is_loop_header(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|head| head.eq_ignore_ascii_case("loop_"))
}

fn is_keyword(line: &str) -> bool {
    line.starts_with('_') || is_loop_header(line) || block_name(line).is_some()
}

/// Tag name of a `_name` line, ignoring trailing annotations such as `#3`.
fn tag_name(line: &str) -> String {
    line.split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('_')
        .to_string()
}

fn parse_loop(lines: &[Line<'_>], start: usize) -> Result<(Table, usize), ParseError> {
    let line_start = start + 1;
    let span_start = lines[start].offset;
    let mut end = lines[start].end();
    let mut i = start + 1;

    let mut columns = Vec::new();
    while i < lines.len() {
        let trimmed = lines[i].text.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            i += 1;
            continue;
        }
        if !trimmed.starts_with('_') {
            break;
        }
        columns.push(tag_name(trimmed));
        end = lines[i].end();
        i += 1;
    }

    if columns.is_empty() {
        return Err(ParseError {
            line: line_start,
            message: "loop_ without column tags".to_string(),
        });
    }

    let mut rows = Vec::new();
    while i < lines.len() {
        let trimmed = lines[i].text.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            i += 1;
            continue;
        }
        if is_keyword(trimmed) {
            break;
        }
        let values = tokenize(trimmed, i + 1)?;
        if values.len() != columns.len() {
            return Err(ParseError {
                line: i + 1,
                message: format!(
                    "expected {} values, found {}",
                    columns.len(),
                    values.len()
                ),
            });
        }
        rows.push(values);
        end = lines[i].end();
        i += 1;
    }

    Ok((
        Table {
            kind: TableKind::Loop,
            columns,
            rows,
            span: span_start..end,
            line_start,
        },
        i,
    ))
}

fn parse_pairs(lines: &[Line<'_>], start: usize) -> Result<(Table, usize), ParseError> {
    let span_start = lines[start].offset;
    let mut end = lines[start].end();
    let mut columns = Vec::new();
    let mut row = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let trimmed = lines[i].text.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            i += 1;
            continue;
        }
        if !trimmed.starts_with('_') {
            break;
        }

        let (tag, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let mut values = tokenize(rest.trim(), i + 1)?;
        if values.len() != 1 {
            return Err(ParseError {
                line: i + 1,
                message: format!("expected a single value for `{tag}`"),
            });
        }
        columns.push(tag.trim_start_matches('_').to_string());
        row.append(&mut values);
        end = lines[i].end();
        i += 1;
    }

    Ok((
        Table {
            kind: TableKind::Pairs,
            columns,
            rows: vec![row],
            span: span_start..end,
            line_start: start + 1,
        },
        i,
    ))
}

fn tokenize(line: &str, line_no: usize) -> Result<Vec<String>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let mut values = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        if chars[i] == '#' {
            break;
        }

        let quote = chars[i];
        if quote == '\'' || quote == '"' {
            // A quote only closes when followed by whitespace or end of line.
            let mut j = i + 1;
            loop {
                if j >= chars.len() {
                    return Err(ParseError {
                        line: line_no,
                        message: "unterminated quoted value".to_string(),
                    });
                }
                if chars[j] == quote && chars.get(j + 1).is_none_or(|c| c.is_whitespace()) {
                    break;
                }
                j += 1;
            }
            values.push(chars[i + 1..j].iter().collect());
            i = j + 1;
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            values.push(chars[start..i].iter().collect());
        }
    }

    Ok(values)
}
