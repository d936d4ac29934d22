// src/table/mod.rs

pub mod grid;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use crate::{Error, Result};
use grid::Cell;

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector should parse"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector should parse"));

/// Jira-style issue key, e.g. `ABC-1708`.
static ISSUE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]+-\d+\b").expect("issue key regex should compile"));

/// How far down a table we look for the first issue-key row.
const HEADER_SCAN_LIMIT: usize = 30;

/// A parsed table: composed column names and its data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Position among all `<table>` elements of the document.
    pub index: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Position among the table's data rows.
    pub index: usize,
    /// One entry per column.
    pub cells: Vec<String>,
    pub issue_keys: Vec<String>,
}

impl Row {
    pub fn get(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl Table {
    /// Find a column by name.
    ///
    /// Both sides are [`normalize`]d. An exact match wins; otherwise the first
    /// column whose name contains the requested one (so `반영여부` finds
    /// `SCCB / 반영 여부`).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        let names: Vec<String> = self.columns.iter().map(|c| normalize(c)).collect();
        names
            .iter()
            .position(|n| *n == wanted)
            .or_else(|| names.iter().position(|n| n.contains(&wanted)))
    }

    /// Header → cell pairs for one row, in column order.
    pub fn record<'a>(&'a self, row: &'a Row) -> Vec<(&'a str, &'a str)> {
        self.columns
            .iter()
            .zip(&row.cells)
            .map(|(h, c)| (h.as_str(), c.as_str()))
            .collect()
    }
}

/// Case- and whitespace-insensitive form used for matching: every Unicode
/// whitespace (NBSP included) removed, then lowercased.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trimmed text nodes joined with a single space; NBSP becomes a plain space.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ")
}

/// Direct `<th>`/`<td>` children of a row.
fn row_cells(tr: ElementRef<'_>) -> Vec<Cell> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let v = el.value();
            let is_header = match v.name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(Cell::new(
                element_text(el),
                v.attr("colspan"),
                v.attr("rowspan"),
                is_header,
            ))
        })
        .collect()
}

/// A `<tr>` as read from the markup.
struct RawRow {
    cells: Vec<Cell>,
    text: String,
}

impl RawRow {
    fn has_issue_key(&self) -> bool {
        ISSUE_KEY.is_match(&self.text)
    }

    fn all_header_cells(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| c.is_header)
    }
}

/// `<tr>`s that belong to `table` itself, not to a table nested in it.
fn own_rows(table: ElementRef<'_>) -> Vec<RawRow> {
    table
        .select(&TR)
        .filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table")
                .map(|a| a.id())
                == Some(table.id())
        })
        .map(|tr| RawRow {
            cells: row_cells(tr),
            text: element_text(tr),
        })
        .collect()
}

/// Number of leading header rows.
///
/// A leading run of all-`<th>` rows is the header. Tables without one fall
/// back to the rows above the first row carrying an issue key, which covers
/// group headers written with `<td>`. Failing both, the first row. At least
/// one data row always remains.
fn header_row_count(rows: &[RawRow]) -> usize {
    let max = rows.len().saturating_sub(1).max(1);
    let th_run = rows.iter().take_while(|r| r.all_header_cells()).count();
    if th_run > 0 {
        return th_run.min(max);
    }
    let limit = rows.len().min(HEADER_SCAN_LIMIT);
    match rows[..limit].iter().position(RawRow::has_issue_key) {
        Some(i) if i > 0 => i.min(max),
        _ => 1,
    }
}

fn build_table(index: usize, rows: Vec<RawRow>) -> Table {
    let header_count = header_row_count(&rows);
    let (header, data) = rows.split_at(header_count);

    let header_cells: Vec<Vec<Cell>> = header.iter().map(|r| r.cells.clone()).collect();
    let columns = grid::compose_columns(&grid::header_grid(&header_cells));
    trace!(table = index, header_rows = header_count, ?columns, "header composed");

    let own: Vec<&[Cell]> = data.iter().map(|r| r.cells.as_slice()).collect();
    let expanded = grid::expand_rows(&own, columns.len());

    let rows = data
        .iter()
        .zip(expanded)
        .filter(|(r, _)| !r.cells.is_empty())
        .enumerate()
        .map(|(i, (r, cells))| {
            // keys from the row itself and from cells spanning down into it
            let mut keys: BTreeSet<String> = ISSUE_KEY
                .find_iter(&r.text)
                .map(|m| m.as_str().to_string())
                .collect();
            for cell in &cells {
                keys.extend(ISSUE_KEY.find_iter(cell).map(|m| m.as_str().to_string()));
            }
            Row {
                index: i,
                cells,
                issue_keys: keys.into_iter().collect(),
            }
        })
        .collect();

    Table {
        index,
        columns,
        rows,
    }
}

/// Parse every table with at least a header and one more row, in document
/// order.
///
/// Fails with [`Error::NoTable`] when there is none.
pub fn extract_tables(markup: &str) -> Result<Vec<Table>> {
    let document = Html::parse_document(markup);
    let mut tables = Vec::new();
    for (index, el) in document.select(&TABLE).enumerate() {
        let rows = own_rows(el);
        if rows.len() < 2 {
            debug!(table = index, rows = rows.len(), "skipping table, too few rows");
            continue;
        }
        tables.push(build_table(index, rows));
    }
    if tables.is_empty() {
        return Err(Error::NoTable);
    }
    debug!(count = tables.len(), "tables parsed");
    Ok(tables)
}

/// Pick the table(s) holding `column`, with the matching column index.
///
/// Only the first such table unless `all` is set. When no table has it the
/// error lists the columns of the first table.
pub fn select_tables<'t>(
    tables: &'t [Table],
    column: &str,
    all: bool,
) -> Result<Vec<(&'t Table, usize)>> {
    let first = tables.first().ok_or(Error::NoTable)?;
    let mut hits = tables
        .iter()
        .filter_map(|t| t.column_index(column).map(|i| (t, i)));
    let chosen: Vec<_> = if all {
        hits.collect()
    } else {
        hits.next().into_iter().collect()
    };
    if chosen.is_empty() {
        return Err(Error::ColumnMissing {
            column: column.to_string(),
            available: first.columns.clone(),
        });
    }
    Ok(chosen)
}
