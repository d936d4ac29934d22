// src/project.rs

use std::io::Write;

use tracing::info;

use crate::config::Settings;
use crate::table::{normalize, select_tables, Table};
use crate::{Error, Result};

/// What to pull out of the tables.
#[derive(Debug, Clone)]
pub struct Projection {
    pub column: String,
    /// Column checked for the done marker; the target column when `None`.
    pub status_column: Option<String>,
    pub done_marker: String,
    pub only_done: bool,
    pub all_tables: bool,
}

impl Projection {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            status_column: None,
            done_marker: crate::cli::DEFAULT_DONE_MARKER.to_string(),
            only_done: false,
            all_tables: false,
        }
    }

    pub fn only_done(mut self, only_done: bool) -> Self {
        self.only_done = only_done;
        self
    }
}

impl From<&Settings> for Projection {
    fn from(s: &Settings) -> Self {
        Self {
            column: s.column.clone(),
            status_column: s.status_column.clone(),
            done_marker: s.done_marker.clone(),
            only_done: s.only_done,
            all_tables: s.all_tables,
        }
    }
}

/// One printed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projected {
    pub table_index: usize,
    pub row_index: usize,
    pub value: String,
    pub issue_keys: Vec<String>,
}

/// Values of the target column in table and row order, filtered by the done
/// marker when asked. Never sorts or deduplicates.
pub fn project(tables: &[Table], p: &Projection) -> Result<Vec<Projected>> {
    let marker = normalize(&p.done_marker);
    let mut out = Vec::new();

    for (table, col) in select_tables(tables, &p.column, p.all_tables)? {
        let status_col = match (&p.status_column, p.only_done) {
            (Some(name), true) => {
                table
                    .column_index(name)
                    .ok_or_else(|| Error::ColumnMissing {
                        column: name.clone(),
                        available: table.columns.clone(),
                    })?
            }
            _ => col,
        };
        info!(
            table = table.index,
            column = %table.columns[col],
            column_index = col,
            rows = table.rows.len(),
            "column located"
        );

        let before = out.len();
        for row in &table.rows {
            if p.only_done && !normalize(row.get(status_col)).contains(&marker) {
                continue;
            }
            out.push(Projected {
                table_index: table.index,
                row_index: row.index,
                value: row.get(col).to_string(),
                issue_keys: row.issue_keys.clone(),
            });
        }
        info!(table = table.index, kept = out.len() - before, "rows projected");
    }
    Ok(out)
}

/// Parse `markup` and project it in one go.
pub fn extract_column(markup: &str, p: &Projection) -> Result<Vec<Projected>> {
    let tables = crate::table::extract_tables(markup)?;
    project(&tables, p)
}

/// One value per line; with `with_keys`, `value<TAB>KEY-1,KEY-2` (`-` if none).
pub fn write_values(out: &mut impl Write, values: &[Projected], with_keys: bool) -> Result<()> {
    for v in values {
        if with_keys {
            let keys = if v.issue_keys.is_empty() {
                "-".to_string()
            } else {
                v.issue_keys.join(",")
            };
            writeln!(out, "{}\t{}", v.value, keys)?;
        } else {
            writeln!(out, "{}", v.value)?;
        }
    }
    out.flush()?;
    Ok(())
}
