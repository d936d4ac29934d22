// src/table/grid.rs
//
// Span-aware layout of header and data rows, independent of the HTML parser.

/// Upper bound for `colspan`, as in the HTML table model.
const MAX_COLSPAN: usize = 1000;
/// Upper bound for `rowspan`.
const MAX_ROWSPAN: usize = 65534;

/// One `<th>`/`<td>` as read from the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub colspan: usize,
    pub rowspan: usize,
    pub is_header: bool,
}

impl Cell {
    /// Spans are parsed leniently: missing, unparsable or zero means 1.
    pub fn new(text: String, colspan: Option<&str>, rowspan: Option<&str>, is_header: bool) -> Self {
        Self {
            text,
            colspan: parse_span(colspan).min(MAX_COLSPAN),
            rowspan: parse_span(rowspan).min(MAX_ROWSPAN),
            is_header,
        }
    }
}

fn parse_span(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

/// Width of a row once colspans are expanded.
pub fn row_width(cells: &[Cell]) -> usize {
    cells.iter().map(|c| c.colspan).sum()
}

/// Lay header rows out on a grid honoring rowspan and colspan.
///
/// A cell's text is written only on its own row; the rows it spans into are
/// marked occupied so later cells shift right past them.
pub fn header_grid(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
    let nrows = rows.len();
    let ncols = rows.iter().map(|r| row_width(r)).max().unwrap_or(0);
    let mut grid = vec![vec![String::new(); ncols]; nrows];
    let mut occupied = vec![vec![false; ncols]; nrows];

    for (r, row) in rows.iter().enumerate() {
        let mut c = 0;
        for cell in row {
            while c < ncols && occupied[r][c] {
                c += 1;
            }
            if c >= ncols {
                break;
            }
            for rr in r..(r + cell.rowspan).min(nrows) {
                for cc in c..(c + cell.colspan).min(ncols) {
                    if rr == r && grid[rr][cc].is_empty() {
                        grid[rr][cc] = cell.text.clone();
                    }
                    occupied[rr][cc] = true;
                }
            }
            c += cell.colspan;
        }
    }
    grid
}

/// Column names from a header grid: the non-empty texts of each column from
/// top to bottom, consecutive repeats collapsed, joined with ` / `.
pub fn compose_columns(grid: &[Vec<String>]) -> Vec<String> {
    let ncols = grid.first().map(Vec::len).unwrap_or(0);
    (0..ncols)
        .map(|c| {
            let mut parts: Vec<&str> = Vec::new();
            for row in grid {
                let t = row[c].trim();
                if !t.is_empty() && parts.last() != Some(&t) {
                    parts.push(t);
                }
            }
            parts.join(" / ")
        })
        .collect()
}

/// Expand data rows to exactly `ncols` cells each.
///
/// Colspan repeats a cell's text across columns; rowspan carries it into the
/// slots of the following rows, which later cells of those rows skip over,
/// the same occupancy rule as [`header_grid`]. Short rows are padded with
/// empty strings, long ones truncated.
pub fn expand_rows(rows: &[&[Cell]], ncols: usize) -> Vec<Vec<String>> {
    // per column: text still spanning down, and for how many more rows
    let mut pending: Vec<Option<(String, usize)>> = vec![None; ncols];
    let mut out = Vec::with_capacity(rows.len());

    for cells in rows {
        let mut row: Vec<Option<String>> = vec![None; ncols];
        for (c, slot) in pending.iter_mut().enumerate() {
            if let Some((text, left)) = slot {
                row[c] = Some(text.clone());
                *left -= 1;
                if *left == 0 {
                    *slot = None;
                }
            }
        }

        let mut c = 0;
        for cell in cells.iter() {
            while c < ncols && row[c].is_some() {
                c += 1;
            }
            if c >= ncols {
                break;
            }
            for cc in c..(c + cell.colspan).min(ncols) {
                row[cc] = Some(cell.text.clone());
                if cell.rowspan > 1 {
                    pending[cc] = Some((cell.text.clone(), cell.rowspan - 1));
                }
            }
            c += cell.colspan;
        }

        out.push(row.into_iter().map(Option::unwrap_or_default).collect());
    }
    out
}
