//! Plain-text tables for list views.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct TableColumn {
    pub header: &'static str,
    pub alignment: Alignment,
    pub max_width: Option<usize>,
}

impl TableColumn {
    pub const fn left(header: &'static str) -> Self {
        Self {
            header,
            alignment: Alignment::Left,
            max_width: None,
        }
    }

    /// Right-aligned, for amounts and counts.
    pub const fn right(header: &'static str) -> Self {
        Self {
            header,
            alignment: Alignment::Right,
            max_width: None,
        }
    }

    pub const fn max(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

pub struct Table {
    columns: Vec<TableColumn>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| visible_width(cell))
                    .fold(visible_width(column.header), usize::max);
                column.max_width.map_or(widest, |max| widest.min(max))
            })
            .collect()
    }

    fn render_line(&self, cells: &[String], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                render_cell(cell, *width, column.alignment)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let header: Vec<String> = self.columns.iter().map(|c| c.header.to_string()).collect();
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

        let mut lines = vec![self.render_line(&header, &widths), "-".repeat(rule_width)];
        lines.extend(self.rows.iter().map(|row| self.render_line(row, &widths)));
        lines.join("\n")
    }
}

/// Character count ignoring ANSI colour sequences.
fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for esc in chars.by_ref() {
                if ('@'..='~').contains(&esc) && esc != '[' {
                    break;
                }
            }
            continue;
        }
        width += 1;
    }
    width
}

fn truncate(text: &str, width: usize) -> String {
    // Cells carrying escape sequences are never cut.
    if visible_width(text) <= width || text.contains('\u{1b}') {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

fn render_cell(text: &str, width: usize, alignment: Alignment) -> String {
    let fitted = truncate(text, width);
    let pad = width.saturating_sub(visible_width(&fitted));
    match alignment {
        Alignment::Left => format!("{fitted}{}", " ".repeat(pad)),
        Alignment::Right => format!("{}{fitted}", " ".repeat(pad)),
    }
}
