//! Column-aligned text tables, used for diagnostic transition-table output.

use std::cmp::max;

#[derive(Default, Debug, Clone)]
pub(crate) struct Table {
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn push_row(&mut self, row: Vec<String>) {
        if row.len() > self.widths.len() {
            self.widths.resize(row.len(), 0);
        }
        for (width, cell) in self.widths.iter_mut().zip(&row) {
            *width = max(*width, cell.chars().count());
        }
        self.rows.push(row);
    }

    pub fn render(&self, sep: &str) -> String {
        let pad = |cell: &str, width: usize| {
            let len = cell.chars().count();
            if len < width {
                format!("{}{}", cell, " ".repeat(width - len))
            } else {
                cell.to_string()
            }
        };
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.widths)
                    .map(|(cell, &width)| format!("{}{sep}", pad(cell, width)))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
