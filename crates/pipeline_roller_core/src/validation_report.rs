//! Security validation reports produced during synthesis.
//!
//! Each report is a CSV file with a header row. Non-empty reports are posted
//! to the pull request as markdown pipe tables with a leading row-index column.

use std::io::Read;
use std::path::Path;

use crate::errors::Error;

#[cfg(test)]
#[path = "validation_report_tests.rs"]
mod tests;

const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
}

/// A parsed validation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ValidationTable {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let reader = csv::ReaderBuilder::new()
            .from_path(path)
            .map_err(|source| Error::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader).map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        Self::from_csv(csv::ReaderBuilder::new().from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A table without data rows is empty, whatever its header says.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table as a markdown pipe table.
    ///
    /// The first column holds the zero-based row index. Columns whose cells
    /// are all numeric are right-aligned, all others left-aligned.
    pub fn to_markdown(&self) -> String {
        let mut columns: Vec<(String, Vec<String>)> = vec![(
            String::new(),
            (0..self.rows.len()).map(|i| i.to_string()).collect(),
        )];
        for (index, header) in self.headers.iter().enumerate() {
            let cells = self
                .rows
                .iter()
                .map(|row| escape_cell(row.get(index).map(String::as_str).unwrap_or("")))
                .collect();
            columns.push((escape_cell(header), cells));
        }

        let layout: Vec<(usize, Alignment)> = columns
            .iter()
            .map(|(header, cells)| {
                let width = cells
                    .iter()
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .max(MIN_COLUMN_WIDTH);
                (width, column_alignment(cells))
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(render_row(
            columns.iter().map(|(header, _)| header.as_str()),
            &layout,
        ));
        lines.push(render_separator(&layout));
        for row in 0..self.rows.len() {
            lines.push(render_row(
                columns.iter().map(|(_, cells)| cells[row].as_str()),
                &layout,
            ));
        }
        lines.join("\n")
    }
}

fn escape_cell(value: &str) -> String {
    value.trim().replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn column_alignment(cells: &[String]) -> Alignment {
    let mut values = cells.iter().filter(|c| !c.is_empty()).peekable();
    if values.peek().is_none() {
        return Alignment::Left;
    }
    if values.all(|c| c.parse::<f64>().is_ok()) {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, layout: &[(usize, Alignment)]) -> String {
    let rendered: Vec<String> = cells
        .zip(layout)
        .map(|(cell, (width, alignment))| match alignment {
            Alignment::Left => format!(" {:<width$} ", cell, width = width),
            Alignment::Right => format!(" {:>width$} ", cell, width = width),
        })
        .collect();
    format!("|{}|", rendered.join("|"))
}

fn render_separator(layout: &[(usize, Alignment)]) -> String {
    let rendered: Vec<String> = layout
        .iter()
        .map(|(width, alignment)| match alignment {
            Alignment::Left => format!(":{}", "-".repeat(width + 1)),
            Alignment::Right => format!("{}:", "-".repeat(width + 1)),
        })
        .collect();
    format!("|{}|", rendered.join("|"))
}
