use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Fixed-width console table: header, dashed separator, rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate().take(widths.len()) {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }
        widths
    }

    /// Header cells are bold magenta when `styled` is set.
    pub fn render<W: Write>(&self, out: &mut W, styled: bool) -> io::Result<()> {
        let widths = self.widths();

        for (i, header) in self.headers.iter().enumerate() {
            if i > 0 {
                write!(out, "  ")?;
            }
            let padded = format!("{:width$}", header, width = widths[i]);
            if styled {
                write!(out, "{}", padded.bold().magenta())?;
            } else {
                write!(out, "{}", padded)?;
            }
        }
        writeln!(out)?;

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                write!(out, "  ")?;
            }
            write!(out, "{:-<width$}", "", width = *width)?;
        }
        writeln!(out)?;

        for row in &self.rows {
            let mut line = String::new();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                line.push_str(&format!("{:width$}", cell, width = *width));
            }
            writeln!(out, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

pub fn create_progressbar(len: u64, prefix: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_prefix(prefix.to_string());
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) =
        ProgressStyle::with_template("{prefix} {bar:36.cyan/blue} {pos:>3}/{len:3} {wide_msg}")
    {
        progress_bar.set_style(style.progress_chars("■■□"));
    }
    progress_bar
}
