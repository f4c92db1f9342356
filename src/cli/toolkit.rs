//! Terminal rendering helpers handed to command handlers.

use colored::{ColoredString, Colorize};
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table,
};

/// Colors, emphasis and tables for command output.
///
/// Coloring follows `colored`'s own rules (`NO_COLOR`, `CLICOLOR`, terminal detection).
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    _private: (),
}

impl Toolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, text: &str) -> ColoredString {
        text.green()
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn error(&self, text: &str) -> ColoredString {
        text.red()
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        text.cyan().bold()
    }

    pub fn dim(&self, text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn bold(&self, text: &str) -> ColoredString {
        text.bold()
    }

    /// Renders rows under a header line as a bordered table.
    pub fn table<H, R, C>(&self, headers: H, rows: R) -> String
    where
        H: IntoIterator,
        H::Item: Into<comfy_table::Cell>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<comfy_table::Cell>,
    {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(headers);
        for row in rows {
            table.add_row(row);
        }
        table.to_string()
    }

    /// Frames centered lines in a rounded box with a blank line above and below.
    pub fn boxed(&self, lines: &[String]) -> String {
        let body = format!("\n{}\n", lines.join("\n"));
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Disabled)
            .add_row(vec![Cell::new(body).set_alignment(CellAlignment::Center)]);
        if let Some(column) = table.column_mut(0) {
            column.set_padding((3, 3));
        }
        table.to_string()
    }
}
