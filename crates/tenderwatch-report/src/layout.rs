//! Column widths and row heights for wrapped, top-aligned cells.

/// Widest a column may get, in character units
pub const MAX_COLUMN_WIDTH: usize = 100;
/// Points per estimated text line
pub const LINE_HEIGHT: f64 = 15.0;

const WIDTH_PADDING: usize = 5;
const CHARS_PER_LINE: usize = 50;

/// Width for a column holding `values`: longest value plus padding, capped.
pub fn column_width<'a>(values: impl IntoIterator<Item = &'a str>) -> usize {
    let longest = values
        .into_iter()
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0);
    (longest + WIDTH_PADDING).min(MAX_COLUMN_WIDTH)
}

/// Estimated line count of a row: the tallest non-empty cell, at least one.
///
/// A cell counts its explicit lines plus one line per started 50 characters.
pub fn row_lines<'a>(cells: impl IntoIterator<Item = &'a str>) -> usize {
    cells
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.matches('\n').count() + 1 + c.chars().count() / CHARS_PER_LINE + 1)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Row height in points.
pub fn row_height<'a>(cells: impl IntoIterator<Item = &'a str>) -> f64 {
    // Row line estimates stay far below f64's exact integer range
    #[allow(clippy::cast_precision_loss)]
    let lines = row_lines(cells) as f64;
    lines * LINE_HEIGHT
}
