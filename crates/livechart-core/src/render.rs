//! Line chart rendering.
//!
//! ```text
//! 3         │  ┌       │
//!           │  │       │
//!           │┌┐│       │
//!           ││││       │
//!           │┘└┘       │
//! 1         └──────────┘
//!           2026-10-17 1
//! ```
//!
//! The left gutter holds the value axis (max on the top row, min on the
//! bottom rule's row). Each pair of consecutive samples occupies one column:
//! a vertical run between the two rows, capped with corner glyphs so that the
//! columns join up into a continuous line.

use std::io;

use chrono::{DateTime, Local};

use crate::series::{Sample, Series};
use crate::terminal::{TerminalDriver, Viewport};

/// Columns reserved on the left for value-axis labels.
pub const GUTTER_WIDTH: usize = 10;

/// Columns taken by the plot borders plus the unused last column.
const BORDER_COLUMNS: usize = 3;

/// Rows below the plot: the bottom rule and the time-axis labels.
const FOOTER_ROWS: usize = 2;

/// Time-axis label format (26 characters).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const VLINE: char = '│';
const HLINE: char = '─';
const UL_CORNER: char = '┌';
const UR_CORNER: char = '┐';
const LL_CORNER: char = '└';
const LR_CORNER: char = '┘';

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Size of the plotting area inside the borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    /// Sample columns available; also the window width in samples.
    pub columns: usize,
    /// Rows a value can be plotted on.
    pub rows: usize,
}

impl PlotArea {
    /// Plot area for a viewport, or `None` if the viewport is too small.
    pub fn for_viewport(viewport: Viewport) -> Option<Self> {
        let columns = viewport.columns.checked_sub(GUTTER_WIDTH + BORDER_COLUMNS)?;
        let rows = viewport.rows.checked_sub(FOOTER_ROWS)?;
        (columns > 0 && rows > 0).then_some(Self { columns, rows })
    }

    /// Window width in samples for a viewport (0 when nothing fits).
    pub fn columns_available(viewport: Viewport) -> usize {
        Self::for_viewport(viewport).map_or(0, |area| area.columns)
    }

    /// Screen column of the `i`-th sample pair.
    fn column_for(&self, i: usize) -> usize {
        GUTTER_WIDTH + 1 + i
    }

    fn right_border(&self) -> usize {
        GUTTER_WIDTH + 1 + self.columns
    }
}

// ---------------------------------------------------------------------------
// Scale
// ---------------------------------------------------------------------------

/// Min and max over every sample of every series.
///
/// Returns `None` when there are no samples at all. When every value is
/// equal, the minimum is lowered by one so the scale never has zero width.
/// Past 2^53 subtracting one is lost to rounding, so the minimum becomes the
/// next smaller `f64` instead.
pub fn value_range(series: &[Series]) -> Option<(f64, f64)> {
    let mut values = series.iter().flat_map(|s| s.samples.iter().map(|x| x.value));
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min == max {
        let lower = max - 1.0;
        Some((if lower < max { lower } else { max.next_down() }, max))
    } else {
        Some((min, max))
    }
}

/// Screen row of `value` in a plot `rows` tall. Larger values get smaller rows.
///
/// Requires `min < max`. The result is always within `0..rows`.
pub fn row_for_value(value: f64, min: f64, max: f64, rows: usize) -> usize {
    let last = rows.saturating_sub(1);
    let fraction = (value - min) / (max - min);
    let row = ((1.0 - fraction) * last as f64).round();
    if row.is_nan() || row <= 0.0 {
        0
    } else {
        (row as usize).min(last)
    }
}

/// Value-axis label, cut to the gutter width.
fn format_value(value: f64) -> String {
    value.to_string().chars().take(GUTTER_WIDTH).collect()
}

fn format_time(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// ChartRenderer
// ---------------------------------------------------------------------------

/// Draws visible series into a terminal.
///
/// Stateless: the same input always produces the same frame. Overlapping
/// series overwrite each other, last one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl ChartRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Clear, draw one frame for `visible`, and refresh.
    ///
    /// With no samples, or a viewport too small for a plot, the frame is blank.
    pub fn render<D>(&self, driver: &mut D, visible: &[Series], viewport: Viewport) -> io::Result<()>
    where
        D: TerminalDriver + ?Sized,
    {
        driver.clear()?;
        if let Some(area) = PlotArea::for_viewport(viewport)
            && let Some((min, max)) = value_range(visible)
        {
            draw_value_labels(driver, viewport, area, min, max)?;
            draw_time_labels(driver, viewport, visible)?;
            draw_borders(driver, area)?;
            for series in visible {
                draw_series_line(driver, area, &series.samples, min, max)?;
            }
        }
        driver.refresh()
    }
}

fn draw_clipped<D>(driver: &mut D, viewport: Viewport, row: usize, column: usize, text: &str) -> io::Result<()>
where
    D: TerminalDriver + ?Sized,
{
    let room = viewport.columns.saturating_sub(column);
    let clipped: String = text.chars().take(room).collect();
    if row < viewport.rows && !clipped.is_empty() {
        driver.draw_string(row, column, &clipped)?;
    }
    Ok(())
}

fn draw_value_labels<D>(driver: &mut D, viewport: Viewport, area: PlotArea, min: f64, max: f64) -> io::Result<()>
where
    D: TerminalDriver + ?Sized,
{
    draw_clipped(driver, viewport, 0, 0, &format_value(max))?;
    draw_clipped(driver, viewport, area.rows, 0, &format_value(min))
}

/// Earliest visible timestamp bottom-left, latest bottom-right.
fn draw_time_labels<D>(driver: &mut D, viewport: Viewport, visible: &[Series]) -> io::Result<()>
where
    D: TerminalDriver + ?Sized,
{
    let first = visible.iter().filter_map(|s| s.samples.first()).map(|s| s.time).min();
    let last = visible.iter().filter_map(|s| s.samples.last()).map(|s| s.time).max();
    let (Some(first), Some(last)) = (first, last) else {
        return Ok(());
    };

    let row = viewport.rows - 1;
    let left = format_time(&first);
    draw_clipped(driver, viewport, row, GUTTER_WIDTH, &left)?;

    let right = format_time(&last);
    let width = right.chars().count();
    if let Some(column) = viewport.columns.checked_sub(width + 1)
        && column > GUTTER_WIDTH + left.chars().count()
    {
        driver.draw_string(row, column, &right)?;
    }
    Ok(())
}

fn draw_borders<D>(driver: &mut D, area: PlotArea) -> io::Result<()>
where
    D: TerminalDriver + ?Sized,
{
    let right = area.right_border();
    for row in 0..area.rows {
        driver.draw_char(row, GUTTER_WIDTH, VLINE)?;
        driver.draw_char(row, right, VLINE)?;
    }
    driver.draw_char(area.rows, GUTTER_WIDTH, LL_CORNER)?;
    for i in 0..area.columns {
        driver.draw_char(area.rows, area.column_for(i), HLINE)?;
    }
    driver.draw_char(area.rows, right, LR_CORNER)
}

fn draw_series_line<D>(driver: &mut D, area: PlotArea, samples: &[Sample], min: f64, max: f64) -> io::Result<()>
where
    D: TerminalDriver + ?Sized,
{
    for (i, pair) in samples.windows(2).take(area.columns).enumerate() {
        let column = area.column_for(i);
        let row = row_for_value(pair[0].value, min, max, area.rows);
        let next_row = row_for_value(pair[1].value, min, max, area.rows);

        for r in row.min(next_row)..row.max(next_row) {
            driver.draw_char(r, column, VLINE)?;
        }
        if row < next_row {
            // Falling: leave the current row heading down, arrive from above.
            driver.draw_char(row, column, UR_CORNER)?;
            driver.draw_char(next_row, column, LL_CORNER)?;
        } else if row > next_row {
            driver.draw_char(row, column, LR_CORNER)?;
            driver.draw_char(next_row, column, UL_CORNER)?;
        } else {
            driver.draw_char(row, column, HLINE)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::HeadlessTerminal;

    fn series(name: &str, values: &[f64]) -> Series {
        Series::new(name, values.iter().map(|&v| Sample::now(v)).collect())
    }

    #[test]
    fn plot_area_reserves_gutter_borders_and_footer() {
        let area = PlotArea::for_viewport(Viewport::new(24, 80)).unwrap();
        assert_eq!(area, PlotArea { columns: 67, rows: 22 });
        assert_eq!(area.right_border(), 78);
    }

    #[test]
    fn tiny_viewport_has_no_plot_area() {
        assert_eq!(PlotArea::for_viewport(Viewport::new(24, 13)), None);
        assert_eq!(PlotArea::for_viewport(Viewport::new(2, 80)), None);
        assert_eq!(PlotArea::columns_available(Viewport::new(1, 5)), 0);
    }

    #[test]
    fn value_range_spans_all_series() {
        let data = vec![series("a", &[2.0, 7.0]), series("b", &[-1.0]), series("c", &[])];
        assert_eq!(value_range(&data), Some((-1.0, 7.0)));
    }

    #[test]
    fn value_range_widens_degenerate_scale() {
        let data = vec![series("a", &[5.0, 5.0]), series("b", &[5.0])];
        assert_eq!(value_range(&data), Some((4.0, 5.0)));
    }

    #[test]
    fn value_range_widens_huge_degenerate_scale() {
        let (min, max) = value_range(&[series("a", &[1e17, 1e17])]).unwrap();
        assert_eq!(max, 1e17);
        assert!(min < max);
        assert_eq!(row_for_value(1e17, min, max, 5), 0);

        let (min, max) = value_range(&[series("a", &[-1e17])]).unwrap();
        assert!(min < max);
    }

    #[test]
    fn value_range_of_nothing_is_none() {
        assert_eq!(value_range(&[]), None);
        assert_eq!(value_range(&[series("a", &[])]), None);
    }

    #[test]
    fn rows_map_linearly_and_invert() {
        assert_eq!(row_for_value(3.0, 1.0, 3.0, 5), 0);
        assert_eq!(row_for_value(2.0, 1.0, 3.0, 5), 2);
        assert_eq!(row_for_value(1.0, 1.0, 3.0, 5), 4);
        assert_eq!(row_for_value(1.5, 1.0, 3.0, 5), 3);
    }

    #[test]
    fn rows_stay_in_bounds() {
        let (min, max) = (-12.5, 40.0);
        for rows in 1..30 {
            for step in 0..=100 {
                let v = min + (max - min) * step as f64 / 100.0;
                assert!(row_for_value(v, min, max, rows) < rows);
            }
        }
    }

    #[test]
    fn labels_are_cut_to_gutter() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(-0.5), "-0.5");
        assert_eq!(format_value(0.1 + 0.2).len(), GUTTER_WIDTH);
    }

    #[test]
    fn empty_data_renders_blank_frame() {
        let mut term = HeadlessTerminal::new(10, 40);
        term.draw_string(0, 0, "stale").unwrap();
        ChartRenderer::new()
            .render(&mut term, &[series("a", &[])], Viewport::new(10, 40))
            .unwrap();
        assert!(term.lines().iter().all(|l| l.trim().is_empty()));
        assert_eq!(term.refresh_count(), 1);
    }

    #[test]
    fn flat_line_uses_horizontal_glyph() {
        let mut term = HeadlessTerminal::new(7, 23);
        let data = vec![series("a", &[2.0, 2.0, 2.0])];
        ChartRenderer::new().render(&mut term, &data, Viewport::new(7, 23)).unwrap();
        assert_eq!(term.cell(0, 11), Some(HLINE));
        assert_eq!(term.cell(0, 12), Some(HLINE));
        assert_eq!(term.cell(0, 13), Some(' '));
    }

    #[test]
    fn falling_segment_uses_mirror_corners() {
        let mut term = HeadlessTerminal::new(7, 23);
        let data = vec![series("a", &[3.0, 1.0])];
        ChartRenderer::new().render(&mut term, &data, Viewport::new(7, 23)).unwrap();
        let column: String = (0..5).map(|r| term.cell(r, 11).unwrap()).collect();
        assert_eq!(column, "┐│││└");
    }

    #[test]
    fn extra_samples_never_draw_past_plot() {
        let mut term = HeadlessTerminal::new(7, 23);
        let values: Vec<f64> = (0..50).map(|v| (v % 7) as f64).collect();
        ChartRenderer::new()
            .render(&mut term, &[series("a", &values)], Viewport::new(7, 23))
            .unwrap();
        assert_eq!(term.cell(0, 21), Some(VLINE));
        assert_eq!(term.out_of_bounds_writes(), 0);
    }
}
