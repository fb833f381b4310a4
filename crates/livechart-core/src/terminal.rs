//! Terminal abstraction the chart draws into and reads keys from.
//!
//! The real driver (raw mode, alternate screen, key decoding) lives in the
//! CLI. [`HeadlessTerminal`] is an in-memory grid with a scripted key queue.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

/// Current terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: usize,
    pub columns: usize,
}

impl Viewport {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

/// Decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Home,
    End,
    /// User asked to quit (Ctrl+C in raw mode, `q`, Esc).
    Interrupt,
    Other,
}

/// Everything the chart needs from a terminal.
pub trait TerminalDriver {
    /// Size read fresh on every call.
    fn viewport_size(&self) -> io::Result<Viewport>;

    fn draw_char(&mut self, row: usize, column: usize, glyph: char) -> io::Result<()>;

    fn draw_string(&mut self, row: usize, column: usize, text: &str) -> io::Result<()>;

    /// Blank the whole frame.
    fn clear(&mut self) -> io::Result<()>;

    /// Push the drawn frame to the screen.
    fn refresh(&mut self) -> io::Result<()>;

    fn hide_cursor(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for a key. `Ok(None)` means no key arrived.
    fn next_key_event(&mut self, timeout: Duration) -> io::Result<Option<Key>>;
}

// ---------------------------------------------------------------------------
// HeadlessTerminal
// ---------------------------------------------------------------------------

/// In-memory terminal: a grid of cells plus a queue of keys to replay.
///
/// Writes outside the grid are dropped and counted.
#[derive(Debug, Clone)]
pub struct HeadlessTerminal {
    viewport: Viewport,
    cells: Vec<Vec<char>>,
    keys: VecDeque<Key>,
    refreshes: usize,
    out_of_bounds: usize,
    cursor_hidden: bool,
}

impl HeadlessTerminal {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            viewport: Viewport::new(rows, columns),
            cells: vec![vec![' '; columns]; rows],
            keys: VecDeque::new(),
            refreshes: 0,
            out_of_bounds: 0,
            cursor_hidden: false,
        }
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys.extend(keys);
        self
    }

    pub fn push_key(&mut self, key: Key) {
        self.keys.push_back(key);
    }

    /// Change the size. The grid is blanked.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.viewport = Viewport::new(rows, columns);
        self.cells = vec![vec![' '; columns]; rows];
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<char> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn row_text(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|r| r.iter().collect())
            .unwrap_or_default()
    }

    /// The whole grid, one string per row.
    pub fn lines(&self) -> Vec<String> {
        self.cells.iter().map(|r| r.iter().collect()).collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }

    pub fn out_of_bounds_writes(&self) -> usize {
        self.out_of_bounds
    }

    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    fn put(&mut self, row: usize, column: usize, glyph: char) {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => *cell = glyph,
            None => self.out_of_bounds += 1,
        }
    }
}

impl TerminalDriver for HeadlessTerminal {
    fn viewport_size(&self) -> io::Result<Viewport> {
        Ok(self.viewport)
    }

    fn draw_char(&mut self, row: usize, column: usize, glyph: char) -> io::Result<()> {
        self.put(row, column, glyph);
        Ok(())
    }

    fn draw_string(&mut self, row: usize, column: usize, text: &str) -> io::Result<()> {
        for (i, glyph) in text.chars().enumerate() {
            self.put(row, column + i, glyph);
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        for row in &mut self.cells {
            row.fill(' ');
        }
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.cursor_hidden = true;
        Ok(())
    }

    fn next_key_event(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        match self.keys.pop_front() {
            Some(key) => Ok(Some(key)),
            None => {
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_land_in_grid() {
        let mut term = HeadlessTerminal::new(3, 5);
        term.draw_char(1, 2, '┐').unwrap();
        term.draw_string(0, 1, "ab").unwrap();
        assert_eq!(term.cell(1, 2), Some('┐'));
        assert_eq!(term.row_text(0), " ab  ");
        assert_eq!(term.out_of_bounds_writes(), 0);
    }

    #[test]
    fn writes_outside_grid_are_counted() {
        let mut term = HeadlessTerminal::new(2, 3);
        term.draw_string(0, 1, "abcd").unwrap();
        term.draw_char(5, 0, 'x').unwrap();
        assert_eq!(term.row_text(0), " ab");
        assert_eq!(term.out_of_bounds_writes(), 3);
    }

    #[test]
    fn clear_blanks_without_resizing() {
        let mut term = HeadlessTerminal::new(2, 2);
        term.draw_string(0, 0, "xy").unwrap();
        term.clear().unwrap();
        assert_eq!(term.lines(), vec!["  ", "  "]);
        assert_eq!(term.viewport_size().unwrap(), Viewport::new(2, 2));
    }

    #[test]
    fn keys_replay_in_order_then_time_out() {
        let mut term = HeadlessTerminal::new(1, 1).with_keys([Key::Left, Key::End]);
        let t = Duration::from_millis(1);
        assert_eq!(term.next_key_event(t).unwrap(), Some(Key::Left));
        assert_eq!(term.next_key_event(t).unwrap(), Some(Key::End));
        assert_eq!(term.next_key_event(t).unwrap(), None);
    }

    #[test]
    fn resize_changes_reported_viewport() {
        let mut term = HeadlessTerminal::new(24, 80);
        term.resize(10, 40);
        assert_eq!(term.viewport_size().unwrap(), Viewport::new(10, 40));
        assert_eq!(term.row_text(9).len(), 40);
    }
}
