//! crossterm/ratatui terminal driver.
//!
//! Cells are drawn into an off-screen ratatui [`Buffer`]; `refresh` copies it
//! into a ratatui frame so only changed cells hit the terminal.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::prelude::*;

use livechart_core::{Key, TerminalDriver, Viewport};

pub struct CrosstermTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    frame: Buffer,
}

impl CrosstermTerminal {
    /// Enter raw mode and the alternate screen.
    ///
    /// The terminal is restored on drop, and by a panic hook if the process
    /// panics first.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        Ok(Self {
            terminal,
            frame: Buffer::empty(Rect::ZERO),
        })
    }

    fn area() -> io::Result<Rect> {
        let (columns, rows) = crossterm::terminal::size()?;
        Ok(Rect::new(0, 0, columns, rows))
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let _ = std::panic::take_hook(); // remove our hook
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        );
    }
}

fn position(row: usize, column: usize) -> Option<(u16, u16)> {
    Some((u16::try_from(column).ok()?, u16::try_from(row).ok()?))
}

impl TerminalDriver for CrosstermTerminal {
    fn viewport_size(&self) -> io::Result<Viewport> {
        let area = Self::area()?;
        Ok(Viewport::new(area.height as usize, area.width as usize))
    }

    fn draw_char(&mut self, row: usize, column: usize, glyph: char) -> io::Result<()> {
        if let Some(pos) = position(row, column)
            && let Some(cell) = self.frame.cell_mut(pos)
        {
            cell.set_char(glyph);
        }
        Ok(())
    }

    fn draw_string(&mut self, row: usize, column: usize, text: &str) -> io::Result<()> {
        if let Some((x, y)) = position(row, column)
            && self.frame.area.contains(Position::new(x, y))
        {
            self.frame.set_string(x, y, text, Style::default());
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let area = Self::area()?;
        if self.frame.area == area {
            self.frame.reset();
        } else {
            self.frame = Buffer::empty(area);
        }
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        let frame = &self.frame;
        self.terminal.draw(|f| {
            let area = f.area().intersection(frame.area);
            let buf = f.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let (Some(dst), Some(src)) = (buf.cell_mut((x, y)), frame.cell((x, y))) {
                        *dst = src.clone();
                    }
                }
            }
        })?;
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.terminal.hide_cursor()
    }

    fn next_key_event(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(map_key(key)),
            // Redraw at the new size.
            Event::Resize(..) => Some(Key::Other),
            _ => None,
        })
    }
}

/// Decode a crossterm key. Ctrl+C arrives as a key in raw mode.
pub fn map_key(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char('q') | KeyCode::Esc => Key::Interrupt,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Other,
    }
}
