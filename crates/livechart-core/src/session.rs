//! Foreground loop: read keys, move the window, redraw.
//!
//! Design: the sampler runs on its own thread and only appends to the store.
//! This loop owns the terminal and the scroll state, waits for keys with a
//! short timeout so it can also redraw when new data lands, and on shutdown
//! stops and joins the sampler before returning.

use std::io;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::error::{Error, Result};
use crate::input::navigation_for;
use crate::render::{ChartRenderer, PlotArea};
use crate::sampler::{Sampler, StopSignal};
use crate::series::SeriesStore;
use crate::source::ValueSource;
use crate::terminal::{Key, TerminalDriver};
use crate::window::ViewWindow;

/// Timing knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between sampler ticks.
    pub interval: Duration,
    /// How long one key wait may block before checking for new data.
    pub poll: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            poll: Duration::from_millis(50),
        }
    }
}

impl SessionConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/// A chart of one series per source.
pub struct Session {
    sources: Vec<Box<dyn ValueSource>>,
    store: Arc<SeriesStore>,
    window: ViewWindow,
    renderer: ChartRenderer,
    config: SessionConfig,
}

impl Session {
    pub fn new(sources: Vec<Box<dyn ValueSource>>, config: SessionConfig) -> Self {
        let store = SeriesStore::new(sources.iter().map(|s| s.id().to_string()));
        Self {
            sources,
            store: Arc::new(store),
            window: ViewWindow::default(),
            renderer: ChartRenderer::new(),
            config,
        }
    }

    pub fn store(&self) -> Arc<SeriesStore> {
        Arc::clone(&self.store)
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Draw the current window of a fresh snapshot at the current size.
    pub fn render<D>(&self, driver: &mut D) -> io::Result<()>
    where
        D: TerminalDriver + ?Sized,
    {
        let viewport = driver.viewport_size()?;
        let columns = PlotArea::columns_available(viewport);
        let data = self.store.snapshot_all();
        let visible = self.window.visible(&data, columns);
        self.renderer.render(driver, &visible, viewport)
    }

    /// Apply the navigation bound to `key`, if any. Does not redraw.
    pub fn handle_key<D>(&mut self, driver: &D, key: Key) -> io::Result<()>
    where
        D: TerminalDriver + ?Sized,
    {
        if let Some(nav) = navigation_for(key) {
            let columns = PlotArea::columns_available(driver.viewport_size()?);
            self.window = self.window.apply(nav, self.store.longest_len(), columns);
        }
        Ok(())
    }

    /// Run the sampler in the background and the input/render loop here until
    /// an interrupt key arrives or `stop` is raised.
    ///
    /// Always stops and joins the sampler before returning. A fatal source
    /// error from the sampler is returned after the join.
    pub fn run<D>(mut self, driver: &mut D, stop: StopSignal) -> Result<()>
    where
        D: TerminalDriver + ?Sized,
    {
        let sampler = Sampler::new(
            mem::take(&mut self.sources),
            Arc::clone(&self.store),
            self.config.interval,
        );
        let handle = sampler.spawn(stop.clone()).map_err(Error::Spawn)?;

        let foreground = self.input_loop(driver, &stop);

        stop.trigger().stop();
        let sampled = handle.join().map_err(|_| Error::SamplerPanicked)?;
        foreground?;
        sampled?;
        Ok(())
    }

    fn input_loop<D>(&mut self, driver: &mut D, stop: &StopSignal) -> Result<()>
    where
        D: TerminalDriver + ?Sized,
    {
        driver.hide_cursor()?;
        let mut seen = self.store.generation();
        self.render(driver)?;

        while !stop.is_stopped() {
            match driver.next_key_event(self.config.poll)? {
                Some(Key::Interrupt) => {
                    info!("interrupt received, shutting down");
                    break;
                }
                Some(key) => self.handle_key(driver, key)?,
                None if self.store.generation() == seen => continue,
                None => {}
            }
            seen = self.store.generation();
            self.render(driver)?;
        }
        Ok(())
    }
}
