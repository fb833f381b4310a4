//! # livechart-core
//!
//! **A live line chart for any number you can read from a file.**
//!
//! `livechart-core` polls one or more numeric value sources on a fixed
//! interval, keeps an append-only time series per source, and renders the
//! visible slice of history as a box-drawing line chart into a terminal
//! driver.
//!
//! ## Quick Start
//!
//! ```no_run
//! use livechart_core::{FileSource, HeadlessTerminal, Session, SessionConfig, StopSignal};
//!
//! let sources = vec![FileSource::boxed("/proc/loadavg")];
//! let session = Session::new(sources, SessionConfig::default());
//! let mut terminal = HeadlessTerminal::new(24, 80);
//! let (stop, trigger) = StopSignal::new();
//! trigger.stop();
//! session.run(&mut terminal, stop).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Sources → Sampler (background thread) → SeriesStore → ViewWindow → ChartRenderer → Terminal
//!
//! The sampler is the only writer of the [`SeriesStore`]; the foreground
//! [`Session`] loop only takes snapshots. Both loops share one [`StopSignal`].

pub mod error;
pub mod input;
pub mod render;
pub mod sampler;
pub mod series;
pub mod session;
pub mod source;
pub mod terminal;
pub mod window;

pub use error::{Error, Result, SourceError};
pub use input::navigation_for;
pub use render::{
    ChartRenderer, GUTTER_WIDTH, PlotArea, TIME_FORMAT, row_for_value, value_range,
};
pub use sampler::{Sampler, StopSignal, StopTrigger};
pub use series::{Sample, Series, SeriesStore};
pub use session::{Session, SessionConfig};
pub use source::{FileSource, ValueSource};
pub use terminal::{HeadlessTerminal, Key, TerminalDriver, Viewport};
pub use window::{Navigation, ViewWindow};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
