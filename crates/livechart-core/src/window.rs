//! Which slice of history is on screen.
//!
//! The window is either following the live end of the data or parked at an
//! explicit upper bound (exclusive sample index). Navigation keys move between
//! the two; the visible range is derived from the state, the longest series
//! length, and the plot width.

use std::ops::Range;

use log::debug;

use crate::series::Series;

/// A navigation request produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    ScrollBack,
    ScrollForward,
    JumpToOldest,
    JumpToLive,
}

/// Scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewWindow {
    /// Always show the newest samples.
    #[default]
    Live,
    /// Show samples ending just before this index.
    Scrolled(usize),
}

impl ViewWindow {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    pub fn upper_bound(self) -> Option<usize> {
        match self {
            Self::Live => None,
            Self::Scrolled(bound) => Some(bound),
        }
    }

    /// Apply one navigation step.
    ///
    /// `longest` is the length of the longest series, `columns` the plot width.
    /// Scrolling back stops at 0; scrolling forward onto the live end returns
    /// to [`ViewWindow::Live`].
    pub fn apply(self, nav: Navigation, longest: usize, columns: usize) -> Self {
        let next = match (nav, self) {
            (Navigation::ScrollBack, Self::Live) => Self::Scrolled(longest.saturating_sub(1)),
            (Navigation::ScrollBack, Self::Scrolled(bound)) => {
                Self::Scrolled(bound.saturating_sub(1))
            }
            (Navigation::ScrollForward, Self::Live) => Self::Live,
            (Navigation::ScrollForward, Self::Scrolled(bound)) => {
                if bound + 1 >= longest {
                    Self::Live
                } else {
                    Self::Scrolled(bound + 1)
                }
            }
            (Navigation::JumpToOldest, _) => Self::Scrolled(columns),
            (Navigation::JumpToLive, _) => Self::Live,
        };
        debug!("{:?}: {:?} -> {:?}", nav, self, next);
        next
    }

    /// Index range of a series of length `len` that is visible.
    ///
    /// The same window applies to every series, so shorter series may show
    /// fewer (or no) samples.
    pub fn visible_range(self, len: usize, columns: usize) -> Range<usize> {
        match self {
            Self::Live => len.saturating_sub(columns)..len,
            Self::Scrolled(bound) => {
                let end = bound.min(len);
                let start = bound.saturating_sub(columns).min(end);
                start..end
            }
        }
    }

    /// Visible copy of every series.
    pub fn visible(self, series: &[Series], columns: usize) -> Vec<Series> {
        series
            .iter()
            .map(|s| {
                let range = self.visible_range(s.len(), columns);
                s.slice(range.start, range.end)
            })
            .collect()
    }
}
