//! Append-only time series storage shared between the sampler and the UI.
//!
//! The sampler thread is the only writer and only ever pushes to the end of a
//! series. Readers take owned snapshots, so a snapshot never shrinks, never
//! reorders, and never exposes a half-written sample.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// Sample / Series
// ---------------------------------------------------------------------------

/// One timestamped observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: DateTime<Local>,
    pub value: f64,
}

impl Sample {
    pub fn new(time: DateTime<Local>, value: f64) -> Self {
        Self { time, value }
    }

    /// Sample stamped with the current wall-clock time.
    pub fn now(value: f64) -> Self {
        Self::new(Local::now(), value)
    }
}

/// A named, ordered run of samples. Returned by value from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy of this series restricted to `start..end`, clamped to its length.
    pub fn slice(&self, start: usize, end: usize) -> Series {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        Series::new(self.name.clone(), self.samples[start..end].to_vec())
    }
}

// ---------------------------------------------------------------------------
// SeriesStore
// ---------------------------------------------------------------------------

struct Slot {
    name: String,
    samples: RwLock<Vec<Sample>>,
}

impl Slot {
    fn read(&self) -> RwLockReadGuard<'_, Vec<Sample>> {
        match self.samples.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Sample>> {
        match self.samples.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Fixed set of series, one per configured source, indexed by position.
///
/// The set of series is decided at construction and never changes.
pub struct SeriesStore {
    slots: Vec<Slot>,
    generation: AtomicU64,
}

impl SeriesStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = names
            .into_iter()
            .map(|name| Slot {
                name: name.into(),
                samples: RwLock::new(Vec::new()),
            })
            .collect();
        Self {
            slots,
            generation: AtomicU64::new(0),
        }
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    /// Append a sample to series `id`.
    ///
    /// # Panics
    /// Panics if `id` is not a valid series index.
    pub fn append(&self, id: usize, sample: Sample) {
        self.slots[id].write().push(sample);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Owned copy of series `id` as of this call.
    pub fn snapshot(&self, id: usize) -> Vec<Sample> {
        self.slots
            .get(id)
            .map(|slot| slot.read().clone())
            .unwrap_or_default()
    }

    /// Owned copy of every series, in configuration order.
    pub fn snapshot_all(&self) -> Vec<Series> {
        self.slots
            .iter()
            .map(|slot| Series::new(slot.name.clone(), slot.read().clone()))
            .collect()
    }

    /// Current length of series `id` (0 for an unknown id).
    pub fn series_len(&self, id: usize) -> usize {
        self.slots.get(id).map_or(0, |slot| slot.read().len())
    }

    /// Length of the longest series.
    pub fn longest_len(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.read().len())
            .max()
            .unwrap_or(0)
    }

    /// Counter bumped on every append. Lets readers detect new data cheaply.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_store_has_empty_series() {
        let store = SeriesStore::new(["a", "b"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.names(), vec!["a", "b"]);
        assert_eq!(store.longest_len(), 0);
        assert_eq!(store.generation(), 0);
        assert!(store.snapshot(0).is_empty());
    }

    #[test]
    fn append_preserves_arrival_order() {
        let store = SeriesStore::new(["a"]);
        for v in [3.0, 1.0, 2.0] {
            store.append(0, Sample::now(v));
        }
        let values: Vec<f64> = store.snapshot(0).iter().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
        assert_eq!(store.generation(), 3);
    }

    #[test]
    fn snapshot_is_insulated_from_later_appends() {
        let store = SeriesStore::new(["a"]);
        store.append(0, Sample::now(1.0));
        let snap = store.snapshot(0);
        store.append(0, Sample::now(2.0));
        assert_eq!(snap.len(), 1);
        assert_eq!(store.series_len(0), 2);
    }

    #[test]
    fn longest_len_tracks_unequal_series() {
        let store = SeriesStore::new(["a", "b"]);
        store.append(0, Sample::now(1.0));
        store.append(1, Sample::now(1.0));
        store.append(1, Sample::now(2.0));
        assert_eq!(store.longest_len(), 2);
        let all = store.snapshot_all();
        assert_eq!(all[0].len(), 1);
        assert_eq!(all[1].name, "b");
    }

    #[test]
    fn unknown_id_reads_as_empty() {
        let store = SeriesStore::new(["a"]);
        assert!(store.snapshot(7).is_empty());
        assert_eq!(store.series_len(7), 0);
    }

    #[test]
    fn series_slice_clamps_to_length() {
        let series = Series::new("a", (0..5).map(|v| Sample::now(v as f64)).collect());
        assert_eq!(series.slice(3, 10).len(), 2);
        assert!(series.slice(8, 10).is_empty());
        assert_eq!(series.slice(0, 2).samples[1].value, 1.0);
    }

    #[test]
    fn concurrent_snapshots_never_shrink() {
        let store = Arc::new(SeriesStore::new(["a"]));
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..2000 {
                    store.append(0, Sample::now(i as f64));
                }
            })
        };

        let mut last_len = 0;
        while !writer.is_finished() {
            let snap = store.snapshot(0);
            assert!(snap.len() >= last_len);
            for (i, sample) in snap.iter().enumerate() {
                assert_eq!(sample.value, i as f64);
            }
            last_len = snap.len();
        }
        writer.join().unwrap();
        assert_eq!(store.series_len(0), 2000);
    }
}
