use std::{cmp::Ordering, collections::BTreeSet};

use crate::{
    coordinates::{Coordinate, CoordinateOrder, Coordinates, coordinates_compare},
    iterator::ConstIterator,
    util::{Result, Status},
};

/// Synchronized scan over several sorted position streams
///
/// Keeps one `(position, stream id)` entry per live stream in an ordered
/// set. The smallest entry is the merged position, and every stream sitting
/// at that same position forms a contiguous prefix of the set, so callers
/// can process all of them together before stepping.
///
/// # Architecture
///
/// ```text
/// MultiConstIterators
///     ├─→ BTreeSet<CoordinatesAndId> (one entry per live stream)
///     └─→ Vec<I> (owned streams, addressed by id)
/// ```
///
/// # Implementation Notes
///
/// - Streams are owned and referred to by index, never by reference
/// - A stream that reaches its end is dropped from the set and never
///   revisited
/// - Single pass: `set_position` and `reset` are not supported. Build a new
///   merge to start over, possibly from `into_streams()` after resetting them
/// - `next()` is O(k log n) where k is the number of streams at the minimum,
///   and reuses the popped entries' buffers
pub struct MultiConstIterators<I> {
    streams: Vec<I>,
    set: BTreeSet<CoordinatesAndId>,
}

/// Set entry, ordered by position in row-major order, then by stream id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatesAndId {
    pub coords: Coordinates,
    pub id: usize,
}

impl Ord for CoordinatesAndId {
    fn cmp(&self, other: &Self) -> Ordering {
        coordinates_compare(&self.coords, &other.coords, CoordinateOrder::RowMajor)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for CoordinatesAndId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: ConstIterator> MultiConstIterators<I> {
    pub fn new(streams: Vec<I>) -> Self {
        let set: BTreeSet<_> = streams
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.end())
            .map(|(id, s)| CoordinatesAndId {
                coords: s.position().clone(),
                id,
            })
            .collect();

        tracing::debug!(streams = streams.len(), live = set.len(), "multi-iterator merge created");

        MultiConstIterators { streams, set }
    }

    pub fn num_streams(&self) -> usize {
        self.streams.len()
    }

    pub fn stream(&self, id: usize) -> &I {
        &self.streams[id]
    }

    /// Give the streams back, in their current state.
    pub fn into_streams(self) -> Vec<I> {
        self.streams
    }

    /// Ids of every stream positioned at the merged position, ascending.
    pub fn ids_at_min_position(&self) -> Vec<usize> {
        let Some(first) = self.set.first() else {
            return Vec::new();
        };

        let sentinel = CoordinatesAndId {
            coords: first.coords.clone(),
            id: usize::MAX,
        };
        self.set.range(..=sentinel).map(|e| e.id).collect()
    }
}

impl<I: ConstIterator> MultiConstIterators<I> {
    /// Step the stream of a popped entry and put it back unless exhausted,
    /// reusing the entry's buffer.
    fn advance_stream(&mut self, mut entry: CoordinatesAndId) {
        let stream = &mut self.streams[entry.id];
        if !stream.next() {
            return;
        }
        debug_assert!(
            coordinates_compare(stream.position(), &entry.coords, CoordinateOrder::RowMajor).is_gt(),
            "stream {} is not strictly ascending",
            entry.id
        );
        entry.coords.clone_from(stream.position());
        self.set.insert(entry);
    }
}

impl<I> Default for MultiConstIterators<I> {
    fn default() -> Self {
        MultiConstIterators {
            streams: Vec::new(),
            set: BTreeSet::new(),
        }
    }
}

impl<I: ConstIterator> ConstIterator for MultiConstIterators<I> {
    fn end(&self) -> bool {
        self.set.is_empty()
    }

    fn next(&mut self) -> bool {
        debug_assert!(!self.end(), "next() past the end");

        // `first` is held back until the others at its position have been
        // stepped; re-inserted entries sort after it.
        let Some(first) = self.set.pop_first() else {
            return false;
        };
        while self.set.first().is_some_and(|e| e.coords == first.coords) {
            let Some(entry) = self.set.pop_first() else {
                break;
            };
            self.advance_stream(entry);
        }
        self.advance_stream(first);

        !self.end()
    }

    fn position(&self) -> &Coordinates {
        match self.set.first() {
            Some(entry) => &entry.coords,
            None => panic!("position() at the end"),
        }
    }

    fn set_position(&mut self, _pos: &[Coordinate]) -> Result<bool> {
        Err(Status::not_supported("MultiConstIterators::set_position"))
    }

    fn reset(&mut self) -> Result<()> {
        Err(Status::not_supported("MultiConstIterators::reset"))
    }
}
