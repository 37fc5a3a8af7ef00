/// Iterator module for chunkspace
///
/// Provides a unified cursor interface over ordered streams of points in
/// coordinate space:
/// - chunk positions of a box (RegionCoordinatesIterator)
/// - chunks storing one cell, overlap included (OverlappingChunksIterator)
/// - chunks touched by a set of ranges (SpatialRangesChunkPosIterator)
/// - any number of the above, merged (MultiConstIterators)
///
/// # Architecture
///
/// ```text
/// SpatialRangesChunkPosIterator
///     ↓
/// MultiConstIterators
///     ├─→ BTreeSet of (position, stream id)
///     └─→ [RegionCoordinatesIterator, RegionCoordinatesIterator, ...]
/// ```
///
/// ## Key Design Principles
///
/// 1. **Row-major order**: every stream yields positions in ascending
///    row-major order, so merged output is ascending too
/// 2. **Forward only**: merges cannot seek backwards or restart
/// 3. **Lazy**: no stream materializes its positions up front; an unbounded
///    dimension costs nothing until it is walked
/// 4. **Owned streams**: a merge owns its streams and names them by index
use crate::{
    coordinates::{Coordinate, Coordinates},
    util::Result,
};

/// Cursor over an ordered stream of positions
///
/// # Lifecycle
///
/// A freshly constructed iterator is already positioned at its first
/// element, or at `end()` if it has none:
///
/// ```ignore
/// let mut iter = RegionCoordinatesIterator::new(&[0, 0], &[19, 19], &[10, 10]);
/// while !iter.end() {
///     println!("{:?}", iter.position());
///     iter.next();
/// }
/// ```
///
/// # Error Handling
///
/// Stepping cannot fail. `set_position` and `reset` return `Result` because
/// some implementors do not support them and must say so with
/// `Code::NotSupported` instead of silently doing nothing.
pub trait ConstIterator {
    /// Whether the stream is exhausted
    fn end(&self) -> bool;

    /// Move to the next position
    ///
    /// Prerequisite: end() == false
    /// Returns true if still positioned, false if the end was reached
    fn next(&mut self) -> bool;

    /// Current position
    ///
    /// Prerequisite: end() == false
    fn position(&self) -> &Coordinates;

    /// Jump to `pos`
    ///
    /// Returns Ok(false) if `pos` lies outside the stream's bounds.
    fn set_position(&mut self, pos: &[Coordinate]) -> Result<bool>;

    /// Go back to the first position
    fn reset(&mut self) -> Result<()>;

    /// Consume the cursor as a std iterator of owned positions
    fn positions(self) -> Positions<Self>
    where
        Self: Sized,
    {
        Positions { inner: self }
    }
}

impl<I: ConstIterator + ?Sized> ConstIterator for Box<I> {
    fn end(&self) -> bool {
        (**self).end()
    }

    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn position(&self) -> &Coordinates {
        (**self).position()
    }

    fn set_position(&mut self, pos: &[Coordinate]) -> Result<bool> {
        (**self).set_position(pos)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

/// Adapter returned by [`ConstIterator::positions`]
pub struct Positions<I> {
    inner: I,
}

impl<I> Positions<I> {
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: ConstIterator> std::iter::Iterator for Positions<I> {
    type Item = Coordinates;

    fn next(&mut self) -> Option<Coordinates> {
        if self.inner.end() {
            return None;
        }
        let pos = self.inner.position().clone();
        ConstIterator::next(&mut self.inner);
        Some(pos)
    }
}

mod multi;
mod overlapping;
mod region;
mod spatial_ranges;

pub use multi::{CoordinatesAndId, MultiConstIterators};
pub use overlapping::OverlappingChunksIterator;
pub use region::RegionCoordinatesIterator;
pub use spatial_ranges::SpatialRangesChunkPosIterator;
