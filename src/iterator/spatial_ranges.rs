use std::sync::Arc;

use crate::{
    coordinates::{Coordinate, CoordinateOrder, Coordinates, CoordsDisplay, coordinates_compare},
    iterator::{ConstIterator, MultiConstIterators, RegionCoordinatesIterator},
    schema::ArrayDesc,
    spatial::SpatialRanges,
    util::{Result, Status},
};

/// Chunk positions touched by a set of ranges
///
/// One `RegionCoordinatesIterator` per valid range walks the chunk starts
/// from the chunk holding the range's low corner up to its high corner. A
/// `MultiConstIterators` merges them, so a chunk covered by several ranges
/// is reported once and positions come out strictly ascending.
///
/// Invalid ranges get no stream at all.
pub struct SpatialRangesChunkPosIterator {
    ranges: Arc<SpatialRanges>,
    merge: MultiConstIterators<RegionCoordinatesIterator>,
}

impl SpatialRangesChunkPosIterator {
    pub fn new(ranges: Arc<SpatialRanges>, desc: &ArrayDesc) -> Self {
        debug_assert_eq!(ranges.num_dims(), desc.num_dims());

        let intervals = desc.chunk_intervals();
        let streams: Vec<_> = ranges
            .iter()
            .filter(|r| r.valid())
            .map(|r| {
                let low = desc.chunk_position_for(&r.low);
                RegionCoordinatesIterator::new(&low, &r.high, &intervals)
            })
            .collect();

        tracing::debug!(
            ranges = ranges.len(),
            skipped = ranges.len() - streams.len(),
            dims = desc.num_dims(),
            "spatial ranges chunk iterator created"
        );

        SpatialRangesChunkPosIterator {
            ranges,
            merge: MultiConstIterators::new(streams),
        }
    }

    pub fn ranges(&self) -> &SpatialRanges {
        &self.ranges
    }

    /// Skip forward to the first chunk position `>= new_pos`.
    ///
    /// Returns false if already at or past `new_pos` (or at the end).
    /// Otherwise every per-range stream skips ahead and the merge is rebuilt;
    /// the result is true even if that exhausts every stream.
    pub fn advance_position_to_at_least(&mut self, new_pos: &[Coordinate]) -> bool {
        if self.merge.end()
            || coordinates_compare(self.merge.position(), new_pos, CoordinateOrder::RowMajor).is_ge()
        {
            return false;
        }

        // TODO: reposition only the streams below new_pos instead of
        // rebuilding the whole set.
        let mut streams = std::mem::take(&mut self.merge).into_streams();
        for stream in &mut streams {
            stream.advance_to_at_least(new_pos);
        }
        self.merge = MultiConstIterators::new(streams);

        tracing::trace!(
            to = %CoordsDisplay(new_pos),
            end = self.merge.end(),
            "spatial ranges chunk iterator advanced"
        );
        true
    }
}

impl ConstIterator for SpatialRangesChunkPosIterator {
    fn end(&self) -> bool {
        self.merge.end()
    }

    fn next(&mut self) -> bool {
        self.merge.next()
    }

    fn position(&self) -> &Coordinates {
        self.merge.position()
    }

    fn set_position(&mut self, _pos: &[Coordinate]) -> Result<bool> {
        Err(Status::not_supported("SpatialRangesChunkPosIterator::set_position"))
    }

    /// Restart from the first chunk position.
    fn reset(&mut self) -> Result<()> {
        let mut streams = std::mem::take(&mut self.merge).into_streams();
        for stream in &mut streams {
            stream.reset()?;
        }
        self.merge = MultiConstIterators::new(streams);
        Ok(())
    }
}
