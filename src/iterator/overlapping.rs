use crate::{
    coordinates::{Coordinate, Coordinates},
    iterator::{ConstIterator, RegionCoordinatesIterator},
    schema::DimensionDesc,
    util::Result,
};

/// Every chunk that must physically store one cell
///
/// With overlap, a cell near a chunk border is replicated into the
/// neighbouring chunks. Per dimension the candidate chunk positions are the
/// chunk starts in
///
/// ```text
/// [ floor_to_chunk(max(pos - overlap, start_min)), min(pos + overlap, end_max) ]
/// ```
///
/// which always includes the cell's home chunk. Positions come out in
/// row-major order.
#[derive(Debug, Clone)]
pub struct OverlappingChunksIterator {
    inner: RegionCoordinatesIterator,
}

impl OverlappingChunksIterator {
    pub fn new(dims: &[DimensionDesc], item_pos: &[Coordinate]) -> Self {
        debug_assert_eq!(dims.len(), item_pos.len());

        let mut low = Coordinates::with_capacity(dims.len());
        let mut high = Coordinates::with_capacity(dims.len());
        let mut intervals = Vec::with_capacity(dims.len());

        for (d, &pos) in dims.iter().zip(item_pos) {
            debug_assert!(d.start_min <= pos && pos <= d.end_max);

            let lo = (pos - d.overlap()).max(d.start_min);
            low.push(lo - (lo - d.start_min) % d.interval());
            high.push((pos + d.overlap()).min(d.end_max));
            intervals.push(d.chunk_interval);
        }

        OverlappingChunksIterator {
            inner: RegionCoordinatesIterator::new(&low, &high, &intervals),
        }
    }

    pub fn region(&self) -> &RegionCoordinatesIterator {
        &self.inner
    }
}

impl ConstIterator for OverlappingChunksIterator {
    fn end(&self) -> bool {
        self.inner.end()
    }

    fn next(&mut self) -> bool {
        self.inner.next()
    }

    fn position(&self) -> &Coordinates {
        self.inner.position()
    }

    fn set_position(&mut self, pos: &[Coordinate]) -> Result<bool> {
        self.inner.set_position(pos)
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::MAX_COORDINATE;

    fn dims_2d(overlap: u64) -> Vec<DimensionDesc> {
        vec![
            DimensionDesc::new("x", 0, 99, 10, overlap),
            DimensionDesc::new("y", 0, 99, 10, overlap),
        ]
    }

    fn chunks(dims: &[DimensionDesc], pos: &[Coordinate]) -> Vec<Coordinates> {
        OverlappingChunksIterator::new(dims, pos).positions().collect()
    }

    #[test]
    fn test_corner_cell_hits_four_chunks() {
        assert_eq!(
            chunks(&dims_2d(1), &[10, 10]),
            vec![vec![0, 0], vec![0, 10], vec![10, 0], vec![10, 10]]
        );
    }

    #[test]
    fn test_interior_cell_hits_home_chunk_only() {
        assert_eq!(chunks(&dims_2d(1), &[15, 15]), vec![vec![10, 10]]);
        assert_eq!(chunks(&dims_2d(0), &[10, 10]), vec![vec![10, 10]]);
    }

    #[test]
    fn test_edge_cell_hits_two_chunks() {
        assert_eq!(chunks(&dims_2d(1), &[19, 15]), vec![vec![10, 10], vec![20, 10]]);
    }

    #[test]
    fn test_clamped_to_array_bounds() {
        // No chunk before start_min or after end_max.
        assert_eq!(chunks(&dims_2d(3), &[0, 99]), vec![vec![0, 90]]);
    }

    #[test]
    fn test_nonzero_start() {
        let dims = vec![DimensionDesc::new("t", 5, 104, 10, 2)];
        assert_eq!(chunks(&dims, &[15]), vec![vec![5], vec![15]]);
        assert_eq!(chunks(&dims, &[5]), vec![vec![5]]);
        assert_eq!(chunks(&dims, &[23]), vec![vec![15], vec![25]]);
    }

    #[test]
    fn test_unbounded_dimension_near_max() {
        let dims = vec![DimensionDesc::new("x", 0, MAX_COORDINATE, 1 << 40, 1 << 40)];
        let pos = MAX_COORDINATE - 1;
        let found = chunks(&dims, &[pos]);
        let home = dims[0].chunk_position_for(pos);
        assert!(found.contains(&vec![home]));
        assert!(found.iter().all(|c| c[0] <= MAX_COORDINATE));
        assert_eq!(found.len(), 2);
    }
}
