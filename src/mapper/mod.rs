/// Cell coordinate <-> linear offset conversion
///
/// A chunk stores its cells, overlap included, in one flat buffer in
/// row-major order. For a chunk whose stored box is `[origin, last]`:
///
/// ```text
/// chunk_intervals[i] = last[i] - origin[i] + 1
/// stride[n-1]        = 1
/// stride[i]          = stride[i+1] * chunk_intervals[i+1]
/// offset(p)          = sum_i (p[i] - origin[i]) * stride[i]
/// ```
///
/// `CoordinatesMapper` is built for one chunk. `ArrayCoordinatesMapper` is
/// built once per array and takes the chunk position on every call.
use crate::{
    coordinates::{Coordinate, Coordinates, CoordsDisplay},
    schema::{ArrayDesc, DimensionDesc},
    util::{Result, Status},
};

/// Offset of a cell within its chunk's storage
pub type Position = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatesMapper {
    origin: Coordinates,
    chunk_intervals: Vec<u64>,
    strides: Vec<u64>,
    logical_chunk_size: u64,
}

impl CoordinatesMapper {
    /// Mapper for the box `[first, last]`, both corners inclusive of overlap.
    ///
    /// Fails with `InvalidArgument` if the box holds more than `u64::MAX`
    /// cells, since offsets would no longer fit a `Position`.
    pub fn new(first: &[Coordinate], last: &[Coordinate]) -> Result<Self> {
        debug_assert!(!first.is_empty());
        debug_assert_eq!(first.len(), last.len());
        debug_assert!(first.iter().zip(last).all(|(f, l)| f <= l));

        let chunk_intervals: Vec<u64> = first
            .iter()
            .zip(last)
            .map(|(&f, &l)| (l as i128 - f as i128 + 1) as u64)
            .collect();

        let too_large = || {
            Status::invalid_argument(format!(
                "box [{}, {}] holds more than {} cells",
                CoordsDisplay(first),
                CoordsDisplay(last),
                u64::MAX
            ))
        };

        let mut strides = vec![1u64; chunk_intervals.len()];
        for i in (0..chunk_intervals.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1]
                .checked_mul(chunk_intervals[i + 1])
                .ok_or_else(too_large)?;
        }
        let logical_chunk_size = strides[0]
            .checked_mul(chunk_intervals[0])
            .ok_or_else(too_large)?;

        Ok(CoordinatesMapper {
            origin: first.to_vec(),
            chunk_intervals,
            strides,
            logical_chunk_size,
        })
    }

    /// Mapper for the chunk at `chunk_pos`, overlap included.
    pub fn from_chunk(desc: &ArrayDesc, chunk_pos: &[Coordinate]) -> Result<Self> {
        let (first, last) = desc.chunk_boundaries(chunk_pos, true);
        Self::new(&first, &last)
    }

    pub fn origin(&self) -> &[Coordinate] {
        &self.origin
    }

    pub fn chunk_intervals(&self) -> &[u64] {
        &self.chunk_intervals
    }

    /// Number of cells in the chunk, overlap included.
    pub fn logical_chunk_size(&self) -> u64 {
        self.logical_chunk_size
    }

    pub fn coord_to_pos(&self, coord: &[Coordinate]) -> Position {
        debug_assert_eq!(coord.len(), self.origin.len());

        coord
            .iter()
            .zip(&self.origin)
            .zip(&self.strides)
            .map(|((&c, &o), &s)| {
                debug_assert!(c >= o, "{} is before the chunk origin", CoordsDisplay(coord));
                (c - o) as u64 * s
            })
            .sum()
    }

    pub fn pos_to_coord(&self, pos: Position) -> Coordinates {
        debug_assert!(pos < self.logical_chunk_size);

        let mut coord = self.origin.clone();
        let mut rest = pos;
        for i in (0..coord.len()).rev() {
            coord[i] += (rest % self.chunk_intervals[i]) as Coordinate;
            rest /= self.chunk_intervals[i];
        }
        coord
    }
}

/// Array-wide mapper; the chunk is chosen per call
///
/// Also numbers chunks in row-major order over the chunk grid, which only
/// works while the grid has fewer than 2^64 chunks.
#[derive(Debug, Clone)]
pub struct ArrayCoordinatesMapper {
    dims: Vec<DimensionDesc>,
    /// Chunks in the whole grid; None if that overflows a u64
    total_chunks: Option<u64>,
}

impl ArrayCoordinatesMapper {
    pub fn new(desc: &ArrayDesc) -> Self {
        debug_assert!(!desc.dimensions().is_empty());
        let total_chunks = desc
            .dimensions()
            .iter()
            .try_fold(1u64, |acc, d| acc.checked_mul(num_chunks(d)));

        ArrayCoordinatesMapper {
            dims: desc.dimensions().to_vec(),
            total_chunks,
        }
    }

    /// Number of chunks in the grid, or None if the grid is too large to
    /// number.
    pub fn total_chunks(&self) -> Option<u64> {
        self.total_chunks
    }

    pub fn dims(&self) -> &[DimensionDesc] {
        &self.dims
    }

    /// Low corner and extent of the stored box of the chunk at `chunk_pos`.
    pub fn chunk_pos_to_lows_and_intervals(&self, chunk_pos: &[Coordinate]) -> (Coordinates, Vec<u64>) {
        debug_assert_eq!(chunk_pos.len(), self.dims.len());

        self.dims
            .iter()
            .zip(chunk_pos)
            .map(|(d, &c)| {
                let low = (c - d.overlap()).max(d.start_min);
                let high = c
                    .saturating_add(d.interval() - 1)
                    .saturating_add(d.overlap())
                    .min(d.end_max);
                debug_assert!(high >= low);
                (low, (high - low + 1) as u64)
            })
            .unzip()
    }

    pub fn coord_to_pos(&self, chunk_pos: &[Coordinate], coord: &[Coordinate]) -> Position {
        let (lows, intervals) = self.chunk_pos_to_lows_and_intervals(chunk_pos);
        coord_to_pos_with_lows_and_intervals(&lows, &intervals, coord)
    }

    pub fn pos_to_coord(&self, chunk_pos: &[Coordinate], pos: Position) -> Coordinates {
        let (lows, intervals) = self.chunk_pos_to_lows_and_intervals(chunk_pos);
        pos_to_coord_with_lows_and_intervals(&lows, &intervals, pos)
    }

    /// Row-major sequence number of the chunk at `chunk_pos`.
    ///
    /// Fails on grids whose chunk count overflows a u64, even for chunks
    /// whose own number would fit.
    pub fn chunk_pos_to_seq(&self, chunk_pos: &[Coordinate]) -> Result<u64> {
        debug_assert_eq!(chunk_pos.len(), self.dims.len());
        self.total_chunks.ok_or_else(Self::too_many_chunks)?;

        let mut seq = 0u64;
        for (d, &c) in self.dims.iter().zip(chunk_pos) {
            let offset = c as i128 - d.start_min as i128;
            let interval = d.chunk_interval as i128;
            if offset < 0 || offset % interval != 0 || c > d.end_max {
                return Err(Status::invalid_argument(format!(
                    "{} is not a chunk position of the array",
                    CoordsDisplay(chunk_pos)
                )));
            }
            // Cannot overflow: seq stays below total_chunks.
            seq = seq * num_chunks(d) + (offset / interval) as u64;
        }
        Ok(seq)
    }

    /// Inverse of [`chunk_pos_to_seq`](Self::chunk_pos_to_seq).
    pub fn seq_to_chunk_pos(&self, seq: u64) -> Result<Coordinates> {
        let total = self.total_chunks.ok_or_else(Self::too_many_chunks)?;
        if seq >= total {
            return Err(Status::invalid_argument(format!(
                "chunk number {seq} out of range (array has {total} chunks)"
            )));
        }

        let mut rest = seq;
        let mut chunk_pos = vec![0; self.dims.len()];
        for (i, d) in self.dims.iter().enumerate().rev() {
            let n = num_chunks(d);
            chunk_pos[i] = d.start_min + (rest % n) as Coordinate * d.interval();
            rest /= n;
        }
        Ok(chunk_pos)
    }

    fn too_many_chunks() -> Status {
        Status::invalid_argument("chunk grid has too many chunks to number")
    }
}

fn num_chunks(d: &DimensionDesc) -> u64 {
    let span = (d.end_max as i128 - d.start_min as i128) as u128;
    (span / d.chunk_interval as u128 + 1) as u64
}

pub fn coord_to_pos_with_lows_and_intervals(
    lows: &[Coordinate],
    intervals: &[u64],
    coord: &[Coordinate],
) -> Position {
    debug_assert_eq!(lows.len(), coord.len());
    debug_assert_eq!(intervals.len(), coord.len());

    coord
        .iter()
        .zip(lows)
        .zip(intervals)
        .fold(0, |pos, ((&c, &low), &interval)| pos * interval + (c - low) as u64)
}

pub fn pos_to_coord_with_lows_and_intervals(lows: &[Coordinate], intervals: &[u64], pos: Position) -> Coordinates {
    debug_assert_eq!(lows.len(), intervals.len());

    let mut coord = lows.to_vec();
    let mut rest = pos;
    for i in (0..coord.len()).rev() {
        coord[i] += (rest % intervals[i]) as Coordinate;
        rest /= intervals[i];
    }
    debug_assert_eq!(rest, 0);
    coord
}
