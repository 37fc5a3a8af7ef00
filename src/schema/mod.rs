/// Array schema metadata consumed by the iterators
///
/// Each dimension is described by its inclusive coordinate bounds and its
/// chunking policy. Chunks are aligned on `start_min`:
///
/// ```text
/// start_min                                                  end_max
///    |<-- interval -->|<-- interval -->|<-- interval -->| ... |
///  ##|################|##            ##|##
///  overlap: each chunk also stores `chunk_overlap` cells on both sides,
///  clamped to [start_min, end_max]
/// ```
///
/// # Example
///
/// ```ignore
/// use chunkspace::ArrayDesc;
///
/// let desc = ArrayDesc::from_json(r#"{
///     "name": "temperature",
///     "dimensions": [
///         { "name": "x", "start_min": 0, "end_max": 99, "chunk_interval": 10, "chunk_overlap": 1 },
///         { "name": "y", "start_min": 0, "chunk_interval": 10 }
///     ]
/// }"#)?;
/// ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    coordinates::{Coordinate, Coordinates, CoordsDisplay, INFINITE_LENGTH, MAX_COORDINATE, MIN_COORDINATE},
    util::{Result, Status},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDesc {
    /// Dimension name, informational only
    #[serde(default)]
    pub name: String,

    /// First valid coordinate, also the chunk alignment origin
    /// Default: 0
    #[serde(default)]
    pub start_min: Coordinate,

    /// Last valid coordinate; `MAX_COORDINATE` means unbounded
    /// Default: MAX_COORDINATE
    #[serde(default = "default_end_max")]
    pub end_max: Coordinate,

    /// Chunk length along this dimension, must be positive
    pub chunk_interval: u64,

    /// Cells replicated into each neighbouring chunk
    /// Default: 0
    #[serde(default)]
    pub chunk_overlap: u64,
}

fn default_end_max() -> Coordinate {
    MAX_COORDINATE
}

impl DimensionDesc {
    pub fn new(
        name: impl Into<String>,
        start_min: Coordinate,
        end_max: Coordinate,
        chunk_interval: u64,
        chunk_overlap: u64,
    ) -> Self {
        DimensionDesc {
            name: name.into(),
            start_min,
            end_max,
            chunk_interval,
            chunk_overlap,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_interval == 0 {
            return Err(Status::invalid_argument(format!(
                "dimension '{}': chunk interval must be positive",
                self.name
            )));
        }
        if self.chunk_interval > INFINITE_LENGTH || self.chunk_overlap > INFINITE_LENGTH {
            return Err(Status::invalid_argument(format!(
                "dimension '{}': chunk interval and overlap must not exceed {INFINITE_LENGTH}",
                self.name
            )));
        }
        if self.start_min < MIN_COORDINATE || self.end_max > MAX_COORDINATE {
            return Err(Status::invalid_argument(format!(
                "dimension '{}': bounds [{}, {}] outside [{MIN_COORDINATE}, {MAX_COORDINATE}]",
                self.name, self.start_min, self.end_max
            )));
        }
        if self.start_min > self.end_max {
            return Err(Status::invalid_argument(format!(
                "dimension '{}': start {} is after end {}",
                self.name, self.start_min, self.end_max
            )));
        }
        Ok(())
    }

    pub fn is_unbounded(&self) -> bool {
        self.end_max == MAX_COORDINATE
    }

    /// Number of cells, saturating at `INFINITE_LENGTH`.
    pub fn length(&self) -> u64 {
        if self.is_unbounded() {
            return INFINITE_LENGTH;
        }
        let len = (self.end_max as i128) - (self.start_min as i128) + 1;
        len.min(INFINITE_LENGTH as i128) as u64
    }

    /// Most cells a chunk can store along this dimension, overlap included.
    pub fn max_chunk_extent(&self) -> u64 {
        let span = self.end_max as i128 - self.start_min as i128 + 1;
        let stored = self.chunk_interval as i128 + 2 * self.chunk_overlap as i128;
        span.min(stored) as u64
    }

    pub(crate) fn interval(&self) -> Coordinate {
        self.chunk_interval as Coordinate
    }

    pub(crate) fn overlap(&self) -> Coordinate {
        self.chunk_overlap as Coordinate
    }

    /// Round `coord` down to the start of its chunk.
    ///
    /// Works below `start_min` too: with start 0 and interval 5, -9 maps
    /// to -10.
    pub fn chunk_position_for(&self, coord: Coordinate) -> Coordinate {
        coord - (coord - self.start_min).rem_euclid(self.interval())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayDesc {
    #[serde(default)]
    pub name: String,
    pub dimensions: Vec<DimensionDesc>,
}

impl ArrayDesc {
    pub fn new(name: impl Into<String>, dimensions: Vec<DimensionDesc>) -> Result<Self> {
        let desc = ArrayDesc {
            name: name.into(),
            dimensions,
        };
        desc.validate()?;
        Ok(desc)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let desc: ArrayDesc = serde_json::from_str(json)?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(Status::invalid_argument(format!(
                "array '{}' has no dimensions",
                self.name
            )));
        }
        self.dimensions.iter().try_for_each(DimensionDesc::validate)?;

        if self.max_chunk_volume().is_none() {
            return Err(Status::invalid_argument(format!(
                "array '{}': a chunk would hold more than {} cells",
                self.name,
                u64::MAX
            )));
        }
        Ok(())
    }

    /// Cell count of the largest chunk, overlap included, or None if it
    /// overflows a u64.
    pub fn max_chunk_volume(&self) -> Option<u64> {
        self.dimensions
            .iter()
            .try_fold(1u64, |acc, d| acc.checked_mul(d.max_chunk_extent()))
    }

    pub fn dimensions(&self) -> &[DimensionDesc] {
        &self.dimensions
    }

    pub fn num_dims(&self) -> usize {
        self.dimensions.len()
    }

    pub fn chunk_intervals(&self) -> Vec<u64> {
        self.dimensions.iter().map(|d| d.chunk_interval).collect()
    }

    /// Whether `pos` lies inside the array bounds.
    pub fn contains(&self, pos: &[Coordinate]) -> bool {
        debug_assert_eq!(pos.len(), self.num_dims());
        self.dimensions
            .iter()
            .zip(pos)
            .all(|(d, &c)| d.start_min <= c && c <= d.end_max)
    }

    /// Position of the chunk whose interior holds `pos`.
    pub fn chunk_position_for(&self, pos: &[Coordinate]) -> Coordinates {
        debug_assert_eq!(pos.len(), self.num_dims());
        self.dimensions
            .iter()
            .zip(pos)
            .map(|(d, &c)| d.chunk_position_for(c))
            .collect()
    }

    pub fn is_a_chunk_position(&self, pos: &[Coordinate]) -> bool {
        self.chunk_position_for(pos) == pos
    }

    pub fn is_cell_pos_in_chunk(&self, cell_pos: &[Coordinate], chunk_pos: &[Coordinate]) -> bool {
        self.chunk_position_for(cell_pos) == chunk_pos
    }

    /// Inclusive bounds of the chunk at `chunk_pos`, clamped to the array.
    pub fn chunk_boundaries(&self, chunk_pos: &[Coordinate], with_overlap: bool) -> (Coordinates, Coordinates) {
        debug_assert!(
            self.is_a_chunk_position(chunk_pos),
            "{} is not a chunk position",
            CoordsDisplay(chunk_pos)
        );

        self.dimensions
            .iter()
            .zip(chunk_pos)
            .map(|(d, &c)| {
                let overlap = if with_overlap { d.overlap() } else { 0 };
                let low = (c - overlap).max(d.start_min);
                let high = c
                    .saturating_add(d.interval() - 1)
                    .saturating_add(overlap)
                    .min(d.end_max);
                (low, high)
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2d() -> ArrayDesc {
        ArrayDesc::new(
            "grid",
            vec![
                DimensionDesc::new("x", 0, 99, 10, 1),
                DimensionDesc::new("y", 0, 99, 10, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_chunk_position_for() {
        let d = DimensionDesc::new("x", 0, 99, 5, 0);
        assert_eq!(d.chunk_position_for(0), 0);
        assert_eq!(d.chunk_position_for(4), 0);
        assert_eq!(d.chunk_position_for(5), 5);
        assert_eq!(d.chunk_position_for(-1), -5);
        assert_eq!(d.chunk_position_for(-9), -10);

        let shifted = DimensionDesc::new("t", 3, 99, 10, 0);
        assert_eq!(shifted.chunk_position_for(12), 3);
        assert_eq!(shifted.chunk_position_for(13), 13);
    }

    #[test]
    fn test_array_chunk_positions() {
        let desc = grid_2d();
        assert_eq!(desc.chunk_position_for(&[15, 27]), vec![10, 20]);
        assert!(desc.is_a_chunk_position(&[10, 20]));
        assert!(!desc.is_a_chunk_position(&[10, 21]));
        assert!(desc.is_cell_pos_in_chunk(&[19, 29], &[10, 20]));
        assert!(!desc.is_cell_pos_in_chunk(&[20, 29], &[10, 20]));
        assert!(desc.contains(&[0, 99]));
        assert!(!desc.contains(&[0, 100]));
    }

    #[test]
    fn test_chunk_boundaries() {
        let desc = grid_2d();
        assert_eq!(
            desc.chunk_boundaries(&[10, 90], false),
            (vec![10, 90], vec![19, 99])
        );
        assert_eq!(
            desc.chunk_boundaries(&[10, 90], true),
            (vec![9, 89], vec![20, 99])
        );
        assert_eq!(desc.chunk_boundaries(&[0, 0], true), (vec![0, 0], vec![10, 10]));
    }

    #[test]
    fn test_validation() {
        assert!(
            ArrayDesc::new("empty", vec![])
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            ArrayDesc::new("zero", vec![DimensionDesc::new("x", 0, 9, 0, 0)])
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            ArrayDesc::new("backwards", vec![DimensionDesc::new("x", 9, 0, 1, 0)])
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            ArrayDesc::new("wide", vec![DimensionDesc::new("x", i64::MIN, 0, 1, 0)])
                .unwrap_err()
                .is_invalid_argument()
        );
    }

    #[test]
    fn test_chunk_volume_must_fit_u64() {
        let huge = |name| DimensionDesc::new(name, 0, MAX_COORDINATE, 1 << 32, 0);
        let err = ArrayDesc::new("huge", vec![huge("x"), huge("y")]).unwrap_err();
        assert!(err.is_invalid_argument());

        // Overlap counts toward the stored volume.
        let err = ArrayDesc::new(
            "overlapped",
            vec![
                DimensionDesc::new("x", 0, MAX_COORDINATE, 1 << 31, 1 << 30),
                DimensionDesc::new("y", 0, MAX_COORDINATE, 1 << 31, 1 << 30),
            ],
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());

        // A short dimension caps its extent at its length.
        let desc = ArrayDesc::new(
            "capped",
            vec![huge("x"), DimensionDesc::new("y", 0, 9, 1 << 40, 1 << 40)],
        )
        .unwrap();
        assert_eq!(desc.max_chunk_volume(), Some(10 << 32));

        assert_eq!(grid_2d().max_chunk_volume(), Some(12 * 12));
    }

    #[test]
    fn test_length() {
        assert_eq!(DimensionDesc::new("x", 0, 99, 10, 0).length(), 100);
        assert_eq!(DimensionDesc::new("x", -5, 5, 10, 0).length(), 11);

        let unbounded = DimensionDesc::new("x", 0, MAX_COORDINATE, 10, 0);
        assert!(unbounded.is_unbounded());
        assert_eq!(unbounded.length(), INFINITE_LENGTH);

        let widest = DimensionDesc::new("x", MIN_COORDINATE, MAX_COORDINATE - 1, 10, 0);
        assert_eq!(widest.length(), INFINITE_LENGTH);
    }

    #[test]
    fn test_from_json_defaults() {
        let desc = ArrayDesc::from_json(
            r#"{
                "name": "a",
                "dimensions": [
                    { "name": "x", "start_min": 0, "end_max": 99, "chunk_interval": 10, "chunk_overlap": 1 },
                    { "name": "y", "chunk_interval": 4 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.num_dims(), 2);
        assert_eq!(desc.dimensions()[1].start_min, 0);
        assert_eq!(desc.dimensions()[1].end_max, MAX_COORDINATE);
        assert_eq!(desc.dimensions()[1].chunk_overlap, 0);
        assert_eq!(desc.chunk_intervals(), vec![10, 4]);

        let round_trip = ArrayDesc::from_json(&desc.to_json().unwrap()).unwrap();
        assert_eq!(round_trip, desc);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(ArrayDesc::from_json("{").unwrap_err().is_corruption());
        assert!(
            ArrayDesc::from_json(r#"{ "dimensions": [ { "chunk_interval": 0 } ] }"#)
                .unwrap_err()
                .is_invalid_argument()
        );
    }
}
