use crate::{
    coordinates::{CoordinateOrder, Coordinate, Coordinates, CoordsDisplay, INFINITE_LENGTH, coordinates_compare},
    iterator::ConstIterator,
    util::{Result, Status},
};

/// Lattice walk over a box
///
/// Visits every point `p` with `p[i] = low[i] + k * intervals[i]`,
/// `k >= 0`, `p[i] <= high[i]`, in row-major order: the last dimension
/// moves fastest and carries into the one before it.
///
/// ```text
/// low=(0,0) high=(15,25) intervals=(10,10)
///
///   (0,0) → (0,10) → (0,20) → (10,0) → (10,10) → (10,20) → end
/// ```
///
/// `advance_to_at_least` jumps straight to the first lattice point at or
/// after a target, so a sparse consumer never walks the points in between.
#[derive(Debug, Clone)]
pub struct RegionCoordinatesIterator {
    low: Coordinates,
    high: Coordinates,
    intervals: Vec<u64>,
    current: Coordinates,
    done: bool,
}

impl RegionCoordinatesIterator {
    /// Create an iterator over `[low, high]` stepping by `intervals`.
    ///
    /// A box with `low[i] > high[i]` in some dimension is empty.
    pub fn new(low: &[Coordinate], high: &[Coordinate], intervals: &[u64]) -> Self {
        debug_assert!(!low.is_empty());
        debug_assert_eq!(low.len(), high.len());
        debug_assert_eq!(low.len(), intervals.len());
        debug_assert!(
            intervals.iter().all(|&s| s > 0 && s <= INFINITE_LENGTH),
            "intervals must be in [1, INFINITE_LENGTH]"
        );

        RegionCoordinatesIterator {
            low: low.to_vec(),
            high: high.to_vec(),
            intervals: intervals.to_vec(),
            current: low.to_vec(),
            done: is_empty_box(low, high),
        }
    }

    /// Every cell of the box, not just chunk starts.
    pub fn with_unit_intervals(low: &[Coordinate], high: &[Coordinate]) -> Self {
        Self::new(low, high, &vec![1; low.len()])
    }

    pub fn low(&self) -> &[Coordinate] {
        &self.low
    }

    pub fn high(&self) -> &[Coordinate] {
        &self.high
    }

    pub fn intervals(&self) -> &[u64] {
        &self.intervals
    }

    /// Total number of lattice points, or None if it overflows a u64.
    pub fn num_points(&self) -> Option<u64> {
        if is_empty_box(&self.low, &self.high) {
            return Some(0);
        }
        (0..self.low.len()).try_fold(1u64, |acc, i| {
            let span = (self.high[i] as i128 - self.low[i] as i128) as u128;
            let steps = span / self.intervals[i] as u128 + 1;
            acc.checked_mul(u64::try_from(steps).ok()?)
        })
    }

    /// Move to the first lattice point `>= new_pos` in row-major order.
    ///
    /// Returns false if already at or past `new_pos`. Otherwise returns true,
    /// including when no such point exists and the iterator ends.
    pub fn advance_to_at_least(&mut self, new_pos: &[Coordinate]) -> bool {
        debug_assert_eq!(new_pos.len(), self.current.len());

        if self.done || coordinates_compare(&self.current, new_pos, CoordinateOrder::RowMajor).is_ge() {
            return false;
        }

        // Longest prefix of new_pos made of lattice values.
        let n = self.current.len();
        let prefix = (0..n)
            .take_while(|&i| self.on_lattice(i, new_pos[i] as i128))
            .count();

        if prefix == n {
            self.current.copy_from_slice(new_pos);
            return true;
        }

        // Keep new_pos[..k], bump dimension k, reset the rest to low. The
        // deepest k that can be bumped yields the smallest point.
        for k in (0..=prefix).rev() {
            let floor = if k == prefix {
                new_pos[k] as i128
            } else {
                new_pos[k] as i128 + 1
            };
            if let Some(v) = self.lattice_ceil(k, floor) {
                self.current[..k].copy_from_slice(&new_pos[..k]);
                self.current[k] = v;
                self.current[k + 1..].copy_from_slice(&self.low[k + 1..]);
                return true;
            }
        }

        self.done = true;
        true
    }

    fn on_lattice(&self, i: usize, x: i128) -> bool {
        let low = self.low[i] as i128;
        low <= x && x <= self.high[i] as i128 && (x - low) % self.intervals[i] as i128 == 0
    }

    /// Smallest lattice value `>= x` in dimension `i`.
    fn lattice_ceil(&self, i: usize, x: i128) -> Option<Coordinate> {
        let low = self.low[i] as i128;
        let step = self.intervals[i] as i128;
        let v = if x <= low {
            low
        } else {
            low + (x - low + step - 1) / step * step
        };
        (v <= self.high[i] as i128).then_some(v as Coordinate)
    }
}

fn is_empty_box(low: &[Coordinate], high: &[Coordinate]) -> bool {
    low.iter().zip(high).any(|(l, h)| l > h)
}

impl ConstIterator for RegionCoordinatesIterator {
    fn end(&self) -> bool {
        self.done
    }

    fn next(&mut self) -> bool {
        debug_assert!(!self.done, "next() past the end");

        for i in (0..self.current.len()).rev() {
            self.current[i] = self.current[i].saturating_add(self.intervals[i] as Coordinate);
            if self.current[i] <= self.high[i] {
                return true;
            }
            self.current[i] = self.low[i];
        }

        self.done = true;
        false
    }

    fn position(&self) -> &Coordinates {
        debug_assert!(!self.done, "position() at the end");
        &self.current
    }

    fn set_position(&mut self, pos: &[Coordinate]) -> Result<bool> {
        debug_assert_eq!(pos.len(), self.current.len());

        for i in 0..pos.len() {
            if pos[i] < self.low[i] || pos[i] > self.high[i] {
                return Ok(false);
            }
            if !self.on_lattice(i, pos[i] as i128) {
                return Err(Status::invalid_argument(format!(
                    "{} is not a lattice point of the region",
                    CoordsDisplay(pos)
                )));
            }
        }

        self.current.copy_from_slice(pos);
        self.done = false;
        Ok(true)
    }

    fn reset(&mut self) -> Result<()> {
        self.current.copy_from_slice(&self.low);
        self.done = is_empty_box(&self.low, &self.high);
        Ok(())
    }
}
