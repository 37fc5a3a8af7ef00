/// Coordinate space primitives
///
/// A cell in an N-dimensional array is addressed by one signed 64-bit
/// [`Coordinate`] per dimension. All points compared with one another in a
/// given context share the same dimensionality.
///
/// # Bounds
///
/// ```text
/// MAX_COORDINATE  =  2^62 - 1   (all-ones pattern with the top two bits cleared)
/// MIN_COORDINATE  = -MAX_COORDINATE
/// INFINITE_LENGTH =  MAX_COORDINATE, as a length sentinel only
/// ```
///
/// The two spare bits leave headroom so that `coord + interval` and
/// `coord - overlap` never overflow an `i64` for in-range values.
use std::{cmp::Ordering, fmt};

pub type Coordinate = i64;

pub type Coordinates = Vec<Coordinate>;

pub const MAX_COORDINATE: Coordinate = (u64::MAX >> 2) as Coordinate;

pub const MIN_COORDINATE: Coordinate = -MAX_COORDINATE;

/// Length of an unbounded dimension. Never iterate up to it.
pub const INFINITE_LENGTH: u64 = MAX_COORDINATE as u64;

/// Which end of a coordinate vector is most significant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateOrder {
    /// Dimension 0 is most significant; the last dimension varies fastest.
    #[default]
    RowMajor,
    /// The last dimension is most significant.
    ColumnMajor,
}

/// Compare two points of equal dimensionality
///
/// Components are compared with `Ord`, not by subtraction, so points at
/// `MIN_COORDINATE`/`MAX_COORDINATE` compare correctly.
pub fn coordinates_compare(c1: &[Coordinate], c2: &[Coordinate], order: CoordinateOrder) -> Ordering {
    debug_assert_eq!(c1.len(), c2.len(), "comparing coordinates of different dimensionality");

    match order {
        CoordinateOrder::RowMajor => c1
            .iter()
            .zip(c2)
            .map(|(a, b)| a.cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal),
        CoordinateOrder::ColumnMajor => c1
            .iter()
            .rev()
            .zip(c2.iter().rev())
            .map(|(a, b)| a.cmp(b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal),
    }
}

pub fn row_major_less(c1: &[Coordinate], c2: &[Coordinate]) -> bool {
    coordinates_compare(c1, c2, CoordinateOrder::RowMajor).is_lt()
}

pub fn column_major_less(c1: &[Coordinate], c2: &[Coordinate]) -> bool {
    coordinates_compare(c1, c2, CoordinateOrder::ColumnMajor).is_lt()
}

/// Renders a point as `{1, 2, 3}`
pub struct CoordsDisplay<'a>(pub &'a [Coordinate]);

impl fmt::Display for CoordsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "}}")
    }
}
