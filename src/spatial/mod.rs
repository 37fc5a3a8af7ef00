/// Axis-aligned hyper-rectangles and dominance between points
///
/// Point A dominates point B if A is greater than or equal to B in every
/// dimension. Two points of the same dimensionality are in exactly one of
/// four relationships:
///
/// ```text
/// Equals                 a[i] == b[i] for all i
/// StrictlyDominates      a[i] >= b[i] for all i, not all equal
/// IsStrictlyDominatedBy  a[i] <= b[i] for all i, not all equal
/// HasNoDominanceWith     neither of the above
/// ```
///
/// A range is valid exactly when its low point is dominated by its high
/// point.
use serde::{Deserialize, Serialize};

use crate::{
    coordinates::{Coordinate, Coordinates},
    util::{Result, Status},
};

/// Hint value meaning "no match". The unsigned wraparound of `-1`.
pub const NOT_FOUND: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominanceRelationship {
    Equals,
    StrictlyDominates,
    IsStrictlyDominatedBy,
    HasNoDominanceWith,
}

impl DominanceRelationship {
    /// The relationship seen from the other operand.
    pub fn inverse(self) -> Self {
        match self {
            DominanceRelationship::StrictlyDominates => DominanceRelationship::IsStrictlyDominatedBy,
            DominanceRelationship::IsStrictlyDominatedBy => DominanceRelationship::StrictlyDominates,
            other => other,
        }
    }
}

pub fn calculate_dominance(left: &[Coordinate], right: &[Coordinate]) -> DominanceRelationship {
    debug_assert_eq!(left.len(), right.len());
    debug_assert!(!left.is_empty());

    let mut all_le = true;
    let mut all_ge = true;
    for (l, r) in left.iter().zip(right) {
        if l > r {
            all_le = false;
        } else if l < r {
            all_ge = false;
        }
        if !all_le && !all_ge {
            return DominanceRelationship::HasNoDominanceWith;
        }
    }

    match (all_le, all_ge) {
        (true, true) => DominanceRelationship::Equals,
        (true, false) => DominanceRelationship::IsStrictlyDominatedBy,
        (false, true) => DominanceRelationship::StrictlyDominates,
        (false, false) => DominanceRelationship::HasNoDominanceWith,
    }
}

/// Whether `left` is dominated by `right`.
pub fn is_dominated_by(left: &[Coordinate], right: &[Coordinate]) -> bool {
    matches!(
        calculate_dominance(left, right),
        DominanceRelationship::Equals | DominanceRelationship::IsStrictlyDominatedBy
    )
}

/// Closed box `{ c : low[i] <= c[i] <= high[i] }`
///
/// A range whose `low` exceeds `high` in any dimension is invalid and stands
/// for "no region". Construction does not reject it; consumers skip it.
/// Corners of different dimensionality are rejected when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeDef")]
pub struct SpatialRange {
    pub low: Coordinates,
    pub high: Coordinates,
}

/// Unchecked wire form of [`SpatialRange`]
#[derive(Deserialize)]
struct RangeDef {
    low: Coordinates,
    high: Coordinates,
}

impl TryFrom<RangeDef> for SpatialRange {
    type Error = Status;

    fn try_from(def: RangeDef) -> Result<Self> {
        if def.low.is_empty() || def.low.len() != def.high.len() {
            return Err(Status::invalid_argument(format!(
                "range corners have {} and {} dimensions",
                def.low.len(),
                def.high.len()
            )));
        }
        Ok(SpatialRange::new(def.low, def.high))
    }
}

impl SpatialRange {
    pub fn new(low: Coordinates, high: Coordinates) -> Self {
        debug_assert_eq!(low.len(), high.len());
        SpatialRange { low, high }
    }

    pub fn num_dims(&self) -> usize {
        self.low.len()
    }

    pub fn valid(&self) -> bool {
        is_dominated_by(&self.low, &self.high)
    }

    pub fn intersects(&self, other: &SpatialRange) -> bool {
        debug_assert_eq!(self.num_dims(), other.num_dims());
        (0..self.num_dims())
            .all(|i| self.low[i] <= other.high[i] && other.low[i] <= self.high[i])
    }

    pub fn contains_point(&self, point: &[Coordinate]) -> bool {
        debug_assert_eq!(self.num_dims(), point.len());
        (0..self.num_dims()).all(|i| self.low[i] <= point[i] && point[i] <= self.high[i])
    }

    pub fn contains_range(&self, other: &SpatialRange) -> bool {
        debug_assert_eq!(self.num_dims(), other.num_dims());
        (0..self.num_dims()).all(|i| self.low[i] <= other.low[i] && other.high[i] <= self.high[i])
    }
}

/// An ordered collection of ranges sharing one dimensionality
///
/// Order only matters to the `find_one_that_*` hint: callers that probe
/// nearby points repeatedly pass the index of the last hit back in, and a
/// still-matching hint short-circuits the linear scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangesDef")]
pub struct SpatialRanges {
    num_dims: usize,
    ranges: Vec<SpatialRange>,
}

/// Unchecked wire form of [`SpatialRanges`]
#[derive(Deserialize)]
struct RangesDef {
    num_dims: usize,
    #[serde(default)]
    ranges: Vec<RangeDef>,
}

impl TryFrom<RangesDef> for SpatialRanges {
    type Error = Status;

    fn try_from(def: RangesDef) -> Result<Self> {
        let ranges = SpatialRanges {
            num_dims: def.num_dims,
            ranges: def
                .ranges
                .into_iter()
                .map(SpatialRange::try_from)
                .collect::<Result<_>>()?,
        };
        ranges.validate()?;
        Ok(ranges)
    }
}

impl SpatialRanges {
    pub fn new(num_dims: usize) -> Self {
        SpatialRanges {
            num_dims,
            ranges: Vec::new(),
        }
    }

    /// Parse and validate a JSON range set.
    ///
    /// Malformed JSON is `Corruption`; well-formed JSON with mismatched
    /// dimensionality is `InvalidArgument`.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: RangesDef = serde_json::from_str(json)?;
        Self::try_from(def)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check that every range has `num_dims` dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.num_dims == 0 {
            return Err(Status::invalid_argument("range set has no dimensions"));
        }
        for (i, r) in self.ranges.iter().enumerate() {
            if r.low.len() != self.num_dims || r.high.len() != self.num_dims {
                return Err(Status::invalid_argument(format!(
                    "range {i} has {}/{} dimensions, expected {}",
                    r.low.len(),
                    r.high.len(),
                    self.num_dims
                )));
            }
        }
        Ok(())
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    pub fn add_one(&mut self, range: SpatialRange) -> &mut SpatialRange {
        debug_assert_eq!(range.num_dims(), self.num_dims);
        self.ranges.push(range);
        let last = self.ranges.len() - 1;
        &mut self.ranges[last]
    }

    pub fn ranges(&self) -> &[SpatialRange] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpatialRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether some stored range intersects `query`.
    ///
    /// `hint` is read as the index to try first and is overwritten with the
    /// index of the match, or [`NOT_FOUND`].
    pub fn find_one_that_intersects(&self, query: &SpatialRange, hint: &mut usize) -> bool {
        self.find_with_hint(hint, |r| r.valid() && r.intersects(query))
    }

    /// Whether some stored range contains `point`. See
    /// [`find_one_that_intersects`](Self::find_one_that_intersects) for `hint`.
    pub fn find_one_that_contains_point(&self, point: &[Coordinate], hint: &mut usize) -> bool {
        self.find_with_hint(hint, |r| r.contains_point(point))
    }

    /// Whether some stored range fully contains `query`.
    pub fn find_one_that_contains_range(&self, query: &SpatialRange, hint: &mut usize) -> bool {
        self.find_with_hint(hint, |r| r.valid() && r.contains_range(query))
    }

    fn find_with_hint(&self, hint: &mut usize, pred: impl Fn(&SpatialRange) -> bool) -> bool {
        if let Some(r) = self.ranges.get(*hint)
            && pred(r)
        {
            return true;
        }

        match self.ranges.iter().position(pred) {
            Some(idx) => {
                *hint = idx;
                true
            },
            None => {
                *hint = NOT_FOUND;
                false
            },
        }
    }
}

impl<'a> IntoIterator for &'a SpatialRanges {
    type Item = &'a SpatialRange;
    type IntoIter = std::slice::Iter<'a, SpatialRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(low: &[i64], high: &[i64]) -> SpatialRange {
        SpatialRange::new(low.to_vec(), high.to_vec())
    }

    #[test]
    fn test_dominance() {
        use DominanceRelationship::*;

        assert_eq!(calculate_dominance(&[1, 2], &[1, 2]), Equals);
        assert_eq!(calculate_dominance(&[1, 2], &[1, 3]), IsStrictlyDominatedBy);
        assert_eq!(calculate_dominance(&[2, 3], &[1, 3]), StrictlyDominates);
        assert_eq!(calculate_dominance(&[0, 5], &[5, 0]), HasNoDominanceWith);

        assert!(is_dominated_by(&[1, 2], &[5, 5]));
        assert!(is_dominated_by(&[1, 2], &[1, 2]));
        assert!(!is_dominated_by(&[5, 5], &[1, 2]));
    }

    #[test]
    fn test_dominance_inverse() {
        let pairs = [([1, 2], [3, 4]), ([3, 4], [1, 2]), ([1, 4], [3, 2]), ([7, 7], [7, 7])];
        for (a, b) in pairs {
            assert_eq!(calculate_dominance(&a, &b).inverse(), calculate_dominance(&b, &a));
        }
    }

    #[test]
    fn test_range_validity() {
        assert!(range(&[0, 0], &[0, 0]).valid());
        assert!(range(&[0, 0], &[5, 9]).valid());
        assert!(!range(&[0, 10], &[5, 9]).valid());
    }

    #[test]
    fn test_range_intersects() {
        let a = range(&[0, 0], &[5, 5]);
        assert!(a.intersects(&range(&[5, 5], &[9, 9])));
        assert!(a.intersects(&range(&[2, -3], &[3, 100])));
        assert!(!a.intersects(&range(&[6, 0], &[9, 5])));
        assert!(!a.intersects(&range(&[0, 6], &[5, 9])));

        // An invalid range intersects nothing, not even itself.
        let bad = range(&[3, 3], &[2, 4]);
        assert!(!bad.intersects(&bad));
    }

    #[test]
    fn test_range_contains() {
        let a = range(&[0, 0], &[5, 5]);
        assert!(a.contains_point(&[0, 5]));
        assert!(!a.contains_point(&[6, 5]));
        assert!(a.contains_range(&range(&[1, 1], &[5, 5])));
        assert!(!a.contains_range(&range(&[1, 1], &[5, 6])));
    }

    #[test]
    fn test_find_with_hint() {
        let mut ranges = SpatialRanges::new(2);
        ranges.add_one(range(&[0, 0], &[5, 5]));
        ranges.add_one(range(&[10, 10], &[15, 15]));
        ranges.add_one(range(&[20, 20], &[25, 25]));

        let mut hint = NOT_FOUND;
        assert!(ranges.find_one_that_contains_point(&[12, 13], &mut hint));
        assert_eq!(hint, 1);

        // Hint still matching is kept.
        assert!(ranges.find_one_that_contains_point(&[14, 10], &mut hint));
        assert_eq!(hint, 1);

        // Stale hint falls back to the scan.
        assert!(ranges.find_one_that_contains_point(&[21, 22], &mut hint));
        assert_eq!(hint, 2);

        assert!(!ranges.find_one_that_contains_point(&[8, 8], &mut hint));
        assert_eq!(hint, NOT_FOUND);

        assert!(ranges.find_one_that_intersects(&range(&[4, 4], &[11, 11]), &mut hint));
        assert_eq!(hint, 0);

        assert!(ranges.find_one_that_contains_range(&range(&[21, 21], &[22, 22]), &mut hint));
        assert_eq!(hint, 2);
        assert!(!ranges.find_one_that_contains_range(&range(&[4, 4], &[11, 11]), &mut hint));
        assert_eq!(hint, NOT_FOUND);
    }

    #[test]
    fn test_find_skips_invalid_ranges() {
        let mut ranges = SpatialRanges::new(1);
        ranges.add_one(range(&[5], &[1]));
        ranges.add_one(range(&[0], &[9]));

        let mut hint = 0;
        assert!(ranges.find_one_that_contains_point(&[3], &mut hint));
        assert_eq!(hint, 1);
        assert!(ranges.find_one_that_intersects(&range(&[2], &[2]), &mut hint));
        assert_eq!(hint, 1);
    }

    #[test]
    fn test_ranges_json() {
        let mut ranges = SpatialRanges::new(2);
        ranges.add_one(range(&[0, 0], &[5, 5]));
        let json = serde_json::to_string(&ranges).unwrap();
        let parsed: SpatialRanges = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ranges);
        assert_eq!(parsed.len(), 1);
        assert_eq!(SpatialRanges::from_json(&ranges.to_json().unwrap()).unwrap(), ranges);
    }

    #[test]
    fn test_ranges_json_rejects_mismatched_dims() {
        // Corners disagree with each other.
        let short_high = r#"{"num_dims":2,"ranges":[{"low":[0,0],"high":[5]}]}"#;
        assert!(SpatialRanges::from_json(short_high).unwrap_err().is_invalid_argument());
        assert!(serde_json::from_str::<SpatialRanges>(short_high).is_err());

        // Corners agree but disagree with the set.
        let wrong_dims = r#"{"num_dims":2,"ranges":[{"low":[0],"high":[5]}]}"#;
        assert!(SpatialRanges::from_json(wrong_dims).unwrap_err().is_invalid_argument());
        assert!(serde_json::from_str::<SpatialRanges>(wrong_dims).is_err());

        let no_dims = r#"{"num_dims":0,"ranges":[]}"#;
        assert!(SpatialRanges::from_json(no_dims).unwrap_err().is_invalid_argument());

        assert!(serde_json::from_str::<SpatialRange>(r#"{"low":[],"high":[]}"#).is_err());
        assert!(SpatialRanges::from_json("[").unwrap_err().is_corruption());

        // A well-formed set still answers queries.
        let ok = SpatialRanges::from_json(r#"{"num_dims":2,"ranges":[{"low":[0,0],"high":[5,5]}]}"#).unwrap();
        assert!(ok.find_one_that_contains_point(&[1, 1], &mut 0));
    }
}
