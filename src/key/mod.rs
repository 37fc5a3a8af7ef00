use std::borrow::Cow;

use crate::coordinates::{Coordinate, Coordinates};

/// Projects a full cell position onto a grouping key
///
/// Each constraint pins one dimension to a fixed value. A position is a key
/// when it already carries every pinned value; otherwise `to_key` returns a
/// copy with the pinned dimensions overwritten. Used to ignore a synthetic
/// or aggregated dimension when grouping cells.
///
/// # Example
///
/// ```ignore
/// let mut to_key = CoordinatesToKey::new();
/// to_key.add_key_coordinate(0, 0);
/// assert_eq!(&*to_key.to_key(&[5, 3]), &[0, 3]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatesToKey {
    constraints: Vec<(usize, Coordinate)>,
}

impl CoordinatesToKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin dimension `dim` to `value`. A later call for the same dimension
    /// replaces the earlier value.
    pub fn add_key_coordinate(&mut self, dim: usize, value: Coordinate) {
        match self.constraints.iter_mut().find(|(d, _)| *d == dim) {
            Some(c) => c.1 = value,
            None => self.constraints.push((dim, value)),
        }
    }

    pub fn constraints(&self) -> &[(usize, Coordinate)] {
        &self.constraints
    }

    pub fn is_key(&self, coords: &[Coordinate]) -> bool {
        debug_assert!(self.fits(coords));
        self.constraints.iter().all(|&(dim, value)| coords[dim] == value)
    }

    /// `coords` itself if it is already a key, else a patched copy.
    pub fn to_key<'a>(&self, coords: &'a [Coordinate]) -> Cow<'a, [Coordinate]> {
        if self.is_key(coords) {
            return Cow::Borrowed(coords);
        }

        let mut key: Coordinates = coords.to_vec();
        for &(dim, value) in &self.constraints {
            key[dim] = value;
        }
        Cow::Owned(key)
    }

    fn fits(&self, coords: &[Coordinate]) -> bool {
        self.constraints.iter().all(|&(dim, _)| dim < coords.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_key_patches_pinned_dimension() {
        let mut to_key = CoordinatesToKey::new();
        to_key.add_key_coordinate(0, 0);

        let coords = [5, 3];
        assert!(!to_key.is_key(&coords));
        let key = to_key.to_key(&coords);
        assert!(matches!(key, Cow::Owned(_)));
        assert_eq!(&*key, &[0, 3]);
    }

    #[test]
    fn test_to_key_borrows_existing_key() {
        let mut to_key = CoordinatesToKey::new();
        to_key.add_key_coordinate(0, 0);

        let coords = [0, 3];
        let key = to_key.to_key(&coords);
        match key {
            Cow::Borrowed(k) => assert!(std::ptr::eq(k, &coords[..])),
            Cow::Owned(_) => panic!("expected the input back"),
        }
    }

    #[test]
    fn test_multiple_constraints() {
        let mut to_key = CoordinatesToKey::new();
        to_key.add_key_coordinate(2, 7);
        to_key.add_key_coordinate(0, -1);
        to_key.add_key_coordinate(2, 9);
        assert_eq!(to_key.constraints(), &[(2, 9), (0, -1)]);

        let key = to_key.to_key(&[4, 4, 4, 4]);
        assert_eq!(&*key, &[-1, 4, 9, 4]);
        assert!(to_key.is_key(&key));
        assert_eq!(to_key.to_key(&key), key);
    }

    #[test]
    fn test_no_constraints() {
        let to_key = CoordinatesToKey::new();
        assert!(to_key.is_key(&[1, 2]));
        assert!(matches!(to_key.to_key(&[1, 2]), Cow::Borrowed(_)));
    }
}
