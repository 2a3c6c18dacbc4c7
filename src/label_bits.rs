//! Coordinate-to-label map storing labels as a 32-bit mask.

use alloc::vec::Vec;

use crate::coord::Coord;
use crate::coord::CoordContract;
use crate::table::Error;
use crate::table::Table;

/// Maps coordinates to a small set of labels packed into a `u32` bitmask.
///
/// Labels must be in `0..MAX_LABELS`. For unbounded label values use
/// [`SetLabelMap`](crate::label_sets::SetLabelMap), which stores each
/// coordinate's labels in a nested table instead of a mask.
///
/// # Examples
///
/// ```rust
/// use probe_set::BitLabelMap;
/// use probe_set::Coord;
///
/// let mut map = BitLabelMap::new(2, 16).unwrap();
/// let key = Coord::from([3, 4]);
///
/// assert_eq!(map.insert(&key, 5), Ok(true));
/// assert_eq!(map.insert(&key, 5), Ok(false));
/// assert_eq!(map.insert(&key, 9), Ok(true));
/// assert_eq!(map.labels(&key), Some(vec![5, 9]));
/// ```
pub struct BitLabelMap {
    table: Table<CoordContract, u32>,
}

impl BitLabelMap {
    /// Labels are restricted to `0..32` so they fit the mask.
    pub const MAX_LABELS: u32 = 32;

    /// Creates a map for `dims`-dimensional coordinates with room for
    /// `capacity` keys before growing.
    pub fn new(dims: usize, capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            table: Table::with_capacity(CoordContract::new(dims), capacity)?,
        })
    }

    /// Tags `key` with `label`.
    ///
    /// Returns `Ok(true)` if the label was not already present on the key.
    ///
    /// # Panics
    ///
    /// Panics if `label >= MAX_LABELS`.
    pub fn insert(&mut self, key: &Coord, label: u32) -> Result<bool, Error> {
        assert!(
            label < Self::MAX_LABELS,
            "label {label} out of range 0..{}",
            Self::MAX_LABELS
        );
        let mask = 1u32 << label;
        match self.table.get_mut(key) {
            Some(bits) => {
                if *bits & mask != 0 {
                    return Ok(false);
                }
                *bits |= mask;
                Ok(true)
            }
            None => self.table.add_with_data(key, mask),
        }
    }

    /// The labels tagged on `key`, ascending. `None` if the key is absent.
    pub fn labels(&self, key: &Coord) -> Option<Vec<u32>> {
        let bits = *self.table.get(key)?;
        Some((0..Self::MAX_LABELS).filter(|l| bits & (1 << l) != 0).collect())
    }

    /// Returns `true` if `key` has been tagged with any label.
    pub fn contains(&self, key: &Coord) -> bool {
        self.table.contains(key)
    }

    /// Owned copies of every tagged coordinate, in unspecified order.
    pub fn keys(&self) -> Vec<Coord> {
        self.table.to_keys()
    }

    /// The number of tagged coordinates.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if no coordinate has been tagged.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_new_labels_only() {
        let mut map = BitLabelMap::new(2, 8).unwrap();
        let key = Coord::from([1, 2]);

        assert_eq!(map.insert(&key, 0), Ok(true));
        assert_eq!(map.insert(&key, 0), Ok(false));
        assert_eq!(map.insert(&key, 31), Ok(true));
        assert_eq!(map.len(), 1);
        assert_eq!(map.labels(&key), Some(alloc::vec![0, 31]));
    }

    #[test]
    fn missing_key_has_no_labels() {
        let map = BitLabelMap::new(2, 8).unwrap();
        assert_eq!(map.labels(&Coord::from([9, 9])), None);
        assert!(!map.contains(&Coord::from([9, 9])));
        assert!(map.is_empty());
    }

    #[test]
    fn keys_snapshot() {
        let mut map = BitLabelMap::new(3, 8).unwrap();
        map.insert(&Coord::from([1, 2, 3]), 4).unwrap();
        map.insert(&Coord::from([4, 5, 6]), 7).unwrap();

        let mut keys = map.keys();
        keys.sort_by(|a, b| a.as_slice().cmp(b.as_slice()));
        assert_eq!(keys, alloc::vec![
            Coord::from([1, 2, 3]),
            Coord::from([4, 5, 6])
        ]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn label_over_31_panics() {
        let mut map = BitLabelMap::new(2, 8).unwrap();
        let _ = map.insert(&Coord::from([0, 0]), 32);
    }
}
