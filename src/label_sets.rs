//! Coordinate-to-label map storing labels in a nested table.
//!
//! Where [`BitLabelMap`](crate::label_bits::BitLabelMap) caps labels at 32,
//! this variant keeps each coordinate's labels in a [`Table`] of its own —
//! the payload of the outer table is another instance of the same engine.

use alloc::vec::Vec;

use crate::contract::KeyContract;
use crate::coord::Coord;
use crate::coord::CoordContract;
use crate::coord::fnv1a;
use crate::table::Error;
use crate::table::Table;

/// Starting capacity for each per-coordinate label table.
const LABEL_SET_CAPACITY: usize = 4;

/// [`KeyContract`] for `u32` labels: FNV-1a over the label's little-endian
/// bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelContract;

impl KeyContract for LabelContract {
    type Key = u32;

    fn hash(&self, key: &u32) -> u64 {
        fnv1a(key.to_le_bytes())
    }

    fn equals(&self, a: &u32, b: &u32) -> bool {
        a == b
    }

    fn copy(&self, key: &u32) -> u32 {
        *key
    }
}

/// Maps coordinates to an unbounded set of `u32` labels.
///
/// # Examples
///
/// ```rust
/// use probe_set::Coord;
/// use probe_set::SetLabelMap;
///
/// let mut map = SetLabelMap::new(2, 16).unwrap();
/// let key = Coord::from([3, 4]);
///
/// assert_eq!(map.insert(&key, 1000), Ok(true));
/// assert_eq!(map.insert(&key, 1000), Ok(false));
/// assert_eq!(map.insert(&key, 7), Ok(true));
///
/// let mut labels = map.labels(&key).unwrap();
/// labels.sort_unstable();
/// assert_eq!(labels, vec![7, 1000]);
/// ```
pub struct SetLabelMap {
    table: Table<CoordContract, Table<LabelContract>>,
}

impl SetLabelMap {
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
    pub fn insert(&mut self, key: &Coord, label: u32) -> Result<bool, Error> {
        match self.table.get_mut(key) {
            Some(labels) => labels.add(&label),
            None => {
                let mut labels = Table::with_capacity(LabelContract, LABEL_SET_CAPACITY)?;
                labels.add(&label)?;
                self.table.add_with_data(key, labels)
            }
        }
    }

    /// The labels tagged on `key`, in unspecified order. `None` if the key
    /// is absent.
    pub fn labels(&self, key: &Coord) -> Option<Vec<u32>> {
        Some(self.table.get(key)?.to_keys())
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
