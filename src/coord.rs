//! Multi-dimensional coordinate keys and their [`KeyContract`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::contract::KeyContract;

pub(crate) const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
pub(crate) const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over a byte stream.
pub(crate) fn fnv1a(bytes: impl IntoIterator<Item = u8>) -> u64 {
    let mut h = FNV_OFFSET;
    for b in bytes {
        h = (h ^ u64::from(b)).wrapping_mul(FNV_PRIME);
    }
    h
}

/// A point in a multi-dimensional grid, used as a map key.
///
/// A coordinate is a heap-allocated vector of `u16` axis values. How many of
/// them participate in hashing and equality is decided by the
/// [`CoordContract`] of the table the coordinate is used with, not by the
/// coordinate itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coord {
    index: Box<[u16]>,
}

impl Coord {
    /// Creates a coordinate from axis values.
    pub fn new(index: &[u16]) -> Self {
        Self {
            index: index.into(),
        }
    }

    /// The axis values of this coordinate.
    pub fn as_slice(&self) -> &[u16] {
        &self.index
    }

    /// The number of axes this coordinate carries.
    pub fn dims(&self) -> usize {
        self.index.len()
    }
}

impl From<[u16; 2]> for Coord {
    fn from(index: [u16; 2]) -> Self {
        Self::new(&index)
    }
}

impl From<[u16; 3]> for Coord {
    fn from(index: [u16; 3]) -> Self {
        Self::new(&index)
    }
}

impl From<Vec<u16>> for Coord {
    fn from(index: Vec<u16>) -> Self {
        Self {
            index: index.into_boxed_slice(),
        }
    }
}

/// [`KeyContract`] for [`Coord`] keys of a fixed dimensionality.
///
/// The dimension count is the context threaded through every hash and
/// equality check: only the first `dims` axis values of a coordinate
/// participate. Hashing is 64-bit FNV-1a over the little-endian bytes of
/// those values.
#[derive(Debug, Clone, Copy)]
pub struct CoordContract {
    dims: usize,
}

impl CoordContract {
    /// Creates a contract comparing the first `dims` axes of every key.
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    /// The dimensionality this contract operates at.
    pub fn dims(&self) -> usize {
        self.dims
    }
}

impl KeyContract for CoordContract {
    type Key = Coord;

    fn hash(&self, key: &Coord) -> u64 {
        fnv1a(
            key.index[..self.dims]
                .iter()
                .flat_map(|axis| axis.to_le_bytes()),
        )
    }

    fn equals(&self, a: &Coord, b: &Coord) -> bool {
        a.index[..self.dims] == b.index[..self.dims]
    }

    fn copy(&self, key: &Coord) -> Coord {
        key.clone()
    }
}
