#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod algebra;

/// The [`KeyContract`] extension surface and the hasher-backed adapter.
pub mod contract;

pub mod coord;

pub mod label_bits;

pub mod label_sets;

/// The open-addressing storage engine.
pub mod table;

pub use algebra::SetOrdering;
pub use contract::HasherContract;
pub use contract::KeyContract;
pub use coord::Coord;
pub use coord::CoordContract;
pub use label_bits::BitLabelMap;
pub use label_sets::SetLabelMap;
pub use table::Error;
pub use table::Table;
