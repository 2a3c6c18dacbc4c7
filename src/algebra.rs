//! Set algebra over [`Table`]s.
//!
//! Binary operations write into a caller-supplied result table, which must be
//! empty — a non-empty result reports [`Error::ResultNotEmpty`] rather than
//! being silently merged into. Keys carried into the result are fresh copies
//! minted through the result's contract; payloads are cloned from the source
//! table (for plain sets the payload is `()` and this is free).
//!
//! All operations run in expected time linear in the larger input.

use crate::contract::KeyContract;
use crate::table::Error;
use crate::table::Table;

/// Relative ordering of two sets, as reported by [`compare`].
///
/// The discriminants mirror the engine's wire-level status codes
/// (`-1`, `0`, `1`, `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum SetOrdering {
    /// The right set has more keys.
    RightGreater = -1,
    /// Both sets hold exactly the same keys.
    Equal = 0,
    /// The left set has more keys.
    LeftGreater = 1,
    /// Same size, different keys.
    Unequal = 2,
}

fn require_empty<C: KeyContract, P>(res: &Table<C, P>) -> Result<(), Error> {
    if res.is_empty() {
        Ok(())
    } else {
        Err(Error::ResultNotEmpty)
    }
}

/// Fills `res` with `a ∪ b`.
///
/// Keys present in both inputs keep the payload from `a`; the duplicate
/// insert from `b` is rejected as already-present and ignored.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "foldhash")]
/// # {
/// use probe_set::HasherContract;
/// use probe_set::Table;
/// use probe_set::algebra;
///
/// let contract: HasherContract<u32> = HasherContract::new();
/// let mut a: Table<_> = Table::with_capacity(&contract, 8).unwrap();
/// let mut b: Table<_> = Table::with_capacity(&contract, 8).unwrap();
/// let mut res: Table<_> = Table::with_capacity(&contract, 8).unwrap();
/// a.add(&1).unwrap();
/// a.add(&2).unwrap();
/// b.add(&2).unwrap();
/// b.add(&3).unwrap();
///
/// algebra::union(&mut res, &a, &b).unwrap();
/// assert_eq!(res.len(), 3);
/// # }
/// ```
pub fn union<C, P>(res: &mut Table<C, P>, a: &Table<C, P>, b: &Table<C, P>) -> Result<(), Error>
where
    C: KeyContract,
    P: Clone,
{
    require_empty(res)?;
    for (key, payload) in a.iter() {
        res.add_with_data(key, payload.clone())?;
    }
    for (key, payload) in b.iter() {
        res.add_with_data(key, payload.clone())?;
    }
    Ok(())
}

/// Fills `res` with `a ∩ b`. Payloads come from `a`.
pub fn intersection<C, P>(
    res: &mut Table<C, P>,
    a: &Table<C, P>,
    b: &Table<C, P>,
) -> Result<(), Error>
where
    C: KeyContract,
    P: Clone,
{
    require_empty(res)?;
    for (key, payload) in a.iter() {
        if b.contains(key) {
            res.add_with_data(key, payload.clone())?;
        }
    }
    Ok(())
}

/// Fills `res` with `a ∖ b`: the keys of `a` that are not in `b`.
pub fn difference<C, P>(
    res: &mut Table<C, P>,
    a: &Table<C, P>,
    b: &Table<C, P>,
) -> Result<(), Error>
where
    C: KeyContract,
    P: Clone,
{
    require_empty(res)?;
    for (key, payload) in a.iter() {
        if !b.contains(key) {
            res.add_with_data(key, payload.clone())?;
        }
    }
    Ok(())
}

/// Fills `res` with `a △ b`: keys in exactly one of the inputs.
///
/// Computed as `(a ∖ b) ∪ (b ∖ a)` in two passes, without materializing the
/// intermediate differences.
pub fn symmetric_difference<C, P>(
    res: &mut Table<C, P>,
    a: &Table<C, P>,
    b: &Table<C, P>,
) -> Result<(), Error>
where
    C: KeyContract,
    P: Clone,
{
    require_empty(res)?;
    for (key, payload) in a.iter() {
        if !b.contains(key) {
            res.add_with_data(key, payload.clone())?;
        }
    }
    for (key, payload) in b.iter() {
        if !a.contains(key) {
            res.add_with_data(key, payload.clone())?;
        }
    }
    Ok(())
}

/// Returns `true` if every key of `test` is in `against` (`test ⊆ against`).
pub fn is_subset<C, P>(test: &Table<C, P>, against: &Table<C, P>) -> bool
where
    C: KeyContract,
{
    test.keys().all(|key| against.contains(key))
}

/// Returns `true` if `test ⊂ against`: a subset that is not equal.
pub fn is_subset_strict<C, P>(test: &Table<C, P>, against: &Table<C, P>) -> bool
where
    C: KeyContract,
{
    test.len() < against.len() && is_subset(test, against)
}

/// Returns `true` if `test ⊇ against`.
pub fn is_superset<C, P>(test: &Table<C, P>, against: &Table<C, P>) -> bool
where
    C: KeyContract,
{
    is_subset(against, test)
}

/// Returns `true` if `test ⊃ against`: a superset that is not equal.
pub fn is_superset_strict<C, P>(test: &Table<C, P>, against: &Table<C, P>) -> bool
where
    C: KeyContract,
{
    is_subset_strict(against, test)
}

/// Compares two sets, first by size, then by membership.
///
/// Sets of unequal size report which side is larger; equal-size sets are
/// [`SetOrdering::Equal`] only if every key of `left` is in `right`.
pub fn compare<C, P>(left: &Table<C, P>, right: &Table<C, P>) -> SetOrdering
where
    C: KeyContract,
{
    if left.len() < right.len() {
        return SetOrdering::RightGreater;
    }
    if right.len() < left.len() {
        return SetOrdering::LeftGreater;
    }
    if is_subset(left, right) {
        SetOrdering::Equal
    } else {
        SetOrdering::Unequal
    }
}
