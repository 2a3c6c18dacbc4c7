use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;

use crate::contract::KeyContract;

/// Bound on `occupied / slots` before the slot array doubles.
///
/// The threshold is 3/4: a lower value (the 0.25 used by one ancestor of this
/// code) buys shorter probe chains at a steep memory cost, and 3/4 keeps
/// expected probe lengths short enough that the difference is not measurable
/// in the benches.
const LOAD_NUM: usize = 3;
const LOAD_DEN: usize = 4;

/// Smallest slot array we will allocate. Keeps the modulus nonzero for empty
/// tables created with a capacity of 0.
const MIN_SLOTS: usize = 8;

/// Errors reported by table and set-algebra operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The backing slot array could not be allocated or grown. The table is
    /// left in its prior valid state.
    Allocation,
    /// A probe wrapped the entire table without finding the key or an empty
    /// slot. This cannot happen while the load-factor invariant holds and
    /// indicates internal corruption.
    TableFull,
    /// A set-algebra operation was handed a non-empty result table.
    ResultNotEmpty,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Allocation => f.write_str("slot array allocation failed"),
            Error::TableFull => f.write_str("probe wrapped a full table"),
            Error::ResultNotEmpty => f.write_str("result table is not empty"),
        }
    }
}

impl core::error::Error for Error {}

enum Slot<K, P> {
    Empty,
    Occupied { key: K, hash: u64, payload: P },
}

impl<K, P> Slot<K, P> {
    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }
}

/// Outcome of a linear probe.
enum Probe {
    /// The key is stored at this index.
    Found(usize),
    /// The key is absent; this is the first empty slot on its probe path.
    Vacant(usize),
    /// The scan wrapped back to the home index. Defensive; see
    /// [`Error::TableFull`].
    Full,
}

/// A set/map built on open addressing with linear probing.
///
/// `Table<C, P>` stores owned copies of keys described by a [`KeyContract`]
/// `C`, each with a payload of type `P` (`()` for plain sets). Collisions are
/// resolved by scanning forward from the key's home slot; removal relocates
/// displaced survivors in place rather than leaving tombstones, so lookups
/// stay correct and probe chains never accrete dead entries.
///
/// The table owns its key copies — they are minted via
/// [`KeyContract::copy`] on insertion and released via
/// [`KeyContract::dispose`] on removal, [`clear`](Table::clear), or drop.
/// Payloads are the caller's: they are stored as given and handed back by
/// [`remove`](Table::remove); the engine never disposes one itself.
///
/// Iteration order is the internal slot order. It is unspecified and changes
/// across inserts, removals, and growth.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "foldhash")]
/// # {
/// use probe_set::HasherContract;
/// use probe_set::Table;
///
/// let mut table: Table<HasherContract<u32>, &str> =
///     Table::with_capacity(HasherContract::new(), 16).unwrap();
///
/// assert_eq!(table.add_with_data(&1, "one"), Ok(true));
/// assert_eq!(table.add_with_data(&1, "uno"), Ok(false)); // already present
/// assert_eq!(table.get(&1), Some(&"one")); // first payload kept
///
/// assert_eq!(table.remove(&1), Some("one"));
/// assert!(!table.contains(&1));
/// # }
/// ```
pub struct Table<C: KeyContract, P = ()> {
    slots: Vec<Slot<C::Key, P>>,
    occupied: usize,
    contract: C,
}

impl<C: KeyContract, P> Table<C, P> {
    /// Creates a table able to hold `capacity` keys before growing.
    ///
    /// The slot array is sized at `capacity` divided by the load factor, so
    /// inserting up to `capacity` keys triggers no reallocation. Fails with
    /// [`Error::Allocation`] if the slot array cannot be allocated.
    pub fn with_capacity(contract: C, capacity: usize) -> Result<Self, Error> {
        let n_slots = (capacity.saturating_mul(LOAD_DEN) / LOAD_NUM)
            .saturating_add(1)
            .max(MIN_SLOTS);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(n_slots)
            .map_err(|_| Error::Allocation)?;
        slots.resize_with(n_slots, || Slot::Empty);
        Ok(Self {
            slots,
            occupied: 0,
            contract,
        })
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of keys the table can hold before growing.
    pub fn capacity(&self) -> usize {
        self.slots.len() * LOAD_NUM / LOAD_DEN
    }

    /// Returns the contract backing this table.
    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Removes every key, releasing each stored copy through the contract.
    ///
    /// The slot array keeps its current size; capacity never shrinks.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Occupied { key, .. } = mem::replace(slot, Slot::Empty) {
                self.contract.dispose(key);
            }
        }
        self.occupied = 0;
    }

    /// Returns `true` if `key` is in the table.
    pub fn contains(&self, key: &C::Key) -> bool {
        let hash = self.contract.hash(key);
        matches!(self.probe(key, hash), Probe::Found(_))
    }

    /// Returns a reference to the payload stored with `key`.
    pub fn get(&self, key: &C::Key) -> Option<&P> {
        let hash = self.contract.hash(key);
        match self.probe(key, hash) {
            Probe::Found(i) => match &self.slots[i] {
                Slot::Occupied { payload, .. } => Some(payload),
                Slot::Empty => None,
            },
            _ => None,
        }
    }

    /// Returns a mutable reference to the payload stored with `key`.
    pub fn get_mut(&mut self, key: &C::Key) -> Option<&mut P> {
        let hash = self.contract.hash(key);
        match self.probe(key, hash) {
            Probe::Found(i) => match &mut self.slots[i] {
                Slot::Occupied { payload, .. } => Some(payload),
                Slot::Empty => None,
            },
            _ => None,
        }
    }

    /// Adds `key` with the given payload.
    ///
    /// Returns `Ok(true)` if the key was newly inserted and `Ok(false)` if it
    /// was already present, in which case neither the stored key nor its
    /// payload is touched and `payload` is dropped. Callers wanting upsert
    /// semantics remove the key first.
    ///
    /// May grow the table before inserting; growth failure reports
    /// [`Error::Allocation`] and leaves the table unchanged.
    pub fn add_with_data(&mut self, key: &C::Key, payload: P) -> Result<bool, Error> {
        let hash = self.contract.hash(key);
        if let Probe::Found(_) = self.probe(key, hash) {
            return Ok(false);
        }

        if (self.occupied + 1) * LOAD_DEN > self.slots.len() * LOAD_NUM {
            self.grow()?;
        }

        // Indices may have shifted during growth, so probe again.
        match self.probe(key, hash) {
            Probe::Found(_) => Ok(false),
            Probe::Vacant(i) => {
                self.slots[i] = Slot::Occupied {
                    key: self.contract.copy(key),
                    hash,
                    payload,
                };
                self.occupied += 1;
                Ok(true)
            }
            Probe::Full => Err(Error::TableFull),
        }
    }

    /// Removes `key` from the table, returning its payload.
    ///
    /// Returns `None` if the key is absent. The stored key copy is released
    /// through the contract; the payload is handed back to the caller.
    ///
    /// After vacating the slot, occupied slots downstream of it are
    /// re-probed on their own stored hashes and relocated if their probe
    /// path depended on the vacated slot. The scan stops at the first empty
    /// slot past the vacated one, since no probe sequence crosses an empty
    /// slot. This keeps lookups exact without tombstones.
    pub fn remove(&mut self, key: &C::Key) -> Option<P> {
        let hash = self.contract.hash(key);
        let index = match self.probe(key, hash) {
            Probe::Found(i) => i,
            _ => return None,
        };

        let slot = mem::replace(&mut self.slots[index], Slot::Empty);
        let payload = match slot {
            Slot::Occupied { key, payload, .. } => {
                self.contract.dispose(key);
                payload
            }
            Slot::Empty => return None,
        };
        self.occupied -= 1;
        self.relayout_after_removal(index);
        Some(payload)
    }

    /// Returns an iterator over `(key, payload)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, C::Key, P> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Returns an iterator over the keys in slot order.
    pub fn keys(&self) -> Keys<'_, C::Key, P> {
        Keys { inner: self.iter() }
    }

    /// Produces owned copies of every key, in slot order.
    ///
    /// The copies are minted through [`KeyContract::copy`] and belong to the
    /// caller. The snapshot length equals [`len`](Table::len) at the time of
    /// the call.
    pub fn to_keys(&self) -> Vec<C::Key> {
        self.keys().map(|k| self.contract.copy(k)).collect()
    }

    /// Linear probe from the key's home slot.
    ///
    /// The cached slot hash is compared before `equals` is consulted, so
    /// mismatched slots usually cost one integer compare.
    fn probe(&self, key: &C::Key, hash: u64) -> Probe {
        let n_slots = self.slots.len();
        let home = (hash % n_slots as u64) as usize;
        let mut i = home;
        loop {
            match &self.slots[i] {
                Slot::Empty => return Probe::Vacant(i),
                Slot::Occupied {
                    key: stored,
                    hash: stored_hash,
                    ..
                } => {
                    if *stored_hash == hash && self.contract.equals(stored, key) {
                        return Probe::Found(i);
                    }
                }
            }
            i += 1;
            if i == n_slots {
                i = 0;
            }
            if i == home {
                return Probe::Full;
            }
        }
    }

    /// Doubles the slot array and relocates every key to its new probe
    /// position, since every home index changes under the new modulus.
    fn grow(&mut self) -> Result<(), Error> {
        let old_len = self.slots.len();
        let new_len = old_len.checked_mul(2).ok_or(Error::Allocation)?;
        self.slots
            .try_reserve_exact(old_len)
            .map_err(|_| Error::Allocation)?;
        self.slots.resize_with(new_len, || Slot::Empty);
        for i in 0..new_len {
            self.resettle(i);
        }
        Ok(())
    }

    /// Local relayout after a removal: scan forward (wrapping) from the
    /// vacated slot, resettling each occupied slot, and stop at the first
    /// empty slot encountered past the start.
    fn relayout_after_removal(&mut self, start: usize) {
        let n_slots = self.slots.len();
        let mut i = start;
        loop {
            i += 1;
            if i == n_slots {
                i = 0;
            }
            if i == start || !self.slots[i].is_occupied() {
                break;
            }
            self.resettle(i);
        }
    }

    /// Re-probes the key at `i` on its stored hash and moves the slot's
    /// contents to the index the probe resolves to, if different.
    fn resettle(&mut self, i: usize) {
        let target = match &self.slots[i] {
            Slot::Empty => return,
            Slot::Occupied { key, hash, .. } => match self.probe(key, *hash) {
                Probe::Found(idx) | Probe::Vacant(idx) => idx,
                Probe::Full => i,
            },
        };
        if target != i {
            let slot = mem::replace(&mut self.slots[i], Slot::Empty);
            self.slots[target] = slot;
        }
    }
}

impl<C: KeyContract, P: Default> Table<C, P> {
    /// Adds `key` with a default payload.
    ///
    /// Returns `Ok(true)` if the key was newly inserted and `Ok(false)` if it
    /// was already present. See [`add_with_data`](Table::add_with_data).
    pub fn add(&mut self, key: &C::Key) -> Result<bool, Error> {
        self.add_with_data(key, P::default())
    }
}

impl<C: KeyContract, P> Drop for Table<C, P> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<C: KeyContract, P> Debug for Table<C, P>
where
    C::Key: Debug,
    P: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, p) in self.iter() {
            map.entry(k, p);
        }
        map.finish()
    }
}

impl<'a, C: KeyContract, P> IntoIterator for &'a Table<C, P> {
    type IntoIter = Iter<'a, C::Key, P>;
    type Item = (&'a C::Key, &'a P);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over a table's `(key, payload)` pairs.
pub struct Iter<'a, K, P> {
    slots: core::slice::Iter<'a, Slot<K, P>>,
}

impl<'a, K, P> Iterator for Iter<'a, K, P> {
    type Item = (&'a K, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied { key, payload, .. } = slot {
                return Some((key, payload));
            }
        }
        None
    }
}

/// An iterator over a table's keys.
pub struct Keys<'a, K, P> {
    inner: Iter<'a, K, P>,
}

impl<'a, K, P> Iterator for Keys<'a, K, P> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::contract::HasherContract;
    use crate::contract::KeyContract;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipContract = HasherContract<u64, SipHashBuilder>;

    fn sip_table() -> Table<SipContract> {
        Table::with_capacity(SipContract::new(), 0).unwrap()
    }

    /// Hashes every key into one of a handful of buckets so probe chains
    /// collide constantly.
    struct Collider;

    impl KeyContract for Collider {
        type Key = u64;

        fn hash(&self, key: &u64) -> u64 {
            key % 4
        }

        fn equals(&self, a: &u64, b: &u64) -> bool {
            a == b
        }

        fn copy(&self, key: &u64) -> u64 {
            *key
        }
    }

    #[test]
    fn add_contains_remove_round_trip() {
        let mut table = sip_table();
        for k in 0..64u64 {
            assert_eq!(table.add(&k), Ok(true));
            assert!(table.contains(&k));
        }
        assert_eq!(table.len(), 64);
        for k in 0..64u64 {
            assert_eq!(table.remove(&k), Some(()));
            assert!(!table.contains(&k));
        }
        assert!(table.is_empty());
    }

    #[test]
    fn double_add_is_rejected() {
        let mut table = sip_table();
        assert_eq!(table.add(&9), Ok(true));
        assert_eq!(table.add(&9), Ok(false));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn first_payload_wins() {
        let mut table: Table<SipContract, i32> =
            Table::with_capacity(SipContract::new(), 4).unwrap();
        assert_eq!(table.add_with_data(&1, 10), Ok(true));
        assert_eq!(table.add_with_data(&1, 20), Ok(false));
        assert_eq!(table.get(&1), Some(&10));

        *table.get_mut(&1).unwrap() = 30;
        assert_eq!(table.get(&1), Some(&30));
        assert_eq!(table.remove(&1), Some(30));
        assert_eq!(table.get(&1), None);
    }

    #[test]
    fn remove_missing_returns_none() {
        let mut table = sip_table();
        table.add(&1).unwrap();
        assert_eq!(table.remove(&2), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = sip_table();
        for k in 0..100u64 {
            table.add(&k).unwrap();
        }
        let capacity = table.capacity();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        for k in 0..100u64 {
            assert!(!table.contains(&k));
            assert_eq!(table.add(&k), Ok(true));
        }
    }

    #[test]
    fn growth_preserves_contents() {
        let mut table: Table<SipContract, u64> =
            Table::with_capacity(SipContract::new(), 2).unwrap();
        for k in 0..10_000u64 {
            assert_eq!(table.add_with_data(&k, k * 2), Ok(true));
        }
        assert_eq!(table.len(), 10_000);
        for k in 0..10_000u64 {
            assert_eq!(table.get(&k), Some(&(k * 2)), "lost key {k}");
        }
    }

    #[test]
    fn deletion_relayout_under_collisions() {
        let mut table: Table<Collider> = Table::with_capacity(Collider, 64).unwrap();
        for k in 0..48u64 {
            assert_eq!(table.add(&k), Ok(true));
        }
        // Remove every third key; all survivors must stay reachable after
        // each individual removal.
        for removed in (0..48u64).step_by(3) {
            assert_eq!(table.remove(&removed), Some(()));
            for k in 0..48u64 {
                let expect = k % 3 != 0 || k > removed;
                assert_eq!(table.contains(&k), expect, "key {k} after removing {removed}");
            }
        }
    }

    #[test]
    fn fuzz_against_reference_set() {
        let mut seed_rng = OsRng;
        let seed = seed_rng.try_next_u64().unwrap_or(0xfeed);
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut table: Table<Collider> = Table::with_capacity(Collider, 0).unwrap();
        let mut reference: std::collections::HashSet<u64> = std::collections::HashSet::new();

        for step in 0..5_000 {
            let key = rng.random_range(0..64u64);
            if rng.random_bool(0.5) {
                assert_eq!(
                    table.add(&key),
                    Ok(reference.insert(key)),
                    "insert mismatch at step {step} (seed {seed})"
                );
            } else {
                assert_eq!(
                    table.remove(&key).is_some(),
                    reference.remove(&key),
                    "remove mismatch at step {step} (seed {seed})"
                );
            }
            assert_eq!(table.len(), reference.len(), "seed {seed}");
        }
        for key in 0..64u64 {
            assert_eq!(table.contains(&key), reference.contains(&key), "seed {seed}");
        }
    }

    #[test]
    fn to_keys_snapshots_every_key() {
        let mut table = sip_table();
        for k in 0..32u64 {
            table.add(&k).unwrap();
        }
        let mut keys = table.to_keys();
        assert_eq!(keys.len(), table.len());
        keys.sort_unstable();
        let expected: Vec<u64> = (0..32).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn iter_covers_all_pairs() {
        let mut table: Table<SipContract, u64> =
            Table::with_capacity(SipContract::new(), 8).unwrap();
        for k in 0..16u64 {
            table.add_with_data(&k, k + 100).unwrap();
        }
        let mut seen: Vec<(u64, u64)> = table.iter().map(|(k, p)| (*k, *p)).collect();
        seen.sort_unstable();
        let expected: Vec<(u64, u64)> = (0..16).map(|k| (k, k + 100)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn disposal_runs_for_every_removed_key() {
        use core::cell::Cell;

        struct CountingContract<'a> {
            disposed: &'a Cell<usize>,
        }

        impl KeyContract for CountingContract<'_> {
            type Key = u64;

            fn hash(&self, key: &u64) -> u64 {
                *key
            }

            fn equals(&self, a: &u64, b: &u64) -> bool {
                a == b
            }

            fn copy(&self, key: &u64) -> u64 {
                *key
            }

            fn dispose(&self, _key: u64) {
                self.disposed.set(self.disposed.get() + 1);
            }
        }

        let disposed = Cell::new(0);
        {
            let mut table: Table<CountingContract<'_>> =
                Table::with_capacity(CountingContract { disposed: &disposed }, 16).unwrap();
            for k in 0..10u64 {
                table.add(&k).unwrap();
            }
            table.remove(&3).unwrap();
            table.remove(&7).unwrap();
            assert_eq!(disposed.get(), 2);
            table.clear();
            assert_eq!(disposed.get(), 10);
            for k in 0..4u64 {
                table.add(&k).unwrap();
            }
            // Drop releases the rest.
        }
        assert_eq!(disposed.get(), 14);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many_across_growth() {
        let mut table = sip_table();
        for k in 0..100_000u64 {
            assert_eq!(table.add(&k), Ok(true));
        }
        assert_eq!(table.len(), 100_000);
        for k in 0..100_000u64 {
            assert!(table.contains(&k), "missing key {k}");
        }
        for k in 100_000..101_000u64 {
            assert!(!table.contains(&k));
        }
    }
}
