use core::hash::BuildHasher;
use core::hash::Hash;
use core::marker::PhantomData;

/// The capability set a table needs from its key type.
///
/// A `KeyContract` bundles hashing, equality, duplication, and release of
/// keys behind one value. The contract value itself carries whatever context
/// those operations need — for example [`CoordContract`](crate::coord::CoordContract)
/// stores the number of coordinate dimensions it hashes and compares — so the
/// engine stays generic while key-shape knowledge lives in one place.
///
/// A single contract value may back any number of tables. Tables only ever
/// take `&self` on the contract, so sharing one by reference (see the blanket
/// impl for `&C`) is safe and cheap.
pub trait KeyContract {
    /// The key type this contract operates on.
    type Key;

    /// Computes a 64-bit digest of `key`.
    ///
    /// Equal keys (per [`equals`](KeyContract::equals)) must produce equal
    /// digests.
    fn hash(&self, key: &Self::Key) -> u64;

    /// Returns `true` if `a` and `b` denote the same key.
    fn equals(&self, a: &Self::Key, b: &Self::Key) -> bool;

    /// Produces an owned duplicate of `key`.
    ///
    /// The table stores the duplicate; the caller's key is never retained.
    fn copy(&self, key: &Self::Key) -> Self::Key;

    /// Releases a key previously produced by [`copy`](KeyContract::copy).
    ///
    /// The default implementation drops the key, which is correct for any key
    /// whose resources are managed by its `Drop` impl.
    fn dispose(&self, key: Self::Key) {
        drop(key);
    }
}

impl<C: KeyContract> KeyContract for &C {
    type Key = C::Key;

    fn hash(&self, key: &Self::Key) -> u64 {
        (*self).hash(key)
    }

    fn equals(&self, a: &Self::Key, b: &Self::Key) -> bool {
        (*self).equals(a, b)
    }

    fn copy(&self, key: &Self::Key) -> Self::Key {
        (*self).copy(key)
    }

    fn dispose(&self, key: Self::Key) {
        (*self).dispose(key)
    }
}

/// A [`KeyContract`] for any `K: Hash + Eq + Clone`, backed by a
/// [`BuildHasher`].
///
/// This bridges the contract world to the standard hashing ecosystem: keys
/// are hashed with the builder's hasher, compared with `Eq`, and duplicated
/// with `Clone`.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "foldhash")]
/// # {
/// use probe_set::HasherContract;
/// use probe_set::Table;
///
/// let mut table: Table<HasherContract<u64>> =
///     Table::with_capacity(HasherContract::new(), 16).unwrap();
/// assert_eq!(table.add(&7), Ok(true));
/// assert!(table.contains(&7));
/// # }
/// ```
#[cfg(feature = "foldhash")]
pub struct HasherContract<K, S = foldhash::fast::RandomState> {
    hash_builder: S,
    _marker: PhantomData<fn(&K)>,
}

/// A [`KeyContract`] for any `K: Hash + Eq + Clone`, backed by a
/// [`BuildHasher`].
///
/// This bridges the contract world to the standard hashing ecosystem: keys
/// are hashed with the builder's hasher, compared with `Eq`, and duplicated
/// with `Clone`.
#[cfg(not(feature = "foldhash"))]
pub struct HasherContract<K, S> {
    hash_builder: S,
    _marker: PhantomData<fn(&K)>,
}

impl<K, S> HasherContract<K, S> {
    /// Creates a contract that hashes with the given builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            hash_builder,
            _marker: PhantomData,
        }
    }
}

impl<K, S: Default> HasherContract<K, S> {
    /// Creates a contract using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S: Default> Default for HasherContract<K, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S: Clone> Clone for HasherContract<K, S> {
    fn clone(&self) -> Self {
        Self {
            hash_builder: self.hash_builder.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K, S> KeyContract for HasherContract<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Key = K;

    fn hash(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn copy(&self, key: &K) -> K {
        key.clone()
    }
}
