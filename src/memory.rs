//! This module contains the abstract view of memory that the tracer works
//! with: opaque pointers, and may-alias sets of those pointers.
//!
//! An [`Address`] does not say where an access lands; it says where the
//! access *could* land. Any write through an address potentially hits every
//! pointer in its set, and the `shared` flag records whether at least one of
//! those pointers is reachable from another thread.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    data::{
        combine::Combine,
        vector_map::{FromUniqueIndex, ToUniqueIndex},
    },
    error::memory,
};

/// An opaque identifier for an abstract memory location.
///
/// Pointers carry no structure beyond their index. The tracer hands out
/// densely-numbered pointers through
/// [`crate::tracer::Tracer::fresh_pointer`]; callers are free to construct
/// their own, bearing in mind that the event relation is dense in pointer
/// indices.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Pointer(usize);

impl Pointer {
    /// Creates a pointer with the provided raw `index`.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }
}

impl ToUniqueIndex for Pointer {
    fn index(&self) -> usize {
        self.0
    }
}

impl FromUniqueIndex for Pointer {
    fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// A may-alias set of abstract pointers, together with whether any of them is
/// shared with another thread.
///
/// Addresses are immutable once constructed; joining two addresses produces a
/// new one. The pointer set is never empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Address {
    /// The pointers this access could target.
    pointers: BTreeSet<Pointer>,

    /// Whether any pointer in the set is reachable from another thread.
    shared: bool,
}

impl Address {
    /// Creates the singleton address holding `pointer`.
    #[must_use]
    pub fn new(pointer: Pointer, shared: bool) -> Self {
        let pointers = BTreeSet::from([pointer]);
        Self { pointers, shared }
    }

    /// Creates an address from the provided set of `pointers`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `pointers` yields no pointer at all, as an address
    /// must describe at least one location.
    pub fn from_pointers(
        pointers: impl IntoIterator<Item = Pointer>,
        shared: bool,
    ) -> memory::Result<Self> {
        let pointers: BTreeSet<Pointer> = pointers.into_iter().collect();
        if pointers.is_empty() {
            return Err(memory::Error::EmptyAddress);
        }

        Ok(Self { pointers, shared })
    }

    /// Gets the pointers this address could target.
    #[must_use]
    pub fn pointers(&self) -> &BTreeSet<Pointer> {
        &self.pointers
    }

    /// Checks whether any pointer in this address is reachable from another
    /// thread.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Joins two addresses into the address describing an access that could
    /// land wherever either input could.
    ///
    /// The pointer sets combine by union and the shared flags by disjunction,
    /// so `join` is symmetric and associative, and `a.join(a) == a`.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        let pointers = self.pointers.combine(other.pointers);
        let shared = self.shared || other.shared;
        Self { pointers, shared }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::memory,
        memory::{Address, Pointer},
    };

    fn address(indices: &[usize], shared: bool) -> Address {
        Address::from_pointers(indices.iter().copied().map(Pointer::new), shared)
            .expect("Test address had no pointers")
    }

    #[test]
    fn singleton_address_contains_its_pointer() {
        let addr = Address::new(Pointer::new(7), true);

        assert_eq!(addr.pointers().len(), 1);
        assert!(addr.pointers().contains(&Pointer::new(7)));
        assert!(addr.is_shared());
    }

    #[test]
    fn address_construction_rejects_the_empty_set() {
        let result = Address::from_pointers([], false);
        assert_eq!(result, Err(memory::Error::EmptyAddress));
    }

    #[test]
    fn join_unions_the_pointer_sets() {
        let joined = address(&[1, 2], false).join(address(&[2, 3], false));
        assert_eq!(joined, address(&[1, 2, 3], false));
    }

    #[test]
    fn join_is_symmetric() {
        let a = address(&[1], false);
        let b = address(&[2, 4], true);

        assert_eq!(a.clone().join(b.clone()), b.join(a));
    }

    #[test]
    fn join_is_associative() {
        let a = address(&[1], false);
        let b = address(&[2], true);
        let c = address(&[3, 4], false);

        let left = a.clone().join(b.clone()).join(c.clone());
        let right = a.join(b.join(c));
        assert_eq!(left, right);
    }

    #[test]
    fn join_is_idempotent() {
        let a = address(&[5, 6], true);
        assert_eq!(a.clone().join(a.clone()), a);
    }

    #[test]
    fn join_disjoins_the_shared_flags() {
        assert!(!address(&[1], false).join(address(&[2], false)).is_shared());
        assert!(address(&[1], true).join(address(&[2], false)).is_shared());
        assert!(address(&[1], false).join(address(&[2], true)).is_shared());
        assert!(address(&[1], true).join(address(&[2], true)).is_shared());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(address(&[1, 2], true), address(&[2, 1], true));
        assert_ne!(address(&[1, 2], true), address(&[1, 2], false));
        assert_ne!(address(&[1], true), address(&[1, 2], true));
    }
}
