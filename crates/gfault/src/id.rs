//! Type identities for kinds and tags.
//!
//! Both identities are backed by `TypeId`: two types compare unequal even
//! when they are structurally identical placeholders, and the name is kept
//! only for display. Matching never looks at the name.

use core::any::{type_name, TypeId};
use core::cmp::Ordering;

/// Identity of a kind or facet taking part in synthesis.
///
/// Equality, ordering and hashing use only the `TypeId`, so a `Lineage`
/// can keep its ancestors sorted and deduplicated.
#[derive(Clone, Copy)]
pub struct KindId {
    id: TypeId,
    pub name: &'static str,
}

impl KindId {
    /// Identity of `T`.
    ///
    /// ```
    /// use gfault::{KindId, Error, CriticalError};
    /// assert_ne!(KindId::of::<Error>(), KindId::of::<CriticalError>());
    /// assert_eq!(KindId::of::<Error>().name, "Error");
    /// ```
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_name(type_name::<T>()),
        }
    }
}

impl PartialEq for KindId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for KindId {}

impl PartialOrd for KindId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KindId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl core::hash::Hash for KindId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for KindId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "kind({})", self.name)
    }
}

impl core::fmt::Display for KindId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Runtime identity of a tag type.
///
/// Any `'static` type can serve as a tag; uninhabited enums are the usual
/// choice:
///
/// ```
/// use gfault::TagId;
/// enum Primary {}
/// enum Replica {}
/// assert_ne!(TagId::of::<Primary>(), TagId::of::<Replica>());
/// ```
#[derive(Clone, Copy)]
pub struct TagId {
    id: TypeId,
    pub name: &'static str,
}

impl TagId {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_name(type_name::<T>()),
        }
    }
}

impl PartialEq for TagId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TagId {}

impl core::hash::Hash for TagId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "tag({})", self.name)
    }
}

impl core::fmt::Display for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Strip the module path from a plain type name. Generic names are kept
/// whole since their parameters carry paths of their own.
pub(crate) fn short_name(full: &'static str) -> &'static str {
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}
