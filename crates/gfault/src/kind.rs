//! Kinds, facets, query targets and interned lineages.
//!
//! A *kind* is a type-level description of a failure: one grade, zero or
//! more bases, and the payload capabilities they bring. Kinds are never
//! instantiated; `build` materializes them into `Thrown<K>`.
//!
//! Multiple inheritance is replaced by a lineage: the sorted, deduplicated
//! set of every kind and facet a kind descends from. Two bases that both
//! reach `Failure` contribute a single `Failure` entry, so queries are
//! never ambiguous. Each lineage is computed once per kind and interned in
//! a `static` owned by that kind.

use core::marker::PhantomData;

use crate::bridge::HostBridge;
use crate::flag::Flag;
use crate::grade::{Grade, GradeMarker};
use crate::id::{KindId, TagId};

/// Anything `is_a` / `cast` can ask about: kinds, payload facets, and the
/// `AnyTagged` / `Tagged` views.
pub trait Target: 'static {
    type Resource: Flag;
    type Range: Flag;
    type Amount: Flag;

    /// Extra evidence a successful query yields: `()` for plain views,
    /// the matched `TagId` for tagged views.
    type Tag: Copy;

    fn admit(lineage: &Lineage, tag: Option<TagId>) -> Option<Self::Tag>;
}

/// Anything `synthesize!` can compose: kinds and payload facets.
pub trait Facet: Target {
    /// `None` for facets that sit directly under `Failure`.
    const GRADE: Option<Grade>;

    /// Tags are applied to a finished kind, never composed.
    const TAGGED: bool = false;

    fn lineage() -> &'static Lineage;
}

/// A failure kind.
pub trait Kind: Facet {
    type Grade: GradeMarker;

    /// Host error this kind bridges to, fixed per kind.
    const BRIDGE: Option<HostBridge> = HostBridge::select(
        <Self as Facet>::GRADE,
        <<Self as Target>::Amount as Flag>::SET,
        <<Self as Target>::Range as Flag>::SET,
    );

    fn tag() -> Option<TagId> {
        None
    }
}

/// Kinds that carry no tag: grades and synthesized kinds. Only these can
/// be committed to a tag, so a kind holds at most one.
pub trait Untagged: Kind {}

/// Deduplicated ancestry of one kind.
#[derive(Debug)]
pub struct Lineage {
    kind: KindId,
    grade: Option<Grade>,
    ancestors: Box<[KindId]>,
}

impl Lineage {
    /// Merge the parents' ancestry and add `S` itself.
    ///
    /// Cost is linear in the parents' ancestor counts; no combination other
    /// than the one requested is ever built.
    pub fn compose<S: ?Sized + 'static>(grade: Option<Grade>, parents: &[&Lineage]) -> Self {
        let kind = KindId::of::<S>();
        let mut ancestors: Vec<KindId> = parents
            .iter()
            .flat_map(|p| p.ancestors.iter().copied())
            .collect();
        ancestors.push(kind);
        ancestors.sort_unstable();
        ancestors.dedup();

        tracing::trace!(kind = kind.name, ancestors = ancestors.len(), "lineage interned");

        Self {
            kind,
            grade,
            ancestors: ancestors.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name
    }

    #[inline]
    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    #[inline]
    pub fn contains(&self, id: KindId) -> bool {
        self.ancestors.binary_search(&id).is_ok()
    }

    pub fn ancestors(&self) -> &[KindId] {
        &self.ancestors
    }
}

/// View over `K` that additionally requires the instance to carry a tag,
/// whichever it is.
pub struct AnyTagged<K>(PhantomData<fn() -> K>);

impl<K: Kind> Target for AnyTagged<K> {
    type Resource = K::Resource;
    type Range = K::Range;
    type Amount = K::Amount;
    type Tag = TagId;

    fn admit(lineage: &Lineage, tag: Option<TagId>) -> Option<TagId> {
        K::admit(lineage, tag)?;
        tag
    }
}

/// `K` committed to the tag `T`.
///
/// As a query target it matches instances of `K` carrying exactly `T`. As a
/// kind it is buildable, and its instances satisfy every tagged view of
/// `K`'s ancestry at the same tag. `K` must itself be untagged:
///
/// ```compile_fail
/// use gfault::{build, Error, Tagged};
///
/// enum Fs {}
/// enum Net {}
///
/// // A tagged kind cannot be tagged again.
/// let _ = build::<Tagged<Tagged<Error, Fs>, Net>>("nested");
/// ```
pub struct Tagged<K, T>(PhantomData<fn() -> (K, T)>);

impl<K: Untagged, T: 'static> Target for Tagged<K, T> {
    type Resource = K::Resource;
    type Range = K::Range;
    type Amount = K::Amount;
    type Tag = TagId;

    fn admit(lineage: &Lineage, tag: Option<TagId>) -> Option<TagId> {
        K::admit(lineage, tag)?;
        let wanted = TagId::of::<T>();
        (tag == Some(wanted)).then_some(wanted)
    }
}

impl<K: Untagged, T: 'static> Facet for Tagged<K, T> {
    const GRADE: Option<Grade> = <K as Facet>::GRADE;
    const TAGGED: bool = true;

    fn lineage() -> &'static Lineage {
        <K as Facet>::lineage()
    }
}

impl<K: Untagged, T: 'static> Kind for Tagged<K, T> {
    type Grade = K::Grade;

    fn tag() -> Option<TagId> {
        Some(TagId::of::<T>())
    }
}
