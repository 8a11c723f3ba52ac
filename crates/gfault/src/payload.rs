//! Payload capabilities and the pre-built kind family.
//!
//! A payload facet is a capability independent of grade: it contributes a
//! `Yes` flag and nothing else. The field itself lives only in the leaf
//! `Thrown<K>`, so composed kinds never duplicate storage no matter how
//! many paths bring the same capability.

use std::sync::OnceLock;

use crate::flag::{No, Yes};
use crate::grade::{Condition, CriticalError, Error, Failure, Notification, Violation};
use crate::id::{KindId, TagId};
use crate::kind::{Facet, Lineage, Target};

/// Requested index and the bounds it was checked against.
///
/// `lower_bound <= upper_bound` is the caller's business; `requested` is
/// expected to fall outside the range, since that is what gets reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub requested:   usize,
    pub lower_bound: usize,
    pub upper_bound: usize,
}

impl IndexRange {
    pub const fn new(requested: usize, lower_bound: usize, upper_bound: usize) -> Self {
        Self { requested, lower_bound, upper_bound }
    }
}

impl core::fmt::Display for IndexRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} not in [{}, {}]", self.requested, self.lower_bound, self.upper_bound)
    }
}

macro_rules! payload_facet {
    ($(#[$meta:meta])* $name:ident, $resource:ty, $range:ty, $amount:ty) => {
        $(#[$meta])*
        pub enum $name {}

        impl Target for $name {
            type Resource = $resource;
            type Range = $range;
            type Amount = $amount;
            type Tag = ();

            fn admit(lineage: &Lineage, _tag: Option<TagId>) -> Option<()> {
                lineage.contains(KindId::of::<Self>()).then_some(())
            }
        }

        impl Facet for $name {
            const GRADE: Option<crate::Grade> = None;

            fn lineage() -> &'static Lineage {
                static LINEAGE: OnceLock<Lineage> = OnceLock::new();
                LINEAGE.get_or_init(|| Lineage::compose::<Self>(None, &[]))
            }
        }
    };
}

payload_facet!(
    /// Carries the name of the file, lock or socket involved.
    NamedResource, Yes, No, No
);
payload_facet!(
    /// Carries an `IndexRange`.
    IndexedRange, No, Yes, No
);
payload_facet!(
    /// Carries the number of units a failed allocation asked for.
    AllocationAmount, No, No, Yes
);

// ── Named resource ────────────────────────────────────────────────

synthesize! {
    /// A failure involving a named resource, at no particular grade.
    pub struct NamedResourceException: Failure + NamedResource;
}
synthesize! {
    pub struct NamedResourceNotification: Notification + NamedResourceException;
}
synthesize! {
    pub struct NamedResourceError: Error + NamedResourceException;
}
synthesize! {
    pub struct NamedResourceCriticalError: CriticalError + NamedResourceException;
}
synthesize! {
    pub struct NamedResourceViolation: Violation + NamedResourceException;
}

// ── Out of range ──────────────────────────────────────────────────

synthesize! {
    /// A value fell outside its valid domain.
    pub struct OutOfRangeException: Failure;
}
synthesize! {
    pub struct OutOfRangeError: Error + OutOfRangeException;
}
synthesize! {
    pub struct OutOfRangeCriticalError: CriticalError + OutOfRangeException;
}
synthesize! {
    pub struct OutOfRangeViolation: Violation + OutOfRangeException;
}

synthesize! {
    /// An index fell outside its bounds. Carries the range triple.
    pub struct IndexOutOfRangeException: OutOfRangeException + IndexedRange;
}
synthesize! {
    pub struct IndexOutOfRangeError: Error + OutOfRangeError + IndexOutOfRangeException;
}
synthesize! {
    pub struct IndexOutOfRangeCriticalError:
        CriticalError + OutOfRangeCriticalError + IndexOutOfRangeException;
}
synthesize! {
    pub struct IndexOutOfRangeViolation: Violation + OutOfRangeViolation + IndexOutOfRangeException;
}

// ── Allocation ────────────────────────────────────────────────────

synthesize! {
    /// An allocation could not be satisfied. Carries the requested amount.
    pub struct AllocationException: Failure + AllocationAmount;
}
synthesize! {
    pub struct AllocationError: Error + AllocationException;
}
synthesize! {
    pub struct AllocationCriticalError: CriticalError + AllocationException;
}
synthesize! {
    pub struct AllocationViolation: Violation + AllocationException;
}

// ── Finished ──────────────────────────────────────────────────────

synthesize! {
    /// A producer has nothing more to give.
    pub struct FinishedException: Failure;
}
synthesize! {
    /// End of a stream or iteration, raised as control flow.
    pub struct FinishedCondition: Condition + FinishedException;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;
    use crate::kind::Kind;
    use crate::{Grade, HostBridge};

    fn lineage<F: Facet>() -> &'static Lineage {
        F::lineage()
    }

    #[test]
    fn capability_kinds_have_no_grade() {
        assert_eq!(<NamedResourceException as Facet>::GRADE, None);
        assert_eq!(<IndexOutOfRangeException as Facet>::GRADE, None);
        assert_eq!(<AllocationException as Facet>::GRADE, None);
        assert_eq!(<NamedResourceException as Kind>::BRIDGE, None);
    }

    #[test]
    fn transitive_synthesis_keeps_every_ancestor_once() {
        let l = lineage::<IndexOutOfRangeCriticalError>();
        for id in [
            KindId::of::<Failure>(),
            KindId::of::<CriticalError>(),
            KindId::of::<OutOfRangeException>(),
            KindId::of::<OutOfRangeCriticalError>(),
            KindId::of::<IndexOutOfRangeException>(),
            KindId::of::<IndexedRange>(),
            KindId::of::<IndexOutOfRangeCriticalError>(),
        ] {
            assert!(l.contains(id), "missing {id}");
        }
        assert_eq!(l.ancestors().len(), 7);
        assert!(!l.contains(KindId::of::<Error>()));
        assert_eq!(l.grade(), Some(Grade::CriticalError));
    }

    #[test]
    fn capabilities_propagate() {
        assert!(<<IndexOutOfRangeError as Target>::Range as Flag>::SET);
        assert!(!<<IndexOutOfRangeError as Target>::Resource as Flag>::SET);
        assert!(<<AllocationViolation as Target>::Amount as Flag>::SET);
        assert!(<<NamedResourceNotification as Target>::Resource as Flag>::SET);
        assert!(!<<FinishedCondition as Target>::Resource as Flag>::SET);
    }

    #[test]
    fn bridge_follows_grade_and_payload() {
        assert_eq!(<AllocationError as Kind>::BRIDGE, Some(HostBridge::OutOfMemory));
        assert_eq!(<IndexOutOfRangeError as Kind>::BRIDGE, Some(HostBridge::OutOfRange));
        assert_eq!(<OutOfRangeError as Kind>::BRIDGE, Some(HostBridge::Generic));
        assert_eq!(<NamedResourceError as Kind>::BRIDGE, Some(HostBridge::Generic));
        assert_eq!(<AllocationCriticalError as Kind>::BRIDGE, Some(HostBridge::Generic));
        assert_eq!(<IndexOutOfRangeViolation as Kind>::BRIDGE, None);
        assert_eq!(<NamedResourceNotification as Kind>::BRIDGE, None);
        assert_eq!(<FinishedCondition as Kind>::BRIDGE, None);
    }

    #[test]
    fn range_display() {
        assert_eq!(IndexRange::new(12, 0, 9).to_string(), "12 not in [0, 9]");
    }
}
