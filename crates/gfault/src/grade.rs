//! The grade hierarchy.
//!
//! Six marker kinds: the root `Failure` plus the five grades. Every grade is
//! itself a `Failure`; no grade is a supertype of another. Each marker is
//! an uninhabited enum, used only at the type level and as a query target:
//!
//! ```
//! use gfault::{build, Error, Failure, CriticalError};
//!
//! let fault = build::<Error>("checksum mismatch");
//! assert!(fault.is_a::<Error>());
//! assert!(fault.is_a::<Failure>());
//! assert!(!fault.is_a::<CriticalError>());
//! ```
//!
//! | Grade           | Recovery                                              |
//! |-----------------|-------------------------------------------------------|
//! | `Condition`     | always resumable where it is raised                   |
//! | `Notification`  | absorbed by the thread entry wrapper, ends that thread|
//! | `Error`         | caught by the caller, payload drives recovery         |
//! | `CriticalError` | caught only where a larger unit of work is discarded  |
//! | `Violation`     | outermost handler sanitizes, then the process aborts  |

use std::error::Error as StdError;
use std::sync::OnceLock;

use crate::flag::No;
use crate::id::{KindId, TagId};
use crate::kind::{AnyTagged, Facet, Kind, Lineage, Tagged, Target, Untagged};
use crate::thrown::Thrown;
use crate::violation::ViolationToken;

/// Runtime view of a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    Condition,
    Notification,
    Error,
    CriticalError,
    Violation,
}

/// Where a grade is expected to be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Handled inline; a control-flow device, never a bug.
    Resume,
    /// Swallowed by the thread entry wrapper, ending only that thread.
    AbsorbAtThreadEntry,
    /// Caught by the caller.
    CatchAtCaller,
    /// Caught where a whole unit of work (a connection, a job) is dropped.
    DiscardUnitOfWork,
    /// Persistent state is sanitized, then the process aborts.
    Terminate,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::Condition,
        Grade::Notification,
        Grade::Error,
        Grade::CriticalError,
        Grade::Violation,
    ];

    pub const fn recovery(self) -> Recovery {
        match self {
            Grade::Condition => Recovery::Resume,
            Grade::Notification => Recovery::AbsorbAtThreadEntry,
            Grade::Error => Recovery::CatchAtCaller,
            Grade::CriticalError => Recovery::DiscardUnitOfWork,
            Grade::Violation => Recovery::Terminate,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Grade::Condition => "Condition",
            Grade::Notification => "Notification",
            Grade::Error => "Error",
            Grade::CriticalError => "CriticalError",
            Grade::Violation => "Violation",
        }
    }

    /// Whether a base of grade `base` may be composed under `grade`.
    ///
    /// Ungraded facets compose with anything; graded ones only with
    /// their own grade. Evaluated in const context by `synthesize!`.
    pub const fn admits(grade: Option<Grade>, base: Option<Grade>) -> bool {
        match (grade, base) {
            (_, None) => true,
            (Some(g), Some(b)) => g as u8 == b as u8,
            (None, Some(_)) => false,
        }
    }
}

impl core::fmt::Display for Grade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Type-level grades ─────────────────────────────────────────────

/// Implemented by the six marker kinds only; `Kind::Grade` is always one
/// of them.
pub trait GradeMarker: Kind {}

/// A concrete grade. Only kinds whose grade is `Graded` can be built, so
/// every instance commits to exactly one grade.
pub trait Graded: GradeMarker {
    const LEVEL: Grade;

    /// Abort guard installed into every instance of this grade.
    fn guard(_origin: &'static str) -> Option<ViolationToken> {
        None
    }

    /// The instance as a host error, when this grade bridges.
    fn host<K: Kind<Grade = Self>>(_thrown: &Thrown<K>) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        None
    }

    fn into_host<K: Kind<Grade = Self>>(thrown: Thrown<K>) -> Result<Box<dyn StdError + Send + Sync>, Thrown<K>> {
        Err(thrown)
    }
}

/// Grades whose instances implement `std::error::Error`.
pub trait HostBridged: Graded {}

/// Root of the taxonomy. Every kind is a `Failure`; `Failure` alone is
/// not a grade and cannot be built.
pub enum Failure {}

impl Target for Failure {
    type Resource = No;
    type Range = No;
    type Amount = No;
    type Tag = ();

    fn admit(lineage: &Lineage, _tag: Option<TagId>) -> Option<()> {
        lineage.contains(KindId::of::<Self>()).then_some(())
    }
}

impl Facet for Failure {
    const GRADE: Option<Grade> = None;

    fn lineage() -> &'static Lineage {
        static LINEAGE: OnceLock<Lineage> = OnceLock::new();
        LINEAGE.get_or_init(|| Lineage::compose::<Self>(None, &[]))
    }
}

impl Kind for Failure {
    type Grade = Failure;
}

impl GradeMarker for Failure {}
impl Untagged for Failure {}

macro_rules! grade_marker {
    ($(#[$meta:meta])* $name:ident, $level:expr) => {
        $(#[$meta])*
        pub enum $name {}

        impl Target for $name {
            type Resource = No;
            type Range = No;
            type Amount = No;
            type Tag = ();

            fn admit(lineage: &Lineage, _tag: Option<TagId>) -> Option<()> {
                lineage.contains(KindId::of::<Self>()).then_some(())
            }
        }

        impl Facet for $name {
            const GRADE: Option<Grade> = Some($level);

            fn lineage() -> &'static Lineage {
                static LINEAGE: OnceLock<Lineage> = OnceLock::new();
                LINEAGE.get_or_init(|| {
                    Lineage::compose::<Self>(Some($level), &[<Failure as Facet>::lineage()])
                })
            }
        }

        impl Kind for $name {
            type Grade = $name;
        }

        impl GradeMarker for $name {}
        impl Untagged for $name {}
    };
}

grade_marker!(
    /// Out-of-band signal; not an error.
    Condition,
    Grade::Condition
);
grade_marker!(
    /// Advisory interrupt for one thread.
    Notification,
    Grade::Notification
);
grade_marker!(
    /// Recoverable fault.
    Error,
    Grade::Error
);
grade_marker!(
    /// Recoverable only by discarding a larger unit of work.
    CriticalError,
    Grade::CriticalError
);
grade_marker!(
    /// Invariant breach. Instances abort the process when dropped.
    Violation,
    Grade::Violation
);

impl Graded for Condition {
    const LEVEL: Grade = Grade::Condition;
}

impl Graded for Notification {
    const LEVEL: Grade = Grade::Notification;
}

impl Graded for Error {
    const LEVEL: Grade = Grade::Error;

    fn host<K: Kind<Grade = Self>>(thrown: &Thrown<K>) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        Some(thrown)
    }

    fn into_host<K: Kind<Grade = Self>>(thrown: Thrown<K>) -> Result<Box<dyn StdError + Send + Sync>, Thrown<K>> {
        Ok(Box::new(thrown))
    }
}

impl Graded for CriticalError {
    const LEVEL: Grade = Grade::CriticalError;

    fn host<K: Kind<Grade = Self>>(thrown: &Thrown<K>) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        Some(thrown)
    }

    fn into_host<K: Kind<Grade = Self>>(thrown: Thrown<K>) -> Result<Box<dyn StdError + Send + Sync>, Thrown<K>> {
        Ok(Box::new(thrown))
    }
}

impl Graded for Violation {
    const LEVEL: Grade = Grade::Violation;

    fn guard(origin: &'static str) -> Option<ViolationToken> {
        Some(ViolationToken::new(origin))
    }
}

impl HostBridged for Error {}
impl HostBridged for CriticalError {}

// ── Tag view aliases ──────────────────────────────────────────────

pub type AnyTaggedFailure = AnyTagged<Failure>;
pub type TaggedFailure<T> = Tagged<Failure, T>;
pub type AnyTaggedCondition = AnyTagged<Condition>;
pub type TaggedCondition<T> = Tagged<Condition, T>;
pub type AnyTaggedNotification = AnyTagged<Notification>;
pub type TaggedNotification<T> = Tagged<Notification, T>;
pub type AnyTaggedError = AnyTagged<Error>;
pub type TaggedError<T> = Tagged<Error, T>;
pub type AnyTaggedCriticalError = AnyTagged<CriticalError>;
pub type TaggedCriticalError<T> = Tagged<CriticalError, T>;
pub type AnyTaggedViolation = AnyTagged<Violation>;
pub type TaggedViolation<T> = Tagged<Violation, T>;
