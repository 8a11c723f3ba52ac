//! # gfault: graded failure taxonomy
//!
//! Every failure a program signals is classified on two independent axes:
//! a *grade* saying how recoverable it is, and the *capabilities* saying
//! what payload it carries. Kinds combining the two are declared at the
//! type level with [`synthesize!`] and materialized with [`build`].
//!
//! ## Design
//!
//! - **Grades**: [`Condition`], [`Notification`], [`Error`],
//!   [`CriticalError`], [`Violation`], all rooted at [`Failure`]. A
//!   buildable kind commits to exactly one.
//!
//! - **Tags**: [`Tagged<K, T>`] commits a kind to the tag type `T`;
//!   [`AnyTagged<K>`] matches any tagged instance of `K`. Tags compare by
//!   type identity, never by name.
//!
//! - **Payload**: [`NamedResource`], [`IndexedRange`], [`AllocationAmount`].
//!   Capabilities are ORed through synthesis; the fields live only in the
//!   materialized [`Thrown<K>`].
//!
//! - **Lineage**: diamond ancestry collapses into one interned, sorted,
//!   deduplicated set per kind, so `is_a` / `cast` are never ambiguous.
//!
//! - **Bridge**: Error-grade and CriticalError-grade instances implement
//!   `std::error::Error` and convert into `io::Error` with the kind's
//!   [`HostBridge`], resolved once per kind.
//!
//! - **Violation**: instances hold a [`ViolationToken`]; dropping one
//!   that was never handed off aborts the process.
//!
//! ## Quick Start
//!
//! ```rust
//! use gfault::{
//!     build, ensure, match_fault, synthesize, CriticalError, Error, Failure, Fault,
//!     FaultResult, NamedResourceException, OutOfRangeError,
//! };
//!
//! synthesize! {
//!     /// Pool ran dry for a named resource.
//!     pub struct PoolExhausted: CriticalError + NamedResourceException;
//! }
//!
//! fn checkout(slot: usize, size: usize) -> FaultResult<usize> {
//!     ensure!(slot < size, OutOfRangeError, "slot {} past {}", slot, size);
//!     Err(build::<PoolExhausted>("connection pool exhausted")
//!         .with_resource_name("db-conn-17")
//!         .into())
//! }
//!
//! fn handle(fault: &Fault) -> &'static str {
//!     match_fault!(fault, {
//!         PoolExhausted => "drop the client",
//!         Error         => "retry",
//!         _             => "propagate",
//!     })
//! }
//!
//! let fault = checkout(2, 8).unwrap_err();
//! assert_eq!(fault.resource_name(), Some("db-conn-17"));
//! assert!(fault.is_a::<CriticalError>());
//! assert!(fault.is_a::<Failure>());
//! assert!(!fault.is_a::<Error>());
//! assert_eq!(handle(&fault), "drop the client");
//! assert_eq!(handle(&checkout(9, 8).unwrap_err()), "retry");
//! ```
//!
//! ## Feature Flags
//!
//! | Flag        | Effect |
//! |-------------|--------|
//! | `backtrace` | Captures `std::backtrace::Backtrace` when a failure is built |
//!
//! ## Dependencies
//!
//! `tracing` only: abort paths and the thread entry policy emit events,
//! installing a subscriber is the consumer's call.

#[macro_use]
mod macros;

mod id;
pub mod flag;
mod grade;
mod kind;
mod payload;
mod context;
mod violation;
mod thrown;
mod view;
mod bridge;
mod fault;
mod convert;
pub mod thread;

// ── Public API ────────────────────────────────────────────────────

pub use id::{KindId, TagId};
pub use grade::{
    Condition, CriticalError, Error, Failure, Grade, GradeMarker, Graded, HostBridged, Notification,
    Recovery, Violation,
};
pub use grade::{
    AnyTaggedCondition, AnyTaggedCriticalError, AnyTaggedError, AnyTaggedFailure,
    AnyTaggedNotification, AnyTaggedViolation, TaggedCondition, TaggedCriticalError, TaggedError,
    TaggedFailure, TaggedNotification, TaggedViolation,
};
pub use kind::{AnyTagged, Facet, Kind, Lineage, Tagged, Target, Untagged};
pub use payload::{
    AllocationAmount, AllocationCriticalError, AllocationError, AllocationException,
    AllocationViolation, FinishedCondition, FinishedException, IndexOutOfRangeCriticalError,
    IndexOutOfRangeError, IndexOutOfRangeException, IndexOutOfRangeViolation, IndexRange,
    IndexedRange, NamedResource, NamedResourceCriticalError, NamedResourceError,
    NamedResourceException, NamedResourceNotification, NamedResourceViolation,
    OutOfRangeCriticalError, OutOfRangeError, OutOfRangeException, OutOfRangeViolation,
};
pub use context::Context;
pub use violation::ViolationToken;
pub use thrown::{build, Thrown};
pub use view::{BadCastError, Ref, Throwable};
pub use bridge::HostBridge;
pub use fault::{Fault, FaultResult};
pub use convert::{IoError, ResultExt};
