//! Materialized failures.
//!
//! `Thrown<K>` is the only concrete failure type. It owns the message and
//! exactly the payload fields `K`'s capabilities call for; every other slot
//! is `()`. Payload accessors exist only where the capability does:
//!
//! ```
//! use gfault::{build, NamedResourceCriticalError};
//!
//! let fault = build::<NamedResourceCriticalError>("connection pool exhausted")
//!     .with_resource_name("db-conn-17");
//! assert_eq!(fault.resource_name(), "db-conn-17");
//! ```
//!
//! ```compile_fail
//! use gfault::{build, Error};
//!
//! // `Error` carries no resource name.
//! let _ = build::<Error>("x").resource_name();
//! ```

use core::fmt;
use core::marker::PhantomData;
use std::error::Error as StdError;

use crate::bridge::HostBridge;
use crate::context::Context;
use crate::fault::FaultResult;
use crate::flag::{Flag, Yes};
use crate::grade::{Grade, Graded};
use crate::id::TagId;
use crate::kind::{Kind, Lineage, Target};
use crate::payload::IndexRange;
use crate::view::{Ref, Throwable};
use crate::violation::ViolationToken;

/// A failure of kind `K`, built by [`build`].
pub struct Thrown<K: Kind> {
    context:  Context,
    resource: <K::Resource as Flag>::Slot<String>,
    range:    <K::Range as Flag>::Slot<IndexRange>,
    amount:   <K::Amount as Flag>::Slot<usize>,
    guard:    Option<ViolationToken>,
    _kind:    PhantomData<fn() -> K>,
}

/// Materialize one failure of kind `K`.
///
/// Only kinds that commit to a grade can be built. The bridge a kind gets
/// is `K::BRIDGE`, fixed per kind. Violation instances are armed: dropping
/// one without handing it off aborts the process.
///
/// ```
/// use gfault::{build, Error, Failure, HostBridge};
///
/// let fault = build::<Error>("checksum mismatch");
/// assert_eq!(fault.message(), "checksum mismatch");
/// assert_eq!(fault.to_string(), "checksum mismatch");
/// assert_eq!(fault.bridge(), Some(HostBridge::Generic));
/// assert!(fault.is_a::<Failure>());
/// ```
pub fn build<K>(message: impl Into<String>) -> Thrown<K>
where
    K: Kind,
    K::Grade: Graded,
{
    #[allow(unused_mut)]
    let mut context = Context::new(message.into());

    #[cfg(feature = "backtrace")]
    context.capture_backtrace();

    Thrown {
        context,
        resource: Default::default(),
        range: Default::default(),
        amount: Default::default(),
        guard: <K::Grade as Graded>::guard(K::lineage().name()),
        _kind: PhantomData,
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl<K> Thrown<K>
where
    K: Kind,
    K::Grade: Graded,
{
    #[inline]
    pub fn message(&self) -> &str {
        &self.context.message
    }

    #[inline]
    pub fn grade(&self) -> Grade {
        <K::Grade as Graded>::LEVEL
    }

    #[inline]
    pub fn tag(&self) -> Option<TagId> {
        K::tag()
    }

    #[inline]
    pub fn lineage(&self) -> &'static Lineage {
        K::lineage()
    }

    #[inline]
    pub fn bridge(&self) -> Option<HostBridge> {
        K::BRIDGE
    }

    /// Whether dropping this instance would abort.
    pub fn is_armed(&self) -> bool {
        self.guard.as_ref().is_some_and(ViolationToken::is_active)
    }

    pub fn with_source<E>(mut self, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context = self.context.with_source(error);
        self
    }

    /// The cause attached with `with_source`.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.context.source.as_deref()
    }

    #[cfg(feature = "backtrace")]
    pub fn backtrace(&self) -> Option<&str> {
        self.context.backtrace.as_deref()
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_a<T: Target>(&self) -> bool {
        T::admit(K::lineage(), K::tag()).is_some()
    }

    /// View this failure as `T`, or a `BadCastError` naming both sides.
    pub fn cast<T: Target>(&self) -> FaultResult<Ref<'_, T>> {
        Ref::new(self)
    }
}

// ── Payload ───────────────────────────────────────────────────────

impl<K> Thrown<K>
where
    K: Kind<Resource = Yes>,
    K::Grade: Graded,
{
    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource = name.into();
        self
    }

    #[inline]
    pub fn resource_name(&self) -> &str {
        &self.resource
    }
}

impl<K> Thrown<K>
where
    K: Kind<Range = Yes>,
    K::Grade: Graded,
{
    pub fn with_range(mut self, requested: usize, lower_bound: usize, upper_bound: usize) -> Self {
        self.range = IndexRange::new(requested, lower_bound, upper_bound);
        self
    }

    #[inline]
    pub fn index_range(&self) -> IndexRange {
        self.range
    }

    #[inline]
    pub fn requested(&self) -> usize {
        self.range.requested
    }

    #[inline]
    pub fn lower_bound(&self) -> usize {
        self.range.lower_bound
    }

    #[inline]
    pub fn upper_bound(&self) -> usize {
        self.range.upper_bound
    }
}

impl<K> Thrown<K>
where
    K: Kind<Amount = Yes>,
    K::Grade: Graded,
{
    pub fn with_allocation_amount(mut self, amount: usize) -> Self {
        self.amount = amount;
        self
    }

    #[inline]
    pub fn allocation_amount(&self) -> usize {
        self.amount
    }
}

// ── Erased view ───────────────────────────────────────────────────

impl<K> Throwable for Thrown<K>
where
    K: Kind,
    K::Grade: Graded,
{
    fn message(&self) -> &str {
        &self.context.message
    }

    fn grade(&self) -> Grade {
        <K::Grade as Graded>::LEVEL
    }

    fn lineage(&self) -> &'static Lineage {
        K::lineage()
    }

    fn tag(&self) -> Option<TagId> {
        K::tag()
    }

    fn resource_name(&self) -> Option<&str> {
        <K::Resource as Flag>::get::<String>(&self.resource).map(String::as_str)
    }

    fn index_range(&self) -> Option<IndexRange> {
        <K::Range as Flag>::get::<IndexRange>(&self.range).copied()
    }

    fn allocation_amount(&self) -> Option<usize> {
        <K::Amount as Flag>::get::<usize>(&self.amount).copied()
    }

    fn bridge(&self) -> Option<HostBridge> {
        K::BRIDGE
    }

    fn is_armed(&self) -> bool {
        Thrown::is_armed(self)
    }

    fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.context.source.as_deref()
    }

    fn host_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        <K::Grade as Graded>::host::<K>(self)
    }

    fn into_host(self: Box<Self>) -> Result<Box<dyn StdError + Send + Sync>, Box<dyn Throwable>> {
        <K::Grade as Graded>::into_host::<K>(*self).map_err(|t| Box::new(t) as Box<dyn Throwable>)
    }

    fn as_any(&self) -> &dyn core::any::Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn core::any::Any + Send> {
        self
    }
}

// ── Formatting ────────────────────────────────────────────────────

impl<K> fmt::Display for Thrown<K>
where
    K: Kind,
    K::Grade: Graded,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.context.message)
    }
}

impl<K> fmt::Debug for Thrown<K>
where
    K: Kind,
    K::Grade: Graded,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Thrown");
        d.field("kind", &K::lineage().name());
        d.field("grade", &self.grade());
        if let Some(tag) = K::tag() {
            d.field("tag", &tag);
        }
        d.field("message", &self.context.message);
        if let Some(name) = Throwable::resource_name(self) {
            d.field("resource", &name);
        }
        if let Some(range) = Throwable::index_range(self) {
            d.field("range", &range);
        }
        if let Some(amount) = Throwable::allocation_amount(self) {
            d.field("amount", &amount);
        }
        if let Some(source) = &self.context.source {
            d.field("source", &source.to_string());
        }
        if self.guard.is_some() {
            d.field("armed", &self.is_armed());
        }
        d.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::{CriticalError, Error, Failure, Notification, Violation};
    use crate::kind::{AnyTagged, Tagged};
    use crate::payload::{
        AllocationError, AllocationAmount, IndexOutOfRangeCriticalError, IndexedRange, NamedResource,
        NamedResourceCriticalError, NamedResourceException, NamedResourceViolation,
    };

    enum Primary {}
    enum Replica {}

    #[test]
    fn payload_round_trips() {
        let f = build::<AllocationError>("arena full").with_allocation_amount(4096);
        assert_eq!(f.allocation_amount(), 4096);
        assert!(f.is_a::<AllocationAmount>());
        assert!(!f.is_a::<NamedResource>());

        let f = build::<IndexOutOfRangeCriticalError>("slot").with_range(12, 0, 9);
        assert_eq!((f.requested(), f.lower_bound(), f.upper_bound()), (12, 0, 9));
        assert!(f.is_a::<IndexedRange>());
    }

    #[test]
    fn erased_payload_matches_capabilities() {
        let f = build::<NamedResourceCriticalError>("gone").with_resource_name("db-conn-17");
        let t: &dyn Throwable = &f;
        assert_eq!(t.resource_name(), Some("db-conn-17"));
        assert_eq!(t.index_range(), None);
        assert_eq!(t.allocation_amount(), None);
    }

    #[test]
    fn tagged_kind_reports_its_tag() {
        let f = build::<Tagged<NamedResourceCriticalError, Primary>>("failover");
        assert_eq!(f.tag(), Some(TagId::of::<Primary>()));
        assert!(f.is_a::<AnyTagged<CriticalError>>());
        assert!(f.is_a::<AnyTagged<Failure>>());
        assert!(f.is_a::<Tagged<NamedResourceException, Primary>>());
        assert!(!f.is_a::<Tagged<CriticalError, Replica>>());
        assert!(f.is_a::<CriticalError>());
        assert!(!f.is_a::<Error>());
    }

    #[test]
    fn source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "handshake");
        let f = build::<Notification>("peer slow").with_source(io);
        assert_eq!(f.cause().map(|e| e.to_string()).as_deref(), Some("handshake"));
        assert!(Throwable::host_error(&f).is_none());
    }

    #[test]
    fn only_violations_are_armed() {
        let f = build::<Error>("x");
        assert!(!f.is_armed());

        let v = build::<NamedResourceViolation>("lock poisoned").with_resource_name("wal");
        assert!(v.is_armed());
        assert!(format!("{v:?}").contains("armed: true"));
        std::mem::forget(v);

        let v = build::<Violation>("bad state");
        let moved = v;
        assert!(moved.is_armed());
        std::mem::forget(moved);
    }

    #[test]
    fn debug_lists_payload() {
        let f = build::<AllocationError>("arena full").with_allocation_amount(64);
        let s = format!("{f:?}");
        assert!(s.contains("AllocationError"));
        assert!(s.contains("amount: 64"));
        assert!(!s.contains("resource"));
    }
}
