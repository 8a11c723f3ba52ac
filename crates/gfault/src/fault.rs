use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::bridge::HostBridge;
use crate::grade::{Grade, Graded, Recovery};
use crate::id::TagId;
use crate::kind::{Kind, Lineage, Target};
use crate::payload::IndexRange;
use crate::thrown::Thrown;
use crate::view::{Ref, Throwable};

/// An owned failure of any kind.
///
/// This is what propagates through `?`. Handlers inspect it through the
/// taxonomy (`grade`, `is_a`, `cast`) or get the original `Thrown<K>` back
/// with `downcast`.
///
/// `Fault` does not implement `std::error::Error` itself, since a Violation
/// must never be mistaken for something a generic handler may swallow. Use
/// `host_error` / `into_host` to reach the host view of Error-or-deeper
/// instances.
pub struct Fault {
    inner: Box<dyn Throwable>,
}

/// Convenience Result alias.
pub type FaultResult<T> = Result<T, Fault>;

impl<K> From<Thrown<K>> for Fault
where
    K: Kind,
    K::Grade: Graded,
{
    fn from(thrown: Thrown<K>) -> Self {
        Self { inner: Box::new(thrown) }
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl Fault {
    #[inline]
    pub fn message(&self) -> &str {
        self.inner.message()
    }

    #[inline]
    pub fn grade(&self) -> Grade {
        self.inner.grade()
    }

    #[inline]
    pub fn recovery(&self) -> Recovery {
        self.inner.grade().recovery()
    }

    #[inline]
    pub fn tag(&self) -> Option<TagId> {
        self.inner.tag()
    }

    #[inline]
    pub fn lineage(&self) -> &'static Lineage {
        self.inner.lineage()
    }

    /// Short name of the materialized kind.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        self.inner.lineage().name()
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.inner.resource_name()
    }

    pub fn index_range(&self) -> Option<IndexRange> {
        self.inner.index_range()
    }

    pub fn allocation_amount(&self) -> Option<usize> {
        self.inner.allocation_amount()
    }

    pub fn bridge(&self) -> Option<HostBridge> {
        self.inner.bridge()
    }

    pub fn is_armed(&self) -> bool {
        self.inner.is_armed()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.cause()
    }

    #[inline]
    pub fn as_throwable(&self) -> &dyn Throwable {
        &*self.inner
    }
}

// ── Queries ───────────────────────────────────────────────────────

impl Fault {
    pub fn is_a<T: Target>(&self) -> bool {
        self.inner.is_a::<T>()
    }

    pub fn cast<T: Target>(&self) -> FaultResult<Ref<'_, T>> {
        self.inner.cast::<T>()
    }

    /// Recover the exact `Thrown<K>` this fault was built as.
    pub fn downcast<K>(self) -> Result<Thrown<K>, Fault>
    where
        K: Kind,
        K::Grade: Graded,
    {
        // `into_any` consumes the box, so a mismatch must be caught before
        // it to hand the fault back intact.
        if !self.inner.as_any().is::<Thrown<K>>() {
            return Err(self);
        }
        match self.inner.into_any().downcast::<Thrown<K>>() {
            Ok(thrown) => Ok(*thrown),
            Err(_) => unreachable!("`is::<Thrown<K>>` held for the same box"),
        }
    }

    pub fn downcast_ref<K>(&self) -> Option<&Thrown<K>>
    where
        K: Kind,
        K::Grade: Graded,
    {
        self.inner.as_any().downcast_ref::<Thrown<K>>()
    }
}

// ── Host bridge ───────────────────────────────────────────────────

impl Fault {
    /// Host view, present on every Error-or-deeper instance.
    pub fn host_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.host_error()
    }

    pub fn into_host(self) -> Result<Box<dyn StdError + Send + Sync>, Fault> {
        self.inner.into_host().map_err(|inner| Fault { inner })
    }

    /// Last resort for the outermost Violation handler, once persistent
    /// state is sanitized.
    pub fn terminate(self) -> ! {
        tracing::error!(
            kind = self.kind_name(),
            grade = %self.grade(),
            message = self.message(),
            "terminating on unrecoverable failure"
        );
        std::process::abort()
    }
}

impl From<Fault> for io::Error {
    /// Bridged grades keep their `io::ErrorKind`; the rest surface as
    /// `Other` with the message. A Violation is still dropped here, so it
    /// still aborts.
    fn from(fault: Fault) -> Self {
        let kind = fault.bridge().map_or(io::ErrorKind::Other, HostBridge::io_kind);
        match fault.into_host() {
            Ok(host) => io::Error::new(kind, host),
            Err(fault) => io::Error::new(kind, fault.message().to_owned()),
        }
    }
}

// ── Formatting ────────────────────────────────────────────────────

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::{Condition, CriticalError, Error, Failure, Notification};
    use crate::kind::Tagged;
    use crate::payload::{AllocationError, FinishedCondition, NamedResourceCriticalError};

    enum Shard {}

    #[test]
    fn accessors_forward() {
        let f: Fault = build_named();
        assert_eq!(f.message(), "connection pool exhausted");
        assert_eq!(f.grade(), Grade::CriticalError);
        assert_eq!(f.recovery(), Recovery::DiscardUnitOfWork);
        assert_eq!(f.kind_name(), "NamedResourceCriticalError");
        assert_eq!(f.resource_name(), Some("db-conn-17"));
        assert_eq!(f.tag(), None);
        assert_eq!(f.to_string(), "connection pool exhausted");
    }

    fn build_named() -> Fault {
        crate::build::<NamedResourceCriticalError>("connection pool exhausted")
            .with_resource_name("db-conn-17")
            .into()
    }

    #[test]
    fn downcast_exact_kind() {
        let f = build_named();
        assert!(f.downcast_ref::<CriticalError>().is_none());
        let f = f.downcast::<CriticalError>().unwrap_err();
        let thrown = f.downcast::<NamedResourceCriticalError>().unwrap();
        assert_eq!(thrown.resource_name(), "db-conn-17");
    }

    #[test]
    fn failed_downcast_hands_back_the_same_fault() {
        let f: Fault = crate::build::<Tagged<NamedResourceCriticalError, Shard>>("replica lost")
            .with_resource_name("db-conn-3")
            .into();
        let f = f.downcast::<NamedResourceCriticalError>().unwrap_err();
        assert_eq!(f.message(), "replica lost");
        assert_eq!(f.resource_name(), Some("db-conn-3"));
        assert_eq!(f.tag(), Some(TagId::of::<Shard>()));
        let thrown = f.downcast::<Tagged<NamedResourceCriticalError, Shard>>().unwrap();
        assert_eq!(thrown.resource_name(), "db-conn-3");
    }

    #[test]
    fn tagged_fault_keeps_tag() {
        let f: Fault = crate::build::<Tagged<Error, Shard>>("rebalance").into();
        assert_eq!(f.tag(), Some(TagId::of::<Shard>()));
        assert!(f.is_a::<Tagged<Failure, Shard>>());
    }

    #[test]
    fn host_view_only_for_error_grades() {
        let f: Fault = crate::build::<Error>("x").into();
        assert_eq!(f.host_error().map(|e| e.to_string()).as_deref(), Some("x"));

        let f: Fault = crate::build::<Notification>("wake").into();
        assert!(f.host_error().is_none());
        let f = f.into_host().unwrap_err();
        assert_eq!(f.message(), "wake");

        let f: Fault = crate::build::<FinishedCondition>("eof").into();
        assert!(f.is_a::<Condition>());
        assert!(f.into_host().is_err());
    }

    #[test]
    fn into_io_error() {
        let f: Fault = crate::build::<AllocationError>("arena").with_allocation_amount(64).into();
        let e: io::Error = f.into();
        assert_eq!(e.kind(), io::ErrorKind::OutOfMemory);

        let f: Fault = crate::build::<Notification>("wake").into();
        let e: io::Error = f.into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
        assert_eq!(e.to_string(), "wake");
    }
}
