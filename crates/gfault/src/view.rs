//! Erased failures and typed views over them.
//!
//! `Throwable` is what every `Thrown<K>` looks like once its kind is
//! forgotten. Queries go through the interned lineage, so asking about a
//! kind reached through two bases is as cheap and as unambiguous as asking
//! about one reached directly.
//!
//! A successful `cast::<T>()` yields a `Ref<T>`: a borrowed view whose
//! accessors are exactly those `T` guarantees.
//!
//! ```
//! use gfault::{build, AnyTagged, Fault, NamedResourceCriticalError, Tagged};
//!
//! enum Primary {}
//!
//! let fault: Fault = build::<Tagged<NamedResourceCriticalError, Primary>>("replica lost")
//!     .with_resource_name("db-conn-17")
//!     .into();
//!
//! let view = fault.cast::<AnyTagged<NamedResourceCriticalError>>().unwrap();
//! assert_eq!(view.resource_name(), "db-conn-17");
//! assert_eq!(view.tag().name, "Primary");
//!
//! let err = fault.cast::<AnyTagged<gfault::Error>>().unwrap_err();
//! assert!(err.is_a::<gfault::BadCastError>());
//! ```

use core::any::{type_name, Any};
use core::fmt;
use core::marker::PhantomData;
use std::error::Error as StdError;

use crate::bridge::HostBridge;
use crate::fault::{Fault, FaultResult};
use crate::flag::Yes;
use crate::grade::{Error, Grade};
use crate::id::{short_name, TagId};
use crate::kind::{Lineage, Target};
use crate::payload::IndexRange;
use crate::thrown::build;

/// A failure with its kind erased.
pub trait Throwable: fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn message(&self) -> &str;
    fn grade(&self) -> Grade;
    fn lineage(&self) -> &'static Lineage;
    fn tag(&self) -> Option<TagId>;

    fn resource_name(&self) -> Option<&str>;
    fn index_range(&self) -> Option<IndexRange>;
    fn allocation_amount(&self) -> Option<usize>;

    fn bridge(&self) -> Option<HostBridge>;
    fn is_armed(&self) -> bool;
    fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)>;

    /// `Some` for every Error-or-deeper instance.
    fn host_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)>;

    /// Hand the instance to host-level error handling, or get it back
    /// when its grade does not bridge.
    fn into_host(self: Box<Self>) -> Result<Box<dyn StdError + Send + Sync>, Box<dyn Throwable>>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl dyn Throwable {
    pub fn is_a<T: Target>(&self) -> bool {
        T::admit(self.lineage(), self.tag()).is_some()
    }

    pub fn cast<T: Target>(&self) -> FaultResult<Ref<'_, T>> {
        Ref::new(self)
    }
}

synthesize! {
    /// A `cast` asked for a view the instance does not implement.
    pub struct BadCastError: Error;
}

/// Borrowed view of a failure as `T`.
pub struct Ref<'a, T: Target> {
    fault:   &'a dyn Throwable,
    tag:     T::Tag,
    _target: PhantomData<fn() -> T>,
}

impl<'a, T: Target> Ref<'a, T> {
    pub(crate) fn new(fault: &'a dyn Throwable) -> FaultResult<Self> {
        match T::admit(fault.lineage(), fault.tag()) {
            Some(tag) => Ok(Self { fault, tag, _target: PhantomData }),
            None => Err(Fault::from(build::<BadCastError>(format!(
                "`{}` is not a `{}`",
                fault.lineage().name(),
                short_name(type_name::<T>()),
            )))),
        }
    }

    #[inline]
    pub fn message(&self) -> &'a str {
        self.fault.message()
    }

    #[inline]
    pub fn grade(&self) -> Grade {
        self.fault.grade()
    }

    #[inline]
    pub fn lineage(&self) -> &'static Lineage {
        self.fault.lineage()
    }

    /// The underlying erased failure.
    #[inline]
    pub fn throwable(&self) -> &'a dyn Throwable {
        self.fault
    }

    pub fn is_a<U: Target>(&self) -> bool {
        self.fault.is_a::<U>()
    }

    pub fn cast<U: Target>(&self) -> FaultResult<Ref<'a, U>> {
        Ref::new(self.fault)
    }
}

impl<'a, T: Target<Tag = TagId>> Ref<'a, T> {
    /// Present only on tagged views.
    #[inline]
    pub fn tag(&self) -> TagId {
        self.tag
    }
}

impl<'a, T: Target<Resource = Yes>> Ref<'a, T> {
    pub fn resource_name(&self) -> &'a str {
        self.fault.resource_name().unwrap_or_default()
    }
}

impl<'a, T: Target<Range = Yes>> Ref<'a, T> {
    pub fn index_range(&self) -> IndexRange {
        self.fault.index_range().unwrap_or_default()
    }

    pub fn requested(&self) -> usize {
        self.index_range().requested
    }

    pub fn lower_bound(&self) -> usize {
        self.index_range().lower_bound
    }

    pub fn upper_bound(&self) -> usize {
        self.index_range().upper_bound
    }
}

impl<'a, T: Target<Amount = Yes>> Ref<'a, T> {
    pub fn allocation_amount(&self) -> usize {
        self.fault.allocation_amount().unwrap_or_default()
    }
}

impl<T: Target> Clone for Ref<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Target> Copy for Ref<'_, T> {}

impl<T: Target> fmt::Debug for Ref<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("as", &short_name(type_name::<T>()))
            .field("fault", &self.fault)
            .finish()
    }
}
