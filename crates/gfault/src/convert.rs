use std::error::Error as StdError;
use std::io;

use crate::fault::{Fault, FaultResult};
use crate::flag::Yes;
use crate::grade::{Error, Graded};
use crate::kind::Kind;
use crate::payload::AllocationError;
use crate::thrown::build;

synthesize! {
    /// An `io::Error` that reached the taxonomy without a more specific kind.
    pub struct IoError: Error;
}

// ── From<io::Error> ───────────────────────────────────────────────

impl From<io::Error> for Fault {
    /// `OutOfMemory` becomes an `AllocationError` (amount unknown, so 0);
    /// everything else an `IoError`. The original is kept as the source.
    fn from(err: io::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            io::ErrorKind::OutOfMemory => build::<AllocationError>(message).with_source(err).into(),
            _ => build::<IoError>(message).with_source(err).into(),
        }
    }
}

// ── ResultExt: attach a kind on propagation ───────────────────────

/// Extension trait for raising any `Result` as a taxonomy kind.
///
/// ```
/// use gfault::{FaultResult, NamedResourceError, ResultExt};
///
/// fn load(path: &str) -> FaultResult<Vec<u8>> {
///     std::fs::read(path).or_raise_named::<NamedResourceError>("cannot read pool config", path)
/// }
///
/// let err = load("/nonexistent/pool.toml").unwrap_err();
/// assert_eq!(err.resource_name(), Some("/nonexistent/pool.toml"));
/// assert!(err.cause().is_some());
/// ```
pub trait ResultExt<T> {
    /// Replace the error with a `K` carrying `msg`, keeping it as source.
    fn or_raise<K>(self, msg: &str) -> FaultResult<T>
    where
        K: Kind,
        K::Grade: Graded;

    /// As `or_raise`, also recording the resource involved.
    fn or_raise_named<K>(self, msg: &str, resource: &str) -> FaultResult<T>
    where
        K: Kind<Resource = Yes>,
        K::Grade: Graded;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn or_raise<K>(self, msg: &str) -> FaultResult<T>
    where
        K: Kind,
        K::Grade: Graded,
    {
        self.map_err(|e| build::<K>(msg).with_source(e).into())
    }

    fn or_raise_named<K>(self, msg: &str, resource: &str) -> FaultResult<T>
    where
        K: Kind<Resource = Yes>,
        K::Grade: Graded,
    {
        self.map_err(|e| {
            build::<K>(msg)
                .with_resource_name(resource)
                .with_source(e)
                .into()
        })
    }
}
