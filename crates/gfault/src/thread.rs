//! Thread entry policy.
//!
//! A thread's top-level closure returns `FaultResult<T>`; `entry` applies
//! the grade policy to whatever escapes it:
//!
//! - Notification: absorbed, the thread ends quietly with `Ok(None)`;
//! - Violation: the process terminates;
//! - anything else: handed to the joiner.

use std::io;
use std::thread::{self, JoinHandle};

use crate::fault::FaultResult;
use crate::grade::Grade;

/// Run `f` under the thread entry policy.
///
/// ```
/// use gfault::{build, thread, Fault, Notification};
///
/// let out = thread::entry(|| -> Result<u32, Fault> {
///     Err(build::<Notification>("shutdown requested").into())
/// });
/// assert!(matches!(out, Ok(None)));
/// ```
pub fn entry<T, F>(f: F) -> FaultResult<Option<T>>
where
    F: FnOnce() -> FaultResult<T>,
{
    let fault = match f() {
        Ok(value) => return Ok(Some(value)),
        Err(fault) => fault,
    };

    let current = thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    match fault.grade() {
        Grade::Notification => {
            tracing::debug!(
                thread = name,
                kind = fault.kind_name(),
                message = fault.message(),
                "notification absorbed at thread entry"
            );
            Ok(None)
        }
        Grade::Violation => fault.terminate(),
        _ => {
            tracing::warn!(
                thread = name,
                kind = fault.kind_name(),
                grade = %fault.grade(),
                message = fault.message(),
                "failure escaped thread entry"
            );
            Err(fault)
        }
    }
}

/// Spawn a named OS thread whose body runs under [`entry`].
pub fn spawn<T, F>(name: impl Into<String>, f: F) -> io::Result<JoinHandle<FaultResult<Option<T>>>>
where
    F: FnOnce() -> FaultResult<T> + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new().name(name.into()).spawn(move || entry(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::{CriticalError, Error, Notification};
    use crate::payload::{FinishedCondition, NamedResourceNotification};
    use crate::{build, Fault};

    #[test]
    fn value_passes_through() {
        assert_eq!(entry(|| Ok::<_, Fault>(7)).ok().flatten(), Some(7));
    }

    #[test]
    fn notification_is_absorbed() {
        let out = entry(|| -> FaultResult<()> {
            Err(build::<NamedResourceNotification>("drain").with_resource_name("db-conn-2").into())
        });
        assert!(matches!(out, Ok(None)));
    }

    #[test]
    fn errors_reach_the_joiner() {
        let handle = spawn("worker-1", || -> FaultResult<()> {
            Err(build::<CriticalError>("client gone").into())
        })
        .unwrap();
        let fault = handle.join().unwrap().unwrap_err();
        assert!(fault.is_a::<CriticalError>());

        let out = entry(|| -> FaultResult<()> { Err(build::<Error>("x").into()) });
        assert!(out.is_err());
    }

    #[test]
    fn escaped_condition_is_not_swallowed() {
        let out = entry(|| -> FaultResult<()> { Err(build::<FinishedCondition>("eof").into()) });
        assert!(out.unwrap_err().is_a::<crate::Condition>());
    }

    #[test]
    fn notification_in_spawned_thread_ends_only_that_thread() {
        let handle = spawn("listener", || -> FaultResult<u8> {
            Err(build::<Notification>("stop").into())
        })
        .unwrap();
        assert!(matches!(handle.join().unwrap(), Ok(None)));
    }
}
