//! Host error compatibility.
//!
//! Error and CriticalError instances implement `std::error::Error`, so a
//! handler that knows nothing about grades (`Box<dyn Error>`, `io::Error`,
//! `?` into a foreign result type) still sees the message. Which host error
//! they stand in for is decided once per kind by `Kind::BRIDGE`:
//!
//! | Kind                           | Bridge        | `io::ErrorKind`  |
//! |--------------------------------|---------------|------------------|
//! | Error + allocation amount      | `OutOfMemory` | `OutOfMemory`    |
//! | Error + index range            | `OutOfRange`  | `InvalidInput`   |
//! | any other Error, CriticalError | `Generic`     | `Other`          |
//! | Condition, Notification, Violation | none      |                  |

use std::error::Error as StdError;
use std::io;

use crate::grade::{Grade, HostBridged};
use crate::kind::Kind;
use crate::thrown::Thrown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostBridge {
    OutOfMemory,
    OutOfRange,
    Generic,
}

impl HostBridge {
    /// Bridge for a kind of the given grade and payload capabilities.
    /// Allocation wins over range when a kind carries both.
    pub const fn select(grade: Option<Grade>, allocation: bool, range: bool) -> Option<Self> {
        match grade {
            Some(Grade::Error) if allocation => Some(HostBridge::OutOfMemory),
            Some(Grade::Error) if range => Some(HostBridge::OutOfRange),
            Some(Grade::Error) | Some(Grade::CriticalError) => Some(HostBridge::Generic),
            _ => None,
        }
    }

    pub const fn io_kind(self) -> io::ErrorKind {
        match self {
            HostBridge::OutOfMemory => io::ErrorKind::OutOfMemory,
            HostBridge::OutOfRange => io::ErrorKind::InvalidInput,
            HostBridge::Generic => io::ErrorKind::Other,
        }
    }
}

impl<K> StdError for Thrown<K>
where
    K: Kind,
    K::Grade: HostBridged,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.context()
            .source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

// ── Into<io::Error> ───────────────────────────────────────────────

impl<K> From<Thrown<K>> for io::Error
where
    K: Kind,
    K::Grade: HostBridged,
{
    /// Wraps the instance, mapping its bridge onto an `io::ErrorKind`.
    fn from(thrown: Thrown<K>) -> Self {
        let kind = K::BRIDGE.map_or(io::ErrorKind::Other, HostBridge::io_kind);
        io::Error::new(kind, thrown)
    }
}
