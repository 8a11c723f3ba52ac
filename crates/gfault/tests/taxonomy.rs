//! Classification properties of built failures.

use std::error::Error as StdError;
use std::io;

use gfault::{
    build, synthesize, AllocationError, AnyTagged, Condition, CriticalError, Error, Failure, Fault,
    Grade, HostBridge, IndexOutOfRangeError, IndexOutOfRangeException, Kind, NamedResourceCriticalError,
    NamedResourceException, Notification, OutOfRangeException, Tagged, TagId, Violation,
};

enum Alpha {}
enum Beta {}

synthesize! {
    pub struct PoolExhausted: CriticalError + NamedResourceException;
}

synthesize! {
    /// Two ancestries, both reaching `Failure`.
    pub struct SlotRangeError: Error + IndexOutOfRangeException + OutOfRangeException;
}

macro_rules! tagged_grade_properties {
    ($($name:ident: $grade:ty),+ $(,)?) => {
        $(
            #[test]
            fn $name() {
                let f: Fault = build::<Tagged<$grade, Alpha>>("tagged").into();
                assert!(f.is_a::<$grade>());
                assert!(f.is_a::<Failure>());
                assert!(f.is_a::<AnyTagged<$grade>>());
                assert!(f.is_a::<AnyTagged<Failure>>());
                assert!(f.is_a::<Tagged<$grade, Alpha>>());
                assert!(f.is_a::<Tagged<Failure, Alpha>>());
                assert!(!f.is_a::<Tagged<$grade, Beta>>());
                assert_eq!(f.tag(), Some(TagId::of::<Alpha>()));
                assert_eq!(
                    f.cast::<AnyTagged<$grade>>().map(|v| v.tag()).ok(),
                    Some(TagId::of::<Alpha>())
                );
                assert!(f.cast::<Tagged<$grade, Beta>>().is_err());
            }
        )+
    };
}

tagged_grade_properties! {
    tagged_condition: Condition,
    tagged_notification: Notification,
    tagged_error: Error,
    tagged_critical_error: CriticalError,
}

#[test]
fn tagged_violation() {
    let f: Fault = build::<Tagged<Violation, Alpha>>("tagged").into();
    assert!(f.is_a::<Violation>());
    assert!(f.is_a::<AnyTagged<Violation>>());
    assert!(!f.is_a::<Tagged<Violation, Beta>>());
    assert_eq!(f.tag(), Some(TagId::of::<Alpha>()));
    std::mem::forget(f);
}

#[test]
fn tagged_instance_satisfies_its_own_kind() {
    let f: Fault = build::<Tagged<PoolExhausted, Alpha>>("drained")
        .with_resource_name("db-conn")
        .into();
    assert!(f.is_a::<Tagged<PoolExhausted, Alpha>>());
    assert!(f.is_a::<Tagged<NamedResourceException, Alpha>>());
    assert!(f.is_a::<Tagged<CriticalError, Alpha>>());
    assert_eq!(
        f.cast::<Tagged<PoolExhausted, Alpha>>().map(|v| v.resource_name()).ok(),
        Some("db-conn")
    );
    assert!(f.downcast::<Tagged<PoolExhausted, Alpha>>().is_ok());
}

#[test]
fn payload_accessors_return_constructed_values() {
    let f = build::<AllocationError>("arena full").with_allocation_amount(4096);
    assert_eq!(f.allocation_amount(), 4096);

    let f = build::<IndexOutOfRangeError>("slot").with_range(12, 0, 9);
    assert_eq!((f.requested(), f.lower_bound(), f.upper_bound()), (12, 0, 9));

    let f: Fault = build::<PoolExhausted>("drained").with_resource_name("db-conn-4").into();
    assert_eq!(f.resource_name(), Some("db-conn-4"));
    assert_eq!(f.cast::<NamedResourceException>().unwrap().resource_name(), "db-conn-4");
}

#[test]
fn index_out_of_range_error_bridges_to_host() {
    let f = build::<IndexOutOfRangeError>("index 12 outside 0..=9").with_range(12, 0, 9);
    assert!(f.is_a::<Error>());
    assert_eq!(f.bridge(), Some(HostBridge::OutOfRange));

    let host: &dyn StdError = &f;
    assert_eq!(host.to_string(), f.message());

    let io: io::Error = f.into();
    assert_eq!(io.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(io.to_string(), "index 12 outside 0..=9");
}

#[test]
fn convergent_ancestry_is_shared() {
    let lineage = <SlotRangeError as gfault::Facet>::lineage();
    let failures = lineage
        .ancestors()
        .iter()
        .filter(|id| **id == gfault::KindId::of::<Failure>())
        .count();
    assert_eq!(failures, 1);

    let f: Fault = build::<SlotRangeError>("slot").with_range(3, 4, 8).into();
    let root = f.cast::<Failure>().unwrap();
    assert_eq!(root.grade(), Grade::Error);
    assert_eq!(root.message(), "slot");
    assert_eq!(<SlotRangeError as Kind>::BRIDGE, Some(HostBridge::OutOfRange));
}

#[test]
fn named_resource_round_trip() {
    let f = build::<NamedResourceCriticalError>("connection pool exhausted")
        .with_resource_name("db-conn-17");
    assert_eq!(f.resource_name(), "db-conn-17");
    assert_eq!(f.message(), "connection pool exhausted");
    assert!(f.is_a::<CriticalError>());
    assert!(!f.is_a::<Error>());

    let f: Fault = build::<PoolExhausted>("connection pool exhausted")
        .with_resource_name("db-conn-17")
        .into();
    assert_eq!(f.resource_name(), Some("db-conn-17"));
    assert_eq!(f.message(), "connection pool exhausted");
    assert!(f.is_a::<CriticalError>());
    assert!(!f.is_a::<Error>());
}

#[test]
fn only_error_grades_reach_generic_handlers() {
    fn generic(e: Box<dyn StdError + Send + Sync>) -> String {
        e.to_string()
    }

    let f: Fault = build::<CriticalError>("teardown").into();
    assert_eq!(generic(f.into_host().unwrap()), "teardown");

    let f: Fault = build::<Notification>("wake").into();
    assert!(f.into_host().is_err());
}
