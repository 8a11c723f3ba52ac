/// Synthesize a new failure kind from a grade (or a graded kind) and any
/// number of bases.
///
/// ```rust
/// use gfault::{
///     build, synthesize, CriticalError, IndexOutOfRangeException, NamedResourceException,
///     OutOfRangeCriticalError,
/// };
///
/// synthesize! {
///     /// Pool ran dry for a named resource.
///     pub struct PoolExhausted: CriticalError + NamedResourceException;
/// }
///
/// // Bases may themselves be synthesized, graded kinds.
/// synthesize! {
///     pub struct ShardOutOfRange:
///         CriticalError + OutOfRangeCriticalError + IndexOutOfRangeException;
/// }
///
/// let f = build::<PoolExhausted>("drained").with_resource_name("db-conn");
/// assert!(f.is_a::<NamedResourceException>());
///
/// let f = build::<ShardOutOfRange>("shard").with_range(7, 0, 3);
/// assert!(f.is_a::<OutOfRangeCriticalError>());
/// assert_eq!(f.requested(), 7);
/// ```
///
/// The result:
///
/// - commits to the grade of the first position (`Failure` for capability
///   kinds that sit directly under the root);
/// - is a member of every base and everything they descend from, each
///   exactly once;
/// - carries the union of the bases' payload capabilities.
///
/// Bases of a different grade are rejected at compile time:
///
/// ```compile_fail
/// use gfault::{synthesize, CriticalError, Error};
///
/// synthesize! {
///     pub struct Mixed: Error + CriticalError;
/// }
/// ```
///
/// and so is a graded base under the ungraded root:
///
/// ```compile_fail
/// use gfault::{synthesize, Error, Failure};
///
/// synthesize! {
///     pub struct Rootless: Failure + Error;
/// }
/// ```
///
/// Tagged kinds are rejected in every position; tags are applied to the
/// finished kind with `Tagged<K, T>`:
///
/// ```compile_fail
/// use gfault::{synthesize, Error, NamedResourceError, Tagged};
///
/// enum Primary {}
/// type PrimaryError = Tagged<NamedResourceError, Primary>;
///
/// synthesize! {
///     pub struct Replica: Error + PrimaryError;
/// }
/// ```
///
/// ```compile_fail
/// use gfault::{synthesize, Error, NamedResourceException, Tagged};
///
/// enum Primary {}
/// type PrimaryError = Tagged<Error, Primary>;
///
/// synthesize! {
///     pub struct Replica: PrimaryError + NamedResourceException;
/// }
/// ```
#[macro_export]
macro_rules! synthesize {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $($grade:ident)::+ $(+ $($base:ident)::+)* ;
    ) => {
        $(#[$meta])*
        $vis enum $name {}

        const _: () = {
            type __Grade = $($grade)::+;

            assert!(
                !<__Grade as $crate::Facet>::TAGGED,
                "tags do not compose; synthesize from the untagged kind"
            );
            $(
                assert!(
                    $crate::Grade::admits(
                        <__Grade as $crate::Facet>::GRADE,
                        <$($base)::+ as $crate::Facet>::GRADE,
                    ),
                    "synthesized kind mixes two grades"
                );
                assert!(
                    !<$($base)::+ as $crate::Facet>::TAGGED,
                    "tags do not compose; synthesize from the untagged kind"
                );
            )*
        };

        impl $crate::Target for $name {
            type Resource = $crate::__any_flag!(Resource; $($grade)::+ $(, $($base)::+)*);
            type Range = $crate::__any_flag!(Range; $($grade)::+ $(, $($base)::+)*);
            type Amount = $crate::__any_flag!(Amount; $($grade)::+ $(, $($base)::+)*);
            type Tag = ();

            fn admit(
                lineage: &$crate::Lineage,
                _tag: ::core::option::Option<$crate::TagId>,
            ) -> ::core::option::Option<()> {
                lineage.contains($crate::KindId::of::<Self>()).then_some(())
            }
        }

        impl $crate::Facet for $name {
            const GRADE: ::core::option::Option<$crate::Grade> =
                <$($grade)::+ as $crate::Facet>::GRADE;

            fn lineage() -> &'static $crate::Lineage {
                static LINEAGE: ::std::sync::OnceLock<$crate::Lineage> = ::std::sync::OnceLock::new();
                LINEAGE.get_or_init(|| {
                    $crate::Lineage::compose::<Self>(
                        <Self as $crate::Facet>::GRADE,
                        &[
                            <$($grade)::+ as $crate::Facet>::lineage(),
                            $( <$($base)::+ as $crate::Facet>::lineage(), )*
                        ],
                    )
                })
            }
        }

        impl $crate::Kind for $name {
            type Grade = <$($grade)::+ as $crate::Kind>::Grade;
        }

        impl $crate::Untagged for $name {}
    };
}

/// Fold one payload flag over a list of facets with type-level OR.
#[doc(hidden)]
#[macro_export]
macro_rules! __any_flag {
    ($flag:ident; $only:ty) => {
        <$only as $crate::Target>::$flag
    };
    ($flag:ident; $first:ty, $($rest:ty),+) => {
        <<$first as $crate::Target>::$flag as $crate::flag::Or<$crate::__any_flag!($flag; $($rest),+)>>::Output
    };
}

/// Build a `Fault` of the given kind with a formatted message.
///
/// ```ignore
/// return Err(fault!(NamedResourceError, "cannot open {}", path));
/// ```
#[macro_export]
macro_rules! fault {
    ($kind:ty, $($arg:tt)+) => {
        $crate::Fault::from($crate::build::<$kind>(::std::format!($($arg)+)))
    };
}

/// Early-return a `Fault` if a condition is false.
///
/// ```ignore
/// ensure!(slot < len, OutOfRangeError, "slot {} past {}", slot, len);
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ty, $($arg:tt)+) => {
        if !$cond {
            return ::core::result::Result::Err($crate::fault!($kind, $($arg)+).into());
        }
    };
}

/// Dispatch on the first target a failure satisfies.
///
/// Arms are tried in order, so list specific kinds before the grades they
/// belong to. The trailing `_` arm is required.
///
/// ```ignore
/// match_fault!(fault, {
///     Tagged<NamedResourceError, Primary> => "fail over",
///     NamedResourceError                  => "reopen",
///     Error                               => "report",
///     _                                   => "propagate",
/// })
/// ```
#[macro_export]
macro_rules! match_fault {
    ($fault:expr, { $($arms:tt)+ }) => {{
        let __fault = &$fault;
        $crate::__match_fault_arms!(__fault; $($arms)+)
    }};
}

/// Internal helper for match_fault!: peels one arm at a time.
#[doc(hidden)]
#[macro_export]
macro_rules! __match_fault_arms {
    ($fault:ident; _ => $default:expr $(,)?) => {
        $default
    };

    ($fault:ident; $target:ty => $handler:expr, $($rest:tt)+) => {
        if $fault.is_a::<$target>() {
            $handler
        } else {
            $crate::__match_fault_arms!($fault; $($rest)+)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        build, AnyTagged, CriticalError, Error, Failure, Fault, FaultResult, Kind, NamedResourceError,
        NamedResourceException, Tagged, Target, Violation,
    };
    use crate::flag::{Flag, Yes};

    synthesize! {
        /// Test-only kind with two grade-carrying ancestries.
        pub struct ReplicaLost: CriticalError + NamedResourceException;
    }

    enum Primary {}

    fn has_resource<T: Target>() -> bool {
        <T::Resource as Flag>::SET
    }

    #[test]
    fn synthesized_kind_carries_capabilities() {
        assert!(has_resource::<ReplicaLost>());
        assert!(!<<ReplicaLost as Target>::Amount as Flag>::SET);
        let _proof: Option<<ReplicaLost as Target>::Resource> = None::<Yes>;
    }

    #[test]
    fn synthesized_kind_takes_first_grade() {
        assert_eq!(<ReplicaLost as crate::Facet>::GRADE, Some(crate::Grade::CriticalError));
        assert_eq!(<ReplicaLost as Kind>::BRIDGE, Some(crate::HostBridge::Generic));
    }

    #[test]
    fn fault_macro_formats() {
        let f = fault!(Error, "slot {} missing", 3);
        assert_eq!(f.message(), "slot 3 missing");
        assert!(f.is_a::<Error>());
    }

    #[test]
    fn ensure_passes_and_fails() {
        fn check(n: usize) -> FaultResult<usize> {
            ensure!(n < 4, Error, "{} out of range", n);
            Ok(n)
        }
        assert_eq!(check(2).ok(), Some(2));
        let e = check(9).unwrap_err();
        assert_eq!(e.message(), "9 out of range");
    }

    #[test]
    fn match_fault_first_arm_wins() {
        let f: Fault = build::<Tagged<NamedResourceError, Primary>>("gone").into();
        let route = match_fault!(f, {
            Tagged<NamedResourceError, Primary> => "fail over",
            NamedResourceError => "reopen",
            Error => "report",
            _ => "propagate",
        });
        assert_eq!(route, "fail over");
    }

    #[test]
    fn match_fault_falls_through() {
        let f: Fault = build::<NamedResourceError>("gone").into();
        let route = match_fault!(f, {
            AnyTagged<Error> => "tagged",
            CriticalError => "critical",
            Failure => "anything",
            _ => "nothing",
        });
        assert_eq!(route, "anything");
    }

    #[test]
    fn match_fault_default() {
        let f = build::<Error>("x");
        let route = match_fault!(f, {
            Violation => "abort",
            _ => "default",
        });
        assert_eq!(route, "default");
    }
}
