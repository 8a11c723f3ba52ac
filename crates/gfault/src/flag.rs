//! Type-level booleans used to track payload capabilities through
//! synthesis.
//!
//! A kind carries one flag per payload trait. Synthesis ORs the flags of
//! its grade and bases, so a capability reached through two paths is still
//! a single `Yes`. The leaf type stores a payload field only where the flag
//! is `Yes`; elsewhere the slot is `()`.

use core::fmt;

/// Bound shared by every payload value and by the empty slot.
pub trait Field: Default + fmt::Debug + Send + Sync + 'static {}

impl<T: Default + fmt::Debug + Send + Sync + 'static> Field for T {}

pub trait Flag: Send + Sync + 'static {
    const SET: bool;

    /// Storage for a `T` payload: `T` itself when set, `()` otherwise.
    type Slot<T: Field>: Field;

    fn get<T: Field>(slot: &Self::Slot<T>) -> Option<&T>;
}

/// Capability present.
#[derive(Debug)]
pub enum Yes {}

/// Capability absent.
#[derive(Debug)]
pub enum No {}

impl Flag for Yes {
    const SET: bool = true;
    type Slot<T: Field> = T;

    #[inline]
    fn get<T: Field>(slot: &Self::Slot<T>) -> Option<&T> {
        Some(slot)
    }
}

impl Flag for No {
    const SET: bool = false;
    type Slot<T: Field> = ();

    #[inline]
    fn get<T: Field>(_slot: &Self::Slot<T>) -> Option<&T> {
        None
    }
}

/// Type-level disjunction.
pub trait Or<Rhs: Flag>: Flag {
    type Output: Flag;
}

impl<Rhs: Flag> Or<Rhs> for Yes {
    type Output = Yes;
}

impl<Rhs: Flag> Or<Rhs> for No {
    type Output = Rhs;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<F: Flag>() -> bool {
        F::SET
    }

    #[test]
    fn disjunction_table() {
        assert!(set::<<Yes as Or<Yes>>::Output>());
        assert!(set::<<Yes as Or<No>>::Output>());
        assert!(set::<<No as Or<Yes>>::Output>());
        assert!(!set::<<No as Or<No>>::Output>());
    }

    #[test]
    fn absent_slot_is_zero_sized() {
        assert_eq!(core::mem::size_of::<<No as Flag>::Slot<String>>(), 0);
        assert_eq!(
            core::mem::size_of::<<Yes as Flag>::Slot<String>>(),
            core::mem::size_of::<String>()
        );
    }

    #[test]
    fn get_reflects_flag() {
        let present: <Yes as Flag>::Slot<usize> = 7;
        assert_eq!(Yes::get::<usize>(&present), Some(&7));
        assert_eq!(No::get::<usize>(&()), None);
    }
}
