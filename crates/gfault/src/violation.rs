/// Exactly-once termination guard carried by every Violation instance.
///
/// A token is active from construction. Moving it moves the obligation;
/// `transfer` hands it off from behind a `&mut`, leaving the source
/// inactive. Dropping an active token logs and aborts the process. There
/// is no `Clone`: one failure event, one active token.
pub struct ViolationToken {
    active: bool,
    origin: &'static str,
}

impl ViolationToken {
    pub fn new(origin: &'static str) -> Self {
        Self { active: true, origin }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Kind name of the failure this token guards.
    #[inline]
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    /// Move the obligation into a new token and deactivate `self`.
    pub fn transfer(&mut self) -> Self {
        let active = core::mem::replace(&mut self.active, false);
        Self { active, origin: self.origin }
    }
}

impl Drop for ViolationToken {
    fn drop(&mut self) {
        if self.active {
            tracing::error!(origin = self.origin, "violation dropped without hand-off, aborting");
            std::process::abort();
        }
    }
}

impl core::fmt::Debug for ViolationToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViolationToken")
            .field("origin", &self.origin)
            .field("active", &self.active)
            .finish()
    }
}
