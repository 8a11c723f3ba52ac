use std::error::Error;

/// Per-instance record shared by every kind: the message, the cause that
/// led to it and, with `feature = "backtrace"`, where it was built.
pub struct Context {
    pub message:   String,

    // ── Error chain ───────────────────────────────────────────
    pub source:    Option<Box<dyn Error + Send + Sync>>,

    // ── Backtrace ─────────────────────────────────────────────
    #[cfg(feature = "backtrace")]
    pub backtrace: Option<String>,
}

impl Context {
    pub fn new(message: String) -> Self {
        Self {
            message,
            source: None,
            #[cfg(feature = "backtrace")]
            backtrace: None,
        }
    }

    pub fn with_source<E>(mut self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(error));
        self
    }

    /// Honours `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`; a disabled
    /// capture is not stored.
    #[cfg(feature = "backtrace")]
    pub fn capture_backtrace(&mut self) {
        use std::backtrace::{Backtrace, BacktraceStatus};

        if self.backtrace.is_none() {
            let bt = Backtrace::capture();
            if bt.status() == BacktraceStatus::Captured {
                self.backtrace = Some(bt.to_string());
            }
        }
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut d = f.debug_struct("Context");
        d.field("message", &self.message);

        if self.source.is_some() {
            d.field("source", &self.source.as_ref().map(|e| e.to_string()));
        }

        #[cfg(feature = "backtrace")]
        if self.backtrace.is_some() {
            d.field("backtrace", &"<captured>");
        }

        d.finish()
    }
}
