//! Island re-activation hook.

use std::fmt;
use std::sync::Arc;

/// Optional zero-argument callback that re-initializes interactive
/// components after the body has been replaced.
///
/// The host registers it once at startup. No hook is a valid state:
/// re-activation is then skipped.
#[derive(Clone, Default)]
pub struct HydrateHook(Option<Arc<dyn Fn() + Send + Sync>>);

impl HydrateHook {
    pub fn new(hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(hook)))
    }

    pub const fn none() -> Self {
        Self(None)
    }

    pub fn is_registered(&self) -> bool {
        self.0.is_some()
    }

    /// Run the hook if one is registered. Returns whether it ran.
    pub fn invoke(&self) -> bool {
        match &self.0 {
            Some(hook) => {
                hook();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for HydrateHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HydrateHook")
            .field(&if self.is_registered() { "registered" } else { "none" })
            .finish()
    }
}
