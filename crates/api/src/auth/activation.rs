//! Post-activation hooks.
//!
//! Side effects of the pending-to-active transition (welcome logging,
//! cache warmup, future integrations) are registered as an explicit ordered
//! list at startup and invoked synchronously after the flag flips, instead
//! of going through any process-wide event dispatch. Order of registration
//! is order of invocation.

use medialog_db::models::user::User;

/// A single hook invoked with the freshly activated user row.
pub type ActivationHook = Box<dyn Fn(&User) + Send + Sync>;

/// Ordered hook list run after every successful activation.
#[derive(Default)]
pub struct ActivationHooks {
    hooks: Vec<ActivationHook>,
}

impl ActivationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Hooks run in registration order.
    pub fn push(&mut self, hook: ActivationHook) {
        self.hooks.push(hook);
    }

    /// Invoke all hooks synchronously, in order.
    pub fn run(&self, user: &User) {
        for hook in &self.hooks {
            hook(user);
        }
    }
}
