use std::any::Any;

use utl_states::{State, state_assign_impl};

/// Page-level effect requested by a flow, carried out by the UI shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Navigation {
    #[default]
    Stay,
    /// Reload the current page, e.g. after signing in.
    Reload,
    /// Leave for another path, e.g. `/dashboard` after verifying an account.
    Redirect(String),
}

impl Navigation {
    /// Returns the pending request and resets it to `Stay`.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn is_pending(&self) -> bool {
        *self != Self::Stay
    }
}

impl State for Navigation {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
