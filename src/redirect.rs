//! Redirects: configured pipeline entries
//!
//! A [`Redirect`] pairs a handler with the constraint deciding which calls
//! it applies to, an order weight, and flags read by the repository and the
//! strict validator. Redirects are immutable once built; configuration only
//! ever inserts new ones or resets the plan.
//!
//! # Example
//!
//! ```ignore
//! let redirect = Redirect::build(handler)
//!     .constraint(CallConstraint::structural("get", vec![ArgMatcher::Any]))
//!     .order_weight(10)
//!     .finish();
//! ```

use crate::constraint::CallConstraint;
use crate::handler::CallHandler;
use std::sync::Arc;

/// One configured entry in a redirect plan.
#[derive(Clone)]
pub struct Redirect {
    handler: Arc<dyn CallHandler>,
    constraint: CallConstraint,
    order_weight: i32,
    exempt_from_strict: bool,
    persistent: bool,
}

impl Redirect {
    /// Start building a redirect around a handler. Defaults: matches every
    /// call, order weight 0, participates in strict satisfaction, removed
    /// by reset.
    pub fn build(handler: impl CallHandler + 'static) -> RedirectBuilder {
        RedirectBuilder {
            handler: Arc::new(handler),
            constraint: CallConstraint::Always,
            order_weight: 0,
            exempt_from_strict: false,
            persistent: false,
        }
    }

    /// The handler invoked when this redirect is selected.
    pub fn handler(&self) -> &Arc<dyn CallHandler> {
        &self.handler
    }

    /// The constraint deciding which calls this redirect applies to.
    pub fn constraint(&self) -> &CallConstraint {
        &self.constraint
    }

    /// Ordering weight; higher weights are considered first.
    pub fn order_weight(&self) -> i32 {
        self.order_weight
    }

    /// Whether this redirect is ignored when deciding strict satisfaction.
    pub fn exempt_from_strict(&self) -> bool {
        self.exempt_from_strict
    }

    /// Whether this redirect survives a non-inclusive reset.
    pub fn persistent(&self) -> bool {
        self.persistent
    }
}

impl std::fmt::Debug for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redirect")
            .field("constraint", &self.constraint)
            .field("order_weight", &self.order_weight)
            .field("exempt_from_strict", &self.exempt_from_strict)
            .field("persistent", &self.persistent)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Redirect`].
pub struct RedirectBuilder {
    handler: Arc<dyn CallHandler>,
    constraint: CallConstraint,
    order_weight: i32,
    exempt_from_strict: bool,
    persistent: bool,
}

impl RedirectBuilder {
    /// Restrict the redirect to calls matching a constraint.
    pub fn constraint(mut self, constraint: CallConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Set the ordering weight (default 0).
    pub fn order_weight(mut self, weight: i32) -> Self {
        self.order_weight = weight;
        self
    }

    /// Exclude this redirect from strict-mode satisfaction.
    pub fn exempt_from_strict(mut self) -> Self {
        self.exempt_from_strict = true;
        self
    }

    /// Keep this redirect across non-inclusive resets.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Finish building the redirect.
    pub fn finish(self) -> Redirect {
        Redirect {
            handler: self.handler,
            constraint: self.constraint,
            order_weight: self.order_weight,
            exempt_from_strict: self.exempt_from_strict,
            persistent: self.persistent,
        }
    }
}
