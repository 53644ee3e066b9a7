//! Call constraints
//!
//! A [`CallConstraint`] decides whether a redirect applies to a call. The
//! structural form checks method identity and then each argument position in
//! order; the first mismatch short-circuits to a non-match.

use crate::call::{ArgSlot, CallDescriptor, MethodId};
use crate::value::Value;
use std::sync::Arc;

/// Predicate over a whole call descriptor.
pub type CallPredicate = Arc<dyn Fn(&CallDescriptor) -> bool + Send + Sync>;

/// Predicate over a single argument value.
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A matcher for one argument position of a structural constraint.
#[derive(Clone)]
pub enum ArgMatcher {
    /// The current value must equal this value exactly.
    Exact(Value),
    /// Any value (or no value yet) matches.
    Any,
    /// The current value must satisfy the predicate.
    Predicate(ValuePredicate),
    /// Captured-reference binding for by-ref/out parameters. Never inspects
    /// the slot content: the callee has not produced a value at match time.
    Ref,
}

impl ArgMatcher {
    /// Exact-value matcher from anything convertible to a [`Value`].
    pub fn exact(value: impl Into<Value>) -> Self {
        ArgMatcher::Exact(value.into())
    }

    /// Predicate matcher from a closure over the argument value.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ArgMatcher::Predicate(Arc::new(f))
    }

    fn is_match(&self, slot: &ArgSlot) -> bool {
        match self {
            ArgMatcher::Any | ArgMatcher::Ref => true,
            // Value inspection reads the current value at match time. An
            // unwritten out slot has nothing to inspect and cannot satisfy
            // a value matcher.
            ArgMatcher::Exact(expected) => slot.current().as_ref() == Some(expected),
            ArgMatcher::Predicate(pred) => slot.current().is_some_and(|v| pred(&v)),
        }
    }
}

impl std::fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgMatcher::Exact(v) => write!(f, "Exact({})", v),
            ArgMatcher::Any => write!(f, "Any"),
            ArgMatcher::Predicate(_) => write!(f, "Predicate(..)"),
            ArgMatcher::Ref => write!(f, "Ref"),
        }
    }
}

/// Decides whether a redirect applies to a call.
#[derive(Clone)]
pub enum CallConstraint {
    /// Applies to every call.
    Always,
    /// Applies when the predicate accepts the descriptor.
    Predicate(CallPredicate),
    /// Applies when the method matches exactly and every argument position
    /// satisfies its matcher.
    Structural {
        method: MethodId,
        args: Vec<ArgMatcher>,
    },
}

impl CallConstraint {
    /// Predicate constraint from a closure over the descriptor.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&CallDescriptor) -> bool + Send + Sync + 'static,
    {
        CallConstraint::Predicate(Arc::new(f))
    }

    /// Structural constraint on a method and per-position matchers.
    pub fn structural(method: impl Into<MethodId>, args: Vec<ArgMatcher>) -> Self {
        CallConstraint::Structural {
            method: method.into(),
            args,
        }
    }

    /// Structural constraint matching a method with any arguments.
    pub fn to_method(method: impl Into<MethodId>) -> Self {
        CallConstraint::predicate_on_method(method.into())
    }

    fn predicate_on_method(method: MethodId) -> Self {
        CallConstraint::predicate(move |call| call.method() == &method)
    }

    /// Whether this constraint applies to the given call.
    pub fn is_match(&self, call: &CallDescriptor) -> bool {
        match self {
            CallConstraint::Always => true,
            CallConstraint::Predicate(pred) => pred(call),
            CallConstraint::Structural { method, args } => {
                if call.method() != method {
                    return false;
                }
                if call.args().len() != args.len() {
                    return false;
                }
                args.iter()
                    .zip(call.args().iter())
                    .all(|(matcher, slot)| matcher.is_match(slot))
            }
        }
    }
}

// Closure variants keep CallConstraint from deriving Debug.
impl std::fmt::Debug for CallConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallConstraint::Always => write!(f, "Always"),
            CallConstraint::Predicate(_) => write!(f, "Predicate(..)"),
            CallConstraint::Structural { method, args } => f
                .debug_struct("Structural")
                .field("method", method)
                .field("args", args)
                .finish(),
        }
    }
}
