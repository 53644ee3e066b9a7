//! Strict-mode validation
//!
//! Strict mode asks "would anything have intentionally handled this call?"
//! — so validation scans the *entire* plan, independent of any cursor
//! position, and runs exactly once per external call, before the relay
//! creates a cursor. Ordinary traversal scans only forward from the cursor;
//! the two scan semantics are deliberately different.

use crate::call::CallDescriptor;
use crate::error::CallError;
use crate::plan::RedirectPlan;

/// Validate a call against a plan's strict-mode requirement.
///
/// Raises [`CallError::StrictNotSatisfied`] when strict mode is on and no
/// redirect in the whole plan both matches the call and participates in
/// strict satisfaction.
pub fn validate(call: &CallDescriptor, plan: &RedirectPlan) -> Result<(), CallError> {
    if !plan.strict() {
        return Ok(());
    }

    let satisfied = plan
        .redirects()
        .iter()
        .any(|r| !r.exempt_from_strict() && r.constraint().is_match(call));

    if satisfied {
        Ok(())
    } else {
        Err(CallError::StrictNotSatisfied(call.method().clone()))
    }
}
