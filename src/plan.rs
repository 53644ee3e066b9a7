//! Redirect plans: immutable ordered snapshots
//!
//! A [`RedirectPlan`] is the complete configuration for one contract at a
//! point in time. Plans are never mutated: every configuration change
//! produces a new plan, and in-flight calls keep traversing the snapshot
//! they captured at dispatch.
//!
//! Ordering invariant: redirects sort by descending order weight, and among
//! equal weights the most recently inserted comes first. The newest override
//! wins unless weights say otherwise.

use crate::redirect::Redirect;
use std::sync::Arc;

/// An immutable, ordered snapshot of all redirects for one contract.
#[derive(Debug, Clone, Default)]
pub struct RedirectPlan {
    redirects: Vec<Arc<Redirect>>,
    strict: bool,
}

impl RedirectPlan {
    /// The empty, non-strict plan.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The redirects in consideration order.
    pub fn redirects(&self) -> &[Arc<Redirect>] {
        &self.redirects
    }

    /// Whether strict mode is enabled on this plan.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Whether the plan has no redirects.
    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty()
    }

    /// A new plan with the redirect inserted at its ordered position:
    /// before the first entry whose weight does not exceed the new one, so
    /// equal weights keep last-in-first-considered order.
    pub fn with_insert(&self, redirect: Redirect) -> Self {
        let redirect = Arc::new(redirect);
        let index = self
            .redirects
            .iter()
            .position(|r| r.order_weight() <= redirect.order_weight())
            .unwrap_or(self.redirects.len());

        let mut redirects = self.redirects.clone();
        redirects.insert(index, redirect);
        Self {
            redirects,
            strict: self.strict,
        }
    }

    /// A new plan with strict mode set.
    pub fn with_strict(&self, strict: bool) -> Self {
        Self {
            redirects: self.redirects.clone(),
            strict,
        }
    }

    /// A new plan with redirects cleared and strict mode off. With
    /// `include_persistent` the plan empties completely; otherwise
    /// persistent redirects survive.
    pub fn with_reset(&self, include_persistent: bool) -> Self {
        let redirects = if include_persistent {
            Vec::new()
        } else {
            self.redirects
                .iter()
                .filter(|r| r.persistent())
                .cloned()
                .collect()
        };
        Self {
            redirects,
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::value::Value;

    fn redirect(weight: i32) -> Redirect {
        Redirect::build(handler_fn(|_call| async { Ok(Value::Unit) }))
            .order_weight(weight)
            .finish()
    }

    fn weights(plan: &RedirectPlan) -> Vec<i32> {
        plan.redirects().iter().map(|r| r.order_weight()).collect()
    }

    #[test]
    fn empty_plan() {
        let plan = RedirectPlan::empty();
        assert!(plan.is_empty());
        assert!(!plan.strict());
    }

    #[test]
    fn inserts_sort_by_descending_weight() {
        let plan = RedirectPlan::empty()
            .with_insert(redirect(1))
            .with_insert(redirect(5))
            .with_insert(redirect(3));
        assert_eq!(weights(&plan), vec![5, 3, 1]);
    }

    #[test]
    fn equal_weights_are_lifo() {
        let a = Redirect::build(handler_fn(|_c| async { Ok(Value::S32(1)) })).finish();
        let b = Redirect::build(handler_fn(|_c| async { Ok(Value::S32(2)) })).finish();

        let plan = RedirectPlan::empty().with_insert(a).with_insert(b);
        // b inserted last, so it is considered first
        let first = Arc::clone(&plan.redirects()[0]);
        let plan2 = plan.with_insert(redirect(0));
        // newest again moves to the front of the weight-0 group
        assert!(!Arc::ptr_eq(&plan2.redirects()[0], &first));
        assert_eq!(plan2.redirects().len(), 3);
    }

    #[test]
    fn mixed_weights_keep_lifo_within_group() {
        let plan = RedirectPlan::empty()
            .with_insert(redirect(0))
            .with_insert(redirect(2))
            .with_insert(redirect(0))
            .with_insert(redirect(2));
        assert_eq!(weights(&plan), vec![2, 2, 0, 0]);
    }

    #[test]
    fn reset_preserves_persistent() {
        let keep = Redirect::build(handler_fn(|_c| async { Ok(Value::Unit) }))
            .persistent()
            .finish();
        let plan = RedirectPlan::empty()
            .with_insert(redirect(0))
            .with_insert(keep)
            .with_insert(redirect(1));

        let soft = plan.with_reset(false);
        assert_eq!(soft.redirects().len(), 1);
        assert!(soft.redirects()[0].persistent());

        let hard = plan.with_reset(true);
        assert!(hard.is_empty());
    }

    #[test]
    fn reset_clears_strict_flag() {
        let plan = RedirectPlan::empty().with_strict(true).with_insert(redirect(0));

        let hard = plan.with_reset(true);
        assert!(!hard.strict());
        assert!(hard.is_empty());

        let soft = plan.with_reset(false);
        assert!(!soft.strict());
    }

    #[test]
    fn updates_do_not_touch_the_source_plan() {
        let plan = RedirectPlan::empty().with_insert(redirect(0));
        let _bigger = plan.with_insert(redirect(1));
        assert_eq!(plan.redirects().len(), 1);
    }
}
