//! Redirect repositories
//!
//! A [`RedirectRepository`] owns the *current* plan for one contract. Reads
//! are lock-free snapshots; mutations are read-copy-update: compute a new
//! immutable plan from the current one and compare-and-swap the reference,
//! retrying on contention. In-flight calls keep the snapshot they captured
//! at dispatch and are never blocked by configuration changes.

use crate::call::ContractId;
use crate::plan::RedirectPlan;
use crate::redirect::Redirect;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Owner of the current [`RedirectPlan`] for one contract.
pub struct RedirectRepository {
    plan: ArcSwap<RedirectPlan>,
}

impl std::fmt::Debug for RedirectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectRepository")
            .field("plan", &*self.plan.load_full())
            .finish()
    }
}

impl RedirectRepository {
    /// A repository starting from the empty, non-strict plan.
    pub fn new() -> Self {
        Self {
            plan: ArcSwap::from_pointee(RedirectPlan::empty()),
        }
    }

    /// Snapshot of the current plan. Never blocks.
    pub fn plan(&self) -> Arc<RedirectPlan> {
        self.plan.load_full()
    }

    /// Insert a redirect; returns the plan version that was installed.
    pub fn insert(&self, redirect: Redirect) -> Arc<RedirectPlan> {
        let installed = self.update(move |plan| plan.with_insert(redirect.clone()));
        debug!(
            redirects = installed.redirects().len(),
            "redirect inserted"
        );
        installed
    }

    /// Reset the plan back to a non-strict state. With `include_persistent`
    /// everything is removed; otherwise redirects marked persistent survive.
    pub fn reset(&self, include_persistent: bool) -> Arc<RedirectPlan> {
        let installed = self.update(move |plan| plan.with_reset(include_persistent));
        debug!(
            include_persistent,
            remaining = installed.redirects().len(),
            "plan reset"
        );
        installed
    }

    /// Enable or disable strict mode.
    pub fn set_strict(&self, strict: bool) -> Arc<RedirectPlan> {
        let installed = self.update(move |plan| plan.with_strict(strict));
        debug!(strict, "strict mode updated");
        installed
    }

    // Read current plan, compute candidate, compare-and-swap the reference.
    // A lost race re-reads and recomputes against the winner's plan.
    fn update<F>(&self, op: F) -> Arc<RedirectPlan>
    where
        F: Fn(&RedirectPlan) -> RedirectPlan,
    {
        loop {
            let current = self.plan.load_full();
            let next = Arc::new(op(&current));
            let previous = self.plan.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&arc_swap::Guard::into_inner(previous), &current) {
                return next;
            }
        }
    }
}

impl Default for RedirectRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazily creates and hands out one repository per contract identity.
///
/// Repositories live for the process lifetime; resetting a contract's
/// configuration goes through [`RedirectRepository::reset`], not removal.
#[derive(Debug, Default)]
pub struct RedirectRegistry {
    repositories: Mutex<HashMap<ContractId, Arc<RedirectRepository>>>,
}

impl RedirectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The repository for a contract, created on first use.
    pub fn repository(&self, contract: &ContractId) -> Arc<RedirectRepository> {
        let mut repositories = self.repositories.lock().unwrap();
        if let Some(existing) = repositories.get(contract) {
            return Arc::clone(existing);
        }
        debug!(contract = %contract, "repository created");
        let created = Arc::new(RedirectRepository::new());
        repositories.insert(contract.clone(), Arc::clone(&created));
        created
    }

    /// The repository for a contract, if one has been created.
    pub fn get(&self, contract: &ContractId) -> Option<Arc<RedirectRepository>> {
        self.repositories.lock().unwrap().get(contract).cloned()
    }
}
