//! Hand-written proxy seam
//!
//! Dynamic proxy generation is a consumer-layer concern; the engine only
//! needs *some* entry point that synthesizes a call descriptor and invokes
//! the relay. [`Proxy`] is that explicit wrapper: typed facades over a
//! contract hold one and forward each method as a named dynamic-value call.
//!
//! # Example
//!
//! ```ignore
//! let registry = RedirectRegistry::new();
//! let repository = registry.repository(&ContractId::new("Calculator"));
//! let proxy = Proxy::new(ContractId::new("Calculator"), repository)
//!     .with_root(Arc::new(calculator_root));
//!
//! let result = proxy
//!     .call("add", CallArguments::from_values(vec![1i32.into(), 2i32.into()]))
//!     .await?;
//! ```

use crate::call::{CallArguments, CallDescriptor, ContractId, MethodId, ProxyId};
use crate::error::CallError;
use crate::handler::CallRoot;
use crate::relay;
use crate::repository::RedirectRepository;
use crate::value::Value;
use std::sync::Arc;

/// A proxy standing in for one contract, optionally wrapping a root
/// implementation.
#[derive(Clone)]
pub struct Proxy {
    id: ProxyId,
    contract: ContractId,
    repository: Arc<RedirectRepository>,
    root: Option<Arc<dyn CallRoot>>,
}

impl Proxy {
    /// A proxy over a contract with no root implementation: unhandled calls
    /// raise [`CallError::RootUnavailable`].
    pub fn new(contract: ContractId, repository: Arc<RedirectRepository>) -> Self {
        Self {
            id: ProxyId::next(),
            contract,
            repository,
            root: None,
        }
    }

    /// Attach the root implementation this proxy falls back to.
    pub fn with_root(mut self, root: Arc<dyn CallRoot>) -> Self {
        self.root = Some(root);
        self
    }

    /// This proxy instance's identity.
    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// The contract this proxy stands in for.
    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// The repository configuring this proxy's pipeline.
    pub fn repository(&self) -> &Arc<RedirectRepository> {
        &self.repository
    }

    /// Deliver one invocation into the redirect pipeline.
    ///
    /// Captures the current plan snapshot; configuration changes made while
    /// the call is in flight only affect calls that start afterward.
    pub async fn call(
        &self,
        method: impl Into<MethodId>,
        args: CallArguments,
    ) -> Result<Value, CallError> {
        let plan = self.repository.plan();
        let descriptor = CallDescriptor::new(self.id, method.into(), args);
        relay::dispatch(descriptor, plan, self.root.clone()).await
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.id)
            .field("contract", &self.contract)
            .field("has_root", &self.root.is_some())
            .finish()
    }
}
