//! Reroute: a call-redirect pipeline engine
//!
//! The engine behind a test-double/mocking library: calls made through a
//! proxy are routed through an ordered, filterable chain of handlers that
//! can inspect arguments, mutate them, short-circuit the call, or delegate
//! onward to the real "root" implementation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              Reroute Engine                  │
//! │                                              │
//! │  repository - current plan, RCU swapped      │
//! │  plan       - immutable ordered snapshot     │
//! │  strict     - fail-fast entry validation     │
//! │  relay      - per-call cursor traversal      │
//! │                                              │
//! ├──────────────────────────────────────────────┤
//! │     Proxy seam (hand-written wrappers)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Each dispatch captures one immutable plan snapshot and owns its own
//! cursor, so concurrent, nested, and async-suspended calls never interfere.
//!
//! ## Example
//!
//! ```ignore
//! let repository = Arc::new(RedirectRepository::new());
//! repository.insert(
//!     Redirect::build(handler_fn(|call: RelayCall| async move {
//!         let result = call.continue_next().await?;
//!         Ok(Value::S64(result.as_s64().unwrap_or(0) * 2))
//!     }))
//!     .constraint(CallConstraint::structural("get", vec![ArgMatcher::Any]))
//!     .finish(),
//! );
//!
//! let proxy = Proxy::new(ContractId::new("Store"), repository).with_root(root);
//! let doubled = proxy.call("get", CallArguments::from_values(vec![7i32.into()])).await?;
//! ```

pub mod call;
pub mod constraint;
pub mod error;
pub mod handler;
pub mod plan;
pub mod proxy;
pub mod redirect;
pub mod relay;
pub mod repository;
pub mod strict;
pub mod value;

pub use call::{ArgSlot, ByRefSlot, CallArguments, CallDescriptor, ContractId, MethodId, ProxyId};
pub use constraint::{ArgMatcher, CallConstraint};
pub use error::CallError;
pub use handler::{handler_fn, root_fn, CallHandler, CallRoot, HandlerFuture};
pub use plan::RedirectPlan;
pub use proxy::Proxy;
pub use redirect::{Redirect, RedirectBuilder};
pub use relay::{dispatch, RelayCall};
pub use repository::{RedirectRegistry, RedirectRepository};
pub use value::Value;
