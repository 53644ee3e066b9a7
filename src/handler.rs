//! Call handlers and the root seam
//!
//! A [`CallHandler`] is one unit of behavior in the redirect pipeline. It
//! receives a [`RelayCall`] handle giving it the current call descriptor and
//! the two explicit continuations: "next matching handler" and "straight to
//! the root implementation".
//!
//! # Example
//!
//! ```ignore
//! let doubler = handler_fn(|call: RelayCall| async move {
//!     let result = call.continue_next().await?;
//!     let n = result.as_s64().unwrap_or(0);
//!     Ok(Value::S64(n * 2))
//! });
//! ```

use crate::call::{CallArguments, MethodId};
use crate::error::CallError;
use crate::relay::RelayCall;
use crate::value::Value;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by handlers and roots.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, CallError>> + Send + 'static>>;

/// One unit of behavior in the pipeline.
///
/// Handlers may short-circuit with a result, raise an error, mutate by-ref
/// argument slots, or delegate onward through the [`RelayCall`] handle.
pub trait CallHandler: Send + Sync {
    /// Handle one call. The handle is valid for the duration of this
    /// invocation and any futures it spawns inline.
    fn handle(&self, call: RelayCall) -> HandlerFuture;
}

/// The root implementation seam supplied by the proxy layer.
///
/// Invoked when the chain is exhausted or a handler continues directly to
/// the root.
pub trait CallRoot: Send + Sync {
    /// Execute the real implementation of a method.
    fn call(&self, method: &MethodId, args: &CallArguments) -> HandlerFuture;
}

struct FnHandler<F>(F);

impl<F, Fut> CallHandler for FnHandler<F>
where
    F: Fn(RelayCall) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    fn handle(&self, call: RelayCall) -> HandlerFuture {
        Box::pin((self.0)(call))
    }
}

/// Wrap an async closure as a [`CallHandler`].
pub fn handler_fn<F, Fut>(f: F) -> impl CallHandler + 'static
where
    F: Fn(RelayCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    FnHandler(f)
}

struct FnRoot<F>(F);

impl<F, Fut> CallRoot for FnRoot<F>
where
    F: Fn(&MethodId, &CallArguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    fn call(&self, method: &MethodId, args: &CallArguments) -> HandlerFuture {
        Box::pin((self.0)(method, args))
    }
}

/// Wrap an async closure as a [`CallRoot`].
pub fn root_fn<F, Fut>(f: F) -> impl CallRoot + 'static
where
    F: Fn(&MethodId, &CallArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
{
    FnRoot(f)
}
