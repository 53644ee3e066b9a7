//! The relay: per-call cursor engine
//!
//! Each external call gets its own relay state: a snapshot of the plan it
//! was dispatched against and a stack of cursor frames tracking where in the
//! plan the call currently is. Handlers drive traversal explicitly through
//! the [`RelayCall`] handle:
//!
//! - [`RelayCall::continue_next`] scans forward from the current frame for
//!   the next matching redirect and invokes it (falling through to the root
//!   when the chain is exhausted);
//! - [`RelayCall::continue_to_root`] bypasses the rest of the chain.
//!
//! The cursor is an explicit context value: `RelayCall` owns `Arc`s into the
//! call's state, so handler futures carry their own cursor with them across
//! suspension points and worker threads. No execution-unit-local storage is
//! involved. Sibling concurrent calls and nested re-entrant calls each run
//! their own dispatch with their own stack, so they can never observe one
//! another's cursor.

use crate::call::{CallArguments, CallDescriptor, MethodId};
use crate::error::CallError;
use crate::handler::CallRoot;
use crate::plan::RedirectPlan;
use crate::strict;
use crate::value::Value;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// One cursor frame: a plan snapshot, the descriptor in effect, and the
/// position traversal resumes from.
#[derive(Debug)]
struct RelayFrame {
    plan: Arc<RedirectPlan>,
    descriptor: Arc<CallDescriptor>,
    position: usize,
}

/// Per-dispatch relay state shared by the frames of one logical call.
struct RelayState {
    stack: Mutex<Vec<Arc<RelayFrame>>>,
    root: Option<Arc<dyn CallRoot>>,
}

// Pops its frame when the invocation completes, succeeds or not. A popped
// frame that is not the pushed frame means the stack was interleaved by two
// calls, which the per-dispatch ownership model makes impossible; continuing
// past it would run handlers against a foreign cursor.
struct FrameGuard {
    relay: Arc<RelayState>,
    frame: Arc<RelayFrame>,
}

impl FrameGuard {
    fn push(relay: &Arc<RelayState>, frame: Arc<RelayFrame>) -> Self {
        relay.stack.lock().unwrap().push(Arc::clone(&frame));
        Self {
            relay: Arc::clone(relay),
            frame,
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let popped = self.relay.stack.lock().unwrap().pop();
        match popped {
            Some(frame) if Arc::ptr_eq(&frame, &self.frame) => {}
            _ => panic!(
                "relay cursor stack corrupted for call to '{}': popped frame is not the frame \
                 pushed by this invocation",
                self.frame.descriptor.method()
            ),
        }
    }
}

/// The handle a handler receives for the duration of one invocation.
///
/// Cheap to clone; owns its cursor, so it may be moved into futures that
/// suspend and resume on other worker threads.
///
/// Continuations taken from one handle must be awaited one at a time.
/// Child invocations nest on the call's cursor stack, so racing two
/// `continue_next` futures from the same handler (e.g. with `join!`)
/// interleaves their frame pushes and pops and trips the corruption
/// check. Awaiting them sequentially replays the same tail and is always
/// safe; concurrent fan-out belongs in separate proxy calls.
#[derive(Clone)]
pub struct RelayCall {
    relay: Arc<RelayState>,
    frame: Arc<RelayFrame>,
}

impl RelayCall {
    /// The call descriptor in effect for this invocation.
    pub fn descriptor(&self) -> &CallDescriptor {
        &self.frame.descriptor
    }

    /// The method being invoked.
    pub fn method(&self) -> &MethodId {
        self.frame.descriptor.method()
    }

    /// The argument vector in effect for this invocation.
    pub fn args(&self) -> &CallArguments {
        self.frame.descriptor.args()
    }

    /// Continue to the next matching redirect, or fall through to the root
    /// when no redirect past the cursor matches.
    pub async fn continue_next(&self) -> Result<Value, CallError> {
        self.continue_from(Arc::clone(&self.frame.descriptor)).await
    }

    /// Like [`continue_next`](Self::continue_next), but the rest of the
    /// chain (and the root, if reached) sees the replacement arguments.
    pub async fn continue_next_with(&self, args: CallArguments) -> Result<Value, CallError> {
        let descriptor = Arc::new(self.frame.descriptor.with_args(args));
        self.continue_from(descriptor).await
    }

    /// Bypass all remaining redirects and invoke the root implementation.
    pub async fn continue_to_root(&self) -> Result<Value, CallError> {
        self.call_root(&self.frame.descriptor).await
    }

    /// Like [`continue_to_root`](Self::continue_to_root) with replacement
    /// arguments.
    pub async fn continue_to_root_with(&self, args: CallArguments) -> Result<Value, CallError> {
        let descriptor = self.frame.descriptor.with_args(args);
        self.call_root(&descriptor).await
    }

    // Scan forward from this frame's position for the first matching
    // redirect. The matched handler runs under a child frame positioned past
    // the match; this frame is untouched, so a handler calling continue_next
    // twice re-runs the same next redirect.
    async fn continue_from(&self, descriptor: Arc<CallDescriptor>) -> Result<Value, CallError> {
        let redirects = self.frame.plan.redirects();
        let mut index = self.frame.position;
        while index < redirects.len() {
            let redirect = &redirects[index];
            if redirect.constraint().is_match(&descriptor) {
                trace!(
                    method = %descriptor.method(),
                    index,
                    "redirect matched"
                );
                let child = Arc::new(RelayFrame {
                    plan: Arc::clone(&self.frame.plan),
                    descriptor,
                    position: index + 1,
                });
                let call = RelayCall {
                    relay: Arc::clone(&self.relay),
                    frame: Arc::clone(&child),
                };
                let _guard = FrameGuard::push(&self.relay, child);
                return redirect.handler().handle(call).await;
            }
            index += 1;
        }
        self.call_root(&descriptor).await
    }

    async fn call_root(&self, descriptor: &CallDescriptor) -> Result<Value, CallError> {
        match &self.relay.root {
            Some(root) => {
                trace!(method = %descriptor.method(), "continuing to root");
                root.call(descriptor.method(), descriptor.args()).await
            }
            None => Err(CallError::RootUnavailable(descriptor.method().clone())),
        }
    }
}

impl std::fmt::Debug for RelayCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCall")
            .field("method", self.method())
            .field("position", &self.frame.position)
            .finish_non_exhaustive()
    }
}

/// Dispatch one external call against a plan snapshot.
///
/// Strict validation runs first and aborts before any cursor exists. The
/// cursor frame is popped on success and on error alike; handler errors
/// propagate unchanged.
pub async fn dispatch(
    descriptor: CallDescriptor,
    plan: Arc<RedirectPlan>,
    root: Option<Arc<dyn CallRoot>>,
) -> Result<Value, CallError> {
    strict::validate(&descriptor, &plan)?;

    trace!(method = %descriptor.method(), "dispatching call");
    let relay = Arc::new(RelayState {
        stack: Mutex::new(Vec::new()),
        root,
    });
    let frame = Arc::new(RelayFrame {
        plan,
        descriptor: Arc::new(descriptor),
        position: 0,
    });
    let call = RelayCall {
        relay: Arc::clone(&relay),
        frame: Arc::clone(&frame),
    };
    let _guard = FrameGuard::push(&relay, frame);
    call.continue_next().await
}
