//! Call identity and argument vectors
//!
//! A [`CallDescriptor`] is the immutable record of one invocation delivered
//! by the proxy layer: which proxy was called, which method, and the ordered
//! argument vector. Arguments are usually plain values, but a slot may be
//! shared by reference with the caller's frame so handlers can write results
//! into `out`/`in-out` parameters.

use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identity of a proxied method, compared exactly by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodId {
    name: String,
}

impl MethodId {
    /// Create a method identity from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for MethodId {
    fn from(name: &str) -> Self {
        MethodId::new(name)
    }
}

/// Identity of a proxied contract: a type name plus an optional label, so
/// the same contract type can carry independently configured pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractId {
    type_name: String,
    label: Option<String>,
}

impl ContractId {
    /// Identity for an unlabeled contract.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            label: None,
        }
    }

    /// Identity for a named registration of a contract.
    pub fn labeled(type_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            label: Some(label.into()),
        }
    }

    /// The contract type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The optional registration label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}[{}]", self.type_name, label),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Identity of one proxy instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyId(u64);

static NEXT_PROXY_ID: AtomicU64 = AtomicU64::new(1);

impl ProxyId {
    /// Allocate a fresh process-unique proxy id.
    pub fn next() -> Self {
        ProxyId(NEXT_PROXY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A value slot shared by reference between the caller and handlers.
///
/// The slot starts either seeded with an input value (`in-out`) or empty
/// (`out`, nothing produced yet). Writes made by a handler are visible to
/// the caller holding the same slot.
#[derive(Debug, Clone)]
pub struct ByRefSlot {
    cell: Arc<Mutex<Option<Value>>>,
}

impl ByRefSlot {
    /// An in-out slot seeded with the caller's current value.
    pub fn new(initial: Value) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(initial))),
        }
    }

    /// An output-only slot, unset until a handler or the root writes it.
    pub fn out() -> Self {
        Self {
            cell: Arc::new(Mutex::new(None)),
        }
    }

    /// Read the current value, if one has been produced.
    pub fn current(&self) -> Option<Value> {
        self.cell.lock().unwrap().clone()
    }

    /// Write a value into the slot, visible to every holder.
    pub fn write(&self, value: Value) {
        *self.cell.lock().unwrap() = Some(value);
    }

    /// Whether two slots alias the same storage.
    pub fn same_slot(&self, other: &ByRefSlot) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

/// One position in a call's argument vector.
#[derive(Debug, Clone)]
pub enum ArgSlot {
    /// A plain input value.
    ByValue(Value),
    /// A slot shared with the caller's frame.
    ByRef(ByRefSlot),
}

impl ArgSlot {
    /// The current value at this position: the input value, or whatever the
    /// shared slot holds right now (`None` for an unwritten `out` slot).
    pub fn current(&self) -> Option<Value> {
        match self {
            ArgSlot::ByValue(v) => Some(v.clone()),
            ArgSlot::ByRef(slot) => slot.current(),
        }
    }

    /// Whether this slot is shared by reference.
    pub fn is_by_ref(&self) -> bool {
        matches!(self, ArgSlot::ByRef(_))
    }
}

impl From<Value> for ArgSlot {
    fn from(v: Value) -> Self {
        ArgSlot::ByValue(v)
    }
}

/// An ordered, fixed-arity argument vector.
#[derive(Debug, Clone, Default)]
pub struct CallArguments {
    slots: Vec<ArgSlot>,
}

impl CallArguments {
    /// An empty argument vector.
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// Build an argument vector from plain values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            slots: values.into_iter().map(ArgSlot::ByValue).collect(),
        }
    }

    /// Build an argument vector from explicit slots.
    pub fn from_slots(slots: Vec<ArgSlot>) -> Self {
        Self { slots }
    }

    /// Number of argument positions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the vector has no positions.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot at a position.
    pub fn get(&self, index: usize) -> Option<&ArgSlot> {
        self.slots.get(index)
    }

    /// The current value at a position (reads through by-ref slots).
    pub fn value_at(&self, index: usize) -> Option<Value> {
        self.slots.get(index).and_then(ArgSlot::current)
    }

    /// Iterate over the slots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArgSlot> {
        self.slots.iter()
    }

    /// Write into the by-ref slot at a position.
    ///
    /// Returns false if the position does not exist or is not by-ref.
    pub fn write_ref(&self, index: usize, value: Value) -> bool {
        match self.slots.get(index) {
            Some(ArgSlot::ByRef(slot)) => {
                slot.write(value);
                true
            }
            _ => false,
        }
    }
}

impl From<Vec<Value>> for CallArguments {
    fn from(values: Vec<Value>) -> Self {
        CallArguments::from_values(values)
    }
}

/// The immutable record of one invocation.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    proxy: ProxyId,
    method: MethodId,
    args: CallArguments,
}

impl CallDescriptor {
    /// Create a descriptor for an invocation delivered by the proxy layer.
    pub fn new(proxy: ProxyId, method: MethodId, args: CallArguments) -> Self {
        Self {
            proxy,
            method,
            args,
        }
    }

    /// The proxy instance the call was made through.
    pub fn proxy(&self) -> ProxyId {
        self.proxy
    }

    /// The method being invoked.
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// The argument vector.
    pub fn args(&self) -> &CallArguments {
        &self.args
    }

    /// The same call with a replacement argument vector.
    ///
    /// Used by the relay's argument-override continuations; the original
    /// descriptor is left untouched.
    pub fn with_args(&self, args: CallArguments) -> Self {
        Self {
            proxy: self.proxy,
            method: self.method.clone(),
            args,
        }
    }
}
