// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe registry.
//!
//! Inbound hub events and client-local signals are fanned out through an
//! [`EventBus`] keyed by event name. Handlers run synchronously, in
//! registration order, on the task that calls [`EventBus::emit`]. A handler
//! that returns an error or panics is logged and skipped; the remaining
//! handlers still run and the caller of `emit` never sees the failure.
//! Panic containment relies on unwinding, so the workspace profiles keep
//! the default `panic = "unwind"`.
//!
//! [`Listeners`] is the single-topic variant used for typed notifications
//! such as connection state changes.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type handlers return.
pub type HandlerResult = Result<(), HandlerError>;

type Handler = Arc<dyn Fn(&[Value]) -> HandlerResult + Send + Sync>;

/// Identifies one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
}

/// Event registry keyed by event name.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

/// Handle returned by [`EventBus::on`].
///
/// Dropping the handle leaves the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    event: String,
    id: HandlerId,
}

impl Subscription {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Removes exactly the handler this subscription was created for.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            remove_handler(&mut lock(&registry), &self.event, self.id);
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&[Value]) -> HandlerResult + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = HandlerId(registry.next_id);
        registry
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: event.to_string(),
            id,
        }
    }

    /// Removes one handler, or every handler for `event` when `id` is `None`.
    pub fn off(&self, event: &str, id: Option<HandlerId>) {
        let mut registry = lock(&self.registry);
        match id {
            Some(id) => remove_handler(&mut registry, event, id),
            None => {
                registry.handlers.remove(event);
            }
        }
    }

    /// Invokes every handler currently registered for `event`.
    ///
    /// Returns the number of handlers that completed without error.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<(HandlerId, Handler)> = lock(&self.registry)
            .handlers
            .get(event)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(event, "no handlers registered");
            return 0;
        }

        handlers
            .iter()
            .filter(|(_, handler)| run_isolated(event, || handler(args)))
            .count()
    }

    /// Number of handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        lock(&self.registry)
            .handlers
            .get(event)
            .map_or(0, Vec::len)
    }
}

fn remove_handler(registry: &mut Registry, event: &str, id: HandlerId) {
    if let Some(list) = registry.handlers.get_mut(event) {
        list.retain(|(existing, _)| *existing != id);
        if list.is_empty() {
            registry.handlers.remove(event);
        }
    }
}

/// Runs a handler, containing errors and panics. Returns `true` on success.
fn run_isolated(event: &str, f: impl FnOnce() -> HandlerResult) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(event, error = %e, "event handler failed");
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(event, panic = %message, "event handler panicked");
            false
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct ListenerSlots<T> {
    next_id: u64,
    entries: Vec<(HandlerId, Listener<T>)>,
}

/// Typed single-topic listener list.
pub struct Listeners<T> {
    slots: Arc<Mutex<ListenerSlots<T>>>,
    label: &'static str,
}

/// Handle returned by [`Listeners::add`].
pub struct ListenerHandle<T> {
    slots: Weak<Mutex<ListenerSlots<T>>>,
    id: HandlerId,
}

impl<T> ListenerHandle<T> {
    pub fn unsubscribe(self) {
        if let Some(slots) = self.slots.upgrade() {
            lock(&slots).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl<T> Listeners<T> {
    /// Creates an empty list. `label` names the topic in logs.
    pub fn new(label: &'static str) -> Self {
        Listeners {
            slots: Arc::new(Mutex::new(ListenerSlots {
                next_id: 0,
                entries: Vec::new(),
            })),
            label,
        }
    }

    pub fn add<F>(&self, listener: F) -> ListenerHandle<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut slots = lock(&self.slots);
        slots.next_id += 1;
        let id = HandlerId(slots.next_id);
        slots.entries.push((id, Arc::new(listener)));
        ListenerHandle {
            slots: Arc::downgrade(&self.slots),
            id,
        }
    }

    /// Calls every listener with `value`, containing panics.
    pub fn notify(&self, value: &T) {
        let entries: Vec<Listener<T>> = lock(&self.slots)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in entries {
            run_isolated(self.label, || {
                listener(value);
                Ok(())
            });
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
