//! Listener entry and state types
//!
//! This module defines the per-listener state stored in the registry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::deliver::Deliver;
use super::error::DeliveryError;
use super::event::{Filter, SourceId};

/// Registration state of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Handle has a live listener
    Registered,
    /// Handle was never registered, or has been unregistered
    Unregistered,
}

/// Entry for a single registered listener
pub(super) struct ListenerEntry<E> {
    /// Sources this listener wants
    filter: Filter,

    /// Delivery callback supplied by the transport layer
    deliver: Arc<dyn Deliver<E>>,

    /// Cleared on unregister or replacement, checked right before each delivery
    active: AtomicBool,

    /// When the listener was registered
    registered_at: Instant,
}

impl<E: 'static> ListenerEntry<E> {
    pub(super) fn new(filter: Filter, deliver: Arc<dyn Deliver<E>>) -> Self {
        Self {
            filter,
            deliver,
            active: AtomicBool::new(true),
            registered_at: Instant::now(),
        }
    }

    /// Whether this listener should receive events from `source`
    pub fn wants(&self, source: &SourceId) -> bool {
        self.filter.matches(source)
    }

    /// How long this listener has been registered
    pub fn age(&self) -> Duration {
        self.registered_at.elapsed()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop all further deliveries, including ones from an in-flight dispatch
    pub(super) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Invoke the delivery callback, converting a panic into an error
    pub(super) fn invoke(&self, event: E) -> Result<(), DeliveryError> {
        let deliver = &self.deliver;
        match panic::catch_unwind(AssertUnwindSafe(|| deliver.deliver(event))) {
            Ok(result) => result,
            Err(payload) => Err(DeliveryError::from_panic(payload)),
        }
    }
}

/// Slot in the listener map
///
/// Unregistering leaves a tombstone behind instead of removing the key;
/// tombstones are swept by cleanup.
pub(super) enum Slot<E> {
    Live(Arc<ListenerEntry<E>>),
    Tombstone,
}

impl<E> Slot<E> {
    pub fn live(&self) -> Option<&Arc<ListenerEntry<E>>> {
        match self {
            Slot::Live(entry) => Some(entry),
            Slot::Tombstone => None,
        }
    }

    /// Tombstone this slot, returning the listener that was live in it
    pub fn take(&mut self) -> Option<Arc<ListenerEntry<E>>> {
        match std::mem::replace(self, Slot::Tombstone) {
            Slot::Live(entry) => Some(entry),
            Slot::Tombstone => None,
        }
    }
}

/// Statistics for the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of live listeners
    pub listeners: usize,
    /// Number of tombstoned slots awaiting cleanup
    pub tombstones: usize,
    /// Number of distinct sources ever observed
    pub sources_seen: usize,
    /// Total dispatch calls
    pub events_dispatched: u64,
    /// Successful deliveries across all listeners
    pub deliveries: u64,
    /// Deliveries that returned an error or panicked
    pub delivery_faults: u64,
}
