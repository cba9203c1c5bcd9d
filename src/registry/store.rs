//! Broadcast registry implementation
//!
//! The central registry that tracks live listeners and fans monitoring
//! events out to the ones whose filter matches.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::config::{RegistryConfig, MIN_CLEANUP_INTERVAL};
use super::deliver::Deliver;
use super::entry::{ListenerEntry, ListenerState, RegistryStats, Slot};
use super::event::{Filter, MonitorEvent, SourceId, Sourced};

/// State guarded by the registry lock
struct Inner<H, E> {
    /// Map of handle to listener slot (live or tombstone)
    listeners: HashMap<H, Slot<E>>,

    /// Every source ever dispatched, never pruned
    observed_sources: HashSet<SourceId>,

    /// Number of tombstoned slots in `listeners`
    tombstones: usize,
}

impl<H: Eq + Hash, E> Inner<H, E> {
    /// Drop tombstoned slots, returning how many were removed
    fn sweep(&mut self) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|_, slot| slot.live().is_some());
        self.tombstones = 0;
        before - self.listeners.len()
    }
}

/// Central registry for live listeners
///
/// Handles are opaque caller-supplied keys (typically a connection id). All
/// state lives behind a single mutex which is never held while a delivery
/// callback runs: `dispatch` snapshots the matching listeners, releases the
/// lock and only then invokes them. Callbacks may therefore register,
/// unregister or dispatch re-entrantly.
pub struct BroadcastRegistry<H, E = MonitorEvent> {
    inner: Mutex<Inner<H, E>>,

    /// Configuration
    config: RegistryConfig,

    events_dispatched: AtomicU64,
    deliveries: AtomicU64,
    delivery_faults: AtomicU64,
}

impl<H, E> BroadcastRegistry<H, E>
where
    H: Eq + Hash + Clone + Debug,
    E: Clone + 'static,
{
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                listeners: HashMap::with_capacity(config.listener_capacity),
                observed_sources: HashSet::new(),
                tombstones: 0,
            }),
            config,
            events_dispatched: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_faults: AtomicU64::new(0),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a listener for `handle`
    ///
    /// If the handle is already registered, the previous listener is replaced
    /// wholesale (its filter is not merged) and receives nothing further.
    /// Filter contents are not checked against observed sources.
    pub fn register<D>(&self, handle: H, filter: Filter, deliver: D)
    where
        D: Deliver<E>,
    {
        let wildcard = filter.is_wildcard();
        let sources = filter.listed();
        let entry = Arc::new(ListenerEntry::new(filter, Arc::new(deliver)));

        let mut inner = self.inner.lock();
        let previous = inner.listeners.insert(handle.clone(), Slot::Live(entry));
        match &previous {
            Some(Slot::Live(old)) => old.deactivate(),
            Some(Slot::Tombstone) => inner.tombstones -= 1,
            None => {}
        }
        drop(inner);

        // The replaced callback is dropped at the end of this match, outside the lock
        match previous {
            Some(Slot::Live(_)) => {
                tracing::info!(
                    handle = ?handle,
                    wildcard = wildcard,
                    sources = sources,
                    "Listener re-registered"
                );
            }
            Some(Slot::Tombstone) => {
                tracing::info!(
                    handle = ?handle,
                    wildcard = wildcard,
                    sources = sources,
                    "Listener registered (reused slot)"
                );
            }
            None => {
                tracing::info!(
                    handle = ?handle,
                    wildcard = wildcard,
                    sources = sources,
                    "Listener registered"
                );
            }
        }
    }

    /// Unregister the listener for `handle`
    ///
    /// Unknown or already unregistered handles are ignored. Once this
    /// returns, the listener's callback is never invoked again, even by a
    /// dispatch that is already in progress.
    pub fn unregister(&self, handle: &H) {
        let mut inner = self.inner.lock();

        let taken = inner.listeners.get_mut(handle).and_then(Slot::take);
        let entry = match taken {
            Some(entry) => entry,
            None => {
                drop(inner);
                tracing::debug!(handle = ?handle, "Unregister of unknown handle ignored");
                return;
            }
        };

        entry.deactivate();
        inner.tombstones += 1;

        let threshold = self.config.tombstone_threshold;
        let removed = if threshold > 0 && inner.tombstones >= threshold {
            inner.sweep()
        } else {
            0
        };
        drop(inner);

        tracing::info!(
            handle = ?handle,
            registered_for = ?entry.age(),
            "Listener unregistered"
        );
        if removed > 0 {
            tracing::debug!(removed = removed, "Compacted tombstoned listeners");
        }

        // The callback is dropped here, outside the lock
        drop(entry);
    }

    /// Dispatch an event from `source` to every matching listener
    ///
    /// The source is recorded first, whether or not anyone is listening.
    /// Each matching listener is then attempted exactly once, in no
    /// particular order. A listener that fails or panics is logged and
    /// counted; the remaining listeners still receive the event.
    pub fn dispatch(&self, source: impl Into<SourceId>, event: E) {
        let source = source.into();

        let targets: Vec<(H, Arc<ListenerEntry<E>>)> = {
            let mut inner = self.inner.lock();

            if !inner.observed_sources.contains(&source) {
                inner.observed_sources.insert(source.clone());
                tracing::debug!(
                    source = %source,
                    sources_seen = inner.observed_sources.len(),
                    "New source observed"
                );
            }

            inner
                .listeners
                .iter()
                .filter_map(|(handle, slot)| {
                    slot.live()
                        .filter(|entry| entry.wants(&source))
                        .map(|entry| (handle.clone(), Arc::clone(entry)))
                })
                .collect()
        };

        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(source = %source, matched = targets.len(), "Dispatching event");

        for (handle, entry) in targets {
            // Unregistered by an earlier callback in this loop
            if !entry.is_active() {
                continue;
            }

            match entry.invoke(event.clone()) {
                Ok(()) => {
                    self.deliveries.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.delivery_faults.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        handle = ?handle,
                        source = %source,
                        error = %e,
                        "Delivery failed"
                    );
                }
            }
        }
    }

    /// Dispatch an event that carries its own source
    pub fn publish(&self, event: E)
    where
        E: Sourced,
    {
        let source = event.source().clone();
        self.dispatch(source, event);
    }

    /// Number of distinct sources ever observed
    ///
    /// This counts monitored hosts seen so far, not registered listeners;
    /// see [`listener_count`](Self::listener_count) for the latter.
    #[doc(alias = "nClients")]
    pub fn source_count(&self) -> usize {
        self.inner.lock().observed_sources.len()
    }

    /// Every source observed so far, sorted
    pub fn observed_sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> =
            self.inner.lock().observed_sources.iter().cloned().collect();
        sources.sort();
        sources
    }

    /// Check whether an event from `source` has ever been dispatched
    pub fn has_observed(&self, source: &str) -> bool {
        self.inner.lock().observed_sources.contains(source)
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.listeners.len() - inner.tombstones
    }

    /// Registration state of `handle`
    pub fn state(&self, handle: &H) -> ListenerState {
        match self.inner.lock().listeners.get(handle).and_then(Slot::live) {
            Some(_) => ListenerState::Registered,
            None => ListenerState::Unregistered,
        }
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStats {
        let (listeners, tombstones, sources_seen) = {
            let inner = self.inner.lock();
            (
                inner.listeners.len() - inner.tombstones,
                inner.tombstones,
                inner.observed_sources.len(),
            )
        };

        RegistryStats {
            listeners,
            tombstones,
            sources_seen,
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_faults: self.delivery_faults.load(Ordering::Relaxed),
        }
    }

    /// Run cleanup once
    ///
    /// Removes tombstoned slots left behind by `unregister` and returns how
    /// many were removed.
    pub fn cleanup(&self) -> usize {
        let removed = self.inner.lock().sweep();
        if removed > 0 {
            tracing::debug!(removed = removed, "Tombstoned listeners removed by cleanup");
        }
        removed
    }
}

impl<H, E> BroadcastRegistry<H, E>
where
    H: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    E: Clone + 'static,
{
    /// Spawn background cleanup task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.cleanup_interval.max(MIN_CLEANUP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.cleanup();
            }
        })
    }
}

impl<H, E> Default for BroadcastRegistry<H, E>
where
    H: Eq + Hash + Clone + Debug,
    E: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
