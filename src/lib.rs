//! In-process broadcast registry for live host monitoring
//!
//! Host agents report telemetry (memory, bandwidth, processes) tagged with
//! their address. Dashboard connections register interest in a set of hosts,
//! or in all of them, and receive every matching event as it arrives.
//!
//! This crate is the piece in the middle. It is transport-agnostic: the
//! server that accepts connections supplies a delivery callback per
//! connection, and whatever decodes agent traffic calls
//! [`BroadcastRegistry::dispatch`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use live_registry::{deliver, BroadcastRegistry, Filter, MonitorEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry: Arc<BroadcastRegistry<u64>> = Arc::new(BroadcastRegistry::new());
//!     let _cleanup = registry.spawn_cleanup_task();
//!
//!     // A viewer connection interested in one host
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     registry.register(1, Filter::sources(["10.0.0.5"]), deliver::unbounded(tx));
//!
//!     registry.publish(MonitorEvent::new("10.0.0.5", 1, Bytes::from_static(b"{}")));
//!
//!     let event = rx.recv().await.unwrap();
//!     println!("{} sent {} bytes", event.source, event.payload.len());
//!
//!     registry.unregister(&1);
//!     println!("hosts seen: {}", registry.source_count());
//! }
//! ```

pub mod registry;

pub use registry::deliver;
pub use registry::{
    BroadcastRegistry, Deliver, DeliveryError, Filter, ListenerState, MonitorEvent,
    RegistryConfig, RegistryStats, SourceId, Sourced,
};
