//! Listener registry for live event fan-out
//!
//! The registry tracks live connection handles and routes monitoring events
//! from host agents to every handle whose filter matches the event's source.
//! It knows nothing about transports: connections hand it a [`Deliver`]
//! callback on register and remove themselves on close.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<BroadcastRegistry>
//!                   ┌──────────────────────────────┐
//!                   │ Mutex {                      │
//!                   │   listeners: HashMap<H,      │
//!                   │     Live(ListenerEntry {     │
//!                   │       filter, deliver,       │
//!                   │     }) | Tombstone           │
//!                   │   >,                         │
//!                   │   observed_sources,          │
//!                   │ }                            │
//!                   └──────────────┬───────────────┘
//!                                  │
//!        ┌─────────────────────────┼─────────────────────────┐
//!        │                         │                         │
//!        ▼                         ▼                         ▼
//!   [Host agent]              [Viewer conn]             [Viewer conn]
//!   dispatch(ip, ev)          deliver(ev) ─► mpsc       deliver(ev) ─► mpsc
//!        │                         │                         │
//!        └──► snapshot matches ────┴──► invoke outside lock ─┘
//! ```
//!
//! # Delivery
//!
//! `dispatch` records the source, copies the matching listeners out of the
//! lock and invokes each one exactly once. A failing or panicking listener is
//! logged and counted but never stops the others. `MonitorEvent` payloads are
//! `bytes::Bytes`, so every listener shares the same allocation.

pub mod config;
pub mod deliver;
pub mod entry;
pub mod error;
pub mod event;
pub mod store;

pub use config::RegistryConfig;
pub use deliver::Deliver;
pub use entry::{ListenerState, RegistryStats};
pub use error::DeliveryError;
pub use event::{Filter, MonitorEvent, SourceId, Sourced};
pub use store::BroadcastRegistry;
