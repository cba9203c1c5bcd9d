//! Live monitoring demo with simulated host agents and dashboard viewers
//!
//! Run with: cargo run --example live_monitor [EVENTS_PER_HOST]
//!
//! Examples:
//!   cargo run --example live_monitor                       # 5 events per host
//!   cargo run --example live_monitor 20                    # 20 events per host
//!   RUST_LOG=live_registry=debug cargo run --example live_monitor
//!
//! ## What it does
//!
//! - Three fake agents (10.0.0.1..3) publish JSON telemetry every 200ms
//! - Viewer 1 watches only 10.0.0.2
//! - Viewer 2 watches every host (wildcard)
//! - Viewer 3 has a tiny queue and a slow writer, so it drops events when full
//! - Viewer 2 disconnects halfway through and is unregistered

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use live_registry::{deliver, BroadcastRegistry, Filter, MonitorEvent, RegistryConfig};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const HOSTS: [&str; 3] = ["10.0.0.1", "10.0.0.2", "10.0.0.3"];

/// Spawn a writer task that drains a viewer's queue, standing in for a socket
fn spawn_viewer(
    name: &'static str,
    mut rx: mpsc::Receiver<MonitorEvent>,
    write_delay: Duration,
) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut written = 0;
        while let Some(event) = rx.recv().await {
            println!(
                "[{}] {} #{} {}",
                name,
                event.source,
                event.sequence,
                String::from_utf8_lossy(&event.payload)
            );
            written += 1;
            if !write_delay.is_zero() {
                tokio::time::sleep(write_delay).await;
            }
        }
        written
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let events_per_host: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5);

    let config = RegistryConfig::default().cleanup_interval(Duration::from_secs(1));
    let registry: Arc<BroadcastRegistry<u64>> = Arc::new(BroadcastRegistry::with_config(config));
    let cleanup = registry.spawn_cleanup_task();

    let (tx1, rx1) = mpsc::channel(1024);
    registry.register(1, Filter::sources(["10.0.0.2"]), deliver::bounded(tx1));
    let viewer1 = spawn_viewer("viewer-1", rx1, Duration::ZERO);

    let (tx2, rx2) = mpsc::channel(1024);
    registry.register(2, Filter::any(), deliver::bounded(tx2));
    let viewer2 = spawn_viewer("viewer-2", rx2, Duration::ZERO);

    let (tx3, rx3) = mpsc::channel(2);
    registry.register(3, Filter::any(), deliver::bounded(tx3));
    let viewer3 = spawn_viewer("viewer-3", rx3, Duration::from_millis(500));

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    for sequence in 1..=events_per_host {
        ticker.tick().await;

        for (i, host) in HOSTS.iter().enumerate() {
            let body = format!(
                "{{\"memoryUsed\":{},\"inboundBytes\":{}}}",
                512 + i as u64 * 64 + sequence,
                sequence * 1500
            );
            registry.publish(MonitorEvent::new(*host, sequence, Bytes::from(body)));
        }

        if sequence == events_per_host / 2 {
            println!("viewer-2 disconnecting");
            registry.unregister(&2);
        }
    }

    for handle in [1, 2, 3] {
        registry.unregister(&handle);
    }
    cleanup.abort();

    // Unregistering dropped each listener's sender, so every viewer queue is closed
    let stats = registry.stats();

    for (name, viewer) in [("viewer-1", viewer1), ("viewer-2", viewer2), ("viewer-3", viewer3)] {
        match viewer.await {
            Ok(written) => println!("{} wrote {} events", name, written),
            Err(e) => eprintln!("{} writer failed: {}", name, e),
        }
    }

    println!(
        "hosts seen={} dispatched={} delivered={} faults={}",
        stats.sources_seen, stats.events_dispatched, stats.deliveries, stats.delivery_faults
    );
}
