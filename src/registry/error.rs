//! Registry error types
//!
//! Error types for listener delivery. The registry itself has no failure
//! mode: unknown handles are ignored and filters are typed, so the only
//! thing that can go wrong is a listener failing to accept an event.

use std::any::Any;

/// Error returned by a listener's delivery callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The listener's connection or receiver is gone
    Closed,
    /// The listener's outbound queue is full, event dropped
    Full,
    /// The listener refused the event
    Rejected(String),
    /// The delivery callback panicked
    Panicked(String),
}

impl DeliveryError {
    /// Build a `Panicked` error from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        DeliveryError::Panicked(msg)
    }
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Closed => write!(f, "Listener closed"),
            DeliveryError::Full => write!(f, "Listener queue full"),
            DeliveryError::Rejected(reason) => write!(f, "Event rejected: {}", reason),
            DeliveryError::Panicked(msg) => write!(f, "Delivery panicked: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}
