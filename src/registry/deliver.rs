//! Delivery callbacks
//!
//! A listener hands the registry something that implements [`Deliver`]. Any
//! `Fn(E) -> Result<(), DeliveryError>` closure qualifies. The transport layer
//! usually wants to push into a per-connection queue that a writer task
//! drains, which is what [`unbounded`] and [`bounded`] build.
//!
//! Delivery is fire-and-forget: the callback must return promptly and leave
//! the actual connection write to whoever owns the receiving end.

use tokio::sync::mpsc;

use super::error::DeliveryError;

/// Delivery callback for a registered listener
pub trait Deliver<E>: Send + Sync + 'static {
    /// Hand one event to the listener
    fn deliver(&self, event: E) -> Result<(), DeliveryError>;
}

impl<E, F> Deliver<E> for F
where
    F: Fn(E) -> Result<(), DeliveryError> + Send + Sync + 'static,
{
    fn deliver(&self, event: E) -> Result<(), DeliveryError> {
        self(event)
    }
}

/// Deliver into an unbounded channel
///
/// Fails with [`DeliveryError::Closed`] once the receiver is dropped.
pub fn unbounded<E: Send + 'static>(tx: mpsc::UnboundedSender<E>) -> impl Deliver<E> {
    move |event: E| tx.send(event).map_err(|_| DeliveryError::Closed)
}

/// Deliver into a bounded channel without waiting
///
/// A full queue drops the event for this listener only and reports
/// [`DeliveryError::Full`].
pub fn bounded<E: Send + 'static>(tx: mpsc::Sender<E>) -> impl Deliver<E> {
    move |event: E| {
        tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let deliver = unbounded(tx);

        deliver.deliver(1).unwrap();
        deliver.deliver(2).unwrap();

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));

        drop(rx);
        assert_eq!(deliver.deliver(3), Err(DeliveryError::Closed));
    }

    #[tokio::test]
    async fn test_bounded_full_then_closed() {
        let (tx, mut rx) = mpsc::channel::<u32>(1);
        let deliver = bounded(tx);

        deliver.deliver(1).unwrap();
        assert_eq!(deliver.deliver(2), Err(DeliveryError::Full));

        assert_eq!(rx.recv().await, Some(1));
        deliver.deliver(3).unwrap();
        assert_eq!(rx.recv().await, Some(3));

        drop(rx);
        assert_eq!(deliver.deliver(4), Err(DeliveryError::Closed));
    }

    #[test]
    fn test_closure_delivery() {
        let deliver = |event: &'static str| {
            if event.is_empty() {
                Err(DeliveryError::Rejected("empty".into()))
            } else {
                Ok(())
            }
        };

        assert!(deliver.deliver("cpu").is_ok());
        assert_eq!(
            deliver.deliver(""),
            Err(DeliveryError::Rejected("empty".into()))
        );
    }
}
