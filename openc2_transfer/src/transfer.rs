use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;

/// A failure reported by a transfer binding. The bytes being moved are never inspected, so
/// the only detail available is the binding's own error.
#[derive(Debug, thiserror::Error)]
#[error("transfer failed: {source}")]
pub struct TransferError {
    source: Box<dyn StdError + Send + Sync>,
}

impl TransferError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The peer is gone and no further bytes can be moved.
    pub fn closed() -> Self {
        Self::new("channel closed")
    }
}

/// The sending half of a transfer.
#[async_trait]
pub trait Transmit: Send + Sync {
    async fn send(&self, bytes: Vec<u8>) -> Result<(), TransferError>;
}

/// The pull-based receiving half of a transfer.
#[async_trait]
pub trait Receive: Send + Sync {
    /// Wait for the next message.
    async fn recv(&self) -> Result<Vec<u8>, TransferError>;
}

/// Called with each message a [`Subscribe`] transfer delivers.
pub type Handler = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// The push-based receiving half of a transfer.
pub trait Subscribe: Send + Sync {
    /// Deliver every message received from now on to `handler`.
    fn on_receive(&self, handler: Handler) -> Result<(), TransferError>;
}

#[async_trait]
impl<T: Transmit + ?Sized> Transmit for Arc<T> {
    async fn send(&self, bytes: Vec<u8>) -> Result<(), TransferError> {
        (**self).send(bytes).await
    }
}

#[async_trait]
impl<T: Transmit + ?Sized> Transmit for Box<T> {
    async fn send(&self, bytes: Vec<u8>) -> Result<(), TransferError> {
        (**self).send(bytes).await
    }
}

#[async_trait]
impl<T: Receive + ?Sized> Receive for Arc<T> {
    async fn recv(&self) -> Result<Vec<u8>, TransferError> {
        (**self).recv().await
    }
}

#[async_trait]
impl<T: Receive + ?Sized> Receive for Box<T> {
    async fn recv(&self) -> Result<Vec<u8>, TransferError> {
        (**self).recv().await
    }
}

impl<T: Subscribe + ?Sized> Subscribe for Arc<T> {
    fn on_receive(&self, handler: Handler) -> Result<(), TransferError> {
        (**self).on_receive(handler)
    }
}
