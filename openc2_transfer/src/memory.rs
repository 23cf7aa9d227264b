//! Transfers that move bytes within one process, for tests and embedded peers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
    lock::Mutex as AsyncMutex,
};

use crate::{Handler, Receive, Subscribe, TransferError, Transmit};

/// Create a connected pair of in-memory transfer halves.
pub fn channel() -> (Sender, Receiver) {
    let (tx, rx) = unbounded();
    (Sender(tx), Receiver(AsyncMutex::new(rx)))
}

/// The sending half of [`channel`].
#[derive(Debug, Clone)]
pub struct Sender(UnboundedSender<Vec<u8>>);

#[async_trait]
impl Transmit for Sender {
    async fn send(&self, bytes: Vec<u8>) -> Result<(), TransferError> {
        self.0
            .unbounded_send(bytes)
            .map_err(|_| TransferError::closed())
    }
}

/// The receiving half of [`channel`].
#[derive(Debug)]
pub struct Receiver(AsyncMutex<UnboundedReceiver<Vec<u8>>>);

#[async_trait]
impl Receive for Receiver {
    async fn recv(&self) -> Result<Vec<u8>, TransferError> {
        self.0
            .lock()
            .await
            .next()
            .await
            .ok_or_else(TransferError::closed)
    }
}

/// Hands every sent message straight to the subscribed handlers, on the sender's task.
#[derive(Clone, Default)]
pub struct Loopback {
    handlers: Arc<Mutex<Vec<Handler>>>,
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    fn handlers(&self) -> Result<Vec<Handler>, TransferError> {
        self.handlers
            .lock()
            .map(|handlers| handlers.clone())
            .map_err(|_| TransferError::new("loopback handler list poisoned"))
    }
}

impl std::fmt::Debug for Loopback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.lock().map(|h| h.len()).unwrap_or_default();
        f.debug_struct("Loopback")
            .field("handlers", &handlers)
            .finish()
    }
}

#[async_trait]
impl Transmit for Loopback {
    async fn send(&self, bytes: Vec<u8>) -> Result<(), TransferError> {
        let handlers = self.handlers()?;
        if handlers.is_empty() {
            return Err(TransferError::new("no subscriber attached to loopback"));
        }

        // Handlers are called outside the lock so they may send in turn.
        for handler in handlers {
            handler(bytes.clone());
        }
        Ok(())
    }
}

impl Subscribe for Loopback {
    fn on_receive(&self, handler: Handler) -> Result<(), TransferError> {
        self.handlers
            .lock()
            .map_err(|_| TransferError::new("loopback handler list poisoned"))?
            .push(handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{Loopback, channel};
    use crate::{Receive, Subscribe, Transmit};

    #[tokio::test]
    async fn channel_preserves_bytes_and_order() {
        let (tx, rx) = channel();
        tx.send(b"one".to_vec()).await.unwrap();
        tx.send(b"two".to_vec()).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), b"one");
        assert_eq!(rx.recv().await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn closed_channel() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(tx.send(vec![1]).await.is_err());

        let (tx, rx) = channel();
        drop(tx);
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn loopback_delivers_to_every_handler() {
        let loopback = Loopback::new();
        assert!(loopback.send(vec![0]).await.is_err());

        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let seen = seen.clone();
            loopback
                .on_receive(Arc::new(move |bytes: Vec<u8>| seen.lock().unwrap().push(bytes)))
                .unwrap();
        }

        loopback.send(vec![7, 8]).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![vec![7, 8], vec![7, 8]]);
    }
}
