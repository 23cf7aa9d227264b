use std::sync::Arc;

use openc2::{Content, Encoder, StatusCode};

use crate::{Config, Error, Outstanding, Receive, Role, Subscribe};

/// Takes bytes from a transfer and turns them back into validated content.
///
/// Responses are correlated with the commands in the consumer's [`Outstanding`] table; a
/// response that answers nothing sent from here is rejected.
#[derive(Debug)]
pub struct Consumer<E, T> {
    decoder: Decoder<E>,
    transfer: Option<T>,
}

/// The part of a consumer that callbacks registered by [`Consumer::attach`] keep alive.
#[derive(Debug)]
struct Decoder<E> {
    encoder: Arc<E>,
    outstanding: Outstanding,
    config: Config,
}

impl<E> Clone for Decoder<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: self.encoder.clone(),
            outstanding: self.outstanding.clone(),
            config: self.config,
        }
    }
}

impl<E: Encoder> Decoder<E> {
    fn decode(&self, bytes: &[u8]) -> Result<Content<E::Value>, Error> {
        let limit = self.config.max_message_bytes;
        if bytes.len() > limit {
            return Err(Error::TooLarge {
                len: bytes.len(),
                limit,
            });
        }

        let content = self.encoder.decode(bytes)?;
        tracing::trace!(
            content_type = self.encoder.content_type(),
            len = bytes.len(),
            command_id = ?content.command_id(),
            "received"
        );

        if let Content::Response(rsp) = &content {
            let known = match &rsp.command_id {
                // More responses follow a `processing` status.
                Some(id) if rsp.status == StatusCode::Processing => self.outstanding.contains(id),
                Some(id) => self.outstanding.complete(id),
                None => false,
            };

            if !known {
                tracing::warn!(command_id = ?rsp.command_id, status = %rsp.status, "orphan response");
                return Err(Error::OrphanResponse {
                    command_id: rsp.command_id.clone(),
                });
            }
        }

        Ok(content)
    }
}

impl<E: Encoder, T> Consumer<E, T> {
    /// Create a consumer that has no transfer yet.
    pub fn new(encoder: E) -> Self {
        Self {
            decoder: Decoder {
                encoder: Arc::new(encoder),
                outstanding: Outstanding::default(),
                config: Config::default(),
            },
            transfer: None,
        }
    }

    pub fn with_transfer(mut self, transfer: T) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Correlate responses against `outstanding`, typically shared with the
    /// [`crate::Producer`] that sent the commands.
    pub fn with_outstanding(mut self, outstanding: Outstanding) -> Self {
        self.decoder.outstanding = outstanding;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.decoder.config = config;
        self
    }

    pub fn outstanding(&self) -> &Outstanding {
        &self.decoder.outstanding
    }

    /// Decode and correlate one message that arrived outside of this consumer's transfer.
    pub fn accept(&self, bytes: &[u8]) -> Result<Content<E::Value>, Error> {
        self.decoder.decode(bytes)
    }

    fn transfer(&self) -> Result<&T, Error> {
        self.transfer.as_ref().ok_or(Error::MissingTransfer {
            role: Role::Consumer,
        })
    }
}

impl<E: Encoder, T: Default> Consumer<E, T> {
    /// Use `T::default()` if no transfer has been supplied.
    pub fn with_default_transfer(mut self) -> Self {
        self.transfer.get_or_insert_with(T::default);
        self
    }
}

impl<E: Encoder, T: Receive> Consumer<E, T> {
    /// Wait for the next message and decode it.
    pub async fn recv(&self) -> Result<Content<E::Value>, Error> {
        let bytes = self.transfer()?.recv().await?;
        self.decoder.decode(&bytes)
    }
}

impl<E: Encoder + 'static, T: Subscribe> Consumer<E, T> {
    /// Decode every message the transfer delivers from now on and pass the outcome to
    /// `handler`.
    pub fn attach<F>(&self, handler: F) -> Result<(), Error>
    where
        F: Fn(Result<Content<E::Value>, Error>) + Send + Sync + 'static,
    {
        let decoder = self.decoder.clone();
        self.transfer()?
            .on_receive(Arc::new(move |bytes: Vec<u8>| handler(decoder.decode(&bytes))))?;
        Ok(())
    }
}
