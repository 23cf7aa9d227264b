use openc2::{Command, Content, Encoder, Response, ResponseType};

use crate::{Config, Error, Outstanding, Role, Transmit};

/// Encodes content and hands it to a transfer.
///
/// Sending never retries; whatever the encoder or transfer reports is returned as-is.
#[derive(Debug)]
pub struct Producer<E, T> {
    encoder: E,
    transfer: Option<T>,
    outstanding: Outstanding,
    config: Config,
}

impl<E: Encoder, T> Producer<E, T> {
    /// Create a producer that has no transfer yet.
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            transfer: None,
            outstanding: Outstanding::default(),
            config: Config::default(),
        }
    }

    pub fn with_transfer(mut self, transfer: T) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Record sent commands in `outstanding`, typically shared with the [`crate::Consumer`]
    /// that reads the responses.
    pub fn with_outstanding(mut self, outstanding: Outstanding) -> Self {
        self.outstanding = outstanding;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn outstanding(&self) -> &Outstanding {
        &self.outstanding
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: Encoder, T: Default> Producer<E, T> {
    /// Use `T::default()` if no transfer has been supplied.
    pub fn with_default_transfer(mut self) -> Self {
        self.transfer.get_or_insert_with(T::default);
        self
    }
}

impl<E: Encoder, T: Transmit> Producer<E, T> {
    /// Send a command.
    ///
    /// A command with an id is outstanding from just before it is sent until its final
    /// response is received, unless it asked for no response. Sending a command whose id is
    /// still outstanding fails without sending.
    pub async fn send(&self, command: Command<E::Value>) -> Result<(), Error> {
        let transfer = self.transfer()?;
        let awaits_response = command.args().response_requested != Some(ResponseType::None);
        let content = Content::Request(command);
        let bytes = self.encode(&content)?;

        let tracked = content.command_id().filter(|_| awaits_response);
        if let Some(id) = tracked
            && !self.outstanding.insert(id.clone())
        {
            return Err(Error::DuplicateCommandId {
                command_id: id.clone(),
            });
        }

        let result = transfer.send(bytes).await;
        if result.is_err()
            && let Some(id) = tracked
        {
            self.outstanding.complete(id);
        }
        Ok(result?)
    }

    /// Send a response to a command received earlier.
    pub async fn respond(&self, response: Response<E::Value>) -> Result<(), Error> {
        let transfer = self.transfer()?;
        let bytes = self.encode(&Content::Response(response))?;
        transfer.send(bytes).await?;
        Ok(())
    }

    fn transfer(&self) -> Result<&T, Error> {
        self.transfer.as_ref().ok_or(Error::MissingTransfer {
            role: Role::Producer,
        })
    }

    fn encode(&self, content: &Content<E::Value>) -> Result<Vec<u8>, Error> {
        let bytes = self.encoder.encode(content)?;
        if bytes.len() > self.config.max_message_bytes {
            return Err(Error::TooLarge {
                len: bytes.len(),
                limit: self.config.max_message_bytes,
            });
        }

        tracing::trace!(
            content_type = self.encoder.content_type(),
            len = bytes.len(),
            command_id = ?content.command_id(),
            "sending"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openc2::{
        Action, Args, Command, Encoder, JsonEncoder, Registry, Response, ResponseType, RuleId,
        StatusCode, json,
    };
    use serde_json::json;

    use super::Producer;
    use crate::{Config, Error, Receive, memory};

    fn encoder() -> JsonEncoder {
        let mut registry = Registry::with_language_targets();
        openc2_pf::register(&mut registry).unwrap();
        JsonEncoder::new(Arc::new(registry))
    }

    fn command(encoder: &JsonEncoder, id: &str) -> json::Command {
        Command::builder(
            Action::Delete,
            openc2_pf::Target::RuleNumber(RuleId::new(1))
                .into_target()
                .unwrap(),
        )
        .command_id(id)
        .build(encoder.registry())
        .unwrap()
    }

    #[tokio::test]
    async fn missing_transfer_reported_before_encoding() {
        // Not valid against the registry, so encoding would fail if it were attempted.
        let unchecked: json::Command = serde_json::from_value(json!({
            "action": "deny",
            "target": { "crwd": { "hostgroup": "x" } }
        }))
        .unwrap();

        let producer = Producer::<_, memory::Sender>::new(encoder());
        let err = producer.send(unchecked).await.unwrap_err();
        assert!(matches!(err, Error::MissingTransfer { .. }));
    }

    #[tokio::test]
    async fn send_records_outstanding_command() {
        let (tx, rx) = memory::channel();
        let encoder = encoder();
        let cmd = command(&encoder, "c1");
        let expected = encoder.encode(&cmd.clone().into()).unwrap();

        let producer = Producer::new(encoder).with_transfer(tx);
        producer.send(cmd).await.unwrap();

        assert!(producer.outstanding().contains("c1"));
        assert_eq!(rx.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn unanswered_commands_not_tracked() {
        let (tx, _rx) = memory::channel();
        let encoder = encoder();
        let commands = ["c1", "c2", "c3"].map(|id| {
            Command::<serde_json::Value>::builder(Action::Query, vec![openc2::Feature::Versions])
                .args(Args::default().with_response_requested(ResponseType::None))
                .command_id(id)
                .build(encoder.registry())
                .unwrap()
        });

        let producer = Producer::new(encoder).with_transfer(tx);
        for cmd in commands {
            producer.send(cmd).await.unwrap();
        }
        assert!(producer.outstanding().is_empty());
    }

    #[tokio::test]
    async fn outstanding_id_not_reused() {
        let (tx, rx) = memory::channel();
        let encoder = encoder();
        let first = command(&encoder, "c1");
        let second = command(&encoder, "c1");

        let producer = Producer::new(encoder).with_transfer(tx);
        producer.send(first).await.unwrap();
        let err = producer.send(second).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateCommandId { command_id } if command_id == "c1"));
        assert_eq!(producer.outstanding().len(), 1);

        rx.recv().await.unwrap();
        producer.outstanding().complete("c1");
        producer.send(command(producer.encoder(), "c1")).await.unwrap();
    }

    #[tokio::test]
    async fn failed_send_forgets_command() {
        let (tx, rx) = memory::channel();
        drop(rx);
        let encoder = encoder();
        let cmd = command(&encoder, "c1");

        let producer = Producer::new(encoder).with_transfer(tx);
        let err = producer.send(cmd).await.unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert!(producer.outstanding().is_empty());
    }

    #[tokio::test]
    async fn encoding_errors_propagate() {
        let (tx, _rx) = memory::channel();
        let unchecked: json::Command = serde_json::from_value(json!({
            "action": "deny",
            "target": { "crwd": { "hostgroup": "x" } }
        }))
        .unwrap();

        let producer = Producer::new(encoder()).with_transfer(tx);
        let err = producer.send(unchecked).await.unwrap_err();
        assert!(matches!(
            err.as_message().map(openc2::Error::kind),
            Some(openc2::ErrorKind::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn oversized_message_rejected() {
        let (tx, _rx) = memory::channel();
        let producer = Producer::new(encoder())
            .with_transfer(tx)
            .with_config(Config {
                max_message_bytes: 8,
            });
        let err = producer
            .respond(Response::new(StatusCode::Ok).for_command("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TooLarge { limit: 8, .. }));
    }

    #[tokio::test]
    async fn default_transfer_is_used() {
        let producer = Producer::<_, memory::Loopback>::new(encoder()).with_default_transfer();
        // The default loopback has no subscriber, so the transfer itself fails.
        let err = producer
            .respond(Response::new(StatusCode::Ok).for_command("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
    }
}
