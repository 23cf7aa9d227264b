use openc2::CommandId;

use crate::TransferError;

/// The side of an exchange an operation was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Producer,
    Consumer,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The role was used before a transfer was supplied.
    #[error("{role} has no transfer")]
    MissingTransfer { role: Role },
    #[error(transparent)]
    Message(#[from] openc2::Error),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// A response arrived that answers no command sent from here.
    #[error("response to unknown command {}", command_id.as_deref().unwrap_or("<none>"))]
    OrphanResponse { command_id: Option<CommandId> },
    /// A command was sent while another with the same id is still awaiting its response.
    #[error("command {command_id} is already outstanding")]
    DuplicateCommandId { command_id: CommandId },
    #[error("message of {len} bytes exceeds the limit of {limit} bytes")]
    TooLarge { len: usize, limit: usize },
}

impl Error {
    /// The OpenC2 error, if the failure came from encoding, decoding or validation.
    pub fn as_message(&self) -> Option<&openc2::Error> {
        match self {
            Error::Message(err) => Some(err),
            _ => None,
        }
    }
}
