use serde::{Deserialize, Serialize};

/// Limits applied by producers and consumers.
///
/// Embedding applications usually deserialize this from their own configuration file;
/// every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The largest encoded message that will be sent or decoded.
    pub max_message_bytes: usize,
}

impl Config {
    pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_message_bytes: Self::DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}
