//! PF-specific command arguments for OpenC2

use openc2::{Error, IsEmpty, RuleId, Value};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::NS;

/// Specifies how to handle denied packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropProcess {
    /// Drop the packet and do not send a notification to the source of the packet.
    None,
    /// Drop the packet and send an ICMP host unreachable (or equivalent) to the source of the packet.
    Reject,
    /// Drop the traffic and send a false acknowledgment.
    FalseAck,
}

/// Specifies the direction for rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Both,
    Ingress,
    Egress,
}

/// PF-specific arguments.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    pub drop_process: Option<DropProcess>,
    pub persistent: Option<bool>,
    pub direction: Option<Direction>,
    /// Replace the rule with this identifier rather than appending a new one.
    pub insert_rule: Option<RuleId>,
    pub logged: Option<bool>,
    pub description: Option<String>,
    pub stateful: Option<bool>,
    pub priority: Option<u32>,
}

impl Args {
    /// The argument names this profile declares.
    pub const NAMES: [&'static str; 8] = [
        "drop_process",
        "persistent",
        "direction",
        "insert_rule",
        "logged",
        "description",
        "stateful",
        "priority",
    ];

    /// Extract the PF arguments from a command's args, if it has any.
    pub fn from_command<V>(args: &openc2::Args<V>) -> Result<Option<Self>, Error>
    where
        V: Value + Clone,
    {
        if !args.extensions.contains(NS) {
            return Ok(None);
        }

        args.extensions.require(NS).map(Some)
    }

    /// Attach these arguments to a command's args.
    pub fn into_command<V: Value>(self, args: openc2::Args<V>) -> Result<openc2::Args<V>, V::Error> {
        args.try_with_extension(NS.clone(), &self)
    }
}

impl IsEmpty for Args {
    fn is_empty(&self) -> bool {
        self.drop_process.is_none()
            && self.persistent.is_none()
            && self.direction.is_none()
            && self.insert_rule.is_none()
            && self.logged.is_none()
            && self.description.is_none()
            && self.stateful.is_none()
            && self.priority.is_none()
    }
}
