use from_variants::FromVariants;
use serde::{Deserialize, Serialize};

use crate::{Command, CommandId, Error, ErrorAt, Response, Value, registry::Registry};

/// The payload of an OpenC2 message: either a command or the response to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromVariants)]
#[serde(rename_all = "snake_case")]
pub enum Content<V> {
    Request(Command<V>),
    Response(Response<V>),
}

impl<V> Content<V> {
    /// The identifier of the command this content is, or answers.
    pub fn command_id(&self) -> Option<&CommandId> {
        match self {
            Content::Request(cmd) => cmd.command_id(),
            Content::Response(rsp) => rsp.command_id.as_ref(),
        }
    }

    pub fn as_command(&self) -> Option<&Command<V>> {
        match self {
            Content::Request(cmd) => Some(cmd),
            Content::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response<V>> {
        match self {
            Content::Request(_) => None,
            Content::Response(rsp) => Some(rsp),
        }
    }
}

impl<V: Value> Content<V> {
    /// Check the content against `registry`. Responses only carry data whose shape is
    /// enforced during deserialization, so only commands consult the registry.
    pub fn validate(&self, registry: &Registry) -> Result<(), Error> {
        match self {
            Content::Request(cmd) => cmd.validate(registry).at("request"),
            Content::Response(_) => Ok(()),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use serde_json::{Value, from_value, json};

    use crate::{Action, Command, Content, Registry, StatusCode, Target};

    #[test]
    fn deserialize_request() {
        let example: Content<Value> = from_value(json!(
            {
                "request": {
                    "action": "deny",
                    "target": {
                        "file": {
                            "path": "/hello.pdf"
                        }
                    },
                    "command_id": "123"
                }
            }
        ))
        .unwrap();

        let cmd = example.as_command().unwrap();
        assert_eq!(cmd.action(), Action::Deny);
        assert!(matches!(cmd.target(), Target::File(_)));
        assert_eq!(example.command_id().map(String::as_str), Some("123"));
        assert!(example.validate(&Registry::with_language_targets()).is_ok());
        assert!(example.validate(&Registry::new()).is_err());
    }

    #[test]
    fn deserialize_response() {
        let example: Content<Value> = from_value(json!(
            {
                "response": {
                    "status": 200,
                    "command_id": "123"
                }
            }
        ))
        .unwrap();

        assert_eq!(example.as_response().unwrap().status, StatusCode::Ok);
        assert_eq!(example.command_id().map(String::as_str), Some("123"));
    }

    #[test]
    fn from_command() {
        let cmd = Command::<Value>::builder(Action::Query, vec![crate::Feature::Versions])
            .build(&Registry::with_language_targets())
            .unwrap();
        assert!(matches!(Content::from(cmd), Content::Request(_)));
    }
}
