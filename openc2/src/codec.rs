//! Conversion between [`Content`] and wire bytes.
//!
//! An [`Encoder`] owns a shared [`Registry`] so that what it produces and accepts is always
//! valid content for the extensions known to the process.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Content, Error, Value,
    registry::{Namespace, Registry, RegistryError},
};

/// Serializes and parses OpenC2 content in one wire format.
pub trait Encoder: Send + Sync {
    /// The format's representation of profile-defined data.
    type Value: Value + Serialize + DeserializeOwned;

    /// The media type of the bytes this encoder produces.
    fn content_type(&self) -> &'static str;

    /// Serialize `content`, which must be valid against the encoder's registry.
    fn encode(&self, content: &Content<Self::Value>) -> Result<Vec<u8>, Error>;

    /// Parse and validate `bytes`.
    ///
    /// Malformed input yields a decoding error; well-formed content that names an
    /// unregistered target type yields the registry's unknown-name error.
    fn decode(&self, bytes: &[u8]) -> Result<Content<Self::Value>, Error>;
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    type Value = E::Value;

    fn content_type(&self) -> &'static str {
        (**self).content_type()
    }

    fn encode(&self, content: &Content<Self::Value>) -> Result<Vec<u8>, Error> {
        (**self).encode(content)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Content<Self::Value>, Error> {
        (**self).decode(bytes)
    }
}

fn check_encodable<V: Value>(registry: &Registry, content: &Content<V>) -> Result<(), Error> {
    content.validate(registry).map_err(Error::into_encoding)
}

fn check_decoded<V: Value>(registry: &Registry, content: Content<V>) -> Result<Content<V>, Error> {
    if let Content::Request(cmd) = &content {
        let kind = cmd.target().kind();
        if registry.targets().resolve_target(&kind).is_err() {
            return Err(RegistryError::UnknownName {
                namespace: Namespace::Targets,
                name: kind.to_string(),
            }
            .into());
        }
    }

    content.validate(registry)?;
    Ok(content)
}

/// Encodes content as JSON, the format required of every OpenC2 implementation.
#[cfg(feature = "json")]
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    registry: Arc<Registry>,
}

#[cfg(feature = "json")]
impl JsonEncoder {
    pub const CONTENT_TYPE: &str = "application/openc2+json;version=1.0";

    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(feature = "json")]
impl Encoder for JsonEncoder {
    type Value = serde_json::Value;

    fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    fn encode(&self, content: &Content<Self::Value>) -> Result<Vec<u8>, Error> {
        check_encodable(&self.registry, content)?;
        let bytes = serde_json::to_vec(content).map_err(Error::encoding)?;
        tracing::trace!(content_type = Self::CONTENT_TYPE, len = bytes.len(), "encoded");
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Content<Self::Value>, Error> {
        tracing::trace!(content_type = Self::CONTENT_TYPE, len = bytes.len(), "decoding");
        let content = serde_json::from_slice(bytes).map_err(Error::decoding)?;
        check_decoded(&self.registry, content)
    }
}

/// Encodes content as CBOR.
#[cfg(feature = "cbor")]
#[derive(Debug, Clone)]
pub struct CborEncoder {
    registry: Arc<Registry>,
}

#[cfg(feature = "cbor")]
impl CborEncoder {
    pub const CONTENT_TYPE: &str = "application/openc2+cbor;version=1.0";

    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(feature = "cbor")]
impl Encoder for CborEncoder {
    type Value = serde_cbor::Value;

    fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    fn encode(&self, content: &Content<Self::Value>) -> Result<Vec<u8>, Error> {
        check_encodable(&self.registry, content)?;
        let bytes = serde_cbor::to_vec(content).map_err(Error::encoding)?;
        tracing::trace!(content_type = Self::CONTENT_TYPE, len = bytes.len(), "encoded");
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Content<Self::Value>, Error> {
        tracing::trace!(content_type = Self::CONTENT_TYPE, len = bytes.len(), "decoding");
        let content = serde_cbor::from_slice(bytes).map_err(Error::decoding)?;
        check_decoded(&self.registry, content)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, from_value, json};

    use super::{Encoder, JsonEncoder};
    use crate::{
        Action, Args, Command, Content, ErrorKind, Nsid, ProfileSpec, Response, ResponseType,
        StatusCode, Target,
        registry::{Namespace, Registry, RegistryError},
    };

    fn encoder() -> JsonEncoder {
        let mut registry = Registry::with_language_targets();
        registry
            .register(
                "slpf",
                ProfileSpec::new()
                    .with_args(["drop_process"])
                    .with_targets(["rule_number"]),
                Nsid::SLPF,
            )
            .unwrap();
        registry
            .register_target(crate::target::ProfileTargetType::new(Nsid::SLPF, "rule_number"))
            .unwrap();
        JsonEncoder::new(Arc::new(registry))
    }

    #[test]
    fn command_round_trip() {
        let encoder = encoder();
        let cmd = Command::builder(
            Action::Deny,
            Target::profile_defined(Nsid::SLPF, "rule_number", json!(31)),
        )
        .args(
            Args::default()
                .with_response_requested(ResponseType::Complete)
                .with_extension(Nsid::SLPF, json!({ "drop_process": "reject" })),
        )
        .command_id("abc")
        .build(encoder.registry())
        .unwrap();

        let content = Content::from(cmd);
        let bytes = encoder.encode(&content).unwrap();
        assert_eq!(encoder.decode(&bytes).unwrap(), content);
    }

    #[test]
    fn response_round_trip() {
        let encoder = encoder();
        let content = Content::<Value>::from(
            Response::new(StatusCode::Processing)
                .with_status_text("queued")
                .for_command("abc"),
        );
        let bytes = encoder.encode(&content).unwrap();
        assert_eq!(encoder.decode(&bytes).unwrap(), content);
    }

    #[test]
    fn malformed_input() {
        let err = encoder().decode(b"{\"request\": ").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decoding(_)));

        let err = encoder()
            .decode(br#"{"request": {"action": "obliterate", "target": {"file": {}}}}"#)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decoding(_)));
    }

    #[test]
    fn unknown_target_type() {
        let err = encoder()
            .decode(br#"{"request": {"action": "deny", "target": {"crwd": {"hostgroup": "x"}}}}"#)
            .unwrap_err();
        assert_eq!(
            err.as_registry(),
            Some(&RegistryError::UnknownName {
                namespace: Namespace::Targets,
                name: "crwd/hostgroup".into(),
            })
        );
    }

    #[test]
    fn undeclared_args_rejected_on_decode() {
        let err = encoder()
            .decode(
                br#"{"request": {"action": "deny", "target": {"slpf": {"rule_number": 1}}, "args": {"slpf": {"persistent": true, "priority": 2}}}}"#,
            )
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgs { .. }));
    }

    #[test]
    fn unchecked_content_is_not_encoded() {
        // Deserializing directly skips the registry checks.
        let content: Content<Value> = from_value(json!({
            "request": { "action": "deny", "target": { "crwd": { "hostgroup": "x" } } }
        }))
        .unwrap();
        let err = encoder().encode(&content).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Encoding(_)));
    }
}

#[cfg(all(test, feature = "cbor"))]
mod cbor_tests {
    use std::{collections::BTreeMap, sync::Arc};

    use serde_cbor::Value;

    use super::{CborEncoder, Encoder};
    use crate::{Action, Args, Command, Content, ErrorKind, Nsid, ProfileSpec, Registry, Target};

    fn slpf_args(key: Value) -> Args<Value> {
        let map = BTreeMap::from([(key, Value::Bool(true))]);
        Args::default().with_extension(Nsid::SLPF, Value::Map(map))
    }

    #[test]
    fn command_round_trip() {
        let encoder = CborEncoder::new(Arc::new(Registry::with_language_targets()));
        let cmd = Command::<Value>::builder(Action::Deny, Target::DomainName("example.com".into()))
            .command_id("abc")
            .build(encoder.registry())
            .unwrap();
        let content = Content::from(cmd);
        let bytes = encoder.encode(&content).unwrap();
        assert_eq!(encoder.decode(&bytes).unwrap(), content);
    }

    #[test]
    fn non_text_arg_keys_rejected() {
        let mut registry = Registry::with_language_targets();
        registry
            .register("slpf", ProfileSpec::new().with_args(["running"]), Nsid::SLPF)
            .unwrap();

        let build = |key: Value| {
            Command::builder(Action::Deny, Target::DomainName("example.com".into()))
                .profile(Nsid::SLPF)
                .args(slpf_args(key))
                .build(&registry)
        };

        assert!(build(Value::Text("running".into())).is_ok());
        let err = build(Value::Integer(1)).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidArgs { reason, .. } if reason == "arguments must be a map"
        ));
    }
}
