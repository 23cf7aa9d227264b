use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::skip_serializing_none;

use crate::{ActionTargets, CommandId, Extensions, IsEmpty, Nsid, ValueKind, Version};

/// A message sent from an entity as the result of a command. Response
/// messages provide acknowledgement, status, results from a query or other information as requested from
/// the issuer of the command.
///
/// Response messages are solicited and correspond to a command. The recipient of the OpenC2 Response
/// is typically the entity that issued the command.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
#[non_exhaustive]
pub struct Response<V> {
    /// The status of the response to the command.
    pub status: StatusCode,
    /// A description providing additional information about the status of the response.
    pub status_text: Option<String>,
    #[serde(default)]
    pub results: Option<Results<V>>,
    /// The identifier of the command this response answers.
    pub command_id: Option<CommandId>,
}

impl<V> Response<V> {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            status_text: None,
            results: None,
            command_id: None,
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn with_results(mut self, results: impl Into<Results<V>>) -> Self {
        self.results = Some(results.into());
        self
    }

    /// Echo the identifier of the command being answered.
    pub fn for_command(mut self, command_id: impl Into<CommandId>) -> Self {
        self.command_id = Some(command_id.into());
        self
    }
}

impl<V> From<StatusCode> for Response<V> {
    fn from(value: StatusCode) -> Self {
        Self::new(value)
    }
}

/// The status codes a response may carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr, strum::Display,
)]
#[repr(u16)]
pub enum StatusCode {
    #[strum(to_string = "Processing")]
    Processing = 102,
    #[strum(to_string = "OK")]
    Ok = 200,
    #[strum(to_string = "Bad Request")]
    BadRequest = 400,
    #[strum(to_string = "Unauthorized")]
    Unauthorized = 401,
    #[strum(to_string = "Forbidden")]
    Forbidden = 403,
    #[strum(to_string = "Not Found")]
    NotFound = 404,
    #[strum(to_string = "Internal Error")]
    InternalError = 500,
    #[strum(to_string = "Not Implemented")]
    NotImplemented = 501,
    #[strum(to_string = "Service Unavailable")]
    ServiceUnavailable = 503,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether the command was accepted, or is still being processed.
    pub fn is_success(self) -> bool {
        matches!(self, StatusCode::Processing | StatusCode::Ok)
    }
}

impl ValueKind for StatusCode {
    const KIND: &'static str = "status_code";
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
#[non_exhaustive]
pub struct Results<V> {
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub versions: IndexSet<Version>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub profiles: IndexSet<Nsid>,
    pub pairs: Option<ActionTargets>,
    pub rate_limit: Option<u64>,
    #[serde(flatten, default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<V>,
}

impl<V> Results<V> {
    pub fn with_versions(mut self, versions: impl IntoIterator<Item = Version>) -> Self {
        self.versions.extend(versions);
        self
    }

    pub fn with_profiles(mut self, profiles: impl IntoIterator<Item = Nsid>) -> Self {
        self.profiles.extend(profiles);
        self
    }

    pub fn with_pairs(mut self, pairs: ActionTargets) -> Self {
        self.pairs = Some(pairs);
        self
    }

    pub fn with_extension(mut self, profile: Nsid, value: V) -> Self {
        self.extensions.insert(profile, value);
        self
    }
}

impl<V> Default for Results<V> {
    fn default() -> Self {
        Self {
            versions: IndexSet::new(),
            profiles: IndexSet::new(),
            pairs: None,
            rate_limit: None,
            extensions: Extensions::default(),
        }
    }
}

impl<V> IsEmpty for Results<V> {
    fn is_empty(&self) -> bool {
        self.versions.is_empty()
            && self.profiles.is_empty()
            && self.pairs.is_none()
            && self.rate_limit.is_none()
            && self.extensions.is_empty()
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use serde_json::{Value, from_value, json, to_value};

    use crate::{Action, Nsid, TargetType, Version, target::ProfileTargetType};

    use super::{Response, Results, StatusCode};

    #[test]
    fn pairs() {
        let example: Results<Value> = from_value(json!(
            {
                "pairs": {
                    "scan": ["ipv4_net", "file"],
                    "locate": ["device"],
                    "query": ["crwd/hostgroup"]
                }
            }
        ))
        .unwrap();

        let pairs = example.pairs.unwrap();

        let scan = &pairs[&Action::Scan];
        assert!(scan.contains(&TargetType::Ipv4Net));
        assert!(scan.contains(&TargetType::File));
        assert!(scan.len() == 2);

        let query = &pairs[&Action::Query];
        assert!(query.contains(&TargetType::ProfileDefined(ProfileTargetType::new(
            "crwd".parse::<Nsid>().unwrap(),
            "hostgroup"
        ))));
        assert!(query.len() == 1);
    }

    #[test]
    fn status_is_numeric() {
        let rsp = Response::<Value>::new(StatusCode::Ok)
            .for_command("abc")
            .with_results(Results::default().with_versions([Version::new(2, 0)]));
        assert_eq!(
            to_value(&rsp).unwrap(),
            json!({
                "status": 200,
                "results": { "versions": ["2.0"] },
                "command_id": "abc"
            })
        );
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(from_value::<Response<Value>>(json!({ "status": 418 })).is_err());
        let rsp: Response<Value> = from_value(json!({ "status": 501 })).unwrap();
        assert_eq!(rsp.status, StatusCode::NotImplemented);
        assert!(!rsp.status.is_success());
        assert_eq!(rsp.status.to_string(), "Not Implemented");
    }
}
