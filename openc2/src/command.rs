use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    Check, CommandId, DateTime, Duration, Error, ErrorAt, Extensions, IsEmpty, Nsid,
    ResponseType, Target, Value, ValueKind,
    error::ValidationError,
    registry::{Namespace, Registry, RegistryError},
};

/// An OpenC2 command communicates an action to be performed on a target.
///
/// Commands are checked against a [`Registry`] when they are built, so a `Command` obtained
/// from [`CommandBuilder::build`] or from a decoder only names registered target types and
/// declared arguments.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct Command<V> {
    action: Action,
    target: Target<V>,
    #[serde(default, skip_serializing_if = "IsEmpty::is_empty")]
    args: Args<V>,
    /// The actuator profile expected to perform the action.
    profile: Option<Nsid>,
    command_id: Option<CommandId>,
}

impl<V> Command<V> {
    pub fn builder(action: Action, target: impl Into<Target<V>>) -> CommandBuilder<V> {
        CommandBuilder {
            command: Command {
                action,
                target: target.into(),
                args: Args::default(),
                profile: None,
                command_id: None,
            },
        }
    }

    /// The task or activity to be performed.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The object of the action.
    pub fn target(&self) -> &Target<V> {
        &self.target
    }

    pub fn args(&self) -> &Args<V> {
        &self.args
    }

    pub fn profile(&self) -> Option<&Nsid> {
        self.profile.as_ref()
    }

    pub fn command_id(&self) -> Option<&CommandId> {
        self.command_id.as_ref()
    }

    /// The profile whose arguments this command may carry: the one defining its target, or
    /// failing that the one it is addressed to.
    fn declared_profile(&self) -> Option<&Nsid> {
        self.target.profile().or(self.profile.as_ref())
    }
}

impl<V: Value> Command<V> {
    /// Check the command against `registry`.
    ///
    /// Checks run in order and the first failing one is reported: target type, addressed
    /// profile, args timing, `command_id`, then profile-defined args.
    pub fn validate(&self, registry: &Registry) -> Result<(), Error> {
        let kind = self.target.kind();
        if registry.targets().resolve_target(&kind).is_err() {
            return Err(Error::invalid_target(kind));
        }

        if let Some(profile) = &self.profile
            && registry.profile_for(profile).is_none()
        {
            return Err(RegistryError::UnknownName {
                namespace: Namespace::Profiles,
                name: profile.to_string(),
            }
            .into());
        }

        self.args.check().at("args")?;
        if self
            .args
            .response_requested
            .is_some_and(ResponseType::requires_command_id)
            && self.command_id.is_none()
        {
            return Err(ValidationError::missing_required_field("command_id").into());
        }

        self.check_extensions(registry)
    }

    /// Each args extension must belong to a registered profile that this command is addressed
    /// to, and may only use arguments that profile declares. The first offending profile is
    /// reported along with all of its undeclared arguments.
    fn check_extensions(&self, registry: &Registry) -> Result<(), Error> {
        let declared = self.declared_profile();

        for (nsid, value) in &self.args.extensions {
            let Some(spec) = registry.profile_for(nsid) else {
                return Err(Error::invalid_args(nsid, "profile is not registered"));
            };

            if let Some(declared) = declared
                && declared != nsid
            {
                return Err(Error::invalid_args(
                    nsid,
                    format!("command is addressed to profile '{declared}'"),
                ));
            }

            let Some(keys) = value.object_keys() else {
                return Err(Error::invalid_args(nsid, "arguments must be a map"));
            };

            let undeclared = keys
                .into_iter()
                .filter(|key| !spec.declares_arg(key))
                .map(|key| format!("'{key}'"))
                .collect::<Vec<_>>();

            if !undeclared.is_empty() {
                return Err(Error::invalid_args(
                    nsid,
                    format!("undeclared arguments {}", undeclared.join(", ")),
                ));
            }
        }

        Ok(())
    }
}

/// Assembles a [`Command`], which is only released once it passes [`Command::validate`].
#[derive(Debug, Clone)]
pub struct CommandBuilder<V> {
    command: Command<V>,
}

impl<V> CommandBuilder<V> {
    pub fn args(mut self, args: Args<V>) -> Self {
        self.command.args = args;
        self
    }

    /// Address the command to actuators speaking `profile`.
    pub fn profile(mut self, profile: Nsid) -> Self {
        self.command.profile = Some(profile);
        self
    }

    pub fn command_id(mut self, command_id: impl Into<CommandId>) -> Self {
        self.command.command_id = Some(command_id.into());
        self
    }
}

impl<V: Value> CommandBuilder<V> {
    pub fn build(self, registry: &Registry) -> Result<Command<V>, Error> {
        self.command.validate(registry)?;
        Ok(self.command)
    }
}

/// The task or activity to be performed.
///
/// To support future extension of the OpenC2 language, this enum has a hidden variant
/// that prevents exhaustive matching.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Action {
    /// The ‘scan’ action is the systematic examination of some aspect of the entity or
    /// its environment in order to obtain information.
    Scan,
    /// The ‘locate’ action is used to find an object either physically, logically,
    /// functionally, or by organization.
    Locate,
    /// The ‘query’ action initiates a single request for information.
    Query,
    /// The ‘report’ action tasks an entity to provide information to a designated
    /// recipient of the information.
    Report,
    /// The ‘notify’ action is used to set an entity's alerting preferences.
    Notify,
    Deny,
    Contain,
    Allow,
    Start,
    Stop,
    Restart,
    Pause,
    Resume,
    Cancel,
    Set,
    Update,
    Move,
    Redirect,
    Create,
    Delete,
    Snapshot,
    Detonate,
    Restore,
    Save,
    Throttle,
    Delay,
    Substitute,
    Copy,
    Sync,
    Investigate,
    Mitigate,
    Remediate,
}

impl Action {
    /// Whether this action is used to gather information needed to determine the current state or enhance
    /// cyber situational awareness.
    pub fn controls_information(&self) -> bool {
        matches!(
            *self,
            Action::Scan | Action::Locate | Action::Query | Action::Report | Action::Notify
        )
    }

    /// Whether this action is used to control traffic flow and file permissions (e.g., allow/deny).
    pub fn controls_permissions(&self) -> bool {
        matches!(*self, Action::Deny | Action::Contain | Action::Allow)
    }

    /// Whether this action is used to control the state or the activity of a system, a process, a connection, a
    /// host, or a device. The actions are used to execute tasks, adjust configurations, set and update
    /// parameters, and modify attributes.
    pub fn controls_activity(&self) -> bool {
        matches!(
            *self,
            Action::Start
                | Action::Stop
                | Action::Restart
                | Action::Pause
                | Action::Resume
                | Action::Cancel
                | Action::Set
                | Action::Update
                | Action::Move
                | Action::Redirect
                | Action::Create
                | Action::Delete
                | Action::Snapshot
                | Action::Detonate
                | Action::Restore
                | Action::Save
                | Action::Throttle
                | Action::Delay
                | Action::Substitute
                | Action::Copy
                | Action::Sync
        )
    }

    /// Whether this action is an effect-based action.
    ///
    /// Effects-based actions are at a higher level of abstraction for purposes of communicating a
    /// desired impact rather than a command to execute specific tasks. This level of abstraction enables
    /// coordinated actions between enclaves, while permitting a local enclave to optimize its workflow
    /// for its specific environment. Effects-based action assumes that the recipient enclave has a
    /// decision-making capability because effects-based actions typically do not have a one-to-one
    /// mapping to the other actions.
    pub fn is_effect(&self) -> bool {
        matches!(
            *self,
            Action::Investigate | Action::Mitigate | Action::Remediate
        )
    }
}

impl ValueKind for Action {
    const KIND: &'static str = "action";
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct Args<V> {
    pub start_time: Option<DateTime>,
    pub stop_time: Option<DateTime>,
    pub duration: Option<Duration>,
    pub response_requested: Option<ResponseType>,
    /// A human-readable note to annotate or provide information regarding the action.
    pub comment: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions<V>,
}

impl<V> Args<V> {
    pub fn with_response_requested(mut self, response_type: ResponseType) -> Self {
        self.response_requested = Some(response_type);
        self
    }

    pub fn with_extension(mut self, profile: Nsid, value: V) -> Self {
        self.extensions.insert(profile, value);
        self
    }
}

impl<V: Value> Args<V> {
    /// Add profile-defined args from a typed value.
    pub fn try_with_extension(
        self,
        profile: Nsid,
        value: &impl Serialize,
    ) -> Result<Self, V::Error> {
        Ok(self.with_extension(profile, V::from_typed(value)?))
    }
}

impl<V> IsEmpty for Args<V> {
    fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.stop_time.is_none()
            && self.duration.is_none()
            && self.response_requested.is_none()
            && self.comment.is_none()
            && self.extensions.is_empty()
    }
}

impl<V> Check for Args<V> {
    fn check(&self) -> Result<(), Error> {
        let mut acc = Error::accumulator();
        if self.start_time.is_some() && self.stop_time.is_some() && self.duration.is_some() {
            acc.push(
                ValidationError::new(
                    "Only two of start_time, stop_time, and duration may be specified at once",
                )
                .at("duration"),
            );
        }

        if let (Some(start), Some(stop)) = (self.start_time, self.stop_time)
            && stop < start
        {
            acc.push(ValidationError::new("must not be before start_time").at("stop_time"));
        }

        acc.finish()
    }
}

impl<V> Default for Args<V> {
    fn default() -> Self {
        Self {
            start_time: None,
            stop_time: None,
            duration: None,
            response_requested: None,
            comment: None,
            extensions: Extensions::default(),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        ErrorKind, ProfileSpec, TargetType, registry::RegistryError, target::ProfileTargetType,
    };

    fn registry() -> Registry {
        let mut registry = Registry::with_language_targets();
        registry
            .register(
                "slpf",
                ProfileSpec::new()
                    .with_args(["drop_process", "running"])
                    .with_targets(["rule_number"]),
                Nsid::SLPF,
            )
            .unwrap();
        registry
            .register_target(ProfileTargetType::new(Nsid::SLPF, "rule_number"))
            .unwrap();
        registry
            .register("er", ProfileSpec::new().with_args(["account"]), Nsid::ER)
            .unwrap();
        registry
    }

    fn rule_number() -> Target<Value> {
        Target::profile_defined(Nsid::SLPF, "rule_number", json!(31))
    }

    #[test]
    fn unregistered_target_is_invalid() {
        let mut registry = Registry::new();
        let err = Command::<Value>::builder(Action::Deny, rule_number())
            .build(&registry)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidTarget { target } if target == "slpf/rule_number"));

        registry
            .register_target(ProfileTargetType::new(Nsid::SLPF, "rule_number"))
            .unwrap();
        let cmd = Command::builder(Action::Deny, rule_number())
            .build(&registry)
            .unwrap();
        assert_eq!(
            cmd.target().kind(),
            TargetType::ProfileDefined(ProfileTargetType::new(Nsid::SLPF, "rule_number"))
        );
    }

    #[test]
    fn language_target_accepted() {
        let cmd = Command::<Value>::builder(Action::Query, vec![crate::Feature::Pairs])
            .command_id("abc")
            .build(&registry())
            .unwrap();
        assert_eq!(cmd.action(), Action::Query);
        assert_eq!(cmd.command_id().map(String::as_str), Some("abc"));
    }

    #[test]
    fn declared_args_accepted() {
        let args = Args::default().with_extension(Nsid::SLPF, json!({ "drop_process": "none" }));
        assert!(
            Command::builder(Action::Deny, rule_number())
                .args(args)
                .build(&registry())
                .is_ok()
        );
    }

    #[test]
    fn undeclared_arg_rejected() {
        let args = Args::default().with_extension(Nsid::SLPF, json!({ "persistent": true }));
        let err = Command::builder(Action::Deny, rule_number())
            .args(args)
            .build(&registry())
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidArgs { profile, reason }
                if profile == "slpf" && reason.contains("'persistent'")
        ));
    }

    #[test]
    fn every_undeclared_arg_named_in_one_error() {
        let args = Args::default().with_extension(
            Nsid::SLPF,
            json!({ "a": 1, "drop_process": "none", "b": 2 }),
        );
        let err = Command::builder(Action::Deny, rule_number())
            .args(args)
            .build(&registry())
            .unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgs { profile, reason } => {
                assert_eq!(profile, "slpf");
                assert!(reason.contains("'a'"));
                assert!(reason.contains("'b'"));
                assert!(!reason.contains("drop_process"));
            }
            other => panic!("expected InvalidArgs, got {other:?}"),
        }
    }

    #[test]
    fn args_for_other_profile_rejected() {
        let args = Args::default().with_extension(Nsid::ER, json!({ "account": "root" }));
        let err = Command::builder(Action::Deny, rule_number())
            .args(args)
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgs { profile, .. } if profile == "er"));
    }

    #[test]
    fn args_for_unregistered_profile_rejected() {
        let args = Args::default().with_extension(Nsid::PF, json!({ "running": true }));
        let err = Command::builder(Action::Cancel, Target::Command("cmd-1".into()))
            .args(args)
            .build(&registry())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgs { reason, .. } if reason.contains("not registered")));
    }

    #[test]
    fn unknown_profile_rejected() {
        let err = Command::<Value>::builder(Action::Deny, rule_number())
            .profile(Nsid::PF)
            .build(&registry())
            .unwrap_err();
        assert!(matches!(
            err.as_registry(),
            Some(RegistryError::UnknownName { namespace: Namespace::Profiles, name }) if name == "pf"
        ));
    }

    #[test]
    fn args_timing() {
        let args: Args<Value> = Args {
            start_time: Some(DateTime::from_millis(10)),
            stop_time: Some(DateTime::from_millis(20)),
            duration: Some(Duration::from_millis(10)),
            ..Default::default()
        };
        let err = args.check().unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().path().to_string(),
            "duration"
        );

        let err = Command::builder(Action::Deny, rule_number())
            .args(args)
            .build(&registry())
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().path().to_string(), "args.duration");
    }

    #[test]
    fn requested_response_needs_command_id() {
        let args = Args::default().with_response_requested(ResponseType::Complete);
        let err = Command::<Value>::builder(Action::Deny, rule_number())
            .args(args.clone())
            .build(&registry())
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().path().to_string(), "command_id");

        assert!(
            Command::builder(Action::Deny, rule_number())
                .args(args)
                .command_id("1")
                .build(&registry())
                .is_ok()
        );
    }

    #[test]
    fn stop_before_start() {
        let args: Args<Value> = Args {
            start_time: Some(DateTime::from_millis(20)),
            stop_time: Some(DateTime::from_millis(10)),
            ..Default::default()
        };
        assert!(args.check().is_err());
    }

    #[test]
    fn serializes_without_empty_args() {
        let cmd = Command::builder(Action::Deny, rule_number())
            .command_id("1")
            .build(&registry())
            .unwrap();
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "action": "deny",
                "target": { "slpf": { "rule_number": 31 } },
                "command_id": "1"
            })
        );
    }

    #[test]
    fn action_display_matches_wire() {
        assert_eq!(Action::Investigate.to_string(), "investigate");
        assert_eq!(serde_json::to_value(Action::Investigate).unwrap(), json!("investigate"));
    }
}
