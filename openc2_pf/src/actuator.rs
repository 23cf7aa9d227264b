use openc2::{Action, ActionTargets, Actuator, Nsid, TargetType};

use crate::{NS, TargetType as PfTargetType};

/// A packet filter that executes PF commands.
///
/// `stateful` filters can additionally act on connections tracked by an application layer
/// firewall.
#[derive(Debug, Clone, Default)]
pub struct PacketFilter {
    pub stateful: bool,
}

impl Actuator for PacketFilter {
    fn profile(&self) -> &Nsid {
        NS
    }

    fn pairs(&self) -> ActionTargets {
        let mut connections = vec![
            TargetType::Ipv4Net,
            TargetType::Ipv6Net,
            TargetType::Ipv4Connection,
            TargetType::Ipv6Connection,
        ];
        if self.stateful {
            connections.push(PfTargetType::AdvConnection.into());
        }

        let mut pairs = ActionTargets::new();
        pairs.insert(Action::Query, [TargetType::Features].into_iter().collect());
        pairs.insert(Action::Deny, connections.iter().cloned().collect());
        pairs.insert(Action::Allow, connections.into_iter().collect());
        pairs.insert(
            Action::Delete,
            [TargetType::from(PfTargetType::RuleNumber)].into_iter().collect(),
        );
        pairs.insert(Action::Update, [TargetType::File].into_iter().collect());
        pairs
    }
}
