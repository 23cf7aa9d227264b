//! A producer and an actuator exchanging a command and its response over in-memory channels.

use std::sync::Arc;

use openc2::{
    Action, Command, Content, Feature, JsonEncoder, Registry, Response, Results, RuleId,
    StatusCode, Version, json,
};
use openc2_pf::PacketFilter;
use openc2_transfer::{Consumer, Error, Outstanding, Producer, memory};

fn registry() -> Arc<Registry> {
    let mut registry = Registry::with_language_targets();
    openc2_pf::register(&mut registry).unwrap();
    registry
        .register(
            "edge",
            openc2::Implementation::actuator(PacketFilter { stateful: false }),
            openc2::Nsid::PF,
        )
        .unwrap();
    Arc::new(registry)
}

/// Answer a command the way a PF actuator would.
fn handle(registry: &Registry, cmd: &json::Command) -> json::Response {
    let Some(id) = cmd.command_id() else {
        return Response::new(StatusCode::BadRequest).with_status_text("missing command_id");
    };

    match cmd.action() {
        Action::Query => Response::new(StatusCode::Ok)
            .for_command(id.clone())
            .with_results(
                Results::default()
                    .with_versions([Version::new(2, 0)])
                    .with_profiles(registry.profile_ids())
                    .with_pairs(registry.pairs()),
            ),
        Action::Delete => match openc2_pf::Target::try_from(cmd.target().clone()) {
            Ok(_) => Response::new(StatusCode::Ok).for_command(id.clone()),
            Err(err) => Response::from(err).for_command(id.clone()),
        },
        _ => Response::new(StatusCode::NotImplemented).for_command(id.clone()),
    }
}

#[tokio::test]
async fn command_and_response_round_trip() {
    let registry = registry();
    let (to_actuator, actuator_inbox) = memory::channel();
    let (to_producer, producer_inbox) = memory::channel();
    let outstanding = Outstanding::new();

    let producer = Producer::new(JsonEncoder::new(registry.clone()))
        .with_transfer(to_actuator)
        .with_outstanding(outstanding.clone());
    let responses = Consumer::new(JsonEncoder::new(registry.clone()))
        .with_transfer(producer_inbox)
        .with_outstanding(outstanding.clone());

    let actuator = Consumer::new(JsonEncoder::new(registry.clone())).with_transfer(actuator_inbox);
    let replies = Producer::new(JsonEncoder::new(registry.clone())).with_transfer(to_producer);

    let query = Command::builder(Action::Query, vec![Feature::Pairs, Feature::Profiles])
        .command_id("q1")
        .build(&registry)
        .unwrap();
    let delete = Command::builder(
        Action::Delete,
        openc2_pf::Target::RuleNumber(RuleId::new(12))
            .into_target()
            .unwrap(),
    )
    .command_id("d1")
    .build(&registry)
    .unwrap();

    producer.send(query.clone()).await.unwrap();
    producer.send(delete.clone()).await.unwrap();
    assert_eq!(outstanding.len(), 2);

    for expected in [&query, &delete] {
        let Content::Request(cmd) = actuator.recv().await.unwrap() else {
            panic!("actuator should only receive commands");
        };
        assert_eq!(&cmd, expected);
        replies.respond(handle(&registry, &cmd)).await.unwrap();
    }

    let Content::Response(rsp) = responses.recv().await.unwrap() else {
        panic!("producer should only receive responses");
    };
    assert_eq!(rsp.command_id.as_deref(), Some("q1"));
    let results = rsp.results.unwrap();
    assert!(results.profiles.contains(&openc2::Nsid::PF));
    assert!(results.pairs.unwrap().contains_key(&Action::Delete));

    let Content::Response(rsp) = responses.recv().await.unwrap() else {
        panic!("producer should only receive responses");
    };
    assert_eq!(rsp.status, StatusCode::Ok);
    assert_eq!(rsp.command_id.as_deref(), Some("d1"));
    assert!(outstanding.is_empty());
}

#[tokio::test]
async fn unsolicited_response_is_an_orphan() {
    let registry = registry();
    let (tx, rx) = memory::channel();

    let replies = Producer::new(JsonEncoder::new(registry.clone())).with_transfer(tx);
    let responses = Consumer::new(JsonEncoder::new(registry)).with_transfer(rx);

    replies
        .respond(Response::new(StatusCode::Ok).for_command("never-sent"))
        .await
        .unwrap();

    assert!(matches!(
        responses.recv().await,
        Err(Error::OrphanResponse { command_id: Some(id) }) if id == "never-sent"
    ));
}
