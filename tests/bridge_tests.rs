use mbx_bridge::bridge::event::EventKind;
use mbx_bridge::bridge::framer::{Framing, StreamFramer};
use mbx_bridge::bridge::policy::{BoundedRetry, FailFast, ReadDecision, ReadErrorPolicy};
use mbx_bridge::bridge::reactor::Outcome;
use mbx_bridge::error::{BridgeError, PayloadParseError};
use mbx_bridge::telemetry::metrics::{
    MetricAction, MetricDescriptor, CAR_ARRIVED, CHARGE_STATUS, DESCRIPTORS, DOOR_OPENED, MULE_ALARM, POWER_STATUS,
    TEMPERATURE,
};
use mbx_bridge::telemetry::registry::{MetricValue, MetricsRegistry};
use mbx_bridge::transport::mock::ScriptedTransport;
use mbx_bridge::Bridge;
use std::io;
use std::sync::Arc;
use std::time::Duration;

fn registry() -> Arc<MetricsRegistry> {
    Arc::new(MetricsRegistry::with_descriptors(DESCRIPTORS).unwrap())
}

fn bridge(framing: Framing, registry: &Arc<MetricsRegistry>) -> Bridge<ScriptedTransport> {
    Bridge::new(ScriptedTransport::new(), StreamFramer::new(framing), registry.clone())
}

#[test]
fn test_mule_alarm_touches_only_its_counter() {
    let registry = registry();
    let mut bridge = bridge(Framing::default(), &registry);
    let before = registry.snapshot();

    let outcomes = bridge.step(b"MuleAlarm|");

    assert_eq!(
        outcomes,
        vec![Outcome::Applied {
            event: EventKind::MuleAlarm,
            action: MetricAction::Increment(MULE_ALARM),
        }]
    );

    let after = registry.snapshot();
    for (name, value) in &after {
        if name == MULE_ALARM {
            assert_eq!(*value, MetricValue::Counter(1));
        } else {
            assert_eq!(Some(value), before.get(name), "{name} must not change");
        }
    }
}

#[test]
fn test_garbage_mutates_nothing() {
    let registry = registry();
    let mut bridge = bridge(Framing::default(), &registry);
    let before = registry.snapshot();

    let outcomes = bridge.step(b"garbage||");

    assert_eq!(
        outcomes,
        vec![
            Outcome::NoOp { record: "garbage".to_string() },
            Outcome::NoOp { record: String::new() },
        ]
    );
    assert_eq!(registry.snapshot(), before);
}

#[test]
fn test_payload_failure_is_contained() {
    let registry = registry();
    let mut bridge = bridge(Framing::default(), &registry);

    let outcomes = bridge.step(b"MailboxTemperature:|MailboxDoorOpened|");

    assert!(matches!(
        &outcomes[0],
        Outcome::PayloadRejected { record, fault: PayloadParseError::InvalidNumber { .. } }
            if record == "MailboxTemperature:"
    ));
    // The next record in the same chunk is still processed
    assert_eq!(registry.get(DOOR_OPENED), Some(MetricValue::Counter(1)));
    assert_eq!(registry.get(TEMPERATURE), Some(MetricValue::Gauge(0.0)));
}

#[test]
fn test_mixed_stream_across_chunks() {
    let registry = registry();
    let mut bridge = bridge(Framing::default(), &registry);

    assert!(bridge.step(b"ChargerChargeStatusOn|MailboxTemp").is_empty());
    assert_eq!(bridge.framer().pending(), b"ChargerChargeStatusOn|MailboxTemp");
    let outcomes = bridge
        .step(b"erature:41.5|ChargerPowerSourceGood|CarArrived|CarArrived|");

    assert_eq!(outcomes.len(), 5);
    assert_eq!(registry.get(CHARGE_STATUS), Some(MetricValue::Gauge(1.0)));
    assert_eq!(registry.get(TEMPERATURE), Some(MetricValue::Gauge(41.5)));
    assert_eq!(registry.get(POWER_STATUS), Some(MetricValue::Gauge(1.0)));
    assert_eq!(registry.get(CAR_ARRIVED), Some(MetricValue::Counter(2)));

    bridge.step(b"ChargerChargeStatusOff|ChargerPowerSourceBad|");
    assert_eq!(registry.get(CHARGE_STATUS), Some(MetricValue::Gauge(0.0)));
    assert_eq!(registry.get(POWER_STATUS), Some(MetricValue::Gauge(0.0)));
}

#[test]
fn test_chunk_per_record_framing() {
    let registry = registry();
    let mut bridge = bridge(Framing::ChunkPerRecord, &registry);

    bridge.step(b"MuleAlarm");
    bridge.step(b"MuleAlarm");

    assert_eq!(registry.get(MULE_ALARM), Some(MetricValue::Counter(2)));
}

#[test]
fn test_overflow_reported_as_outcome() {
    let registry = registry();
    let framer = StreamFramer::default().with_max_pending(4);
    let mut bridge = Bridge::new(ScriptedTransport::new(), framer, registry.clone());

    let outcomes = bridge.step(b"noise-without-end");
    assert!(matches!(outcomes.as_slice(), [Outcome::Overflow(o)] if o.limit == 4));

    // The rest of the cut record is skipped, the next record is applied
    bridge.step(b"-tail|MuleAlarm|");
    assert_eq!(registry.get(MULE_ALARM), Some(MetricValue::Counter(1)));
}

#[test]
fn test_registry_rejection_is_contained() {
    let registry = Arc::new(MetricsRegistry::new());
    registry
        .register(&MetricDescriptor::counter(MULE_ALARM, "mule"))
        .unwrap();
    let mut bridge = bridge(Framing::default(), &registry);

    // 1. The unregistered metric is reported, the rest of the chunk still runs
    let outcomes = bridge.step(b"MailboxDoorOpened|MuleAlarm|");
    assert!(matches!(
        &outcomes[0],
        Outcome::Rejected { event: EventKind::DoorOpened, action: MetricAction::Increment(DOOR_OPENED), reason }
            if reason.contains(DOOR_OPENED)
    ));
    assert!(matches!(&outcomes[1], Outcome::Applied { event: EventKind::MuleAlarm, .. }));
    assert_eq!(registry.get(MULE_ALARM), Some(MetricValue::Counter(1)));
}

#[test]
fn test_run_survives_registry_rejection() {
    let registry = Arc::new(MetricsRegistry::new());
    registry
        .register(&MetricDescriptor::counter(MULE_ALARM, "mule"))
        .unwrap();
    let transport = ScriptedTransport::new()
        .chunk("MailboxDoorOpened|MuleAlarm|")
        .chunk("MuleAlarm|");
    let bridge = Bridge::new(transport, StreamFramer::default(), registry.clone());

    let err = bridge.run();

    // Only the end of the stream stops the loop
    assert!(matches!(err, BridgeError::TransportRead(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    assert_eq!(registry.get(MULE_ALARM), Some(MetricValue::Counter(2)));
    assert_eq!(registry.get(DOOR_OPENED), None);
}

#[test]
fn test_run_processes_stream_then_fails_on_read_error() {
    let registry = registry();
    let transport = ScriptedTransport::new()
        .chunk("MailboxDoorOpened|Mule")
        .chunk("Alarm|")
        .fail(io::ErrorKind::BrokenPipe)
        .chunk("MuleAlarm|");
    let bridge = Bridge::new(transport, StreamFramer::default(), registry.clone());

    let err = bridge.run();

    assert!(matches!(err, BridgeError::TransportRead(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert_eq!(registry.get(DOOR_OPENED), Some(MetricValue::Counter(1)));
    assert_eq!(
        registry.get(MULE_ALARM),
        Some(MetricValue::Counter(1)),
        "Nothing after the failed read is consumed"
    );
}

#[test]
fn test_run_treats_end_of_stream_as_fatal() {
    let registry = registry();
    let transport = ScriptedTransport::new().chunk("CarDeparted|");
    let bridge = Bridge::new(transport, StreamFramer::default(), registry.clone());

    let err = bridge.run();
    assert!(matches!(err, BridgeError::TransportRead(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
}

#[test]
fn test_run_reads_large_chunks_in_read_units() {
    let registry = registry();
    let payload = "CarHeardSound|".repeat(50);
    let transport = ScriptedTransport::new().chunk(payload);
    let bridge = Bridge::new(transport, StreamFramer::default(), registry.clone());

    let _ = bridge.run();
    assert_eq!(
        registry.get(mbx_bridge::telemetry::metrics::HEARD_SOUND),
        Some(MetricValue::Counter(50))
    );
}

#[test]
fn test_bounded_retry_survives_transient_failures() {
    let registry = registry();
    let transport = ScriptedTransport::new()
        .fail(io::ErrorKind::TimedOut)
        .chunk("MuleAlarm|")
        .fail(io::ErrorKind::TimedOut)
        .fail(io::ErrorKind::TimedOut)
        .chunk("MuleAlarm|")
        .fail(io::ErrorKind::TimedOut)
        .fail(io::ErrorKind::TimedOut)
        .fail(io::ErrorKind::TimedOut);
    let bridge = Bridge::new(transport, StreamFramer::default(), registry.clone())
        .with_policy(BoundedRetry::new(2, Duration::from_millis(1)));

    let err = bridge.run();

    assert!(matches!(err, BridgeError::TransportRead(ref e) if e.kind() == io::ErrorKind::TimedOut));
    assert_eq!(registry.get(MULE_ALARM), Some(MetricValue::Counter(2)));
}

#[test]
fn test_policies_decide() {
    let err = io::Error::new(io::ErrorKind::Other, "boom");

    assert_eq!(FailFast.on_read_error(&err), ReadDecision::Abort);

    let mut retry = BoundedRetry::new(1, Duration::from_millis(5));
    assert_eq!(retry.on_read_error(&err), ReadDecision::Retry(Duration::from_millis(5)));
    assert_eq!(retry.on_read_error(&err), ReadDecision::Abort);
    retry.on_read_ok();
    assert_eq!(retry.on_read_error(&err), ReadDecision::Retry(Duration::from_millis(5)));
}
