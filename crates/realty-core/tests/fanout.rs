//! End-to-end fan-out behavior across registry, filters and sinks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use realty_core::{ChannelSink, ConnectionSink, DeliveryError, Dispatcher, EventReceiver};
use realty_proto::{ChangeEvent, Entity, Filter, Stream};

fn property(id: &str, kind: &str, state: &str) -> Entity {
    Entity::from_row(
        Stream::Properties,
        json!({
            "id": id,
            "createdBy": "agent-1",
            "createdAt": 1_700_000_000_000i64,
            "address": "12 Harbour St",
            "coordinates": {"lat": -34.9, "lng": -56.16},
            "type": kind,
            "state": state,
            "relatedRealtorIds": ["r1", "r2"],
        }),
    )
    .unwrap()
}

fn connect(dispatcher: &Dispatcher, id: &str) -> EventReceiver {
    let (sink, rx) = ChannelSink::channel(16);
    dispatcher.connect(id, Arc::new(sink));
    rx
}

fn subscribe(dispatcher: &Dispatcher, id: &str, stream: Stream, filter: Value) {
    assert!(dispatcher
        .registry()
        .subscribe(id, stream, Filter::from_json(&filter)));
}

fn drain(rx: &mut EventReceiver) -> Vec<Arc<ChangeEvent>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Sink that always refuses and counts attempts.
#[derive(Default)]
struct BrokenSink {
    attempts: AtomicUsize,
}

impl ConnectionSink for BrokenSink {
    fn send(&self, _event: &Arc<ChangeEvent>) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Transport("socket reset".to_string()))
    }
}

#[test]
fn house_filter_and_subscribe_all() {
    let dispatcher = Dispatcher::default();
    let mut a = connect(&dispatcher, "a");
    let mut b = connect(&dispatcher, "b");
    subscribe(&dispatcher, "a", Stream::Properties, json!({"type": "house"}));
    subscribe(&dispatcher, "b", Stream::Properties, json!({}));

    let report = dispatcher.notify(ChangeEvent::created(property("p1", "apartment", "available")));
    assert_eq!(report.candidates, 2);
    assert_eq!(report.delivered, 1);
    assert!(drain(&mut a).is_empty());
    let received = drain(&mut b);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].event_name(), "new-property");

    dispatcher.notify(ChangeEvent::created(property("p2", "house", "available")));
    assert_eq!(drain(&mut a).len(), 1);
    assert_eq!(drain(&mut b).len(), 1);
}

#[test]
fn unsubscribed_streams_receive_nothing() {
    let dispatcher = Dispatcher::default();
    let mut rx = connect(&dispatcher, "a");
    subscribe(&dispatcher, "a", Stream::Persons, json!({}));

    let report = dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    assert_eq!(report.candidates, 0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn failing_connection_does_not_block_others() {
    let dispatcher = Dispatcher::default();
    let broken = Arc::new(BrokenSink::default());
    dispatcher.connect("broken", broken.clone());
    subscribe(&dispatcher, "broken", Stream::Properties, json!({}));

    let mut healthy: Vec<EventReceiver> = (0..4)
        .map(|i| {
            let id = format!("ok-{i}");
            let rx = connect(&dispatcher, &id);
            subscribe(&dispatcher, &id, Stream::Properties, json!({}));
            rx
        })
        .collect();

    let report = dispatcher.notify(ChangeEvent::updated(property("p1", "house", "rented")));
    assert_eq!(report.matched, 5);
    assert_eq!(report.delivered, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(broken.attempts.load(Ordering::SeqCst), 1);
    for rx in &mut healthy {
        assert_eq!(drain(rx).len(), 1);
    }
}

#[test]
fn full_queue_drops_without_affecting_others() {
    let dispatcher = Dispatcher::default();
    let (slow, mut slow_rx) = ChannelSink::channel(1);
    dispatcher.connect("slow", Arc::new(slow));
    subscribe(&dispatcher, "slow", Stream::Properties, json!({}));
    let mut fast = connect(&dispatcher, "fast");
    subscribe(&dispatcher, "fast", Stream::Properties, json!({}));

    dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    let report = dispatcher.notify(ChangeEvent::created(property("p2", "house", "rented")));
    assert_eq!(report.failed, 1);

    let slow_events = drain(&mut slow_rx);
    assert_eq!(slow_events.len(), 1);
    assert_eq!(slow_events[0].entity.id(), "p1");
    assert_eq!(drain(&mut fast).len(), 2);
}

#[test]
fn updates_arrive_in_commit_order() {
    let dispatcher = Dispatcher::default();
    let mut rx = connect(&dispatcher, "a");
    subscribe(&dispatcher, "a", Stream::Properties, json!({}));

    dispatcher.notify(ChangeEvent::updated(property("p1", "house", "available")));
    dispatcher.notify(ChangeEvent::updated(property("p1", "house", "reserved")));

    let states: Vec<Value> = drain(&mut rx)
        .iter()
        .map(|e| serde_json::to_value(e.entity.as_ref()).unwrap()["state"].clone())
        .collect();
    assert_eq!(states, vec![json!("available"), json!("reserved")]);
}

#[test]
fn unsubscribe_stops_delivery() {
    let dispatcher = Dispatcher::default();
    let mut rx = connect(&dispatcher, "a");
    subscribe(&dispatcher, "a", Stream::Properties, json!({}));
    assert!(dispatcher.registry().unsubscribe("a", Stream::Properties));

    let report = dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    assert_eq!(report.candidates, 0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn resubscribe_replaces_filter() {
    let dispatcher = Dispatcher::default();
    let mut rx = connect(&dispatcher, "a");
    subscribe(&dispatcher, "a", Stream::Properties, json!({"state": "rented"}));
    subscribe(&dispatcher, "a", Stream::Properties, json!({"state": "available"}));

    dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    dispatcher.notify(ChangeEvent::created(property("p2", "house", "available")));

    let ids: Vec<String> = drain(&mut rx).iter().map(|e| e.entity.id().to_string()).collect();
    assert_eq!(ids, vec!["p2"]);
}

#[test]
fn disconnect_is_final_and_idempotent() {
    let dispatcher = Dispatcher::default();
    let mut rx = connect(&dispatcher, "a");
    subscribe(&dispatcher, "a", Stream::Properties, json!({}));

    dispatcher.disconnect("a");
    dispatcher.disconnect("a");

    let report = dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    assert_eq!(report.candidates, 0);
    assert!(drain(&mut rx).is_empty());
    assert!(!dispatcher.registry().subscribe("a", Stream::Properties, Filter::all()));
}

#[test]
fn list_field_and_range_filters() {
    let dispatcher = Dispatcher::default();
    let mut by_realtor = connect(&dispatcher, "realtor");
    let mut by_range = connect(&dispatcher, "range");
    subscribe(
        &dispatcher,
        "realtor",
        Stream::Properties,
        json!({"relatedRealtorIds": ["r2", "r9"]}),
    );
    subscribe(
        &dispatcher,
        "range",
        Stream::Properties,
        json!({"createdAtAfter": 1_600_000_000_000i64, "createdAtBefore": 1_800_000_000_000i64}),
    );

    dispatcher.notify(ChangeEvent::created(property("p1", "house", "rented")));
    assert!(drain(&mut by_realtor).is_empty());
    assert_eq!(drain(&mut by_range).len(), 1);
}

#[test]
fn concurrent_notify_and_churn() {
    let dispatcher = Arc::new(Dispatcher::default());
    let mut stable = connect(&dispatcher, "stable");
    subscribe(&dispatcher, "stable", Stream::Properties, json!({}));

    let churn = {
        let dispatcher = Arc::clone(&dispatcher);
        std::thread::spawn(move || {
            for i in 0..200 {
                let id = format!("churn-{i}");
                let (sink, _rx) = ChannelSink::channel(1);
                dispatcher.connect(id.clone(), Arc::new(sink));
                dispatcher
                    .registry()
                    .subscribe(&id, Stream::Properties, Filter::all());
                dispatcher.disconnect(&id);
            }
        })
    };

    let mut delivered = 0;
    for i in 0..10 {
        let report = dispatcher.notify(ChangeEvent::created(property(&format!("p{i}"), "house", "rented")));
        delivered += usize::from(report.delivered > 0);
    }
    churn.join().unwrap();

    assert_eq!(delivered, 10);
    assert_eq!(drain(&mut stable).len(), 10);
    assert_eq!(dispatcher.connection_count(), 1);
}
