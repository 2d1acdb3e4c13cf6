use rpc_invoke::FailoverEvent;
use rpc_invoke_core::InvocationEvent;
use rpc_invoke_core::events::{EventListeners, FnListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn retry_event() -> FailoverEvent {
    FailoverEvent::Retry {
        scope: "getBlock".to_string(),
        timestamp: Instant::now(),
        attempt: 1,
        delay: Duration::ZERO,
    }
}

#[test]
fn panic_in_one_listener_does_not_prevent_others() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let (b, a) = (Arc::clone(&before), Arc::clone(&after));

    let mut listeners = EventListeners::new();
    listeners.add(FnListener::new(move |_: &FailoverEvent| {
        b.fetch_add(1, Ordering::SeqCst);
    }));
    listeners.add(FnListener::new(|_: &FailoverEvent| panic!("listener bug")));
    listeners.add(FnListener::new(move |_: &FailoverEvent| {
        a.fetch_add(1, Ordering::SeqCst);
    }));

    listeners.emit(&retry_event());
    listeners.emit(&retry_event());

    assert_eq!(before.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 2);
    assert_eq!(listeners.len(), 3);
}

#[test]
fn listeners_see_event_metadata() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);

    let mut listeners = EventListeners::new();
    listeners.add(FnListener::new(move |event: &FailoverEvent| {
        s.lock()
            .push((event.event_type(), event.scope().to_string()));
    }));
    listeners.emit(&retry_event());

    assert_eq!(*seen.lock(), vec![("retry", "getBlock".to_string())]);
}
