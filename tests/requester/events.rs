use rpc_invoke::{BoxError, ErrorKind, Invocation, Requester};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

#[test]
fn one_event_per_request() {
    let successes = Arc::new(AtomicUsize::new(0));
    let recoveries = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let (s, r, e) = (
        Arc::clone(&successes),
        Arc::clone(&recoveries),
        Arc::clone(&errors),
    );

    let requester = Requester::builder()
        .name("events")
        .retry(1, Duration::ZERO)
        .on_success(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .on_recovered(move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(move |kind, _| e.lock().push(kind))
        .build()
        .unwrap();

    requester
        .request(Invocation::new("ok", || Ok::<_, BoxError>(())))
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    requester
        .request(Invocation::new("flaky", move || {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                Err::<(), BoxError>("reset".into())
            } else {
                Ok(())
            }
        }))
        .unwrap();

    requester
        .request(Invocation::new("down", || Err::<(), BoxError>("down".into())))
        .unwrap_err();

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(recoveries.load(Ordering::SeqCst), 1);
    assert_eq!(*errors.lock(), vec![ErrorKind::Transport]);
}

#[test]
fn requests_log_through_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();

    let requester = Requester::builder()
        .name("traced")
        .retry(1, Duration::ZERO)
        .build()
        .unwrap();

    let err = requester
        .request(Invocation::new("down", || Err::<(), BoxError>("down".into())))
        .unwrap_err();
    assert!(err.is_transport());
}
