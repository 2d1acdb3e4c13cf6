//! Failover metrics regression tests

use super::helpers::*;
use rpc_invoke::{BoxError, FailoverHandler, Invocation, JustRetryFailoverHandler, Response};
use serial_test::serial;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
#[serial]
fn retry_metrics_exist() {
    init_recorder();

    let handler = JustRetryFailoverHandler::builder().count(3).build().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let invocation = Invocation::new("failoverRecovered", move || {
        if c.fetch_add(1, Ordering::SeqCst) == 0 {
            Err::<(), BoxError>("reset".into())
        } else {
            Ok(())
        }
    });

    assert!(handler.handle(&invocation, Response::failure("reset")).is_success());

    assert_counter_exists("failover_retries_total");
    assert_metric_has_label("failover_retries_total", "scope", "failoverRecovered");
    assert_counter_exists("failover_calls_total");
    assert_metric_has_label("failover_calls_total", "result", "success");
}

#[test]
#[serial]
fn retry_exhausted_metrics() {
    init_recorder();

    let handler = JustRetryFailoverHandler::builder().count(2).build().unwrap();
    let invocation = Invocation::new("failoverExhausted", || Err::<(), BoxError>("down".into()));

    assert!(handler.handle(&invocation, Response::failure("down")).is_failure());

    assert_metric_has_label("failover_calls_total", "scope", "failoverExhausted");
    assert_metric_has_label("failover_calls_total", "result", "exhausted");
}
