//! Connect and timeout metrics regression tests

use super::helpers::*;
use rpc_invoke::{
    BoxError, ConnectStrategy, Connector, Context, Invocation, StrategyChain, TimeoutStrategy,
};
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[test]
#[serial]
fn timeout_metrics_exist() {
    init_recorder();

    let context = Context::new()
        .with_strategy(TimeoutStrategy::new(Duration::from_millis(10)).unwrap());
    let decorated = StrategyChain::of(&context).apply(Invocation::new("slowCall", || {
        thread::sleep(Duration::from_millis(200));
        Ok::<_, BoxError>(())
    }));

    assert!(decorated.invoke().is_err());

    assert_counter_exists("rpc_timeouts_total");
    assert_metric_has_label("rpc_timeouts_total", "scope", "slowCall");
}

#[test]
#[serial]
fn connect_metrics_exist() {
    init_recorder();

    struct SecondTime(AtomicBool);

    impl Connector for SecondTime {
        fn is_connected(&self) -> bool {
            false
        }

        fn connect(&self, _endpoint: &str) -> Result<(), BoxError> {
            if self.0.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err("refused".into())
            }
        }
    }

    let strategy = ConnectStrategy::builder("metrics-node:7845", SecondTime(AtomicBool::new(false)))
        .backoff(Duration::ZERO)
        .build()
        .unwrap();
    let context = Context::new().with_strategy(strategy);
    let decorated =
        StrategyChain::of(&context).apply(Invocation::new("getBlock", || Ok::<_, BoxError>(())));

    decorated.invoke().unwrap();

    assert_counter_exists("rpc_connect_attempts_total");
    assert_metric_has_label("rpc_connect_attempts_total", "endpoint", "metrics-node:7845");
    assert_metric_has_label("rpc_connect_attempts_total", "result", "error");
    assert_metric_has_label("rpc_connect_attempts_total", "result", "success");
}
