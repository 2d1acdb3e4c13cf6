//! Future chain metrics regression tests

use super::helpers::*;
use rpc_invoke::{Context, FinishableFuture, FutureChain};
use serial_test::serial;

#[test]
#[serial]
fn future_chain_metrics_exist() {
    init_recorder();

    let context = Context::new().with_scope("getBlock");

    let converted = FinishableFuture::<usize>::new();
    FutureChain::new(converted.clone(), context.clone())
        .unwrap()
        .with_success_handler(|raw: String| Ok(raw.len()))
        .on_success("abc".to_string());

    let unhandled = FinishableFuture::<usize>::new();
    FutureChain::<String, usize>::new(unhandled.clone(), context.clone())
        .unwrap()
        .on_success("abc".to_string());

    let failed = FinishableFuture::<usize>::new();
    FutureChain::<String, usize>::new(failed.clone(), context.clone())
        .unwrap()
        .on_failure("closed");

    drop(FutureChain::<String, usize>::new(FinishableFuture::new(), context).unwrap());

    assert_counter_exists("future_chain_completions_total");
    for result in ["success", "no_handler", "failure", "cancelled"] {
        assert_metric_has_label("future_chain_completions_total", "result", result);
    }
}
