use rpc_invoke::{
    Context, ContextStorage, FailoverStrategy, RetryPolicy, RetryStrategy, Strategy, StrategyKind,
    TimeoutStrategy,
};
use std::thread;
use std::time::Duration;

#[test]
fn last_attached_strategy_of_a_kind_wins() {
    let context = Context::new()
        .with_strategy(RetryStrategy::new(1, Duration::ZERO).unwrap())
        .with_strategy(TimeoutStrategy::new(Duration::from_secs(1)).unwrap())
        .with_strategy(RetryStrategy::new(4, Duration::ZERO).unwrap());

    assert_eq!(context.retry().unwrap().count(), 4);
    assert_eq!(context.strategies().count(), 2);
    assert!(matches!(context.get(StrategyKind::Timeout), Some(Strategy::Timeout(_))));
}

#[test]
fn failover_strategy_keeps_every_policy() {
    let context = Context::new().with_strategy(
        FailoverStrategy::default()
            .with_policy(RetryPolicy::fixed(1, Duration::ZERO).unwrap())
            .with_policy(RetryPolicy::fixed(2, Duration::ZERO).unwrap().priority(9)),
    );

    let policies = context.failover().unwrap().policies();
    assert_eq!(policies.len(), 2);
    assert_eq!(policies[1].handler_priority(), 9);
}

#[test]
fn storage_is_shared_across_threads() {
    let storage = ContextStorage::new(Context::new().with_scope("client"));
    let writer = storage.clone();

    thread::spawn(move || {
        writer.update(|context| {
            context.with_strategy(TimeoutStrategy::new(Duration::from_millis(250)).unwrap())
        });
    })
    .join()
    .unwrap();

    let context = storage.get();
    assert_eq!(context.scope(), "client");
    assert_eq!(context.timeout().unwrap().timeout(), Duration::from_millis(250));
}

#[test]
fn set_returns_previous_context() {
    let storage = ContextStorage::default();
    let previous = storage.set(Context::new().with_scope("replaced"));
    assert_eq!(previous.scope(), Context::new().scope());
    assert_eq!(storage.get().scope(), "replaced");
}
