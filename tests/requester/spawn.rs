use rpc_invoke::{BoxError, Context, ContextHolder, Invocation, Requester, RpcError};
use std::time::Duration;
use tokio::runtime::Handle;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_completes_future_with_value() {
    let requester = Requester::builder()
        .retry(2, Duration::ZERO)
        .build()
        .unwrap();

    let future = requester.spawn(
        Invocation::new("getBlockCount", || Ok::<_, BoxError>(1024u64)),
        &Handle::current(),
    );

    let value = tokio::task::spawn_blocking(move || future.get()).await.unwrap();
    assert_eq!(value.unwrap(), 1024);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_carries_caller_context() {
    let requester = Requester::default();
    let future = {
        let _guard = ContextHolder::attach(Context::new().with_scope("client"));
        requester.spawn(
            Invocation::new("getChainInfo", || {
                Ok::<_, BoxError>(ContextHolder::get().map(|c| c.scope().to_string()))
            }),
            &Handle::current(),
        )
    };

    let scope = tokio::task::spawn_blocking(move || future.get()).await.unwrap();
    assert_eq!(scope.unwrap().as_deref(), Some("getChainInfo"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_failure_keeps_rpc_error() {
    let requester = Requester::default();
    let future = requester.spawn(
        Invocation::new("sendTx", || Err::<(), BoxError>("rejected".into())),
        &Handle::current(),
    );

    let err = tokio::task::spawn_blocking(move || future.get())
        .await
        .unwrap()
        .unwrap_err();
    let rpc = err.failure().unwrap().downcast_ref::<RpcError>().unwrap();
    assert!(rpc.is_transport());
    assert_eq!(rpc.message(), "rejected");
}
