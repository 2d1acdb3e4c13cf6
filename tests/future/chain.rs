use rpc_invoke::{BoxError, Context, ContextHolder, CoreError, FinishableFuture, FutureChain};
use std::thread;
use std::time::Duration;
use tokio::runtime::Handle;

fn context() -> Context {
    Context::new().with_scope("getTransaction")
}

#[test]
fn transform_converts_raw_result() {
    let next = FinishableFuture::<usize>::new();
    let chain = FutureChain::new(next.clone(), context())
        .unwrap()
        .with_success_handler(|raw: String| Ok(raw.len()));

    thread::spawn(move || chain.on_success("0123456789".to_string()));
    assert_eq!(next.get().unwrap(), 10);
}

#[test]
fn missing_handler_is_a_conversion_error() {
    let next = FinishableFuture::<usize>::new();
    let chain = FutureChain::<String, usize>::new(next.clone(), context()).unwrap();

    thread::spawn(move || chain.on_success("0123456789".to_string()));
    assert!(matches!(next.get(), Err(CoreError::NoSuccessHandler)));
}

#[test]
fn failure_completes_target() {
    let next = FinishableFuture::<usize>::new();
    let chain = FutureChain::new(next.clone(), context())
        .unwrap()
        .with_success_handler(|raw: String| Ok(raw.len()));

    thread::spawn(move || chain.on_failure("stream closed"));
    let err = next.get().unwrap_err();
    assert_eq!(err.failure().unwrap().to_string(), "stream closed");
}

#[test]
fn callback_thread_sees_creator_context_only_while_running() {
    let next = FinishableFuture::new();
    let chain = FutureChain::new(next.clone(), context())
        .unwrap()
        .with_success_handler(|_: ()| Ok(ContextHolder::get().map(|c| c.scope().to_string())));

    let after = thread::spawn(move || {
        chain.on_success(());
        ContextHolder::get()
    })
    .join()
    .unwrap();

    assert_eq!(next.get().unwrap().as_deref(), Some("getTransaction"));
    assert!(after.is_none());
}

#[test]
fn capture_takes_the_attached_context() {
    let next = FinishableFuture::new();
    let chain = ContextHolder::run_with(context(), || FutureChain::capture(next.clone()))
        .unwrap()
        .with_success_handler(|_: ()| Ok(ContextHolder::get().map(|c| c.scope().to_string())));

    thread::spawn(move || chain.on_success(())).join().unwrap();
    assert_eq!(next.get().unwrap().as_deref(), Some("getTransaction"));
}

#[test]
fn unusable_target_is_rejected_at_construction() {
    let next = FinishableFuture::<u8>::new();
    next.cancel();
    assert!(matches!(
        FutureChain::<(), u8>::new(next, context()),
        Err(CoreError::InvalidArgument(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn listen_completes_from_async_transport() {
    let next = FinishableFuture::new();
    let chain = FutureChain::new(next.clone(), context())
        .unwrap()
        .with_success_handler(|raw: Vec<u8>| Ok(raw.len()));

    chain.listen(
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, BoxError>(vec![0u8; 32])
        },
        &Handle::current(),
    );

    let waiter = tokio::task::spawn_blocking(move || next.get());
    assert_eq!(waiter.await.unwrap().unwrap(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn aborted_listener_cancels_target() {
    let next = FinishableFuture::<usize>::new();
    let chain = FutureChain::new(next.clone(), context())
        .unwrap()
        .with_success_handler(|raw: Vec<u8>| Ok(raw.len()));

    let task = chain.listen(
        async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BoxError>(Vec::new())
        },
        &Handle::current(),
    );
    task.abort();
    let _ = task.await;

    let waiter = tokio::task::spawn_blocking(move || next.get_timeout(Duration::from_secs(5)));
    assert!(waiter.await.unwrap().unwrap_err().is_cancelled());
}
