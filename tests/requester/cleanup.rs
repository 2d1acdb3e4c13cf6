use rpc_invoke::{BoxError, Context, ContextHolder, Invocation, Requester};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

fn scoped(name: &str) -> Context {
    Context::new().with_scope(name)
}

#[test]
fn holder_is_empty_after_success_and_failure() {
    let requester = Requester::builder()
        .retry(1, Duration::ZERO)
        .build()
        .unwrap();

    requester
        .request(Invocation::new("ok", || Ok::<_, BoxError>(())))
        .unwrap();
    assert!(ContextHolder::get().is_none());

    requester
        .request(Invocation::new("fails", || Err::<(), BoxError>("down".into())))
        .unwrap_err();
    assert!(ContextHolder::get().is_none());
}

#[test]
fn holder_returns_to_prior_context() {
    let requester = Requester::default();
    let _outer = ContextHolder::attach(scoped("client"));

    let seen = requester
        .request(Invocation::new("getBlock", || {
            Ok::<_, BoxError>(ContextHolder::get().map(|c| c.scope().to_string()))
        }))
        .unwrap();

    assert_eq!(seen.as_deref(), Some("getBlock"));
    assert_eq!(ContextHolder::get().unwrap().scope(), "client");
}

#[test]
fn panic_becomes_error_and_holder_is_restored() {
    let requester = Requester::default();
    let _outer = ContextHolder::attach(scoped("client"));

    let result = catch_unwind(AssertUnwindSafe(|| {
        requester.request(Invocation::new("explodes", || -> Result<(), BoxError> {
            panic!("transport bug")
        }))
    }));

    let err = result.expect("request must not unwind").unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.message(), "invocation explodes panicked");
    assert_eq!(ContextHolder::get().unwrap().scope(), "client");
}

#[test]
fn panic_is_handled_the_same_with_or_without_timeout() {
    let plain = Requester::builder().retry(2, Duration::ZERO).build().unwrap();
    let bounded = Requester::builder()
        .retry(2, Duration::ZERO)
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    for requester in [plain, bounded] {
        let result = catch_unwind(AssertUnwindSafe(|| {
            requester.request(Invocation::new("getBlock", || -> Result<(), BoxError> {
                panic!("transport bug")
            }))
        }));
        let err = result.expect("request must not unwind").unwrap_err();
        assert_eq!(err.message(), "invocation getBlock panicked");
        assert!(ContextHolder::get().is_none());
    }
}

#[test]
fn nested_requests_unwind_in_order() {
    let requester = Requester::default();
    let inner = requester.clone();

    let scopes = requester
        .request(Invocation::new("outer", move || {
            let nested = inner
                .request(Invocation::new("inner", || {
                    Ok::<_, BoxError>(ContextHolder::get().unwrap().scope().to_string())
                }))
                .map_err(BoxError::from)?;
            let after = ContextHolder::get().unwrap().scope().to_string();
            Ok::<_, BoxError>((nested, after))
        }))
        .unwrap();

    assert_eq!(scopes, ("inner".to_string(), "outer".to_string()));
    assert!(ContextHolder::get().is_none());
}
