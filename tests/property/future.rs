//! Property tests for FinishableFuture.
//!
//! Invariants tested:
//! - The first write decides the outcome
//! - Later writes report failure and change nothing

use proptest::prelude::*;
use rpc_invoke::FinishableFuture;

#[derive(Debug, Clone)]
enum Write {
    Success(u32),
    Fail(String),
    Cancel,
}

fn write() -> impl Strategy<Value = Write> {
    prop_oneof![
        any::<u32>().prop_map(Write::Success),
        "[a-z]{1,12}".prop_map(Write::Fail),
        Just(Write::Cancel),
    ]
}

fn apply(future: &FinishableFuture<u32>, write: &Write) -> bool {
    match write {
        Write::Success(value) => future.success(*value),
        Write::Fail(message) => future.fail(message.clone()),
        Write::Cancel => future.cancel(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: only the first of any sequence of writes takes effect
    #[test]
    fn first_write_wins(writes in prop::collection::vec(write(), 1..8)) {
        let future = FinishableFuture::new();
        let accepted: Vec<bool> = writes.iter().map(|w| apply(&future, w)).collect();

        prop_assert!(accepted[0]);
        prop_assert!(accepted[1..].iter().all(|accepted| !accepted));

        let outcome = future.get();
        match &writes[0] {
            Write::Success(value) => prop_assert_eq!(outcome.unwrap(), *value),
            Write::Fail(message) => {
                let err = outcome.unwrap_err();
                prop_assert_eq!(err.failure().unwrap().to_string(), message.clone());
            }
            Write::Cancel => prop_assert!(outcome.unwrap_err().is_cancelled()),
        }
    }
}
