//! Concurrent non-interference: many logical calls in flight on the same
//! proxy, suspending and resuming across worker threads, must never observe
//! each other's cursor or call state.

use reroute::{
    handler_fn, root_fn, CallArguments, CallError, CallRoot, ContractId, Proxy, Redirect,
    RedirectRepository, RelayCall, Value,
};
use std::sync::Arc;
use std::time::Duration;

fn doubling_root() -> Arc<dyn CallRoot> {
    Arc::new(root_fn(|_method, args| {
        let n = args.value_at(0).and_then(|v| v.as_s64()).unwrap_or(0);
        async move { Ok(Value::S64(n * 2)) }
    }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_keep_their_own_state() {
    let repository = Arc::new(RedirectRepository::new());

    // Suspends mid-flight, then re-reads its own call's arguments. A call
    // observing another call's state would compute the wrong sum or trip
    // the identity check.
    repository.insert(
        Redirect::build(handler_fn(|call: RelayCall| async move {
            let before = call.args().value_at(0).and_then(|v| v.as_s64()).unwrap();
            tokio::time::sleep(Duration::from_millis(before as u64 % 7 + 1)).await;

            let after = call.args().value_at(0).and_then(|v| v.as_s64()).unwrap();
            if before != after {
                return Err(CallError::handler(anyhow::anyhow!(
                    "call state changed across suspension: {before} -> {after}"
                )));
            }

            let from_root = call.continue_next().await?.as_s64().unwrap();
            Ok(Value::S64(from_root + before))
        }))
        .finish(),
    );

    let proxy = Arc::new(
        Proxy::new(ContractId::new("Counter"), repository).with_root(doubling_root()),
    );

    let mut tasks = Vec::new();
    for n in 0..64i64 {
        let proxy = Arc::clone(&proxy);
        tasks.push(tokio::spawn(async move {
            let result = proxy
                .call("get", CallArguments::from_values(vec![Value::S64(n)]))
                .await
                .expect("call");
            (n, result)
        }));
    }

    for task in tasks {
        let (n, result) = task.await.expect("task");
        // root doubles, handler adds the original argument back
        assert_eq!(result, Value::S64(n * 3));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn chained_handlers_survive_interleaved_suspension() {
    let repository = Arc::new(RedirectRepository::new());

    // Two chained handlers, each yielding between steps so concurrent calls
    // interleave aggressively at every stage of traversal.
    repository.insert(
        Redirect::build(handler_fn(|call: RelayCall| async move {
            tokio::task::yield_now().await;
            let below = call.continue_next().await?.as_s64().unwrap();
            tokio::task::yield_now().await;
            Ok(Value::S64(below + 1))
        }))
        .finish(),
    );
    repository.insert(
        Redirect::build(handler_fn(|call: RelayCall| async move {
            tokio::task::yield_now().await;
            let below = call.continue_next().await?.as_s64().unwrap();
            tokio::task::yield_now().await;
            Ok(Value::S64(below * 10))
        }))
        .order_weight(1)
        .finish(),
    );

    let proxy = Arc::new(
        Proxy::new(ContractId::new("Counter"), repository).with_root(doubling_root()),
    );

    let mut tasks = Vec::new();
    for n in 0..128i64 {
        let proxy = Arc::clone(&proxy);
        tasks.push(tokio::spawn(async move {
            proxy
                .call("get", CallArguments::from_values(vec![Value::S64(n)]))
                .await
                .expect("call")
        }));
    }

    for (n, task) in (0..128i64).zip(tasks) {
        let result = task.await.expect("task");
        // outer: *10 then +1 applied over root's doubling, bottom-up:
        // ((n * 2) + 1) * 10
        assert_eq!(result, Value::S64((n * 2 + 1) * 10));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_calls_keep_their_snapshot_during_reconfiguration() {
    let repository = Arc::new(RedirectRepository::new());
    let (release_tx, release_rx) = tokio::sync::watch::channel(false);

    // Holds the call open until released, then continues to the root. The
    // plan it traverses must be the one captured at dispatch even though
    // the repository is reset mid-flight.
    repository.insert(
        Redirect::build(handler_fn(move |call: RelayCall| {
            let mut release = release_rx.clone();
            async move {
                while !*release.borrow() {
                    if release.changed().await.is_err() {
                        break;
                    }
                }
                let below = call.continue_next().await?.as_s64().unwrap();
                Ok(Value::S64(below + 7))
            }
        }))
        .finish(),
    );

    let proxy = Arc::new(
        Proxy::new(ContractId::new("Counter"), Arc::clone(&repository))
            .with_root(doubling_root()),
    );

    let in_flight = {
        let proxy = Arc::clone(&proxy);
        tokio::spawn(async move {
            proxy
                .call("get", CallArguments::from_values(vec![Value::S64(3)]))
                .await
                .expect("in-flight call")
        })
    };

    // Wipe the configuration while the call is suspended, then release it.
    tokio::time::sleep(Duration::from_millis(20)).await;
    repository.reset(true);
    release_tx.send(true).expect("release");

    let held = in_flight.await.expect("task");
    assert_eq!(held, Value::S64(3 * 2 + 7));

    // Calls started after the reset see the empty plan.
    let fresh = proxy
        .call("get", CallArguments::from_values(vec![Value::S64(3)]))
        .await
        .expect("fresh call");
    assert_eq!(fresh, Value::S64(6));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_recursion_stays_isolated() {
    let repository = Arc::new(RedirectRepository::new());
    let proxy = Arc::new(
        Proxy::new(ContractId::new("Numbers"), Arc::clone(&repository))
            .with_root(Arc::new(root_fn(|_m, args| {
                let n = args.value_at(0).and_then(|v| v.as_s64()).unwrap_or(0);
                async move { Ok(Value::S64(n)) }
            }))),
    );

    let recursive = {
        let proxy = Arc::clone(&proxy);
        handler_fn(move |call: RelayCall| {
            let proxy = Arc::clone(&proxy);
            async move {
                let n = call.args().value_at(0).and_then(|v| v.as_s64()).unwrap_or(0);
                tokio::task::yield_now().await;
                if n >= 2 {
                    let a = proxy
                        .call("get", CallArguments::from_values(vec![Value::S64(n - 1)]))
                        .await?
                        .as_s64()
                        .unwrap_or(0);
                    let b = proxy
                        .call("get", CallArguments::from_values(vec![Value::S64(n - 2)]))
                        .await?
                        .as_s64()
                        .unwrap_or(0);
                    Ok(Value::S64(a + b))
                } else {
                    call.continue_to_root().await
                }
            }
        })
    };
    repository.insert(Redirect::build(recursive).finish());

    fn fib(n: i64) -> i64 {
        let (mut a, mut b) = (0i64, 1i64);
        for _ in 0..n {
            let next = a + b;
            a = b;
            b = next;
        }
        a
    }

    let mut tasks = Vec::new();
    for n in 0..16i64 {
        let proxy = Arc::clone(&proxy);
        tasks.push(tokio::spawn(async move {
            proxy
                .call("get", CallArguments::from_values(vec![Value::S64(n)]))
                .await
                .expect("call")
        }));
    }

    for (n, task) in (0..16i64).zip(tasks) {
        assert_eq!(task.await.expect("task"), Value::S64(fib(n)));
    }
}
