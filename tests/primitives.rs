//! The sync primitives driven by orchestrated units and by plain threads.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskgate::{Config, Holder, MutexRegistry, Orchestrator, Semaphore, Sink, UnitContext, args};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bounded_buffer_moves_every_item_once() -> anyhow::Result<()> {
    const CAPACITY: i64 = 3;
    const PER_PRODUCER: i64 = 20;

    let free = Arc::new(Semaphore::new(CAPACITY));
    let filled = Arc::new(Semaphore::new(0));
    let buffer = Arc::new(Mutex::new(VecDeque::<i64>::new()));
    let consumed = Arc::new(Mutex::new(Vec::<i64>::new()));

    let (sink, _capture) = Sink::capture();
    let mut orch = Orchestrator::builder(Config::quiet()).with_output(sink).build();

    orch.define_fn("producer", {
        let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
        move |ctx: UnitContext| {
            let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
            async move {
                let base = ctx.args().int(0)?;
                for i in 0..PER_PRODUCER {
                    free.acquire().await;
                    ctx.enter_mutex_named("buffer").await;
                    {
                        let mut buf = buffer.lock().unwrap();
                        assert!(buf.len() < CAPACITY as usize);
                        buf.push_back(base + i);
                    }
                    ctx.exit_mutex_named("buffer")?;
                    filled.release();
                }
                Ok(())
            }
        }
    });
    orch.define_fn("consumer", {
        let (free, filled, buffer, consumed) =
            (free.clone(), filled.clone(), buffer.clone(), consumed.clone());
        move |ctx: UnitContext| {
            let (free, filled, buffer, consumed) =
                (free.clone(), filled.clone(), buffer.clone(), consumed.clone());
            async move {
                let count = ctx.args().int(0)?;
                for _ in 0..count {
                    filled.acquire().await;
                    ctx.enter_mutex_named("buffer").await;
                    let item = buffer.lock().unwrap().pop_front();
                    ctx.exit_mutex_named("buffer")?;
                    free.release();
                    consumed.lock().unwrap().extend(item);
                }
                Ok(())
            }
        }
    });

    orch.create_task("producer", args![0])?;
    orch.create_task("producer", args![1000])?;
    orch.create_tasks(2, "consumer", args![PER_PRODUCER])?;
    let report = orch.start_and_wait_all().await?;
    assert_eq!(report.units, ["producer_0", "producer_1", "consumer_0", "consumer_1"]);

    let mut items = consumed.lock().unwrap().clone();
    items.sort_unstable();
    let expected: Vec<i64> = (0..PER_PRODUCER).chain(1000..1000 + PER_PRODUCER).collect();
    assert_eq!(items, expected);
    assert_eq!(free.permits(), CAPACITY);
    assert_eq!(filled.permits(), 0);
    Ok(())
}

#[test]
fn negative_seed_blocks_until_enough_releases() {
    let sem = Arc::new(Semaphore::new(-2));
    let acquired = Arc::new(Mutex::new(false));

    let waiter = std::thread::spawn({
        let (sem, acquired) = (sem.clone(), acquired.clone());
        move || {
            sem.acquire_blocking();
            *acquired.lock().unwrap() = true;
        }
    });

    sem.release_n(2);
    std::thread::sleep(Duration::from_millis(50));
    assert!(!*acquired.lock().unwrap());
    assert_eq!(sem.permits(), 0);

    sem.release();
    waiter.join().unwrap();
    assert!(*acquired.lock().unwrap());
    assert_eq!(sem.permits(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn registry_shared_with_the_run_is_left_unheld_after_failure() {
    let mutexes = Arc::new(MutexRegistry::default());
    let (sink, _capture) = Sink::capture();
    let mut orch = Orchestrator::builder(Config::quiet())
        .with_output(sink)
        .with_mutexes(mutexes.clone())
        .build();

    orch.define_fn("hog", |ctx: UnitContext| async move {
        ctx.enter_mutex_named("a").await;
        ctx.enter_mutex_named("b").await;
        ctx.sleep(Duration::from_secs(30)).await;
        Ok(())
    });
    orch.define_fn("bomb", |ctx: UnitContext| async move {
        ctx.sleep(Duration::from_millis(20)).await;
        Err(taskgate::TaskError::fail("bang"))
    });
    orch.create_task("hog", ()).unwrap();
    orch.create_task("bomb", ()).unwrap();

    let err = orch.start_and_wait_all().await.expect_err("bomb fails");
    assert_eq!(err.failed_unit(), Some("bomb"));
    assert!(mutexes.holder("a").is_none());
    assert!(mutexes.holder("b").is_none());

    // Usable from outside afterwards.
    mutexes.enter("a").await;
    assert!(matches!(mutexes.holder("a"), Some(Holder::Thread { .. })));
    mutexes.exit("a").unwrap();
}
