//! End-to-end runs: naming, gate ordering, mutual exclusion, misuse errors and
//! the abort-all response to a failing unit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use taskgate::{
    Capture, Config, Event, EventKind, MutexError, MutexRegistry, Orchestrator, RuntimeError,
    Sink, Subscribe, TaskError, UnitContext, args,
};

fn quiet() -> (Orchestrator, Capture) {
    let (sink, capture) = Sink::capture();
    let orch = Orchestrator::builder(Config::quiet())
        .with_output(sink)
        .build();
    (orch, capture)
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<Event>>,
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.seen.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.seen.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_and_grouped_units_are_named_by_family_size() -> anyhow::Result<()> {
    let (mut orch, capture) = quiet();
    orch.define_fn("worker", |ctx: UnitContext| async move {
        let me = taskgate::current_unit_name().unwrap_or_default();
        ctx.println(&format!("{me}={}", ctx.name())).await;
        Ok(())
    });
    orch.define_fn("solo", |ctx: UnitContext| async move {
        ctx.println(ctx.name()).await;
        Ok(())
    });

    orch.create_task("solo", ())?;
    orch.create_tasks(2, "worker", ())?;
    let report = orch.start_and_wait_all().await?;

    assert_eq!(report.units, ["solo", "worker_0", "worker_1"]);
    let mut lines = capture.lines();
    lines.retain(|l| !l.is_empty() && !l.starts_with("Concurrent code took"));
    lines.sort();
    assert_eq!(lines, ["solo", "worker_0=worker_0", "worker_1=worker_1"]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_unit_starts_before_the_gate_and_all_see_the_full_group() -> anyhow::Result<()> {
    let (mut orch, _capture) = quiet();
    let starts = Arc::new(Mutex::new(Vec::<(Instant, usize)>::new()));

    orch.define_fn("probe", {
        let starts = starts.clone();
        move |ctx: UnitContext| {
            let starts = starts.clone();
            async move {
                starts.lock().unwrap().push((Instant::now(), ctx.unit_count()));
                Ok(())
            }
        }
    });
    orch.create_tasks(6, "probe", ())?;
    let before_start = Instant::now();
    let report = orch.start_and_wait_all().await?;

    let starts = starts.lock().unwrap();
    assert_eq!(starts.len(), 6);
    assert!(report.started_at >= before_start);
    for (at, count) in starts.iter() {
        assert!(*at >= report.started_at);
        assert_eq!(*count, 6);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn critical_sections_never_overlap() -> anyhow::Result<()> {
    let (mut orch, _capture) = quiet();
    let inside = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let entries = Arc::new(AtomicUsize::new(0));

    orch.define_fn("counter", {
        let (inside, overlaps, entries) = (inside.clone(), overlaps.clone(), entries.clone());
        move |ctx: UnitContext| {
            let (inside, overlaps, entries) = (inside.clone(), overlaps.clone(), entries.clone());
            async move {
                let rounds = ctx.args().int(0)?;
                for _ in 0..rounds {
                    ctx.enter_mutex_named("counter").await;
                    if inside.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    entries.fetch_add(1, Ordering::SeqCst);
                    ctx.sleep(Duration::from_millis(1)).await;
                    inside.store(false, Ordering::SeqCst);
                    ctx.exit_mutex_named("counter")?;
                }
                Ok(())
            }
        }
    });
    orch.create_tasks(4, "counter", args![10])?;
    let mutexes = orch.mutexes().clone();
    orch.start_and_wait_all().await?;

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(entries.load(Ordering::SeqCst), 40);
    assert!(mutexes.holder("counter").is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_sharing_mutexes_exclude_each_other() -> anyhow::Result<()> {
    let mutexes = Arc::new(MutexRegistry::default());
    let inside = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let mut runs = Vec::new();
    for _ in 0..2 {
        let (sink, _capture) = Sink::capture();
        let mut orch = Orchestrator::builder(Config::quiet())
            .with_output(sink)
            .with_mutexes(mutexes.clone())
            .build();
        orch.define_fn("worker", {
            let (inside, overlaps) = (inside.clone(), overlaps.clone());
            move |ctx: UnitContext| {
                let (inside, overlaps) = (inside.clone(), overlaps.clone());
                async move {
                    for _ in 0..20 {
                        ctx.enter_mutex_named("cs").await;
                        if inside.swap(true, Ordering::SeqCst) {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        ctx.sleep(Duration::from_millis(1)).await;
                        inside.store(false, Ordering::SeqCst);
                        ctx.exit_mutex_named("cs")?;
                    }
                    Ok(())
                }
            }
        });
        orch.create_task("worker", ())?;
        runs.push(orch);
    }

    let b = runs.pop().expect("two runs");
    let a = runs.pop().expect("two runs");
    let (ra, rb) = tokio::join!(a.start_and_wait_all(), b.start_and_wait_all());
    assert_eq!(ra?.units, vec!["worker"]);
    assert_eq!(rb?.units, vec!["worker"]);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(mutexes.holder("cs").is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reentrant_default_mutex_needs_matching_exits() -> anyhow::Result<()> {
    let (mut orch, _capture) = quiet();
    orch.define_fn("nested", |ctx: UnitContext| async move {
        ctx.enter_mutex().await;
        ctx.enter_mutex().await;
        ctx.exit_mutex()?;
        ctx.exit_mutex()?;
        Ok(())
    });
    orch.create_tasks(3, "nested", ())?;
    orch.start_and_wait_all().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exiting_an_unknown_mutex_fails_the_run() {
    let (mut orch, capture) = quiet();
    orch.define_fn("sloppy", |ctx: UnitContext| async move {
        ctx.exit_mutex_named("never-entered")?;
        Ok(())
    });
    orch.create_task("sloppy", ()).unwrap();

    match orch.start_and_wait_all().await {
        Err(RuntimeError::TaskFailed {
            unit,
            error: TaskError::Mutex(MutexError::DoesNotExist { mutex }),
        }) => {
            assert_eq!(unit, "sloppy");
            assert_eq!(mutex, "never-entered");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        capture.contents(),
        "Exception in unit [sloppy]: mutex \"never-entered\" does not exist\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exit_by_non_owner_names_the_offending_unit() {
    let (mut orch, _capture) = quiet();
    let entered = Arc::new(tokio::sync::Notify::new());

    orch.define_fn("owner", {
        let entered = entered.clone();
        move |ctx: UnitContext| {
            let entered = entered.clone();
            async move {
                ctx.enter_mutex_named("m").await;
                entered.notify_one();
                ctx.sleep(Duration::from_secs(30)).await;
                ctx.exit_mutex_named("m")?;
                Ok(())
            }
        }
    });
    orch.define_fn("intruder", {
        let entered = entered.clone();
        move |ctx: UnitContext| {
            let entered = entered.clone();
            async move {
                entered.notified().await;
                ctx.exit_mutex_named("m")?;
                Ok(())
            }
        }
    });
    orch.create_task("owner", ()).unwrap();
    orch.create_task("intruder", ()).unwrap();
    let mutexes = orch.mutexes().clone();

    let started = Instant::now();
    let err = orch.start_and_wait_all().await.expect_err("misuse fails the run");
    match err {
        RuntimeError::TaskFailed {
            unit,
            error: TaskError::Mutex(MutexError::NotOwner { holder, mutex }),
        } => {
            assert_eq!(unit, "intruder");
            assert_eq!(holder, "intruder");
            assert_eq!(mutex, "m");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
    // The aborted owner's lock is released after the join.
    assert!(mutexes.holder("m").is_none());
}

#[test]
fn unknown_task_is_a_configuration_error_before_start() {
    let (mut orch, capture) = quiet();
    orch.define_fn("known", |_ctx: UnitContext| async { Ok(()) });
    orch.create_task("known", ()).unwrap();

    let err = orch.create_tasks(3, "missing", ()).expect_err("not defined");
    assert!(matches!(err, RuntimeError::TaskNotFound { ref name } if name == "missing"));
    assert_eq!(err.as_label(), "runtime_task_not_found");
    assert_eq!(orch.len(), 1);
    assert!(capture.contents().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn group_failure_aborts_siblings_and_reports_once() {
    let (sink, capture) = Sink::capture();
    let rec = Arc::new(Recorder::default());
    let mut orch = Orchestrator::builder(Config::quiet())
        .with_output(sink)
        .with_subscriber(rec.clone())
        .build();
    let late_writes = Arc::new(AtomicUsize::new(0));

    orch.define_fn("worker", {
        let late_writes = late_writes.clone();
        move |ctx: UnitContext| {
            let late_writes = late_writes.clone();
            async move {
                ctx.println_indented(&format!("{}: begin", ctx.name())).await;
                if ctx.ordinal() == 3 {
                    ctx.sleep(Duration::from_millis(50)).await;
                    return Err(TaskError::fail("boom"));
                }
                ctx.sleep(Duration::from_secs(30)).await;
                late_writes.fetch_add(1, Ordering::SeqCst);
                ctx.println_indented(&format!("{}: late", ctx.name())).await;
                Ok(())
            }
        }
    });
    orch.create_tasks(5, "worker", ()).unwrap();

    let started = Instant::now();
    let err = orch.start_and_wait_all().await.expect_err("worker_3 fails");
    assert!(started.elapsed() < Duration::from_secs(10));

    assert_eq!(err.failed_unit(), Some("worker_3"));
    assert!(matches!(
        err,
        RuntimeError::TaskFailed { error: TaskError::Fail { .. }, .. }
    ));

    let out = capture.contents();
    let report = "Exception in unit [worker_3]: execution failed: boom\n";
    assert_eq!(out.matches("Exception in unit").count(), 1);
    assert!(out.ends_with(report), "report must be the last output: {out:?}");
    assert!(!out.contains("late"));
    assert!(!out.contains("Concurrent code took"));
    assert_eq!(late_writes.load(Ordering::SeqCst), 0);
    assert_eq!(out.matches(": begin").count(), 5);

    assert_eq!(rec.count(EventKind::UnitFailed), 1);
    assert_eq!(rec.count(EventKind::UnitAborted), 4);
    assert_eq!(rec.count(EventKind::UnitFinished), 0);
    assert_eq!(rec.kinds().last(), Some(&EventKind::RunFailed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_failures_report_exactly_one() {
    let (mut orch, capture) = quiet();
    let barrier = Arc::new(tokio::sync::Barrier::new(4));
    orch.define_fn("racer", {
        let barrier = barrier.clone();
        move |ctx: UnitContext| {
            let barrier = barrier.clone();
            async move {
                barrier.wait().await;
                Err(TaskError::fail(format!("{} gave up", ctx.name())))
            }
        }
    });
    orch.create_tasks(4, "racer", ()).unwrap();

    let err = orch.start_and_wait_all().await.expect_err("all fail");
    let unit = err.failed_unit().expect("a unit is named").to_string();

    let out = capture.contents();
    assert_eq!(out.matches("Exception in unit").count(), 1);
    assert_eq!(
        out,
        format!("Exception in unit [{unit}]: execution failed: {unit} gave up\n")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn units_parked_on_cancellation_are_terminated() {
    let (mut orch, capture) = quiet();
    orch.define_fn("fails", |ctx: UnitContext| async move {
        ctx.sleep(Duration::from_millis(20)).await;
        Err(TaskError::fail("nope"))
    });
    orch.define_fn("watcher", |ctx: UnitContext| async move {
        ctx.cancelled().await;
        ctx.println("cancelled").await;
        Ok(())
    });
    orch.create_task("watcher", ()).unwrap();
    orch.create_task("fails", ()).unwrap();

    let err = orch.start_and_wait_all().await.expect_err("run fails");
    assert_eq!(err.failed_unit(), Some("fails"));
    assert!(!capture.contents().contains("cancelled"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn successful_run_reports_elapsed_time_last() -> anyhow::Result<()> {
    let (sink, capture) = Sink::capture();
    let rec = Arc::new(Recorder::default());
    let mut orch = Orchestrator::builder(Config::quiet())
        .with_output(sink)
        .with_subscribers(vec![rec.clone()])
        .build();
    orch.define_fn("napper", |ctx: UnitContext| async move {
        ctx.sleep(Duration::from_millis(ctx.args().int(0)? as u64)).await;
        ctx.println_indented("done").await;
        Ok(())
    });
    orch.create_tasks(3, "napper", args![30])?;

    let report = orch.start_and_wait_all().await?;
    assert!(report.elapsed >= Duration::from_millis(30));

    let lines = capture.lines();
    let last = lines.last().expect("elapsed line");
    assert!(last.starts_with("Concurrent code took "));
    assert!(last.ends_with(" millis"));
    assert_eq!(lines.iter().filter(|l| l.trim() == "done").count(), 3);

    assert_eq!(rec.count(EventKind::UnitRegistered), 3);
    assert_eq!(rec.count(EventKind::GateOpened), 1);
    assert_eq!(rec.count(EventKind::UnitStarting), 3);
    assert_eq!(rec.count(EventKind::UnitFinished), 3);
    assert_eq!(rec.kinds().last(), Some(&EventKind::RunCompleted));
    Ok(())
}
