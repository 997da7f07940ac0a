//! # Demo: group_failure
//!
//! Five units start together; `worker_3` fails shortly after the start while
//! the others are still sleeping. The whole group is aborted: the failure
//! report is the last line of output and nobody prints "done".
//!
//! Lifecycle events are logged through `tracing` by the built-in `LogWriter`,
//! on stderr next to the unit output.
//!
//! ## Flow
//! ```text
//! gate opens ──► worker_0..4 print "start"
//!                worker_3: Err("boom")
//!                    └─► FailureLatch: report, cancel, abort worker_0,1,2,4
//!                          └─► start_and_wait_all() = Err(TaskFailed)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example group_failure
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::filter::LevelFilter;

use taskgate::{Config, LogWriter, Orchestrator, RuntimeError, TaskError, UnitContext};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let mut orch = Orchestrator::builder(Config::default())
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    orch.define_fn("worker", |ctx: UnitContext| async move {
        ctx.println_indented("start").await;
        if ctx.ordinal() == 3 {
            ctx.sleep(Duration::from_millis(100)).await;
            return Err(TaskError::fail("boom"));
        }
        ctx.sleep(Duration::from_secs(2)).await;
        ctx.println_indented("done").await;
        Ok(())
    });
    orch.create_tasks(5, "worker", ())?;

    match orch.start_and_wait_all().await {
        Err(err @ RuntimeError::TaskFailed { .. }) => {
            eprintln!("run aborted ({}): {}", err.as_label(), err.as_message());
            Ok(())
        }
        other => {
            other?;
            anyhow::bail!("worker_3 was expected to fail the run")
        }
    }
}
