//! # Demo: critical_section
//!
//! Four units each print a two-line block. Inside the default mutex the two
//! lines of a block always stay together; the blocks themselves come in any
//! order.
//!
//! ## Run
//! ```bash
//! cargo run --example critical_section
//! ```

use taskgate::{Config, Orchestrator, TaskError, UnitContext, args};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let mut orch = Orchestrator::builder(Config::default()).build();

    orch.define_fn("printer", |ctx: UnitContext| async move {
        let rounds = ctx.args().int(0)?;
        for round in 0..rounds {
            ctx.enter_mutex().await;
            ctx.println(&format!("[{}] begin {round}", ctx.name())).await;
            ctx.println(&format!("[{}] end   {round}", ctx.name())).await;
            ctx.exit_mutex()?;
        }
        Ok::<_, TaskError>(())
    });
    orch.create_tasks(4, "printer", args![3])?;

    orch.start_and_wait_all().await?;
    Ok(())
}
