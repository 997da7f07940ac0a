//! # Demo: interleaving
//!
//! Three units print the letters of a word, each in its own column. Run it a
//! few times: the interleaving changes from run to run, the letters of one unit
//! never change order.
//!
//! ## Flow
//! ```text
//! create_tasks(3, "speller") ──► start_and_wait_all()
//!     ├─► gate opens, every unit pauses a random start delay
//!     ├─► each unit: println_indented(letter) × len(word)
//!     └─► "Concurrent code took N millis"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example interleaving
//! ```

use std::time::Duration;

use taskgate::{Config, Orchestrator, TaskError, UnitContext, args};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Defaults: random pauses around every write make the interleaving visible
    let mut orch = Orchestrator::builder(Config::default()).build();

    // 2. One task, parameterized by the word to spell
    orch.define_fn("speller", |ctx: UnitContext| async move {
        let word = ctx.args().str(0)?.to_string();
        for letter in word.chars() {
            ctx.println_indented(&letter.to_string()).await;
            ctx.sleep_random(Duration::from_millis(20)).await;
        }
        Ok::<_, TaskError>(())
    });

    // 3. Three units of the same task: speller_0, speller_1, speller_2
    orch.create_task("speller", args!["hello"])?;
    orch.create_task("speller", args!["world"])?;
    orch.create_task("speller", args!["rust!"])?;

    // 4. Release them together and wait
    orch.start_and_wait_all().await?;
    Ok(())
}
