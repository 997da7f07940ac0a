//! # Demo: producer_consumer
//!
//! Classic bounded buffer built from two counting semaphores and a named mutex.
//!
//! ## Flow
//! ```text
//! producer: free.acquire() → enter("buffer") → push → exit("buffer") → filled.release()
//! consumer: filled.acquire() → enter("buffer") → pop → exit("buffer") → free.release()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example producer_consumer
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskgate::{Config, Orchestrator, Semaphore, TaskError, UnitContext, args};

const CAPACITY: i64 = 2;
const ITEMS: i64 = 6;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let free = Arc::new(Semaphore::new(CAPACITY));
    let filled = Arc::new(Semaphore::new(0));
    let buffer = Arc::new(Mutex::new(VecDeque::<i64>::new()));

    let mut orch = Orchestrator::builder(Config::default()).build();

    orch.define_fn("producer", {
        let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
        move |ctx: UnitContext| {
            let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
            async move {
                for item in 0..ctx.args().int(0)? {
                    ctx.sleep_random(Duration::from_millis(50)).await;
                    free.acquire().await;
                    ctx.enter_mutex_named("buffer").await;
                    buffer.lock().unwrap_or_else(|e| e.into_inner()).push_back(item);
                    ctx.println_indented(&format!("put {item} {filled}")).await;
                    ctx.exit_mutex_named("buffer")?;
                    filled.release();
                }
                Ok::<_, TaskError>(())
            }
        }
    });
    orch.define_fn("consumer", {
        let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
        move |ctx: UnitContext| {
            let (free, filled, buffer) = (free.clone(), filled.clone(), buffer.clone());
            async move {
                for _ in 0..ctx.args().int(0)? {
                    filled.acquire().await;
                    ctx.enter_mutex_named("buffer").await;
                    let item = buffer.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    ctx.println_indented(&format!("got {item:?} {free}")).await;
                    ctx.exit_mutex_named("buffer")?;
                    free.release();
                    ctx.sleep_random(Duration::from_millis(80)).await;
                }
                Ok::<_, TaskError>(())
            }
        }
    });

    orch.create_task("producer", args![ITEMS])?;
    orch.create_task("consumer", args![ITEMS])?;

    orch.start_and_wait_all().await?;
    Ok(())
}
