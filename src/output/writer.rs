//! # Indented, jittered output.
//!
//! [`Output`] is how units talk to the console. Every write is surrounded by a
//! short random pause (`Config::print_delay`) so output from concurrent units
//! interleaves visibly, and the indented variants shift each line right by
//! `ordinal × indent_width` spaces so every unit writes in its own column:
//!
//! ```text
//! worker_0: a
//!         worker_1: a
//! worker_0: b
//!                 worker_2: a
//! ```
//!
//! The ordinal is looked up from the calling unit itself (task-local identity);
//! outside any unit there is no indent.
//!
//! ## Failure silencing
//! When a run fails, the failure report is the last thing written: the report
//! and the "silenced" flag are set under the same lock every write takes, so a
//! sibling still racing towards a write drops its text instead.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::core::Config;
use crate::output::Sink;
use crate::policies::JitterPolicy;
use crate::tasks::current_unit;

struct OutputState {
    sink: Sink,
    silenced: bool,
}

/// Output facility shared by all units of a run.
pub struct Output {
    state: Mutex<OutputState>,
    print_delay: Duration,
    print_jitter: JitterPolicy,
    indent_width: usize,
}

impl Output {
    /// Creates an output facility writing to `sink` with the pauses and indent of `cfg`.
    pub fn new(sink: Sink, cfg: &Config) -> Self {
        Self {
            state: Mutex::new(OutputState {
                sink,
                silenced: false,
            }),
            print_delay: cfg.print_delay,
            print_jitter: cfg.print_jitter,
            indent_width: cfg.indent_width,
        }
    }

    /// Writes `text` without a trailing newline.
    pub async fn print(&self, text: &str) {
        self.pause().await;
        self.write(text);
        self.pause().await;
    }

    /// Writes `text` followed by a newline.
    pub async fn println(&self, text: &str) {
        self.pause().await;
        self.write(&format!("{text}\n"));
        self.pause().await;
    }

    /// [`print`](Self::print) indented by the calling unit's ordinal.
    pub async fn print_indented(&self, text: &str) {
        let line = format!("{}{text}", self.current_indent());
        self.print(&line).await;
    }

    /// [`println`](Self::println) indented by the calling unit's ordinal.
    pub async fn println_indented(&self, text: &str) {
        let line = format!("{}{text}", self.current_indent());
        self.println(&line).await;
    }

    /// Indent used for `ordinal`.
    pub fn indent(&self, ordinal: usize) -> String {
        " ".repeat(ordinal * self.indent_width)
    }

    /// True once a failure report has been written.
    pub fn is_silenced(&self) -> bool {
        self.lock().silenced
    }

    /// Writes the failure report and silences every later write.
    ///
    /// Returns false if the facility was already silenced.
    pub(crate) fn report_failure(&self, unit: &str, error: &str) -> bool {
        let mut st = self.lock();
        if st.silenced {
            return false;
        }
        st.silenced = true;
        let _ = st
            .sink
            .write_str(&format!("Exception in unit [{unit}]: {error}\n"));
        true
    }

    /// Writes the elapsed-time summary of a successful run.
    pub(crate) fn report_elapsed(&self, elapsed: Duration) {
        self.write(&format!(
            "\nConcurrent code took {} millis\n",
            elapsed.as_millis()
        ));
    }

    fn current_indent(&self) -> String {
        current_unit()
            .map(|unit| self.indent(unit.ordinal()))
            .unwrap_or_default()
    }

    fn write(&self, text: &str) -> bool {
        let mut st = self.lock();
        if st.silenced {
            return false;
        }
        let _ = st.sink.write_str(text);
        true
    }

    async fn pause(&self) {
        let delay = self.print_jitter.apply(self.print_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(Sink::Stdout, &Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RunId, UnitId};
    use crate::tasks::UnitInfo;

    fn captured() -> (Output, crate::output::Capture) {
        let (sink, capture) = Sink::capture();
        (Output::new(sink, &Config::quiet()), capture)
    }

    #[tokio::test]
    async fn indents_by_calling_unit_ordinal() {
        let (out, capture) = captured();
        out.println_indented("main").await;
        for ordinal in [0usize, 2] {
            let unit = UnitInfo {
                run: RunId::next(),
                id: UnitId::new(ordinal),
                name: format!("w_{ordinal}").into(),
            };
            unit.scope(out.println_indented("hi")).await;
        }

        assert_eq!(
            capture.lines(),
            vec!["main".to_string(), "hi".into(), format!("{}hi", " ".repeat(16))]
        );
    }

    #[tokio::test]
    async fn print_does_not_add_newlines() {
        let (out, capture) = captured();
        out.print("a").await;
        out.print("b").await;
        out.println("c").await;
        assert_eq!(capture.contents(), "abc\n");
    }

    #[tokio::test]
    async fn failure_report_is_the_last_output() {
        let (out, capture) = captured();
        out.println("before").await;
        assert!(out.report_failure("worker_3", "boom"));
        assert!(!out.report_failure("worker_1", "second"));
        out.println("after").await;
        out.report_elapsed(Duration::from_millis(5));

        assert!(out.is_silenced());
        assert_eq!(
            capture.contents(),
            "before\nException in unit [worker_3]: boom\n"
        );
    }

    #[tokio::test]
    async fn reports_elapsed_time() {
        let (out, capture) = captured();
        out.report_elapsed(Duration::from_millis(42));
        assert_eq!(capture.contents(), "\nConcurrent code took 42 millis\n");
    }
}
