//! Console output for units.
//!
//! - [`Output`]: jittered print/println and ordinal-indented variants
//! - [`Sink`] / [`Capture`]: where the text goes (stdout or memory)

mod sink;
mod writer;

pub use sink::{Capture, Sink};
pub use writer::Output;
