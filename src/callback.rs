//! Progress and log hooks shared by the assembly and disassembly engines.

/// Observation hooks for long-running searches.
///
/// Both methods default to no-ops, so callers opt into exactly the
/// feedback they want. Implementations may record what they observe but
/// must not try to influence the search; the engines never read state
/// back from the callback.
pub trait StatusCallback {
    /// Reports coarse progress in `0.0..=1.0`, with an optional label.
    ///
    /// The assembler ticks once per top-level row of its first chosen
    /// column; the disassembler once per dequeued node.
    fn on_progress(&mut self, _fraction: f64, _message: Option<&str>) {}

    /// Reports a human-readable status line (placement counts, the
    /// symmetry-breaker choice, and similar).
    fn on_log(&mut self, _message: &str) {}
}

/// The silent callback.
impl StatusCallback for () {}

/// A callback that records every status line, mostly useful in tests.
#[derive(Default)]
pub struct LogCollector {
    pub lines: Vec<String>,
}

impl StatusCallback for LogCollector {
    fn on_log(&mut self, message: &str) {
        self.lines.push(message.to_owned());
    }
}
