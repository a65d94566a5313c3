//! Console reporting for workflow progress.
//!
//! The workflow treats the console as a sink: status lines are written
//! before and after each step and on error, and write failures are ignored
//! rather than allowed to abort a cloud operation mid-flight.

use std::io::Write;

/// Writes human-readable status lines to an injected sink.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    sink: W,
}

impl<W: Write> Reporter<W> {
    /// Wraps the given sink.
    pub const fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Prints the application banner once at startup.
    pub fn banner(&mut self, name: &str, version: &str) {
        writeln!(self.sink, "{name} {version} - capacity pool change sample").ok();
        writeln!(self.sink, "{}", "-".repeat(60)).ok();
    }

    /// Announces a step that is about to run.
    pub fn step(&mut self, message: &str) {
        writeln!(self.sink, "{message}...").ok();
    }

    /// Reports an informational line.
    pub fn info(&mut self, message: &str) {
        writeln!(self.sink, "{message}").ok();
    }

    /// Reports a completed step.
    pub fn done(&mut self, message: &str) {
        writeln!(self.sink, "  ok: {message}").ok();
    }

    /// Reports a failure.
    pub fn error(&mut self, message: &str) {
        writeln!(self.sink, "  error: {message}").ok();
    }

    /// Consumes the reporter, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl Reporter<std::io::Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}
