//! Run-wide decision on what a resolution failure does to the run.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use super::ResolutionError;

/// What the call site that hit a failure should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Treat the failure as if the call had succeeded.
    Continue,
    /// Propagate the failure and end the run without output.
    Abort,
}

/// Reporting and continuation settings for a resolution run.
///
/// `silent` only controls whether a diagnostic is written; `force` alone
/// decides whether the run survives a failure. The decision is the same for
/// every error kind and every position in the inclusion tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    silent: bool,
    force: bool,
}

impl ErrorPolicy {
    pub fn new(silent: bool, force: bool) -> Self {
        Self { silent, force }
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Reports `error` raised by `operation` to `diagnostics` and decides the outcome.
    pub fn handle(
        &self,
        operation: &str,
        error: &ResolutionError,
        diagnostics: &mut dyn Write,
    ) -> Outcome {
        if !self.silent {
            // An unwritable diagnostic channel does not change the outcome.
            let _ = writeln!(diagnostics, "Error in {operation}, {error}");
        }

        if self.force {
            debug!(operation, path = %error.path().display(), "skipping failed subtree");
            Outcome::Continue
        } else {
            Outcome::Abort
        }
    }
}

/// Destination of the diagnostics written by an [`ErrorPolicy`].
pub struct Diagnostics(Box<dyn Write>);

impl Diagnostics {
    pub fn stderr() -> Self {
        Self(Box::new(io::stderr()))
    }

    pub fn to_writer(writer: impl Write + 'static) -> Self {
        Self(Box::new(writer))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Diagnostics")
    }
}

impl Write for Diagnostics {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
