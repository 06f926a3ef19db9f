//! Diagnostic channels for a run.
//!
//! A run talks to its host through two channels: an ordered stream of debug
//! messages and a fatal-failure channel that receives exactly one message
//! when the run fails. Inject an implementation of [`Diagnostics`] to route
//! them wherever the host expects.
//!
//! # Example
//!
//! ```rust
//! use ma3_plugin_xml::Diagnostics;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder {
//!     debug: Mutex<Vec<String>>,
//! }
//!
//! impl Diagnostics for Recorder {
//!     fn debug(&self, message: &str) {
//!         self.debug.lock().unwrap().push(message.to_string());
//!     }
//! }
//!
//! let recorder = Recorder::default();
//! recorder.debug("Received input: []");
//! assert_eq!(recorder.debug.lock().unwrap().len(), 1);
//! ```

use std::io::{self, Write};
use std::sync::Mutex;

/// Receives the diagnostic output of a run.
///
/// Both methods default to no-ops so implementors only override what they
/// care about.
pub trait Diagnostics: Send + Sync {
    /// One debug message; messages arrive in run order.
    fn debug(&self, message: &str) {
        let _ = message;
    }

    /// The single fatal-failure message of a failed run.
    fn set_failed(&self, message: &str) {
        let _ = message;
    }
}

/// Discards everything.
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Forwards debug messages to `tracing::debug!` and failures to `tracing::error!`.
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn set_failed(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Emits CI workflow commands (`::debug::…`, `::error::…`).
///
/// The runner picks these lines up from stdout; multi-line messages are
/// escaped so each command stays on one line.
pub struct WorkflowCommands<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl WorkflowCommands<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> WorkflowCommands<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn command(&self, name: &str, message: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(out, "::{name}::{}", escape_data(message)) {
            tracing::warn!("Failed to emit workflow command: {e}");
        }
    }
}

impl<W: Write + Send> Diagnostics for WorkflowCommands<W> {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
        self.command("debug", message);
    }

    fn set_failed(&self, message: &str) {
        tracing::error!("{message}");
        self.command("error", message);
    }
}

/// Escape a workflow command payload.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_data_encodes_line_breaks_and_percent() {
        assert_eq!(escape_data("50% done\r\nnext"), "50%25 done%0D%0Anext");
        assert_eq!(escape_data("plain"), "plain");
    }

    #[test]
    fn workflow_commands_write_one_line_each() {
        let wc = WorkflowCommands::new(Vec::new());
        wc.debug("Generated XML file:\n<GMA3/>");
        wc.set_failed("Unable to read lua file \"x.lua\": gone");
        let out = String::from_utf8(wc.into_inner()).unwrap();
        assert_eq!(
            out,
            "::debug::Generated XML file:%0A<GMA3/>\n\
             ::error::Unable to read lua file \"x.lua\": gone\n"
        );
    }
}
