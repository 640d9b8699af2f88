//! Multi-line buffering contexts: accumulate raw input until a
//! termination predicate fires, then hand the buffer to a callback.

use std::io::Write;
use std::rc::Rc;

use crate::context::Context;
use crate::error::{ParlorError, Result};
use crate::handler::{Effect, Scope};

/// Termination predicate for a multi-line context.
///
/// State (such as a blank-line counter) is per-instance and must start
/// fresh in clones.
pub trait Terminator {
    /// Consume one line and report whether collection is finished.
    fn is_finished(&mut self, line: &str) -> bool;

    /// A new instance with initial state.
    fn clone_fresh(&self) -> Box<dyn Terminator>;
}

/// Finishes after a run of two or more consecutive blank lines.
pub struct BlankRun {
    blanks: u32,
}

impl BlankRun {
    pub fn new() -> Self {
        Self { blanks: 0 }
    }
}

impl Default for BlankRun {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator for BlankRun {
    fn is_finished(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            self.blanks += 1;
            self.blanks > 1
        } else {
            self.blanks = 0;
            false
        }
    }

    fn clone_fresh(&self) -> Box<dyn Terminator> {
        Box::new(BlankRun::new())
    }
}

/// Completion callback: receives the accumulated buffer.
pub type FinishAction = Rc<dyn Fn(&str, &mut Scope<'_>) -> Result<()>>;

/// A context that buffers raw lines until its termination predicate
/// fires, then invokes the completion callback and pops itself.
///
/// The predicate is the only dispatch step: there is no handler chain.
/// Blank lines that may begin a terminating run are held back and only
/// committed to the buffer once a later non-blank line arrives, so the
/// terminating run itself never reaches the buffer.
pub struct MultiLine {
    name: String,
    buffer: String,
    pending: String,
    terminator: Box<dyn Terminator>,
    on_finished: FinishAction,
}

impl MultiLine {
    pub fn new(
        name: &str,
        terminator: impl Terminator + 'static,
        on_finished: impl Fn(&str, &mut Scope<'_>) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            buffer: String::new(),
            pending: String::new(),
            terminator: Box::new(terminator),
            on_finished: Rc::new(on_finished),
        }
    }
}

impl Context for MultiLine {
    fn name(&self) -> &str {
        &self.name
    }

    fn prompt(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(b"... ")?;
        out.flush()?;
        Ok(())
    }

    fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Effect> {
        let mut scope = Scope::new(out, &self.name);
        if self.terminator.is_finished(line) {
            log::debug!("multi-line context '{}' finished", self.name);
            match (self.on_finished)(&self.buffer, &mut scope) {
                Ok(()) => {},
                Err(ParlorError::Io(e)) => return Err(ParlorError::Io(e)),
                Err(e) => scope.write(&format!("error: {e}\n"))?,
            }
            return Ok(Effect::Pop);
        }

        if line.trim().is_empty() {
            self.pending.push_str(line);
        } else {
            self.buffer.push_str(&self.pending);
            self.pending.clear();
            self.buffer.push_str(line);
        }
        Ok(Effect::Continue)
    }

    fn clone_context(&self, name: &str) -> Box<dyn Context> {
        Box::new(MultiLine {
            name: name.to_string(),
            buffer: String::new(),
            pending: String::new(),
            terminator: self.terminator.clone_fresh(),
            on_finished: Rc::clone(&self.on_finished),
        })
    }
}

/// Structured-data entry: a multi-line context that parses the final
/// buffer as JSON.
///
/// Parse success invokes `on_value` with the decoded value; failure
/// invokes the error callback (default: write the parse error to the
/// sink). Both paths still pop the context, so the session is never
/// left stuck.
pub fn json_entry(
    name: &str,
    on_value: impl Fn(serde_json::Value, &mut Scope<'_>) -> Result<()> + 'static,
) -> MultiLine {
    json_entry_with_error(name, on_value, |err, scope| {
        scope.write(&format!("{err}\n"))
    })
}

/// [`json_entry`] with an explicit parse-error callback.
pub fn json_entry_with_error(
    name: &str,
    on_value: impl Fn(serde_json::Value, &mut Scope<'_>) -> Result<()> + 'static,
    on_error: impl Fn(&serde_json::Error, &mut Scope<'_>) -> Result<()> + 'static,
) -> MultiLine {
    MultiLine::new(name, BlankRun::new(), move |buffer, scope| {
        match serde_json::from_str::<serde_json::Value>(buffer) {
            Ok(value) => on_value(value, scope),
            Err(err) => on_error(&err, scope),
        }
    })
}
