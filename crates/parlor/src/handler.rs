//! The handler capability and its built-in implementations.
//!
//! A [`Handler`] is one unit in a context's dispatch chain: it is offered
//! a raw input line and either consumes it (producing an [`Effect`]) or
//! declares it unrecognized. Rejection is an expected outcome that moves
//! dispatch on to the next handler in the chain, never an error.

use std::io::Write;

use crate::error::Result;
use crate::pattern::{PatternHandler, PatternRegistry};

/// What a successfully handled line asks the driver to do next.
pub enum Effect {
    /// Stay in the current context.
    Continue,
    /// Enter the given context: it becomes the active one immediately.
    Push(Box<dyn crate::Context>),
    /// Leave the current context. Popping the last context ends the loop.
    Pop,
}

/// Binary result of offering a line to a handler.
///
/// There is deliberately no third "partial" state: every attempted
/// match either consumes the line or leaves it untouched for the next
/// handler in the chain.
pub enum Outcome {
    /// The line was consumed; apply the effect.
    Handled(Effect),
    /// The line was not recognized; try the next handler.
    Rejected,
}

/// The slice of its owning context a handler acts through: the borrowed
/// output sink and the context's display name.
///
/// Handlers never own or store this; the context lends it per call, so a
/// handler cannot outlive or alias its context's state.
pub struct Scope<'a> {
    out: &'a mut dyn Write,
    name: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(out: &'a mut dyn Write, name: &'a str) -> Self {
        Self { out, name }
    }

    /// Write to the context's output sink and flush immediately.
    ///
    /// Callers rely on prompts and messages being visible before the
    /// next blocking read, so there is no buffering across calls.
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Display name of the owning context.
    pub fn name(&self) -> &str {
        self.name
    }
}

/// A unit that attempts to match and act on one input line.
pub trait Handler {
    /// Offer a line to this handler.
    ///
    /// Returns `Ok(Outcome::Rejected)` when the line is not recognized;
    /// `Err` is reserved for genuine failures inside a bound action.
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome>;

    /// Produce a fresh instance of the same concrete handler type.
    ///
    /// Immutable pattern bindings may be shared; instance state (such as
    /// a partially-counted blank run) must reset to initial values.
    fn clone_fresh(&self) -> Box<dyn Handler>;
}

// ---------------------------------------------------------------------------
// Built-in handlers forced onto every standard prompt
// ---------------------------------------------------------------------------

/// Ignores empty and whitespace-only lines.
pub struct EmptyLine;

impl Handler for EmptyLine {
    fn try_execute(&mut self, line: &str, _scope: &mut Scope<'_>) -> Result<Outcome> {
        if line.trim().is_empty() {
            Ok(Outcome::Handled(Effect::Continue))
        } else {
            Ok(Outcome::Rejected)
        }
    }

    fn clone_fresh(&self) -> Box<dyn Handler> {
        Box::new(EmptyLine)
    }
}

/// Leaves the current context when an `exit` command is received.
pub struct Exit;

impl Handler for Exit {
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
        if line.trim() == "exit" {
            scope.write("Bye!\n")?;
            Ok(Outcome::Handled(Effect::Pop))
        } else {
            Ok(Outcome::Rejected)
        }
    }

    fn clone_fresh(&self) -> Box<dyn Handler> {
        Box::new(Exit)
    }
}

/// Imitates the `echo` shell command.
pub struct Echo {
    inner: PatternHandler,
}

impl Echo {
    pub fn new() -> Self {
        let registry = PatternRegistry::builder()
            .bind(r"^echo (?P<what>.*)\n?", |caps, scope| {
                let what = caps.get("what").unwrap_or("");
                scope.write(&format!("{what}\n"))?;
                Ok(Effect::Continue)
            })
            .build()
            .expect("echo pattern should compile");
        Self {
            inner: PatternHandler::new(registry),
        }
    }
}

impl Default for Echo {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for Echo {
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
        self.inner.try_execute(line, scope)
    }

    fn clone_fresh(&self) -> Box<dyn Handler> {
        Box::new(Echo::new())
    }
}
