//! Exact-string matching: a registry of literal commands.

use std::rc::Rc;

use crate::error::Result;
use crate::handler::{Effect, Handler, Outcome, Scope};

/// Action bound to an exact literal. Takes no parsed arguments.
pub type ExactAction = Rc<dyn Fn(&mut Scope<'_>) -> Result<Effect>>;

/// Immutable table of `(literal, action)` bindings for one handler type.
///
/// Built once with [`ExactRegistry::builder`], then shared read-only by
/// every handler instance created from it. Entries are matched in
/// registration order; the first equal literal wins.
pub struct ExactRegistry {
    entries: Vec<(String, ExactAction)>,
}

impl ExactRegistry {
    pub fn builder() -> ExactRegistryBuilder {
        ExactRegistryBuilder {
            entries: Vec::new(),
        }
    }
}

/// Accumulates `(literal, action)` bindings at setup time.
pub struct ExactRegistryBuilder {
    entries: Vec<(String, ExactAction)>,
}

impl ExactRegistryBuilder {
    /// Bind an action to a literal command string.
    ///
    /// The line matches when it equals the literal after trimming
    /// leading and trailing whitespace.
    pub fn bind(
        mut self,
        literal: &str,
        action: impl Fn(&mut Scope<'_>) -> Result<Effect> + 'static,
    ) -> Self {
        self.entries.push((literal.to_string(), Rc::new(action)));
        self
    }

    pub fn build(self) -> Rc<ExactRegistry> {
        Rc::new(ExactRegistry {
            entries: self.entries,
        })
    }
}

/// Matches lines against exact literals from a shared registry.
pub struct ExactHandler {
    registry: Rc<ExactRegistry>,
}

impl ExactHandler {
    pub fn new(registry: Rc<ExactRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for ExactHandler {
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
        let trimmed = line.trim();
        for (literal, action) in &self.registry.entries {
            if trimmed == literal {
                return action(scope).map(Outcome::Handled);
            }
        }
        Ok(Outcome::Rejected)
    }

    fn clone_fresh(&self) -> Box<dyn Handler> {
        Box::new(Self {
            registry: Rc::clone(&self.registry),
        })
    }
}
