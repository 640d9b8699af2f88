//! Interactive contexts: an ordered handler chain with a name, a
//! prompt, and an unhandled-line policy.

use std::io::Write;

use crate::error::{ParlorError, Result};
use crate::handler::{Echo, Effect, EmptyLine, Exit, Handler, Outcome, Scope};

/// An interactive mode with its own handler chain, name, and prompt.
///
/// The driver talks to contexts exclusively through this trait; the
/// output sink is driver-owned and lent per call.
pub trait Context {
    /// Display name, shown in the prompt.
    fn name(&self) -> &str;

    /// Render the prompt. Must flush so it is visible before the
    /// blocking read that follows.
    fn prompt(&self, out: &mut dyn Write) -> Result<()>;

    /// Interpret one line and report the resulting effect.
    fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Effect>;

    /// Construct a structurally identical sibling: same pattern
    /// bindings, fresh handler instances, caller-supplied name.
    fn clone_context(&self, name: &str) -> Box<dyn Context>;
}

/// What a context does with a line every handler rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledPolicy {
    /// Write `Invalid command: …` to the sink.
    Report,
    /// Ignore the line silently.
    Ignore,
}

/// The standard interactive context: an ordered handler chain with a
/// forced suffix that understands empty lines, `echo`, and `exit`.
pub struct Prompt {
    name: String,
    handlers: Vec<Box<dyn Handler>>,
    unhandled: UnhandledPolicy,
}

impl Prompt {
    /// Start building a prompt context with the given display name.
    pub fn builder(name: &str) -> PromptBuilder {
        PromptBuilder {
            name: name.to_string(),
            handlers: Vec::new(),
            bare: false,
            unhandled: UnhandledPolicy::Report,
        }
    }
}

/// Accumulates the handler chain for a [`Prompt`].
///
/// Handlers are tried in the order they are added; the forced suffix
/// (empty-line, echo, exit) is appended by [`build`](Self::build)
/// unless suppressed with [`bare`](Self::bare).
pub struct PromptBuilder {
    name: String,
    handlers: Vec<Box<dyn Handler>>,
    bare: bool,
    unhandled: UnhandledPolicy,
}

impl PromptBuilder {
    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn boxed_handler(mut self, handler: Box<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Suppress the forced handler suffix. Used by `clone_context`,
    /// which already carries cloned copies of the forced handlers, and
    /// by tests that want full control of the chain.
    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    pub fn unhandled(mut self, policy: UnhandledPolicy) -> Self {
        self.unhandled = policy;
        self
    }

    pub fn build(self) -> Prompt {
        let mut handlers = self.handlers;
        if !self.bare {
            handlers.push(Box::new(EmptyLine));
            handlers.push(Box::new(Echo::new()));
            handlers.push(Box::new(Exit));
        }
        Prompt {
            name: self.name,
            handlers,
            unhandled: self.unhandled,
        }
    }
}

impl Context for Prompt {
    fn name(&self) -> &str {
        &self.name
    }

    fn prompt(&self, out: &mut dyn Write) -> Result<()> {
        if self.name.is_empty() {
            out.write_all(b">>> ")?;
        } else {
            out.write_all(format!("{} > ", self.name).as_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Effect> {
        let mut scope = Scope::new(out, &self.name);
        for handler in &mut self.handlers {
            match handler.try_execute(line, &mut scope) {
                Ok(Outcome::Handled(effect)) => return Ok(effect),
                Ok(Outcome::Rejected) => {},
                // A dead sink is not recoverable; everything else is a
                // failed command body, reported and survived.
                Err(ParlorError::Io(e)) => return Err(ParlorError::Io(e)),
                Err(e) => {
                    scope.write(&format!("error: {e}\n"))?;
                    return Ok(Effect::Continue);
                },
            }
        }
        log::debug!("no handler accepted line in context '{}'", self.name);
        match self.unhandled {
            UnhandledPolicy::Report => scope.write(&format!("Invalid command: {line}"))?,
            UnhandledPolicy::Ignore => {},
        }
        Ok(Effect::Continue)
    }

    fn clone_context(&self, name: &str) -> Box<dyn Context> {
        Box::new(Prompt {
            name: name.to_string(),
            handlers: self.handlers.iter().map(|h| h.clone_fresh()).collect(),
            unhandled: self.unhandled,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Test handler driven by a closure, like the registry-free
    /// handlers used to probe chain behavior.
    struct FuncHandler<F: Fn(&str, &mut Scope<'_>) -> Result<Outcome>>(F);

    impl<F: Fn(&str, &mut Scope<'_>) -> Result<Outcome> + Clone + 'static> Handler
        for FuncHandler<F>
    {
        fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
            (self.0)(line, scope)
        }

        fn clone_fresh(&self) -> Box<dyn Handler> {
            Box::new(FuncHandler(self.0.clone()))
        }
    }

    fn accept_all(_: &str, _: &mut Scope<'_>) -> Result<Outcome> {
        Ok(Outcome::Handled(Effect::Continue))
    }

    fn reject_all(_: &str, _: &mut Scope<'_>) -> Result<Outcome> {
        Ok(Outcome::Rejected)
    }

    fn execute(prompt: &mut Prompt, line: &str) -> (Effect, String) {
        let mut out: Vec<u8> = Vec::new();
        let effect = prompt.execute(line, &mut out).unwrap();
        (effect, String::from_utf8(out).unwrap())
    }

    #[test]
    fn first_accepting_handler_wins() {
        let mut prompt = Prompt::builder("t")
            .handler(FuncHandler(|_: &str, scope: &mut Scope<'_>| {
                scope.write("A")?;
                Ok(Outcome::Handled(Effect::Continue))
            }))
            .handler(FuncHandler(|_: &str, scope: &mut Scope<'_>| {
                scope.write("B")?;
                Ok(Outcome::Handled(Effect::Continue))
            }))
            .bare()
            .build();
        let (_, text) = execute(&mut prompt, "qwerty\n");
        assert_eq!(text, "A");
    }

    #[test]
    fn rejected_handler_passes_to_the_next() {
        let mut prompt = Prompt::builder("t")
            .handler(FuncHandler(reject_all))
            .handler(FuncHandler(|_: &str, scope: &mut Scope<'_>| {
                scope.write("B")?;
                Ok(Outcome::Handled(Effect::Continue))
            }))
            .bare()
            .build();
        let (_, text) = execute(&mut prompt, "qwerty\n");
        assert_eq!(text, "B");
    }

    #[test]
    fn unhandled_line_is_reported_once() {
        let mut prompt = Prompt::builder("t")
            .handler(FuncHandler(reject_all))
            .handler(FuncHandler(reject_all))
            .bare()
            .build();
        let (effect, text) = execute(&mut prompt, "qwerty\n");
        assert!(matches!(effect, Effect::Continue));
        assert_eq!(text, "Invalid command: qwerty\n");
    }

    #[test]
    fn unhandled_line_can_be_ignored() {
        let mut prompt = Prompt::builder("t")
            .bare()
            .unhandled(UnhandledPolicy::Ignore)
            .build();
        let (_, text) = execute(&mut prompt, "qwerty\n");
        assert!(text.is_empty());
    }

    #[test]
    fn forced_suffix_understands_exit_echo_and_empty() {
        let mut prompt = Prompt::builder("t").build();
        let (effect, text) = execute(&mut prompt, "\n");
        assert!(matches!(effect, Effect::Continue));
        assert!(text.is_empty());

        let (effect, text) = execute(&mut prompt, "echo hi\n");
        assert!(matches!(effect, Effect::Continue));
        assert_eq!(text, "hi\n");

        let (effect, text) = execute(&mut prompt, "exit\n");
        assert!(matches!(effect, Effect::Pop));
        assert_eq!(text, "Bye!\n");
    }

    #[test]
    fn action_failure_is_reported_and_survived() {
        let mut prompt = Prompt::builder("t")
            .handler(FuncHandler(|_: &str, _: &mut Scope<'_>| {
                Err(ParlorError::Command("backfired".into()))
            }))
            .bare()
            .build();
        let (effect, text) = execute(&mut prompt, "boom\n");
        assert!(matches!(effect, Effect::Continue));
        assert_eq!(text, "error: command error: backfired\n");
    }

    #[test]
    fn prompt_format_uses_name_or_default() {
        let named = Prompt::builder("fs").build();
        let mut out: Vec<u8> = Vec::new();
        named.prompt(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "fs > ");

        let anonymous = Prompt::builder("").build();
        let mut out: Vec<u8> = Vec::new();
        anonymous.prompt(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">>> ");
    }

    #[test]
    fn clone_keeps_chain_behavior_under_a_new_name() {
        let prompt = Prompt::builder("original")
            .handler(FuncHandler(accept_all))
            .build();
        let mut sibling = prompt.clone_context("sibling");
        assert_eq!(sibling.name(), "sibling");

        // The clone still carries the forced handlers (cloned, not
        // re-appended) and the user chain.
        let mut out: Vec<u8> = Vec::new();
        let effect = sibling.execute("exit\n", &mut out).unwrap();
        // accept_all sits ahead of the forced Exit handler, so the
        // line is consumed without popping.
        assert!(matches!(effect, Effect::Continue));
    }

    #[test]
    fn clone_resets_handler_instance_state() {
        struct Countdown {
            remaining: Rc<Cell<u32>>,
        }
        impl Handler for Countdown {
            fn try_execute(&mut self, _: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
                self.remaining.set(self.remaining.get().saturating_sub(1));
                scope.write(&self.remaining.get().to_string())?;
                Ok(Outcome::Handled(Effect::Continue))
            }
            fn clone_fresh(&self) -> Box<dyn Handler> {
                Box::new(Countdown {
                    remaining: Rc::new(Cell::new(3)),
                })
            }
        }

        let mut prompt = Prompt::builder("t")
            .handler(Countdown {
                remaining: Rc::new(Cell::new(3)),
            })
            .bare()
            .build();
        execute(&mut prompt, "tick\n");
        let (_, text) = execute(&mut prompt, "tick\n");
        assert_eq!(text, "1");

        let mut clone = prompt.clone_context("t2");
        let mut out: Vec<u8> = Vec::new();
        clone.execute("tick\n", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2");
    }
}
