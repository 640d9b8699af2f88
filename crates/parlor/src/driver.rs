//! The driver: owns the context stack and the prompt/read/execute loop.

use std::io::{self, BufRead, Write};

use crate::context::{Context, Prompt};
use crate::error::Result;
use crate::handler::{Effect, Handler};

/// Runs the read-execute loop over a stack of contexts.
///
/// The top of the stack is the active context. Each iteration renders
/// the active prompt, blocks on one line from the input source, and
/// applies the resulting effect: push makes the new context active
/// immediately, pop removes the current one, and popping the last
/// context (or running out of input) ends the loop.
pub struct Driver<R: BufRead, W: Write> {
    stack: Vec<Box<dyn Context>>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Driver<R, W> {
    pub fn new(root: Box<dyn Context>, input: R, output: W) -> Self {
        Self {
            stack: vec![root],
            input,
            output,
        }
    }

    /// Run until the stack empties or the input source is exhausted.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(context) = self.stack.last_mut() else {
                break;
            };
            context.prompt(&mut self.output)?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                log::debug!("input exhausted, ending loop");
                break;
            }

            match context.execute(&line, &mut self.output)? {
                Effect::Continue => {},
                Effect::Push(next) => {
                    log::debug!("entering context '{}'", next.name());
                    self.stack.push(next);
                },
                Effect::Pop => {
                    if let Some(left) = self.stack.pop() {
                        log::debug!("leaving context '{}'", left.name());
                    }
                    if self.stack.is_empty() {
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    /// Number of stacked contexts.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consume the driver and hand back its output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Run a context over stdin/stdout until it exits.
pub fn run_with_context(context: Box<dyn Context>) -> Result<()> {
    let stdin = io::stdin().lock();
    let stdout = io::stdout();
    Driver::new(context, stdin, stdout).run()
}

/// Run a single handler inside an anonymous standard prompt.
pub fn run_with_handler(handler: Box<dyn Handler>) -> Result<()> {
    let context = Prompt::builder("").boxed_handler(handler).build();
    run_with_context(Box::new(context))
}
