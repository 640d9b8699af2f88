//! Line-oriented command interpreter framework.
//!
//! A program built on parlor reads one line at a time, matches it
//! against a chain of registered handlers, executes the matching
//! action, and may enter a nested interactive sub-mode. Dispatch is a
//! registry-based system: registries of pattern-to-action bindings are
//! built once at setup time and shared read-only by handler instances;
//! contexts own ordered handler chains; the driver owns the stack of
//! active contexts and the prompt/read/execute loop.
//!
//! Three matching strategies ship with the crate: exact literals
//! ([`ExactHandler`]), start-anchored regex patterns with named
//! captures ([`PatternHandler`]), and structured commands with typed
//! flags and positionals compiled into a single parser
//! ([`ArgsHandler`]). Nested free-text or data entry uses a
//! [`MultiLine`] context that buffers raw lines until a termination
//! predicate fires.

mod args;
mod context;
mod driver;
mod error;
mod exact;
mod handler;
mod multiline;
mod pattern;

/// Structured-argument handler compiled from declarative command specs.
pub use args::ArgsHandler;
/// Registry of structured command specs and bound actions.
pub use args::{ArgSpec, ArgsRegistry, ArgsRegistryBuilder, CommandSpec, ParsedArgs, ValueKind};
/// An interactive mode with its own handler chain, name, and prompt.
pub use context::Context;
/// The standard interactive context and its builder.
pub use context::{Prompt, PromptBuilder, UnhandledPolicy};
/// The read-execute loop over a stack of contexts.
pub use driver::Driver;
/// Shortcuts wrapping stdin/stdout sessions.
pub use driver::{run_with_context, run_with_handler};
/// Errors produced by the framework.
pub use error::{ParlorError, Result};
/// Exact-literal handler and registry.
pub use exact::{ExactHandler, ExactRegistry, ExactRegistryBuilder};
/// The handler capability and its dispatch outcome types.
pub use handler::{Effect, Handler, Outcome, Scope};
/// Built-in handlers forced onto every standard prompt.
pub use handler::{Echo, EmptyLine, Exit};
/// Multi-line buffering contexts and termination predicates.
pub use multiline::{BlankRun, FinishAction, MultiLine, Terminator};
/// JSON structured-data entry contexts.
pub use multiline::{json_entry, json_entry_with_error};
/// Regex handler and registry with named capture groups.
pub use pattern::{CaptureMap, PatternHandler, PatternRegistry, PatternRegistryBuilder};
