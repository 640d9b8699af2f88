//! Structured-argument matching: a registry of declarative command
//! specs compiled into a single `clap` parser.
//!
//! This is the only matching strategy where one handler instance serves
//! many distinct commands. Parse failures are silent rejections so a
//! later handler in the chain gets a chance; usage text only escapes to
//! the user when a command was registered with help allowed.

use std::collections::HashMap;
use std::rc::Rc;

use clap::error::ErrorKind;

use crate::error::Result;
use crate::handler::{Effect, Handler, Outcome, Scope};

/// Kind of value an argument carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    /// Boolean switch with no value token.
    Flag,
}

/// Declarative descriptor for one argument of a registered command.
///
/// An argument with no flag aliases is positional; positionals are
/// filled in declared order. Flag aliases mix long (`--format`) and
/// short (`-f`) forms.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    name: String,
    aliases: Vec<String>,
    kind: ValueKind,
    default: Option<String>,
    required: bool,
    help: String,
}

impl ArgSpec {
    /// A required positional argument, filled in declared order.
    pub fn positional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            kind: ValueKind::Str,
            default: None,
            required: true,
            help: String::new(),
        }
    }

    /// An option taking a value, addressed by its flag aliases.
    pub fn option(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            kind: ValueKind::Str,
            default: None,
            required: false,
            help: String::new(),
        }
    }

    /// A boolean switch, addressed by its flag aliases.
    pub fn flag(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            kind: ValueKind::Flag,
            default: None,
            required: false,
            help: String::new(),
        }
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self.required = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help = text.to_string();
        self
    }

    fn to_clap(&self) -> clap::Arg {
        let mut arg = clap::Arg::new(self.name.clone());
        for alias in &self.aliases {
            if let Some(long) = alias.strip_prefix("--") {
                arg = arg.long(long.to_string());
            } else if let Some(short) = alias.strip_prefix('-')
                && let Some(c) = short.chars().next()
            {
                arg = arg.short(c);
            }
        }
        if !self.help.is_empty() {
            arg = arg.help(self.help.clone());
        }
        match self.kind {
            ValueKind::Flag => {
                arg = arg.action(clap::ArgAction::SetTrue);
                if self.required {
                    arg = arg.required(true);
                }
            },
            ValueKind::Str => {
                arg = arg.action(clap::ArgAction::Set);
                if self.required {
                    arg = arg.required(true);
                }
                if let Some(default) = &self.default {
                    arg = arg.default_value(default.clone());
                }
            },
            ValueKind::Int => {
                arg = arg
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(i64));
                if self.required {
                    arg = arg.required(true);
                }
                if let Some(default) = &self.default {
                    arg = arg.default_value(default.clone());
                }
            },
        }
        arg
    }
}

/// Declarative spec for one registered command: name, help text, a
/// flag allowing usage output, and its argument descriptors.
pub struct CommandSpec {
    name: String,
    about: String,
    allow_help: bool,
    args: Vec<ArgSpec>,
}

impl CommandSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            about: String::new(),
            allow_help: false,
            args: Vec::new(),
        }
    }

    pub fn about(mut self, text: &str) -> Self {
        self.about = text.to_string();
        self
    }

    /// Permit rendered usage/help text to reach the output sink for
    /// this command. Off by default: help requests are silent
    /// rejections like any other parse failure.
    pub fn allow_help(mut self) -> Self {
        self.allow_help = true;
        self
    }

    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }
}

/// Typed view of one parsed invocation, keyed by argument name.
pub struct ParsedArgs {
    values: HashMap<String, ArgValue>,
}

#[derive(Debug, Clone, PartialEq)]
enum ArgValue {
    Str(String),
    Int(i64),
    Flag(bool),
}

impl ParsedArgs {
    fn from_matches(spec: &BoundCommand, matches: &clap::ArgMatches) -> Self {
        let mut values = HashMap::new();
        for arg in &spec.spec.args {
            match arg.kind {
                ValueKind::Flag => {
                    values.insert(arg.name.clone(), ArgValue::Flag(matches.get_flag(&arg.name)));
                },
                ValueKind::Str => {
                    if let Some(v) = matches.get_one::<String>(&arg.name) {
                        values.insert(arg.name.clone(), ArgValue::Str(v.clone()));
                    }
                },
                ValueKind::Int => {
                    if let Some(v) = matches.get_one::<i64>(&arg.name) {
                        values.insert(arg.name.clone(), ArgValue::Int(*v));
                    }
                },
            }
        }
        Self { values }
    }

    /// String value of the named argument, if present.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer value of the named argument, if present.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// State of the named switch. Absent flags read as false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Flag(true)))
    }
}

/// Action bound to a structured command. Receives the typed parse.
pub type ArgsAction = Rc<dyn Fn(&ParsedArgs, &mut Scope<'_>) -> Result<Effect>>;

struct BoundCommand {
    spec: CommandSpec,
    action: ArgsAction,
}

/// Immutable table of command specs and bound actions.
pub struct ArgsRegistry {
    commands: Vec<BoundCommand>,
}

impl ArgsRegistry {
    pub fn builder() -> ArgsRegistryBuilder {
        ArgsRegistryBuilder {
            commands: Vec::new(),
        }
    }

    fn find(&self, name: &str) -> Option<&BoundCommand> {
        self.commands.iter().find(|c| c.spec.name == name)
    }
}

/// Accumulates command specs and actions at setup time.
pub struct ArgsRegistryBuilder {
    commands: Vec<BoundCommand>,
}

impl ArgsRegistryBuilder {
    pub fn command(
        mut self,
        spec: CommandSpec,
        action: impl Fn(&ParsedArgs, &mut Scope<'_>) -> Result<Effect> + 'static,
    ) -> Self {
        self.commands.push(BoundCommand {
            spec,
            action: Rc::new(action),
        });
        self
    }

    pub fn build(self) -> Rc<ArgsRegistry> {
        Rc::new(ArgsRegistry {
            commands: self.commands,
        })
    }
}

/// Matches lines by tokenizing them and feeding the tokens to a single
/// structured parser with one sub-command per registered command.
pub struct ArgsHandler {
    registry: Rc<ArgsRegistry>,
    parser: clap::Command,
}

impl ArgsHandler {
    /// Compile all registered commands into one parser instance.
    pub fn new(registry: Rc<ArgsRegistry>) -> Self {
        let mut parser = clap::Command::new("")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true);
        for bound in &registry.commands {
            let mut sub = clap::Command::new(bound.spec.name.clone()).disable_version_flag(true);
            if !bound.spec.about.is_empty() {
                sub = sub.about(bound.spec.about.clone());
            }
            // The parser-wide disable_help_flag above propagates to
            // every subcommand, so commands that allow help carry an
            // explicit help argument instead of the default flag.
            if bound.spec.allow_help {
                sub = sub.arg(
                    clap::Arg::new("help")
                        .long("help")
                        .short('h')
                        .action(clap::ArgAction::Help)
                        .help("Print help"),
                );
            } else {
                sub = sub.disable_help_flag(true);
            }
            for arg in &bound.spec.args {
                sub = sub.arg(arg.to_clap());
            }
            parser = parser.subcommand(sub);
        }
        Self { registry, parser }
    }
}

impl Handler for ArgsHandler {
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Outcome::Rejected);
        }

        match self.parser.clone().try_get_matches_from(tokens) {
            Ok(matches) => {
                let Some((name, sub_matches)) = matches.subcommand() else {
                    return Ok(Outcome::Rejected);
                };
                let Some(bound) = self.registry.find(name) else {
                    return Ok(Outcome::Rejected);
                };
                let parsed = ParsedArgs::from_matches(bound, sub_matches);
                (bound.action)(&parsed, scope).map(Outcome::Handled)
            },
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                // Help was requested on a command registered with help
                // allowed (commands without it have no help flag, so
                // `-h` surfaces as an unknown argument instead).
                scope.write(&err.render().to_string())?;
                Ok(Outcome::Handled(Effect::Continue))
            },
            Err(err) => {
                log::debug!("structured parse rejected: {}", err.kind());
                Ok(Outcome::Rejected)
            },
        }
    }

    fn clone_fresh(&self) -> Box<dyn Handler> {
        Box::new(Self::new(Rc::clone(&self.registry)))
    }
}
