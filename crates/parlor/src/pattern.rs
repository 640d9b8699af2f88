//! Regex matching: a registry of patterns with named capture groups.

use std::collections::HashMap;
use std::rc::Rc;

use regex::Regex;

use crate::error::Result;
use crate::handler::{Effect, Handler, Outcome, Scope};

/// Named capture groups of a matched pattern, keyed by group name.
///
/// Only groups that participated in the match are present; unnamed
/// groups are ignored.
pub struct CaptureMap {
    values: HashMap<String, String>,
}

impl CaptureMap {
    fn from_match(re: &Regex, caps: &regex::Captures<'_>) -> Self {
        let mut values = HashMap::new();
        for name in re.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                values.insert(name.to_string(), m.as_str().to_string());
            }
        }
        Self { values }
    }

    /// Text matched by the named group, if it participated in the match.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Action bound to a pattern. Receives the pattern's named captures.
pub type PatternAction = Rc<dyn Fn(&CaptureMap, &mut Scope<'_>) -> Result<Effect>>;

/// Immutable table of `(pattern, action)` bindings for one handler type.
///
/// Patterns are attempted in registration order, anchored at the start
/// of the line (the whole line need not match); the first pattern that
/// matches wins.
pub struct PatternRegistry {
    entries: Vec<(Regex, PatternAction)>,
}

impl PatternRegistry {
    pub fn builder() -> PatternRegistryBuilder {
        PatternRegistryBuilder {
            entries: Vec::new(),
        }
    }
}

/// Accumulates `(pattern, action)` bindings at setup time.
pub struct PatternRegistryBuilder {
    entries: Vec<(String, PatternAction)>,
}

impl PatternRegistryBuilder {
    /// Bind an action to a regex pattern.
    pub fn bind(
        mut self,
        pattern: &str,
        action: impl Fn(&CaptureMap, &mut Scope<'_>) -> Result<Effect> + 'static,
    ) -> Self {
        self.entries.push((pattern.to_string(), Rc::new(action)));
        self
    }

    /// Compile all bound patterns into a frozen registry.
    pub fn build(self) -> Result<Rc<PatternRegistry>> {
        let mut entries = Vec::with_capacity(self.entries.len());
        for (pattern, action) in self.entries {
            entries.push((Regex::new(&pattern)?, action));
        }
        Ok(Rc::new(PatternRegistry { entries }))
    }
}

/// Matches lines against regex patterns from a shared registry.
pub struct PatternHandler {
    registry: Rc<PatternRegistry>,
}

impl PatternHandler {
    pub fn new(registry: Rc<PatternRegistry>) -> Self {
        Self { registry }
    }
}

impl Handler for PatternHandler {
    fn try_execute(&mut self, line: &str, scope: &mut Scope<'_>) -> Result<Outcome> {
        for (re, action) in &self.registry.entries {
            // Leftmost match search: if the earliest match does not
            // begin at the start of the line, no start-anchored match
            // exists for this pattern.
            if let Some(caps) = re.captures(line)
                && caps.get(0).is_some_and(|m| m.start() == 0)
            {
                let map = CaptureMap::from_match(re, &caps);
                return action(&map, scope).map(Outcome::Handled);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParlorError;

    fn run(handler: &mut dyn Handler, line: &str) -> (Outcome, String) {
        let mut out: Vec<u8> = Vec::new();
        let outcome = {
            let mut scope = Scope::new(&mut out, "test");
            handler.try_execute(line, &mut scope).unwrap()
        };
        (outcome, String::from_utf8(out).unwrap())
    }

    fn starship_registry() -> Rc<PatternRegistry> {
        PatternRegistry::builder()
            .bind(r"go to warp (?P<warp_factor>\d(\.\d+))", |caps, scope| {
                let factor = caps.get("warp_factor").unwrap_or("?");
                scope.write(&format!("At warp {factor}"))?;
                Ok(Effect::Continue)
            })
            .bind(r"(?P<action>raise|drop) shields", |caps, scope| {
                let verb = if caps.get("action") == Some("raise") {
                    "raised"
                } else {
                    "dropped"
                };
                scope.write(&format!("Shields {verb}"))?;
                Ok(Effect::Continue)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn named_captures_reach_the_action() {
        let mut h = PatternHandler::new(starship_registry());
        let (outcome, text) = run(&mut h, "go to warp 9.99");
        assert!(matches!(outcome, Outcome::Handled(Effect::Continue)));
        assert_eq!(text, "At warp 9.99");
    }

    #[test]
    fn later_patterns_are_tried_in_order() {
        let mut h = PatternHandler::new(starship_registry());
        let (_, text) = run(&mut h, "raise shields");
        assert_eq!(text, "Shields raised");
        let (_, text) = run(&mut h, "drop shields");
        assert_eq!(text, "Shields dropped");
    }

    #[test]
    fn rejects_non_matching_lines() {
        let mut h = PatternHandler::new(starship_registry());
        for line in ["qwerty", "remodulate shields", "go to warp NaN"] {
            let (outcome, _) = run(&mut h, line);
            assert!(matches!(outcome, Outcome::Rejected), "accepted {line:?}");
        }
    }

    #[test]
    fn match_must_start_at_the_beginning_of_the_line() {
        let registry = PatternRegistry::builder()
            .bind(r"warp (?P<n>\d+)", |_caps, scope| {
                scope.write("engaged")?;
                Ok(Effect::Continue)
            })
            .build()
            .unwrap();
        let mut h = PatternHandler::new(registry);
        let (outcome, _) = run(&mut h, "go to warp 5");
        assert!(matches!(outcome, Outcome::Rejected));
        let (outcome, _) = run(&mut h, "warp 5 please");
        assert!(matches!(outcome, Outcome::Handled(Effect::Continue)));
    }

    #[test]
    fn first_registered_pattern_wins() {
        let registry = PatternRegistry::builder()
            .bind(r"scan", |_caps, scope| {
                scope.write("first")?;
                Ok(Effect::Continue)
            })
            .bind(r"scan (?P<what>.*)", |_caps, scope| {
                scope.write("second")?;
                Ok(Effect::Continue)
            })
            .build()
            .unwrap();
        let mut h = PatternHandler::new(registry);
        let (_, text) = run(&mut h, "scan nebula");
        assert_eq!(text, "first");
    }

    #[test]
    fn optional_group_that_did_not_match_is_absent() {
        let registry = PatternRegistry::builder()
            .bind(r"ls(\s+(?P<dirname>\S+))?", |caps, scope| {
                match caps.get("dirname") {
                    Some(dir) => scope.write(dir)?,
                    None => scope.write("(cwd)")?,
                }
                Ok(Effect::Continue)
            })
            .build()
            .unwrap();
        let mut h = PatternHandler::new(registry);
        let (_, text) = run(&mut h, "ls\n");
        assert_eq!(text, "(cwd)");
        let (_, text) = run(&mut h, "ls /tmp\n");
        assert_eq!(text, "/tmp");
    }

    #[test]
    fn invalid_pattern_fails_at_build_time() {
        let result = PatternRegistry::builder()
            .bind("(unclosed", |_caps, _scope| Ok(Effect::Continue))
            .build();
        assert!(matches!(result, Err(ParlorError::Pattern(_))));
    }
}
