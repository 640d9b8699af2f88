//! Filesystem-walking demo context.
//!
//! A prompt with `ls` (regex-bound), `cd`, `mkdir`, and `new`
//! (structured commands). `new` enters a free-text editor sub-context
//! that writes the collected buffer to the named file. The prompt
//! shows the basename of the current directory.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use parlor::{
    ArgSpec, ArgsHandler, ArgsRegistry, BlankRun, CommandSpec, Context, Effect, MultiLine,
    ParlorError, PatternHandler, PatternRegistry, Prompt, Result, Scope,
};

/// A [`Prompt`] over filesystem commands, with a cwd-aware prompt line.
///
/// The working directory is shared between the bound actions through a
/// `Rc<RefCell<_>>` cell so `cd` is visible to `ls` and friends.
pub struct FsContext {
    inner: Prompt,
    cwd: Rc<RefCell<PathBuf>>,
}

/// Build the `fs` context rooted at the process working directory.
pub fn fs_context() -> Result<FsContext> {
    let start = std::env::current_dir().map_err(|e| ParlorError::Command(e.to_string()))?;
    Ok(fs_context_at(start))
}

/// Build the `fs` context rooted at an explicit directory.
pub fn fs_context_at(start: PathBuf) -> FsContext {
    build(start, "fs")
}

fn build(start: PathBuf, name: &str) -> FsContext {
    let cwd = Rc::new(RefCell::new(start));

    let patterns = {
        let cwd = Rc::clone(&cwd);
        PatternRegistry::builder()
            .bind(r"^ls(\s+(?P<dirname>\S+))?", move |caps, scope| {
                let base = cwd.borrow().clone();
                let target = match caps.get("dirname") {
                    Some(dir) => base.join(dir),
                    None => base,
                };
                list_dir(&target, scope)
            })
            .build()
            .expect("ls pattern should compile")
    };

    let cwd_cd = Rc::clone(&cwd);
    let cwd_mkdir = Rc::clone(&cwd);
    let cwd_new = Rc::clone(&cwd);
    let commands = ArgsRegistry::builder()
        .command(
            CommandSpec::new("cd")
                .about("Change the working directory")
                .arg(ArgSpec::positional("dirname")),
            move |args, scope| {
                let dirname = args.str("dirname").unwrap_or(".");
                let target = cwd_cd.borrow().join(dirname);
                match target.canonicalize() {
                    Ok(path) if path.is_dir() => *cwd_cd.borrow_mut() = path,
                    _ => scope.write(&format!("No such dir: {dirname}\n"))?,
                }
                Ok(Effect::Continue)
            },
        )
        .command(
            CommandSpec::new("mkdir")
                .about("Create a directory")
                .arg(ArgSpec::positional("dirname")),
            move |args, _scope| {
                let dirname = args.str("dirname").unwrap_or("");
                let target = cwd_mkdir.borrow().join(dirname);
                fs::create_dir(&target).map_err(|e| ParlorError::Command(e.to_string()))?;
                Ok(Effect::Continue)
            },
        )
        .command(
            CommandSpec::new("new")
                .about("Create a file from free-text entry")
                .allow_help()
                .arg(ArgSpec::positional("filename")),
            move |args, scope| {
                let filename = args.str("filename").unwrap_or("").to_string();
                let target = cwd_new.borrow().join(&filename);
                if target.exists() {
                    scope.write(&format!("{filename} already exists!\n"))?;
                    return Ok(Effect::Continue);
                }
                scope.write(&format!(
                    "< Enter content of new file \"{filename}\" (2 empty lines to exit editor) >\n"
                ))?;
                let editor = MultiLine::new("editor", BlankRun::new(), move |text, _scope| {
                    fs::write(&target, text).map_err(|e| ParlorError::Command(e.to_string()))
                });
                Ok(Effect::Push(Box::new(editor)))
            },
        )
        .build();

    let inner = Prompt::builder(name)
        .handler(PatternHandler::new(patterns))
        .handler(ArgsHandler::new(commands))
        .build();
    FsContext { inner, cwd }
}

impl Context for FsContext {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn prompt(&self, out: &mut dyn Write) -> Result<()> {
        let cwd = self.cwd.borrow();
        let base = cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.write_all(format!("@ {base} > ").as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn execute(&mut self, line: &str, out: &mut dyn Write) -> Result<Effect> {
        self.inner.execute(line, out)
    }

    fn clone_context(&self, name: &str) -> Box<dyn Context> {
        // A sibling starts where this one currently is; from there the
        // two working directories evolve independently.
        Box::new(build(self.cwd.borrow().clone(), name))
    }
}

fn list_dir(path: &Path, scope: &mut Scope<'_>) -> Result<Effect> {
    if !path.exists() {
        scope.write(&format!("No such dir: {}\n", path.display()))?;
        return Ok(Effect::Continue);
    }
    if !path.is_dir() {
        scope.write(&format!("{}\n", path.display()))?;
        return Ok(Effect::Continue);
    }
    let mut names: Vec<String> = fs::read_dir(path)
        .map_err(|e| ParlorError::Command(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    scope.write(&format!("{}\n", names.join("\n")))?;
    Ok(Effect::Continue)
}
