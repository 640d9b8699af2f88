//! Interactive demo for the parlor interpreter framework.
//!
//! The top-level prompt offers `fs` (a filesystem-walking sub-context)
//! and `boldly_read` (which pushes a JSON entry sub-context when asked
//! for JSON), on top of the forced echo/exit/empty-line handlers.

mod fswalk;

use anyhow::Result;
use parlor::{
    ArgSpec, ArgsHandler, ArgsRegistry, CommandSpec, Effect, Prompt, json_entry, run_with_context,
};

fn top_level() -> parlor::Result<Prompt> {
    let commands = ArgsRegistry::builder()
        .command(
            CommandSpec::new("fs").about("Walk the local filesystem"),
            |_args, _scope| {
                let ctx = fswalk::fs_context()?;
                Ok(Effect::Push(Box::new(ctx)))
            },
        )
        .command(
            CommandSpec::new("boldly_read")
                .about("Read a payload where no one has read before")
                .allow_help()
                .arg(
                    ArgSpec::option("format", &["--format", "-f"])
                        .default_value("plain")
                        .help("Payload format (json enters an entry sub-context)"),
                ),
            |args, scope| {
                let format = args.str("format").unwrap_or("plain");
                if format != "json" {
                    scope.write(&format!("Unbold format: {format}\n"))?;
                    return Ok(Effect::Continue);
                }
                scope.write("Boldly go on:\n")?;
                let entry = json_entry("json", |value, scope| {
                    scope.write(&format!("Boldly done!\nJSON is valid: {value}\n"))
                });
                Ok(Effect::Push(Box::new(entry)))
            },
        )
        .build();

    Ok(Prompt::builder("")
        .handler(ArgsHandler::new(commands))
        .build())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting parlor demo (try: fs, boldly_read -f json, echo, exit)");

    run_with_context(Box::new(top_level()?))?;
    Ok(())
}
