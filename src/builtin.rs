//! Default built-in commands.
//!
//! Each built-in is an ordinary command registered through an internal
//! handler, so help, aliases and dispatch treat them like user commands.
//! Every one of them can be suppressed by the [`Builtins`] flags given at
//! construction, and a later user registration under the same name replaces
//! the built-in.

use std::fs;

use anyhow::Context as _;
use regex::RegexBuilder;

use crate::coerce::ValueKind;
use crate::error::ShellError;
use crate::help;
use crate::registry::{ArgSpec, CommandSpec, Handler};
use crate::tokens;

/// Which default built-ins to install. `pipe` and `redirect` govern the
/// interactive stage operators rather than commands. `exit`/`quit` are
/// additionally always honored by the interactive loop, whether or not the
/// command is installed.
#[derive(Debug, Clone)]
pub struct Builtins {
    pub help: bool,
    pub get: bool,
    pub set: bool,
    pub echo: bool,
    pub more: bool,
    pub find: bool,
    pub prompt: bool,
    pub exit: bool,
    /// Honor `|` when splitting interactive lines.
    pub pipe: bool,
    /// Honor `<` and `>` when splitting interactive lines.
    pub redirect: bool,
}

impl Builtins {
    pub fn all() -> Self {
        Self {
            help: true,
            get: true,
            set: true,
            echo: true,
            more: true,
            find: true,
            prompt: true,
            exit: true,
            pipe: true,
            redirect: true,
        }
    }

    pub fn none() -> Self {
        Self {
            help: false,
            get: false,
            set: false,
            echo: false,
            more: false,
            find: false,
            prompt: false,
            exit: false,
            pipe: false,
            redirect: false,
        }
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::all()
    }
}

pub(crate) fn builtin_handler(flags: &Builtins) -> Handler {
    let mut handler = Handler::new();
    if flags.help {
        handler = handler.command(help_command());
    }
    if flags.get {
        handler = handler.command(get_command());
    }
    if flags.set {
        handler = handler.command(set_command());
    }
    if flags.echo {
        handler = handler.command(echo_command());
    }
    if flags.more {
        handler = handler.command(more_command());
    }
    if flags.find {
        handler = handler.command(find_command());
    }
    if flags.prompt {
        handler = handler.command(prompt_command());
    }
    if flags.exit {
        handler = handler.command(exit_command());
    }
    handler
}

fn help_command() -> CommandSpec {
    CommandSpec::new("help", |ctx, args| {
        let text = match args.get_opt::<String>("name")? {
            Some(name) => {
                help::detail(ctx.registry(), &name, ctx.config().case_insensitive)?
            }
            None if args.flag("html")? => help::html(ctx.registry()),
            None => help::summary(ctx.registry()),
        };
        write!(ctx.io.stdout, "{text}")?;
        Ok(())
    })
    .describe("List commands and options, or show details for one name.")
    .arg(ArgSpec::nullable("name", ValueKind::Str).describe("command or option to describe"))
    .arg(ArgSpec::flag("html").describe("render the listing as HTML"))
}

fn get_command() -> CommandSpec {
    CommandSpec::new("get", |ctx, args| {
        let name: String = args.get("option")?;
        let value = ctx.option_value(&name)?;
        writeln!(ctx.io.stdout, "{value}")?;
        Ok(())
    })
    .describe("Print the current value of an option.")
    .arg(ArgSpec::required("option", ValueKind::Str).describe("option name"))
}

fn set_command() -> CommandSpec {
    CommandSpec::new("set", |ctx, args| {
        if args.flag("readInput")? {
            let mut text = String::new();
            ctx.io.stdin.read_to_string(&mut text)?;
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (name, value) = line.split_once('=').ok_or_else(|| {
                    ShellError::InvalidInput(format!("expected name=value, got '{line}'"))
                })?;
                ctx.set_option(name.trim(), value.trim())?;
            }
            return Ok(());
        }
        match (args.get_opt::<String>("option")?, args.get_opt::<String>("value")?) {
            (Some(name), Some(value)) => ctx.set_option(&name, &value)?,
            (Some(name), None) => {
                let value = ctx.option_value(&name)?;
                writeln!(ctx.io.stdout, "{value}")?;
            }
            (None, _) => {
                let lines: Vec<String> = ctx
                    .registry()
                    .options()
                    .iter()
                    .filter(|o| o.visible())
                    .map(|o| format!("{}={}", o.name(), o.value()))
                    .collect();
                for line in lines {
                    writeln!(ctx.io.stdout, "{line}")?;
                }
            }
        }
        Ok(())
    })
    .describe("List options, print one, or assign a new value.")
    .arg(ArgSpec::nullable("option", ValueKind::Str).describe("option name"))
    .arg(ArgSpec::nullable("value", ValueKind::Str).describe("new value"))
    .arg(ArgSpec::flag("readInput").describe("apply name=value lines from standard input"))
}

fn echo_command() -> CommandSpec {
    CommandSpec::new("echo", |ctx, args| {
        writeln!(ctx.io.stdout, "{}", tokens::join(args.raw()))?;
        Ok(())
    })
    .describe("Print the arguments joined by single spaces, quoted as needed.")
    .arg(ArgSpec::all_args("tokens"))
}

fn more_command() -> CommandSpec {
    CommandSpec::new("more", |ctx, _| {
        let mut text = String::new();
        ctx.io.stdin.read_to_string(&mut text)?;
        let window = ctx.page_height().saturating_sub(1).max(1);
        let lines: Vec<&str> = text.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            writeln!(ctx.io.stdout, "{line}")?;
            let shown = index + 1;
            if shown % window == 0 && shown < lines.len() {
                write!(ctx.io.stdout, "-- More --")?;
                ctx.io.stdout.flush()?;
                match ctx.read_next_char()? {
                    Some(_) => writeln!(ctx.io.stdout)?,
                    None => break,
                }
            }
        }
        Ok(())
    })
    .describe("Paginate standard input one window at a time.")
}

fn find_command() -> CommandSpec {
    CommandSpec::new("find", |ctx, args| {
        let pattern: String = args.get("pattern")?;
        let invert = args.flag("V")?;
        let ignore_case = args.flag("I")?;
        let matcher = RegexBuilder::new(&regex::escape(&pattern))
            .case_insensitive(ignore_case)
            .build()
            .with_context(|| format!("invalid pattern: {pattern}"))?;

        let text = match args.get_opt::<String>("f")? {
            Some(path) => {
                fs::read_to_string(&path).with_context(|| format!("cannot open {path}"))?
            }
            None => {
                let mut buf = String::new();
                ctx.io.stdin.read_to_string(&mut buf)?;
                buf
            }
        };
        for line in text.lines() {
            if matcher.is_match(line) != invert {
                writeln!(ctx.io.stdout, "{line}")?;
            }
        }
        Ok(())
    })
    .describe("Print input lines containing a literal substring.")
    .arg(ArgSpec::required("pattern", ValueKind::Str).describe("substring to look for"))
    .arg(ArgSpec::flag("V").describe("print lines that do not match"))
    .arg(ArgSpec::flag("I").describe("ignore case"))
    .arg(ArgSpec::nullable("f", ValueKind::Str).describe("read from a file instead of standard input"))
}

fn prompt_command() -> CommandSpec {
    CommandSpec::new("prompt", |ctx, args| {
        match args.get_opt::<String>("text")? {
            Some(text) => ctx.set_prompt(text),
            None => {
                let prompt = ctx.prompt().to_string();
                writeln!(ctx.io.stdout, "{prompt}")?;
            }
        }
        Ok(())
    })
    .describe("Show or set the interactive prompt.")
    .arg(ArgSpec::nullable("text", ValueKind::Str).describe("new prompt text"))
}

fn exit_command() -> CommandSpec {
    CommandSpec::new("exit", |ctx, _| {
        ctx.request_exit();
        Ok(())
    })
    .alias("quit")
    .describe("Leave the interactive loop.")
}
