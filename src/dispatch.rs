//! Token-vector dispatch: option application, command resolution, argument
//! binding, the filter chain and error-to-exit-code mapping.

use crate::args::{names_eq, ArgumentList};
use crate::coerce::{ArgParse, ValueKind};
use crate::error::ShellError;
use crate::help;
use crate::interpreter::{ShellConfig, ShellState};
use crate::io::StdIo;
use crate::registry::{CommandSpec, FilterFn, Registry};

/// The interpreter surface handed to every command action and filter.
///
/// Gives access to the registry (listings, option reads and writes), the
/// exit code, the REPL state, and the standard streams of the current
/// invocation.
pub struct Context<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) config: &'a ShellConfig,
    pub(crate) state: &'a mut ShellState,
    pub io: StdIo<'a>,
}

impl<'a> Context<'a> {
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        self.config
    }

    /// Current value of a registered option.
    pub fn option_value(&self, name: &str) -> Result<String, ShellError> {
        self.registry
            .find_option(name, self.config.case_insensitive)
            .map(|o| o.value())
            .ok_or_else(|| ShellError::UnknownOption(name.to_string()))
    }

    /// Convert and assign a registered option.
    pub fn set_option(&self, name: &str, value: &str) -> Result<(), ShellError> {
        self.registry
            .find_option(name, self.config.case_insensitive)
            .ok_or_else(|| ShellError::UnknownOption(name.to_string()))?
            .set_value(value)
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code
    }

    pub fn set_exit_code(&mut self, code: i32) {
        self.state.exit_code = code;
    }

    /// Ask the interactive loop to terminate after this dispatch.
    pub fn request_exit(&mut self) {
        self.state.should_exit = true;
    }

    pub fn prompt(&self) -> &str {
        &self.state.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    pub fn page_height(&self) -> usize {
        self.config.page_height
    }

    /// Read one character from the installed next-character reader.
    ///
    /// `Ok(None)` means the reader is exhausted. Fails when no reader is
    /// installed.
    pub fn read_next_char(&mut self) -> Result<Option<char>, ShellError> {
        match self.state.next_char.as_mut() {
            Some(read) => Ok(read()),
            None => Err(ShellError::ConsoleUnavailable),
        }
    }
}

#[derive(Debug)]
struct BoundEntry {
    name: String,
    present: bool,
    values: Vec<String>,
    default: Option<String>,
    kind: ValueKind,
}

/// The arguments of one invocation, resolved per formal parameter and
/// convertible on access.
#[derive(Debug)]
pub struct Bound {
    entries: Vec<BoundEntry>,
    raw: Vec<String>,
    case_insensitive: bool,
}

impl Bound {
    fn entry(&self, name: &str) -> Result<&BoundEntry, ShellError> {
        self.entries
            .iter()
            .find(|e| names_eq(&e.name, name, self.case_insensitive))
            .ok_or_else(|| {
                ShellError::InvalidInput(format!("no parameter named {name} is declared"))
            })
    }

    /// Convert the value bound to `name`.
    ///
    /// A present bare flag reads as `true` for booleans; an absent parameter
    /// falls back to its declared default.
    pub fn get<T: ArgParse>(&self, name: &str) -> Result<T, ShellError> {
        let entry = self.entry(name)?;
        let literal = if entry.present {
            match entry.values.first() {
                Some(v) => v.as_str(),
                None if entry.kind == ValueKind::Bool => "true",
                None => entry
                    .default
                    .as_deref()
                    .ok_or_else(|| ShellError::MissingArgument(entry.name.clone()))?,
            }
        } else {
            entry
                .default
                .as_deref()
                .ok_or_else(|| ShellError::MissingArgument(entry.name.clone()))?
        };
        T::parse_arg(literal).map_err(|_| ShellError::InvalidArgumentValue {
            argument: entry.name.clone(),
            value: literal.to_string(),
        })
    }

    /// Convert the value bound to `name`, or `None` when absent or valueless.
    pub fn get_opt<T: ArgParse>(&self, name: &str) -> Result<Option<T>, ShellError> {
        let entry = self.entry(name)?;
        let literal = if entry.present {
            match entry.values.first() {
                Some(v) => Some(v.as_str()),
                None => None,
            }
        } else {
            entry.default.as_deref()
        };
        match literal {
            Some(v) => T::parse_arg(v).map(Some).map_err(|_| {
                ShellError::InvalidArgumentValue {
                    argument: entry.name.clone(),
                    value: v.to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    /// Presence of a switch: bare occurrence reads true, absence reads the
    /// declared default.
    pub fn flag(&self, name: &str) -> Result<bool, ShellError> {
        self.get::<bool>(name)
    }

    /// All values bound to `name`, in order of appearance.
    pub fn list(&self, name: &str) -> Result<&[String], ShellError> {
        Ok(&self.entry(name)?.values)
    }

    /// Whether the argument appeared in the invocation.
    pub fn is_present(&self, name: &str) -> Result<bool, ShellError> {
        Ok(self.entry(name)?.present)
    }

    /// The raw token vector of the invocation (everything after the command
    /// name), as received before binding.
    pub fn raw(&self) -> &[String] {
        &self.raw
    }
}

/// Resolve each formal parameter of `command` from the tokens following the
/// command name.
pub(crate) fn bind(
    command: &CommandSpec,
    rest: &[String],
    config: &ShellConfig,
) -> Result<Bound, ShellError> {
    let ci = config.case_insensitive;
    let list = ArgumentList::from_tokens(rest, &config.tokenizer, ci);
    let mut consumed = vec![false; list.items().len()];
    let mut next_unnamed = 0usize;
    let has_capture = command.args().iter().any(|a| a.captures_all());
    let mut entries = Vec::with_capacity(command.args().len());

    for arg in command.args() {
        let mut present = false;
        let mut values: Vec<String> = Vec::new();

        if arg.captures_all() {
            present = true;
            values = rest.to_vec();
        } else {
            let found = list.items().iter().position(|item| {
                arg.lookup_names()
                    .iter()
                    .any(|n| names_eq(item.name(), n, ci))
            });
            if let Some(idx) = found {
                consumed[idx] = true;
                present = true;
                values = list.items()[idx].values().to_vec();
            } else if positional_kind(arg.kind()) && next_unnamed < list.unnamed().len() {
                present = true;
                values = vec![list.unnamed()[next_unnamed].clone()];
                next_unnamed += 1;
            }
        }

        if arg.is_required() && !present {
            return Err(ShellError::MissingArgument(arg.name().to_string()));
        }
        entries.push(BoundEntry {
            name: arg.name().to_string(),
            present,
            values,
            default: arg.default_value().map(str::to_string),
            kind: arg.kind(),
        });
    }

    if !has_capture {
        for (idx, item) in list.items().iter().enumerate() {
            if !consumed[idx] {
                return Err(ShellError::InvalidInput(format!(
                    "unrecognized argument: {}",
                    item.name()
                )));
            }
        }
    }

    Ok(Bound {
        entries,
        raw: rest.to_vec(),
        case_insensitive: ci,
    })
}

/// Switches, lists and token captures never consume positional values.
fn positional_kind(kind: ValueKind) -> bool {
    !matches!(kind, ValueKind::Bool | ValueKind::List | ValueKind::Tokens)
}

/// The remaining filter chain of one dispatch, ending at the resolved
/// command.
#[derive(Clone, Copy)]
pub struct Chain<'a> {
    filters: &'a [FilterFn],
    index: usize,
    command: Option<&'a CommandSpec>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(filters: &'a [FilterFn], command: &'a CommandSpec) -> Self {
        Self {
            filters,
            index: 0,
            command: Some(command),
        }
    }

    /// A chain with no remaining stages and no command; `next` is a no-op.
    /// Useful when invoking filter logic directly, outside a dispatch.
    pub fn terminal() -> Chain<'static> {
        Chain {
            filters: &[],
            index: 0,
            command: None,
        }
    }

    /// Continue toward the command with the (possibly rewritten) tokens.
    ///
    /// The vector still carries the command name at index zero; binding uses
    /// everything after it.
    pub fn next(self, ctx: &mut Context<'_>, tokens: Vec<String>) -> anyhow::Result<()> {
        if let Some(filter) = self.filters.get(self.index) {
            let rest = Chain {
                index: self.index + 1,
                ..self
            };
            filter(ctx, rest, tokens)
        } else if let Some(command) = self.command {
            let rest = tokens.get(1..).unwrap_or_default();
            let bound = bind(command, rest, ctx.config)?;
            command.invoke(ctx, &bound)
        } else {
            Ok(())
        }
    }
}

/// Dispatch one token vector: apply leading option assignments, resolve the
/// command, run the filter chain, map failures onto the exit code.
pub(crate) fn dispatch<'a>(
    registry: &'a Registry,
    filters: &[FilterFn],
    config: &'a ShellConfig,
    state: &'a mut ShellState,
    io: StdIo<'a>,
    mut tokens: Vec<String>,
) {
    if tokens.is_empty() {
        return;
    }
    let mut ctx = Context {
        registry,
        config,
        state,
        io,
    };

    if let Err(err) = apply_leading_options(&mut ctx, &mut tokens) {
        let _ = writeln!(ctx.io.stderr, "{err}");
        ctx.state.exit_code = 1;
        return;
    }
    if tokens.is_empty() {
        return;
    }

    let name = tokens[0].clone();
    tracing::debug!(command = %name, "dispatch");
    let Some(command) = registry.find_command(&name, config.case_insensitive) else {
        let _ = writeln!(ctx.io.stderr, "{}", ShellError::UnknownCommand(name));
        let _ = write!(ctx.io.stderr, "{}", help::summary(registry));
        ctx.state.exit_code = 1;
        return;
    };

    ctx.state.exit_code = 0;
    let chain = Chain::new(filters, command);
    if let Err(err) = chain.next(&mut ctx, tokens) {
        report(&mut ctx, &err);
        ctx.state.exit_code = 1;
    }
}

/// Apply `/Option=value`, `/Option value` and bare boolean `/Option` tokens
/// preceding the command to the registered options, splicing them out.
/// Unknown named tokens stay put for the command to consume.
fn apply_leading_options(
    ctx: &mut Context<'_>,
    tokens: &mut Vec<String>,
) -> Result<(), ShellError> {
    let ci = ctx.config.case_insensitive;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].clone();
        let Some((name, value)) = ctx.config.tokenizer.split_named(&token) else {
            break;
        };
        let Some(option) = ctx.registry.find_option(name, ci) else {
            i += 1;
            continue;
        };
        let value = match value {
            Some(v) => v.to_string(),
            None if option.kind() == ValueKind::Bool => "true".to_string(),
            None => {
                let next_is_value = tokens
                    .get(i + 1)
                    .map(|t| ctx.config.tokenizer.split_named(t).is_none())
                    .unwrap_or(false);
                if !next_is_value {
                    return Err(ShellError::MissingArgument(option.name().to_string()));
                }
                tokens.remove(i + 1)
            }
        };
        option.set_value(&value)?;
        tokens.remove(i);
    }
    Ok(())
}

fn report(ctx: &mut Context<'_>, err: &anyhow::Error) {
    match err.downcast_ref::<ShellError>() {
        Some(ShellError::Application(message)) => {
            let _ = writeln!(ctx.io.stderr, "{message}");
        }
        Some(shell_err) => {
            let _ = writeln!(ctx.io.stderr, "{shell_err}");
        }
        None => {
            let _ = writeln!(ctx.io.stderr, "error: {err:#}");
        }
    }
}
