//! Handler registration and the command/option registry.
//!
//! A [`Handler`] is built with a registration DSL: options declare typed
//! read/write accessors over the handler's state, commands declare their
//! formal arguments and an action closure, filters wrap every invocation.
//! Registration snapshots this metadata into the [`Registry`]; option values
//! stay behind the accessors and are read and written on each access.

use std::fmt;

use crate::args::names_eq;
use crate::coerce::{ArgParse, ValueKind};
use crate::dispatch::{Bound, Chain, Context};
use crate::error::ShellError;

/// A command's executable body.
pub type Action = Box<dyn Fn(&mut Context<'_>, &Bound) -> anyhow::Result<()>>;

/// An around-invocation hook. Receives the interpreter context, the chain to
/// continue with, and the token vector of the invocation; it may mutate the
/// tokens before calling [`Chain::next`], or suppress the invocation by not
/// calling it.
pub type FilterFn = Box<dyn Fn(&mut Context<'_>, Chain<'_>, Vec<String>) -> anyhow::Result<()>>;

/// A named, typed, persistent value on a handler, readable and writable by
/// name through `get`/`set`, macro expansion and top-level arguments.
pub struct OptionSpec {
    name: String,
    aliases: Vec<String>,
    description: String,
    category: String,
    visible: bool,
    kind: ValueKind,
    default: String,
    read: Box<dyn Fn() -> String>,
    write: Box<dyn Fn(&str) -> Result<(), ShellError>>,
}

impl OptionSpec {
    /// Declare an option backed by typed accessors.
    ///
    /// The getter supplies the current value, the setter stores a converted
    /// one; writes that fail conversion surface as invalid-argument-value
    /// naming the option. The value at declaration time becomes the
    /// default shown in listings.
    pub fn new<T, G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        T: ArgParse + fmt::Display + 'static,
        G: Fn() -> T + 'static,
        S: Fn(T) + 'static,
    {
        let name = name.into();
        let default = get().to_string();
        let write_name = name.clone();
        Self {
            name,
            aliases: Vec::new(),
            description: String::new(),
            category: String::new(),
            visible: true,
            kind: T::kind(),
            default,
            read: Box::new(move || get().to_string()),
            write: Box::new(move |value| match T::parse_arg(value) {
                Ok(v) => {
                    set(v);
                    Ok(())
                }
                Err(_) => Err(ShellError::InvalidArgumentValue {
                    argument: write_name.clone(),
                    value: value.to_string(),
                }),
            }),
        }
    }

    /// Add an alias; empty aliases are ignored.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.is_empty() {
            self.aliases.push(alias);
        }
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Hide from listings. Direct access by name still works.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Override the default value shown in listings.
    pub fn default_text(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_name(&self) -> &str {
        &self.category
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Read the current value through the accessor.
    pub fn value(&self) -> String {
        (self.read)()
    }

    /// Convert and store a new value through the accessor.
    pub fn set_value(&self, value: &str) -> Result<(), ShellError> {
        (self.write)(value)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub(crate) fn matches(&self, name: &str, case_insensitive: bool) -> bool {
        self.names().any(|n| names_eq(n, name, case_insensitive))
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visible", &self.visible)
            .finish()
    }
}

/// A formal parameter of a command.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    name: String,
    aliases: Vec<String>,
    description: String,
    required: bool,
    default: Option<String>,
    visible: bool,
    kind: ValueKind,
    capture_all: bool,
}

impl ArgSpec {
    /// A parameter with no default value; omitting it fails the invocation.
    pub fn required(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            required: true,
            default: None,
            visible: true,
            kind,
            capture_all: false,
        }
    }

    /// A parameter with a declared default.
    pub fn optional(name: impl Into<String>, kind: ValueKind, default: impl Into<String>) -> Self {
        Self {
            required: false,
            default: Some(default.into()),
            ..Self::required(name, kind)
        }
    }

    /// A parameter that may be omitted without a substitute value; reading
    /// it through [`Bound::get_opt`](crate::dispatch::Bound::get_opt) yields
    /// `None` when absent.
    pub fn nullable(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            required: false,
            default: None,
            ..Self::required(name, kind)
        }
    }

    /// A boolean switch; present means true.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::optional(name, ValueKind::Bool, "false")
    }

    /// A repeatable named value collected into a list, empty by default.
    pub fn list(name: impl Into<String>) -> Self {
        Self {
            required: false,
            default: None,
            ..Self::required(name, ValueKind::List)
        }
    }

    /// Receives the full raw token vector of the invocation. A command with
    /// such a parameter accepts named arguments no other parameter consumes.
    pub fn all_args(name: impl Into<String>) -> Self {
        Self {
            required: false,
            default: None,
            capture_all: true,
            ..Self::required(name, ValueKind::Tokens)
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.is_empty() {
            self.aliases.push(alias);
        }
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn captures_all(&self) -> bool {
        self.capture_all
    }

    pub(crate) fn lookup_names(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .collect()
    }
}

/// An executable action: display name, aliases, metadata, ordered formal
/// arguments and the body.
pub struct CommandSpec {
    name: String,
    aliases: Vec<String>,
    description: String,
    category: String,
    visible: bool,
    args: Vec<ArgSpec>,
    action: Action,
}

impl CommandSpec {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Context<'_>, &Bound) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            category: String::new(),
            visible: true,
            args: Vec::new(),
            action: Box::new(action),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.is_empty() {
            self.aliases.push(alias);
        }
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Append a formal argument; declaration order is binding order.
    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_name(&self) -> &str {
        &self.category
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub(crate) fn invoke(&self, ctx: &mut Context<'_>, bound: &Bound) -> anyhow::Result<()> {
        (self.action)(ctx, bound)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub(crate) fn matches(&self, name: &str, case_insensitive: bool) -> bool {
        self.names().any(|n| names_eq(n, name, case_insensitive))
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("args", &self.args.len())
            .field("visible", &self.visible)
            .finish()
    }
}

/// One registration unit: the options, commands and filters a handler
/// contributes to the interpreter.
#[derive(Default)]
pub struct Handler {
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) commands: Vec<CommandSpec>,
    pub(crate) filters: Vec<FilterFn>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    /// Register an around-invocation filter. Filters run in registration
    /// order and never appear in listings; to expose one as a command too,
    /// add a command whose action calls the same logic with
    /// [`Chain::terminal`].
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Context<'_>, Chain<'_>, Vec<String>) -> anyhow::Result<()> + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }
}

/// The merged command/option namespace of all registered handlers.
#[derive(Default)]
pub struct Registry {
    commands: Vec<CommandSpec>,
    options: Vec<OptionSpec>,
}

impl Registry {
    /// Merge one handler's registrations.
    ///
    /// A name collision inside the handler itself is rejected. Collisions
    /// with previously registered entities replace them, so later
    /// registrations win over earlier ones (and over the default
    /// built-ins, which register first).
    pub(crate) fn register(
        &mut self,
        options: Vec<OptionSpec>,
        commands: Vec<CommandSpec>,
        case_insensitive: bool,
    ) -> Result<(), ShellError> {
        check_unique(
            commands.iter().flat_map(|c| c.names()),
            case_insensitive,
        )?;
        check_unique(options.iter().flat_map(|o| o.names()), case_insensitive)?;

        for option in options {
            self.options
                .retain(|existing| !option.names().any(|n| existing.matches(n, case_insensitive)));
            let at = self
                .options
                .partition_point(|o| lower(o.name()) < lower(option.name()));
            self.options.insert(at, option);
        }
        for command in commands {
            self.commands
                .retain(|existing| !command.names().any(|n| existing.matches(n, case_insensitive)));
            let at = self
                .commands
                .partition_point(|c| lower(c.name()) < lower(command.name()));
            self.commands.insert(at, command);
        }
        Ok(())
    }

    /// All commands, sorted by display name.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// All options, sorted by display name.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn find_command(&self, name: &str, case_insensitive: bool) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|c| c.matches(name, case_insensitive))
    }

    pub fn find_option(&self, name: &str, case_insensitive: bool) -> Option<&OptionSpec> {
        self.options
            .iter()
            .find(|o| o.matches(name, case_insensitive))
    }
}

fn lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

fn check_unique<'a>(
    names: impl Iterator<Item = &'a str>,
    case_insensitive: bool,
) -> Result<(), ShellError> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.iter().any(|s| names_eq(s, name, case_insensitive)) {
            return Err(ShellError::DuplicateName(name.to_string()));
        }
        seen.push(name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn noop(name: &str) -> CommandSpec {
        CommandSpec::new(name, |_, _| Ok(()))
    }

    fn int_option(name: &str, initial: i32) -> OptionSpec {
        let cell = Rc::new(RefCell::new(initial));
        let get = {
            let cell = cell.clone();
            move || *cell.borrow()
        };
        let set = {
            let cell = cell.clone();
            move |v: i32| *cell.borrow_mut() = v
        };
        OptionSpec::new(name, get, set)
    }

    #[test]
    fn test_commands_kept_alpha_sorted() {
        let mut reg = Registry::default();
        reg.register(
            Vec::new(),
            vec![noop("ForXtoYbyZ"), noop("BlowUp"), noop("Hidden"), noop("Count")],
            true,
        )
        .unwrap();
        let names: Vec<&str> = reg.commands().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["BlowUp", "Count", "ForXtoYbyZ", "Hidden"]);
    }

    #[test]
    fn test_intra_handler_collision_rejected() {
        let mut reg = Registry::default();
        let err = reg
            .register(
                Vec::new(),
                vec![noop("Count"), noop("count")],
                true,
            )
            .unwrap_err();
        assert_eq!(err, ShellError::DuplicateName("count".to_string()));
    }

    #[test]
    fn test_alias_collision_within_handler_rejected() {
        let mut reg = Registry::default();
        let err = reg
            .register(
                Vec::new(),
                vec![noop("Count"), noop("Tally").alias("COUNT")],
                true,
            )
            .unwrap_err();
        assert_eq!(err, ShellError::DuplicateName("COUNT".to_string()));
    }

    #[test]
    fn test_later_registration_wins() {
        let mut reg = Registry::default();
        reg.register(Vec::new(), vec![noop("echo").describe("old")], true)
            .unwrap();
        reg.register(Vec::new(), vec![noop("Echo").describe("new")], true)
            .unwrap();
        assert_eq!(reg.commands().len(), 1);
        assert_eq!(reg.find_command("ECHO", true).unwrap().description(), "new");
    }

    #[test]
    fn test_find_by_alias_and_comparer() {
        let mut reg = Registry::default();
        reg.register(Vec::new(), vec![noop("exit").alias("quit")], true)
            .unwrap();
        assert!(reg.find_command("QUIT", true).is_some());
        assert!(reg.find_command("QUIT", false).is_none());
        assert!(reg.find_command("quit", false).is_some());
    }

    #[test]
    fn test_option_accessors_round_trip() {
        let opt = int_option("Other", 5);
        assert_eq!(opt.value(), "5");
        assert_eq!(opt.default_value(), "5");
        opt.set_value("42").unwrap();
        assert_eq!(opt.value(), "42");

        let err = opt.set_value("nope").unwrap_err();
        assert_eq!(
            err,
            ShellError::InvalidArgumentValue {
                argument: "Other".to_string(),
                value: "nope".to_string(),
            }
        );
        assert_eq!(opt.value(), "42");
    }

    #[test]
    fn test_empty_alias_ignored() {
        let cmd = noop("Count").alias("").alias("tally");
        assert_eq!(cmd.aliases(), ["tally"]);
    }

    #[test]
    fn test_required_derived_from_default() {
        assert!(ArgSpec::required("number", ValueKind::Int).is_required());
        assert!(!ArgSpec::optional("number", ValueKind::Int, "0").is_required());
        assert!(!ArgSpec::flag("backwards").is_required());
        assert!(!ArgSpec::list("t").is_required());
        assert!(ArgSpec::all_args("rest").captures_all());
    }
}
