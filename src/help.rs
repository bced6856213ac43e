//! Help rendering: a plain-text summary, per-name detail, and a content-only
//! HTML document.

use std::fmt::Write as _;

use crate::error::ShellError;
use crate::registry::{ArgSpec, CommandSpec, OptionSpec, Registry};

/// One-screen listing of the visible commands and options.
pub fn summary(registry: &Registry) -> String {
    let mut out = String::new();
    let commands: Vec<&CommandSpec> = registry.commands().iter().filter(|c| c.visible()).collect();
    let options: Vec<&OptionSpec> = registry.options().iter().filter(|o| o.visible()).collect();

    if !commands.is_empty() {
        out.push_str("Commands:\n");
        let width = commands.iter().map(|c| c.name().len()).max().unwrap_or(0);
        for command in commands {
            let _ = writeln!(
                out,
                "  {:width$}  {}",
                command.name(),
                command.description(),
                width = width
            );
        }
    }
    if !options.is_empty() {
        out.push_str("Options:\n");
        let width = options.iter().map(|o| o.name().len()).max().unwrap_or(0);
        for option in options {
            let _ = writeln!(
                out,
                "  {:width$} = {}  {}",
                option.name(),
                option.value(),
                option.description(),
                width = width
            );
        }
    }
    out
}

/// Detailed help for one command or option, resolved by name or alias.
///
/// Hidden entities resolve here too; visibility only affects listings.
pub fn detail(registry: &Registry, name: &str, case_insensitive: bool) -> Result<String, ShellError> {
    if let Some(command) = registry.find_command(name, case_insensitive) {
        return Ok(command_detail(command));
    }
    if let Some(option) = registry.find_option(name, case_insensitive) {
        return Ok(option_detail(option));
    }
    Err(ShellError::UnknownCommand(name.to_string()))
}

fn usage_token(arg: &ArgSpec) -> String {
    if arg.captures_all() {
        format!("[{}...]", arg.name())
    } else if arg.is_required() {
        format!("<{}>", arg.name())
    } else {
        format!("[{}]", arg.name())
    }
}

fn command_detail(command: &CommandSpec) -> String {
    let mut out = String::new();
    let usage: Vec<String> = command.args().iter().map(usage_token).collect();
    let _ = writeln!(out, "{} {}", command.name(), usage.join(" "));
    if !command.description().is_empty() {
        let _ = writeln!(out, "  {}", command.description());
    }
    if !command.aliases().is_empty() {
        let _ = writeln!(out, "  Aliases: {}", command.aliases().join(", "));
    }
    if !command.category_name().is_empty() {
        let _ = writeln!(out, "  Category: {}", command.category_name());
    }
    let visible: Vec<&ArgSpec> = command.args().iter().filter(|a| a.visible()).collect();
    if !visible.is_empty() {
        out.push_str("Arguments:\n");
        let width = visible.iter().map(|a| a.name().len()).max().unwrap_or(0);
        for arg in visible {
            let requirement = if arg.is_required() {
                "required".to_string()
            } else {
                match arg.default_value() {
                    Some(d) if !d.is_empty() => format!("default {d}"),
                    _ => "optional".to_string(),
                }
            };
            let _ = writeln!(
                out,
                "  {:width$}  {} ({}, {})",
                arg.name(),
                arg.description(),
                arg.kind(),
                requirement,
                width = width
            );
        }
    }
    out
}

fn option_detail(option: &OptionSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", option.name(), option.kind());
    if !option.description().is_empty() {
        let _ = writeln!(out, "  {}", option.description());
    }
    if !option.aliases().is_empty() {
        let _ = writeln!(out, "  Aliases: {}", option.aliases().join(", "));
    }
    if !option.category_name().is_empty() {
        let _ = writeln!(out, "  Category: {}", option.category_name());
    }
    let _ = writeln!(out, "  Current: {}", option.value());
    let _ = writeln!(out, "  Default: {}", option.default_value());
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Content-only HTML rendering of the visible surface: one section per
/// command, names upper-cased, no styling.
pub fn html(registry: &Registry) -> String {
    let mut out = String::new();
    out.push_str("<html>\n<body>\n");
    out.push_str("<h1>COMMANDS</h1>\n");
    for command in registry.commands().iter().filter(|c| c.visible()) {
        let _ = writeln!(out, "<div>\n<h2>{}</h2>", escape(&command.name().to_uppercase()));
        if !command.description().is_empty() {
            let _ = writeln!(out, "<p>{}</p>", escape(command.description()));
        }
        let visible: Vec<&ArgSpec> = command.args().iter().filter(|a| a.visible()).collect();
        if !visible.is_empty() {
            out.push_str("<ul>\n");
            for arg in visible {
                let _ = writeln!(
                    out,
                    "<li>{} ({}) {}</li>",
                    escape(&arg.name().to_uppercase()),
                    arg.kind(),
                    escape(arg.description())
                );
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</div>\n");
    }
    out.push_str("<h1>OPTIONS</h1>\n");
    for option in registry.options().iter().filter(|o| o.visible()) {
        let _ = writeln!(
            out,
            "<div>\n<h2>{}</h2>\n<p>{}</p>\n</div>",
            escape(&option.name().to_uppercase()),
            escape(option.description())
        );
    }
    out.push_str("</body>\n</html>\n");
    out
}
