//! An embeddable interactive command interpreter.
//!
//! Handlers register commands, options and filters through a builder DSL;
//! the resulting [`Shell`] dispatches one-shot argument vectors or runs an
//! interactive loop with prompts, macro expansion, pipelines, I/O
//! redirection and pagination.
//!
//! Example
//! ```
//! use std::io::Write;
//!
//! use command_shell::{ArgSpec, CommandSpec, Handler, Shell, ValueKind};
//!
//! let mut shell = Shell::new();
//! shell
//!     .add_handler(Handler::new().command(
//!         CommandSpec::new("greet", |ctx, args| {
//!             let name: String = args.get("name")?;
//!             writeln!(ctx.io.stdout, "hello {name}")?;
//!             Ok(())
//!         })
//!         .describe("Say hello.")
//!         .arg(ArgSpec::required("name", ValueKind::Str)),
//!     ))
//!     .unwrap();
//! let code = shell.run(&["greet", "world"]);
//! assert_eq!(code, 0);
//! ```
//!
//! Options live on the handler's own state behind typed accessors and are
//! readable and writable by name through the `get`/`set` built-ins, by
//! `$(Name)` macros in interactive lines, and by `/Name=value` tokens
//! preceding a command.

pub mod args;
mod builtin;
pub mod coerce;
pub mod dispatch;
pub mod error;
mod expand;
mod help;
pub mod io;
mod pipeline;
pub mod registry;
pub mod tokens;

mod interpreter;

pub use builtin::Builtins;
pub use coerce::{ArgParse, ValueKind};
pub use dispatch::{Bound, Chain, Context};
pub use error::ShellError;
pub use interpreter::{ConsoleReader, LineReader, ScriptReader, Shell, ShellConfig};
pub use io::{MemReader, MemWriter, StdIo};
pub use registry::{ArgSpec, CommandSpec, Handler, OptionSpec, Registry};
pub use tokens::TokenizerConfig;
