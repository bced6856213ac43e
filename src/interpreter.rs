//! The interpreter facade and its interactive loop.

use std::collections::VecDeque;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::builtin::{builtin_handler, Builtins};
use crate::dispatch;
use crate::error::ShellError;
use crate::expand;
use crate::help;
use crate::io::StdIo;
use crate::pipeline;
use crate::registry::{CommandSpec, FilterFn, Handler, OptionSpec, Registry};
use crate::tokens::{self, TokenizerConfig};

/// Interpreter configuration knobs.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Prefix and delimiter conventions for named arguments.
    pub tokenizer: TokenizerConfig,
    /// Whether name lookups (commands, options, arguments, macros) fold
    /// letter case.
    pub case_insensitive: bool,
    /// Operator precedence for interactive lines. When the string begins
    /// with `<` or `>`, redirections are extracted before pipe splitting and
    /// bind to the pipeline as a whole; otherwise each stage owns its own.
    pub filter_precedence: String,
    /// Window height used by the pagination built-in.
    pub page_height: usize,
    /// Initial interactive prompt; macro-expanded before each read.
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            case_insensitive: true,
            filter_precedence: "<>|".to_string(),
            page_height: 24,
            prompt: "> ".to_string(),
        }
    }
}

pub(crate) struct ShellState {
    pub exit_code: i32,
    pub should_exit: bool,
    pub prompt: String,
    pub next_char: Option<Box<dyn FnMut() -> Option<char>>>,
}

/// A source of interactive input lines.
pub trait LineReader {
    /// Read one logical line, or `None` when the source is exhausted or the
    /// user interrupted it.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Console-backed reader with line editing and history.
pub struct ConsoleReader {
    editor: DefaultEditor,
}

impl ConsoleReader {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineReader for ConsoleReader {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reader over a fixed sequence of lines, for scripted sessions and tests.
pub struct ScriptReader {
    lines: VecDeque<String>,
}

impl ScriptReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// One reader line per text line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string))
    }
}

impl LineReader for ScriptReader {
    fn read_line(&mut self, _prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// The interpreter: a registry of handlers plus the configuration and state
/// needed to dispatch argument vectors and run the interactive loop.
///
/// Single-threaded by design; each dispatch executes synchronously on the
/// calling thread. Hosts that want parallel invocation construct independent
/// shells.
pub struct Shell {
    registry: Registry,
    filters: Vec<FilterFn>,
    config: ShellConfig,
    state: ShellState,
    pipes: bool,
    redirects: bool,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// A shell with the default configuration and all built-ins installed.
    pub fn new() -> Self {
        Self::with_config(ShellConfig::default(), Builtins::default())
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self::with_config(ShellConfig::default(), builtins)
    }

    pub fn with_config(config: ShellConfig, builtins: Builtins) -> Self {
        let state = ShellState {
            exit_code: 0,
            should_exit: false,
            prompt: config.prompt.clone(),
            next_char: None,
        };
        let mut shell = Self {
            registry: Registry::default(),
            filters: Vec::new(),
            config,
            state,
            pipes: builtins.pipe,
            redirects: builtins.redirect,
        };
        shell
            .add_handler(builtin_handler(&builtins))
            .expect("built-in names are unique");
        shell
    }

    /// Merge a handler's options, commands and filters into the shell.
    ///
    /// Later registrations win over earlier ones with the same name, so user
    /// handlers replace same-named built-ins. A collision inside the handler
    /// itself is an error.
    pub fn add_handler(&mut self, handler: Handler) -> Result<(), ShellError> {
        let Handler {
            options,
            commands,
            filters,
        } = handler;
        self.registry
            .register(options, commands, self.config.case_insensitive)?;
        self.filters.extend(filters);
        Ok(())
    }

    /// All registered commands, sorted by display name.
    pub fn commands(&self) -> &[CommandSpec] {
        self.registry.commands()
    }

    /// All registered options, sorted by display name.
    pub fn options(&self) -> &[OptionSpec] {
        self.registry.options()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ShellConfig {
        &mut self.config
    }

    /// Exit code of the last dispatch: zero on success, non-zero on any
    /// failure. Hosts propagate it to the process exit code as they see fit.
    pub fn exit_code(&self) -> i32 {
        self.state.exit_code
    }

    pub fn set_exit_code(&mut self, code: i32) {
        self.state.exit_code = code;
    }

    /// Install the next-character reader consumed by the pagination
    /// built-in. Without one, pagination fails rather than blocking.
    pub fn set_next_char_reader<F>(&mut self, reader: F)
    where
        F: FnMut() -> Option<char> + 'static,
    {
        self.state.next_char = Some(Box::new(reader));
    }

    /// Dispatch one argument vector against the process standard streams and
    /// return the exit code.
    pub fn run<S: AsRef<str>>(&mut self, tokens: &[S]) -> i32 {
        let stdin = std::io::stdin();
        let mut stdin = stdin.lock();
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        let mut io = StdIo::new(&mut stdin, &mut stdout, &mut stderr);
        self.run_with_io(tokens, &mut io)
    }

    /// Dispatch one argument vector against the given streams.
    pub fn run_with_io<S: AsRef<str>>(&mut self, tokens: &[S], io: &mut StdIo<'_>) -> i32 {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        dispatch::dispatch(
            &self.registry,
            &self.filters,
            &self.config,
            &mut self.state,
            io.reborrow(),
            tokens,
        );
        self.state.exit_code
    }

    /// Process one interactive line: expand macros, split the pipeline and
    /// redirections, dispatch each stage. Returns the exit code.
    pub fn execute_line(&mut self, line: &str, io: &mut StdIo<'_>) -> i32 {
        tracing::debug!(%line, "execute line");
        let expanded = match expand::expand(line, &self.registry, self.config.case_insensitive) {
            Ok(expanded) => expanded,
            Err(err) => {
                let _ = writeln!(io.stderr, "{err}");
                self.state.exit_code = 1;
                return self.state.exit_code;
            }
        };
        let stages = match pipeline::split_line(
            &expanded,
            &self.config.filter_precedence,
            self.pipes,
            self.redirects,
        ) {
            Ok(stages) => stages,
            Err(err) => {
                let _ = writeln!(io.stderr, "{err}");
                self.state.exit_code = 1;
                return self.state.exit_code;
            }
        };
        if let Err(err) = pipeline::run_stages(
            &self.registry,
            &self.filters,
            &self.config,
            &mut self.state,
            io,
            stages,
        ) {
            let _ = writeln!(io.stderr, "{err:#}");
            self.state.exit_code = 1;
        }
        self.state.exit_code
    }

    /// Run the interactive loop against the process standard streams.
    pub fn run_interactive(&mut self, reader: &mut dyn LineReader) -> anyhow::Result<()> {
        let stdin = std::io::stdin();
        let mut stdin = stdin.lock();
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        let mut io = StdIo::new(&mut stdin, &mut stdout, &mut stderr);
        self.run_interactive_with_io(reader, &mut io)
    }

    /// Run the interactive loop against the given streams.
    ///
    /// Each iteration expands the prompt, reads one line, and processes it.
    /// An empty line prints the help summary; `exit` and `quit` leave the
    /// loop even when the corresponding built-in is suppressed; a reader
    /// error is written to stderr and ends the loop.
    pub fn run_interactive_with_io(
        &mut self,
        reader: &mut dyn LineReader,
        io: &mut StdIo<'_>,
    ) -> anyhow::Result<()> {
        self.state.should_exit = false;
        loop {
            let prompt =
                expand::expand(&self.state.prompt, &self.registry, self.config.case_insensitive)
                    .unwrap_or_else(|_| self.state.prompt.clone());
            let line = match reader.read_line(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    let _ = writeln!(io.stderr, "{err:#}");
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                write!(io.stdout, "{}", help::summary(&self.registry))?;
                continue;
            }
            if self.is_bare_exit(trimmed) {
                break;
            }
            self.execute_line(&line, io);
            if self.state.should_exit {
                break;
            }
        }
        Ok(())
    }

    /// `exit`/`quit` end the loop even without the built-in; a registered
    /// command with that name is dispatched normally instead.
    fn is_bare_exit(&self, trimmed: &str) -> bool {
        let Ok(parsed) = tokens::parse(trimmed) else {
            return false;
        };
        let Some(first) = parsed.first() else {
            return false;
        };
        let ci = self.config.case_insensitive;
        let is_exit_name =
            crate::args::names_eq(first, "exit", ci) || crate::args::names_eq(first, "quit", ci);
        is_exit_name && self.registry.find_command(first, ci).is_none()
    }
}
