//! Shared fixtures: a demo handler with two options and four commands, plus
//! capture helpers running the shell over in-memory streams.

use std::cell::RefCell;
use std::rc::Rc;

use command_shell::{
    ArgSpec, CommandSpec, Handler, LineReader, MemReader, MemWriter, OptionSpec, ScriptReader,
    Shell, ShellError, StdIo, ValueKind,
};

#[derive(Default)]
pub struct DemoState {
    pub other: i32,
    pub some_data: String,
}

/// Handler exposing options `Other` and `SomeData` and commands `BlowUp`,
/// `Count`, `ForXtoYbyZ` and `Hidden`.
pub fn demo_handler(state: Rc<RefCell<DemoState>>) -> Handler {
    let other_get = {
        let state = state.clone();
        move || state.borrow().other
    };
    let other_set = {
        let state = state.clone();
        move |v: i32| state.borrow_mut().other = v
    };
    let data_get = {
        let state = state.clone();
        move || state.borrow().some_data.clone()
    };
    let data_set = {
        let state = state.clone();
        move |v: String| state.borrow_mut().some_data = v
    };

    Handler::new()
        .option(OptionSpec::new("Other", other_get, other_set).describe("A sample number."))
        .option(OptionSpec::new("SomeData", data_get, data_set).describe("A sample text."))
        .command(
            CommandSpec::new("BlowUp", |_, _| {
                Err(ShellError::Application("killed by request.".to_string()).into())
            })
            .describe("Fail on purpose."),
        )
        .command(
            CommandSpec::new("Count", |ctx, args| {
                let number: i64 = args.get("number")?;
                let backwards = args.flag("backwards")?;
                let tags = args.list("t")?.to_vec();
                let mut values: Vec<i64> = (1..=number).collect();
                if backwards {
                    values.reverse();
                }
                for (index, value) in values.iter().enumerate() {
                    match tags.get(index) {
                        Some(tag) => writeln!(ctx.io.stdout, "{value} {tag}")?,
                        None => writeln!(ctx.io.stdout, "{value}")?,
                    }
                }
                Ok(())
            })
            .describe("Count from 1 to a number.")
            .arg(ArgSpec::required("number", ValueKind::Int).describe("upper bound"))
            .arg(ArgSpec::flag("backwards").describe("count down instead"))
            .arg(ArgSpec::list("t").describe("tag appended to each line")),
        )
        .command(
            CommandSpec::new("ForXtoYbyZ", |ctx, args| {
                let x: i64 = args.get("x")?;
                let y: i64 = args.get("y")?;
                let z: i64 = args.get("z")?;
                let mut value = x;
                while value <= y {
                    writeln!(ctx.io.stdout, "{value}")?;
                    value += z;
                }
                Ok(())
            })
            .describe("Count from x to y in steps of z.")
            .arg(ArgSpec::required("x", ValueKind::Int))
            .arg(ArgSpec::required("y", ValueKind::Int))
            .arg(ArgSpec::optional("z", ValueKind::Int, "1")),
        )
        .command(
            CommandSpec::new("Hidden", |ctx, _| {
                writeln!(ctx.io.stdout, "you found me")?;
                Ok(())
            })
            .describe("Invisible in listings.")
            .hidden(),
        )
}

/// A shell with the demo handler registered on top of the default built-ins.
pub fn demo_shell() -> (Shell, Rc<RefCell<DemoState>>) {
    let state = Rc::new(RefCell::new(DemoState::default()));
    let mut shell = Shell::new();
    shell.add_handler(demo_handler(state.clone())).unwrap();
    (shell, state)
}

/// Dispatch one token vector over empty stdin, capturing both output streams.
pub fn run_tokens(shell: &mut Shell, tokens: &[&str]) -> (i32, String, String) {
    let mut input = MemReader::empty();
    let mut out = MemWriter::new();
    let mut err = MemWriter::new();
    let code = {
        let mut io = StdIo::new(&mut input, &mut out, &mut err);
        shell.run_with_io(tokens, &mut io)
    };
    (code, into_string(out), into_string(err))
}

/// Process one interactive line (macros, pipelines, redirections).
pub fn run_line(shell: &mut Shell, line: &str) -> (i32, String, String) {
    let mut input = MemReader::empty();
    let mut out = MemWriter::new();
    let mut err = MemWriter::new();
    let code = {
        let mut io = StdIo::new(&mut input, &mut out, &mut err);
        shell.execute_line(line, &mut io)
    };
    (code, into_string(out), into_string(err))
}

/// Run a whole scripted interactive session.
pub fn run_script(shell: &mut Shell, lines: &[&str]) -> (String, String) {
    let mut reader = ScriptReader::new(lines.iter().copied());
    run_session(shell, &mut reader)
}

pub fn run_session(shell: &mut Shell, reader: &mut dyn LineReader) -> (String, String) {
    let mut input = MemReader::empty();
    let mut out = MemWriter::new();
    let mut err = MemWriter::new();
    {
        let mut io = StdIo::new(&mut input, &mut out, &mut err);
        shell.run_interactive_with_io(reader, &mut io).unwrap();
    }
    (into_string(out), into_string(err))
}

fn into_string(writer: MemWriter) -> String {
    String::from_utf8(writer.into_bytes()).unwrap()
}

/// An isolated scratch directory for redirection tests.
pub fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "command_shell_{tag}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
