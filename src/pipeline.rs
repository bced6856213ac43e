//! Pipeline and redirection handling for interactive lines.
//!
//! A line splits at top level (outside quotes) on `|`, `<` and `>` into
//! stages plus redirection endpoints. The configured filter precedence
//! decides the grouping: when it begins with a redirection operator, `<` and
//! `>` are extracted from the whole line first (feeding the first stage and
//! capturing the last); otherwise each pipe segment owns its redirections.
//!
//! Stage output streams into the next stage's input through an in-memory
//! buffer; only the last unredirected stage writes to the caller's stdout.

use std::fs::File;
use std::io::{Read, Write};

use anyhow::Context as _;

use crate::dispatch;
use crate::error::ShellError;
use crate::interpreter::{ShellConfig, ShellState};
use crate::io::{MemReader, MemWriter, StdIo};
use crate::registry::{FilterFn, Registry};
use crate::tokens;

/// One pipeline segment: its tokens and optional file endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Stage {
    pub tokens: Vec<String>,
    pub stdin_file: Option<String>,
    pub stdout_file: Option<String>,
}

/// Split a line on top-level `|`, leaving quoted runs intact.
fn split_segments(line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '|' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Strip `< target` and `> target` from a segment, returning the remainder
/// and the endpoints. The target is the single token following the
/// operator; a later occurrence of the same operator wins.
fn extract_redirects(
    segment: &str,
) -> Result<(String, Option<String>, Option<String>), ShellError> {
    let chars: Vec<char> = segment.chars().collect();
    let mut rest = String::with_capacity(segment.len());
    let mut stdin_file = None;
    let mut stdout_file = None;
    let mut in_quotes = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            in_quotes = !in_quotes;
            rest.push(c);
            i += 1;
            continue;
        }
        if in_quotes || (c != '<' && c != '>') {
            rest.push(c);
            i += 1;
            continue;
        }
        i += 1;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let start = i;
        let mut target_quoted = false;
        while i < chars.len() {
            let d = chars[i];
            if d == '"' {
                target_quoted = !target_quoted;
            } else if !target_quoted && (d.is_whitespace() || d == '|' || d == '<' || d == '>') {
                break;
            }
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        let target = tokens::parse(&word)?.into_iter().next().ok_or_else(|| {
            ShellError::InvalidInput("missing redirection target".to_string())
        })?;
        if c == '<' {
            stdin_file = Some(target);
        } else {
            stdout_file = Some(target);
        }
    }
    Ok((rest, stdin_file, stdout_file))
}

/// Split one expanded input line into stages according to the precedence
/// string. Disabled operators are left in place as ordinary text.
pub(crate) fn split_line(
    line: &str,
    precedence: &str,
    pipes: bool,
    redirects: bool,
) -> Result<Vec<Stage>, ShellError> {
    let redirects_first = matches!(precedence.chars().next(), Some('<') | Some('>'));
    let split_pipes = |line: &str| {
        if pipes {
            split_segments(line)
        } else {
            vec![line.to_string()]
        }
    };
    let extract = |segment: &str| {
        if redirects {
            extract_redirects(segment)
        } else {
            Ok((segment.to_string(), None, None))
        }
    };
    let mut stages = Vec::new();

    if redirects_first {
        let (rest, stdin_file, stdout_file) = extract(line)?;
        for segment in split_pipes(&rest) {
            let tokens = tokens::parse(&segment)?;
            if !tokens.is_empty() {
                stages.push(Stage {
                    tokens,
                    stdin_file: None,
                    stdout_file: None,
                });
            }
        }
        if let Some(first) = stages.first_mut() {
            first.stdin_file = stdin_file;
        }
        if let Some(last) = stages.last_mut() {
            last.stdout_file = stdout_file;
        }
    } else {
        for segment in split_pipes(line) {
            let (rest, stdin_file, stdout_file) = extract(&segment)?;
            let tokens = tokens::parse(&rest)?;
            if tokens.is_empty() && stdin_file.is_none() && stdout_file.is_none() {
                continue;
            }
            stages.push(Stage {
                tokens,
                stdin_file,
                stdout_file,
            });
        }
    }
    tracing::trace!(stages = stages.len(), "split pipeline");
    Ok(stages)
}

/// Run the stages in order, streaming each stage's captured stdout into the
/// next stage's stdin. File endpoints replace the buffer at either end; the
/// caller's streams are the defaults at the boundaries.
pub(crate) fn run_stages(
    registry: &Registry,
    filters: &[FilterFn],
    config: &ShellConfig,
    state: &mut ShellState,
    io: &mut StdIo<'_>,
    stages: Vec<Stage>,
) -> anyhow::Result<()> {
    let count = stages.len();
    let mut prev: Option<Vec<u8>> = None;

    for (index, stage) in stages.into_iter().enumerate() {
        let last = index + 1 == count;

        let mut stage_in: Box<dyn Read + '_> = if let Some(path) = &stage.stdin_file {
            Box::new(File::open(path).with_context(|| format!("cannot open {path}"))?)
        } else if let Some(buf) = prev.take() {
            Box::new(MemReader::new(buf))
        } else if index == 0 {
            Box::new(&mut *io.stdin)
        } else {
            Box::new(MemReader::empty())
        };

        let mut file_out = match &stage.stdout_file {
            Some(path) => {
                Some(File::create(path).with_context(|| format!("cannot create {path}"))?)
            }
            None => None,
        };
        let mut capture = (file_out.is_none() && !last).then(MemWriter::new);
        let stage_out: &mut dyn Write = if let Some(f) = file_out.as_mut() {
            f
        } else if let Some(c) = capture.as_mut() {
            c
        } else {
            &mut *io.stdout
        };

        let stage_io = StdIo::new(&mut *stage_in, stage_out, &mut *io.stderr);
        dispatch::dispatch(registry, filters, config, state, stage_io, stage.tokens);

        prev = capture.map(MemWriter::into_bytes);
    }
    Ok(())
}
