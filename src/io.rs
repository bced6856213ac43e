//! Standard-stream plumbing for dispatch and pipelines.
//!
//! Every dispatch receives an explicit [`StdIo`] record instead of touching
//! the process streams directly; the process streams are merely the defaults
//! a host passes in. Pipeline stages swap in memory-backed endpoints, so
//! stream replacement is scoped to the stage and unwinds with it.

use std::io::{Cursor, Read, Result as IoResult, Write};

/// The three standard streams of one dispatch, borrowed from the caller.
pub struct StdIo<'a> {
    pub stdin: &'a mut (dyn Read + 'a),
    pub stdout: &'a mut (dyn Write + 'a),
    pub stderr: &'a mut (dyn Write + 'a),
}

impl<'a> StdIo<'a> {
    pub fn new(
        stdin: &'a mut (dyn Read + 'a),
        stdout: &'a mut (dyn Write + 'a),
        stderr: &'a mut (dyn Write + 'a),
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }

    /// Reborrow for a nested dispatch, leaving this record usable afterwards.
    pub fn reborrow(&mut self) -> StdIo<'_> {
        StdIo {
            stdin: &mut *self.stdin,
            stdout: &mut *self.stdout,
            stderr: &mut *self.stderr,
        }
    }
}

/// Memory-backed reader used as a pipeline stage's standard input.
pub struct MemReader {
    cursor: Cursor<Vec<u8>>,
}

impl MemReader {
    pub fn new(buf: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Read for MemReader {
    fn read(&mut self, out: &mut [u8]) -> IoResult<usize> {
        self.cursor.read(out)
    }
}

/// Memory-backed writer capturing a pipeline stage's standard output.
#[derive(Default)]
pub struct MemWriter {
    buf: Vec<u8>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_writer_captures_bytes() {
        let mut w = MemWriter::new();
        write!(w, "hello ").unwrap();
        write!(w, "world").unwrap();
        assert_eq!(w.as_bytes(), b"hello world");
        assert_eq!(w.into_bytes(), b"hello world");
    }

    #[test]
    fn test_mem_reader_round_trip() {
        let mut r = MemReader::new(b"payload".to_vec());
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();
        assert_eq!(s, "payload");
    }

    #[test]
    fn test_stdio_reborrow_allows_reuse() {
        let mut input = MemReader::new(b"in".to_vec());
        let mut out = MemWriter::new();
        let mut err = MemWriter::new();
        let mut io = StdIo::new(&mut input, &mut out, &mut err);

        {
            let nested = io.reborrow();
            write!(nested.stdout, "first").unwrap();
        }
        write!(io.stdout, " second").unwrap();
        assert_eq!(out.as_bytes(), b"first second");
    }
}
