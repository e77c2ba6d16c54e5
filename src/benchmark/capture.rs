//! Bounded capture of harness output streams
//!
//! User code may print without limit, while the harness writes its markers
//! last. Marker lines are therefore kept apart from other text: every marker
//! line survives (within its own budget), and the remaining text keeps its
//! first and last lines up to the output budget.

use std::collections::VecDeque;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::constants::{
    markers, MAX_CAPTURED_LINE_BYTES, MAX_CAPTURED_MARKER_BYTES, MAX_CAPTURED_OUTPUT_BYTES,
};

const MARKER_PREFIXES: &[&str] = &[
    markers::TIME,
    markers::SAMPLE,
    markers::MEMORY,
    markers::OUTPUT,
    markers::ERROR,
];

/// What was kept of one output stream
#[derive(Debug)]
pub(crate) struct CapturedOutput {
    head: Vec<u8>,
    head_limit: usize,
    head_closed: bool,
    tail: LineRing,
    markers: LineRing,
    omitted: u64,
}

impl CapturedOutput {
    pub(crate) fn new() -> Self {
        Self::with_limits(MAX_CAPTURED_OUTPUT_BYTES, MAX_CAPTURED_MARKER_BYTES)
    }

    fn with_limits(text_limit: usize, marker_limit: usize) -> Self {
        let head_limit = text_limit / 2;
        Self {
            head: Vec::new(),
            head_limit,
            head_closed: false,
            tail: LineRing::new(text_limit - head_limit),
            markers: LineRing::new(marker_limit),
            omitted: 0,
        }
    }

    /// Bytes of output that were not kept
    pub(crate) fn omitted(&self) -> u64 {
        self.omitted
    }

    fn push_line(&mut self, line: Vec<u8>) {
        if is_marker(&line) {
            self.omitted += self.markers.push(line);
        } else if !self.head_closed && self.head.len() + line.len() <= self.head_limit {
            self.head.extend_from_slice(&line);
        } else {
            self.head_closed = true;
            self.omitted += self.tail.push(line);
        }
    }

    /// Kept text followed by the kept marker lines, in arrival order
    pub(crate) fn into_string(self) -> String {
        let mut bytes = self.head;
        if self.omitted > 0 {
            bytes.extend_from_slice(format!("[{} bytes of output omitted]\n", self.omitted).as_bytes());
        }
        for line in self.tail.lines.into_iter().chain(self.markers.lines) {
            bytes.extend_from_slice(&line);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Lines with a byte budget; the oldest go first
#[derive(Debug)]
struct LineRing {
    lines: VecDeque<Vec<u8>>,
    bytes: usize,
    limit: usize,
}

impl LineRing {
    fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            bytes: 0,
            limit,
        }
    }

    /// Append a line and return how many bytes were evicted
    fn push(&mut self, line: Vec<u8>) -> u64 {
        self.bytes += line.len();
        self.lines.push_back(line);

        let mut evicted = 0;
        while self.bytes > self.limit {
            let Some(oldest) = self.lines.pop_front() else {
                break;
            };
            self.bytes -= oldest.len();
            evicted += oldest.len() as u64;
        }
        evicted
    }
}

fn is_marker(line: &[u8]) -> bool {
    let line = line.trim_ascii();
    line == markers::SUCCESS.as_bytes()
        || MARKER_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix.as_bytes()))
}

/// Read a stream to the end, keeping what fits the default budgets
pub(crate) async fn capture<R>(pipe: R) -> io::Result<CapturedOutput>
where
    R: AsyncRead + Unpin,
{
    capture_into(pipe, CapturedOutput::new()).await
}

async fn capture_into<R>(pipe: R, mut output: CapturedOutput) -> io::Result<CapturedOutput>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);

    loop {
        let mut line = Vec::new();
        let read = (&mut reader)
            .take(MAX_CAPTURED_LINE_BYTES as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            break;
        }

        if line.last() != Some(&b'\n') {
            // Overlong or unterminated line
            output.omitted += skip_line(&mut reader).await?;
            line.push(b'\n');
        }
        output.push_line(line);
    }

    Ok(output)
}

/// Discard input up to and including the next newline
async fn skip_line<R>(reader: &mut R) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let (consumed, done) = {
            let buffer = reader.fill_buf().await?;
            if buffer.is_empty() {
                return Ok(skipped);
            }
            match buffer.iter().position(|&b| b == b'\n') {
                Some(newline) => (newline + 1, true),
                None => (buffer.len(), false),
            }
        };

        reader.consume(consumed);
        skipped += consumed as u64;
        if done {
            return Ok(skipped);
        }
    }
}
