//! Confirmation gate for irreversible operations.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::debug;

/// Blocking yes/no question asked before a mutating request is sent.
pub trait Confirm {
    /// Returns true only when the operator explicitly answers yes.
    fn confirm(&mut self, message: &str) -> bool;
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }
}

/// Interactive prompt reading single-character answers from a line-based input.
///
/// Whitespace is skipped, every other character is one answer. The prompt repeats
/// until the answer is exactly `y` or `n`; a closed or failing input means no.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    pending: VecDeque<char>,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: VecDeque::new(),
        }
    }

    /// Consume the prompt and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    fn next_answer(&mut self) -> Option<char> {
        loop {
            while let Some(c) = self.pending.pop_front() {
                if !c.is_whitespace() {
                    return Some(c);
                }
            }

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => self.pending.extend(line.chars()),
                Err(e) => {
                    debug!("Failed to read confirmation answer: {}", e);
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalPrompt<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        loop {
            let _ = write!(self.output, "{} [y/n]: ", message);
            let _ = self.output.flush();

            match self.next_answer() {
                Some('y') => return true,
                Some('n') | None => return false,
                Some(_) => continue,
            }
        }
    }
}

/// Gate that approves everything without asking (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, message: &str) -> bool {
        debug!("Auto-confirmed: {}", message.trim_end());
        true
    }
}
