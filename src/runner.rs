//! Naive forward-only interpreter
//!
//! The lightweight sibling of the reversible [`Machine`]: it runs a
//! tokenized [`Program`] front to back with no history, no configuration,
//! and no bounds policing — cells always wrap modulo 256 and the pointer
//! may go negative. Network front-ends that only ever run forward use
//! this instead of paying for the undo ledger.
//!
//! Input is a byte queue fed by [`Runner::absorb`]; output accumulates in
//! an internal buffer drained with [`Runner::take_output`]. [`Runner::run`]
//! is cooperative: it executes until the program finishes or the input
//! queue starves, and a starved run resumes at the same instruction once
//! more input has been absorbed.
//!
//! [`Machine`]: crate::machine::Machine

use crate::machine::config::DEFAULT_CELL_WIDTH;
use crate::machine::tape::Tape;
use crate::program::{tokenize, Op, Program, SyntaxError};
use std::collections::VecDeque;

/// Why [`Runner::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The program ran to completion.
    Finished,
    /// The input queue is empty at a `,`; absorb more input and call
    /// [`Runner::run`] again.
    NeedsInput,
}

/// Forward-only program runner.
#[derive(Debug)]
pub struct Runner {
    program: Program,
    tape: Tape,
    pointer: i64,
    pc: usize,
    input: VecDeque<i64>,
    output: String,
}

impl Runner {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            tape: Tape::new(),
            pointer: 0,
            pc: 0,
            input: VecDeque::new(),
            output: String::new(),
        }
    }

    /// Tokenize `source` with optimizations enabled and build a runner
    /// for it.
    pub fn from_source(source: &str) -> Result<Self, SyntaxError> {
        Ok(Self::new(tokenize(source, true)?))
    }

    /// Queue `text` as input, one character code per character.
    /// Carriage returns are dropped so CRLF hosts feed clean lines.
    pub fn absorb(&mut self, text: &str) {
        for character in text.chars() {
            if character == '\r' {
                continue;
            }
            self.input.push_back(character as i64);
        }
    }

    /// Execute until the program ends or the input queue starves.
    pub fn run(&mut self) -> RunStatus {
        while self.pc < self.program.len() {
            let instruction = self.program.instructions()[self.pc];

            match instruction.op {
                Op::Add(delta) => {
                    let value = (self.tape.get(self.pointer) + delta)
                        .rem_euclid(DEFAULT_CELL_WIDTH);
                    self.tape.set(self.pointer, value);
                }
                Op::Shift(delta) => self.pointer += delta,
                Op::Zero { .. } => self.tape.set(self.pointer, 0),
                Op::Output => {
                    let value = self.tape.get(self.pointer);
                    self.output.push(
                        char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
                    );
                }
                Op::Input => match self.input.pop_front() {
                    Some(value) => self.tape.set(self.pointer, value),
                    // Resume at this same instruction on the next run()
                    None => return RunStatus::NeedsInput,
                },
                Op::LoopOpen { partner } => {
                    if self.tape.get(self.pointer) == 0 {
                        // An unmatched '[' has no partner; fall off the end
                        self.pc = partner.min(self.program.len());
                    }
                }
                Op::LoopClose { partner } => {
                    if self.tape.get(self.pointer) != 0 {
                        self.pc = partner;
                    }
                }
                Op::Start | Op::End => {}
            }

            self.pc += 1;
        }

        RunStatus::Finished
    }

    /// Take everything written since the last drain.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn finished(&self) -> bool {
        self.pc >= self.program.len()
    }
}
