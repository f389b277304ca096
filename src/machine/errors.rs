//! Runtime error types for the reversible machine
//!
//! This module defines [`RuntimeError`], which represents all errors that
//! can occur while stepping (as opposed to tokenization errors).
//!
//! All runtime errors are fatal — the run stops and the machine performs
//! no retry. The "no input available yet" outcome is *not* an error; it
//! is reported through
//! [`StepOutcome::NeedsInput`](super::StepOutcome::NeedsInput) so hosts
//! can poll without treating suspension as failure.

use crate::program::SourcePos;
use std::fmt;

/// Runtime errors that can occur during a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The program counter left `[0, len)` — stepping forward off the end
    /// of the program or backward past its beginning.
    ProgramCounterOutOfBounds { pc: i64 },

    /// A cell would leave `[0, cell_width)` with wrapping disallowed.
    /// Also raised by the `[+]` idiom on a nonzero cell, which could only
    /// terminate by wrapping.
    CellOverflow {
        value: i64,
        location: Option<SourcePos>,
    },

    /// The pointer went negative with negative addressing disallowed.
    PointerOutOfBounds {
        pointer: i64,
        reverse: bool,
        location: Option<SourcePos>,
    },

    /// A replay log was popped while empty: a reverse step was attempted
    /// beyond the earliest recorded state.
    HistoryUnderflow { location: Option<SourcePos> },

    /// A loop bracket's partner index does not point into the program.
    /// Reachable by executing the jump of a `[` that was never closed.
    MalformedInstruction { location: Option<SourcePos> },
}

impl RuntimeError {
    /// Source position of the failing instruction, when it has one.
    pub fn location(&self) -> Option<&SourcePos> {
        match self {
            RuntimeError::ProgramCounterOutOfBounds { .. } => None,
            RuntimeError::CellOverflow { location, .. }
            | RuntimeError::PointerOutOfBounds { location, .. }
            | RuntimeError::HistoryUnderflow { location }
            | RuntimeError::MalformedInstruction { location } => location.as_ref(),
        }
    }
}

fn write_location(f: &mut fmt::Formatter<'_>, location: &Option<SourcePos>) -> fmt::Result {
    match location {
        Some(pos) => write!(f, " at line {} column {}", pos.line, pos.column),
        None => Ok(()),
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::ProgramCounterOutOfBounds { pc } => {
                write!(f, "Program counter out of bounds (pc = {})", pc)
            }
            RuntimeError::CellOverflow { value, location } => {
                write!(f, "Cell value out of bounds (value = {})", value)?;
                write_location(f, location)
            }
            RuntimeError::PointerOutOfBounds {
                pointer,
                reverse,
                location,
            } => {
                write!(
                    f,
                    "Pointer out of bounds (pointer = {}, direction = {})",
                    pointer,
                    if *reverse { "reverse" } else { "forward" }
                )?;
                write_location(f, location)
            }
            RuntimeError::HistoryUnderflow { location } => {
                write!(f, "History underflow: reversed past the earliest recorded state")?;
                write_location(f, location)
            }
            RuntimeError::MalformedInstruction { location } => {
                write!(f, "Loop bracket has no partner inside the program")?;
                write_location(f, location)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
