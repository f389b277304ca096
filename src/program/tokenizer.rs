//! Tokenizer for the tape-machine language
//!
//! Converts raw source text into an immutable [`Program`]. Only the eight
//! command characters (`+ - < > [ ] . ,`) are significant; every other
//! byte is ignored, except newlines, which advance the line counter used
//! for diagnostics.
//!
//! With `optimize` enabled, two peephole rewrites are applied while
//! scanning: the `[-]`/`[+]` cell-clearing idiom is folded into a single
//! [`Op::Zero`], and runs of `+`/`-` or `<`/`>` are merged into one
//! [`Op::Add`]/[`Op::Shift`] carrying the accumulated delta.
//!
//! An unmatched `]` aborts tokenization with a [`SyntaxError`]. An
//! unmatched `[` is *not* detected here: the open-bracket stack is not
//! checked at end of scan, so a source with more `[` than `]` tokenizes
//! successfully. Callers should not assume full bracket validation beyond
//! the closing side; executing the dangling open's jump fails at run time
//! instead.

use super::instruction::{Instruction, Op, Program, SourcePos};
use std::fmt;

/// Tokenization error: an unmatched `]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub location: SourcePos,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Partner index of a `[` whose `]` has not been seen (yet).
///
/// Stays in place for an unmatched open, where it is out of range by
/// construction; the machine reports such a jump as a malformed
/// instruction rather than indexing past the program.
const UNLINKED: usize = usize::MAX;

/// Tokenize source text into a [`Program`].
///
/// The synthetic [`Op::Start`] occupies index 0 from the beginning of the
/// scan, so partner indices are final as emitted and already account for
/// the leading instruction.
pub fn tokenize(source: &str, optimize: bool) -> Result<Program, SyntaxError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();

    let mut instructions = vec![Instruction::synthetic(Op::Start)];
    let mut open_stack: Vec<usize> = Vec::new();
    let mut line = 1usize;
    let mut column = 1usize;

    let mut i = 0;
    while i < chars.len() {
        let (offset, character) = chars[i];

        if "+-<>[].,".contains(character) {
            let pos = SourcePos::new(offset, line, column);

            let op = match character {
                '[' => {
                    // Fold [-] and [+] into one instruction
                    if optimize
                        && matches!(chars.get(i + 1), Some((_, '-')) | Some((_, '+')))
                        && matches!(chars.get(i + 2), Some((_, ']')))
                    {
                        let upward = chars[i + 1].1 == '+';
                        i += 2;
                        column += 2;
                        Op::Zero { upward }
                    } else {
                        open_stack.push(instructions.len());
                        Op::LoopOpen { partner: UNLINKED }
                    }
                }
                ']' => {
                    // [ and ] need to be mated
                    let open = open_stack.pop().ok_or_else(|| SyntaxError {
                        message: "unmatched ']'".to_string(),
                        location: pos,
                    })?;
                    let close = instructions.len();
                    match &mut instructions[open].op {
                        Op::LoopOpen { partner } => *partner = close,
                        _ => unreachable!("open stack only holds loop-open indices"),
                    }
                    Op::LoopClose { partner: open }
                }
                '+' => Op::Add(1),
                '-' => Op::Add(-1),
                '>' => Op::Shift(1),
                '<' => Op::Shift(-1),
                '.' => Op::Output,
                ',' => Op::Input,
                _ => unreachable!(),
            };

            // Condense series of ++++ ---- <<<< or >>>>. The merged
            // instruction keeps the position of the first command in the run.
            let merged = optimize
                && match (op, instructions.last_mut()) {
                    (Op::Add(delta), Some(Instruction { op: Op::Add(acc), .. })) => {
                        *acc += delta;
                        true
                    }
                    (Op::Shift(delta), Some(Instruction { op: Op::Shift(acc), .. })) => {
                        *acc += delta;
                        true
                    }
                    _ => false,
                };

            if !merged {
                instructions.push(Instruction::new(op, pos));
            }
        }

        if character == '\n' {
            line += 1;
            column = 0;
        }
        column += 1;
        i += 1;
    }

    instructions.push(Instruction::synthetic(Op::End));
    Ok(Program::new(instructions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_commands() {
        let program = tokenize("+-<>.,", false).unwrap();
        let ops: Vec<Op> = program.instructions().iter().map(|t| t.op).collect();

        assert_eq!(
            ops,
            vec![
                Op::Start,
                Op::Add(1),
                Op::Add(-1),
                Op::Shift(-1),
                Op::Shift(1),
                Op::Output,
                Op::Input,
                Op::End,
            ]
        );
    }

    #[test]
    fn test_run_merge() {
        let program = tokenize("+++>>><", true).unwrap();
        let ops: Vec<Op> = program.instructions().iter().map(|t| t.op).collect();

        assert_eq!(ops, vec![Op::Start, Op::Add(3), Op::Shift(2), Op::End]);
    }

    #[test]
    fn test_merge_spans_ignored_characters() {
        // Non-command bytes disappear entirely, so a run continues across them
        let program = tokenize("+ comment +", true).unwrap();
        let ops: Vec<Op> = program.instructions().iter().map(|t| t.op).collect();

        assert_eq!(ops, vec![Op::Start, Op::Add(2), Op::End]);
    }

    #[test]
    fn test_zero_idiom() {
        let program = tokenize("[-]", true).unwrap();
        assert!(matches!(
            program.get(1).unwrap().op,
            Op::Zero { upward: false }
        ));

        let program = tokenize("[+]", true).unwrap();
        assert!(matches!(program.get(1).unwrap().op, Op::Zero { upward: true }));
    }

    #[test]
    fn test_zero_idiom_disabled_without_optimize() {
        let program = tokenize("[-]", false).unwrap();
        let ops: Vec<Op> = program.instructions().iter().map(|t| t.op).collect();

        assert_eq!(
            ops,
            vec![
                Op::Start,
                Op::LoopOpen { partner: 3 },
                Op::Add(-1),
                Op::LoopClose { partner: 1 },
                Op::End,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let program = tokenize("x+\n .", true).unwrap();

        let add = program.get(1).unwrap().pos.unwrap();
        assert_eq!((add.offset, add.line, add.column), (1, 1, 2));

        let output = program.get(2).unwrap().pos.unwrap();
        assert_eq!((output.offset, output.line, output.column), (4, 2, 2));
    }

    #[test]
    fn test_unmatched_close_is_fatal() {
        let err = tokenize("]", true).unwrap_err();
        assert_eq!(err.location.line, 1);
        assert_eq!(err.location.column, 1);

        let err = tokenize("\n  ]", true).unwrap_err();
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.column, 3);
    }

    #[test]
    fn test_unmatched_open_tokenizes() {
        // Only the closing side is validated
        assert!(tokenize("[+", true).is_ok());
    }
}
