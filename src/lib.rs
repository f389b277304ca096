//! # Introduction
//!
//! Tapeback executes Brainfuck programs **in both directions**: a
//! tokenizer compiles source into an immutable instruction stream, and a
//! virtual machine steps that stream one instruction at a time, forward or
//! backward. Every destructive instruction records enough history to be
//! perfectly undoable, and loop brackets record the exact control-flow
//! path taken, so reverse execution restores prior machine state exactly,
//! even through nested loops, partial iterations, and interleaved
//! direction changes. The included terminal UI, built with
//! [ratatui](https://docs.rs/ratatui), scrubs through a run like a video.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Tokenizer → Program → Machine ⇄ host callbacks → TUI
//! ```
//!
//! 1. [`program`] — tokenizes the source into a [`program::Program`]:
//!    peephole-merged instructions with mated loop brackets, bounded by
//!    synthetic start/end markers.
//! 2. [`machine`] — the reversible [`machine::Machine`]: sparse tape,
//!    per-instruction replay logs, and a polling input contract that
//!    never blocks.
//! 3. [`runner`] — the naive forward-only sibling used by hosts that
//!    never step backward.
//! 4. [`ui`] — ratatui-based step debugger; not part of the stable
//!    library API.
//!
//! ## Language
//!
//! The eight primitive commands `+ - < > [ ] . ,` plus the recognized
//! `[-]`/`[+]` zero-cell idiom, which tokenizes into a single instruction
//! when optimization is enabled. Everything else is a comment.

pub mod machine;
pub mod program;
pub mod runner;
pub mod ui;
