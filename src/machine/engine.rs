// Reversible execution engine for the tape machine

use crate::machine::config::MachineConfig;
use crate::machine::errors::RuntimeError;
use crate::machine::history::History;
use crate::machine::tape::Tape;
use crate::program::{tokenize, Op, Program, SourcePos, SyntaxError};

/// Cell addresses `[0, FINGERPRINT_WINDOW)` contribute to the state
/// fingerprint.
const FINGERPRINT_WINDOW: i64 = 1000;

/// Response from the host input hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A value for the current cell, usually a character code.
    Value(i64),
    /// No input is available yet. The machine performs no state change
    /// and the host retries the step later.
    Pending,
}

/// Outcome of a single successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction was executed (or undone).
    Stepped,
    /// The input hook reported [`Input::Pending`]; the program counter,
    /// pointer, and tape are untouched and the step must be retried.
    NeedsInput,
}

/// The reversible state machine.
///
/// A machine owns one immutable [`Program`], the sparse [`Tape`], the
/// pointer and program counter, and a per-run [`History`] ledger. Each
/// call to [`step`](Machine::step) executes exactly one instruction in
/// either direction; destructive instructions record undo data in the
/// ledger and loop brackets record the control-flow path, so stepping
/// backward reproduces prior machine state exactly.
///
/// Single-threaded and synchronous: `step` never blocks. When the input
/// hook has nothing to offer, the step reports
/// [`StepOutcome::NeedsInput`] without mutating anything, which lets a
/// timer- or network-driven host interleave many machines cooperatively.
pub struct Machine {
    config: MachineConfig,
    program: Program,
    tape: Tape,
    pointer: i64,
    pc: usize,
    last_pc: usize,
    history: History,
    output_callback: Box<dyn FnMut(char)>,
    input_callback: Box<dyn FnMut() -> Input>,
}

impl Machine {
    /// Create a machine with an empty program loaded.
    ///
    /// The default output hook discards characters and the default input
    /// hook supplies zero.
    pub fn new(config: MachineConfig) -> Self {
        let program = Program::empty();
        let history = History::for_program(&program);
        Self {
            config,
            program,
            tape: Tape::new(),
            pointer: 0,
            pc: 0,
            last_pc: 0,
            history,
            output_callback: Box::new(|_| {}),
            input_callback: Box::new(|| Input::Value(0)),
        }
    }

    /// Invoked once per forward `.` with exactly one character.
    pub fn set_output_callback(&mut self, callback: impl FnMut(char) + 'static) {
        self.output_callback = Box::new(callback);
    }

    /// Invoked once per forward `,`; returning [`Input::Pending`]
    /// suspends the step without consuming it.
    pub fn set_input_callback(&mut self, callback: impl FnMut() -> Input + 'static) {
        self.input_callback = Box::new(callback);
    }

    /// Tokenize `source` (honoring `config.optimize`) and load the result.
    pub fn load(&mut self, source: &str) -> Result<(), SyntaxError> {
        let program = tokenize(source, self.config.optimize)?;
        self.load_tokens(program);
        Ok(())
    }

    /// Install a pre-built program with a fresh tape and history ledger,
    /// then reset.
    pub fn load_tokens(&mut self, program: Program) {
        self.history = History::for_program(&program);
        self.program = program;
        self.tape = Tape::new();
        self.reset();
    }

    /// Return the machine to its initial state: every touched tape
    /// address zeroed, pointer and program counter zeroed, every replay
    /// log cleared and loop logs reseeded.
    pub fn reset(&mut self) {
        self.tape.reset();
        self.pointer = 0;
        self.pc = 0;
        self.last_pc = 0;
        self.history.reset(&self.program);
    }

    /// Whether the program counter denotes the terminal position.
    pub fn at_end(&self) -> bool {
        match self.program.get(self.pc) {
            Some(instruction) => matches!(instruction.op, Op::End),
            None => true,
        }
    }

    /// Whether the program counter denotes the initial position.
    pub fn at_beginning(&self) -> bool {
        self.pc == 0
    }

    pub fn step_forward(&mut self) -> Result<StepOutcome, RuntimeError> {
        self.step(false)
    }

    pub fn step_backward(&mut self) -> Result<StepOutcome, RuntimeError> {
        self.step(true)
    }

    /// Execute one instruction. With `reverse`, undo the instruction that
    /// was executed most recently instead.
    pub fn step(&mut self, reverse: bool) -> Result<StepOutcome, RuntimeError> {
        if reverse {
            // Undo applies to the instruction most recently executed, the
            // one before the current program counter.
            self.pc = self
                .pc
                .checked_sub(1)
                .ok_or(RuntimeError::ProgramCounterOutOfBounds { pc: -1 })?;
        }

        let executing = self.pc;
        let instruction = *self
            .program
            .get(self.pc)
            .ok_or(RuntimeError::ProgramCounterOutOfBounds {
                pc: executing as i64,
            })?;
        let pos = instruction.pos;

        match instruction.op {
            Op::Add(delta) => {
                let applied = if reverse { -delta } else { delta };
                let mut value = self.tape.get(self.pointer) + applied;
                if value < 0 || value >= self.config.cell_width {
                    if !self.config.allow_wrapping {
                        return Err(RuntimeError::CellOverflow {
                            value,
                            location: pos,
                        });
                    }
                    value = value.rem_euclid(self.config.cell_width);
                }
                self.tape.set(self.pointer, value);
            }

            Op::Shift(delta) => {
                let applied = if reverse { -delta } else { delta };
                let pointer = self.pointer + applied;
                if pointer < 0 && !self.config.allow_negative_pointer {
                    return Err(RuntimeError::PointerOutOfBounds {
                        pointer,
                        reverse,
                        location: pos,
                    });
                }
                self.pointer = pointer;
            }

            Op::Zero { upward } => {
                if reverse {
                    let saved = self
                        .history
                        .cell(executing)
                        .pop()
                        .ok_or(RuntimeError::HistoryUnderflow { location: pos })?;
                    self.tape.set(self.pointer, saved);
                } else {
                    let value = self.tape.get(self.pointer);
                    self.history.cell(executing).push(value);
                    if upward && value != 0 && !self.config.allow_wrapping {
                        // [+] only reaches zero by wrapping the cell
                        return Err(RuntimeError::CellOverflow {
                            value,
                            location: pos,
                        });
                    }
                    self.tape.set(self.pointer, 0);
                }
            }

            Op::Input => {
                if reverse {
                    let saved = self
                        .history
                        .cell(executing)
                        .pop()
                        .ok_or(RuntimeError::HistoryUnderflow { location: pos })?;
                    self.tape.set(self.pointer, saved);
                } else {
                    match (self.input_callback)() {
                        // Suspension: nothing moves, not even last_pc, so
                        // the retried step is indistinguishable from the
                        // first attempt.
                        Input::Pending => return Ok(StepOutcome::NeedsInput),
                        Input::Value(value) => {
                            let overwritten = self.tape.get(self.pointer);
                            self.history.cell(executing).push(overwritten);
                            self.tape.set(self.pointer, value);
                        }
                    }
                }
            }

            Op::Output => {
                if !reverse {
                    let value = self.tape.get(self.pointer);
                    let character =
                        char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                    (self.output_callback)(character);
                }
                // Output cannot be unsent; reverse is a no-op.
            }

            Op::LoopOpen { partner } | Op::LoopClose { partner } => {
                self.step_loop(instruction.op, partner, pos, reverse)?;
            }

            Op::Start | Op::End => {}
        }

        if !reverse {
            self.pc += 1;
            if self.pc >= self.program.len() {
                return Err(RuntimeError::ProgramCounterOutOfBounds {
                    pc: self.pc as i64,
                });
            }
        }
        self.last_pc = executing;

        Ok(StepOutcome::Stepped)
    }

    fn step_loop(
        &mut self,
        op: Op,
        partner: usize,
        pos: Option<SourcePos>,
        reverse: bool,
    ) -> Result<(), RuntimeError> {
        if reverse {
            let restored = self
                .history
                .jump(self.pc)
                .pop()
                .ok_or(RuntimeError::HistoryUnderflow { location: pos })?;
            self.pc = restored;
            if restored == partner {
                // Undo the paired jump bookkeeping recorded on the partner
                self.history
                    .jump(partner)
                    .pop()
                    .ok_or(RuntimeError::HistoryUnderflow { location: pos })?;
            }
        } else {
            // Record where control resumed from, whether or not we jump
            self.history.jump(self.pc).push(self.last_pc + 1);

            let cell = self.tape.get(self.pointer);
            let jump = match op {
                Op::LoopOpen { .. } => cell == 0,
                _ => cell != 0,
            };
            if jump {
                if partner >= self.program.len() {
                    // An unmatched '[' tokenizes, but its jump has nowhere
                    // to land.
                    return Err(RuntimeError::MalformedInstruction { location: pos });
                }
                // The partner records the jump origin so its reverse can
                // restore it.
                self.history.jump(partner).push(self.pc);
                self.pc = partner;
            }
        }
        Ok(())
    }

    // ========== Host inspection and editing ==========

    /// Value of the cell under the pointer.
    pub fn current_value(&self) -> i64 {
        self.tape.get(self.pointer)
    }

    /// Overwrite the cell under the pointer directly, bypassing history.
    /// For host-driven state editing, not part of normal execution: the
    /// edit is invisible to undo.
    pub fn set_current_value(&mut self, value: i64) {
        self.tape.set(self.pointer, value);
    }

    /// Byte offset in the source of the instruction at the program
    /// counter, or `None` on the synthetic bounds.
    pub fn position_in_source(&self) -> Option<usize> {
        self.current_pos().map(|pos| pos.offset)
    }

    /// Full source position of the instruction at the program counter.
    pub fn current_pos(&self) -> Option<SourcePos> {
        self.program.get(self.pc).and_then(|instruction| instruction.pos)
    }

    /// A coarse fingerprint of `(tape window, pointer, instruction kind)`
    /// for host-side state comparison, e.g. loop-detection heuristics.
    /// Not collision-free; never used for correctness.
    pub fn state_fingerprint(&self) -> i64 {
        let mut total = self.tape.window_sum(0..FINGERPRINT_WINDOW);
        total += self.pointer * 100_000;
        if let Some(instruction) = self.program.get(self.pc) {
            total += 1_000 * instruction.op.kind_code();
        }
        total
    }

    // ========== Getter methods for hosts and the UI ==========

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    pub fn program_counter(&self) -> usize {
        self.pc
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("config", &self.config)
            .field("pc", &self.pc)
            .field("pointer", &self.pointer)
            .field("program_len", &self.program.len())
            .finish_non_exhaustive()
    }
}
