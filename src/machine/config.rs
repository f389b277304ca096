// Recognized machine options

/// Cell values live in `[0, cell_width)` unless overridden.
pub const DEFAULT_CELL_WIDTH: i64 = 256;

/// Execution options for a [`Machine`](super::Machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Modulus for cell values; cells hold `[0, cell_width)`.
    pub cell_width: i64,

    /// Apply peephole optimizations when tokenizing through
    /// [`Machine::load`](super::Machine::load): zero-idiom folding and
    /// run-length merging.
    pub optimize: bool,

    /// When false, a cell leaving `[0, cell_width)` is fatal instead of
    /// wrapped.
    pub allow_wrapping: bool,

    /// When false, a negative pointer is fatal.
    pub allow_negative_pointer: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_WIDTH,
            optimize: true,
            allow_wrapping: true,
            allow_negative_pointer: false,
        }
    }
}
