//! Layered instrumentation harness for cycle-stepping 8080 interpreters.
//!
//! A run composes a [`Machine`] with a fixed stack of behavior [`Layer`]s,
//! loads a flat CP/M program image at [`ENTRY_ADDR`] and lets an [`Engine`]
//! step it until the program terminates through the BDOS gate.

/// Engine hook contract and register naming.
pub mod hooks;
pub use hooks::{Flag, Hooks, Reg16, Reg8, StepFlow, FLAG_COUNT, REG16_COUNT, REG8_COUNT};

/// Behavior layers and static stack composition.
pub mod layer;
pub use layer::{Above, Chain, Layer, Passthrough, Stack, Stacked};

/// CPU register file.
pub mod state;
pub use state::{RegisterFile, FLAGS_ALWAYS_SET, FLAGS_NEVER_SET};

/// Flat 64 KiB address space.
pub mod memory;
pub use memory::{new_address_space, AddressSpace, ADDRESS_SPACE_BYTES};

/// Base machine servicing hook calls.
pub mod machine;
pub use machine::Machine;

/// Deterministic 8080 cycle-cost table.
pub mod timing;
pub use timing::{cycle_cost, CONDITIONAL_TAKEN_EXTRA, CYCLE_COST_TABLE};

/// Instruction-set engines.
pub mod engine;
pub use engine::{Engine, EngineKind, I8080};

/// Load, image, and engine-selection errors.
pub mod error;
pub use error::{ImageError, LoadError, UnknownEngine};

/// Program image validation and file loading.
pub mod loader;
pub use loader::{ProgramImage, MAX_PROGRAM_BYTES};

/// Counter report model.
pub mod report;
pub use report::{Report, ReportEntry};

/// Register, flag, and memory access counters.
pub mod stats;
pub use stats::{AccessCount, MemoryCounter, StateCounter};

/// CP/M BDOS syscall gate.
pub mod syscall;
pub use syscall::{
    SyscallGate, BDOS_ADDR, C_WRITE, C_WRITESTR, ENTRY_ADDR, P_TERMCPM, QUIT_ADDR, RET_OPCODE,
};

/// Run configuration.
pub mod config;
pub use config::HarnessConfig;

/// Program loading and the run loop.
pub mod driver;
pub use driver::{run_program, Harness};

#[cfg(test)]
use tempfile as _;
