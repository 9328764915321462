//! Execution driver: loads a program into a composed stack and runs it until
//! the program counter reaches [`QUIT_ADDR`].

use std::io::Write;
use std::marker::PhantomData;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    Engine, EngineKind, HarnessConfig, Layer, LoadError, Machine, MemoryCounter,
    Passthrough, ProgramImage, Report, Stack, StateCounter, StepFlow, SyscallGate, BDOS_ADDR,
    ENTRY_ADDR, I8080, QUIT_ADDR, RET_OPCODE,
};

/// One engine bound to one fixed layer stack.
#[derive(Debug)]
pub struct Harness<S, E> {
    stack: S,
    steps: u64,
    engine: PhantomData<E>,
}

impl<S: Stack, E: Engine> Harness<S, E> {
    /// Binds engine `E` to `stack`.
    #[must_use]
    pub const fn new(stack: S) -> Self {
        Self {
            stack,
            steps: 0,
            engine: PhantomData,
        }
    }

    /// Zeroes memory, copies `image` to [`ENTRY_ADDR`] and plants `RET` at
    /// [`BDOS_ADDR`].
    ///
    /// Memory is written directly, bypassing every layer.
    pub fn load(&mut self, image: &ProgramImage) {
        let memory = self.stack.machine_mut().memory_mut();
        memory.clear();
        memory.load_at(ENTRY_ADDR, image.bytes());
        memory.write(BDOS_ADDR, RET_OPCODE);
        info!(engine = E::NAME, len = image.len(), "loaded program");
    }

    /// Reads the image at `path` and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the file cannot be loaded; memory is left
    /// untouched in that case.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let image = ProgramImage::read(path)?;
        self.load(&image);
        Ok(())
    }

    /// Runs the pre-step chain and, unless a layer skipped it, one engine
    /// instruction.
    pub fn step(&mut self) -> StepFlow {
        let flow = self.stack.pre_step(&mut Passthrough);
        if !flow.is_skip() {
            E::step(&mut self.stack);
        }
        self.steps += 1;
        flow
    }

    /// Returns `true` once the program counter sits at [`QUIT_ADDR`].
    pub fn is_terminated(&mut self) -> bool {
        self.stack.pc() == QUIT_ADDR
    }

    /// Starts at [`ENTRY_ADDR`] and steps until the program terminates.
    ///
    /// Termination is polled between steps only. A program that never
    /// reaches [`QUIT_ADDR`] runs forever.
    pub fn run(&mut self) -> Report {
        self.stack.set_pc(ENTRY_ADDR);
        while !self.is_terminated() {
            self.step();
        }
        debug!(engine = E::NAME, steps = self.steps, "program terminated");
        self.report()
    }

    /// Collects every layer's counters, outermost first.
    #[must_use]
    pub fn report(&self) -> Report {
        let mut report = Report::new();
        self.stack.report(&mut report);
        report
    }

    /// Number of steps taken, skipped ones included.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the layer stack.
    #[must_use]
    pub const fn stack(&self) -> &S {
        &self.stack
    }

    /// Returns the layer stack mutably.
    pub const fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// Consumes the harness, returning its layer stack.
    #[must_use]
    pub fn into_stack(self) -> S {
        self.stack
    }
}

/// Loads the program at `path` and runs it on the stack `config` describes.
///
/// The stack is, outermost first: memory counter, state counter, syscall gate,
/// machine. Disabled counters are replaced by [`Passthrough`].
///
/// # Errors
///
/// Returns [`LoadError`] when the program cannot be loaded; nothing runs.
pub fn run_program<W: Write>(
    config: &HarnessConfig,
    path: impl AsRef<Path>,
    console: W,
) -> Result<Report, LoadError> {
    let image = ProgramImage::read(path)?;
    let report = match config.engine {
        EngineKind::I8080 => run_with_stats::<I8080, W>(*config, &image, console),
    };
    Ok(report)
}

fn run_with_stats<E: Engine, W: Write>(
    config: HarnessConfig,
    image: &ProgramImage,
    console: W,
) -> Report {
    match (config.count_state, config.count_memory) {
        (false, false) => run_image::<E, _, _, _>(image, console, Passthrough, Passthrough),
        (true, false) => run_image::<E, _, _, _>(image, console, StateCounter::new(), Passthrough),
        (false, true) => run_image::<E, _, _, _>(image, console, Passthrough, MemoryCounter::new()),
        (true, true) => {
            run_image::<E, _, _, _>(image, console, StateCounter::new(), MemoryCounter::new())
        }
    }
}

fn run_image<E, W, St, Mem>(image: &ProgramImage, console: W, state: St, memory: Mem) -> Report
where
    E: Engine,
    W: Write,
    St: Layer,
    Mem: Layer,
{
    let stack = Machine::new()
        .with(SyscallGate::new(console))
        .with(state)
        .with(memory);
    let mut harness = Harness::<_, E>::new(stack);
    harness.load(image);
    let report = harness.run();

    let gate = harness.stack_mut().next_mut().next_mut().layer_mut();
    if let Err(err) = gate.flush() {
        warn!(error = %err, "failed to flush console output");
    }
    report
}
