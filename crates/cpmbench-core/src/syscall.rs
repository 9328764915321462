//! CP/M BDOS call gate.
//!
//! Programs request console services by calling [`BDOS_ADDR`] with a function
//! selector in `C`. The gate intercepts the step that lands there, performs
//! the service and lets the engine run the `RET` planted at that address.
//! Selector [`P_TERMCPM`] instead jumps to [`QUIT_ADDR`], ending the run.

use std::io::{self, Write};

use tracing::{debug, warn};

use crate::{Hooks, Layer, Reg16, Reg8, Report, StepFlow};

/// Address reached when a program terminates.
pub const QUIT_ADDR: u16 = 0x0000;
/// BDOS entry point programs `CALL` into.
pub const BDOS_ADDR: u16 = 0x0005;
/// Load and entry address of program images.
pub const ENTRY_ADDR: u16 = 0x0100;
/// `RET`, planted at [`BDOS_ADDR`] so an executed call returns at once.
pub const RET_OPCODE: u8 = 0xC9;

/// BDOS function 0: terminate the program.
pub const P_TERMCPM: u8 = 0x00;
/// BDOS function 2: write the character in `E`.
pub const C_WRITE: u8 = 0x02;
/// BDOS function 9: write the `$`-terminated string at `DE`.
pub const C_WRITESTR: u8 = 0x09;

/// Terminator of `C_WRITESTR` strings.
const STRING_TERMINATOR: u8 = b'$';

/// Layer emulating BDOS console calls and tallying clock ticks.
#[derive(Debug)]
pub struct SyscallGate<W> {
    console: W,
    ticks: u64,
    console_failed: bool,
}

impl<W: Write> SyscallGate<W> {
    /// Creates a gate writing console output to `console`.
    #[must_use]
    pub const fn new(console: W) -> Self {
        Self {
            console,
            ticks: 0,
            console_failed: false,
        }
    }

    /// Total clock ticks seen.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns the console sink.
    #[must_use]
    pub const fn console(&self) -> &W {
        &self.console
    }

    /// Consumes the gate, returning its console sink.
    #[must_use]
    pub fn into_console(self) -> W {
        self.console
    }

    /// Flushes buffered console output.
    ///
    /// # Errors
    ///
    /// Returns the sink's flush error.
    pub fn flush(&mut self) -> io::Result<()> {
        self.console.flush()
    }

    fn emit(&mut self, bytes: &[u8]) {
        if let Err(err) = self.console.write_all(bytes) {
            if !self.console_failed {
                warn!(error = %err, "console write failed; further output may be lost");
                self.console_failed = true;
            }
        }
    }

    fn write_string<S: Hooks>(&mut self, stack: &mut S) {
        let mut addr = stack.get16(Reg16::De);
        loop {
            let byte = stack.read(addr);
            if byte == STRING_TERMINATOR {
                break;
            }
            self.emit(&[byte]);
            addr = addr.wrapping_add(1);
        }
    }
}

impl<W: Write> Layer for SyscallGate<W> {
    #[inline]
    fn tick<N: Hooks>(&mut self, next: &mut N, cycles: u32) {
        self.ticks += u64::from(cycles);
        next.tick(cycles);
    }

    fn on_step<S: Hooks>(&mut self, stack: &mut S) -> StepFlow {
        if stack.pc() != BDOS_ADDR {
            return StepFlow::Execute;
        }

        match stack.get8(Reg8::C) {
            P_TERMCPM => {
                debug!(ticks = self.ticks, "program requested termination");
                stack.set_pc(QUIT_ADDR);
                return StepFlow::Skip;
            }
            C_WRITE => {
                let ch = stack.get8(Reg8::E);
                self.emit(&[ch]);
            }
            C_WRITESTR => self.write_string(stack),
            selector => {
                debug!(selector, "unhandled bdos call");
                self.emit(format!("bdos: {selector}\n").as_bytes());
            }
        }
        StepFlow::Execute
    }

    fn report(&self, report: &mut Report) {
        report.push("ticks", self.ticks);
    }
}
