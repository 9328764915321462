//! Statistics layers counting CPU state and memory traffic.
//!
//! Both layers are purely additive: they forward every call unchanged and
//! only bump their own counters. Replace either with [`crate::Passthrough`]
//! to drop its cost entirely.

use crate::{Flag, Hooks, Layer, Reg16, Reg8, Report, FLAG_COUNT, REG16_COUNT, REG8_COUNT};

/// Read and write totals for one counted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AccessCount {
    /// Number of reads.
    pub reads: u64,
    /// Number of writes.
    pub writes: u64,
}

impl AccessCount {
    fn push_rows(self, report: &mut Report, name: &str) {
        report.push(format!("{name} reads"), self.reads);
        report.push(format!("{name} writes"), self.writes);
    }
}

/// Counts every register and flag access plus accumulated ticks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateCounter {
    ticks: u64,
    reg8: [AccessCount; REG8_COUNT],
    reg16: [AccessCount; REG16_COUNT],
    flags: [AccessCount; FLAG_COUNT],
}

impl StateCounter {
    /// Creates a counter with every total at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total clock ticks seen.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Access totals for an 8-bit register view.
    #[must_use]
    pub const fn reg8(&self, reg: Reg8) -> AccessCount {
        self.reg8[reg.index()]
    }

    /// Access totals for a 16-bit register pair.
    #[must_use]
    pub const fn reg16(&self, reg: Reg16) -> AccessCount {
        self.reg16[reg.index()]
    }

    /// Access totals for a control flag.
    #[must_use]
    pub const fn flag(&self, flag: Flag) -> AccessCount {
        self.flags[flag.index()]
    }
}

impl Layer for StateCounter {
    #[inline]
    fn get8<N: Hooks>(&mut self, next: &mut N, reg: Reg8) -> u8 {
        self.reg8[reg.index()].reads += 1;
        next.get8(reg)
    }

    #[inline]
    fn set8<N: Hooks>(&mut self, next: &mut N, reg: Reg8, value: u8) {
        self.reg8[reg.index()].writes += 1;
        next.set8(reg, value);
    }

    #[inline]
    fn get16<N: Hooks>(&mut self, next: &mut N, reg: Reg16) -> u16 {
        self.reg16[reg.index()].reads += 1;
        next.get16(reg)
    }

    #[inline]
    fn set16<N: Hooks>(&mut self, next: &mut N, reg: Reg16, value: u16) {
        self.reg16[reg.index()].writes += 1;
        next.set16(reg, value);
    }

    #[inline]
    fn flag<N: Hooks>(&mut self, next: &mut N, flag: Flag) -> bool {
        self.flags[flag.index()].reads += 1;
        next.flag(flag)
    }

    #[inline]
    fn set_flag<N: Hooks>(&mut self, next: &mut N, flag: Flag, value: bool) {
        self.flags[flag.index()].writes += 1;
        next.set_flag(flag, value);
    }

    #[inline]
    fn tick<N: Hooks>(&mut self, next: &mut N, cycles: u32) {
        self.ticks += u64::from(cycles);
        next.tick(cycles);
    }

    fn report(&self, report: &mut Report) {
        report.push("ticks", self.ticks);
        for pair in Reg16::ALL {
            self.reg16(pair).push_rows(report, pair.name());
            for half in Reg8::ALL.into_iter().filter(|half| half.pair() == pair) {
                self.reg8(half).push_rows(report, half.name());
            }
        }
        for flag in Flag::ALL {
            self.flag(flag).push_rows(report, flag.name());
        }
    }
}

/// Counts address-space reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryCounter {
    access: AccessCount,
}

impl MemoryCounter {
    /// Creates a counter with both totals at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory access totals.
    #[must_use]
    pub const fn access(&self) -> AccessCount {
        self.access
    }
}

impl Layer for MemoryCounter {
    #[inline]
    fn read<N: Hooks>(&mut self, next: &mut N, addr: u16) -> u8 {
        self.access.reads += 1;
        next.read(addr)
    }

    #[inline]
    fn write<N: Hooks>(&mut self, next: &mut N, addr: u16, value: u8) {
        self.access.writes += 1;
        next.write(addr, value);
    }

    fn report(&self, report: &mut Report) {
        self.access.push_rows(report, "memory");
    }
}
