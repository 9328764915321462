//! Base of every hook stack: register file plus address space.

use crate::{AddressSpace, Flag, Hooks, Layer, Reg16, Reg8, RegisterFile, Report, StepFlow};

/// Storage that services hook calls once every layer has seen them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Machine {
    registers: RegisterFile,
    memory: AddressSpace,
}

impl Machine {
    /// Creates a machine with zeroed registers and memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Returns the register file mutably.
    pub const fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Returns the address space.
    #[must_use]
    pub const fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    /// Returns the address space mutably.
    pub const fn memory_mut(&mut self) -> &mut AddressSpace {
        &mut self.memory
    }
}

impl Hooks for Machine {
    #[inline]
    fn get8(&mut self, reg: Reg8) -> u8 {
        self.registers.get8(reg)
    }

    #[inline]
    fn set8(&mut self, reg: Reg8, value: u8) {
        self.registers.set8(reg, value);
    }

    #[inline]
    fn get16(&mut self, reg: Reg16) -> u16 {
        self.registers.get16(reg)
    }

    #[inline]
    fn set16(&mut self, reg: Reg16, value: u16) {
        self.registers.set16(reg, value);
    }

    #[inline]
    fn flag(&mut self, flag: Flag) -> bool {
        self.registers.flag(flag)
    }

    #[inline]
    fn set_flag(&mut self, flag: Flag, value: bool) {
        self.registers.set_flag(flag, value);
    }

    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.memory.write(addr, value);
    }

    #[inline]
    fn tick(&mut self, _cycles: u32) {}

    fn pre_step<A: Layer>(&mut self, _above: &mut A) -> StepFlow {
        StepFlow::Execute
    }

    fn report(&self, _report: &mut Report) {}
}

#[cfg(test)]
mod tests {
    use super::Machine;
    use crate::{Hooks, Passthrough, Reg16, Reg8, Report, StepFlow};

    #[test]
    fn register_halves_route_to_the_register_file() {
        let mut machine = Machine::new();
        machine.set16(Reg16::De, 0x1122);
        machine.set8(Reg8::E, 0x33);

        assert_eq!(machine.get8(Reg8::D), 0x11);
        assert_eq!(machine.registers().get16(Reg16::De), 0x1133);
    }

    #[test]
    fn memory_hooks_route_to_the_address_space() {
        let mut machine = Machine::new();
        machine.write(0xFFFF, 0x5A);
        assert_eq!(machine.read(0xFFFF), 0x5A);
        assert_eq!(machine.memory().read(0xFFFF), 0x5A);
    }

    #[test]
    fn bare_machine_always_executes_and_reports_nothing() {
        let mut machine = Machine::new();
        machine.tick(100);
        assert_eq!(machine.pre_step(&mut Passthrough), StepFlow::Execute);

        let mut report = Report::new();
        machine.report(&mut report);
        assert!(report.entries().is_empty());
    }
}
