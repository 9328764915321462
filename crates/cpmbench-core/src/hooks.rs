//! Engine hook contract shared by engines, layers, and the base machine.
//!
//! Every piece of CPU state an engine touches is reached through [`Hooks`].
//! Engines never hold registers or memory themselves; they drive whatever
//! stack they are handed, so each layer in that stack observes the access.

use crate::{Layer, Report};

/// Number of 8-bit register views.
pub const REG8_COUNT: usize = 8;
/// Number of 16-bit register pairs.
pub const REG16_COUNT: usize = 7;
/// Number of boolean control flags.
pub const FLAG_COUNT: usize = 3;

/// 8-bit register view, always one half of a [`Reg16`] pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Reg8 {
    B = 0,
    C = 1,
    D = 2,
    E = 3,
    H = 4,
    L = 5,
    A = 6,
    F = 7,
}

impl Reg8 {
    /// All 8-bit views in report order.
    pub const ALL: [Self; REG8_COUNT] = [
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::A,
        Self::F,
    ];

    /// Returns the array index for this view (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the register pair this view belongs to.
    #[must_use]
    pub const fn pair(self) -> Reg16 {
        match self {
            Self::B | Self::C => Reg16::Bc,
            Self::D | Self::E => Reg16::De,
            Self::H | Self::L => Reg16::Hl,
            Self::A | Self::F => Reg16::Af,
        }
    }

    /// Returns `true` when this view is the high byte of its pair.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::B | Self::D | Self::H | Self::A)
    }

    /// Lower-case register name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::H => "h",
            Self::L => "l",
            Self::A => "a",
            Self::F => "f",
        }
    }

    /// Decodes the 3-bit register field of 8080 opcodes.
    ///
    /// Field value 6 names the memory operand `M` and has no register view.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::B),
            1 => Some(Self::C),
            2 => Some(Self::D),
            3 => Some(Self::E),
            4 => Some(Self::H),
            5 => Some(Self::L),
            7 => Some(Self::A),
            _ => None,
        }
    }
}

/// 16-bit register or register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Reg16 {
    /// Program counter.
    Pc = 0,
    /// Stack pointer.
    Sp = 1,
    /// Internal scratch pair latching 16-bit operands.
    Wz = 2,
    /// `B`/`C` pair.
    Bc = 3,
    /// `D`/`E` pair.
    De = 4,
    /// `H`/`L` pair.
    Hl = 5,
    /// Accumulator and flags.
    Af = 6,
}

impl Reg16 {
    /// All register pairs in storage order.
    pub const ALL: [Self; REG16_COUNT] = [
        Self::Pc,
        Self::Sp,
        Self::Wz,
        Self::Bc,
        Self::De,
        Self::Hl,
        Self::Af,
    ];

    /// Returns the array index for this pair (`0..=6`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case register name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Sp => "sp",
            Self::Wz => "wz",
            Self::Bc => "bc",
            Self::De => "de",
            Self::Hl => "hl",
            Self::Af => "af",
        }
    }
}

/// Boolean control flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Flag {
    /// Interrupt enable toggle.
    Iff = 0,
    /// Interrupts are disabled.
    IntDisabled = 1,
    /// CPU executed `HLT`.
    Halted = 2,
}

impl Flag {
    /// All flags in report order.
    pub const ALL: [Self; FLAG_COUNT] = [Self::Iff, Self::IntDisabled, Self::Halted];

    /// Returns the array index for this flag (`0..=2`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Iff => "iff",
            Self::IntDisabled => "is_int_disabled",
            Self::Halted => "is_halted",
        }
    }
}

/// Decision returned by the pre-step chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepFlow {
    /// Let the engine execute one instruction.
    Execute,
    /// A layer consumed this step; the engine does not run.
    Skip,
}

impl StepFlow {
    /// Returns `true` when the engine must not run for this step.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        matches!(self, Self::Skip)
    }
}

/// Operations a composed stack exposes to engines, layers, and the driver.
pub trait Hooks {
    /// Reads an 8-bit register view.
    fn get8(&mut self, reg: Reg8) -> u8;

    /// Writes an 8-bit register view.
    fn set8(&mut self, reg: Reg8, value: u8);

    /// Reads a 16-bit register pair.
    fn get16(&mut self, reg: Reg16) -> u16;

    /// Writes a 16-bit register pair.
    fn set16(&mut self, reg: Reg16, value: u16);

    /// Reads a control flag.
    fn flag(&mut self, flag: Flag) -> bool;

    /// Writes a control flag.
    fn set_flag(&mut self, flag: Flag, value: bool);

    /// Reads one byte of the address space.
    fn read(&mut self, addr: u16) -> u8;

    /// Writes one byte of the address space.
    fn write(&mut self, addr: u16, value: u8);

    /// Accumulates `cycles` clock ticks.
    fn tick(&mut self, cycles: u32);

    /// Runs every layer's pre-step hook, outermost first.
    ///
    /// `above` holds the layers stacked over this node; hooks issued from a
    /// pre-step handler enter through `above` before descending, so no access
    /// bypasses an outer observer.
    fn pre_step<A: Layer>(&mut self, above: &mut A) -> StepFlow;

    /// Appends every layer's counters to `report`, outermost first.
    fn report(&self, report: &mut Report);

    /// Reads the program counter.
    fn pc(&mut self) -> u16 {
        self.get16(Reg16::Pc)
    }

    /// Writes the program counter.
    fn set_pc(&mut self, value: u16) {
        self.set16(Reg16::Pc, value);
    }
}

#[cfg(test)]
mod tests {
    use super::{Flag, Reg16, Reg8, FLAG_COUNT, REG16_COUNT, REG8_COUNT};

    #[test]
    fn indices_cover_each_table_exactly_once() {
        for (index, reg) in Reg8::ALL.iter().enumerate() {
            assert_eq!(reg.index(), index);
        }
        for (index, reg) in Reg16::ALL.iter().enumerate() {
            assert_eq!(reg.index(), index);
        }
        for (index, flag) in Flag::ALL.iter().enumerate() {
            assert_eq!(flag.index(), index);
        }
        assert_eq!(Reg8::ALL.len(), REG8_COUNT);
        assert_eq!(Reg16::ALL.len(), REG16_COUNT);
        assert_eq!(Flag::ALL.len(), FLAG_COUNT);
    }

    #[test]
    fn halves_pair_up_high_then_low() {
        for (high, low) in [
            (Reg8::B, Reg8::C),
            (Reg8::D, Reg8::E),
            (Reg8::H, Reg8::L),
            (Reg8::A, Reg8::F),
        ] {
            assert_eq!(high.pair(), low.pair());
            assert!(high.is_high());
            assert!(!low.is_high());
        }
    }

    #[test]
    fn register_field_decode_skips_memory_operand() {
        assert_eq!(Reg8::from_u3(0), Some(Reg8::B));
        assert_eq!(Reg8::from_u3(5), Some(Reg8::L));
        assert_eq!(Reg8::from_u3(6), None);
        assert_eq!(Reg8::from_u3(7), Some(Reg8::A));
        assert_eq!(Reg8::from_u3(8), None);
    }
}
