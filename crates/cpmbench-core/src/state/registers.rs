use crate::{Flag, Reg16, Reg8, FLAG_COUNT, REG16_COUNT};

/// 8080 `F` bit that always reads as one.
pub const FLAGS_ALWAYS_SET: u8 = 0x02;
/// 8080 `F` bits that always read as zero.
pub const FLAGS_NEVER_SET: u8 = 0x28;

/// Register pairs and control flags of an 8080-class CPU.
///
/// 8-bit views are stored inside their pair, so `B` and `BC` share storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    pairs: [u16; REG16_COUNT],
    flags: [bool; FLAG_COUNT],
}

impl RegisterFile {
    /// Reads a register pair.
    #[must_use]
    pub const fn get16(&self, reg: Reg16) -> u16 {
        self.pairs[reg.index()]
    }

    /// Writes a register pair.
    pub const fn set16(&mut self, reg: Reg16, value: u16) {
        self.pairs[reg.index()] = value;
    }

    /// Reads one half of a register pair.
    #[must_use]
    pub const fn get8(&self, reg: Reg8) -> u8 {
        let [high, low] = self.get16(reg.pair()).to_be_bytes();
        if reg.is_high() {
            high
        } else {
            low
        }
    }

    /// Writes one half of a register pair, leaving the other half intact.
    pub const fn set8(&mut self, reg: Reg8, value: u8) {
        let [high, low] = self.get16(reg.pair()).to_be_bytes();
        let pair = if reg.is_high() {
            u16::from_be_bytes([value, low])
        } else {
            u16::from_be_bytes([high, value])
        };
        self.set16(reg.pair(), pair);
    }

    /// Reads a control flag.
    #[must_use]
    pub const fn flag(&self, flag: Flag) -> bool {
        self.flags[flag.index()]
    }

    /// Writes a control flag.
    pub const fn set_flag(&mut self, flag: Flag, value: bool) {
        self.flags[flag.index()] = value;
    }
}
