//! 8080 ALU arithmetic and flag computation.

#![allow(clippy::cast_lossless)]

use crate::state::FLAGS_ALWAYS_SET;

/// Sign flag.
pub const FLAG_S: u8 = 0x80;
/// Zero flag.
pub const FLAG_Z: u8 = 0x40;
/// Auxiliary (half) carry flag.
pub const FLAG_AC: u8 = 0x10;
/// Even-parity flag.
pub const FLAG_P: u8 = 0x04;
/// Carry flag.
pub const FLAG_CY: u8 = 0x01;

/// Value and `F` byte produced by an ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

const fn flag_if(condition: bool, flag: u8) -> u8 {
    if condition {
        flag
    } else {
        0
    }
}

/// Sign, zero, and parity bits for `value`.
pub const fn szp(value: u8) -> u8 {
    (value & FLAG_S)
        | flag_if(value == 0, FLAG_Z)
        | flag_if(value.count_ones() % 2 == 0, FLAG_P)
        | FLAGS_ALWAYS_SET
}

pub const fn add(a: u8, b: u8, carry: bool) -> AluResult {
    let sum = a as u16 + b as u16 + carry as u16;
    let [high, value] = sum.to_be_bytes();
    let half = (a & 0x0F) + (b & 0x0F) + carry as u8 > 0x0F;
    AluResult {
        value,
        flags: szp(value) | flag_if(half, FLAG_AC) | flag_if(high != 0, FLAG_CY),
    }
}

/// 8080 subtraction: `a + !b + !borrow` with the carry inverted into a borrow.
pub const fn sub(a: u8, b: u8, borrow: bool) -> AluResult {
    let sum = add(a, !b, !borrow);
    AluResult {
        value: sum.value,
        flags: sum.flags ^ FLAG_CY,
    }
}

pub const fn and(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: szp(value) | flag_if((a | b) & 0x08 != 0, FLAG_AC),
    }
}

pub const fn xor(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult {
        value,
        flags: szp(value),
    }
}

pub const fn or(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult {
        value,
        flags: szp(value),
    }
}

/// `INR`: carry is preserved from `flags`.
pub const fn inr(value: u8, flags: u8) -> AluResult {
    let value = value.wrapping_add(1);
    AluResult {
        value,
        flags: szp(value) | flag_if(value & 0x0F == 0, FLAG_AC) | (flags & FLAG_CY),
    }
}

/// `DCR`: carry is preserved from `flags`.
pub const fn dcr(value: u8, flags: u8) -> AluResult {
    let value = value.wrapping_sub(1);
    AluResult {
        value,
        flags: szp(value) | flag_if(value & 0x0F != 0x0F, FLAG_AC) | (flags & FLAG_CY),
    }
}

pub const fn daa(a: u8, flags: u8) -> AluResult {
    let low = a & 0x0F;
    let high = a >> 4;
    let mut correction = 0;
    let mut carry = flags & FLAG_CY != 0;
    if flags & FLAG_AC != 0 || low > 9 {
        correction |= 0x06;
    }
    if carry || high > 9 || (high >= 9 && low > 9) {
        correction |= 0x60;
        carry = true;
    }
    let sum = add(a, correction, false);
    AluResult {
        value: sum.value,
        flags: (sum.flags & !FLAG_CY) | flag_if(carry, FLAG_CY),
    }
}
