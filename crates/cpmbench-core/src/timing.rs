/// Extra clock states consumed by a conditional `CALL` or `RET` when taken.
pub const CONDITIONAL_TAKEN_EXTRA: u8 = 6;

/// Single source-of-truth 8080 clock-state table, indexed by opcode.
///
/// Conditional calls and returns list their not-taken cost.
#[rustfmt::skip]
pub const CYCLE_COST_TABLE: [u8; 256] = [
//  x0  x1  x2  x3  x4  x5  x6  x7  x8  x9  xA  xB  xC  xD  xE  xF
     4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 0x
     4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 1x
     4, 10, 16,  5,  5,  5,  7,  4,  4, 10, 16,  5,  5,  5,  7,  4, // 2x
     4, 10, 13,  5, 10, 10, 10,  4,  4, 10, 13,  5,  5,  5,  7,  4, // 3x
     5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 4x
     5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 5x
     5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 6x
     7,  7,  7,  7,  7,  7,  7,  7,  5,  5,  5,  5,  5,  5,  7,  5, // 7x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9x
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Ax
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // Bx
     5, 10, 10, 10, 11, 11,  7, 11,  5, 10, 10, 10, 11, 17,  7, 11, // Cx
     5, 10, 10, 10, 11, 11,  7, 11,  5, 10, 10, 10, 11, 17,  7, 11, // Dx
     5, 10, 10, 18, 11, 11,  7, 11,  5,  5, 10,  4, 11, 17,  7, 11, // Ex
     5, 10, 10,  4, 11, 11,  7, 11,  5,  5, 10,  4, 11, 17,  7, 11, // Fx
];

/// Looks up the base clock-state cost of `opcode`.
#[must_use]
pub const fn cycle_cost(opcode: u8) -> u8 {
    CYCLE_COST_TABLE[opcode as usize]
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{cycle_cost, CONDITIONAL_TAKEN_EXTRA, CYCLE_COST_TABLE};

    #[rstest]
    #[case::nop(0x00, 4)]
    #[case::lxi_d(0x11, 10)]
    #[case::shld(0x22, 16)]
    #[case::sta(0x32, 13)]
    #[case::mvi_m(0x36, 10)]
    #[case::mov_b_c(0x41, 5)]
    #[case::mov_m_a(0x77, 7)]
    #[case::hlt(0x76, 7)]
    #[case::add_m(0x86, 7)]
    #[case::ret(0xC9, 10)]
    #[case::call(0xCD, 17)]
    #[case::cnz(0xC4, 11)]
    #[case::rnz(0xC0, 5)]
    #[case::xthl(0xE3, 18)]
    #[case::xchg(0xEB, 4)]
    #[case::pchl(0xE9, 5)]
    #[case::rst7(0xFF, 11)]
    fn table_values_match_canonical_costs(#[case] opcode: u8, #[case] cycles: u8) {
        assert_eq!(cycle_cost(opcode), cycles);
    }

    #[test]
    fn taken_conditional_calls_match_unconditional_call() {
        for opcode in [0xC4_u8, 0xCC, 0xD4, 0xDC, 0xE4, 0xEC, 0xF4, 0xFC] {
            assert_eq!(cycle_cost(opcode) + CONDITIONAL_TAKEN_EXTRA, cycle_cost(0xCD));
        }
    }

    #[test]
    fn every_opcode_costs_at_least_four_states() {
        assert!(CYCLE_COST_TABLE.iter().all(|cycles| *cycles >= 4));
    }
}
