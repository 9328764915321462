//! Reference Intel 8080 interpreter driven entirely through [`Hooks`].

use super::alu::{self, AluResult, FLAG_CY, FLAG_P, FLAG_S, FLAG_Z};
use crate::state::{FLAGS_ALWAYS_SET, FLAGS_NEVER_SET};
use crate::timing::{cycle_cost, CONDITIONAL_TAKEN_EXTRA};
use crate::{Engine, Flag, Hooks, Reg16, Reg8};

/// Clock states a halted CPU burns per step.
const HALTED_STEP_CYCLES: u32 = 4;

/// Intel 8080 engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I8080;

impl Engine for I8080 {
    const NAME: &'static str = "i8080";

    fn step<H: Hooks>(cpu: &mut H) {
        // Nothing raises interrupts, so a halted CPU stays halted.
        if cpu.flag(Flag::Halted) {
            cpu.tick(HALTED_STEP_CYCLES);
            return;
        }
        let opcode = fetch8(cpu);
        let cycles = execute(cpu, opcode);
        cpu.tick(u32::from(cycles));
    }
}

fn fetch8<H: Hooks>(cpu: &mut H) -> u8 {
    let pc = cpu.pc();
    let byte = cpu.read(pc);
    cpu.set_pc(pc.wrapping_add(1));
    byte
}

/// Latches a 16-bit immediate operand into `WZ`.
fn fetch_wz<H: Hooks>(cpu: &mut H) -> u16 {
    let low = fetch8(cpu);
    let high = fetch8(cpu);
    let value = u16::from_le_bytes([low, high]);
    cpu.set16(Reg16::Wz, value);
    value
}

fn read16<H: Hooks>(cpu: &mut H, addr: u16) -> u16 {
    let low = cpu.read(addr);
    let high = cpu.read(addr.wrapping_add(1));
    u16::from_le_bytes([low, high])
}

fn write16<H: Hooks>(cpu: &mut H, addr: u16, value: u16) {
    let [low, high] = value.to_le_bytes();
    cpu.write(addr, low);
    cpu.write(addr.wrapping_add(1), high);
}

fn push16<H: Hooks>(cpu: &mut H, value: u16) {
    let sp = cpu.get16(Reg16::Sp).wrapping_sub(2);
    write16(cpu, sp, value);
    cpu.set16(Reg16::Sp, sp);
}

fn pop16<H: Hooks>(cpu: &mut H) -> u16 {
    let sp = cpu.get16(Reg16::Sp);
    let value = read16(cpu, sp);
    cpu.set16(Reg16::Sp, sp.wrapping_add(2));
    value
}

/// Reads the operand named by a 3-bit register field; 6 is `M`, i.e. `(HL)`.
fn load_operand<H: Hooks>(cpu: &mut H, field: u8) -> u8 {
    if let Some(reg) = Reg8::from_u3(field) {
        cpu.get8(reg)
    } else {
        let hl = cpu.get16(Reg16::Hl);
        cpu.read(hl)
    }
}

fn store_operand<H: Hooks>(cpu: &mut H, field: u8, value: u8) {
    if let Some(reg) = Reg8::from_u3(field) {
        cpu.set8(reg, value);
    } else {
        let hl = cpu.get16(Reg16::Hl);
        cpu.write(hl, value);
    }
}

/// Register pair named by bits 4..5 of `LXI`/`INX`/`DCX`/`DAD`/`LDAX`/`STAX`.
const fn pair(opcode: u8) -> Reg16 {
    match (opcode >> 4) & 0x03 {
        0 => Reg16::Bc,
        1 => Reg16::De,
        2 => Reg16::Hl,
        _ => Reg16::Sp,
    }
}

/// Register pair named by bits 4..5 of `PUSH`/`POP`, where 3 is `PSW`.
const fn stack_pair(opcode: u8) -> Reg16 {
    match (opcode >> 4) & 0x03 {
        0 => Reg16::Bc,
        1 => Reg16::De,
        2 => Reg16::Hl,
        _ => Reg16::Af,
    }
}

fn condition<H: Hooks>(cpu: &mut H, code: u8) -> bool {
    let flags = cpu.get8(Reg8::F);
    match code & 0x07 {
        0 => flags & FLAG_Z == 0,
        1 => flags & FLAG_Z != 0,
        2 => flags & FLAG_CY == 0,
        3 => flags & FLAG_CY != 0,
        4 => flags & FLAG_P == 0,
        5 => flags & FLAG_P != 0,
        6 => flags & FLAG_S == 0,
        _ => flags & FLAG_S != 0,
    }
}

fn carry_flag<H: Hooks>(cpu: &mut H) -> bool {
    cpu.get8(Reg8::F) & FLAG_CY != 0
}

/// `ADD`/`ADC`/`SUB`/`SBB`/`ANA`/`XRA`/`ORA`/`CMP` on the accumulator.
fn accumulate<H: Hooks>(cpu: &mut H, op: u8, operand: u8) {
    let a = cpu.get8(Reg8::A);
    let result = match op & 0x07 {
        0 => alu::add(a, operand, false),
        1 => {
            let carry = carry_flag(cpu);
            alu::add(a, operand, carry)
        }
        2 | 7 => alu::sub(a, operand, false),
        3 => {
            let borrow = carry_flag(cpu);
            alu::sub(a, operand, borrow)
        }
        4 => alu::and(a, operand),
        5 => alu::xor(a, operand),
        _ => alu::or(a, operand),
    };
    if op & 0x07 != 7 {
        cpu.set8(Reg8::A, result.value);
    }
    cpu.set8(Reg8::F, result.flags);
}

fn rotate<H: Hooks>(cpu: &mut H, opcode: u8) {
    let a = cpu.get8(Reg8::A);
    let flags = cpu.get8(Reg8::F);
    let carry_in = flags & FLAG_CY;
    let (value, carry_out) = match opcode {
        0x07 => (a.rotate_left(1), a >> 7),
        0x0F => (a.rotate_right(1), a & 0x01),
        0x17 => ((a << 1) | carry_in, a >> 7),
        _ => ((a >> 1) | (carry_in << 7), a & 0x01),
    };
    cpu.set8(Reg8::A, value);
    cpu.set8(Reg8::F, (flags & !FLAG_CY) | carry_out);
}

fn apply<H: Hooks>(cpu: &mut H, field: u8, result: AluResult) {
    store_operand(cpu, field, result.value);
    cpu.set8(Reg8::F, result.flags);
}

fn call<H: Hooks>(cpu: &mut H, target: u16) {
    let pc = cpu.pc();
    push16(cpu, pc);
    cpu.set_pc(target);
}

/// Executes one decoded opcode and returns the clock states it consumed.
fn execute<H: Hooks>(cpu: &mut H, opcode: u8) -> u8 {
    let cycles = cycle_cost(opcode);
    let dst = (opcode >> 3) & 0x07;
    let src = opcode & 0x07;

    match opcode {
        0x76 => cpu.set_flag(Flag::Halted, true),
        0x40..=0x7F => {
            let value = load_operand(cpu, src);
            store_operand(cpu, dst, value);
        }
        0x80..=0xBF => {
            let operand = load_operand(cpu, src);
            accumulate(cpu, dst, operand);
        }
        _ => {
            if execute_other(cpu, opcode) {
                return cycles + CONDITIONAL_TAKEN_EXTRA;
            }
        }
    }
    cycles
}

/// Everything outside the `MOV` and register-ALU blocks.
///
/// Returns `true` when a conditional call or return was taken.
#[allow(clippy::too_many_lines)]
fn execute_other<H: Hooks>(cpu: &mut H, opcode: u8) -> bool {
    let field = (opcode >> 3) & 0x07;

    match opcode {
        // LXI rp, nn
        0x01 | 0x11 | 0x21 | 0x31 => {
            let nn = fetch_wz(cpu);
            cpu.set16(pair(opcode), nn);
        }
        // STAX rp
        0x02 | 0x12 => {
            let addr = cpu.get16(pair(opcode));
            let a = cpu.get8(Reg8::A);
            cpu.write(addr, a);
        }
        // LDAX rp
        0x0A | 0x1A => {
            let addr = cpu.get16(pair(opcode));
            let value = cpu.read(addr);
            cpu.set8(Reg8::A, value);
        }
        0x22 => {
            let addr = fetch_wz(cpu);
            let hl = cpu.get16(Reg16::Hl);
            write16(cpu, addr, hl);
        }
        0x2A => {
            let addr = fetch_wz(cpu);
            let value = read16(cpu, addr);
            cpu.set16(Reg16::Hl, value);
        }
        0x32 => {
            let addr = fetch_wz(cpu);
            let a = cpu.get8(Reg8::A);
            cpu.write(addr, a);
        }
        0x3A => {
            let addr = fetch_wz(cpu);
            let value = cpu.read(addr);
            cpu.set8(Reg8::A, value);
        }
        // INX rp
        0x03 | 0x13 | 0x23 | 0x33 => {
            let value = cpu.get16(pair(opcode)).wrapping_add(1);
            cpu.set16(pair(opcode), value);
        }
        // DCX rp
        0x0B | 0x1B | 0x2B | 0x3B => {
            let value = cpu.get16(pair(opcode)).wrapping_sub(1);
            cpu.set16(pair(opcode), value);
        }
        // DAD rp
        0x09 | 0x19 | 0x29 | 0x39 => {
            let hl = cpu.get16(Reg16::Hl);
            let operand = cpu.get16(pair(opcode));
            let (sum, overflow) = hl.overflowing_add(operand);
            cpu.set16(Reg16::Hl, sum);
            let flags = cpu.get8(Reg8::F);
            cpu.set8(
                Reg8::F,
                (flags & !FLAG_CY) | if overflow { FLAG_CY } else { 0 },
            );
        }
        0x07 | 0x0F | 0x17 | 0x1F => rotate(cpu, opcode),
        0x27 => {
            let a = cpu.get8(Reg8::A);
            let flags = cpu.get8(Reg8::F);
            let result = alu::daa(a, flags);
            cpu.set8(Reg8::A, result.value);
            cpu.set8(Reg8::F, result.flags);
        }
        // CMA
        0x2F => {
            let a = cpu.get8(Reg8::A);
            cpu.set8(Reg8::A, !a);
        }
        // STC
        0x37 => {
            let flags = cpu.get8(Reg8::F);
            cpu.set8(Reg8::F, flags | FLAG_CY);
        }
        // CMC
        0x3F => {
            let flags = cpu.get8(Reg8::F);
            cpu.set8(Reg8::F, flags ^ FLAG_CY);
        }
        // INR r
        _ if opcode & 0xC7 == 0x04 => {
            let value = load_operand(cpu, field);
            let flags = cpu.get8(Reg8::F);
            apply(cpu, field, alu::inr(value, flags));
        }
        // DCR r
        _ if opcode & 0xC7 == 0x05 => {
            let value = load_operand(cpu, field);
            let flags = cpu.get8(Reg8::F);
            apply(cpu, field, alu::dcr(value, flags));
        }
        // MVI r, n
        _ if opcode & 0xC7 == 0x06 => {
            let value = fetch8(cpu);
            store_operand(cpu, field, value);
        }
        // JMP and its undocumented alias.
        0xC3 | 0xCB => {
            let target = fetch_wz(cpu);
            cpu.set_pc(target);
        }
        // CALL and its undocumented aliases.
        0xCD | 0xDD | 0xED | 0xFD => {
            let target = fetch_wz(cpu);
            call(cpu, target);
        }
        // RET and its undocumented alias.
        0xC9 | 0xD9 => {
            let target = pop16(cpu);
            cpu.set_pc(target);
        }
        // Jcc nn
        _ if opcode & 0xC7 == 0xC2 => {
            let target = fetch_wz(cpu);
            if condition(cpu, field) {
                cpu.set_pc(target);
            }
        }
        // Ccc nn
        _ if opcode & 0xC7 == 0xC4 => {
            let target = fetch_wz(cpu);
            if condition(cpu, field) {
                call(cpu, target);
                return true;
            }
        }
        // Rcc
        _ if opcode & 0xC7 == 0xC0 => {
            if condition(cpu, field) {
                let target = pop16(cpu);
                cpu.set_pc(target);
                return true;
            }
        }
        // RST n
        _ if opcode & 0xC7 == 0xC7 => call(cpu, u16::from(opcode & 0x38)),
        // POP rp
        _ if opcode & 0xCF == 0xC1 => {
            let mut value = pop16(cpu);
            if stack_pair(opcode) == Reg16::Af {
                value = (value & !u16::from(FLAGS_NEVER_SET)) | u16::from(FLAGS_ALWAYS_SET);
            }
            cpu.set16(stack_pair(opcode), value);
        }
        // PUSH rp
        _ if opcode & 0xCF == 0xC5 => {
            let value = cpu.get16(stack_pair(opcode));
            push16(cpu, value);
        }
        // ALU immediate
        _ if opcode & 0xC7 == 0xC6 => {
            let operand = fetch8(cpu);
            accumulate(cpu, field, operand);
        }
        // OUT n / IN n: no ports exist, only the operand is consumed.
        0xD3 | 0xDB => {
            fetch8(cpu);
        }
        // XTHL
        0xE3 => {
            let sp = cpu.get16(Reg16::Sp);
            let top = read16(cpu, sp);
            let hl = cpu.get16(Reg16::Hl);
            write16(cpu, sp, hl);
            cpu.set16(Reg16::Hl, top);
        }
        // PCHL
        0xE9 => {
            let hl = cpu.get16(Reg16::Hl);
            cpu.set_pc(hl);
        }
        // XCHG
        0xEB => {
            let de = cpu.get16(Reg16::De);
            let hl = cpu.get16(Reg16::Hl);
            cpu.set16(Reg16::De, hl);
            cpu.set16(Reg16::Hl, de);
        }
        // SPHL
        0xF9 => {
            let hl = cpu.get16(Reg16::Hl);
            cpu.set16(Reg16::Sp, hl);
        }
        // DI
        0xF3 => {
            cpu.set_flag(Flag::Iff, false);
            cpu.set_flag(Flag::IntDisabled, true);
        }
        // EI
        0xFB => {
            cpu.set_flag(Flag::Iff, true);
            cpu.set_flag(Flag::IntDisabled, false);
        }
        // NOP with its aliases 0x08..=0x38, plus the MOV/HLT and
        // register-ALU blocks already decoded by `execute`.
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::I8080;
    use crate::engine::alu::{FLAG_CY, FLAG_Z};
    use crate::{Engine, Flag, Hooks, Machine, Reg16, Reg8, Stack, StateCounter};

    fn machine_with(program: &[u8]) -> Machine {
        let mut machine = Machine::new();
        machine.memory_mut().load_at(0x0100, program);
        machine.set_pc(0x0100);
        machine.set16(Reg16::Sp, 0xF000);
        machine
    }

    fn run_steps(machine: &mut Machine, steps: usize) {
        for _ in 0..steps {
            I8080::step(machine);
        }
    }

    #[test]
    fn mvi_and_mov_move_bytes_between_registers() {
        // MVI B,42h; MOV C,B; MVI M,7; with HL = 0x2000
        let mut machine = machine_with(&[0x06, 0x42, 0x48, 0x36, 0x07]);
        machine.set16(Reg16::Hl, 0x2000);
        run_steps(&mut machine, 3);

        assert_eq!(machine.get8(Reg8::B), 0x42);
        assert_eq!(machine.get8(Reg8::C), 0x42);
        assert_eq!(machine.read(0x2000), 0x07);
        assert_eq!(machine.pc(), 0x0105);
    }

    #[test]
    fn call_and_ret_use_the_stack() {
        // CALL 0110h; ... at 0110h: RET
        let mut program = vec![0xCD, 0x10, 0x01];
        program.resize(0x10, 0x00);
        program.push(0xC9);
        let mut machine = machine_with(&program);

        I8080::step(&mut machine);
        assert_eq!(machine.pc(), 0x0110);
        assert_eq!(machine.get16(Reg16::Sp), 0xEFFE);
        assert_eq!(machine.read(0xEFFE), 0x03);
        assert_eq!(machine.read(0xEFFF), 0x01);
        assert_eq!(machine.get16(Reg16::Wz), 0x0110);

        I8080::step(&mut machine);
        assert_eq!(machine.pc(), 0x0103);
        assert_eq!(machine.get16(Reg16::Sp), 0xF000);
    }

    #[test]
    fn sub_sets_zero_and_conditional_jump_follows_it() {
        // MVI A,5; SUI 5; JZ 0200h
        let mut machine = machine_with(&[0x3E, 0x05, 0xD6, 0x05, 0xCA, 0x00, 0x02]);
        run_steps(&mut machine, 3);

        assert_eq!(machine.get8(Reg8::A), 0);
        assert_ne!(machine.get8(Reg8::F) & FLAG_Z, 0);
        assert_eq!(machine.pc(), 0x0200);
    }

    #[test]
    fn conditional_call_costs_more_when_taken() {
        // STC; CC 0200h; CNC 0300h
        let program = [0x37, 0xDC, 0x00, 0x02];
        let mut stack = machine_with(&program).with(StateCounter::new());
        I8080::step(&mut stack);
        I8080::step(&mut stack);
        assert_eq!(stack.layer().ticks(), 4 + 17);
        assert_eq!(stack.pc(), 0x0200);

        let program = [0xD4, 0x00, 0x03];
        let mut stack = machine_with(&program).with(StateCounter::new());
        stack.set8(Reg8::F, FLAG_CY);
        I8080::step(&mut stack);
        assert_eq!(stack.layer().ticks(), 11);
        assert_eq!(stack.pc(), 0x0103);
    }

    #[test]
    fn push_pop_psw_normalizes_fixed_flag_bits() {
        // LXI B,12FFh; PUSH B; POP PSW
        let mut machine = machine_with(&[0x01, 0xFF, 0x12, 0xC5, 0xF1]);
        run_steps(&mut machine, 3);

        assert_eq!(machine.get8(Reg8::A), 0x12);
        assert_eq!(machine.get8(Reg8::F), 0xD7);
    }

    #[test]
    fn dad_sets_carry_on_overflow() {
        // LXI H,FFFFh; LXI D,0002h; DAD D
        let mut machine = machine_with(&[0x21, 0xFF, 0xFF, 0x11, 0x02, 0x00, 0x19]);
        run_steps(&mut machine, 3);

        assert_eq!(machine.get16(Reg16::Hl), 0x0001);
        assert_ne!(machine.get8(Reg8::F) & FLAG_CY, 0);
    }

    #[test]
    fn inr_m_updates_memory_and_keeps_carry() {
        // STC; INR M, with HL = 0x3000 holding 0xFF
        let mut machine = machine_with(&[0x37, 0x34]);
        machine.set16(Reg16::Hl, 0x3000);
        machine.write(0x3000, 0xFF);
        run_steps(&mut machine, 2);

        assert_eq!(machine.read(0x3000), 0x00);
        let flags = machine.get8(Reg8::F);
        assert_ne!(flags & FLAG_Z, 0);
        assert_ne!(flags & FLAG_CY, 0);
    }

    #[test]
    fn xchg_and_xthl_swap_pairs() {
        // LXI D,1111h; LXI H,2222h; XCHG; PUSH D; XTHL
        let mut machine = machine_with(&[
            0x11, 0x11, 0x11, 0x21, 0x22, 0x22, 0xEB, 0xD5, 0xE3,
        ]);
        run_steps(&mut machine, 5);

        assert_eq!(machine.get16(Reg16::De), 0x2222);
        assert_eq!(machine.get16(Reg16::Hl), 0x2222);
        let sp = machine.get16(Reg16::Sp);
        assert_eq!(machine.read(sp), 0x11);
        assert_eq!(machine.read(sp.wrapping_add(1)), 0x11);
    }

    #[test]
    fn hlt_parks_the_cpu() {
        let mut stack = machine_with(&[0x76, 0x00]).with(StateCounter::new());
        I8080::step(&mut stack);
        I8080::step(&mut stack);
        I8080::step(&mut stack);

        assert!(stack.flag(Flag::Halted));
        assert_eq!(stack.pc(), 0x0101);
        assert_eq!(stack.layer().ticks(), 7 + 4 + 4);
    }

    #[test]
    fn rst_calls_fixed_vector() {
        let mut machine = machine_with(&[0xEF]);
        I8080::step(&mut machine);
        assert_eq!(machine.pc(), 0x0028);
    }

    #[test]
    fn ei_and_di_toggle_interrupt_flags() {
        let mut machine = machine_with(&[0xFB, 0xF3]);
        I8080::step(&mut machine);
        assert!(machine.flag(Flag::Iff));
        assert!(!machine.flag(Flag::IntDisabled));
        I8080::step(&mut machine);
        assert!(!machine.flag(Flag::Iff));
        assert!(machine.flag(Flag::IntDisabled));
    }
}
