// CPU integration tests
//
// Instruction table coverage, flag invariants, stack and interrupt
// behaviour, exercised through the public CPU and bus API.

mod common;

use common::cpu_with_program;
use nes_core::cpu::{describe, flags, lookup, CpuError, OPCODE_TABLE};

// ========================================
// Instruction Table
// ========================================

#[test]
fn test_every_opcode_has_a_descriptor() {
    for opcode in 0..=255u8 {
        let instruction = lookup(opcode);
        assert_eq!(instruction.opcode, opcode, "slot {:#04X} holds the wrong opcode", opcode);
        assert!((1..=3).contains(&instruction.bytes));
        assert!(instruction.cycles >= 2 || !instruction.mnemonic.is_implemented());

        match describe(opcode) {
            Ok(described) => assert!(described.mnemonic.is_implemented()),
            Err(CpuError::UnimplementedOpcode { opcode: reported, .. }) => {
                assert_eq!(reported, opcode);
                assert!(!instruction.mnemonic.is_implemented());
            }
        }
    }
    assert_eq!(OPCODE_TABLE.len(), 256);
}

// ========================================
// Flags
// ========================================

#[test]
fn test_loads_set_zero_and_negative() {
    for value in [0x00u8, 0x01, 0x7F, 0x80, 0xFF] {
        let (mut cpu, mut bus) = cpu_with_program(&[0xA9, value]);
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.get_zero(), value == 0, "Z after LDA #{:#04X}", value);
        assert_eq!(cpu.get_negative(), value & 0x80 != 0, "N after LDA #{:#04X}", value);
    }
}

#[test]
fn test_adc_overflow_and_carry() {
    // CLC; LDA #$50; ADC #$50
    let (mut cpu, mut bus) = cpu_with_program(&[0x18, 0xA9, 0x50, 0x69, 0x50]);
    for _ in 0..3 {
        cpu.step(&mut bus).unwrap();
    }
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.get_overflow(), "positive + positive = negative");
    assert!(!cpu.get_carry());
    assert!(cpu.get_negative());

    // SEC; LDA #$50; SBC #$F0
    let (mut cpu, mut bus) = cpu_with_program(&[0x38, 0xA9, 0x50, 0xE9, 0xF0]);
    for _ in 0..3 {
        cpu.step(&mut bus).unwrap();
    }
    assert_eq!(cpu.a, 0x60);
    assert!(!cpu.get_carry(), "borrow taken");
    assert!(!cpu.get_overflow());
}

#[test]
fn test_decimal_flag_ignored() {
    // SED; CLC; LDA #$09; ADC #$01
    let (mut cpu, mut bus) = cpu_with_program(&[0xF8, 0x18, 0xA9, 0x09, 0x69, 0x01]);
    for _ in 0..4 {
        cpu.step(&mut bus).unwrap();
    }
    assert!(cpu.get_decimal());
    assert_eq!(cpu.a, 0x0A, "binary result even with D set");
}

// ========================================
// Stack
// ========================================

#[test]
fn test_stack_wraps_at_zero() {
    // LDX #$00; TXS; LDA #$AB; PHA; LDA #$00; PLA
    let (mut cpu, mut bus) = cpu_with_program(&[0xA2, 0x00, 0x9A, 0xA9, 0xAB, 0x48, 0xA9, 0x00, 0x68]);
    for _ in 0..4 {
        cpu.step(&mut bus).unwrap();
    }
    assert_eq!(cpu.sp, 0xFF, "push at S=0 wraps to 0xFF");
    assert_eq!(bus.peek(0x0100), 0xAB);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0xAB);
    assert_eq!(cpu.sp, 0x00);
}

#[test]
fn test_jsr_rts_round_trip() {
    // JSR $0610; BRK ... $0610: LDA #$07; RTS
    let (mut cpu, mut bus) = cpu_with_program(&[0x20, 0x10, 0x06]);
    bus.load_memory(0x0610, &[0xA9, 0x07, 0x60]);

    assert_eq!(cpu.step(&mut bus), Ok(6));
    assert_eq!(cpu.pc, 0x0610);
    assert_eq!(bus.peek(0x01FD), 0x06);
    assert_eq!(bus.peek(0x01FC), 0x02, "JSR pushes the address of its last byte");

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.step(&mut bus), Ok(6));
    assert_eq!(cpu.pc, 0x0603);
    assert_eq!(cpu.a, 0x07);
}

// ========================================
// Addressing
// ========================================

#[test]
fn test_indirect_jump_page_wrap() {
    let (mut cpu, mut bus) = cpu_with_program(&[0x6C, 0xFF, 0x30]);
    bus.load_memory(0x30FF, &[0x80]);
    bus.load_memory(0x3000, &[0x50]);
    bus.load_memory(0x3100, &[0x40]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x5080, "high byte comes from $3000, not $3100");
}

#[test]
fn test_zero_page_indexing_wraps() {
    // LDX #$01; LDA $FF,X  -> reads $0000
    let (mut cpu, mut bus) = cpu_with_program(&[0xA2, 0x01, 0xB5, 0xFF]);
    bus.load_memory(0x0000, &[0x5A]);
    bus.load_memory(0x0100, &[0xA5]);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn test_indirect_indexed_pointer_wraps_in_zero_page() {
    // LDY #$01; LDA ($FF),Y  -> pointer low at $FF, high at $00
    let (mut cpu, mut bus) = cpu_with_program(&[0xA0, 0x01, 0xB1, 0xFF]);
    bus.load_memory(0x00FF, &[0x00]);
    bus.load_memory(0x0000, &[0x02]);
    bus.load_memory(0x0201, &[0x33]);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x33);
}

// ========================================
// Interrupts
// ========================================

#[test]
fn test_brk_pushes_pc_plus_two_with_b_set() {
    let (mut cpu, mut bus) = cpu_with_program(&[0x00, 0xFF]);
    bus.load_memory(0xFFFE, &[0x00, 0x07]);

    assert_eq!(cpu.step(&mut bus), Ok(7));
    assert_eq!(cpu.pc, 0x0700);
    assert!(cpu.get_interrupt_disable());
    assert_eq!(bus.peek(0x01FD), 0x06);
    assert_eq!(bus.peek(0x01FC), 0x02);
    assert_ne!(bus.peek(0x01FB) & flags::BREAK, 0, "B set on the pushed copy");
}

#[test]
fn test_brk_not_suppressed_by_interrupt_disable() {
    let (mut cpu, mut bus) = cpu_with_program(&[0x78, 0x00, 0x00]);
    bus.load_memory(0xFFFE, &[0x00, 0x07]);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x0700);
}

#[test]
fn test_rti_restores_status_and_pc() {
    let (mut cpu, mut bus) = cpu_with_program(&[0x00, 0x00, 0xEA]);
    bus.load_memory(0xFFFE, &[0x00, 0x07]);
    bus.load_memory(0x0700, &[0x40]);
    cpu.set_carry(true);
    cpu.set_interrupt_disable(false);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.pc, 0x0602);
    assert!(cpu.get_carry());
    assert!(!cpu.get_interrupt_disable());
}

// ========================================
// Undocumented Opcodes
// ========================================

#[test]
fn test_lax_and_sax() {
    // LAX $10; LDA #$F0; SAX $11
    let (mut cpu, mut bus) = cpu_with_program(&[0xA7, 0x10, 0xA9, 0xF0, 0x87, 0x11]);
    bus.load_memory(0x0010, &[0x3C]);

    for _ in 0..3 {
        cpu.step(&mut bus).unwrap();
    }
    assert_eq!(cpu.x, 0x3C);
    assert_eq!(bus.peek(0x0011), 0x30, "A & X");
}

#[test]
fn test_dcp_and_isb() {
    // LDA #$05; DCP $10 ($06 -> $05, compare equal); ISB $11
    let (mut cpu, mut bus) = cpu_with_program(&[0xA9, 0x05, 0xC7, 0x10, 0x38, 0xE7, 0x11]);
    bus.load_memory(0x0010, &[0x06, 0x01]);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.peek(0x0010), 0x05);
    assert!(cpu.get_zero());
    assert!(cpu.get_carry());

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.peek(0x0011), 0x02);
    assert_eq!(cpu.a, 0x03);
}

#[test]
fn test_unstable_opcodes_are_errors() {
    for opcode in [0x02u8, 0x8B, 0xAB, 0x93, 0x9B, 0x9E, 0x9C] {
        let (mut cpu, mut bus) = cpu_with_program(&[opcode, 0x00, 0x00]);
        assert_eq!(
            cpu.step(&mut bus),
            Err(CpuError::UnimplementedOpcode { opcode, pc: 0x0600 }),
            "opcode {:#04X}",
            opcode
        );
    }
}
