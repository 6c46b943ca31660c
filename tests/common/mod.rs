// Common test utilities for integration tests
//
// Builds synthetic cartridges and test programs so the suites do not need
// ROM files. `parse_ines` is only used by the ROM-backed tests that are
// ignored by default.

#![allow(dead_code)]

use nes_core::bus::Bus;
use nes_core::cartridge::{Cartridge, CartridgeHeader, CHR_BANK_SIZE, PRG_BANK_SIZE};
use nes_core::cpu::Cpu;
use nes_core::emulator::{CoreConfig, Emulator};

/// Where `nrom_with_program` places code (the start of the last bank)
pub const PROGRAM_START: u16 = 0xC000;

/// Address of the NMI handler installed by `nrom_with_program`
pub const NMI_HANDLER: u16 = 0xE000;

/// Address of the IRQ handler installed by `nrom_with_program`
pub const IRQ_HANDLER: u16 = 0xE100;

/// Cartridge whose 8KB PRG halves and 1KB CHR slices are each filled with
/// their own index, so a bank switch is visible by reading any byte
pub fn banked_cartridge(mapper_id: u8, prg_banks: u8, chr_banks: u8) -> Cartridge {
    let prg: Vec<u8> = (0..prg_banks as usize * PRG_BANK_SIZE)
        .map(|i| (i / 0x2000) as u8)
        .collect();
    let chr: Vec<u8> = (0..chr_banks as usize * CHR_BANK_SIZE)
        .map(|i| (i / 0x0400) as u8)
        .collect();

    let header = CartridgeHeader {
        prg_banks,
        chr_banks,
        mapper_id,
        ..Default::default()
    };
    Cartridge::new(header, prg, chr, None).expect("valid synthetic cartridge")
}

/// Cartridge with `program` at $C000 of its last 16KB bank, vectors set:
/// RESET -> $C000, NMI -> $E000 (RTI), IRQ -> $E100 (RTI)
pub fn nrom_with_program(mapper_id: u8, prg_banks: u8, chr_banks: u8, program: &[u8]) -> Cartridge {
    let mut prg = vec![0xEA; prg_banks as usize * PRG_BANK_SIZE];
    let last = prg.len() - PRG_BANK_SIZE;

    prg[last..last + program.len()].copy_from_slice(program);
    prg[last + 0x2000] = 0x40; // RTI
    prg[last + 0x2100] = 0x40; // RTI
    prg[last + 0x3FFA..last + 0x3FFC].copy_from_slice(&NMI_HANDLER.to_le_bytes());
    prg[last + 0x3FFC..last + 0x3FFE].copy_from_slice(&PROGRAM_START.to_le_bytes());
    prg[last + 0x3FFE..].copy_from_slice(&IRQ_HANDLER.to_le_bytes());

    let header = CartridgeHeader {
        prg_banks,
        chr_banks,
        mapper_id,
        ..Default::default()
    };
    Cartridge::new(header, prg, vec![0; chr_banks as usize * CHR_BANK_SIZE], None)
        .expect("valid synthetic cartridge")
}

/// Powered-on emulator running `program` from an NROM-128 board
pub fn emulator_with_program(program: &[u8]) -> Emulator {
    emulator_with_cartridge(nrom_with_program(0, 1, 1, program), CoreConfig::default())
}

pub fn emulator_with_cartridge(cartridge: Cartridge, config: CoreConfig) -> Emulator {
    let mut emulator = Emulator::new(config).expect("valid configuration");
    emulator
        .load_cartridge(cartridge)
        .expect("supported mapper");
    emulator
}

/// CPU and bus with `program` loaded in RAM at $0600 and PC pointing at it
pub fn cpu_with_program(program: &[u8]) -> (Cpu, Bus) {
    let mut bus = Bus::new();
    bus.load_memory(0x0600, program);
    let mut cpu = Cpu::new();
    cpu.pc = 0x0600;
    (cpu, bus)
}

/// Parse an iNES image into a cartridge
pub fn parse_ines(data: &[u8]) -> Result<Cartridge, String> {
    if data.len() < 16 || &data[0..4] != b"NES\x1A" {
        return Err("missing iNES header".to_string());
    }

    let flags6 = data[6];
    let flags7 = data[7];
    let header = CartridgeHeader {
        prg_banks: data[4],
        chr_banks: data[5],
        mapper_id: (flags7 & 0xF0) | (flags6 >> 4),
        vertical_mirroring: flags6 & 0x01 != 0,
        battery: flags6 & 0x02 != 0,
        trainer: flags6 & 0x04 != 0,
        four_screen: flags6 & 0x08 != 0,
    };

    let mut offset = 16;
    let trainer = if header.trainer {
        let trainer = data.get(offset..offset + 512).ok_or("truncated trainer")?.to_vec();
        offset += 512;
        Some(trainer)
    } else {
        None
    };

    let prg_len = header.prg_banks as usize * PRG_BANK_SIZE;
    let prg = data.get(offset..offset + prg_len).ok_or("truncated PRG-ROM")?.to_vec();
    offset += prg_len;

    let chr_len = header.chr_banks as usize * CHR_BANK_SIZE;
    let chr = data.get(offset..offset + chr_len).ok_or("truncated CHR-ROM")?.to_vec();

    Cartridge::new(header, prg, chr, trainer).map_err(|e| e.to_string())
}
