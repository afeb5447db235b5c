#![allow(clippy::cast_possible_truncation)]

use crate::{BankId, Instruction, InvalidOpcode, Opcode, PdmKind, RawOpcode};

use rstest::rstest;
use strum::IntoEnumIterator;

fn header(op: RawOpcode, out_bank: u8, out_addr: u16, banks: (u8, u8, u8)) -> u32 {
    ((out_addr as u32) << 19)
        | (((op as u32) >> 8) << 17)
        | ((out_bank as u32) << 14)
        | ((banks.2 as u32) << 12)
        | ((banks.1 as u32) << 10)
        | ((banks.0 as u32) << 8)
        | ((op as u32) & 0xff)
}

#[test]
fn header_fields_decode() {
    let inst = Instruction::new([header(0x1c0, 3, 0x1fff, (1, 2, 3)), 7, 8, 9]);

    assert_eq!(inst.op(), 0x1c0);
    assert_eq!(inst.out_bank(), BankId::BANK3);
    assert_eq!(inst.out_addr(), 0x1fff);
    assert_eq!(inst.op1_bank(), BankId::BANK1);
    assert_eq!(inst.op2_bank(), BankId::BANK2);
    assert_eq!(inst.op3_bank(), BankId::BANK3);
    assert_eq!(inst.bank1_index(), 7);
    assert_eq!(inst.bank2_index(), 8);
    assert_eq!(inst.bank3_index(), 9);
}

#[test]
fn reserved_header_bits_are_ignored() {
    let base = header(0x080, 1, 3, (1, 2, 0));
    let noisy = base | 1 << 16;

    let mut expected = Instruction::new([base, 0, 0, 0]);
    let decoded = Instruction::new([noisy, 0, 0, 0]);

    assert_eq!(decoded, expected);

    // Bit 16 never leaks into the opcode.
    expected = Instruction::new([header(0x180, 1, 3, (1, 2, 0)), 0, 0, 0]);
    assert_eq!(expected.op(), 0x180);
    assert_ne!(decoded.op(), 0x180);
}

#[test]
fn instruction_byte_round_trip() {
    let lanes = [header(0x095, 2, 42, (1, 2, 3)), 0x11, 0x22, 0x33];
    let inst = Instruction::new(lanes);

    assert_eq!(<[u32; 4]>::from(inst), lanes);
    assert_eq!(Instruction::from(inst.to_bytes()), inst);
}

#[test]
fn instruction_bytes_are_little_endian() {
    let inst = Instruction::new([0xaabbccdd, 1, 2, 3]);
    let bytes = inst.to_bytes();

    // Lane 0 re-packs with reserved bits cleared; the operand lanes are
    // verbatim.
    assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
    assert_eq!(&bytes[8..12], &[2, 0, 0, 0]);
    assert_eq!(&bytes[12..16], &[3, 0, 0, 0]);
}

#[test]
fn instruction_from_bytes_rejects_short_input() {
    assert!(Instruction::from_bytes(&[0u8; 15]).is_err());
    assert!(Instruction::from_bytes(&[0u8; 16]).is_ok());
}

#[test]
fn bank_id_wraps_to_two_bits() {
    assert_eq!(BankId::new(0x07), BankId::BANK3);
    assert_eq!(BankId::new(0xfc), BankId::BANK0);
}

#[test]
fn opcode_raw_round_trip() {
    for raw in 0..0x400u16 {
        if let Ok(op) = Opcode::try_from(raw) {
            assert_eq!(RawOpcode::from(op), raw, "opcode {raw:#05x}");
        }
    }
}

#[rstest]
#[case(0x000, Opcode::FracMult)]
#[case(0x080, Opcode::Add)]
#[case(0x08d, Opcode::Zero)]
#[case(0x095, Opcode::Pdm(PdmKind::Pdm1))]
#[case(0x09a, Opcode::Pdm(PdmKind::Pdm6))]
#[case(0x0a0, Opcode::Take)]
#[case(0x0ed, Opcode::F32Fmt)]
#[case(0x1c0, Opcode::Fadd)]
#[case(0x1d8, Opcode::Fmultsub)]
#[case(0x2e0, Opcode::Mult(31))]
#[case(0x2ff, Opcode::Mult(0))]
fn opcode_decodes(#[case] raw: RawOpcode, #[case] expected: Opcode) {
    assert_eq!(Opcode::try_from(raw), Ok(expected));
}

#[rstest]
#[case(0x001)]
#[case(0x07f)]
#[case(0x0a3)]
#[case(0x0a7)]
#[case(0x0bf)]
#[case(0x0e2)]
#[case(0x1c8)]
#[case(0x1d5)]
#[case(0x1d9)]
#[case(0x2df)]
#[case(0x300)]
#[case(0x3ff)]
fn opcode_rejects_unassigned_values(#[case] raw: RawOpcode) {
    assert_eq!(Opcode::try_from(raw), Err(InvalidOpcode));
}

#[test]
fn port_opcodes_are_flagged() {
    let mut ports = 0;

    for raw in 0..0x400u16 {
        if let Ok(op) = Opcode::try_from(raw) {
            if op.is_port_access() {
                assert!((0x0a0..=0x0a6).contains(&raw));
                ports += 1;
            }
        }
    }

    assert_eq!(ports, 6);
}

#[test]
fn pdm_kinds_cover_the_family() {
    let kinds: Vec<PdmKind> = PdmKind::iter().collect();

    assert_eq!(kinds.len(), 6);

    for (offset, kind) in kinds.into_iter().enumerate() {
        assert_eq!(kind.index(), offset);
        assert_eq!(
            Opcode::try_from(0x095 + offset as RawOpcode),
            Ok(Opcode::Pdm(kind))
        );
    }
}
