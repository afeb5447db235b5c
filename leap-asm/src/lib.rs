//! Atomic types of the LEAP signal coprocessor instruction set.
//!
//! A LEAP instruction is a 128-bit word made of four 32-bit little-endian
//! lanes. Lane 0 is a bit-field header selecting the opcode, the source
//! bank of each operand and the destination slot; lanes 1 to 3 carry one
//! operand index per register bank.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod instruction;
mod opcode;

#[cfg(test)]
mod encoding_tests;

pub use instruction::{BankId, Instruction};
pub use opcode::{InvalidOpcode, Opcode, PdmKind};

/// Register bank word type.
pub type Word = u32;

/// Raw 10-bit opcode value, `OPCODE2 << 8 | OPCODE1`.
pub type RawOpcode = u16;

/// Number of words in each register bank.
pub const BANK_SIZE: usize = 64;

/// Number of register banks addressable by an instruction.
pub const BANK_COUNT: usize = 4;
