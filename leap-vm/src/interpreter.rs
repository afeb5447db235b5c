//! One-instruction execution step.

use crate::arith::{avg_floor, half_diff_floor, median3, s32, sat_abs, sat_add, sat_sub, w32};
use crate::context::Context;
use crate::error::ExecuteError;
use crate::float::Float;
use crate::pdm;

use leap_asm::{BankId, Instruction, Opcode, Word};

/// Executes LEAP instructions against a register-file context.
///
/// Each [`Interpreter::instruction`] call is a pure function of the owned
/// context and the instruction: it mutates at most one bank slot and keeps
/// no other state, so independent interpreters may run in parallel without
/// synchronization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Interpreter {
    context: Context,
}

impl Interpreter {
    /// Wraps a register-file context for execution.
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// The current register-file context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Releases the register-file context.
    pub fn into_context(self) -> Context {
        self.context
    }

    /// Executes a single instruction.
    ///
    /// On success the result lands in the destination slot selected by the
    /// header (discarded when the destination is bank 0). A refused opcode
    /// leaves the context untouched.
    pub fn instruction(&mut self, inst: Instruction) -> Result<(), ExecuteError> {
        tracing::trace!(
            op = format_args!("{:#05x}", inst.op()),
            out_bank = inst.out_bank().to_u8(),
            out_addr = inst.out_addr(),
            op1_bank = inst.op1_bank().to_u8(),
            op2_bank = inst.op2_bank().to_u8(),
            op3_bank = inst.op3_bank().to_u8(),
            "decoded instruction"
        );

        // Bank 0 is the zero sentinel; banks 1..=3 read the slot their
        // index lane points at.
        let fetched = [
            0,
            self.context.bank(BankId::BANK1).fetch(inst.bank1_index()),
            self.context.bank(BankId::BANK2).fetch(inst.bank2_index()),
            self.context.bank(BankId::BANK3).fetch(inst.bank3_index()),
        ];

        let op1 = fetched[usize::from(inst.op1_bank())];
        let op2 = fetched[usize::from(inst.op2_bank())];
        let op3 = fetched[usize::from(inst.op3_bank())];

        let opcode =
            Opcode::try_from(inst.op()).map_err(|_| ExecuteError::NotImplemented(inst.op()))?;

        let out = execute(opcode, op1, op2, op3).ok_or(ExecuteError::PortAccess(inst.op()))?;

        self.context.store(inst.out_bank(), inst.out_addr(), out);

        Ok(())
    }
}

/// Computes the result of `opcode` over the fetched operands, or `None`
/// for the I/O port opcodes the model refuses to execute.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn execute(opcode: Opcode, op1: Word, op2: Word, op3: Word) -> Option<Word> {
    let out = match opcode {
        Opcode::FracMult => ((s32(op2) as i64 * s32(op3) as i64) >> 31) as Word,
        Opcode::Add => w32(sat_add(s32(op1), s32(op2))),
        Opcode::AddDiv2 => w32(avg_floor(s32(op1), s32(op2))),
        Opcode::Sub => w32(sat_sub(s32(op2), s32(op1))),
        Opcode::SubDiv2 => w32(half_diff_floor(s32(op2), s32(op1))),
        Opcode::AddUns => op1.wrapping_add(op2),
        Opcode::Abs => w32(sat_abs(s32(op1))),
        Opcode::Max => w32(s32(op1).max(s32(op2))),
        Opcode::Min => w32(s32(op1).min(s32(op2))),
        Opcode::Mux => {
            if op3 >> 31 != 0 {
                op2
            } else {
                op1
            }
        }
        Opcode::And => op1 & op2,
        Opcode::Or => op1 | op2,
        Opcode::Xor => op1 ^ op2,
        Opcode::Clr => !op1 & op2,
        Opcode::Zero | Opcode::Zero2 | Opcode::Zero3 | Opcode::Zero4 => 0,
        Opcode::Add2 | Opcode::Add3 | Opcode::Add4 => op1.wrapping_add(op2) & 0x7fff_ffff,
        Opcode::Clamp => w32(median3(s32(op1), s32(op2), s32(op3))),
        Opcode::Rot => op1.rotate_left(1),
        Opcode::Pdm(kind) => pdm::filter(kind, op1, op2),
        Opcode::Cmp => ((s32(op1) > s32(op2)) as Word) << 31,
        Opcode::Cmp2 => ((s32(op1) >= s32(op2)) as Word) << 31,
        Opcode::Eq => ((op1 == op2) as Word) << 31,
        Opcode::Sub2 => op2.wrapping_sub(op1) & 0x7fff_ffff,
        Opcode::Fcmp | Opcode::Fcmp2 => {
            let verdict = if Float::decode(op2).gt(Float::decode(op1)) {
                Float::ONE
            } else {
                Float::NEG_ONE
            };

            verdict.normalized().encode()
        }
        Opcode::Fmux => {
            let selected = if op3 >> 31 != 0 {
                Float::decode(op2)
            } else {
                Float::decode(op1)
            };

            selected.normalized().encode()
        }
        Opcode::F32Fmt => compose_float(op2, op3),
        Opcode::Fadd => (Float::decode(op1) + Float::decode(op2)).normalized().encode(),
        Opcode::FaddAbs => (Float::decode(op1) + Float::decode(op2))
            .abs()
            .normalized()
            .encode(),
        Opcode::FaddDiv2 => ((Float::decode(op1) + Float::decode(op2)) * Float::HALF)
            .normalized()
            .encode(),
        Opcode::Fsub => (Float::decode(op2) - Float::decode(op1)).normalized().encode(),
        Opcode::FsubAbs => (Float::decode(op2) - Float::decode(op1))
            .abs()
            .normalized()
            .encode(),
        Opcode::FsubDiv2 => ((Float::decode(op2) - Float::decode(op1)) * Float::HALF)
            .normalized()
            .encode(),
        Opcode::Fmult => (Float::decode(op2) * Float::decode(op3)).normalized().encode(),
        Opcode::FmultNeg => (Float::decode(op2) * Float::decode(op3) * Float::NEG_ONE)
            .normalized()
            .encode(),
        Opcode::Fmultacc => (Float::decode(op2) * Float::decode(op3) + Float::decode(op1))
            .normalized()
            .encode(),
        Opcode::FmultaccNeg => ((Float::decode(op2) * Float::decode(op3) + Float::decode(op1))
            * Float::NEG_ONE)
            .normalized()
            .encode(),
        Opcode::Fmultsub => (Float::decode(op1) - Float::decode(op2) * Float::decode(op3))
            .normalized()
            .encode(),
        Opcode::Mult(shift) => ((s32(op2) as i64 * s32(op3) as i64) >> shift) as Word,
        Opcode::Take
        | Opcode::Takec
        | Opcode::Peek
        | Opcode::Put
        | Opcode::Putc
        | Opcode::Update => return None,
    };

    Some(out)
}

/// Composes a float from an integer exponent operand and an integer
/// mantissa operand.
fn compose_float(exp_word: Word, mant_word: Word) -> Word {
    let exp = (s32(exp_word) >> 24) - 8;
    let sign: i128 = if mant_word >> 31 != 0 { -1 } else { 1 };
    let prec = s32(mant_word) as i128 * sign;

    // Crop mantissa bits past the format width up front; normalizing an
    // overwide mantissa would round them into the result.
    let shiftdown = (crate::float::bit_length(prec) - 24).max(0);

    Float::new(exp + shiftdown, (prec >> shiftdown) * sign)
        .normalized()
        .encode()
}
