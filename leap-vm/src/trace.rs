//! Execution-trace records and conformance replay.
//!
//! Hardware captures are streams of fixed-size records: the register-file
//! context before an instruction, the instruction itself, and the context
//! the device produced. Replaying a stream runs every instruction through
//! the model and tallies how many predictions match the capture.

use crate::context::Context;
use crate::interpreter::Interpreter;

use leap_asm::{Instruction, Word};

use rand::seq::SliceRandom;
use rand::Rng;

use std::io::{self, Read, Write};

/// One captured execution: context, instruction, resulting context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Register-file context before execution.
    pub before: Context,
    /// Raw instruction lanes, kept verbatim for reporting.
    pub instruction: [Word; 4],
    /// Register-file context captured after execution.
    pub after: Context,
}

impl TraceRecord {
    /// Serialized record size: two contexts around one instruction.
    pub const LEN: usize = 2 * Context::SERIALIZED_LEN + Instruction::LEN;

    /// Reads one record from the stream.
    ///
    /// Returns `Ok(None)` on a clean end of stream at a record boundary;
    /// a record cut short mid-way is an `UnexpectedEof` error.
    pub fn read_from(reader: &mut impl Read) -> io::Result<Option<Self>> {
        let mut buf = [0u8; Self::LEN];
        let mut filled = 0;

        while filled < buf.len() {
            match reader.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        match filled {
            0 => Ok(None),
            n if n < Self::LEN => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated record: got {n} of {} bytes", Self::LEN),
            )),
            _ => Ok(Some(Self::from_bytes(&buf)?)),
        }
    }

    /// Deserializes a record from its 2064-byte wire form.
    pub fn from_bytes(bytes: &[u8; Self::LEN]) -> io::Result<Self> {
        let before = Context::from_bytes(&bytes[..Context::SERIALIZED_LEN])?;

        let mut instruction: [Word; 4] = [0; 4];
        let inst_bytes = &bytes[Context::SERIALIZED_LEN..Context::SERIALIZED_LEN + Instruction::LEN];

        for (lane, chunk) in instruction.iter_mut().zip(inst_bytes.chunks_exact(4)) {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            *lane = Word::from_le_bytes(word);
        }

        let after = Context::from_bytes(&bytes[Context::SERIALIZED_LEN + Instruction::LEN..])?;

        Ok(Self {
            before,
            instruction,
            after,
        })
    }
}

/// Tallied verdicts from replaying a capture against the model.
#[derive(Debug, Default, Clone)]
pub struct Replay {
    good: u64,
    not_implemented: u64,
    mismatched: Vec<[Word; 4]>,
}

impl Replay {
    /// Most mismatched instructions quoted in a report.
    pub const SAMPLE_LIMIT: usize = 30;

    /// Replays one record and tallies the verdict.
    pub fn check(&mut self, record: &TraceRecord) {
        let mut vm = Interpreter::new(record.before.clone());

        match vm.instruction(Instruction::new(record.instruction)) {
            Err(_) => self.not_implemented += 1,
            Ok(()) if *vm.context() == record.after => self.good += 1,
            Ok(()) => self.mismatched.push(record.instruction),
        }
    }

    /// Correctly predicted records.
    pub fn good(&self) -> u64 {
        self.good
    }

    /// Records whose predicted context differed from the capture.
    pub fn bad(&self) -> u64 {
        self.mismatched.len() as u64
    }

    /// Records the model refused to execute.
    pub fn not_implemented(&self) -> u64 {
        self.not_implemented
    }

    /// All replayed records.
    pub fn total(&self) -> u64 {
        self.good + self.bad() + self.not_implemented
    }

    /// Writes the summary, quoting up to [`Replay::SAMPLE_LIMIT`] randomly
    /// sampled mismatched instructions as four hex words.
    pub fn report(&self, out: &mut impl Write, rng: &mut impl Rng) -> io::Result<()> {
        if !self.mismatched.is_empty() {
            writeln!(out, "Some badly modeled instructions:")?;

            let mut sample = self.mismatched.clone();
            sample.shuffle(rng);

            for lanes in sample.iter().take(Self::SAMPLE_LIMIT) {
                writeln!(
                    out,
                    "\t{:x}, {:x}, {:x}, {:x}",
                    lanes[0], lanes[1], lanes[2], lanes[3]
                )?;
            }
        }

        writeln!(out, "{}/{}/{}", self.good(), self.bad(), self.total())
    }
}
