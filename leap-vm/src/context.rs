//! Register-file context.

use leap_asm::{BankId, Word, BANK_COUNT, BANK_SIZE};

use std::io;
use std::ops::Index;

/// One 64-entry bank of 32-bit words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bank([Word; BANK_SIZE]);

impl Bank {
    /// Word at `index`, or zero when the index is outside the bank.
    ///
    /// Out-of-range operand indices are defined to read as zero; they are
    /// not an error.
    pub fn fetch(&self, index: Word) -> Word {
        self.0.get(index as usize).copied().unwrap_or(0)
    }

    /// The bank contents as a word slice.
    pub fn as_words(&self) -> &[Word; BANK_SIZE] {
        &self.0
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self([0; BANK_SIZE])
    }
}

impl Index<usize> for Bank {
    type Output = Word;

    fn index(&self, index: usize) -> &Word {
        &self.0[index]
    }
}

impl From<[Word; BANK_SIZE]> for Bank {
    fn from(words: [Word; BANK_SIZE]) -> Self {
        Self(words)
    }
}

impl std::fmt::Debug for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Banks are mostly zero in practice; list only the occupied slots.
        let mut map = f.debug_map();

        for (index, word) in self.0.iter().enumerate() {
            if *word != 0 {
                map.entry(&index, &format_args!("{word:#010x}"));
            }
        }

        map.finish()
    }
}

/// The full register-file context: four banks of 64 words.
///
/// This is the sole mutable state of the coprocessor model; there are no
/// hidden registers, flags or accumulators. Bank 0 is never selected as an
/// output bank, so in practice it is read-only.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    banks: [Bank; BANK_COUNT],
}

impl Context {
    /// Size of the serialized form in bytes: four banks back-to-back, each
    /// 64 little-endian 32-bit words.
    pub const SERIALIZED_LEN: usize = BANK_COUNT * BANK_SIZE * 4;

    /// The bank selected by `id`.
    pub fn bank(&self, id: BankId) -> &Bank {
        &self.banks[usize::from(id)]
    }

    /// Writes `value` into the selected bank.
    ///
    /// The address is masked to the bank size, so out-of-range writes are
    /// impossible. Writes to bank 0 are discarded.
    pub fn store(&mut self, id: BankId, addr: u16, value: Word) {
        if id == BankId::BANK0 {
            return;
        }

        self.banks[usize::from(id)].0[addr as usize & (BANK_SIZE - 1)] = value;
    }

    /// Deserializes a context from its 1024-byte wire form.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SERIALIZED_LEN {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "The provided buffer is not big enough!",
            ));
        }

        let mut ctx = Self::default();
        let mut chunks = bytes.chunks_exact(4);

        for bank in ctx.banks.iter_mut() {
            for word in bank.0.iter_mut() {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(chunks.next().expect("length checked above"));
                *word = Word::from_le_bytes(buf);
            }
        }

        Ok(ctx)
    }

    /// Serializes the context into its 1024-byte wire form.
    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_LEN] {
        let mut bytes = [0u8; Self::SERIALIZED_LEN];
        let mut chunks = bytes.chunks_exact_mut(4);

        for bank in &self.banks {
            for word in &bank.0 {
                chunks
                    .next()
                    .expect("chunk count matches word count")
                    .copy_from_slice(&word.to_le_bytes());
            }
        }

        bytes
    }
}
