use thiserror::Error;

use crate::constants::Word;

use super::memory::MemoryError;

/// A fault raised while executing an instruction. None of these are
/// recoverable: the machine stops at the faulting cycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// A computed result or consumed input that does not fit in a word
    #[error("word out of bounds: {0}")]
    Overflow(Word),

    #[error("division by zero")]
    DivisionByZero,

    /// A `read` instruction ran with no input left to consume
    #[error("input stream exhausted")]
    InputExhausted,

    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),
}
