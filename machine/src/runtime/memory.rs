use thiserror::Error;

use crate::constants::{Address, Word, MEMORY_SIZE};

/// Represents errors related to memory accesses
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The given address does not exist
    #[error("invalid address {0}")]
    InvalidAddress(Address),
}

/// The memory of the machine: a fixed bank of [`MEMORY_SIZE`] words, all
/// zero until the loader or a running program writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    inner: [Word; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            inner: [0; MEMORY_SIZE],
        }
    }
}

impl Memory {
    /// Get the word at the given address
    ///
    /// # Errors
    ///
    /// Fails if the address is out of bounds.
    pub fn get(&self, address: Address) -> Result<Word, MemoryError> {
        self.inner
            .get(address)
            .copied()
            .ok_or(MemoryError::InvalidAddress(address))
    }

    /// Get a mutable reference to the word at the given address
    ///
    /// # Errors
    ///
    /// Fails if the address is out of bounds.
    pub fn get_mut(&mut self, address: Address) -> Result<&mut Word, MemoryError> {
        self.inner
            .get_mut(address)
            .ok_or(MemoryError::InvalidAddress(address))
    }

    /// All the words in address order, for rendering
    #[must_use]
    pub fn as_slice(&self) -> &[Word] {
        &self.inner
    }
}
