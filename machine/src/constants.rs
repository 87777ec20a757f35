/// A machine word: the only data unit, constrained to [`WORD_MIN`, `WORD_MAX`]
pub type Word = i32;

/// An index into the machine memory
pub type Address = usize;

/// Total size of the machine memory, in words
pub const MEMORY_SIZE: Address = 100;

/// Smallest value a word can hold
pub const WORD_MIN: Word = -9999;

/// Largest value a word can hold
pub const WORD_MAX: Word = 9999;

/// Source line marking an early end of program; deliberately outside the
/// word range so it can never collide with a program word
pub const SENTINEL: Word = -99_999;

/// Check that a value fits in a machine word
#[must_use]
pub fn valid_word(word: Word) -> bool {
    (WORD_MIN..=WORD_MAX).contains(&word)
}
