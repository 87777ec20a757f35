use parse_display::Display;
use tracing::debug;

use crate::constants::{self as C, Address, Word};

use super::exception::Exception;
use super::Machine;

/// A decoded instruction word.
///
/// The high digits of a word select the operation, the low two digits are a
/// memory address operand. Codes outside the table decode to
/// [`Instruction::Unmapped`], which the machine treats exactly like `halt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Instruction {
    /// Consume the next input value and store it in memory
    #[display("read {0}")]
    Read(Address),

    /// Advance without any observable effect; the output channel is
    /// deliberately disconnected
    #[display("write {0}")]
    Write(Address),

    /// Copy a memory word into the accumulator
    #[display("load {0}")]
    Load(Address),

    /// Copy the accumulator into a memory word
    #[display("store {0}")]
    Store(Address),

    /// Add a memory word to the accumulator
    #[display("add {0}")]
    Add(Address),

    /// Subtract a memory word from the accumulator
    #[display("subtract {0}")]
    Subtract(Address),

    /// Divide the accumulator by a memory word, truncating toward zero
    #[display("divide {0}")]
    Divide(Address),

    /// Multiply the accumulator by a memory word
    #[display("multiply {0}")]
    Multiply(Address),

    /// Unconditional jump
    #[display("branch {0}")]
    Branch(Address),

    /// Jump if the accumulator is negative
    #[display("branchneg {0}")]
    BranchNeg(Address),

    /// Jump if the accumulator is zero
    #[display("branchzero {0}")]
    BranchZero(Address),

    /// Stop the machine
    #[display("halt")]
    Halt,

    /// Any operation code outside the table, carried for diagnostics
    #[display("unmapped {0}")]
    Unmapped(Word),
}

impl Instruction {
    /// Split a raw word into its operation and address digits.
    ///
    /// Division and remainder truncate toward zero, so a negative word can
    /// only produce a non-positive operation code, which is always
    /// unmapped.
    #[must_use]
    pub fn decode(word: Word) -> Self {
        let opcode = word / 100;
        let Ok(operand) = Address::try_from(word % 100) else {
            return Self::Unmapped(opcode);
        };

        match opcode {
            10 => Self::Read(operand),
            11 => Self::Write(operand),
            20 => Self::Load(operand),
            21 => Self::Store(operand),
            30 => Self::Add(operand),
            31 => Self::Subtract(operand),
            32 => Self::Divide(operand),
            33 => Self::Multiply(operand),
            40 => Self::Branch(operand),
            41 => Self::BranchNeg(operand),
            42 => Self::BranchZero(operand),
            43 => Self::Halt,
            _ => Self::Unmapped(opcode),
        }
    }

    /// Whether dispatching this instruction stops the run loop.
    ///
    /// Unmapped operation codes halt instead of faulting, so a word of
    /// zeros reached by a runaway counter stops the machine cleanly.
    #[must_use]
    pub fn halts(self) -> bool {
        matches!(self, Self::Halt | Self::Unmapped(_))
    }

    /// Execute the instruction against the machine state.
    ///
    /// Each arm settles the instruction counter itself: sequential
    /// instructions advance it, branches overwrite it, halting ones leave
    /// it in place. A failing arm returns before touching any state.
    pub(crate) fn execute(self, machine: &mut Machine) -> Result<(), Exception> {
        match self {
            Self::Read(address) => {
                let word = machine.next_input()?;
                debug!("Read input {} into address {}", word, address);
                let cell = machine.memory.get_mut(address)?;
                *cell = word;
                machine.registers.counter += 1;
            }

            Self::Write(_) => {
                machine.registers.counter += 1;
            }

            Self::Load(address) => {
                machine.registers.accumulator = machine.memory.get(address)?;
                machine.registers.counter += 1;
            }

            Self::Store(address) => {
                let cell = machine.memory.get_mut(address)?;
                *cell = machine.registers.accumulator;
                machine.registers.counter += 1;
            }

            Self::Add(address) => {
                let a = machine.registers.accumulator;
                let b = machine.memory.get(address)?;
                let result = bounded(a + b)?;
                debug!("{} + {} = {}", a, b, result);
                machine.registers.accumulator = result;
                machine.registers.counter += 1;
            }

            Self::Subtract(address) => {
                let a = machine.registers.accumulator;
                let b = machine.memory.get(address)?;
                let result = bounded(a - b)?;
                debug!("{} - {} = {}", a, b, result);
                machine.registers.accumulator = result;
                machine.registers.counter += 1;
            }

            Self::Divide(address) => {
                let a = machine.registers.accumulator;
                let b = machine.memory.get(address)?;
                if b == 0 {
                    return Err(Exception::DivisionByZero);
                }
                let result = bounded(a / b)?;
                debug!("{} / {} = {}", a, b, result);
                machine.registers.accumulator = result;
                machine.registers.counter += 1;
            }

            Self::Multiply(address) => {
                let a = machine.registers.accumulator;
                let b = machine.memory.get(address)?;
                let result = bounded(a * b)?;
                debug!("{} * {} = {}", a, b, result);
                machine.registers.accumulator = result;
                machine.registers.counter += 1;
            }

            Self::Branch(address) => {
                debug!("Jumping to address {}", address);
                machine.registers.counter = address;
            }

            Self::BranchNeg(address) => {
                if machine.registers.accumulator < 0 {
                    debug!("Jumping to address {}", address);
                    machine.registers.counter = address;
                } else {
                    machine.registers.counter += 1;
                }
            }

            Self::BranchZero(address) => {
                if machine.registers.accumulator == 0 {
                    debug!("Jumping to address {}", address);
                    machine.registers.counter = address;
                } else {
                    machine.registers.counter += 1;
                }
            }

            Self::Halt | Self::Unmapped(_) => {}
        }

        Ok(())
    }
}

/// Bounds-check a computed value before it reaches the accumulator.
///
/// Operands are themselves bounded, so the widest intermediate here is
/// 9999 * 9999, far from overflowing the underlying integer.
fn bounded(word: Word) -> Result<Word, Exception> {
    if C::valid_word(word) {
        Ok(word)
    } else {
        Err(Exception::Overflow(word))
    }
}
