use crate::constants::{Address, Word};

/// The register file of the machine.
///
/// Every cycle rewrites the instruction register and its decoded
/// opcode/operand digits; the accumulator and counter only change when an
/// instruction says so.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers {
    /// The single arithmetic register all computation flows through
    pub accumulator: Word,

    /// Address of the instruction currently being fetched
    pub counter: Address,

    /// The most recently fetched raw instruction word
    pub instruction: Word,

    /// Operation digits of the instruction register
    pub opcode: Word,

    /// Address digits of the instruction register
    pub operand: Word,
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "acc = {:+05} | ic = {:02} | ir = {:+05} | opcode = {:02} | operand = {:02}",
            self.accumulator, self.counter, self.instruction, self.opcode, self.operand
        )
    }
}
