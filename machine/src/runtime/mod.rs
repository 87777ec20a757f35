use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{self as C, Address, Word};

mod exception;
mod instructions;
mod memory;
mod registers;

pub use self::exception::Exception;
pub use self::instructions::Instruction;
pub use self::memory::{Memory, MemoryError};
pub use self::registers::Registers;

type Result<T> = std::result::Result<T, ExecutionError>;

/// An [`Exception`] annotated with the cycle that raised it: the
/// instruction counter and the raw word in the instruction register at the
/// moment of the fault.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("fault at address {counter:02}, instruction {instruction:+05}: {kind}")]
pub struct ExecutionError {
    pub counter: Address,
    pub instruction: Word,
    #[source]
    pub kind: Exception,
}

/// The machine: memory, registers, and the input stream for one program
/// run.
///
/// It owns all of its state. After [`Machine::run`] returns, with or
/// without an error, the final registers and memory stay readable for
/// rendering or diagnostics.
#[derive(Clone, Default)]
pub struct Machine {
    pub registers: Registers,
    pub memory: Memory,

    /// Values handed to `read` instructions, in order
    inputs: Vec<Word>,

    /// Index of the next unconsumed input
    cursor: usize,

    /// Number of instructions dispatched so far
    pub cycles: usize,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Machine {{ registers: {:?}, memory: [...] }}",
            self.registers
        )
    }
}

impl Machine {
    /// Build a machine around a loaded memory image and the input values
    /// its `read` instructions will consume.
    #[must_use]
    pub fn new(memory: Memory, inputs: Vec<Word>) -> Self {
        Self {
            registers: Registers::default(),
            memory,
            inputs,
            cursor: 0,
            cycles: 0,
        }
    }

    /// Pop the next input value, bounds-checked like any other word the
    /// machine consumes. The cursor only moves on success.
    pub(crate) fn next_input(&mut self) -> std::result::Result<Word, Exception> {
        let word = self
            .inputs
            .get(self.cursor)
            .copied()
            .ok_or(Exception::InputExhausted)?;

        if !C::valid_word(word) {
            return Err(Exception::Overflow(word));
        }

        self.cursor += 1;
        Ok(word)
    }

    fn cycle(&mut self) -> std::result::Result<Instruction, Exception> {
        let word = self.memory.get(self.registers.counter)?;
        self.registers.instruction = word;
        self.registers.opcode = word / 100;
        self.registers.operand = word % 100;

        let instruction = Instruction::decode(word);
        debug!("Executing instruction \"{}\"", instruction);
        instruction.execute(self)?;
        self.cycles += 1;
        debug!("Register state {:?}", self.registers);
        Ok(instruction)
    }

    /// Run a single fetch-decode-execute cycle.
    ///
    /// Returns the decoded instruction so callers can observe what ran,
    /// and whether it halted the machine.
    ///
    /// # Errors
    ///
    /// Any [`Exception`] is wrapped with the counter and instruction
    /// register of the faulting cycle; the rest of the state is left
    /// exactly as the failed instruction found it.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Result<Instruction> {
        self.cycle().map_err(|kind| ExecutionError {
            counter: self.registers.counter,
            instruction: self.registers.instruction,
            kind,
        })
    }

    /// Run cycles until a halting instruction is dispatched.
    ///
    /// A program that never reaches `halt` or an unmapped word loops
    /// forever; callers that need a ceiling can drive [`Machine::step`]
    /// themselves.
    ///
    /// # Errors
    ///
    /// Stops at the first [`ExecutionError`]. Registers and memory keep
    /// their values from the faulting cycle for diagnostics.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> Result<()> {
        loop {
            let instruction = self.step()?;
            if instruction.halts() {
                info!(cycles = self.cycles, "Program halted");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn machine(program: &[Word], inputs: &[Word]) -> Machine {
        let mut memory = Memory::default();
        for (address, word) in program.iter().enumerate() {
            *memory.get_mut(address).unwrap() = *word;
        }
        Machine::new(memory, inputs.to_vec())
    }

    #[test]
    fn run_program_test() {
        // Read two numbers, add them, store and "write" the sum, halt
        let mut machine = machine(&[1007, 1008, 2007, 3008, 2109, 1109, 4300], &[4, 5]);
        machine.run().unwrap();

        assert_eq!(machine.memory.get(7), Ok(4));
        assert_eq!(machine.memory.get(8), Ok(5));
        assert_eq!(machine.memory.get(9), Ok(9));

        // The counter stays on the halt instruction
        assert_eq!(
            machine.registers,
            Registers {
                accumulator: 9,
                counter: 6,
                instruction: 4300,
                opcode: 43,
                operand: 0,
            }
        );
        assert_eq!(machine.cycles, 7);
    }

    #[test]
    fn step_test() {
        let mut machine = machine(&[1007, 4300], &[42]);

        let instruction = machine.step().unwrap();
        assert_eq!(instruction, Instruction::Read(7));
        assert!(!instruction.halts());
        assert_eq!(machine.memory.get(7), Ok(42));
        assert_eq!(machine.registers.counter, 1);

        let instruction = machine.step().unwrap();
        assert_eq!(instruction, Instruction::Halt);
        assert!(instruction.halts());
        assert_eq!(machine.registers.counter, 1);
    }

    #[test]
    fn arithmetic_test() {
        // a = 5 and b = 10; compute a+b, a-b, b/a and a*b in one program
        let mut machine = machine(
            &[
                1015, 1016, // read a, read b
                2015, 3016, 2117, // a + b -> 17
                2015, 3116, 2118, // a - b -> 18
                2016, 3215, 2119, // b / a -> 19
                2015, 3316, 2120, // a * b -> 20
                4300,
            ],
            &[5, 10],
        );
        machine.run().unwrap();

        assert_eq!(machine.memory.get(17), Ok(15));
        assert_eq!(machine.memory.get(18), Ok(-5));
        assert_eq!(machine.memory.get(19), Ok(2));
        assert_eq!(machine.memory.get(20), Ok(50));
        assert_eq!(machine.registers.accumulator, 50);
        assert_eq!(machine.registers.counter, 14);
    }

    #[test]
    fn overflow_test() {
        let mut machine = machine(&[1007, 1008, 2007, 3307, 4300], &[1000, 100]);
        let error = machine.run().unwrap_err();

        assert_eq!(
            error,
            ExecutionError {
                counter: 3,
                instruction: 3307,
                kind: Exception::Overflow(1_000_000),
            }
        );

        // The failing multiply left the accumulator and counter untouched
        assert_eq!(machine.registers.accumulator, 1000);
        assert_eq!(machine.registers.counter, 3);
        assert_eq!(
            error.to_string(),
            "fault at address 03, instruction +3307: word out of bounds: 1000000"
        );
    }

    #[test]
    fn branch_test() {
        // Store the larger of two inputs in address 22, clear of the code
        let program = [
            1020, 1021, // read a, read b
            2020, 3121, // acc = a - b
            4107, // negative? b is larger
            2020, 4008, // else keep a
            2021, // load b
            2122, 4300, // store the winner, halt
        ];

        let mut smaller_first = machine(&program, &[3, 5]);
        smaller_first.run().unwrap();
        assert_eq!(smaller_first.memory.get(22), Ok(5));
        assert_eq!(smaller_first.registers.counter, 9);
        assert_eq!(smaller_first.registers.instruction, 4300);

        let mut larger_first = machine(&program, &[7, 2]);
        larger_first.run().unwrap();
        assert_eq!(larger_first.memory.get(22), Ok(7));

        // Inputs that decode as instructions stay data: the halt still runs
        let mut tricky = machine(&program, &[1000, 2150]);
        tricky.run().unwrap();
        assert_eq!(tricky.memory.get(22), Ok(2150));
        assert_eq!(tricky.registers.instruction, 4300);
        assert_eq!(tricky.memory.get(50), Ok(0));

        // Exercises every branch both taken and fallen through. Any wrong
        // turn either stores 1 into the canary at address 20 or halts at a
        // different counter.
        let course = [
            2017, 4205, // acc = 0, branchzero taken
            2018, 2120, 4300, // poison the canary
            2018, 4209, // acc = 1, branchzero falls through
            4010, // unconditional
            4300, 4300, // landing here means a branch misfired
            3119, 4114, // acc = -1, branchneg taken
            2018, 2120, // poison the canary
            2017, 4118, // acc = 0, branchneg falls through
            4300, // the only correct exit
            0, 1, 2, // data
        ];
        let mut threaded = machine(&course, &[]);
        threaded.run().unwrap();
        assert_eq!(threaded.registers.counter, 16);
        assert_eq!(threaded.memory.get(20), Ok(0));
    }

    #[test]
    fn division_by_zero_test() {
        let mut machine = machine(&[2004, 3205, 4300, 0, 7, 0], &[]);
        let error = machine.run().unwrap_err();

        assert_eq!(
            error,
            ExecutionError {
                counter: 1,
                instruction: 3205,
                kind: Exception::DivisionByZero,
            }
        );
        assert_eq!(machine.registers.accumulator, 7);
    }

    #[test]
    fn input_exhausted_test() {
        let mut machine = machine(&[1007, 1008, 4300], &[5]);
        let error = machine.run().unwrap_err();

        assert_eq!(
            error,
            ExecutionError {
                counter: 1,
                instruction: 1008,
                kind: Exception::InputExhausted,
            }
        );

        // The first read landed, the second changed nothing
        assert_eq!(machine.memory.get(7), Ok(5));
        assert_eq!(machine.memory.get(8), Ok(0));
    }

    #[test]
    fn input_out_of_bounds_test() {
        let mut machine = machine(&[1007, 4300], &[10000]);
        let error = machine.run().unwrap_err();

        assert_eq!(
            error,
            ExecutionError {
                counter: 0,
                instruction: 1007,
                kind: Exception::Overflow(10000),
            }
        );
        assert_eq!(machine.memory.get(7), Ok(0));
    }

    #[test]
    fn counter_out_of_bounds_test() {
        // A memory full of writes runs the counter off the end
        let program = [1199; 100];
        let mut machine = machine(&program, &[]);
        let error = machine.run().unwrap_err();

        assert_eq!(error.counter, 100);
        assert_eq!(
            error.kind,
            Exception::InvalidMemoryAccess(MemoryError::InvalidAddress(100))
        );
        assert_eq!(machine.cycles, 100);
    }

    #[test]
    fn unmapped_opcode_halts_test() {
        let mut unmapped = machine(&[9901], &[]);
        let instruction = unmapped.step().unwrap();
        assert_eq!(instruction, Instruction::Unmapped(99));
        assert!(instruction.halts());
        assert_eq!(unmapped.registers.counter, 0);

        let mut negative = machine(&[-1234], &[]);
        negative.run().unwrap();
        assert_eq!(negative.registers.counter, 0);
        assert_eq!(negative.cycles, 1);
    }

    #[test]
    fn empty_machine_test() {
        // A zeroed memory decodes to an unmapped word and stops right away
        let mut machine = Machine::default();
        machine.run().unwrap();
        assert_eq!(machine.registers.counter, 0);
        assert_eq!(machine.cycles, 1);
    }

    #[test]
    fn write_is_noop_test() {
        let mut machine = machine(&[1007, 1008, 1108, 2007, 2109, 4300], &[5, 7]);
        machine.run().unwrap();

        // write only advances the counter, the surrounding state survives
        assert_eq!(machine.memory.get(7), Ok(5));
        assert_eq!(machine.memory.get(8), Ok(7));
        assert_eq!(machine.memory.get(9), Ok(5));
        assert_eq!(machine.registers.accumulator, 5);
        assert_eq!(machine.registers.counter, 5);
        assert_eq!(machine.registers.instruction, 4300);
    }

    #[test]
    fn determinism_test() {
        let mut first = machine(&[1007, 1008, 2007, 3008, 2109, 1109, 4300], &[17, 25]);
        let mut second = first.clone();

        first.run().unwrap();
        second.run().unwrap();

        assert_eq!(first.registers, second.registers);
        assert_eq!(first.memory, second.memory);
    }
}
