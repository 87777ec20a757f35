//! Console rendering of the machine state.

use std::fmt;

use computron_machine::Machine;

/// Formats the memory grid and register block of a machine.
///
/// Pure presentation: rows of ten words, sign always shown, values padded
/// to four digits, then the labeled registers underneath.
pub struct Dump<'a>(pub &'a Machine);

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let machine = self.0;

        writeln!(f, "Memory:")?;
        write!(f, "  ")?;
        for col in 0..10 {
            write!(f, "{col:>6}")?;
        }
        writeln!(f)?;

        for (row, words) in machine.memory.as_slice().chunks(10).enumerate() {
            write!(f, "{:>2}", row * 10)?;
            for word in words {
                write!(f, " {word:+05}")?;
            }
            writeln!(f)?;
        }

        let registers = &machine.registers;
        writeln!(f)?;
        writeln!(f, "Registers:")?;
        writeln!(f, "{:<22}{:+05}", "accumulator", registers.accumulator)?;
        writeln!(f, "{:<22}{:02}", "instruction counter", registers.counter)?;
        writeln!(f, "{:<22}{:+05}", "instruction register", registers.instruction)?;
        writeln!(f, "{:<22}{:02}", "opcode", registers.opcode)?;
        writeln!(f, "{:<22}{:02}", "operand", registers.operand)
    }
}

#[cfg(test)]
mod tests {
    use computron_machine::load_program;

    use super::*;

    #[test]
    fn dump_test() {
        let source = indoc::indoc! {"
            1007
            1008
            2007
            3008
            2109
            1109
            4300
        "};

        let memory = load_program(source).unwrap();
        let mut machine = Machine::new(memory, vec![4, 5]);
        machine.run().unwrap();

        insta::assert_snapshot!(Dump(&machine).to_string(), @r"
        Memory:
               0     1     2     3     4     5     6     7     8     9
         0 +1007 +1008 +2007 +3008 +2109 +1109 +4300 +0004 +0005 +0009
        10 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        20 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        30 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        40 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        50 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        60 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        70 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        80 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000
        90 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000

        Registers:
        accumulator           +0009
        instruction counter   06
        instruction register  +4300
        opcode                43
        operand               00
        ");
    }

    #[test]
    fn dump_layout_test() {
        let dump = Dump(&Machine::default()).to_string();
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 19);
        assert_eq!(lines[0], "Memory:");
        assert_eq!(
            lines[2],
            " 0 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000"
        );
        assert_eq!(
            lines[11],
            "90 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000 +0000"
        );
        assert_eq!(lines[14], "accumulator           +0000");
        assert_eq!(lines[15], "instruction counter   00");
    }
}
