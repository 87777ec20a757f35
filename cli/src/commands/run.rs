use std::fs;
use std::process::exit;

use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueHint};
use computron_machine::constants::Word;
use computron_machine::{load_program, Machine};
use miette::NamedSource;
use tracing::{debug, info};

use crate::dump::Dump;

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// Program file, one word per line
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,

    /// Queue a value for the `read` instructions to consume. Can be used
    /// multiple times.
    #[clap(short, long = "input", value_name = "WORD", allow_negative_numbers = true)]
    inputs: Vec<Word>,

    /// Abort if the program has not halted after this many cycles
    #[clap(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Skip the memory and register dump at the end of the run
    #[clap(long, action = ArgAction::SetTrue)]
    no_dump: bool,
}

impl RunOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        info!(path = ?self.program, "Reading program");
        let source = fs::read_to_string(&self.program)
            .with_context(|| format!("could not read program from {}", self.program))?;

        debug!("Loading program");
        let memory = match load_program(&source) {
            Ok(memory) => memory,
            Err(e) => {
                let report = miette::Report::new(e)
                    .with_source_code(NamedSource::new(self.program.as_str(), source));
                eprintln!("{report:?}");
                exit(1);
            }
        };

        debug!(inputs = self.inputs.len(), "Building machine");
        let mut machine = Machine::new(memory, self.inputs);

        info!("Running program");
        let result = match self.max_steps {
            Some(limit) => run_bounded(&mut machine, limit),
            None => machine.run().map_err(Into::into),
        };

        info!(registers = %machine.registers, "End of program");

        // Dump even after a fault: the final state is the diagnostic
        if !self.no_dump {
            print!("{}", Dump(&machine));
        }

        result
    }
}

/// Drive the machine step by step with a cycle ceiling.
fn run_bounded(machine: &mut Machine, limit: u64) -> anyhow::Result<()> {
    for _ in 0..limit {
        if machine.step()?.halts() {
            return Ok(());
        }
    }
    bail!("program has not halted after {limit} cycles")
}
