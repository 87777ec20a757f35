use std::fs;
use std::process::exit;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, ValueHint};
use computron_machine::{load_program, Machine};
use miette::NamedSource;
use tracing::{debug, info};

use crate::dump::Dump;

#[derive(Parser, Debug)]
pub struct CheckOpt {
    /// Program file, one word per line
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,
}

impl CheckOpt {
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

        info!("Program loads cleanly");
        print!("{}", Dump(&Machine::new(memory, Vec::new())));
        Ok(())
    }
}
