mod check;
mod completion;
mod run;

#[derive(clap::Subcommand)]
pub enum Subcommand {
    /// Load a program and run it against a stream of inputs
    Run(self::run::RunOpt),

    /// Load a program and dump its memory image without running it
    Check(self::check::CheckOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Subcommand::Run(opt) => opt.exec(),
            Subcommand::Check(opt) => opt.exec(),
            Subcommand::Completion(opt) => {
                opt.exec();
                Ok(())
            }
        }
    }
}
