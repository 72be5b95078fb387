//! Command-line interface for sumc.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sumc_core::{CDialect, DataModel, LoweringConfig};
use target_lexicon::Triple;

#[derive(Parser)]
#[command(name = "sumc")]
#[command(about = "Lower sum type declarations to C", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lower a declaration unit to a C source file
    Lower {
        /// JSON file with the declaration unit
        input: PathBuf,
        /// Where to write the C source (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the tag table of a declaration unit as JSON
    Tags {
        input: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// C standard of the output: c89, c99, c11, c17, c23 or auto
    #[arg(long = "std", default_value = "auto")]
    pub dialect: CDialect,
    /// Target triple; decides integer spellings for c89 (host if omitted)
    #[arg(long)]
    pub target: Option<Triple>,
    /// Prefix of the boolean shim's include guard
    #[arg(long, default_value = "SUMC")]
    pub guard_prefix: String,
}

impl TargetArgs {
    pub fn config(&self) -> LoweringConfig {
        let data_model = match &self.target {
            Some(triple) => DataModel::from_triple(triple),
            None => DataModel::host(),
        };
        LoweringConfig::default()
            .with_dialect(self.dialect)
            .with_data_model(data_model)
            .with_guard_prefix(&self.guard_prefix)
    }
}
