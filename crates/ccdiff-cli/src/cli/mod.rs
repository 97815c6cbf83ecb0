mod commands;

use ccdiff_core::domain::OracleError;
use clap::Parser;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let oracle_error = error.as_oracle_error();
            eprintln!("{}", oracle_error.diagnostic_line());
            oracle_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "ccdiff-rs", about = "Differential compiler-testing oracle")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate one token stream end to end and print the result
    Evaluate(commands::EvaluateArgs),
    /// Probe both configured toolchains with an empty translation unit
    Doctor(commands::DoctorArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Evaluate(args) => commands::run_evaluate_command(args),
        CliCommand::Doctor(args) => commands::run_doctor_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(OracleError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_oracle_error(&self) -> OracleError {
        match self {
            Self::Usage(message) => {
                OracleError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => OracleError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
