use super::CliError;
use anyhow::Context;
use ccdiff_core::{Oracle, OracleConfig, TokenStream, load_oracle_config};
use ccdiff_core::domain::OracleError;
use ccdiff_core::harness::CompilationHarness;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

#[derive(clap::Args)]
pub(super) struct EvaluateArgs {
    /// Token stream file, space-separated; reads stdin when omitted
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Generation identifier supplied by the search process
    #[arg(long, default_value_t = 0)]
    generation: u64,

    /// Population size of the current generation
    #[arg(long, default_value_t = 1)]
    population: usize,

    /// Oracle configuration path (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible identifier binding
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
pub(super) struct DoctorArgs {
    /// Oracle configuration path (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluationSummary<'a> {
    #[serde(rename = "evaluationId")]
    evaluation_id: &'a str,
    verdict: &'static str,
    bitmask: u8,
    fitness: f64,
    #[serde(rename = "novelBug")]
    novel_bug: bool,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let phenotype = read_phenotype(args.tokens.as_deref())?;
    let stream = TokenStream::from_phenotype(phenotype.trim_end_matches('\n'));

    tracing::debug!(
        token_count = stream.token_count(),
        generation = args.generation,
        "evaluating token stream"
    );
    let oracle = Oracle::from_config(&config).map_err(CliError::Compute)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let evaluation = oracle.evaluate(&stream, args.generation, args.population, &mut rng);

    let summary = EvaluationSummary {
        evaluation_id: &evaluation.evaluation_id,
        verdict: evaluation.verdict.class_label(),
        bitmask: evaluation.bitmask.value(),
        fitness: evaluation.fitness,
        novel_bug: evaluation.novel_bug,
    };
    let rendered = serde_json::to_string(&summary).context("rendering evaluation summary")?;
    println!("{}", rendered);
    Ok(0)
}

pub(super) fn run_doctor_command(args: DoctorArgs) -> Result<i32, CliError> {
    let config = load_config(args.config.as_deref())?;
    let harness = CompilationHarness::new(
        config.gcc.clone(),
        config.clang.clone(),
        Duration::from_secs(config.compile_timeout_secs),
    );

    let mut all_accepted = true;
    for (kind, outcome) in harness.probe() {
        if outcome.succeeded {
            println!("{}: ok ({})", kind, program_for(&config, kind));
        } else {
            all_accepted = false;
            println!("{}: FAILED ({})", kind, program_for(&config, kind));
            for line in outcome.stderr.lines() {
                println!("  {}", line);
            }
        }
    }
    Ok(if all_accepted { 0 } else { 1 })
}

fn program_for(config: &OracleConfig, kind: ccdiff_core::ToolchainKind) -> &str {
    match kind {
        ccdiff_core::ToolchainKind::Gcc => &config.gcc.program,
        ccdiff_core::ToolchainKind::Clang => &config.clang.program,
    }
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<OracleConfig, CliError> {
    match config_path {
        Some(path) => load_oracle_config(path).map_err(|error| {
            CliError::Compute(OracleError::input_validation(
                "INPUT.ORACLE_CONFIG",
                error.to_string(),
            ))
        }),
        None => Ok(OracleConfig::default()),
    }
}

fn read_phenotype(tokens_path: Option<&std::path::Path>) -> Result<String, CliError> {
    match tokens_path {
        Some(path) => std::fs::read_to_string(path).map_err(|error| {
            CliError::Compute(OracleError::io_system(
                "IO.TOKEN_STREAM_READ",
                format!("failed to read token stream '{}': {}", path.display(), error),
            ))
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|error| {
                    CliError::Compute(OracleError::io_system(
                        "IO.TOKEN_STREAM_READ",
                        format!("failed to read token stream from stdin: {}", error),
                    ))
                })?;
            Ok(buffer)
        }
    }
}
