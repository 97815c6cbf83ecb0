//! Dual-toolchain compilation harness.
//!
//! Each compiler runs as a filter: source text goes in through stdin,
//! diagnostics come back on stderr, exit status zero means the
//! translation unit was accepted. Infrastructure failures (missing
//! binary, broken pipe, timeout) degrade to a failed outcome with the
//! failure text standing in for stderr; they are never surfaced as
//! errors to the pipeline.

mod toolchain;

pub use toolchain::ToolchainConfig;

use crate::domain::{CompileOutcome, CompileResultPair, ToolchainKind};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct CompilationHarness {
    gcc: ToolchainConfig,
    clang: ToolchainConfig,
    timeout: Duration,
}

impl CompilationHarness {
    pub fn new(gcc: ToolchainConfig, clang: ToolchainConfig, timeout: Duration) -> Self {
        Self { gcc, clang, timeout }
    }

    pub fn with_defaults(timeout: Duration) -> Self {
        Self::new(
            ToolchainConfig::gcc_default(),
            ToolchainConfig::clang_default(),
            timeout,
        )
    }

    pub fn gcc(&self) -> &ToolchainConfig {
        &self.gcc
    }

    pub fn clang(&self) -> &ToolchainConfig {
        &self.clang
    }

    /// Compiles `source` with both toolchains in parallel. Each side
    /// writes its object file to its own path so the two processes
    /// never contend on one output.
    pub fn compile(
        &self,
        source: &str,
        gcc_output: &Path,
        clang_output: &Path,
    ) -> CompileResultPair {
        let (gcc, clang) = thread::scope(|scope| {
            let clang_task = scope
                .spawn(|| invoke_toolchain(&self.clang, source, clang_output, self.timeout));
            let gcc = invoke_toolchain(&self.gcc, source, gcc_output, self.timeout);
            let clang = clang_task.join().unwrap_or_else(|_| CompileOutcome {
                kind: self.clang.kind,
                succeeded: false,
                stderr: "toolchain invocation thread panicked".to_string(),
            });
            (gcc, clang)
        });

        CompileResultPair { gcc, clang }
    }

    /// Feeds each toolchain an empty translation unit and reports
    /// whether it accepted the input, for preflight checks.
    pub fn probe(&self) -> Vec<(ToolchainKind, CompileOutcome)> {
        let scratch = std::env::temp_dir().join(format!("ccdiff-probe-{}", std::process::id()));
        let mut outcomes = Vec::with_capacity(2);
        for config in [&self.gcc, &self.clang] {
            let outcome = invoke_toolchain(config, "", &scratch, self.timeout);
            outcomes.push((config.kind, outcome));
        }
        let _ = std::fs::remove_file(&scratch);
        outcomes
    }
}

fn invoke_toolchain(
    config: &ToolchainConfig,
    source: &str,
    output_path: &Path,
    timeout: Duration,
) -> CompileOutcome {
    debug!(
        toolchain = config.kind.as_str(),
        program = %config.program,
        "invoking toolchain"
    );

    let mut command = Command::new(&config.program);
    command
        .args(&config.extra_args)
        .args(["-x", "c++", "-c", "-", "-o"])
        .arg(output_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source_error) => {
            return CompileOutcome {
                kind: config.kind,
                succeeded: false,
                stderr: format!(
                    "failed to start toolchain '{}': {}",
                    config.program, source_error
                ),
            };
        }
    };

    // Drain stderr on its own thread before feeding stdin, otherwise a
    // compiler that fills the stderr pipe deadlocks against our write.
    let stderr_pipe = child.stderr.take();
    let stderr_reader = thread::spawn(move || {
        let mut captured = String::new();
        if let Some(mut pipe) = stderr_pipe {
            let _ = pipe.read_to_string(&mut captured);
        }
        captured
    });

    if let Some(mut stdin) = child.stdin.take() {
        // A compiler that rejects input early closes the pipe; the
        // write error is then irrelevant because the exit status and
        // stderr carry the real story.
        let _ = stdin.write_all(source.as_bytes());
    }

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(wait_error) => {
                let stderr = stderr_reader.join().unwrap_or_default();
                return CompileOutcome {
                    kind: config.kind,
                    succeeded: false,
                    stderr: format!(
                        "failed to wait for toolchain '{}': {}\n{}",
                        config.program, wait_error, stderr
                    ),
                };
            }
        }
    };

    let stderr = stderr_reader.join().unwrap_or_default();
    match status {
        Some(status) => CompileOutcome {
            kind: config.kind,
            succeeded: status.success(),
            stderr,
        },
        None => CompileOutcome {
            kind: config.kind,
            succeeded: false,
            stderr: format!(
                "toolchain '{}' exceeded the {}s compile timeout and was killed\n{}",
                config.program,
                timeout.as_secs(),
                stderr
            ),
        },
    }
}
