//! Differential compiler-testing oracle.
//!
//! An external search process proposes token streams; this crate
//! binds their identifier placeholders into concrete C++ sources,
//! compiles each source with two toolchains in parallel, judges the
//! pair of outcomes (crashes, one-sided rejections, flag-explainable
//! differences, previously seen defects), persists triage artifacts,
//! and shapes the result into a fitness value the search minimizes.

pub mod artifacts;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod fitness;
pub mod harness;
pub mod materialize;
pub mod novelty;
pub mod oracle;

pub use artifacts::ArtifactStore;
pub use config::{OracleConfig, OracleConfigError, load_oracle_config};
pub use domain::{
    CompileBitmask, CompileOutcome, CompileResultPair, MaterializedSource, OracleError,
    OracleErrorCategory, OracleResult, TokenStream, ToolchainKind, Verdict,
};
pub use fitness::{FitnessConfig, FitnessShaper, GenerationStats};
pub use harness::{CompilationHarness, ToolchainConfig};
pub use materialize::materialize;
pub use novelty::{NoveltyTracker, fingerprint_strings};
pub use oracle::{DifferentialOracle, Evaluation, Oracle};
