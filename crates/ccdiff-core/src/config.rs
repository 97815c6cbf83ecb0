//! Deployment configuration for the oracle pipeline.
//!
//! Every field defaults, so an empty JSON object is a complete
//! configuration and the oracle runs out of the box against `g++` and
//! `clang++` on `PATH`.

use crate::fitness::FitnessConfig;
use crate::harness::ToolchainConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OracleConfig {
    #[serde(default = "ToolchainConfig::gcc_default")]
    pub gcc: ToolchainConfig,
    #[serde(default = "ToolchainConfig::clang_default")]
    pub clang: ToolchainConfig,
    /// Root under which `code_results/` and `results/` trees grow.
    #[serde(rename = "artifactRoot", default = "default_artifact_root")]
    pub artifact_root: PathBuf,
    #[serde(rename = "compileTimeoutSecs", default = "default_compile_timeout_secs")]
    pub compile_timeout_secs: u64,
    #[serde(default)]
    pub fitness: FitnessConfig,
    /// Message patterns for defects already triaged on the GCC side;
    /// matching stderr is suppressed instead of re-reported.
    #[serde(rename = "gccKnownBugPatterns", default)]
    pub gcc_known_bug_patterns: Vec<String>,
    #[serde(rename = "clangKnownBugPatterns", default)]
    pub clang_known_bug_patterns: Vec<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            gcc: ToolchainConfig::gcc_default(),
            clang: ToolchainConfig::clang_default(),
            artifact_root: default_artifact_root(),
            compile_timeout_secs: default_compile_timeout_secs(),
            fitness: FitnessConfig::default(),
            gcc_known_bug_patterns: Vec::new(),
            clang_known_bug_patterns: Vec::new(),
        }
    }
}

fn default_artifact_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_compile_timeout_secs() -> u64 {
    30
}

#[derive(Debug, thiserror::Error)]
pub enum OracleConfigError {
    #[error("failed to read oracle config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse oracle config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_oracle_config(config_path: impl AsRef<Path>) -> Result<OracleConfig, OracleConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| OracleConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| OracleConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{OracleConfig, OracleConfigError, load_oracle_config};
    use crate::domain::ToolchainKind;

    #[test]
    fn empty_object_is_a_complete_configuration() {
        let config: OracleConfig = serde_json::from_str("{}").expect("defaults should fill in");
        assert_eq!(config, OracleConfig::default());
        assert_eq!(config.gcc.kind, ToolchainKind::Gcc);
        assert_eq!(config.compile_timeout_secs, 30);
    }

    #[test]
    fn overrides_replace_only_what_they_name() {
        let config: OracleConfig = serde_json::from_str(
            r#"{
                "gcc": {"kind": "gcc", "program": "g++-16"},
                "compileTimeoutSecs": 120,
                "gccKnownBugPatterns": ["tree check: expected"]
            }"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.gcc.program, "g++-16");
        assert_eq!(config.clang.program, "clang++");
        assert_eq!(config.compile_timeout_secs, 120);
        assert_eq!(config.gcc_known_bug_patterns.len(), 1);
        assert!(config.clang_known_bug_patterns.is_empty());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = OracleConfig::default();
        let encoded = serde_json::to_string_pretty(&config).expect("config should serialize");
        let decoded: OracleConfig =
            serde_json::from_str(&encoded).expect("config should deserialize");
        assert_eq!(decoded, config);
    }

    #[test]
    fn loader_distinguishes_read_and_parse_failures() {
        let scratch = tempfile::tempdir().expect("tempdir should be available");

        let missing = scratch.path().join("missing.json");
        let error = load_oracle_config(&missing).expect_err("missing file should fail");
        assert!(matches!(error, OracleConfigError::Read { .. }));

        let malformed = scratch.path().join("malformed.json");
        std::fs::write(&malformed, "{not json").expect("setup write should succeed");
        let error = load_oracle_config(&malformed).expect_err("malformed file should fail");
        assert!(matches!(error, OracleConfigError::Parse { .. }));
    }
}
