//! On-disk artifact layout and best-effort persistence.
//!
//! Everything written here is a side effect for later human triage;
//! the decision path never depends on these writes succeeding, so
//! every failure is logged and swallowed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::domain::ToolchainKind;

/// Per-process tiebreaker for evaluations landing in the same
/// microsecond.
static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Timestamp-based identifier distinguishing one evaluation from
    /// every other in this process.
    pub fn next_evaluation_id(&self) -> String {
        let sequence = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let (seconds, micros) = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => (elapsed.as_secs(), elapsed.subsec_micros()),
            Err(_) => (0, 0),
        };
        format!("{}-{:06}-{:04}", seconds, micros, sequence)
    }

    pub fn code_path(&self, evaluation_id: &str) -> PathBuf {
        self.root
            .join("code_results")
            .join("code")
            .join(format!("{}.cpp", evaluation_id))
    }

    /// Object-file output path. Each toolchain gets its own file so
    /// the parallel invocations never contend on one output.
    pub fn bin_path(&self, evaluation_id: &str, kind: ToolchainKind) -> PathBuf {
        let file_name = match kind {
            ToolchainKind::Gcc => evaluation_id.to_string(),
            ToolchainKind::Clang => format!("{}_clang", evaluation_id),
        };
        self.root.join("code_results").join("bin").join(file_name)
    }

    pub fn stderr_path(&self, evaluation_id: &str, kind: ToolchainKind) -> PathBuf {
        self.root
            .join("code_results")
            .join("bin")
            .join(format!("{}_{}_error.txt", evaluation_id, kind.as_str()))
    }

    pub fn report_path(&self, evaluation_id: &str, class_label: &str, fingerprint: &str) -> PathBuf {
        self.root
            .join("code_results")
            .join("differential_testing")
            .join(format!("{}_{}_{}.txt", evaluation_id, class_label, fingerprint))
    }

    pub fn bug_source_path(&self, evaluation_id: &str) -> PathBuf {
        self.triggering_source_path("bugs", evaluation_id)
    }

    pub fn ice_source_path(&self, evaluation_id: &str) -> PathBuf {
        self.triggering_source_path("ice", evaluation_id)
    }

    pub fn known_bug_source_path(&self, evaluation_id: &str) -> PathBuf {
        self.triggering_source_path("known_bugs", evaluation_id)
    }

    /// Campaign marker touched the first time a run sees a suppressed
    /// duplicate finding.
    pub fn duplicate_marker_path(&self) -> PathBuf {
        self.root.join("results").join("diff").join("diff_dup.txt")
    }

    /// Campaign marker touched the first time a run sees a novel
    /// finding.
    pub fn novel_marker_path(&self) -> PathBuf {
        self.root.join("results").join("diff").join("diff_new.txt")
    }

    /// Writes `contents`, creating parent directories as needed.
    /// Failures are logged and ignored; persistence never alters a
    /// verdict or a fitness value.
    pub fn write_best_effort(&self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                warn!(path = %path.display(), %error, "failed to create artifact directory");
                return;
            }
        }
        if let Err(error) = std::fs::write(path, contents) {
            warn!(path = %path.display(), %error, "failed to write artifact");
        }
    }

    /// Creates an empty marker file unless it already exists.
    pub fn touch_marker(&self, path: &Path) {
        if path.exists() {
            return;
        }
        self.write_best_effort(path, "");
    }

    fn triggering_source_path(&self, category: &str, evaluation_id: &str) -> PathBuf {
        self.root
            .join("results")
            .join(category)
            .join(format!("{}.cpp", evaluation_id))
    }
}
