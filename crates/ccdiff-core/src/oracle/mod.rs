//! Differential verdicts and the end-to-end evaluation pipeline.
//!
//! The verdict for one candidate is decided in a fixed order: crash
//! detection, known-bug suppression, the compile bitmask gate, the
//! convertibility filter, and finally fingerprint-based novelty. The
//! decision is computed purely from the compile outcomes; persistence
//! runs afterwards and can never change it.

mod report;

use crate::artifacts::ArtifactStore;
use crate::config::OracleConfig;
use crate::diagnostics::{
    Diagnostic, DiagnosticParser, MessageNormalizer, eliminate_convertible_mismatches,
    looks_like_ice,
};
use crate::domain::{
    CompileBitmask, CompileResultPair, OracleResult, TokenStream, ToolchainKind, Verdict,
};
use crate::fitness::{FitnessShaper, GenerationStats};
use crate::harness::CompilationHarness;
use crate::materialize::materialize;
use crate::novelty::{NoveltyTracker, fingerprint_strings};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything the external search process learns from one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub evaluation_id: String,
    pub verdict: Verdict,
    pub bitmask: CompileBitmask,
    pub fitness: f64,
    pub novel_bug: bool,
}

/// Verdict plus the evidence the persistence step renders into a
/// report. Carries the retained per-side diagnostics so the report
/// shows exactly what survived the convertibility filter.
#[derive(Debug)]
pub(crate) struct Decision {
    pub(crate) verdict: Verdict,
    pub(crate) fingerprint: Option<String>,
    pub(crate) ice_text: Option<String>,
    pub(crate) retained_gcc: Vec<Diagnostic>,
    pub(crate) retained_clang: Vec<Diagnostic>,
}

impl Decision {
    fn plain(verdict: Verdict) -> Self {
        Self {
            verdict,
            fingerprint: None,
            ice_text: None,
            retained_gcc: Vec::new(),
            retained_clang: Vec::new(),
        }
    }
}

/// Judges one pair of compile outcomes. Diagnostics are compared only
/// when exactly one toolchain succeeds; both-fail and both-succeed
/// outcomes are uninteresting by definition.
#[derive(Debug)]
pub struct DifferentialOracle {
    parser: DiagnosticParser,
    normalizer: MessageNormalizer,
    tracker: Arc<NoveltyTracker>,
}

impl DifferentialOracle {
    pub fn new(tracker: Arc<NoveltyTracker>) -> OracleResult<Self> {
        Ok(Self {
            parser: DiagnosticParser::new()?,
            normalizer: MessageNormalizer::new()?,
            tracker,
        })
    }

    pub fn verdict(&self, pair: &CompileResultPair) -> Verdict {
        self.decide(pair).verdict
    }

    pub(crate) fn decide(&self, pair: &CompileResultPair) -> Decision {
        let gcc_ice = looks_like_ice(ToolchainKind::Gcc, &pair.gcc.stderr);
        let clang_ice = looks_like_ice(ToolchainKind::Clang, &pair.clang.stderr);
        if gcc_ice || clang_ice {
            return self.decide_crash(pair, gcc_ice, clang_ice);
        }

        let bitmask = pair.bitmask();
        let Some(failing_side) = bitmask.failing_side() else {
            return Decision::plain(Verdict::Same);
        };

        if self
            .tracker
            .matches_known_bug(failing_side, &pair.outcome(failing_side).stderr)
        {
            return Decision::plain(Verdict::KnownBugSuppressed);
        }

        let gcc_diagnostics = self.parser.parse(&pair.gcc.stderr);
        let clang_diagnostics = self.parser.parse(&pair.clang.stderr);
        let (retained_gcc, retained_clang) =
            eliminate_convertible_mismatches(&gcc_diagnostics, &clang_diagnostics);

        let gcc_entries: Vec<String> = retained_gcc
            .iter()
            .filter_map(Diagnostic::fingerprint_entry)
            .collect();
        let clang_entries: Vec<String> = retained_clang
            .iter()
            .filter_map(Diagnostic::fingerprint_entry)
            .collect();
        if gcc_entries.is_empty() && clang_entries.is_empty() {
            return Decision::plain(Verdict::Same);
        }

        let gcc_fingerprint = fingerprint_strings(&gcc_entries);
        let clang_fingerprint = fingerprint_strings(&clang_entries);
        let pair_fingerprint = fingerprint_strings([format!(
            "SUCCESS_MISMATCH:{}:{}",
            gcc_fingerprint, clang_fingerprint
        )]);

        let verdict = if self.tracker.record_diff_fingerprint(&pair_fingerprint) {
            info!(
                fingerprint = %pair_fingerprint,
                bitmask = %bitmask,
                "novel success mismatch"
            );
            Verdict::SuccessMismatch
        } else {
            Verdict::Same
        };
        Decision {
            verdict,
            fingerprint: Some(pair_fingerprint),
            ice_text: None,
            retained_gcc,
            retained_clang,
        }
    }

    fn decide_crash(&self, pair: &CompileResultPair, gcc_ice: bool, clang_ice: bool) -> Decision {
        // Already-triaged crashes are suppressed before any
        // fingerprint is recorded.
        if (gcc_ice && self.tracker.matches_known_bug(ToolchainKind::Gcc, &pair.gcc.stderr))
            || (clang_ice
                && self
                    .tracker
                    .matches_known_bug(ToolchainKind::Clang, &pair.clang.stderr))
        {
            return Decision::plain(Verdict::KnownBugSuppressed);
        }

        let mut sections = Vec::new();
        if gcc_ice {
            sections.push(format!(
                "GCC_ICE\n{}",
                self.normalizer.normalize(&pair.gcc.stderr)
            ));
        }
        if clang_ice {
            sections.push(format!(
                "CLANG_ICE\n{}",
                self.normalizer.normalize(&pair.clang.stderr)
            ));
        }
        let ice_text = sections.join("\n");
        let fingerprint = fingerprint_strings([ice_text.as_str()]);

        let verdict = if self.tracker.record_ice_fingerprint(&fingerprint) {
            info!(fingerprint = %fingerprint, "novel internal compiler error");
            Verdict::Ice
        } else {
            Verdict::Same
        };
        Decision {
            verdict,
            fingerprint: Some(fingerprint),
            ice_text: Some(ice_text),
            retained_gcc: Vec::new(),
            retained_clang: Vec::new(),
        }
    }
}

/// The full pipeline behind one `evaluate` call: identifier binding,
/// dual compilation, the differential verdict, best-effort artifact
/// persistence, and fitness shaping. Never panics and never aborts
/// the caller's search loop; infrastructure failures degrade to
/// failed compile outcomes inside the harness.
#[derive(Debug)]
pub struct Oracle {
    harness: CompilationHarness,
    differential: DifferentialOracle,
    shaper: FitnessShaper,
    artifacts: ArtifactStore,
    tracker: Arc<NoveltyTracker>,
}

impl Oracle {
    pub fn from_config(config: &OracleConfig) -> OracleResult<Self> {
        let tracker = Arc::new(NoveltyTracker::new());
        for pattern in &config.gcc_known_bug_patterns {
            tracker.add_known_bug_pattern(ToolchainKind::Gcc, pattern);
        }
        for pattern in &config.clang_known_bug_patterns {
            tracker.add_known_bug_pattern(ToolchainKind::Clang, pattern);
        }
        Self::with_shared_state(config, tracker, Arc::new(GenerationStats::new()))
    }

    /// Builds an oracle sharing the novelty store and the generation
    /// counters with other pipeline instances, so parallel workers
    /// deduplicate against one fingerprint set and accumulate one
    /// population sum.
    pub fn with_shared_state(
        config: &OracleConfig,
        tracker: Arc<NoveltyTracker>,
        stats: Arc<GenerationStats>,
    ) -> OracleResult<Self> {
        Ok(Self {
            harness: CompilationHarness::new(
                config.gcc.clone(),
                config.clang.clone(),
                Duration::from_secs(config.compile_timeout_secs),
            ),
            differential: DifferentialOracle::new(Arc::clone(&tracker))?,
            shaper: FitnessShaper::with_stats(config.fitness, stats),
            artifacts: ArtifactStore::new(config.artifact_root.clone()),
            tracker,
        })
    }

    pub fn tracker(&self) -> &Arc<NoveltyTracker> {
        &self.tracker
    }

    pub fn harness(&self) -> &CompilationHarness {
        &self.harness
    }

    /// Evaluates one token stream end to end and returns the shaped
    /// fitness alongside the verdict.
    pub fn evaluate<R: Rng>(
        &self,
        stream: &TokenStream,
        generation: u64,
        population_size: usize,
        rng: &mut R,
    ) -> Evaluation {
        let evaluation_id = self.artifacts.next_evaluation_id();
        let source = materialize(stream, rng);
        let pair = self.harness.compile(
            &source.text,
            &self.artifacts.bin_path(&evaluation_id, ToolchainKind::Gcc),
            &self.artifacts.bin_path(&evaluation_id, ToolchainKind::Clang),
        );

        let decision = self.differential.decide(&pair);
        report::persist_decision(&self.artifacts, &evaluation_id, &source.text, &pair, &decision);

        let (fitness, novel_bug) = self.shaper.shape(
            stream.token_count(),
            stream.distinct_token_count(),
            decision.verdict,
            generation,
            population_size,
        );
        Evaluation {
            evaluation_id,
            verdict: decision.verdict,
            bitmask: pair.bitmask(),
            fitness,
            novel_bug,
        }
    }
}
