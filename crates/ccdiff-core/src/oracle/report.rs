//! Human-readable finding reports and the persistence step.
//!
//! Verdicts are decided before anything lands on disk; this module is
//! the isolated, failure-tolerant side-effect stage that runs after.

use super::Decision;
use crate::artifacts::ArtifactStore;
use crate::domain::{CompileResultPair, ToolchainKind, Verdict};
use std::fmt::Write as _;

pub(super) fn persist_decision(
    artifacts: &ArtifactStore,
    evaluation_id: &str,
    source_text: &str,
    pair: &CompileResultPair,
    decision: &Decision,
) {
    artifacts.write_best_effort(&artifacts.code_path(evaluation_id), source_text);
    for kind in [ToolchainKind::Gcc, ToolchainKind::Clang] {
        artifacts.write_best_effort(
            &artifacts.stderr_path(evaluation_id, kind),
            &pair.outcome(kind).stderr,
        );
    }

    match decision.verdict {
        Verdict::Ice | Verdict::SuccessMismatch => {
            if let Some(fingerprint) = decision.fingerprint.as_deref() {
                artifacts.write_best_effort(
                    &artifacts.report_path(
                        evaluation_id,
                        decision.verdict.class_label(),
                        fingerprint,
                    ),
                    &render_report(pair, decision),
                );
            }
            artifacts.write_best_effort(&artifacts.bug_source_path(evaluation_id), source_text);
            if decision.verdict == Verdict::Ice {
                artifacts.write_best_effort(&artifacts.ice_source_path(evaluation_id), source_text);
            }
            artifacts.touch_marker(&artifacts.novel_marker_path());
        }
        Verdict::KnownBugSuppressed => {
            artifacts.write_best_effort(
                &artifacts.known_bug_source_path(evaluation_id),
                source_text,
            );
            artifacts.touch_marker(&artifacts.duplicate_marker_path());
        }
        Verdict::Same => {
            // A candidate that tripped at least one compiler without
            // producing anything new still marks the campaign as
            // having seen duplicates.
            if pair.bitmask() != crate::domain::CompileBitmask::BOTH_SUCCEEDED {
                artifacts.touch_marker(&artifacts.duplicate_marker_path());
            }
        }
    }
}

pub(super) fn render_report(pair: &CompileResultPair, decision: &Decision) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "diff_class: {}", decision.verdict.class_label());
    let _ = writeln!(report, "compiling_result: {}", pair.bitmask());
    if let Some(fingerprint) = decision.fingerprint.as_deref() {
        let _ = writeln!(report, "fingerprint: {}", fingerprint);
    }

    if let Some(ice_text) = decision.ice_text.as_deref() {
        let _ = writeln!(report);
        let _ = writeln!(report, "=== normalized crash text ===");
        let _ = writeln!(report, "{}", ice_text);
    }

    if decision.verdict == Verdict::SuccessMismatch {
        let _ = writeln!(report);
        let _ = writeln!(report, "=== gcc diagnostics kept after convertibility filtering ===");
        for diagnostic in &decision.retained_gcc {
            let _ = writeln!(report, "{}", diagnostic.report_line());
        }
        let _ = writeln!(report);
        let _ = writeln!(report, "=== clang diagnostics kept after convertibility filtering ===");
        for diagnostic in &decision.retained_clang {
            let _ = writeln!(report, "{}", diagnostic.report_line());
        }
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "=== raw gcc stderr ===");
    let _ = writeln!(report, "{}", pair.gcc.stderr);
    let _ = writeln!(report, "=== raw clang stderr ===");
    let _ = writeln!(report, "{}", pair.clang.stderr);
    report
}
