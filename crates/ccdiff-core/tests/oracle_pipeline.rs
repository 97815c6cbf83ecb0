//! End-to-end pipeline runs against `sh` stand-in toolchains, so no
//! real compiler is needed.

use ccdiff_core::{
    GenerationStats, NoveltyTracker, Oracle, OracleConfig, TokenStream, ToolchainConfig,
    ToolchainKind, Verdict,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;

fn shell_toolchain(kind: ToolchainKind, script: &str) -> ToolchainConfig {
    ToolchainConfig {
        kind,
        program: "sh".to_string(),
        extra_args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
    }
}

fn config_with(root: &Path, gcc_script: &str, clang_script: &str) -> OracleConfig {
    OracleConfig {
        gcc: shell_toolchain(ToolchainKind::Gcc, gcc_script),
        clang: shell_toolchain(ToolchainKind::Clang, clang_script),
        artifact_root: root.to_path_buf(),
        compile_timeout_secs: 10,
        ..OracleConfig::default()
    }
}

fn files_under(directory: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(directory) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn accepted_candidate_scores_without_reporting() {
    let scratch = tempfile::tempdir().expect("tempdir should be available");
    let config = config_with(
        scratch.path(),
        "cat > /dev/null; exit 0",
        "cat > /dev/null; exit 0",
    );
    let oracle = Oracle::from_config(&config).expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);

    let stream = TokenStream::from_phenotype("int Identifier ;");
    let evaluation = oracle.evaluate(&stream, 0, 10, &mut rng);

    assert_eq!(evaluation.verdict, Verdict::Same);
    assert_eq!(evaluation.bitmask.value(), 3);
    assert!(!evaluation.novel_bug);
    // Both shape terms are negligible at token count 3 and distinct
    // count 3, so the score sits at the configured base.
    assert!((evaluation.fitness - 30.0).abs() < 1e-6);

    let code = std::fs::read_to_string(
        scratch
            .path()
            .join("code_results")
            .join("code")
            .join(format!("{}.cpp", evaluation.evaluation_id)),
    )
    .expect("materialized source should be persisted");
    assert_eq!(code, "int X0 ; ");

    assert!(files_under(&scratch.path().join("results").join("bugs")).is_empty());
    assert!(!scratch.path().join("results").join("diff").exists());
}

#[test]
fn crash_is_reported_once_and_then_deduplicated() {
    let scratch = tempfile::tempdir().expect("tempdir should be available");
    let config = config_with(
        scratch.path(),
        "cat > /dev/null; echo 'internal compiler error: in gimplify_expr, at gimplify.cc:12345' >&2; exit 1",
        "cat > /dev/null; exit 0",
    );
    let oracle = Oracle::from_config(&config).expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);
    let stream = TokenStream::from_phenotype("int Identifier ;");

    let first = oracle.evaluate(&stream, 0, 10, &mut rng);
    assert_eq!(first.verdict, Verdict::Ice);
    assert!(first.novel_bug);
    assert_eq!(first.fitness, 0.0);

    let reports_dir = scratch.path().join("code_results").join("differential_testing");
    let reports = files_under(&reports_dir);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("_ICE_"));
    let report = std::fs::read_to_string(reports_dir.join(&reports[0]))
        .expect("report should be readable");
    assert!(report.contains("diff_class: ICE"));
    assert!(report.contains("GCC_ICE"));
    assert!(report.contains("in gimplify_expr"));

    assert_eq!(
        files_under(&scratch.path().join("results").join("ice")).len(),
        1
    );
    assert!(scratch.path().join("results").join("diff").join("diff_new.txt").is_file());

    // Same crash text again: suppressed, no second report, and the
    // duplicate campaign marker appears.
    let second = oracle.evaluate(&stream, 0, 10, &mut rng);
    assert_eq!(second.verdict, Verdict::Same);
    assert!(!second.novel_bug);
    assert!(second.fitness > 0.0);
    assert_eq!(files_under(&reports_dir).len(), 1);
    assert!(scratch.path().join("results").join("diff").join("diff_dup.txt").is_file());
}

#[test]
fn one_sided_rejection_is_a_success_mismatch() {
    let scratch = tempfile::tempdir().expect("tempdir should be available");
    let config = config_with(
        scratch.path(),
        "cat > /dev/null; exit 0",
        "cat > /dev/null; echo '<stdin>:1:5: error: unknown type name' >&2; exit 1",
    );
    let oracle = Oracle::from_config(&config).expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);
    let stream = TokenStream::from_phenotype("int Identifier ;");

    let evaluation = oracle.evaluate(&stream, 0, 10, &mut rng);
    assert_eq!(evaluation.verdict, Verdict::SuccessMismatch);
    assert_eq!(evaluation.bitmask.value(), 1);
    assert!(evaluation.novel_bug);

    let reports = files_under(&scratch.path().join("code_results").join("differential_testing"));
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("_SUCCESS_MISMATCH_"));
    assert_eq!(
        files_under(&scratch.path().join("results").join("bugs")).len(),
        1
    );
    assert!(files_under(&scratch.path().join("results").join("ice")).is_empty());
}

#[test]
fn known_bug_pattern_routes_the_source_to_known_bugs() {
    let scratch = tempfile::tempdir().expect("tempdir should be available");
    let mut config = config_with(
        scratch.path(),
        "cat > /dev/null; exit 0",
        "cat > /dev/null; echo '<stdin>:1:5: error: unknown type name' >&2; exit 1",
    );
    config.clang_known_bug_patterns = vec!["unknown type name".to_string()];
    let oracle = Oracle::from_config(&config).expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);

    let stream = TokenStream::from_phenotype("int Identifier ;");
    let evaluation = oracle.evaluate(&stream, 0, 10, &mut rng);

    assert_eq!(evaluation.verdict, Verdict::KnownBugSuppressed);
    assert!(!evaluation.novel_bug);
    assert_eq!(
        files_under(&scratch.path().join("results").join("known_bugs")).len(),
        1
    );
    assert!(files_under(&scratch.path().join("code_results").join("differential_testing")).is_empty());
}

#[test]
fn agreeing_rejections_never_report() {
    let scratch = tempfile::tempdir().expect("tempdir should be available");
    let config = config_with(
        scratch.path(),
        "cat > /dev/null; echo '<stdin>:1:1: error: expected unqualified-id' >&2; exit 1",
        "cat > /dev/null; echo '<stdin>:1:1: error: expected expression' >&2; exit 1",
    );
    let oracle = Oracle::from_config(&config).expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);

    let stream = TokenStream::from_phenotype("int Identifier ;");
    let evaluation = oracle.evaluate(&stream, 0, 10, &mut rng);

    assert_eq!(evaluation.verdict, Verdict::Same);
    assert_eq!(evaluation.bitmask.value(), 0);
    assert!(!evaluation.novel_bug);
    assert!(files_under(&scratch.path().join("code_results").join("differential_testing")).is_empty());
    assert!(files_under(&scratch.path().join("results").join("bugs")).is_empty());
}

#[test]
fn workers_with_shared_state_deduplicate_each_other() {
    let scratch_a = tempfile::tempdir().expect("tempdir should be available");
    let scratch_b = tempfile::tempdir().expect("tempdir should be available");
    let crash_script =
        "cat > /dev/null; echo 'internal compiler error: in verify_gimple, at tree-cfg.cc:5674' >&2; exit 1";

    let tracker = Arc::new(NoveltyTracker::new());
    let stats = Arc::new(GenerationStats::new());
    let config_a = config_with(scratch_a.path(), crash_script, "cat > /dev/null; exit 0");
    let config_b = config_with(scratch_b.path(), crash_script, "cat > /dev/null; exit 0");
    let worker_a =
        Oracle::with_shared_state(&config_a, Arc::clone(&tracker), Arc::clone(&stats))
            .expect("oracle should build");
    let worker_b =
        Oracle::with_shared_state(&config_b, Arc::clone(&tracker), Arc::clone(&stats))
            .expect("oracle should build");
    let mut rng = StdRng::seed_from_u64(7);
    let stream = TokenStream::from_phenotype("int Identifier ;");

    // Worker A reports the crash; worker B sees the same crash text
    // and must treat it as a duplicate because the fingerprint store
    // is shared.
    let first = worker_a.evaluate(&stream, 0, 10, &mut rng);
    assert_eq!(first.verdict, Verdict::Ice);
    let second = worker_b.evaluate(&stream, 0, 10, &mut rng);
    assert_eq!(second.verdict, Verdict::Same);
    assert_eq!(tracker.ice_fingerprint_count(), 1);
    assert!(files_under(&scratch_b.path().join("results").join("ice")).is_empty());
}

#[test]
fn materialization_is_reproducible_under_one_seed() {
    let scratch_a = tempfile::tempdir().expect("tempdir should be available");
    let scratch_b = tempfile::tempdir().expect("tempdir should be available");
    let stream = TokenStream::from_phenotype(
        "int Identifier ; int Identifier ; Identifier = Identifier ;",
    );

    let mut sources = Vec::new();
    for scratch in [&scratch_a, &scratch_b] {
        let config = config_with(
            scratch.path(),
            "cat > /dev/null; exit 0",
            "cat > /dev/null; exit 0",
        );
        let oracle = Oracle::from_config(&config).expect("oracle should build");
        let mut rng = StdRng::seed_from_u64(99);
        let evaluation = oracle.evaluate(&stream, 0, 10, &mut rng);
        let code = std::fs::read_to_string(
            scratch
                .path()
                .join("code_results")
                .join("code")
                .join(format!("{}.cpp", evaluation.evaluation_id)),
        )
        .expect("materialized source should be persisted");
        sources.push(code);
    }
    assert_eq!(sources[0], sources[1]);
}
