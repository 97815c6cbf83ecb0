//! Flag-explainable severity-flip elimination.
//!
//! A warning on one toolchain and an error on the other is only a
//! genuine discrepancy when no supported compiler flag could align
//! them. Warnings tagged with a warning category can be promoted by
//! `-Werror=...`; errors tagged `-fpermissive` or `-Werror...` can be
//! demoted. Pairs where either direction applies are removed from
//! both sides before novelty fingerprinting.

use super::{Diagnostic, SeverityClass};
use std::collections::{HashMap, HashSet};

/// A warning with a category tag can be raised to an error under
/// stricter warning flags. A bare `-Werror` tag on a warning carries
/// no category and is not promotable evidence.
fn warning_promotable(option_tag: Option<&str>) -> bool {
    option_tag.is_some_and(|tag| tag.starts_with("-W") && tag != "-Werror")
}

/// An error that only exists because of `-Werror...`, or that GCC
/// would accept under `-fpermissive`, can be lowered to a warning.
fn error_demotable(option_tag: Option<&str>) -> bool {
    option_tag.is_some_and(|tag| tag == "-fpermissive" || tag.starts_with("-Werror"))
}

/// Removes cross-toolchain pairs that qualify as flag-explainable:
/// same location, warning on one side and error on the other, equal
/// normalized message, and convertibility evidence on at least one
/// side. Returns the surviving diagnostics of both sides.
pub fn eliminate_convertible_mismatches(
    gcc_diagnostics: &[Diagnostic],
    clang_diagnostics: &[Diagnostic],
) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
    let clang_by_location = index_by_location(clang_diagnostics);

    let mut gcc_dropped: HashSet<usize> = HashSet::new();
    let mut clang_dropped: HashSet<usize> = HashSet::new();

    for (gcc_index, gcc_diagnostic) in gcc_diagnostics.iter().enumerate() {
        let Some(location) = gcc_diagnostic.location.as_deref() else {
            continue;
        };
        let Some(clang_indices) = clang_by_location.get(location) else {
            continue;
        };
        for &clang_index in clang_indices {
            let clang_diagnostic = &clang_diagnostics[clang_index];
            if is_convertible_pair(gcc_diagnostic, clang_diagnostic) {
                gcc_dropped.insert(gcc_index);
                clang_dropped.insert(clang_index);
            }
        }
    }

    (
        retain_surviving(gcc_diagnostics, &gcc_dropped),
        retain_surviving(clang_diagnostics, &clang_dropped),
    )
}

fn is_convertible_pair(gcc_diagnostic: &Diagnostic, clang_diagnostic: &Diagnostic) -> bool {
    let gcc_class = gcc_diagnostic.severity.class();
    let clang_class = clang_diagnostic.severity.class();
    let severity_flip = matches!(
        (gcc_class, clang_class),
        (SeverityClass::Warning, SeverityClass::Error)
            | (SeverityClass::Error, SeverityClass::Warning)
    );
    if !severity_flip {
        return false;
    }
    if gcc_diagnostic.normalized_message != clang_diagnostic.normalized_message {
        return false;
    }

    let (warning_side, error_side) = if gcc_class == SeverityClass::Warning {
        (gcc_diagnostic, clang_diagnostic)
    } else {
        (clang_diagnostic, gcc_diagnostic)
    };
    warning_promotable(warning_side.option_tag.as_deref())
        || error_demotable(error_side.option_tag.as_deref())
}

fn index_by_location(diagnostics: &[Diagnostic]) -> HashMap<&str, Vec<usize>> {
    let mut by_location: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if let Some(location) = diagnostic.location.as_deref() {
            by_location.entry(location).or_default().push(index);
        }
    }
    by_location
}

fn retain_surviving(diagnostics: &[Diagnostic], dropped: &HashSet<usize>) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .enumerate()
        .filter(|(index, _)| !dropped.contains(index))
        .map(|(_, diagnostic)| diagnostic.clone())
        .collect()
}
