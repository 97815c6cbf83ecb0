use crate::domain::ToolchainKind;

/// Substrings that mark a GCC process crash rather than an ordinary
/// diagnostic. Matched case-insensitively against raw stderr.
const GCC_CRASH_SIGNATURES: [&str; 6] = [
    "internal compiler error",
    "please submit a full bug report",
    "please submit a bug report",
    "compiler error:",
    "segmentation fault",
    "stack dump",
];

/// Clang equivalents; the driver wraps frontend crashes in its own
/// `clang: error:` lines, and backend aborts surface as a fatal error.
const CLANG_CRASH_SIGNATURES: [&str; 6] = [
    "clang: error: unable to execute command",
    "clang: error: clang frontend command failed",
    "please submit a bug report",
    "stack dump",
    "segmentation fault",
    "fatal error: error in backend",
];

/// Crash classifier, checked before any diagnostic comparison: a
/// crash signature overrides normal diagnostic semantics regardless
/// of the compile bitmask.
pub fn looks_like_ice(kind: ToolchainKind, stderr_text: &str) -> bool {
    if stderr_text.is_empty() {
        return false;
    }
    let lowered = stderr_text.to_lowercase();
    let signatures: &[&str] = match kind {
        ToolchainKind::Gcc => &GCC_CRASH_SIGNATURES,
        ToolchainKind::Clang => &CLANG_CRASH_SIGNATURES,
    };
    signatures
        .iter()
        .any(|signature| lowered.contains(signature))
}

#[cfg(test)]
mod tests {
    use super::looks_like_ice;
    use crate::domain::ToolchainKind;

    #[test]
    fn gcc_ice_banner_is_flagged() {
        let stderr = "<stdin>:4:1: internal compiler error: in foo, at cp/parser.cc:123\n";
        assert!(looks_like_ice(ToolchainKind::Gcc, stderr));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(looks_like_ice(
            ToolchainKind::Gcc,
            "Segmentation Fault (core dumped)"
        ));
        assert!(looks_like_ice(
            ToolchainKind::Clang,
            "PLEASE submit a bug report to https://example.invalid/"
        ));
    }

    #[test]
    fn clang_backend_abort_is_a_crash() {
        assert!(looks_like_ice(
            ToolchainKind::Clang,
            "fatal error: error in backend: unsupported relocation"
        ));
    }

    #[test]
    fn ordinary_diagnostics_are_not_crashes() {
        let stderr = "<stdin>:1:5: error: expected ';' after expression\n";
        assert!(!looks_like_ice(ToolchainKind::Gcc, stderr));
        assert!(!looks_like_ice(ToolchainKind::Clang, stderr));
    }

    #[test]
    fn signature_lists_are_toolchain_specific() {
        let clang_only = "clang: error: clang frontend command failed with exit code 134";
        assert!(looks_like_ice(ToolchainKind::Clang, clang_only));
        assert!(!looks_like_ice(ToolchainKind::Gcc, clang_only));
    }

    #[test]
    fn empty_stderr_is_never_a_crash() {
        assert!(!looks_like_ice(ToolchainKind::Gcc, ""));
        assert!(!looks_like_ice(ToolchainKind::Clang, ""));
    }
}
