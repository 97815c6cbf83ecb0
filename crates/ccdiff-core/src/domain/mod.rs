pub mod errors;

pub use errors::{OracleError, OracleErrorCategory, OracleResult};

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Token the external search process emits wherever a variable name
/// should be bound during materialization.
pub const IDENTIFIER_PLACEHOLDER: &str = "Identifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainKind {
    Gcc,
    Clang,
}

impl ToolchainKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
        }
    }
}

impl Display for ToolchainKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Ordered token sequence received from the search process. Immutable
/// once constructed; metrics are computed over the raw tokens, before
/// identifier binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<String>,
}

impl TokenStream {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Splits a space-separated phenotype string the way the search
    /// process serializes it.
    pub fn from_phenotype(phenotype: &str) -> Self {
        Self {
            tokens: phenotype.split(' ').map(str::to_owned).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn distinct_token_count(&self) -> usize {
        self.tokens
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Concrete source text produced by identifier binding, owned by a
/// single evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedSource {
    pub text: String,
    pub distinct_identifiers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub kind: ToolchainKind,
    pub succeeded: bool,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResultPair {
    pub gcc: CompileOutcome,
    pub clang: CompileOutcome,
}

impl CompileResultPair {
    pub fn bitmask(&self) -> CompileBitmask {
        CompileBitmask::from_flags(self.gcc.succeeded, self.clang.succeeded)
    }

    pub fn outcome(&self, kind: ToolchainKind) -> &CompileOutcome {
        match kind {
            ToolchainKind::Gcc => &self.gcc,
            ToolchainKind::Clang => &self.clang,
        }
    }
}

/// Two-bit success summary: bit 0 is the GCC side, bit 1 the Clang
/// side. Fully determined by the pair of outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompileBitmask(u8);

impl CompileBitmask {
    pub const BOTH_FAILED: Self = Self(0);
    pub const GCC_ONLY: Self = Self(1);
    pub const CLANG_ONLY: Self = Self(2);
    pub const BOTH_SUCCEEDED: Self = Self(3);

    pub const fn from_flags(gcc_succeeded: bool, clang_succeeded: bool) -> Self {
        Self((gcc_succeeded as u8) | ((clang_succeeded as u8) << 1))
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// True only when exactly one toolchain succeeded.
    pub const fn is_differential(self) -> bool {
        matches!(self.0, 1 | 2)
    }

    /// The toolchain that rejected the source, when exactly one did.
    pub const fn failing_side(self) -> Option<ToolchainKind> {
        match self.0 {
            1 => Some(ToolchainKind::Clang),
            2 => Some(ToolchainKind::Gcc),
            _ => None,
        }
    }
}

impl Display for CompileBitmask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Oracle decision for one candidate. This crate implements the
/// compare-only-on-one-succeeds-one-fails policy, so every diagnostic
/// mismatch reported here is a `SuccessMismatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Same,
    KnownBugSuppressed,
    Ice,
    SuccessMismatch,
}

impl Verdict {
    /// A fresh, previously-unseen discrepancy worth reporting.
    pub const fn is_novel(self) -> bool {
        matches!(self, Self::Ice | Self::SuccessMismatch)
    }

    pub const fn class_label(self) -> &'static str {
        match self {
            Self::Same => "SAME",
            Self::KnownBugSuppressed => "KNOWN_BUG",
            Self::Ice => "ICE",
            Self::SuccessMismatch => "SUCCESS_MISMATCH",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).class_label())
    }
}
