//! Structured diagnostics extracted from compiler stderr.

mod convertibility;
mod ice;
mod normalize;
mod parser;

pub use convertibility::eliminate_convertible_mismatches;
pub use ice::looks_like_ice;
pub use normalize::MessageNormalizer;
pub use parser::DiagnosticParser;

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
    FatalError,
}

impl Severity {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "note" => Some(Self::Note),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal error" => Some(Self::FatalError),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::FatalError => "fatal error",
        }
    }

    /// Comparison class: fatal errors fold into errors, notes fall
    /// out of differential judgement entirely.
    pub const fn class(self) -> SeverityClass {
        match self {
            Self::Warning => SeverityClass::Warning,
            Self::Error | Self::FatalError => SeverityClass::Error,
            Self::Note => SeverityClass::Other,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityClass {
    Warning,
    Error,
    Other,
}

impl SeverityClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Other => "other",
        }
    }

    pub const fn is_comparable(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// One parsed diagnostic line, scoped to a single compile outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// `file:line:col` join key, kept verbatim when present.
    pub location: Option<String>,
    pub severity: Severity,
    /// Message with the trailing option tag stripped, otherwise raw.
    pub base_message: String,
    /// Volatility-stripped form used for comparison and hashing.
    pub normalized_message: String,
    /// Trailing bracketed flag such as `-Wshadow` or `-fpermissive`.
    pub option_tag: Option<String>,
}

impl Diagnostic {
    /// The location-free string this diagnostic contributes to a
    /// novelty fingerprint; `None` for notes and other non-comparable
    /// severities. Locations are excluded on purpose: `<stdin>` vs
    /// `<source>` naming must not split fingerprints.
    pub fn fingerprint_entry(&self) -> Option<String> {
        let class = self.severity.class();
        if !class.is_comparable() {
            return None;
        }
        Some(format!("{}:{}", class.as_str(), self.normalized_message))
    }

    pub fn report_line(&self) -> String {
        format!(
            "{}: {}: {} [{}]",
            self.location.as_deref().unwrap_or("<noloc>"),
            self.severity,
            self.base_message,
            self.option_tag.as_deref().unwrap_or("")
        )
    }
}
