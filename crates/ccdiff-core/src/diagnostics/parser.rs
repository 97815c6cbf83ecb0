use super::{Diagnostic, MessageNormalizer, Severity};
use crate::domain::{OracleError, OracleResult};
use regex::Regex;

/// Line-oriented parser for GCC/Clang stderr. Two shapes are
/// recognized, `file:line:col: severity: message` and
/// `severity: message`; anything else is skipped silently because
/// compiler stderr is best-effort territory (caret art, include
/// stacks, partial lines from a crashing process).
#[derive(Debug, Clone)]
pub struct DiagnosticParser {
    located_line: Regex,
    bare_line: Regex,
    option_tag: Regex,
    normalizer: MessageNormalizer,
}

impl DiagnosticParser {
    pub fn new() -> OracleResult<Self> {
        Ok(Self {
            located_line: compile(
                r"^(?P<file>.*?):(?P<line>\d+):(?P<col>\d+):\s*(?P<sev>fatal error|error|warning|note):\s*(?P<msg>.*)$",
            )?,
            bare_line: compile(r"^(?P<sev>fatal error|error|warning|note):\s*(?P<msg>.*)$")?,
            option_tag: compile(r"(?:\s*\[(?P<opt>-[^\]]+)\]\s*)$")?,
            normalizer: MessageNormalizer::new()?,
        })
    }

    pub fn parse(&self, stderr_text: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for line in stderr_text.lines() {
            if let Some(captures) = self.located_line.captures(line) {
                let location = format!(
                    "{}:{}:{}",
                    &captures["file"], &captures["line"], &captures["col"]
                );
                if let Some(diagnostic) =
                    self.build(Some(location), &captures["sev"], &captures["msg"])
                {
                    diagnostics.push(diagnostic);
                }
                continue;
            }

            if let Some(captures) = self.bare_line.captures(line) {
                if let Some(diagnostic) = self.build(None, &captures["sev"], &captures["msg"]) {
                    diagnostics.push(diagnostic);
                }
            }
        }
        diagnostics
    }

    fn build(
        &self,
        location: Option<String>,
        severity_keyword: &str,
        message: &str,
    ) -> Option<Diagnostic> {
        let severity = Severity::from_keyword(severity_keyword)?;
        let (base_message, option_tag) = self.split_option_tag(message);
        let normalized_message = self.normalizer.normalize(&base_message);
        Some(Diagnostic {
            location,
            severity,
            base_message,
            normalized_message,
            option_tag,
        })
    }

    /// Splits a trailing `[-Wshadow]`-style tag off the message body.
    fn split_option_tag(&self, message: &str) -> (String, Option<String>) {
        match self.option_tag.captures(message) {
            Some(captures) => {
                let tag = captures["opt"].to_string();
                let tag_start = captures
                    .get(0)
                    .map_or(message.len(), |whole| whole.start());
                (message[..tag_start].trim_end().to_string(), Some(tag))
            }
            None => (message.trim().to_string(), None),
        }
    }
}

fn compile(pattern: &str) -> OracleResult<Regex> {
    Regex::new(pattern).map_err(|source| {
        OracleError::internal(
            "SYS.DIAGNOSTIC_PATTERN",
            format!("failed to compile diagnostic pattern '{}': {}", pattern, source),
        )
    })
}
