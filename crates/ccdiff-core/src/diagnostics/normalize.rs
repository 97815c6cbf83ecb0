use crate::domain::{OracleError, OracleResult};
use regex::Regex;

/// Rewrites the volatile parts of a diagnostic message so equal
/// defects hash equally across runs: inline locations, filesystem
/// paths, addresses and literal integers all collapse to fixed
/// placeholders, and whitespace runs flatten to single spaces.
#[derive(Debug, Clone)]
pub struct MessageNormalizer {
    inline_location: Regex,
    path_fragment: Regex,
    hex_literal: Regex,
    decimal_literal: Regex,
    whitespace_run: Regex,
}

impl MessageNormalizer {
    pub fn new() -> OracleResult<Self> {
        Ok(Self {
            inline_location: compile(r"(<source>|<stdin>|[^:\n]+):\d+:\d+:")?,
            path_fragment: compile(r"([A-Za-z]:\\[^:\n]+|/[^:\n]+)")?,
            hex_literal: compile(r"0x[0-9a-fA-F]+")?,
            decimal_literal: compile(r"\b\d+\b")?,
            whitespace_run: compile(r"[ \t]+")?,
        })
    }

    pub fn normalize(&self, message: &str) -> String {
        if message.is_empty() {
            return String::new();
        }
        let unified = message.replace("\r\n", "\n").replace('\r', "\n");
        let step = self.inline_location.replace_all(&unified, "<loc>:");
        let step = self.path_fragment.replace_all(&step, "<path>");
        let step = self.hex_literal.replace_all(&step, "0x<hex>");
        let step = self.decimal_literal.replace_all(&step, "<n>");
        let step = self.whitespace_run.replace_all(&step, " ");
        step.trim().to_string()
    }
}

fn compile(pattern: &str) -> OracleResult<Regex> {
    Regex::new(pattern).map_err(|source| {
        OracleError::internal(
            "SYS.NORMALIZER_PATTERN",
            format!("failed to compile normalizer pattern '{}': {}", pattern, source),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::MessageNormalizer;

    fn normalizer() -> MessageNormalizer {
        MessageNormalizer::new().expect("builtin patterns should compile")
    }

    #[test]
    fn inline_locations_collapse_to_a_placeholder() {
        let normalizer = normalizer();
        assert_eq!(
            normalizer.normalize("<stdin>:12:7: previous declaration"),
            "<loc>: previous declaration"
        );
        assert_eq!(
            normalizer.normalize("<source>:3:1: in instantiation"),
            "<loc>: in instantiation"
        );
    }

    #[test]
    fn paths_addresses_and_integers_are_stripped() {
        let normalizer = normalizer();
        assert_eq!(
            normalizer.normalize("crash at 0xDEADbeef in /usr/lib/gcc/cc1plus"),
            "crash at 0x<hex> in <path>"
        );
        assert_eq!(
            normalizer.normalize("array size 4096 exceeds maximum 1024"),
            "array size <n> exceeds maximum <n>"
        );
    }

    #[test]
    fn whitespace_runs_flatten_and_edges_trim() {
        let normalizer = normalizer();
        assert_eq!(
            normalizer.normalize("  expected\t';'   after statement  "),
            "expected ';' after statement"
        );
    }

    #[test]
    fn equal_defects_normalize_equally_across_line_numbers() {
        let normalizer = normalizer();
        let first = normalizer.normalize("<stdin>:4:9: redefinition of 'X1'");
        let second = normalizer.normalize("<stdin>:131:2: redefinition of 'X1'");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalizer().normalize(""), "");
    }
}
