use crate::domain::ToolchainKind;
use serde::{Deserialize, Serialize};

/// Invocation recipe for one compiler. `program` plus `extra_args` is
/// everything deployment-specific; the harness itself appends the
/// read-from-stdin and output-path arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolchainConfig {
    pub kind: ToolchainKind,
    pub program: String,
    #[serde(rename = "extraArgs", default)]
    pub extra_args: Vec<String>,
}

impl ToolchainConfig {
    /// GCC defaults: permissive front end with the stylistic warning
    /// classes silenced so surviving diagnostics carry signal.
    pub fn gcc_default() -> Self {
        Self {
            kind: ToolchainKind::Gcc,
            program: "g++".to_string(),
            extra_args: [
                "-fpermissive",
                "-Wno-attributes",
                "-Wno-unknown-pragmas",
                "-Wno-unused-parameter",
                "-Wno-unused-variable",
                "-Wno-unused-function",
                "-Wno-return-type",
            ]
            .iter()
            .map(|argument| argument.to_string())
            .collect(),
        }
    }

    /// Clang defaults: same noise suppression (no `-fpermissive`
    /// equivalent), caret art and color codes disabled so stderr stays
    /// machine-parseable.
    pub fn clang_default() -> Self {
        Self {
            kind: ToolchainKind::Clang,
            program: "clang++".to_string(),
            extra_args: [
                "-Wno-unknown-attributes",
                "-Wno-unknown-pragmas",
                "-Wno-unused-parameter",
                "-Wno-unused-variable",
                "-Wno-unused-function",
                "-Wno-return-type",
                "-fno-caret-diagnostics",
                "-fno-diagnostics-color",
            ]
            .iter()
            .map(|argument| argument.to_string())
            .collect(),
        }
    }
}

impl Serialize for ToolchainKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ToolchainKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            other => Err(serde::de::Error::custom(format!(
                "unknown toolchain kind '{}', expected 'gcc' or 'clang'",
                other
            ))),
        }
    }
}
