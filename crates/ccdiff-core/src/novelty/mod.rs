//! Process-wide novelty bookkeeping.
//!
//! Every reported defect is fingerprinted; the tracker remembers every
//! fingerprint seen in this process so the same defect is reported at
//! most once per run. The store is an explicitly owned handle meant to
//! be shared (via `Arc`) across parallel pipeline instances; all
//! check-then-insert sequences are atomic under one lock.

use crate::domain::ToolchainKind;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Length of the hex digest prefix kept as a fingerprint.
const FINGERPRINT_HEX_LEN: usize = 16;

/// Stable digest over a set of normalized strings. Input ordering and
/// duplicates are irrelevant: entries are deduplicated and sorted
/// before hashing, and empty entries are excluded. An empty set maps
/// to the empty fingerprint, which callers use as an "anything left?"
/// signal.
pub fn fingerprint_strings<I, S>(entries: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let canonical: BTreeSet<String> = entries
        .into_iter()
        .map(|entry| entry.as_ref().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();
    if canonical.is_empty() {
        return String::new();
    }

    let joined = canonical.into_iter().collect::<Vec<_>>().join("\n");
    let digest = Sha256::digest(joined.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_HEX_LEN);
    for byte in digest.iter().take(FINGERPRINT_HEX_LEN / 2) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[derive(Debug, Default)]
struct NoveltyState {
    ice_fingerprints: HashSet<String>,
    diff_fingerprints: HashSet<String>,
    gcc_known_bug_patterns: Vec<Regex>,
    clang_known_bug_patterns: Vec<Regex>,
}

impl NoveltyState {
    fn patterns_for(&self, kind: ToolchainKind) -> &Vec<Regex> {
        match kind {
            ToolchainKind::Gcc => &self.gcc_known_bug_patterns,
            ToolchainKind::Clang => &self.clang_known_bug_patterns,
        }
    }

    fn patterns_for_mut(&mut self, kind: ToolchainKind) -> &mut Vec<Regex> {
        match kind {
            ToolchainKind::Gcc => &mut self.gcc_known_bug_patterns,
            ToolchainKind::Clang => &mut self.clang_known_bug_patterns,
        }
    }
}

#[derive(Debug, Default)]
pub struct NoveltyTracker {
    state: Mutex<NoveltyState>,
}

impl NoveltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an ICE fingerprint; returns true exactly once per
    /// fingerprint for the process lifetime.
    pub fn record_ice_fingerprint(&self, fingerprint: &str) -> bool {
        self.lock().ice_fingerprints.insert(fingerprint.to_string())
    }

    /// Records a diagnostic-difference fingerprint; same contract as
    /// [`Self::record_ice_fingerprint`].
    pub fn record_diff_fingerprint(&self, fingerprint: &str) -> bool {
        self.lock()
            .diff_fingerprints
            .insert(fingerprint.to_string())
    }

    /// Registers a message pattern for a defect already triaged on
    /// `kind`; subsequent matching stderr is suppressed instead of
    /// re-reported. Invalid patterns are skipped, not fatal.
    pub fn add_known_bug_pattern(&self, kind: ToolchainKind, pattern: &str) -> bool {
        match Regex::new(pattern) {
            Ok(compiled) => {
                self.lock().patterns_for_mut(kind).push(compiled);
                true
            }
            Err(error) => {
                warn!(
                    toolchain = kind.as_str(),
                    pattern, %error,
                    "skipping invalid known-bug pattern"
                );
                false
            }
        }
    }

    /// Any-match reduction over the pattern list for `kind`.
    pub fn matches_known_bug(&self, kind: ToolchainKind, stderr_text: &str) -> bool {
        self.lock()
            .patterns_for(kind)
            .iter()
            .any(|pattern| pattern.is_match(stderr_text))
    }

    pub fn ice_fingerprint_count(&self) -> usize {
        self.lock().ice_fingerprints.len()
    }

    pub fn diff_fingerprint_count(&self) -> usize {
        self.lock().diff_fingerprints.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NoveltyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
