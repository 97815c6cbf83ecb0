//! Identifier binding for abstract token streams.
//!
//! The search process emits `Identifier` placeholders; this module
//! binds each one to a concrete name drawn from the pool of names
//! already used in the same stream, occasionally growing the pool.
//! Reuse is deliberate: redeclaration, shadowing and aliasing patterns
//! are what shake compiler front ends loose.

use crate::domain::{IDENTIFIER_PLACEHOLDER, MaterializedSource, TokenStream};
use rand::Rng;

pub const IDENTIFIER_PREFIX: &str = "X";

/// Binds every placeholder in `stream` to a concrete identifier.
///
/// With `cnt` identifiers allocated so far, a draw of `cnt` allocates
/// the next identifier `X{cnt}`; any smaller draw reuses that existing
/// index, so the pool stays contiguous and its growth is bounded by
/// the number of placeholders. The caller supplies the random source,
/// which makes materialization reproducible under a fixed seed.
pub fn materialize<R: Rng>(stream: &TokenStream, rng: &mut R) -> MaterializedSource {
    let mut cnt = 0usize;
    let mut text = String::new();

    for token in stream.tokens() {
        if token == IDENTIFIER_PLACEHOLDER {
            let draw = rng.gen_range(0..=cnt);
            let index = if draw == cnt {
                cnt += 1;
                cnt - 1
            } else {
                draw
            };
            text.push_str(IDENTIFIER_PREFIX);
            text.push_str(&index.to_string());
        } else {
            text.push_str(token);
        }
        text.push(' ');
    }

    MaterializedSource {
        text,
        distinct_identifiers: cnt,
    }
}
