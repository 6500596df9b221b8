//! Digest computation using BLAKE3.

use crate::types::Digest;
use blake3::Hasher;

/// Key-derivation context for the empty-tree sentinel. Derivation keeps the
/// sentinel outside the plain content-hash domain: no file content can
/// produce it, not even a file whose bytes are the marker itself.
const EMPTY_SENTINEL_CONTEXT: &str = "deltatree 2026-08-31 empty-tree sentinel v1";

/// Compute the content digest for raw file bytes.
///
/// Byte-for-byte: no text decoding, no newline normalization. Same bytes
/// always yield the same digest on any platform.
pub fn hash_content(content: &[u8]) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(content);
    *hasher.finalize().as_bytes()
}

/// Combine two child digests into a parent digest.
///
/// parent = hash(left || right), concatenation of raw digest bytes.
pub fn combine(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(left);
    hasher.update(right);
    *hasher.finalize().as_bytes()
}

/// Sentinel leaf digest substituted when a tree is built from zero leaves.
///
/// Derived with a dedicated context string, so it cannot collide with
/// `hash_content` of any byte sequence. Changing the context invalidates
/// every stored snapshot root; callers must reset their snapshot store.
pub fn empty_sentinel() -> Digest {
    blake3::derive_key(EMPTY_SENTINEL_CONTEXT, b"empty")
}
