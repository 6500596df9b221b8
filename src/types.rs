//! Core type aliases shared across the crate.

/// 256-bit content digest (BLAKE3 output).
pub type Digest = [u8; 32];

/// Length of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 32;
