//! Merkle hash tree over an ordered list of file-content digests.
//!
//! The tree gives the whole snapshot a single summary digest so that the
//! common "nothing changed" case is a one-comparison fast path.

pub mod builder;
pub mod hasher;
pub mod node;

pub use builder::MerkleTree;
pub use node::MerkleNode;
