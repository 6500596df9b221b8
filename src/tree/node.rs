//! Merkle tree node representation.

use crate::tree::hasher;
use crate::types::Digest;

/// A node in the Merkle tree.
///
/// Either a leaf wrapping one digest, or an internal node whose digest is
/// always `hash(left || right)` of its two children. Children are owned
/// exclusively (a tree, not a DAG).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleNode {
    Leaf {
        digest: Digest,
    },
    Internal {
        digest: Digest,
        left: Box<MerkleNode>,
        right: Box<MerkleNode>,
    },
}

impl MerkleNode {
    /// Wrap a digest as a leaf node.
    pub fn leaf(digest: Digest) -> Self {
        MerkleNode::Leaf { digest }
    }

    /// Build a parent node from two children.
    ///
    /// The parent digest is derived from the children and never assigned
    /// independently.
    pub fn parent(left: MerkleNode, right: MerkleNode) -> Self {
        let digest = hasher::combine(left.digest(), right.digest());
        MerkleNode::Internal {
            digest,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The digest summarizing this node.
    pub fn digest(&self) -> &Digest {
        match self {
            MerkleNode::Leaf { digest } => digest,
            MerkleNode::Internal { digest, .. } => digest,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MerkleNode::Leaf { .. })
    }
}
