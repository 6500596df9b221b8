//! Merkle tree construction from an ordered list of leaf digests.

use crate::tree::hasher;
use crate::tree::node::MerkleNode;
use crate::types::Digest;
use tracing::trace;

/// A binary hash tree over an ordered list of leaf digests.
///
/// Built once per scan and immutable thereafter. Leaf order is significant:
/// combining the same digests in a different order produces a different
/// root, so callers must feed digests in the scanner's canonical
/// lexicographic-path order.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: MerkleNode,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build a tree from leaf digests.
    ///
    /// An empty input is replaced by a single sentinel leaf (a reserved
    /// derived digest) so the tree always has a well-defined root.
    /// Levels are reduced iteratively, pairing adjacent nodes; a level with
    /// an odd node count pairs the trailing node with a copy of itself.
    pub fn build(leaves: &[Digest]) -> Self {
        let leaf_count = leaves.len();

        let mut level: Vec<MerkleNode> = if leaves.is_empty() {
            vec![MerkleNode::leaf(hasher::empty_sentinel())]
        } else {
            leaves.iter().copied().map(MerkleNode::leaf).collect()
        };

        while level.len() > 1 {
            trace!(width = level.len(), "Reducing tree level");
            let mut next = Vec::with_capacity((level.len() + 1) / 2);
            let mut nodes = level.into_iter();

            while let Some(left) = nodes.next() {
                let right = match nodes.next() {
                    Some(node) => node,
                    // Odd node count: the trailing node is paired with itself.
                    None => left.clone(),
                };
                next.push(MerkleNode::parent(left, right));
            }

            level = next;
        }

        // The loop leaves exactly one node: the input starts non-empty and
        // each pass shrinks it until len == 1.
        let root = level.pop().unwrap_or_else(|| MerkleNode::leaf(hasher::empty_sentinel()));

        Self { root, leaf_count }
    }

    /// The summary digest of the whole tree (sentinel digest when built
    /// from an empty input).
    pub fn root(&self) -> &Digest {
        self.root.digest()
    }

    /// Number of input leaves this tree was built from (zero for the
    /// sentinel tree).
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The root node.
    pub fn root_node(&self) -> &MerkleNode {
        &self.root
    }
}
