//! Node-indexed adaptive Huffman tree
//!

use std::io::Write;

use relic_stream::{BitReader, BitWriter, SeekableReader};
use tracing::debug;

use crate::error::{InvalidArgument, Result};

/// Root weight at which the tree is rebuilt with halved weights before the next update
pub const RESCALE_WEIGHT: u32 = 0x8000;

/// Largest alphabet a tree can be built for
///
/// Leaves never drop below a weight of one, so the alphabet must leave the root room to grow
/// before it reaches [`RESCALE_WEIGHT`].
pub const MAX_SYMBOLS: usize = RESCALE_WEIGHT as usize / 2;

const NO_PARENT: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Leaf(u16),
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    weight: u32,
    parent: usize,
    kind: NodeKind,
}

/// An adaptive Huffman code over the symbols `0..symbol_count`
///
/// The tree lives in a flat arena of `2 * symbol_count - 1` nodes. A node's position in the arena
/// is also its place in the weight ordering: weights never decrease along the arena, the two
/// children of an internal node sit next to each other (`right == left + 1`) somewhere before
/// their parent, and the root is always the last node.
///
/// [`AdaptiveHuffmanTree::decode`] and [`AdaptiveHuffmanTree::encode`] only read the tree. Both
/// sides of a stream must call [`AdaptiveHuffmanTree::update`] with every symbol they process so
/// that they keep identical trees.
///
/// ```
/// use relic_huffman::AdaptiveHuffmanTree;
///
/// let tree = AdaptiveHuffmanTree::new(2)?;
/// let root = tree.root_node_index();
///
/// assert!(!tree.is_leaf(root)?);
/// assert_eq!(tree.node_data(tree.child_node(root, false)?)?, 0);
/// assert_eq!(tree.node_data(tree.child_node(root, true)?)?, 1);
/// # Ok::<(), relic_huffman::error::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveHuffmanTree {
    nodes: Vec<Node>,
    leaves: Vec<usize>,
}

impl AdaptiveHuffmanTree {
    /// Build the initial tree for an alphabet of `symbol_count` symbols
    ///
    /// Every symbol starts with a weight of one. Leaves take the first `symbol_count` positions
    /// in ascending symbol order, then internal nodes are appended by pairing consecutive
    /// positions `(0, 1)`, `(2, 3)`, ... until the root is reached.
    pub fn new(symbol_count: usize) -> Result<Self> {
        if !(2..=MAX_SYMBOLS).contains(&symbol_count) {
            return Err(InvalidArgument::SymbolCount(symbol_count).into());
        }

        let node_count = 2 * symbol_count - 1;
        let mut nodes = Vec::with_capacity(node_count);
        nodes.extend((0..symbol_count).map(|symbol| Node {
            weight: 1,
            parent: NO_PARENT,
            kind: NodeKind::Leaf(symbol as u16),
        }));

        let mut left = 0;
        while nodes.len() < node_count {
            let index = nodes.len();
            let weight = nodes[left].weight + nodes[left + 1].weight;

            nodes[left].parent = index;
            nodes[left + 1].parent = index;
            nodes.push(Node {
                weight,
                parent: NO_PARENT,
                kind: NodeKind::Internal {
                    left,
                    right: left + 1,
                },
            });
            left += 2;
        }

        Ok(AdaptiveHuffmanTree {
            nodes,
            leaves: (0..symbol_count).collect(),
        })
    }

    /// Number of symbols in the alphabet
    pub fn symbol_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of nodes, always `2 * symbol_count() - 1`
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the root node
    pub fn root_node_index(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Whether the node holds a symbol rather than children
    pub fn is_leaf(&self, index: usize) -> Result<bool> {
        Ok(matches!(self.node(index)?.kind, NodeKind::Leaf(_)))
    }

    /// The left (`false`) or right (`true`) child of an internal node
    pub fn child_node(&self, index: usize, is_right_child: bool) -> Result<usize> {
        match self.node(index)?.kind {
            NodeKind::Leaf(_) => Err(InvalidArgument::Leaf(index).into()),
            NodeKind::Internal { left, right } => Ok(if is_right_child { right } else { left }),
        }
    }

    /// The symbol stored at a leaf
    pub fn node_data(&self, index: usize) -> Result<u16> {
        match self.node(index)?.kind {
            NodeKind::Leaf(symbol) => Ok(symbol),
            NodeKind::Internal { .. } => Err(InvalidArgument::Internal(index).into()),
        }
    }

    /// The parent of a node, `None` for the root
    pub fn parent_node(&self, index: usize) -> Result<Option<usize>> {
        let parent = self.node(index)?.parent;
        Ok((parent != NO_PARENT).then_some(parent))
    }

    /// Occurrence weight of a node
    pub fn weight(&self, index: usize) -> Result<u32> {
        Ok(self.node(index)?.weight)
    }

    /// Index of the leaf currently holding `symbol`
    pub fn leaf_for_symbol(&self, symbol: u16) -> Result<usize> {
        self.leaves
            .get(symbol as usize)
            .copied()
            .ok_or_else(|| {
                InvalidArgument::Symbol {
                    symbol,
                    symbol_count: self.symbol_count(),
                }
                .into()
            })
    }

    /// Current code of `symbol`, in root-to-leaf order, `true` selecting the right child
    pub fn code_for_symbol(&self, symbol: u16) -> Result<Vec<bool>> {
        let root = self.root_node_index();
        let mut index = self.leaf_for_symbol(symbol)?;

        let mut code = Vec::new();
        while index != root {
            let parent = self.nodes[index].parent;
            code.push(matches!(
                self.nodes[parent].kind,
                NodeKind::Internal { right, .. } if right == index
            ));
            index = parent;
        }

        code.reverse();
        Ok(code)
    }

    /// Read one symbol by walking from the root, one bit per level
    ///
    /// The tree is not updated.
    pub fn decode<R: SeekableReader>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let mut index = self.root_node_index();
        loop {
            match self.nodes[index].kind {
                NodeKind::Leaf(symbol) => return Ok(symbol),
                NodeKind::Internal { left, right } => {
                    index = if reader.read_bit()? { right } else { left };
                }
            }
        }
    }

    /// Write the current code of `symbol`
    ///
    /// The tree is not updated.
    pub fn encode<W: Write>(&self, symbol: u16, writer: &mut BitWriter<W>) -> Result<()> {
        for bit in self.code_for_symbol(symbol)? {
            writer.write_bit(bit)?;
        }
        Ok(())
    }

    /// Record one more occurrence of `symbol` and restore the ordering
    ///
    /// Starting at the symbol's leaf, each node on the way to the root has its weight bumped.
    /// When that puts it ahead of nodes further up the ordering, it trades places, subtree and
    /// all, with the last node that is still lighter, so ties always resolve to the highest
    /// position and never depend on symbol values.
    pub fn update(&mut self, symbol: u16) -> Result<()> {
        let root = self.root_node_index();
        let mut index = self.leaf_for_symbol(symbol)?;

        if self.nodes[root].weight >= RESCALE_WEIGHT {
            self.rebuild();
            index = self.leaves[symbol as usize];
        }

        loop {
            let weight = self.nodes[index].weight + 1;
            self.nodes[index].weight = weight;
            if index == root {
                break;
            }

            let mut target = index;
            while target + 1 < root && self.nodes[target + 1].weight < weight {
                target += 1;
            }
            if target != index {
                self.exchange(index, target);
                index = target;
            }

            index = self.nodes[index].parent;
        }

        Ok(())
    }

    /// Halve every leaf weight and rebuild the internal nodes around them
    fn rebuild(&mut self) {
        debug!(
            root_weight = self.nodes[self.root_node_index()].weight,
            "rescaling adaptive huffman tree"
        );

        let symbol_count = self.symbol_count();
        let node_count = self.node_count();

        let mut next = 0;
        for index in 0..node_count {
            if let NodeKind::Leaf(_) = self.nodes[index].kind {
                self.nodes[next] = Node {
                    weight: (self.nodes[index].weight + 1) / 2,
                    parent: NO_PARENT,
                    kind: self.nodes[index].kind,
                };
                next += 1;
            }
        }

        let mut left = 0;
        for index in symbol_count..node_count {
            let weight = self.nodes[left].weight + self.nodes[left + 1].weight;

            let mut position = index;
            while weight < self.nodes[position - 1].weight {
                position -= 1;
            }

            self.nodes.copy_within(position..index, position + 1);
            self.nodes[position] = Node {
                weight,
                parent: NO_PARENT,
                kind: NodeKind::Internal {
                    left,
                    right: left + 1,
                },
            };
            left += 2;
        }

        let root = self.root_node_index();
        self.nodes[root].parent = NO_PARENT;
        for index in 0..node_count {
            self.adopt(index);
        }
    }

    /// Swap the contents of two positions, leaving each position under its old parent
    fn exchange(&mut self, a: usize, b: usize) {
        let Node { weight, kind, .. } = self.nodes[a];

        self.nodes[a].weight = self.nodes[b].weight;
        self.nodes[a].kind = self.nodes[b].kind;
        self.nodes[b].weight = weight;
        self.nodes[b].kind = kind;

        self.adopt(a);
        self.adopt(b);
    }

    /// Point the children (or the symbol lookup) of `index` back at it
    fn adopt(&mut self, index: usize) {
        match self.nodes[index].kind {
            NodeKind::Leaf(symbol) => self.leaves[symbol as usize] = index,
            NodeKind::Internal { left, right } => {
                self.nodes[left].parent = index;
                self.nodes[right].parent = index;
            }
        }
    }

    fn node(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or_else(|| {
            InvalidArgument::NodeIndex {
                index,
                node_count: self.node_count(),
            }
            .into()
        })
    }
}
