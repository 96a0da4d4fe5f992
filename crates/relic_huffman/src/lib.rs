//! The adaptive Huffman code used to compress relic archive entries.
//!
//! An [`AdaptiveHuffmanTree`] starts with every symbol equally likely and reshapes itself after
//! every symbol it sees, so the encoder never has to transmit a code table: the decoder rebuilds
//! the same sequence of trees from the symbols it decodes.
//!
//! # Coding Rules
//!
//! Encoder and decoder only stay in step if they follow exactly the same rules:
//!
//! - **Initial tree**: leaves `0..n` at positions `0..n` with weight 1, then internal nodes
//!   made by pairing positions `(0, 1)`, `(2, 3)`, ... The root is the last node.
//! - **Codes**: a `0` bit selects the left child, a `1` bit the right child. Bits are packed
//!   most significant first (see [`relic_stream::bits`]).
//! - **Update**: each node from the symbol's leaf up to the root gains one weight. A node that
//!   now outweighs the nodes after it swaps places with the *last* node that is still lighter.
//! - **Rescale**: before an update, if the root weight has reached [`tree::RESCALE_WEIGHT`],
//!   leaf weights are halved (rounding up) and the internal nodes are rebuilt.
//!
//! # Example
//!
//! ```
//! use relic_huffman::AdaptiveHuffmanTree;
//! use relic_stream::{BitReader, BitWriter, ByteReader};
//!
//! let message = [2u16, 2, 2, 0, 2, 1];
//!
//! let mut encoder = AdaptiveHuffmanTree::new(3)?;
//! let mut writer = BitWriter::new(Vec::new());
//! for &symbol in &message {
//!     encoder.encode(symbol, &mut writer)?;
//!     encoder.update(symbol)?;
//! }
//! let packed = writer.finish()?;
//!
//! let mut decoder = AdaptiveHuffmanTree::new(3)?;
//! let mut reader = BitReader::new(ByteReader::new(packed));
//! for &expected in &message {
//!     let symbol = decoder.decode(&mut reader)?;
//!     decoder.update(symbol)?;
//!     assert_eq!(symbol, expected);
//! }
//! # Ok::<(), relic_huffman::error::Error>(())
//! ```
//!

pub mod error;
pub mod tree;

pub use tree::AdaptiveHuffmanTree;
