//! # Chain Index
//!
//! Block headers, their hashes and an append-only arena of indexed blocks.
//!
//! Every [`BlockIndex`] refers to its predecessor by [`BlockId`] rather than by
//! pointer, so the history is a plain vector that can be shared immutably
//! across threads. The difficulty and hash-rate code only needs the read-only
//! [`ChainHistory`] view.

use crate::common::hashes::calculate_double_sha256;
use crate::compact::{block_proof, CompactTarget, Target};
use bitcoin::{
    block::{Header, Version},
    hashes::Hash,
    TxMerkleNode,
};
use borsh::{BorshDeserialize, BorshSerialize};
use crypto_bigint::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BlockHashParseError {
    #[error("Invalid block hash hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Block hash must be 32 bytes, got {0}")]
    Length(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Block {0} is already indexed")]
    Duplicate(BlockHash),
    #[error("Parent block {0} is unknown")]
    UnknownParent(BlockHash),
    #[error("Block index is full")]
    CapacityExceeded,
}

/// Double SHA-256 of a serialized header, stored in wire (little-endian)
/// order. Displayed byte-reversed, like every Bitcoin-derived node does.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub const ZERO: BlockHash = BlockHash([0; 32]);

    pub const fn as_byte_array(&self) -> &[u8; 32] {
        &self.0
    }

    /// The hash as a 256-bit integer, for comparison against a target.
    pub fn to_target(&self) -> Target {
        Target::from_le_bytes(self.0)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0;
        bytes.reverse();
        write!(f, "{}", hex::encode(bytes))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self)
    }
}

impl FromStr for BlockHash {
    type Err = BlockHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let mut bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| BlockHashParseError::Length(bytes.len()))?;
        bytes.reverse();
        Ok(BlockHash(bytes))
    }
}

impl From<bitcoin::BlockHash> for BlockHash {
    fn from(hash: bitcoin::BlockHash) -> Self {
        BlockHash(hash.to_byte_array())
    }
}

impl From<BlockHash> for bitcoin::BlockHash {
    fn from(hash: BlockHash) -> Self {
        bitcoin::BlockHash::from_byte_array(hash.0)
    }
}

/// Serializable block header.
///
/// ## Fields
///
/// * `version` - Block version
/// * `prev_block_hash` - Hash of the previous block
/// * `merkle_root` - Merkle root of the block's transactions, wire order
/// * `time` - Block timestamp as Unix time
/// * `bits` - Declared difficulty target in compact form
/// * `nonce` - Counter used in proof-of-work mining
#[derive(
    Serialize, Deserialize, Eq, PartialEq, Clone, Copy, Debug, BorshDeserialize, BorshSerialize,
)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: BlockHash,
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: CompactTarget,
    pub nonce: u32,
}

impl BlockHeader {
    /// The 80-byte consensus serialization.
    pub fn serialize(&self) -> [u8; 80] {
        let mut bytes = [0u8; 80];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.prev_block_hash.0);
        bytes[36..68].copy_from_slice(&self.merkle_root);
        bytes[68..72].copy_from_slice(&self.time.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.bits.to_consensus().to_le_bytes());
        bytes[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    pub fn compute_block_hash(&self) -> BlockHash {
        BlockHash(calculate_double_sha256(&self.serialize()))
    }
}

impl From<Header> for BlockHeader {
    fn from(header: Header) -> Self {
        BlockHeader {
            version: header.version.to_consensus(),
            prev_block_hash: header.prev_blockhash.into(),
            merkle_root: header.merkle_root.to_byte_array(),
            time: header.time,
            bits: header.bits.into(),
            nonce: header.nonce,
        }
    }
}

impl From<BlockHeader> for Header {
    fn from(val: BlockHeader) -> Self {
        Header {
            version: Version::from_consensus(val.version),
            prev_blockhash: val.prev_block_hash.into(),
            merkle_root: TxMerkleNode::from_byte_array(val.merkle_root),
            time: val.time,
            bits: val.bits.into(),
            nonce: val.nonce,
        }
    }
}

/// Position of a block in a [`BlockArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything the consensus rules need to know about an indexed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndex {
    pub id: BlockId,
    /// `None` only for the genesis block.
    pub prev: Option<BlockId>,
    pub hash: BlockHash,
    pub height: u32,
    pub time: u32,
    pub bits: CompactTarget,
    /// Cumulative work up to and including this block.
    pub chain_work: U256,
}

/// Read-only view over indexed blocks.
pub trait ChainHistory {
    fn block(&self, id: BlockId) -> Option<&BlockIndex>;

    fn predecessor(&self, index: &BlockIndex) -> Option<&BlockIndex> {
        index.prev.and_then(|id| self.block(id))
    }

    /// The block `steps` predecessors before `index`, if the history reaches
    /// that far.
    fn ancestor_back<'a>(&'a self, index: &'a BlockIndex, steps: u64) -> Option<&'a BlockIndex> {
        let mut current = index;
        for _ in 0..steps {
            current = self.predecessor(current)?;
        }
        Some(current)
    }
}

/// Append-only block index rooted at a genesis header.
#[derive(Debug, Clone)]
pub struct BlockArena {
    entries: Vec<BlockIndex>,
    by_hash: HashMap<BlockHash, BlockId>,
    tip: BlockId,
}

impl BlockArena {
    pub fn new(genesis: &BlockHeader) -> Self {
        let hash = genesis.compute_block_hash();
        let id = BlockId(0);
        let entry = BlockIndex {
            id,
            prev: None,
            hash,
            height: 0,
            time: genesis.time,
            bits: genesis.bits,
            chain_work: block_proof(genesis.bits),
        };

        BlockArena {
            entries: vec![entry],
            by_hash: HashMap::from([(hash, id)]),
            tip: id,
        }
    }

    /// Indexes `header` on top of its parent. The parent must already be in
    /// the arena.
    pub fn insert(&mut self, header: &BlockHeader) -> Result<BlockId, ChainError> {
        let hash = header.compute_block_hash();
        if self.by_hash.contains_key(&hash) {
            return Err(ChainError::Duplicate(hash));
        }

        let parent = self
            .lookup(&header.prev_block_hash)
            .ok_or(ChainError::UnknownParent(header.prev_block_hash))?;
        let id = BlockId(
            u32::try_from(self.entries.len()).map_err(|_| ChainError::CapacityExceeded)?,
        );

        let entry = BlockIndex {
            id,
            prev: Some(parent.id),
            hash,
            height: parent.height + 1,
            time: header.time,
            bits: header.bits,
            chain_work: parent
                .chain_work
                .wrapping_add(&block_proof(header.bits)),
        };
        tracing::trace!(%hash, height = entry.height, "Indexed block");

        if entry.chain_work > self.tip().chain_work {
            self.tip = id;
        }
        self.entries.push(entry);
        self.by_hash.insert(hash, id);

        Ok(id)
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockIndex> {
        self.entries.get(id.index())
    }

    pub fn lookup(&self, hash: &BlockHash) -> Option<&BlockIndex> {
        self.by_hash.get(hash).and_then(|id| self.get(*id))
    }

    pub fn genesis(&self) -> &BlockIndex {
        &self.entries[0]
    }

    /// The block with the most cumulative work; the first one seen wins ties.
    pub fn tip(&self) -> &BlockIndex {
        &self.entries[self.tip.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ChainHistory for BlockArena {
    fn block(&self, id: BlockId) -> Option<&BlockIndex> {
        self.get(id)
    }
}
