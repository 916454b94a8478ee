//! The emulated IO device: a fixed array of fixed-size blocks held in memory.
//! Everything above this layer sees storage only as whole-block copies.

use crate::error::{FsError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    num_blocks: usize,
    block_size: usize,
    data: Vec<u8>,
}

impl BlockDevice {
    /// Creates a zero-filled device of `num_blocks` blocks of `block_size` bytes.
    pub fn new(num_blocks: usize, block_size: usize) -> Self {
        Self {
            num_blocks,
            block_size,
            data: vec![0; num_blocks * block_size],
        }
    }

    /// Rebuilds a device from raw bytes, e.g. a backup snapshot.
    pub fn from_bytes(num_blocks: usize, block_size: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != num_blocks * block_size {
            return Err(FsError::SizeMismatch);
        }
        Ok(Self {
            num_blocks,
            block_size,
            data,
        })
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns a copy of the requested block.
    pub fn read_block(&self, block: usize) -> Result<Vec<u8>> {
        if block >= self.num_blocks {
            return Err(FsError::OutOfRange);
        }
        let start = block * self.block_size;
        Ok(self.data[start..start + self.block_size].to_vec())
    }

    /// Replaces the requested block. `data` must be exactly one block long.
    pub fn write_block(&mut self, block: usize, data: &[u8]) -> Result<()> {
        if block >= self.num_blocks {
            return Err(FsError::OutOfRange);
        }
        if data.len() != self.block_size {
            return Err(FsError::SizeMismatch);
        }
        let start = block * self.block_size;
        self.data[start..start + self.block_size].copy_from_slice(data);
        Ok(())
    }

    /// The whole device content, block 0 first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
