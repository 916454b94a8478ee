//! Runtime parameters of a mounted file system: the user-specified geometry
//! plus everything derived from it. Values are fixed once the device is
//! formatted or restored.

use crate::block_dev::BlockDevice;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::superblock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsParams {
    /// Size of one device block in bytes.
    pub block_size: usize,
    /// Total number of blocks on the device.
    pub blocks: usize,
    /// Number of inodes. Inode 0 is the directory.
    pub inodes: usize,
    /// Maximum number of simultaneously open user files.
    pub max_open_files: usize,

    /// Blocks occupied by the free-block bitmap.
    pub bitmap_blocks: usize,
    /// First block of the inode table.
    pub inodes_start: usize,
    /// Blocks occupied by the inode table.
    pub inode_blocks: usize,
    /// First block of the data region.
    pub data_start: usize,
    /// Size of the open-file table, including the directory slot.
    pub oft_size: usize,
    /// Maximum length of one file in bytes.
    pub max_file_size: usize,
}

impl FsParams {
    /// Validates the user-specified geometry and derives the device layout.
    pub fn new(
        block_size: usize,
        blocks: usize,
        inodes: usize,
        max_open_files: usize,
    ) -> Result<Self> {
        if block_size < MIN_BLOCK_SIZE {
            return Err(FsError::InvalidParams("block size below the minimum"));
        }
        if inodes == 0 {
            return Err(FsError::InvalidParams("at least one inode is required"));
        }
        if max_open_files == 0 {
            return Err(FsError::InvalidParams(
                "at least one open file must be allowed",
            ));
        }

        let bits_per_block = block_size * 8;
        let bitmap_blocks = (blocks + bits_per_block - 1) / bits_per_block;
        let inodes_start = BITMAP_START + bitmap_blocks;
        let inode_blocks = (inodes * INODE_SIZE + block_size - 1) / block_size;
        let data_start = inodes_start + inode_blocks;

        // The metadata alone must leave room for at least one data block.
        if blocks <= data_start {
            return Err(FsError::InvalidParams("too few blocks for the metadata"));
        }

        Ok(Self {
            block_size,
            blocks,
            inodes,
            max_open_files,
            bitmap_blocks,
            inodes_start,
            inode_blocks,
            data_start,
            oft_size: max_open_files + 1,
            max_file_size: (block_size * INODE_DIRECT).min(i32::MAX as usize),
        })
    }

    /// Rederives parameters from the superblock of a restored device.
    /// Only the open-file limit is taken from the caller; block size, block
    /// count and inode count always come from the device itself.
    pub fn from_superblock(device: &BlockDevice, max_open_files: usize) -> Result<Self> {
        let sb = superblock::read_superblock(device)?;
        Self::new(
            sb.block_size as usize,
            sb.blocks as usize,
            sb.inodes as usize,
            max_open_files,
        )
    }
}
