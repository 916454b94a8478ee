//! Encoding and decoding of the file system metadata kept in block 0.

use crate::block_dev::BlockDevice;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::params::FsParams;

/// The four big-endian i32 fields at the start of block 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub version: i32,
    pub block_size: i32,
    pub blocks: i32,
    pub inodes: i32,
}

/// Writes the superblock for `params`, zero-padded to a full block.
pub fn write_superblock(device: &mut BlockDevice, params: &FsParams) -> Result<()> {
    let mut block = vec![0u8; params.block_size];
    let fields = [
        FS_VERSION,
        params.block_size as i32,
        params.blocks as i32,
        params.inodes as i32,
    ];
    for (i, field) in fields.iter().enumerate() {
        block[i * 4..i * 4 + 4].copy_from_slice(&field.to_be_bytes());
    }
    device.write_block(SUPERBLOCK_INDEX, &block)
}

/// Reads the superblock back, rejecting devices written by another version.
pub fn read_superblock(device: &BlockDevice) -> Result<SuperBlock> {
    let block = device.read_block(SUPERBLOCK_INDEX)?;
    let field = |i: usize| i32::from_be_bytes([block[i * 4], block[i * 4 + 1], block[i * 4 + 2], block[i * 4 + 3]]);
    let sb = SuperBlock {
        version: field(0),
        block_size: field(1),
        blocks: field(2),
        inodes: field(3),
    };
    if sb.version != FS_VERSION {
        return Err(FsError::VersionMismatch);
    }
    Ok(sb)
}
