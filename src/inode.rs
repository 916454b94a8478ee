//! The inode table: fixed-size records packed into the blocks after the
//! bitmap. Inodes are plain values; the authoritative copy is always the one
//! on the device, so there is no caching here.

use crate::block_dev::BlockDevice;
use crate::config::{INODE_DIRECT, INODE_SIZE};
use crate::error::{FsError, Result};
use crate::params::FsParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    /// Index of this inode in the table.
    pub index: usize,
    /// Length of the file in bytes; -1 marks a free inode.
    pub length: i32,
    /// Direct block links. Used slots form a prefix; -1 marks an unused slot.
    pub blocks: [i32; INODE_DIRECT],
}

impl Inode {
    /// A free inode at `index`.
    pub fn free(index: usize) -> Self {
        Self {
            index,
            length: -1,
            blocks: [-1; INODE_DIRECT],
        }
    }

    pub fn is_free(&self) -> bool {
        self.length < 0
    }

    /// The on-device representation: length then the block links, big-endian.
    pub fn encode(&self) -> [u8; INODE_SIZE] {
        let mut bytes = [0u8; INODE_SIZE];
        bytes[0..4].copy_from_slice(&self.length.to_be_bytes());
        for (i, link) in self.blocks.iter().enumerate() {
            bytes[4 + i * 4..8 + i * 4].copy_from_slice(&link.to_be_bytes());
        }
        bytes
    }

    pub fn decode(index: usize, bytes: &[u8; INODE_SIZE]) -> Self {
        let field = |i: usize| {
            i32::from_be_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
        };
        let mut blocks = [-1; INODE_DIRECT];
        for (i, link) in blocks.iter_mut().enumerate() {
            *link = field(1 + i);
        }
        Self {
            index,
            length: field(0),
            blocks,
        }
    }
}

/// Byte offset of inode `index` relative to the start of the inode table.
fn table_offset(index: usize) -> usize {
    index * INODE_SIZE
}

/// Reads inode `index` from the table. The record may straddle two
/// consecutive blocks; both are read and the bytes spliced together.
pub fn read_inode(device: &BlockDevice, params: &FsParams, index: usize) -> Result<Inode> {
    if index >= params.inodes {
        return Err(FsError::OutOfRange);
    }
    let offset = table_offset(index);
    let block = params.inodes_start + offset / params.block_size;
    let within = offset % params.block_size;
    let in_first = INODE_SIZE.min(params.block_size - within);

    let mut bytes = [0u8; INODE_SIZE];
    let first = device.read_block(block)?;
    bytes[..in_first].copy_from_slice(&first[within..within + in_first]);
    if in_first < INODE_SIZE {
        let second = device.read_block(block + 1)?;
        bytes[in_first..].copy_from_slice(&second[..INODE_SIZE - in_first]);
    }
    Ok(Inode::decode(index, &bytes))
}

/// Writes `inode` back to the table, read-modify-writing the one or two
/// blocks that cover it.
pub fn write_inode(device: &mut BlockDevice, params: &FsParams, inode: &Inode) -> Result<()> {
    if inode.index >= params.inodes {
        return Err(FsError::OutOfRange);
    }
    let bytes = inode.encode();
    let offset = table_offset(inode.index);
    let block = params.inodes_start + offset / params.block_size;
    let within = offset % params.block_size;
    let in_first = INODE_SIZE.min(params.block_size - within);

    let mut first = device.read_block(block)?;
    first[within..within + in_first].copy_from_slice(&bytes[..in_first]);
    device.write_block(block, &first)?;
    if in_first < INODE_SIZE {
        let mut second = device.read_block(block + 1)?;
        second[..INODE_SIZE - in_first].copy_from_slice(&bytes[in_first..]);
        device.write_block(block + 1, &second)?;
    }
    Ok(())
}
