//! The free-block bitmap over blocks 1..1+bitmap_blocks.
//!
//! Bit `k` lives at byte `k / 8` of bitmap block `k / (8 * block_size)`,
//! LSB first. A set bit means the block is on the free list: the scanner
//! returns indices whose bit is 1, formatting sets the bits of the data
//! region, allocation clears the chosen bit and reclamation sets it again.

use crate::block_dev::BlockDevice;
use crate::config::BITMAP_START;
use crate::error::{FsError, Result};
use crate::params::FsParams;

/// Returns the lowest free block index, scanning blocks in order, bytes in
/// order and bits LSB to MSB. A set bit at a position past the device end is
/// never a candidate; the scan stops there.
pub fn find_free(device: &BlockDevice, params: &FsParams) -> Result<Option<usize>> {
    for bitmap_block in 0..params.bitmap_blocks {
        let block = device.read_block(BITMAP_START + bitmap_block)?;
        for (byte_index, &byte) in block.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            for bit in 0..8 {
                if byte & (1 << bit) != 0 {
                    let index = (bitmap_block * params.block_size + byte_index) * 8 + bit;
                    if index < params.blocks {
                        return Ok(Some(index));
                    }
                    return Ok(None);
                }
            }
        }
    }
    Ok(None)
}

/// Takes `block` off the free list. Called when the block becomes part of a
/// file or holds metadata.
pub fn mark_used(device: &mut BlockDevice, params: &FsParams, block: usize) -> Result<()> {
    set_bit(device, params, block, false)
}

/// Returns `block` to the free list, making it findable again.
pub fn mark_free(device: &mut BlockDevice, params: &FsParams, block: usize) -> Result<()> {
    set_bit(device, params, block, true)
}

fn set_bit(device: &mut BlockDevice, params: &FsParams, block: usize, value: bool) -> Result<()> {
    if block >= params.blocks {
        return Err(FsError::OutOfRange);
    }
    let bits_per_block = params.block_size * 8;
    let bitmap_block = BITMAP_START + block / bits_per_block;
    let byte_index = (block % bits_per_block) / 8;
    let bit_index = block % 8;

    let mut data = device.read_block(bitmap_block)?;
    if value {
        data[byte_index] |= 1 << bit_index;
    } else {
        data[byte_index] &= !(1 << bit_index);
    }
    device.write_block(bitmap_block, &data)
}
