//! One entry of the open-file table: a cursor into a file plus a single
//! block of buffered data. Every read and write of file content flows
//! through the buffer; a dirty buffer is flushed before another block
//! replaces it.

use crate::bitmap;
use crate::block_dev::BlockDevice;
use crate::config::INODE_DIRECT;
use crate::error::{FsError, Result};
use crate::inode::{self, Inode};
use crate::params::FsParams;

#[derive(Debug, Clone)]
pub struct OpenFile {
    /// The file's inode, cached by value and persisted on every mutation.
    inode: Inode,
    /// Byte offset of the cursor; always within 0..=length.
    position: usize,
    /// Direct-link index the cursor points into, `position / block_size`.
    current_link: usize,
    /// Direct-link index of the block currently held in `buffer`.
    buffered_link: Option<usize>,
    /// One block of file data.
    buffer: Vec<u8>,
    /// Whether `buffer` holds writes not yet on the device.
    modified: bool,
}

impl OpenFile {
    /// Opens `inode` with the cursor at 0 and an empty buffer.
    pub fn new(inode: Inode, block_size: usize) -> Self {
        Self {
            inode,
            position: 0,
            current_link: 0,
            buffered_link: None,
            buffer: vec![0; block_size],
            modified: false,
        }
    }

    pub fn inode(&self) -> &Inode {
        &self.inode
    }

    pub fn inode_index(&self) -> usize {
        self.inode.index
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Current length of the file in bytes.
    pub fn length(&self) -> usize {
        self.inode.length.max(0) as usize
    }

    /// Makes `buffer` hold the block the cursor points into: flushes the old
    /// buffer if dirty, then reads the current block, allocating a fresh one
    /// when the file has not reached it yet. When the device is full the
    /// inode length is pinned at the current position, persisted, and the
    /// operation fails.
    fn load_current_block(&mut self, device: &mut BlockDevice, params: &FsParams) -> Result<()> {
        if self.modified {
            if let Some(link) = self.buffered_link {
                device.write_block(self.inode.blocks[link] as usize, &self.buffer)?;
            }
            self.modified = false;
        }

        let link = self.current_link;
        debug_assert!(link < INODE_DIRECT);
        if self.inode.blocks[link] >= 0 {
            self.buffer = device.read_block(self.inode.blocks[link] as usize)?;
        } else {
            match bitmap::find_free(device, params)? {
                Some(block) => {
                    self.inode.blocks[link] = block as i32;
                    bitmap::mark_used(device, params, block)?;
                    inode::write_inode(device, params, &self.inode)?;
                    self.buffer.fill(0);
                }
                None => {
                    self.inode.length = self.position as i32;
                    inode::write_inode(device, params, &self.inode)?;
                    return Err(FsError::ReadWrite("no free blocks left on the device"));
                }
            }
        }
        self.buffered_link = Some(link);
        Ok(())
    }

    /// Reads exactly `count` bytes starting at the cursor. Fails before
    /// touching anything when fewer than `count` bytes remain.
    pub fn read(
        &mut self,
        device: &mut BlockDevice,
        params: &FsParams,
        count: usize,
    ) -> Result<Vec<u8>> {
        if count > self.length() - self.position {
            return Err(FsError::ReadWrite("end of file before all requested bytes"));
        }

        let mut data = Vec::with_capacity(count);
        let mut remaining = count;
        while remaining > 0 {
            if self.buffered_link != Some(self.current_link) {
                self.load_current_block(device, params)?;
            }
            let offset = self.position % params.block_size;
            let take = remaining.min(params.block_size - offset);
            data.extend_from_slice(&self.buffer[offset..offset + take]);
            self.position += take;
            self.current_link = self.position / params.block_size;
            remaining -= take;
        }
        Ok(data)
    }

    /// Writes all of `data` starting at the cursor, growing the file as
    /// needed. The size cap is enforced by the caller before any mutation.
    pub fn write(&mut self, device: &mut BlockDevice, params: &FsParams, data: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < data.len() {
            if self.buffered_link != Some(self.current_link) {
                self.load_current_block(device, params)?;
            }
            let offset = self.position % params.block_size;
            let take = (data.len() - written).min(params.block_size - offset);
            self.buffer[offset..offset + take].copy_from_slice(&data[written..written + take]);
            self.modified = true;
            self.position += take;
            self.current_link = self.position / params.block_size;
            written += take;
        }

        if (self.position as i32) > self.inode.length {
            self.inode.length = self.position as i32;
        }
        inode::write_inode(device, params, &self.inode)
    }

    /// Moves the cursor. Seeking to exactly the file length is allowed. The
    /// buffer is left as is; the next read or write notices the changed link
    /// and reloads.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.length() {
            return Err(FsError::OutOfRange);
        }
        self.position = position;
        self.current_link = position / self.buffer.len();
        Ok(())
    }

    /// Writes out the buffer if dirty and persists the inode.
    pub fn flush(&mut self, device: &mut BlockDevice, params: &FsParams) -> Result<()> {
        if self.modified {
            if let Some(link) = self.buffered_link {
                device.write_block(self.inode.blocks[link] as usize, &self.buffer)?;
            }
            self.modified = false;
        }
        inode::write_inode(device, params, &self.inode)
    }
}
