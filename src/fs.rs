//! The file system façade. Owns the device, the runtime parameters and the
//! open-file table, and coordinates bitmap, inode table and directory
//! updates for every user-visible operation.

use std::io;
use std::path::Path;

use log::{debug, info};

use crate::backup;
use crate::bitmap;
use crate::block_dev::BlockDevice;
use crate::config::{DIRECTORY_INODE, NAME_BYTES};
use crate::directory::{self, DirEntry};
use crate::error::{FsError, Result};
use crate::file::OpenFile;
use crate::inode::{self, Inode};
use crate::params::FsParams;

pub struct FileSystem {
    device: BlockDevice,
    params: FsParams,
    /// Open-file table slot 0: the directory, open for the whole lifetime.
    directory: OpenFile,
    /// Open-file table slots 1..=max_open_files, stored shifted by one.
    open_files: Vec<Option<OpenFile>>,
}

impl FileSystem {
    /// Formats a fresh in-memory device and mounts it: writes the
    /// superblock, puts every data-region block on the free list, writes the
    /// free inode table and opens the empty directory in slot 0.
    pub fn format(params: FsParams) -> Result<Self> {
        let mut device = BlockDevice::new(params.blocks, params.block_size);
        crate::superblock::write_superblock(&mut device, &params)?;

        for block in params.data_start..params.blocks {
            bitmap::mark_free(&mut device, &params, block)?;
        }

        for index in 1..params.inodes {
            inode::write_inode(&mut device, &params, &Inode::free(index))?;
        }

        // The directory starts out like any created file: empty, with its
        // first data block already allocated.
        let mut root = Inode::free(DIRECTORY_INODE);
        root.length = 0;
        let first = bitmap::find_free(&device, &params)?.ok_or(FsError::NoSpace("blocks"))?;
        root.blocks[0] = first as i32;
        bitmap::mark_used(&mut device, &params, first)?;
        inode::write_inode(&mut device, &params, &root)?;

        info!(
            "formatted device: {} blocks of {} bytes, {} inodes",
            params.blocks, params.block_size, params.inodes
        );
        Ok(Self {
            device,
            params,
            directory: OpenFile::new(root, params.block_size),
            open_files: (0..params.max_open_files).map(|_| None).collect(),
        })
    }

    /// Mounts an existing device, e.g. one read back from a backup file.
    /// Geometry comes from the superblock; only the open-file limit is
    /// taken from the caller.
    pub fn restore(device: BlockDevice, max_open_files: usize) -> Result<Self> {
        let params = FsParams::from_superblock(&device, max_open_files)?;
        let root = inode::read_inode(&device, &params, DIRECTORY_INODE)?;
        info!(
            "restored device: {} blocks of {} bytes, {} inodes",
            params.blocks, params.block_size, params.inodes
        );
        Ok(Self {
            device,
            params,
            directory: OpenFile::new(root, params.block_size),
            open_files: (0..params.max_open_files).map(|_| None).collect(),
        })
    }

    pub fn params(&self) -> &FsParams {
        &self.params
    }

    pub fn device(&self) -> &BlockDevice {
        &self.device
    }

    /// Creates an empty file: reserves a directory slot, a free inode and
    /// the file's first data block, then commits all three. A failure
    /// partway through the commit is not unwound.
    pub fn create(&mut self, name: &str) -> Result<()> {
        let Self {
            device,
            params,
            directory: dir,
            ..
        } = self;

        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > NAME_BYTES || bytes.contains(&0) {
            return Err(FsError::InvalidName);
        }
        if directory::find_entry(dir, device, params, name)?.is_some() {
            return Err(FsError::AlreadyExists);
        }

        let slot = directory::find_free_slot(dir, device, params)?
            .ok_or(FsError::NoSpace("directory slots"))?;
        let mut free_inode = None;
        for index in 0..params.inodes {
            if inode::read_inode(device, params, index)?.is_free() {
                free_inode = Some(index);
                break;
            }
        }
        let index = free_inode.ok_or(FsError::NoSpace("inodes"))?;
        let data_block = bitmap::find_free(device, params)?.ok_or(FsError::NoSpace("blocks"))?;

        let mut node = Inode::free(index);
        node.length = 0;
        node.blocks[0] = data_block as i32;
        bitmap::mark_used(device, params, data_block)?;
        inode::write_inode(device, params, &node)?;
        directory::write_entry(dir, device, params, slot, &DirEntry::new(name, index)?)?;

        debug!("created file {name}: inode {index}, first block {data_block}");
        Ok(())
    }

    /// Removes a file: closes any open handle to it, clears its directory
    /// slot and only then returns the inode and its blocks to the free
    /// lists.
    pub fn destroy(&mut self, name: &str) -> Result<()> {
        let Self {
            device,
            params,
            directory: dir,
            open_files,
        } = self;

        let (slot, entry) =
            directory::find_entry(dir, device, params, name)?.ok_or(FsError::NotFound)?;
        let index = entry.inode_index as usize;
        let node = inode::read_inode(device, params, index)?;

        for open in open_files.iter_mut() {
            if let Some(file) = open.as_mut() {
                if file.inode_index() == index {
                    file.flush(device, params)?;
                    *open = None;
                }
            }
        }

        directory::clear_entry(dir, device, params, slot)?;
        inode::write_inode(device, params, &Inode::free(index))?;
        for link in node.blocks {
            if link >= 0 {
                bitmap::mark_free(device, params, link as usize)?;
            }
        }

        debug!("destroyed file {name}: inode {index}");
        Ok(())
    }

    /// Opens a file and returns its open-file table index, the handle for
    /// all read, write, seek and close calls.
    pub fn open(&mut self, name: &str) -> Result<usize> {
        let Self {
            device,
            params,
            directory: dir,
            open_files,
        } = self;

        let (_, entry) =
            directory::find_entry(dir, device, params, name)?.ok_or(FsError::NotFound)?;
        let node = inode::read_inode(device, params, entry.inode_index as usize)?;
        let free = open_files
            .iter()
            .position(Option::is_none)
            .ok_or(FsError::TooManyOpenFiles)?;
        open_files[free] = Some(OpenFile::new(node, params.block_size));

        debug!("opened file {name}: slot {}", free + 1);
        Ok(free + 1)
    }

    /// Closes an open file, flushing its buffered block and inode.
    pub fn close(&mut self, index: usize) -> Result<()> {
        let Self {
            device,
            params,
            open_files,
            ..
        } = self;

        // The directory in slot 0 is never closed.
        if index == 0 {
            return Err(FsError::NotFound);
        }
        let slot = open_files.get_mut(index - 1).ok_or(FsError::NotFound)?;
        let file = slot.as_mut().ok_or(FsError::NotFound)?;
        file.flush(device, params)?;
        *slot = None;

        debug!("closed slot {index}");
        Ok(())
    }

    /// Reads `count` bytes from the open file's cursor position.
    pub fn read(&mut self, index: usize, count: usize) -> Result<Vec<u8>> {
        let Self {
            device,
            params,
            directory: dir,
            open_files,
        } = self;
        let file = Self::entry_mut(dir, open_files, index)?;
        file.read(device, params, count)
    }

    /// Writes `data` at the open file's cursor position. Exceeding the
    /// maximum file size fails before any byte is written.
    pub fn write(&mut self, index: usize, data: &[u8]) -> Result<()> {
        let Self {
            device,
            params,
            directory: dir,
            open_files,
        } = self;
        let file = Self::entry_mut(dir, open_files, index)?;
        if file.position() + data.len() > params.max_file_size {
            return Err(FsError::ReadWrite("maximum file size exceeded"));
        }
        file.write(device, params, data)
    }

    /// Moves the open file's cursor. Seeking to exactly the end is allowed.
    pub fn lseek(&mut self, index: usize, position: usize) -> Result<()> {
        let Self {
            directory: dir,
            open_files,
            ..
        } = self;
        let file = Self::entry_mut(dir, open_files, index)?;
        file.seek(position)
    }

    /// Lists the directory in slot order as (name, length) pairs.
    pub fn directory(&mut self) -> Result<Vec<(String, i32)>> {
        let Self {
            device,
            params,
            directory: dir,
            ..
        } = self;

        let entries = directory::list_entries(dir, device, params)?;
        let mut listing = Vec::with_capacity(entries.len());
        for entry in entries {
            let node = inode::read_inode(device, params, entry.inode_index as usize)?;
            listing.push((
                String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                node.length,
            ));
        }
        Ok(listing)
    }

    /// Saves a snapshot of the whole device to `path`. Buffered blocks of
    /// every open file are flushed first so the device bytes are
    /// authoritative.
    pub fn save_backup(&mut self, path: &Path) -> io::Result<()> {
        self.flush_all()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        backup::save_to_file(&self.device, path)?;
        info!("saved device to {}", path.display());
        Ok(())
    }

    fn flush_all(&mut self) -> Result<()> {
        let Self {
            device,
            params,
            directory: dir,
            open_files,
        } = self;
        dir.flush(device, params)?;
        for file in open_files.iter_mut().flatten() {
            file.flush(device, params)?;
        }
        Ok(())
    }

    /// Resolves an open-file table index. Index 0 is the directory itself;
    /// an index without an open file is reported as not found.
    fn entry_mut<'a>(
        directory: &'a mut OpenFile,
        open_files: &'a mut [Option<OpenFile>],
        index: usize,
    ) -> Result<&'a mut OpenFile> {
        if index == 0 {
            Ok(directory)
        } else {
            open_files
                .get_mut(index - 1)
                .and_then(Option::as_mut)
                .ok_or(FsError::NotFound)
        }
    }
}
