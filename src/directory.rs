//! The directory: the file behind inode 0, a packed array of fixed-size
//! name-to-inode slots. All operations go through the open-file entry that
//! permanently occupies slot 0 of the open-file table.

use crate::block_dev::BlockDevice;
use crate::config::{DIR_ENTRY_BYTES, NAME_BYTES};
use crate::error::{FsError, Result};
use crate::file::OpenFile;
use crate::params::FsParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// Name bytes, padded with zeros. A slot whose name is all zeros is free.
    pub name: [u8; NAME_BYTES],
    /// Index of the inode the entry points to, big-endian on the device.
    pub inode_index: i32,
}

impl DirEntry {
    pub fn new(name: &str, inode_index: usize) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > NAME_BYTES || bytes.contains(&0) {
            return Err(FsError::InvalidName);
        }
        let mut padded = [0u8; NAME_BYTES];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            name: padded,
            inode_index: inode_index as i32,
        })
    }

    /// The name without its zero padding.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_BYTES);
        &self.name[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.name == [0; NAME_BYTES]
    }

    pub fn encode(&self) -> [u8; DIR_ENTRY_BYTES] {
        let mut bytes = [0u8; DIR_ENTRY_BYTES];
        bytes[..NAME_BYTES].copy_from_slice(&self.name);
        bytes[NAME_BYTES..].copy_from_slice(&self.inode_index.to_be_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Self {
        let mut name = [0u8; NAME_BYTES];
        name.copy_from_slice(&bytes[..NAME_BYTES]);
        Self {
            name,
            inode_index: i32::from_be_bytes([
                bytes[NAME_BYTES],
                bytes[NAME_BYTES + 1],
                bytes[NAME_BYTES + 2],
                bytes[NAME_BYTES + 3],
            ]),
        }
    }
}

/// Number of slots the directory currently spans.
fn slot_count(dir: &OpenFile) -> usize {
    dir.length() / DIR_ENTRY_BYTES
}

/// Looks `name` up, returning the slot and its entry. Names longer than a
/// slot can hold never match.
pub fn find_entry(
    dir: &mut OpenFile,
    device: &mut BlockDevice,
    params: &FsParams,
    name: &str,
) -> Result<Option<(usize, DirEntry)>> {
    let target = name.as_bytes();
    if target.is_empty() || target.len() > NAME_BYTES {
        return Ok(None);
    }
    dir.seek(0)?;
    for slot in 0..slot_count(dir) {
        let bytes = dir.read(device, params, DIR_ENTRY_BYTES)?;
        let entry = DirEntry::decode(&bytes);
        if entry.name_bytes() == target {
            return Ok(Some((slot, entry)));
        }
    }
    Ok(None)
}

/// Returns the first reusable slot, or the append position when the
/// directory can still grow, or `None` when it is full.
pub fn find_free_slot(
    dir: &mut OpenFile,
    device: &mut BlockDevice,
    params: &FsParams,
) -> Result<Option<usize>> {
    let slots = slot_count(dir);
    dir.seek(0)?;
    for slot in 0..slots {
        let bytes = dir.read(device, params, DIR_ENTRY_BYTES)?;
        if DirEntry::decode(&bytes).is_empty() {
            return Ok(Some(slot));
        }
    }
    if (slots + 1) * DIR_ENTRY_BYTES <= params.max_file_size {
        Ok(Some(slots))
    } else {
        Ok(None)
    }
}

/// Writes `entry` at `slot`, growing the directory when the slot is the
/// append position.
pub fn write_entry(
    dir: &mut OpenFile,
    device: &mut BlockDevice,
    params: &FsParams,
    slot: usize,
    entry: &DirEntry,
) -> Result<()> {
    dir.seek(slot * DIR_ENTRY_BYTES)?;
    dir.write(device, params, &entry.encode())
}

/// Zeroes the slot, marking it reusable.
pub fn clear_entry(
    dir: &mut OpenFile,
    device: &mut BlockDevice,
    params: &FsParams,
    slot: usize,
) -> Result<()> {
    dir.seek(slot * DIR_ENTRY_BYTES)?;
    dir.write(device, params, &[0u8; DIR_ENTRY_BYTES])
}

/// All occupied entries in slot order.
pub fn list_entries(
    dir: &mut OpenFile,
    device: &mut BlockDevice,
    params: &FsParams,
) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    dir.seek(0)?;
    for _ in 0..slot_count(dir) {
        let bytes = dir.read(device, params, DIR_ENTRY_BYTES)?;
        let entry = DirEntry::decode(&bytes);
        if !entry.is_empty() {
            entries.push(entry);
        }
    }
    Ok(entries)
}
