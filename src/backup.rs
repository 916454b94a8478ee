//! Whole-device backup: a deterministic snapshot file holding the geometry
//! header followed by the raw device bytes. Restoring yields a device whose
//! blocks are bit-identical to the saved one; the file system parameters are
//! then reconstructed from the superblock.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::block_dev::BlockDevice;

/// Writes the device to `path`: block count and block size as big-endian
/// i32, then all device bytes.
pub fn save_to_file(device: &BlockDevice, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&(device.num_blocks() as i32).to_be_bytes())?;
    file.write_all(&(device.block_size() as i32).to_be_bytes())?;
    file.write_all(device.as_bytes())?;
    file.flush()
}

/// Reads a device back from `path`. A header that does not describe a
/// plausible device, missing bytes or trailing bytes are all data errors.
pub fn load_from_file(path: &Path) -> io::Result<BlockDevice> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 8];
    file.read_exact(&mut header)?;
    let blocks = i32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let block_size = i32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    if blocks <= 0 || block_size <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "backup header describes an empty device",
        ));
    }

    let size = (blocks as usize)
        .checked_mul(block_size as usize)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "backup header overflows"))?;
    let mut data = vec![0u8; size];
    file.read_exact(&mut data)?;
    if file.read(&mut [0u8; 1])? != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "trailing bytes after device content",
        ));
    }

    BlockDevice::from_bytes(blocks as usize, block_size as usize, data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
