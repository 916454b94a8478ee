//! Application-wide constants. Runtime geometry lives in [`crate::params::FsParams`].

/// Current version of the on-device data format, stored in the superblock.
pub const FS_VERSION: i32 = 1;

/// Index of the superblock.
pub const SUPERBLOCK_INDEX: usize = 0;

/// Index of the first free-block bitmap block.
pub const BITMAP_START: usize = 1;

/// Number of direct block links in each inode.
pub const INODE_DIRECT: usize = 3;

/// Bytes one inode occupies on the device: an i32 length plus the direct links.
pub const INODE_SIZE: usize = 4 + 4 * INODE_DIRECT;

/// Bytes of the superblock payload: version, block size, block count, inode count.
pub const SUPERBLOCK_SIZE: usize = 4 * 4;

/// Bytes reserved for a file name in a directory entry.
pub const NAME_BYTES: usize = 4;

/// Bytes of one directory entry: name plus a big-endian inode index.
pub const DIR_ENTRY_BYTES: usize = NAME_BYTES + 4;

/// Inode that always holds the directory.
pub const DIRECTORY_INODE: usize = 0;

/// The smallest supported block size: the superblock must fit in one block
/// and an inode must never straddle more than two.
pub const MIN_BLOCK_SIZE: usize = if SUPERBLOCK_SIZE > INODE_SIZE {
    SUPERBLOCK_SIZE
} else {
    INODE_SIZE
};
