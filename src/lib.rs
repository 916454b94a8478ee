//! Pion is an emulated UNIX-style single-level file system layered over a
//! fixed-size block device held entirely in memory.
//!
//! Linear device layout:
//! - Superblock (version and geometry)
//! - Free-block bitmap
//! - Inode table
//! - Data blocks (the directory file included)
//!
//! Layers, from bottom to top:
//! 1. Block device: whole-block reads and writes over an in-memory array.
//! 2. Bitmap and inode table: allocation state, always read from the device.
//! 3. Directory: the file at inode 0, mapping names to inodes.
//! 4. Open-file table: per-file cursor and a one-block write-back buffer.
//! 5. FileSystem: the façade that coordinates all of the above.
//! 6. Shell: a command REPL over the façade.

pub mod backup;
pub mod bitmap;
pub mod block_dev;
pub mod config;
pub mod directory;
pub mod error;
pub mod file;
pub mod fs;
pub mod inode;
pub mod params;
pub mod shell;
pub mod superblock;

pub use block_dev::BlockDevice;
pub use config::*;
pub use directory::DirEntry;
pub use error::FsError as Error;
pub use error::Result;
pub use file::OpenFile;
pub use fs::FileSystem;
pub use inode::Inode;
pub use params::FsParams;
pub use shell::Shell;
pub use superblock::{read_superblock, write_superblock, SuperBlock};
