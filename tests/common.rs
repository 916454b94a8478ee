//! Common utilities for tests
#![allow(unused)]

use std::path::PathBuf;

use pion::*;

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
}

/// The geometry most end-to-end tests run with.
pub fn default_params() -> FsParams {
    FsParams::new(64, 64, 24, 5).unwrap()
}

pub fn default_fs() -> FileSystem {
    FileSystem::format(default_params()).unwrap()
}

/// Number of blocks currently on the free list.
pub fn free_block_count(fs: &FileSystem) -> usize {
    let params = *fs.params();
    let mut count = 0;
    for bitmap_block in 0..params.bitmap_blocks {
        let block = fs.device().read_block(BITMAP_START + bitmap_block).unwrap();
        for (byte_index, byte) in block.iter().enumerate() {
            for bit in 0..8 {
                let index = (bitmap_block * params.block_size + byte_index) * 8 + bit;
                if index < params.blocks && byte & (1 << bit) != 0 {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Number of free inodes in the table.
pub fn free_inode_count(fs: &FileSystem) -> usize {
    (0..fs.params().inodes)
        .filter(|&index| {
            inode::read_inode(fs.device(), fs.params(), index)
                .unwrap()
                .is_free()
        })
        .count()
}

/// A scratch file path unique to this test process.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pion-test-{}-{name}", std::process::id()))
}
