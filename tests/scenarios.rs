//! End-to-end scenarios driving the whole façade.

mod common;

use common::{default_fs, free_block_count, free_inode_count};
use pion::*;

#[test]
fn create_write_and_read_back() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    assert_eq!(index, 1);
    fs.write(index, b"xyxy").unwrap();
    fs.close(index).unwrap();

    let index = fs.open("f").unwrap();
    assert_eq!(index, 1);
    assert_eq!(fs.read(index, 4).unwrap(), b"xyxy");
}

#[test]
fn read_past_end_of_file() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    fs.write(index, b"xyxy").unwrap();
    fs.lseek(index, 0).unwrap();

    assert!(matches!(fs.read(index, 5), Err(Error::ReadWrite(_))));
    // The file itself is untouched.
    assert_eq!(fs.read(index, 4).unwrap(), b"xyxy");
}

#[test]
fn write_spanning_blocks() {
    let mut fs = default_fs();
    fs.create("g").unwrap();
    let index = fs.open("g").unwrap();

    let data = vec![b'a'; 128];
    fs.write(index, &data).unwrap();
    fs.lseek(index, 0).unwrap();
    assert_eq!(fs.read(index, 128).unwrap(), data);

    // Two direct links in use, the third still unused.
    let node = inode::read_inode(fs.device(), fs.params(), 1).unwrap();
    assert_eq!(node.length, 128);
    assert!(node.blocks[0] >= 0 && node.blocks[1] >= 0);
    assert_eq!(node.blocks[2], -1);
}

#[test]
fn write_up_to_max_file_size() {
    let mut fs = default_fs();
    fs.create("big").unwrap();
    let index = fs.open("big").unwrap();

    let data = vec![b'x'; fs.params().max_file_size];
    fs.write(index, &data).unwrap();

    // One more byte is rejected before anything changes.
    assert!(matches!(fs.write(index, b"y"), Err(Error::ReadWrite(_))));
    fs.lseek(index, 0).unwrap();
    assert_eq!(fs.read(index, data.len()).unwrap(), data);
}

#[test]
fn destroy_frees_resources() {
    let mut fs = default_fs();
    let blocks_after_init = free_block_count(&fs);
    let inodes_after_init = free_inode_count(&fs);

    fs.create("h").unwrap();
    let index = fs.open("h").unwrap();
    fs.write(index, &vec![b'h'; 100]).unwrap();
    assert!(free_block_count(&fs) < blocks_after_init);

    fs.destroy("h").unwrap();
    assert_eq!(free_block_count(&fs), blocks_after_init);
    assert_eq!(free_inode_count(&fs), inodes_after_init);

    // The name is free for reuse.
    fs.create("h").unwrap();
}

#[test]
fn destroy_while_open() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    fs.write(index, b"data").unwrap();

    fs.destroy("f").unwrap();
    // The handle was closed by the destroy.
    assert_eq!(fs.close(index), Err(Error::NotFound));
    assert_eq!(fs.open("f"), Err(Error::NotFound));
}

#[test]
fn directory_listing_in_insertion_order() {
    let mut fs = default_fs();
    fs.create("a").unwrap();
    fs.create("bb").unwrap();

    let listing = fs.directory().unwrap();
    assert_eq!(
        listing,
        vec![("a".to_owned(), 0), ("bb".to_owned(), 0)]
    );

    let index = fs.open("bb").unwrap();
    fs.write(index, b"12345").unwrap();
    let listing = fs.directory().unwrap();
    assert_eq!(
        listing,
        vec![("a".to_owned(), 0), ("bb".to_owned(), 5)]
    );
}

#[test]
fn directory_slot_reuse_after_destroy() {
    let mut fs = default_fs();
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    fs.create("c").unwrap();
    fs.destroy("b").unwrap();
    fs.create("d").unwrap();

    let names: Vec<String> = fs.directory().unwrap().into_iter().map(|(n, _)| n).collect();
    // "d" takes the slot "b" gave up.
    assert_eq!(names, ["a", "d", "c"]);
}

#[test]
fn create_errors() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    assert_eq!(fs.create("f"), Err(Error::AlreadyExists));
    assert_eq!(fs.create("toolong"), Err(Error::InvalidName));
    assert_eq!(fs.create(""), Err(Error::InvalidName));
}

#[test]
fn open_and_close_errors() {
    let mut fs = default_fs();
    assert_eq!(fs.open("no"), Err(Error::NotFound));
    assert_eq!(fs.close(1), Err(Error::NotFound));
    // Slot 0 belongs to the directory and cannot be closed.
    assert_eq!(fs.close(0), Err(Error::NotFound));
    assert_eq!(fs.close(99), Err(Error::NotFound));
    assert_eq!(fs.destroy("no"), Err(Error::NotFound));
}

#[test]
fn open_file_table_fills_up() {
    let mut fs = default_fs();
    for name in ["a", "b", "c", "d", "e", "f"] {
        fs.create(name).unwrap();
    }
    for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        assert_eq!(fs.open(name).unwrap(), i + 1);
    }
    assert_eq!(fs.open("f"), Err(Error::TooManyOpenFiles));

    // Closing any slot makes it the next one handed out.
    fs.close(3).unwrap();
    assert_eq!(fs.open("f").unwrap(), 3);
}

#[test]
fn seek_bounds() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    fs.write(index, b"abcd").unwrap();

    // Seeking exactly to the length is legal, one past is not.
    fs.lseek(index, 4).unwrap();
    assert!(matches!(fs.read(index, 1), Err(Error::ReadWrite(_))));
    assert_eq!(fs.lseek(index, 5), Err(Error::OutOfRange));

    fs.lseek(index, 1).unwrap();
    assert_eq!(fs.read(index, 2).unwrap(), b"bc");
}

#[test]
fn overwrite_in_the_middle() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();

    fs.write(index, &vec![b'.'; 150]).unwrap();
    fs.lseek(index, 60).unwrap();
    fs.write(index, b"XXXXXXXX").unwrap();

    fs.lseek(index, 0).unwrap();
    let data = fs.read(index, 150).unwrap();
    assert_eq!(&data[..60], vec![b'.'; 60].as_slice());
    assert_eq!(&data[60..68], b"XXXXXXXX");
    assert_eq!(&data[68..], vec![b'.'; 82].as_slice());
    // Overwriting did not grow the file.
    assert_eq!(inode::read_inode(fs.device(), fs.params(), 1).unwrap().length, 150);
}

#[test]
fn write_survives_reopen_without_explicit_seek() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    fs.write(index, b"one").unwrap();
    fs.write(index, b"two").unwrap();
    fs.close(index).unwrap();

    let index = fs.open("f").unwrap();
    assert_eq!(fs.read(index, 6).unwrap(), b"onetwo");
}

#[test]
fn inode_exhaustion() {
    let mut fs = default_fs();
    // Inode 0 is the directory, so 23 user files fit.
    for i in 0..fs.params().inodes - 1 {
        fs.create(&format!("f{i}")).unwrap();
    }
    assert_eq!(fs.create("zz"), Err(Error::NoSpace("inodes")));

    // Destroying one makes room again.
    fs.destroy("f0").unwrap();
    fs.create("zz").unwrap();
}

#[test]
fn device_fills_up_during_write() {
    // 15 blocks: superblock, bitmap, 4 inode blocks, the directory block
    // and 8 data blocks for files.
    let params = FsParams::new(64, 15, 16, 2).unwrap();
    let mut fs = FileSystem::format(params).unwrap();

    // Each create takes one data block; eight exhaust the device.
    for i in 0..8 {
        fs.create(&format!("f{i}")).unwrap();
    }
    assert_eq!(fs.create("g"), Err(Error::NoSpace("blocks")));

    // A write that needs a second block finds none: the length is pinned at
    // the end of the last complete block and the write fails.
    let index = fs.open("f0").unwrap();
    let result = fs.write(index, &vec![b'x'; 100]);
    assert!(matches!(result, Err(Error::ReadWrite(_))));
    assert_eq!(
        inode::read_inode(fs.device(), fs.params(), 1).unwrap().length,
        64
    );
}

#[test]
fn no_two_files_share_a_block() {
    let mut fs = default_fs();
    fs.create("a").unwrap();
    fs.create("b").unwrap();
    let a = fs.open("a").unwrap();
    let b = fs.open("b").unwrap();
    fs.write(a, &vec![b'a'; 100]).unwrap();
    fs.write(b, &vec![b'b'; 100]).unwrap();
    fs.close(a).unwrap();
    fs.close(b).unwrap();

    let mut seen = Vec::new();
    for index in 0..fs.params().inodes {
        let node = inode::read_inode(fs.device(), fs.params(), index).unwrap();
        if node.is_free() {
            continue;
        }
        for link in node.blocks {
            if link >= 0 {
                assert!(!seen.contains(&link), "block {link} referenced twice");
                seen.push(link);
            }
        }
    }
}

#[test]
fn used_links_form_a_prefix() {
    let mut fs = default_fs();
    fs.create("f").unwrap();
    let index = fs.open("f").unwrap();
    fs.write(index, &vec![b'z'; 129]).unwrap();
    fs.close(index).unwrap();

    for i in 0..fs.params().inodes {
        let node = inode::read_inode(fs.device(), fs.params(), i).unwrap();
        let mut ended = false;
        for link in node.blocks {
            if link < 0 {
                ended = true;
            } else {
                assert!(!ended, "inode {i} has a gap in its block links");
            }
        }
    }
}
