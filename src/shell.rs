//! The command line shell users drive the emulated file system with. Input
//! is a whitespace-separated token stream, so commands may span or share
//! lines; every error is reported and the loop keeps going.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::backup;
use crate::error::FsError;
use crate::fs::FileSystem;
use crate::params::FsParams;

/// Whitespace-separated tokens pulled lazily from a reader, so commands
/// may span lines or share one.
struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => self
                    .pending
                    .extend(line.split_whitespace().map(str::to_owned)),
            }
        }
    }
}

pub struct Shell<R, W> {
    tokens: Tokens<R>,
    out: W,
    fs: Option<FileSystem>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            tokens: Tokens::new(input),
            out,
            fs: None,
        }
    }

    /// Dispatches commands until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "File System Simulator v1.0")?;
        loop {
            write!(self.out, "FS> ")?;
            self.out.flush()?;
            let Some(command) = self.tokens.next() else {
                break;
            };
            match command.as_str() {
                "in" => self.load()?,
                "sv" => self.save()?,
                "cr" => self.create()?,
                "de" => self.destroy()?,
                "op" => self.open()?,
                "cl" => self.close()?,
                "rd" => self.read()?,
                "wr" => self.write()?,
                "sk" => self.seek()?,
                "dr" => self.directory()?,
                "exit" => break,
                _ => writeln!(self.out, "Command not recognized!")?,
            }
        }
        self.out.flush()
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        match self.tokens.next() {
            Some(token) => Ok(Some(token)),
            None => {
                writeln!(self.out, "error: unexpected end of input")?;
                Ok(None)
            }
        }
    }

    fn next_usize(&mut self) -> io::Result<Option<usize>> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };
        match token.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.out, "error: expected a number, got {token}")?;
                Ok(None)
            }
        }
    }

    /// `in backup|input|properties ...` - load or initialize the file system.
    fn load(&mut self) -> io::Result<()> {
        let Some(source) = self.next_token()? else {
            return Ok(());
        };
        match source.as_str() {
            "backup" => self.load_from_backup(),
            "input" => self.load_from_input(),
            "properties" => self.load_from_properties(),
            _ => writeln!(self.out, "Command not recognized!"),
        }
    }

    fn load_from_backup(&mut self) -> io::Result<()> {
        let Some(file_name) = self.next_token()? else {
            return Ok(());
        };
        let Some(max_open_files) = self.next_usize()? else {
            return Ok(());
        };
        let device = match backup::load_from_file(Path::new(&file_name)) {
            Ok(device) => device,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        match FileSystem::restore(device, max_open_files) {
            Ok(fs) => {
                self.fs = Some(fs);
                writeln!(self.out, "disk restored")
            }
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn load_from_input(&mut self) -> io::Result<()> {
        let Some(block_size) = self.next_usize()? else {
            return Ok(());
        };
        let Some(blocks) = self.next_usize()? else {
            return Ok(());
        };
        let Some(inodes) = self.next_usize()? else {
            return Ok(());
        };
        let Some(max_open_files) = self.next_usize()? else {
            return Ok(());
        };
        self.initialize(block_size, blocks, inodes, max_open_files)
    }

    fn load_from_properties(&mut self) -> io::Result<()> {
        let Some(file_name) = self.next_token()? else {
            return Ok(());
        };
        let properties = match read_properties(Path::new(&file_name)) {
            Ok(properties) => properties,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        let Some(block_size) = self.property_usize(&properties, "blockSize")? else {
            return Ok(());
        };
        let Some(blocks) = self.property_usize(&properties, "blocksNumber")? else {
            return Ok(());
        };
        let Some(inodes) = self.property_usize(&properties, "iNodesNumber")? else {
            return Ok(());
        };
        let Some(max_open_files) = self.property_usize(&properties, "maxOpenFilesNumber")? else {
            return Ok(());
        };
        self.initialize(block_size, blocks, inodes, max_open_files)
    }

    fn initialize(
        &mut self,
        block_size: usize,
        blocks: usize,
        inodes: usize,
        max_open_files: usize,
    ) -> io::Result<()> {
        let params = match FsParams::new(block_size, blocks, inodes, max_open_files) {
            Ok(params) => params,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        match FileSystem::format(params) {
            Ok(fs) => {
                self.fs = Some(fs);
                writeln!(self.out, "disk initialized")
            }
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn property_usize(
        &mut self,
        properties: &HashMap<String, String>,
        key: &str,
    ) -> io::Result<Option<usize>> {
        let Some(value) = properties.get(key) else {
            writeln!(self.out, "error: missing property {key}")?;
            return Ok(None);
        };
        match value.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.out, "error: property {key} is not a number: {value}")?;
                Ok(None)
            }
        }
    }

    fn save(&mut self) -> io::Result<()> {
        let Some(file_name) = self.next_token()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.save_backup(&PathBuf::from(&file_name)) {
            Ok(()) => writeln!(self.out, "disk saved"),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn create(&mut self) -> io::Result<()> {
        let Some(name) = self.next_token()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.create(&name) {
            Ok(()) => writeln!(self.out, "file {name} created"),
            Err(FsError::AlreadyExists) => writeln!(
                self.out,
                "error: the file with name {name} already exists"
            ),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn destroy(&mut self) -> io::Result<()> {
        let Some(name) = self.next_token()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.destroy(&name) {
            Ok(()) => writeln!(self.out, "file {name} destroyed"),
            Err(FsError::NotFound) => writeln!(
                self.out,
                "error: the file with name {name} doesn't exist"
            ),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn open(&mut self) -> io::Result<()> {
        let Some(name) = self.next_token()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.open(&name) {
            Ok(index) => writeln!(self.out, "file {name} opened, index={index}"),
            Err(FsError::NotFound) => writeln!(
                self.out,
                "error: the file with name {name} doesn't exist"
            ),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(index) = self.next_usize()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.close(index) {
            Ok(()) => writeln!(self.out, "file with index {index} closed"),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn read(&mut self) -> io::Result<()> {
        let Some(index) = self.next_usize()? else {
            return Ok(());
        };
        let Some(count) = self.next_usize()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.read(index, count) {
            Ok(bytes) => {
                let text: String = bytes.iter().map(|&b| b as char).collect();
                writeln!(self.out, "{count} bytes read: {text}")
            }
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn write(&mut self) -> io::Result<()> {
        let Some(index) = self.next_usize()? else {
            return Ok(());
        };
        let Some(character) = self.next_token()? else {
            return Ok(());
        };
        let Some(count) = self.next_usize()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        let data = vec![character.as_bytes()[0]; count];
        match fs.write(index, &data) {
            Ok(()) => writeln!(self.out, "{count} bytes written"),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn seek(&mut self) -> io::Result<()> {
        let Some(index) = self.next_usize()? else {
            return Ok(());
        };
        let Some(position) = self.next_usize()? else {
            return Ok(());
        };
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.lseek(index, position) {
            Ok(()) => writeln!(self.out, "current position is {position}"),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn directory(&mut self) -> io::Result<()> {
        let Some(fs) = self.fs.as_mut() else {
            return writeln!(self.out, "error: no file system loaded");
        };
        match fs.directory() {
            Ok(listing) => {
                for (name, length) in listing {
                    writeln!(self.out, "{name}\t{length}B")?;
                }
                Ok(())
            }
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }
}

/// Reads a `key=value` properties file. Blank lines and lines starting with
/// `#` or `!` are skipped.
pub fn read_properties(path: &Path) -> io::Result<HashMap<String, String>> {
    let contents = fs::read_to_string(path)?;
    let mut properties = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            properties.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    Ok(properties)
}
