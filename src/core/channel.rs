//! Scoped, exclusively owned file handles.
//!
//! A [`FileChannel`] owns at most one open file. Opening a new file closes
//! the previous one first, and dropping the channel releases the handle, so
//! every exit path of an I/O operation gives the file back exactly once.
//!
//! Read channels work either through a buffered [`File`] or, with the
//! `mmap` feature, through a memory map. Both modes expose the same
//! sequential ([`BufRead`]) and random access ([`FileChannel::read_at`])
//! interface.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use tracing::{debug, warn};

use crate::util::{Error, Result};

/// How a channel opens its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMode {
    /// Read-only
    Read,
    /// Create/truncate for a text payload
    WriteText,
    /// Create/truncate for a binary payload, with no newline translation
    WriteBinary,
}

impl ChannelMode {
    #[inline]
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Read)
    }
}

enum Handle {
    Buffered(BufReader<File>),
    #[cfg(feature = "mmap")]
    Mapped { map: Mmap, pos: usize },
    Writer(BufWriter<File>),
}

/// Exclusive owner of at most one open file handle.
pub struct FileChannel {
    handle: Option<Handle>,
    path: PathBuf,
    mode: ChannelMode,
    len: u64,
}

impl Default for FileChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl FileChannel {
    /// Buffer size for buffered readers and writers.
    pub const BUFFER_SIZE: usize = 256 * 1024;

    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            handle: None,
            path: PathBuf::new(),
            mode: ChannelMode::Read,
            len: 0,
        }
    }

    /// Open `path` with buffered I/O.
    pub fn open(&mut self, path: impl AsRef<Path>, mode: ChannelMode) -> Result<()> {
        self.open_opts(path, mode, false)
    }

    /// Open `path`, memory-mapping it when `use_mmap` is set, the mode is
    /// [`ChannelMode::Read`], and the `mmap` feature is enabled.
    ///
    /// Any file this channel already owns is closed first, even if the new
    /// open fails.
    pub fn open_opts(&mut self, path: impl AsRef<Path>, mode: ChannelMode, use_mmap: bool) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyPath);
        }

        // Close file from any previous image
        if self.is_open() {
            self.close()?;
        }

        debug!(path = %path.display(), ?mode, use_mmap, "opening file channel");

        let file = if mode.is_write() {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
        } else {
            File::open(path)
        }
        .map_err(|e| Error::io(path, "open", e))?;

        let len = if mode.is_write() {
            0
        } else {
            file.metadata().map_err(|e| Error::io(path, "stat", e))?.len()
        };

        let handle = if mode.is_write() {
            Handle::Writer(BufWriter::with_capacity(Self::BUFFER_SIZE, file))
        } else {
            Self::reader_handle(path, file, len, use_mmap)?
        };

        self.handle = Some(handle);
        self.path = path.to_path_buf();
        self.mode = mode;
        self.len = len;
        Ok(())
    }

    #[cfg(feature = "mmap")]
    fn reader_handle(path: &Path, file: File, len: u64, use_mmap: bool) -> Result<Handle> {
        if use_mmap && len > 0 {
            // Safety: the file is opened read-only and the map never outlives
            // this channel
            let map = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, "map", e))?;
            return Ok(Handle::Mapped { map, pos: 0 });
        }
        Ok(Handle::Buffered(BufReader::with_capacity(Self::BUFFER_SIZE, file)))
    }

    #[cfg(not(feature = "mmap"))]
    fn reader_handle(_path: &Path, file: File, _len: u64, _use_mmap: bool) -> Result<Handle> {
        Ok(Handle::Buffered(BufReader::with_capacity(Self::BUFFER_SIZE, file)))
    }

    /// Flush pending writes and release the handle. Closing an empty
    /// channel is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        debug!(path = %self.path.display(), "closing file channel");
        if let Handle::Writer(mut writer) = handle {
            writer.flush().map_err(|e| Error::io(&self.path, "flush", e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| Error::io(&self.path, "close", e))?;
        }
        Ok(())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// True when the channel reads through a memory map.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        #[cfg(feature = "mmap")]
        {
            matches!(self.handle, Some(Handle::Mapped { .. }))
        }
        #[cfg(not(feature = "mmap"))]
        {
            false
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Size of the file when it was opened for reading.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move the sequential read cursor to `pos`.
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        let path = &self.path;
        match self.handle.as_mut() {
            Some(Handle::Buffered(reader)) => {
                reader
                    .seek(SeekFrom::Start(pos))
                    .map_err(|e| Error::io(path, "seek", e))?;
            }
            #[cfg(feature = "mmap")]
            Some(Handle::Mapped { map, pos: cursor }) => {
                *cursor = (pos as usize).min(map.len());
            }
            _ => return Err(Error::io(path, "seek", not_readable())),
        }
        Ok(())
    }

    /// Read exactly `buf.len()` bytes starting at absolute position `pos`.
    pub fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<()> {
        let path = &self.path;
        if pos + buf.len() as u64 > self.len {
            return Err(Error::io(
                path,
                "read",
                io::Error::new(io::ErrorKind::UnexpectedEof, format!("end of file before byte {}", pos + buf.len() as u64)),
            ));
        }
        match self.handle.as_mut() {
            Some(Handle::Buffered(reader)) => {
                reader
                    .seek(SeekFrom::Start(pos))
                    .and_then(|_| reader.read_exact(buf))
                    .map_err(|e| Error::io(path, "read", e))?;
            }
            #[cfg(feature = "mmap")]
            Some(Handle::Mapped { map, .. }) => {
                let start = pos as usize;
                buf.copy_from_slice(&map[start..start + buf.len()]);
            }
            _ => return Err(Error::io(path, "read", not_readable())),
        }
        Ok(())
    }
}

impl Drop for FileChannel {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!("failed to close {}: {}", self.path.display(), e);
            }
        }
    }
}

fn not_readable() -> io::Error {
    io::Error::other("channel is not open for reading")
}

fn not_writable() -> io::Error {
    io::Error::other("channel is not open for writing")
}

impl Read for FileChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.handle.as_mut() {
            Some(Handle::Buffered(reader)) => reader.read(buf),
            #[cfg(feature = "mmap")]
            Some(Handle::Mapped { map, pos }) => {
                let rest = &map[*pos..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                *pos += n;
                Ok(n)
            }
            _ => Err(not_readable()),
        }
    }
}

impl BufRead for FileChannel {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.handle.as_mut() {
            Some(Handle::Buffered(reader)) => reader.fill_buf(),
            #[cfg(feature = "mmap")]
            Some(Handle::Mapped { map, pos }) => Ok(&map[*pos..]),
            _ => Err(not_readable()),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self.handle.as_mut() {
            Some(Handle::Buffered(reader)) => reader.consume(amt),
            #[cfg(feature = "mmap")]
            Some(Handle::Mapped { map, pos }) => *pos = (*pos + amt).min(map.len()),
            _ => {}
        }
    }
}

impl Write for FileChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.handle.as_mut() {
            Some(Handle::Writer(writer)) => writer.write(buf),
            _ => Err(not_writable()),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.handle.as_mut() {
            Some(Handle::Writer(writer)) => writer.write_all(buf),
            _ => Err(not_writable()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.handle.as_mut() {
            Some(Handle::Writer(writer)) => writer.flush(),
            _ => Ok(()),
        }
    }
}
