use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A chunk of file data with the byte offset it starts at and whether it ends the file.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub offset: u64,
    pub data: Vec<u8>,
    pub is_last: bool,
}

/// Reads fixed-size chunks at arbitrary offsets, so a transfer can restart
/// from whatever byte the server last acknowledged. Only one chunk is held in
/// memory at a time.
pub struct ChunkReader {
    file: File,
    len: u64,
    chunk_size: usize,
}

impl ChunkReader {
    pub fn open(path: &Path, chunk_size: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    /// Number of chunks a transfer from offset zero needs.
    pub fn chunk_count(&self) -> u64 {
        self.len.div_ceil(self.chunk_size as u64)
    }

    /// Read the chunk that starts at `offset`. Returns `None` at end of file.
    pub fn read_at(&mut self, offset: u64) -> io::Result<Option<Chunk>> {
        if offset >= self.len {
            return Ok(None);
        }
        let want = (self.len - offset).min(self.chunk_size as u64) as usize;
        let mut buf = vec![0u8; want];
        self.file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < want {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled < want {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shrank while uploading: expected {} bytes", self.len),
            ));
        }

        Ok(Some(Chunk {
            offset,
            data: buf,
            is_last: offset + want as u64 >= self.len,
        }))
    }
}
