// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Byte sources for the scanner: plain files (seekable) and compressed
//! streams (not seekable).
//!
//! A compressed stream cannot report or jump to a position in its
//! decompressed output, so the scanner never asks it to. Positions are
//! counted by the scanner itself, and a compressed file is always scanned as
//! one whole-file split.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Read buffer for corpus files
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Compression of a corpus file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Brotli,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("br") => Compression::Brotli,
            Some("zst") | Some("zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Only uncompressed files can be cut into byte-range splits.
    pub fn is_splittable(self) -> bool {
        self == Compression::None
    }
}

/// Buffered input for one scan.
pub enum ByteSource {
    Seekable(BufReader<File>),
    Stream(BufReader<Box<dyn Read + Send>>),
}

impl ByteSource {
    /// Open `path`, decompressing by extension.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(match Compression::from_path(path) {
            Compression::None => {
                ByteSource::Seekable(BufReader::with_capacity(READ_BUFFER_SIZE, file))
            }
            Compression::Brotli => {
                let decoder = brotli::Decompressor::new(file, READ_BUFFER_SIZE);
                ByteSource::stream(Box::new(decoder))
            }
            Compression::Zstd => {
                let decoder = zstd::stream::read::Decoder::new(file)?;
                ByteSource::stream(Box::new(decoder))
            }
        })
    }

    /// Wrap any reader as a non-seekable source.
    pub fn stream(reader: Box<dyn Read + Send>) -> Self {
        ByteSource::Stream(BufReader::with_capacity(READ_BUFFER_SIZE, reader))
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self, ByteSource::Seekable(_))
    }

    /// Move to `offset`: a seek when possible, otherwise read and discard.
    ///
    /// Returns the position actually reached, which is short of `offset`
    /// only when a stream ends first.
    pub fn skip_to(&mut self, offset: u64) -> io::Result<u64> {
        match self {
            ByteSource::Seekable(reader) => reader.seek(SeekFrom::Start(offset)),
            ByteSource::Stream(reader) => io::copy(&mut reader.by_ref().take(offset), &mut io::sink()),
        }
    }

    /// Position as reported by the OS, for seekable sources only.
    pub fn stream_position(&mut self) -> Option<u64> {
        match self {
            ByteSource::Seekable(reader) => reader.stream_position().ok(),
            ByteSource::Stream(_) => None,
        }
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ByteSource::Seekable(r) => r.read(buf),
            ByteSource::Stream(r) => r.read(buf),
        }
    }
}

impl BufRead for ByteSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            ByteSource::Seekable(r) => r.fill_buf(),
            ByteSource::Stream(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            ByteSource::Seekable(r) => r.consume(amt),
            ByteSource::Stream(r) => r.consume(amt),
        }
    }
}
