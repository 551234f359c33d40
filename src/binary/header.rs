// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Frame header and footer shared by every persisted table.
//!
//! The header is 8 bytes: which kind of file this is, which version wrote it,
//! and a flag byte the payload may use. The footer is 8 bytes: a CRC32 over
//! everything before it plus the header magic reversed. A file whose footer
//! does not check out was truncated or corrupted, and none of it is trusted.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Current format version
pub const VERSION: u8 = 1;

/// Maximum docid length in bytes
pub const MAX_DOCID_LEN: usize = 4096;

/// Maximum stored path length in bytes
pub const MAX_PATH_LEN: usize = 64 * 1024;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

/// Largest number of docnos one forward-index block may cover.
///
/// Bounds the linear scan behind every blocked lookup, and the scan that
/// derives the last docno when a file carries no document count.
pub const MAX_BLOCK_SIZE: u32 = 4096;

// ============================================================================
// FILE KINDS
// ============================================================================

/// Which table a framed file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Docno → docid table ("DCNO")
    DocnoMapping,
    /// Docno → (file, offset, length) table ("FWDX")
    ForwardIndex,
}

impl FileKind {
    pub fn magic(self) -> [u8; 4] {
        match self {
            FileKind::DocnoMapping => *b"DCNO",
            FileKind::ForwardIndex => *b"FWDX",
        }
    }

    /// Footer magic: header magic reversed.
    pub fn footer_magic(self) -> [u8; 4] {
        let mut magic = self.magic();
        magic.reverse();
        magic
    }

    pub fn name(self) -> &'static str {
        match self {
            FileKind::DocnoMapping => "docno mapping",
            FileKind::ForwardIndex => "forward index",
        }
    }

    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        [FileKind::DocnoMapping, FileKind::ForwardIndex]
            .into_iter()
            .find(|kind| kind.magic() == magic)
    }
}

// ============================================================================
// HEADER (8 bytes)
// ============================================================================

/// Frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: FileKind,
    pub version: u8,
    pub flags: u8,
}

impl FrameHeader {
    // 4 (magic) + 1 (version) + 1 (flags) + 2 (reserved) = 8
    pub const SIZE: usize = 8;

    pub fn new(kind: FileKind, flags: u8) -> Self {
        Self {
            kind,
            version: VERSION,
            flags,
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.kind.magic())?;
        w.write_all(&[self.version, self.flags])?;
        w.write_all(&[0u8; 2])?; // reserved
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)?;
        let magic = [buf[0], buf[1], buf[2], buf[3]];
        let kind = FileKind::from_magic(magic).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: {:?}", magic),
            )
        })?;
        Ok(Self {
            kind,
            version: buf[4],
            flags: buf[5],
        })
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone, Copy)]
pub struct FrameFooter {
    /// CRC32 checksum of header + payload (everything before footer)
    pub crc32: u32,
}

impl FrameFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, kind: FileKind, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&kind.footer_magic())?;
        Ok(())
    }

    pub fn read(kind: FileKind, bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File too short for footer",
            ));
        }

        let footer_start = bytes.len() - Self::SIZE;

        let magic = &bytes[footer_start + 4..];
        if magic != kind.footer_magic() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: {:?}", magic),
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

// ============================================================================
// FRAMING
// ============================================================================

/// Wrap `payload` in a header and checksummed footer.
pub fn frame(kind: FileKind, flags: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FrameHeader::SIZE + payload.len() + FrameFooter::SIZE);
    // Writes into a Vec cannot fail
    let _ = FrameHeader::new(kind, flags).write(&mut out);
    out.extend_from_slice(payload);
    let crc32 = FrameFooter::compute_crc32(&out);
    let _ = FrameFooter { crc32 }.write(kind, &mut out);
    out
}

/// Validate a framed file and return its header and payload.
///
/// Checks, in order: minimum size, header magic and kind, version, footer
/// magic, checksum.
pub fn unframe(expected: FileKind, bytes: &[u8]) -> io::Result<(FrameHeader, &[u8])> {
    if bytes.len() < FrameHeader::SIZE + FrameFooter::SIZE {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("File too short: {} bytes", bytes.len()),
        ));
    }

    let header = FrameHeader::read(&mut &bytes[..FrameHeader::SIZE])?;
    if header.kind != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Expected a {} file, found a {} file",
                expected.name(),
                header.kind.name()
            ),
        ));
    }
    if header.version != VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Unsupported version {} (expected {})",
                header.version, VERSION
            ),
        ));
    }

    let footer = FrameFooter::read(expected, bytes)?;
    let content_end = bytes.len() - FrameFooter::SIZE;
    let actual = FrameFooter::compute_crc32(&bytes[..content_end]);
    if actual != footer.crc32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Checksum mismatch: stored {:08x}, computed {:08x}",
                footer.crc32, actual
            ),
        ));
    }

    Ok((header, &bytes[FrameHeader::SIZE..content_end]))
}
