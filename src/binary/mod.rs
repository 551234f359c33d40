// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! On-disk framing for docno mappings and forward indexes.
//!
//! Both tables are written once per corpus snapshot and read whole at load
//! time, so the format favours simple sequential parsing over in-place
//! access. Each file is a payload wrapped in the same frame:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (8 bytes)                                           │
//! │   magic: [u8; 4] = "DCNO" | "FWDX"                         │
//! │   version: u8 = 1                                          │
//! │   flags: u8                                                │
//! │   reserved: [u8; 2]                                        │
//! ├────────────────────────────────────────────────────────────┤
//! │ PAYLOAD (table specific, see mapping/ and forward/)        │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic reversed                   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Security Considerations
//!
//! Loaders may be pointed at arbitrary files:
//! - All counts are checked against the bytes actually available
//! - String lengths are capped (MAX_DOCID_LEN, MAX_PATH_LEN)
//! - CRC32 footer detects corruption/truncation
//! - Varint decoder has maximum iteration limits

mod encoding;
mod header;

pub use encoding::{decode_varint, encode_string, encode_varint, ByteReader};
pub use header::{
    frame, unframe, FileKind, FrameFooter, FrameHeader, MAX_BLOCK_SIZE, MAX_DOCID_LEN,
    MAX_PATH_LEN, MAX_VARINT_BYTES, VERSION,
};

use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to `path` atomically: temp sibling, fsync, rename.
///
/// A crash or error mid-write leaves either the previous file or nothing,
/// never a truncated table.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Identify a framed file by its magic without validating the rest.
pub fn sniff_kind(bytes: &[u8]) -> Option<FileKind> {
    let magic: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    FileKind::from_magic(magic)
}
