//! Binary snapshot format for persisted count tables.
//!
//! Layout (little-endian):
//!
//! ```text
//! magic      4 bytes   "DCCS"
//! version    u16       1
//! saved_at   i64       unix milliseconds
//! scope      string
//! categories u32 n, then n × (string category, f64 count)
//! features   u32 n, then n × (string feature, string category, f64 count)
//! checksum   u32       CRC32 of every preceding byte
//! ```
//!
//! Strings are a `u32` byte length followed by UTF-8 bytes.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};

use crate::error::{DocclassError, Result};
use crate::store::CountTable;

/// Leading bytes of every snapshot file.
pub const MAGIC: &[u8; 4] = b"DCCS";

/// Current snapshot format version.
pub const VERSION: u16 = 1;

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Owner the counts belong to.
    pub scope: String,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The counters.
    pub table: CountTable,
}

/// Writes snapshot fields while tracking a running checksum.
pub struct SnapshotWriter<W: Write> {
    writer: W,
    hasher: crc32fast::Hasher,
}

impl<W: Write> SnapshotWriter<W> {
    /// Create a new snapshot writer.
    pub fn new(writer: W) -> Self {
        SnapshotWriter {
            writer,
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Write raw bytes without length prefix.
    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        self.update_checksum(value);
        Ok(())
    }

    /// Write a u16 value (little-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.update_checksum(&value.to_le_bytes());
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.update_checksum(&value.to_le_bytes());
        Ok(())
    }

    /// Write an i64 value (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.writer.write_i64::<LittleEndian>(value)?;
        self.update_checksum(&value.to_le_bytes());
        Ok(())
    }

    /// Write a f64 value (little-endian).
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.writer.write_f64::<LittleEndian>(value)?;
        self.update_checksum(&value.to_le_bytes());
        Ok(())
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_u32(length_u32(bytes.len())?)?;
        self.write_raw(bytes)
    }

    fn update_checksum(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Append the checksum and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let checksum = self.hasher.clone().finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads snapshot fields from an in-memory buffer, tracking a running checksum.
pub struct SnapshotReader<'a> {
    cursor: Cursor<&'a [u8]>,
    body_len: u64,
    hasher: crc32fast::Hasher,
}

impl<'a> SnapshotReader<'a> {
    /// Create a reader over a complete snapshot buffer.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(DocclassError::storage("snapshot too short for checksum"));
        }
        Ok(SnapshotReader {
            cursor: Cursor::new(data),
            body_len: (data.len() - 4) as u64,
            hasher: crc32fast::Hasher::new(),
        })
    }

    fn remaining(&self) -> u64 {
        self.body_len.saturating_sub(self.cursor.position())
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        if needed > self.remaining() {
            Err(DocclassError::storage(format!(
                "snapshot truncated at byte {}",
                self.cursor.position()
            )))
        } else {
            Ok(())
        }
    }

    /// Read `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure(len as u64)?;
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf)?;
        self.hasher.update(&buf);
        Ok(buf)
    }

    /// Read a u16 value (little-endian).
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = self.cursor.read_u16::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let value = self.cursor.read_u32::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read an i64 value (little-endian).
    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        let value = self.cursor.read_i64::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a f64 value (little-endian).
    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        let value = self.cursor.read_f64::<LittleEndian>()?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a length-prefixed string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_raw(len)?;
        String::from_utf8(bytes)
            .map_err(|e| DocclassError::storage(format!("snapshot string is not UTF-8: {e}")))
    }

    /// Check that the body was fully consumed and matches the stored checksum.
    pub fn verify_checksum(mut self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(DocclassError::storage(format!(
                "snapshot has {} unexpected trailing bytes",
                self.remaining()
            )));
        }
        let stored = self.cursor.read_u32::<LittleEndian>()?;
        let computed = self.hasher.finalize();
        if stored != computed {
            return Err(DocclassError::storage(format!(
                "snapshot checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
            )));
        }
        Ok(())
    }
}

fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| DocclassError::storage(format!("length {len} exceeds snapshot limits")))
}

/// Encode a count table for `scope`.
pub fn encode(scope: &str, table: &CountTable, saved_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut writer = SnapshotWriter::new(Vec::new());

    writer.write_raw(MAGIC)?;
    writer.write_u16(VERSION)?;
    writer.write_i64(saved_at.timestamp_millis())?;
    writer.write_string(scope)?;

    let categories = table.category_rows();
    writer.write_u32(length_u32(categories.len())?)?;
    for row in &categories {
        writer.write_string(&row.category)?;
        writer.write_f64(row.count)?;
    }

    let features = table.feature_rows();
    writer.write_u32(length_u32(features.len())?)?;
    for row in &features {
        writer.write_string(&row.feature)?;
        writer.write_string(&row.category)?;
        writer.write_f64(row.count)?;
    }

    writer.finish()
}

/// Decode and verify a snapshot buffer.
pub fn decode(data: &[u8]) -> Result<Snapshot> {
    let mut reader = SnapshotReader::new(data)?;

    let magic = reader.read_raw(MAGIC.len())?;
    if magic.as_slice() != MAGIC {
        return Err(DocclassError::storage("not a count snapshot (bad magic)"));
    }

    let version = reader.read_u16()?;
    if version != VERSION {
        return Err(DocclassError::storage(format!(
            "unsupported snapshot version {version}"
        )));
    }

    let millis = reader.read_i64()?;
    let saved_at = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DocclassError::storage(format!("invalid snapshot timestamp {millis}")))?;
    let scope = reader.read_string()?;

    let mut table = CountTable::new();

    let category_rows = reader.read_u32()?;
    for _ in 0..category_rows {
        let category = reader.read_string()?;
        let count = checked_count(reader.read_f64()?)?;
        table.add_category(&category, count);
    }

    let feature_rows = reader.read_u32()?;
    for _ in 0..feature_rows {
        let feature = reader.read_string()?;
        let category = reader.read_string()?;
        let count = checked_count(reader.read_f64()?)?;
        table.add_feature(&feature, &category, count);
    }

    reader.verify_checksum()?;

    Ok(Snapshot {
        scope,
        saved_at,
        table,
    })
}

fn checked_count(count: f64) -> Result<f64> {
    if count.is_finite() && count >= 0.0 {
        Ok(count)
    } else {
        Err(DocclassError::storage(format!(
            "snapshot holds invalid count {count}"
        )))
    }
}
