//! Sequential little-endian reads over an in-memory VOX buffer
//!
//! [`ByteReader`] wraps an immutable byte slice and a forward-only offset.
//! Every read consumes the exact byte width of its type; shortfalls fail
//! with [`Error::Truncated`] carrying the offset and byte counts.

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};

use crate::content::RawVoxel;
use crate::geometry::Vector3;
use crate::palette::Color;
use crate::{Error, Result};

/// Forward-only cursor over a byte slice
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current offset from the start of the wrapped slice
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Consume exactly `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    /// Read a length field that must be non-negative and fit in the buffer
    pub fn read_len(&mut self) -> Result<usize> {
        let at = self.offset;
        let value = self.read_i32()?;
        if value < 0 {
            return Err(Error::InvalidLength {
                offset: at,
                value: i64::from(value),
            });
        }
        Ok(value as usize)
    }

    /// Read a 4-byte length prefix followed by that many bytes of text
    ///
    /// VOX strings are raw bytes in practice; invalid UTF-8 is replaced
    /// rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a string-keyed dictionary: entry count, then key/value strings
    pub fn read_dict(&mut self) -> Result<HashMap<String, String>> {
        let at = self.offset;
        let count = self.read_len()?;
        // Each entry needs at least two length prefixes.
        if count.saturating_mul(8) > self.remaining() {
            return Err(Error::InvalidLength {
                offset: at,
                value: count as i64,
            });
        }
        let mut dict = HashMap::with_capacity(count);
        for _ in 0..count {
            let key = self.read_string()?;
            let value = self.read_string()?;
            dict.insert(key, value);
        }
        Ok(dict)
    }

    /// Read three signed 32-bit integers
    pub fn read_vector3(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    /// Read `count` four-byte RGBA records
    pub fn read_colors(&mut self, count: usize) -> Result<Vec<Color>> {
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let bytes = self.read_bytes(4)?;
            colors.push(Color::new(bytes[0], bytes[1], bytes[2], bytes[3]));
        }
        Ok(colors)
    }

    /// Read `count` four-byte (x, y, z, color index) records
    pub fn read_raw_voxels(&mut self, count: usize) -> Result<Vec<RawVoxel>> {
        let mut voxels = Vec::with_capacity(count);
        for _ in 0..count {
            let bytes = self.read_bytes(4)?;
            voxels.push(RawVoxel {
                x: bytes[0],
                y: bytes[1],
                z: bytes[2],
                color_index: bytes[3],
            });
        }
        Ok(voxels)
    }
}
