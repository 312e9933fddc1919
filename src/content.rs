//! Typed views over chunk content
//!
//! Each specialization re-parses its chunk's content bytes with a fresh
//! [`ByteReader`]; the containment tree's children are never consulted
//! here.

use serde::Serialize;

use crate::geometry::Vector3;
use crate::palette::Color;
use crate::reader::ByteReader;
use crate::{Error, Result, PALETTE_SIZE};

/// One (x, y, z, color index) record from an XYZI chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawVoxel {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub color_index: u8,
}

/// PACK content: declared model count
///
/// Informational only; the actual model set is given by SIZE/XYZI pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackContent {
    pub model_count: i32,
}

impl PackContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        Ok(Self {
            model_count: reader.read_i32()?,
        })
    }
}

/// SIZE content: voxel grid dimensions for one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeContent {
    pub size: Vector3,
}

impl SizeContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        Ok(Self {
            size: reader.read_vector3()?,
        })
    }
}

/// XYZI content: sparse voxel records for one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelsContent {
    pub voxels: Vec<RawVoxel>,
}

impl VoxelsContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let count = reader.read_len()?;
        Ok(Self {
            voxels: reader.read_raw_voxels(count)?,
        })
    }
}

/// RGBA content: the 256-entry color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteContent {
    pub colors: [Color; PALETTE_SIZE],
}

impl PaletteContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let colors = reader.read_colors(PALETTE_SIZE)?;
        Ok(Self {
            colors: colors.try_into().expect("exactly 256 colors"),
        })
    }
}

/// IMAP content: 256 palette remap indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapContent {
    pub indices: [u8; PALETTE_SIZE],
}

impl IndexMapContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let bytes = reader.read_bytes(PALETTE_SIZE)?;
        Ok(Self {
            indices: bytes.try_into().expect("exactly 256 indices"),
        })
    }
}

/// NOTE content: palette row annotation strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContent {
    pub notes: Vec<String>,
}

impl NoteContent {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let at = reader.position();
        let count = reader.read_len()?;
        // Each note carries at least its own length prefix.
        if count.saturating_mul(4) > reader.remaining() {
            return Err(Error::InvalidLength {
                offset: at,
                value: count as i64,
            });
        }
        let mut notes = Vec::with_capacity(count);
        for _ in 0..count {
            notes.push(reader.read_string()?);
        }
        Ok(Self { notes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pack() {
        let pack = PackContent::parse(&3i32.to_le_bytes()).unwrap();
        assert_eq!(pack.model_count, 3);
    }

    #[test]
    fn test_parse_size() {
        let mut content = Vec::new();
        for v in [4i32, 8, 16] {
            content.extend_from_slice(&v.to_le_bytes());
        }
        let size = SizeContent::parse(&content).unwrap();
        assert_eq!(size.size, Vector3::new(4, 8, 16));
    }

    #[test]
    fn test_parse_voxels() {
        let mut content = 2i32.to_le_bytes().to_vec();
        content.extend_from_slice(&[0, 0, 0, 1, 3, 2, 1, 79]);
        let voxels = VoxelsContent::parse(&content).unwrap();
        assert_eq!(voxels.voxels.len(), 2);
        assert_eq!(voxels.voxels[1].z, 1);
        assert_eq!(voxels.voxels[1].color_index, 79);
    }

    #[test]
    fn test_parse_voxels_truncated_records() {
        let mut content = 5i32.to_le_bytes().to_vec();
        content.extend_from_slice(&[0; 8]);
        assert!(matches!(
            VoxelsContent::parse(&content),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_palette_requires_256_colors() {
        let content = vec![0u8; PALETTE_SIZE * 4];
        let palette = PaletteContent::parse(&content).unwrap();
        assert_eq!(palette.colors.len(), PALETTE_SIZE);

        let short = vec![0u8; 255 * 4];
        assert!(matches!(
            PaletteContent::parse(&short),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_index_map() {
        let mut content = [0u8; PALETTE_SIZE];
        for (i, v) in content.iter_mut().enumerate() {
            *v = i as u8;
        }
        let imap = IndexMapContent::parse(&content).unwrap();
        assert_eq!(imap.indices[255], 255);
    }

    #[test]
    fn test_parse_notes() {
        let mut content = 2i32.to_le_bytes().to_vec();
        for s in ["skin", "metal"] {
            content.extend_from_slice(&(s.len() as i32).to_le_bytes());
            content.extend_from_slice(s.as_bytes());
        }
        let note = NoteContent::parse(&content).unwrap();
        assert_eq!(note.notes, vec!["skin".to_string(), "metal".to_string()]);
    }

    #[test]
    fn test_parse_notes_rejects_absurd_count() {
        let content = i32::MAX.to_le_bytes();
        assert!(matches!(
            NoteContent::parse(&content),
            Err(Error::InvalidLength { .. })
        ));
    }
}
