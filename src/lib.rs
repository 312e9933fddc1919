//! MagicaVoxel VOX container parser
//!
//! VOX files are a self-describing tree of tagged, length-prefixed chunks
//! followed by an implicit scene graph encoded in node chunks.
//!
//! # Format Overview
//!
//! ## File header
//!
//! - Bytes 0-3: "VOX " magic
//! - Bytes 4-7: Format version (little-endian i32, 150 or 200 in practice)
//! - Bytes 8+: Root chunks (a single MAIN chunk in well-formed files)
//!
//! ## Chunk layout
//!
//! Every chunk is self-describing:
//!
//! - Bytes 0-3: Four-character tag ("MAIN", "SIZE", "XYZI", ...)
//! - Bytes 4-7: Content length in bytes
//! - Bytes 8-11: Children region length in bytes (total, not a count)
//! - Content bytes, then child chunks filling the children region exactly
//!
//! No global schema is needed to skip a subtree; the two local length
//! fields are sufficient. Unrecognized tags are preserved generically.
//!
//! ## Scene graph
//!
//! Transform (nTRN), Group (nGRP) and Shape (nSHP) chunks reference each
//! other by integer node id, forming a graph that is logically separate
//! from the chunk containment tree. [`decode`] resolves that graph into a
//! flat list of positioned [`Model`]s.

mod chunk;
mod content;
mod document;
mod geometry;
mod node;
mod palette;
mod reader;
mod scene;

pub use chunk::{Chunk, ChunkKind, Tag};
pub use content::{
    IndexMapContent, NoteContent, PackContent, PaletteContent, RawVoxel, SizeContent,
    VoxelsContent,
};
pub use document::{decode, Document};
pub use geometry::{Matrix3, Vector3};
pub use node::{Frame, GroupNode, NodeChunk, ShapeModel, ShapeNode, TransformNode};
pub use palette::{Color, Palette};
pub use reader::ByteReader;
pub use scene::{Model, Voxel};

/// Magic bytes at the start of every VOX file
pub const VOX_MAGIC: [u8; 4] = *b"VOX ";

/// Chunk header size in bytes (tag + content length + children length)
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Number of palette entries
pub const PALETTE_SIZE: usize = 256;

/// Fatal decode errors
///
/// Structural errors abort the whole decode: a corrupt length field
/// invalidates everything downstream of it. Semantic findings that leave
/// the rest of the document usable are collected as [`Warning`]s instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid VOX magic: expected 'VOX ', got {0:02x?}")]
    InvalidMagic([u8; 4]),

    #[error("input truncated at offset {offset}: need {needed} bytes, {available} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("length field at offset {offset} is invalid: {value}")]
    InvalidLength { offset: usize, value: i64 },

    #[error("chunk '{tag}': children region of {declared} bytes does not partition into whole chunks ({consumed} consumed)")]
    MalformedChunk {
        tag: Tag,
        declared: usize,
        consumed: usize,
    },

    #[error("scene graph cycle through node {0}")]
    CyclicNodeGraph(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal findings collected on the [`Document`] during decode
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Warning {
    #[error("transform node {node}: reserved id is {value}, expected -1")]
    ReservedId { node: i32, value: i32 },

    #[error("transform node {node}: frame count is {count}, only frame 0 is used")]
    FrameCount { node: i32, count: i32 },

    #[error("node {node}: unrecognized {key} value {value:?}")]
    InvalidFrameValue {
        node: i32,
        key: &'static str,
        value: String,
    },

    #[error("PACK declares {declared} models, found {found} SIZE/XYZI pairs")]
    PackCountMismatch { declared: i32, found: usize },

    #[error("found {sizes} SIZE chunks but {voxel_chunks} XYZI chunks")]
    GridPairMismatch { sizes: usize, voxel_chunks: usize },

    #[error("shape node {node} references model {model} with no SIZE/XYZI pair")]
    DanglingModelReference { node: i32, model: i32 },

    #[error("reference to node {node}, which does not exist")]
    MissingNodeReference { node: i32 },
}

/// Record a warning and surface it on the log
pub(crate) fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_constant() {
        assert_eq!(VOX_MAGIC, *b"VOX ");
        assert_eq!(CHUNK_HEADER_SIZE, 12);
        assert_eq!(PALETTE_SIZE, 256);
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMagic(*b"ABCD");
        assert!(err.to_string().contains("invalid VOX magic"));

        let err = Error::Truncated {
            offset: 4,
            needed: 12,
            available: 3,
        };
        assert!(err.to_string().contains("truncated at offset 4"));

        let err = Error::MalformedChunk {
            tag: Tag(*b"MAIN"),
            declared: 40,
            consumed: 37,
        };
        assert!(err.to_string().contains("MAIN"));

        let err = Error::CyclicNodeGraph(7);
        assert!(err.to_string().contains("node 7"));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::DanglingModelReference { node: 3, model: 9 };
        assert!(warning.to_string().contains("model 9"));

        let warning = Warning::ReservedId { node: 1, value: 0 };
        assert!(warning.to_string().contains("expected -1"));
    }
}
