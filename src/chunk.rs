//! Generic chunk-tree decoding
//!
//! A chunk is decoded into its tag, raw content bytes and recursively
//! decoded children. Unrecognized tags are preserved as-is so that files
//! carrying newer chunk types still decode; callers skip what they do not
//! understand via the length fields alone.

use std::fmt;

use serde::Serialize;

use crate::reader::ByteReader;
use crate::{Error, Result, CHUNK_HEADER_SIZE};

/// Four-character chunk identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const MAIN: Tag = Tag(*b"MAIN");
    pub const PACK: Tag = Tag(*b"PACK");
    pub const SIZE: Tag = Tag(*b"SIZE");
    pub const XYZI: Tag = Tag(*b"XYZI");
    pub const RGBA: Tag = Tag(*b"RGBA");
    pub const IMAP: Tag = Tag(*b"IMAP");
    pub const NOTE: Tag = Tag(*b"NOTE");
    pub const TRANSFORM: Tag = Tag(*b"nTRN");
    pub const GROUP: Tag = Tag(*b"nGRP");
    pub const SHAPE: Tag = Tag(*b"nSHP");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for b in self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "{:02x?}", self.0)
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Known chunk kinds, with a catch-all for everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Main,
    Pack,
    Size,
    Voxels,
    Palette,
    IndexMap,
    Note,
    Transform,
    Group,
    Shape,
    Unknown,
}

impl ChunkKind {
    pub fn from_tag(tag: Tag) -> ChunkKind {
        match tag {
            Tag::MAIN => ChunkKind::Main,
            Tag::PACK => ChunkKind::Pack,
            Tag::SIZE => ChunkKind::Size,
            Tag::XYZI => ChunkKind::Voxels,
            Tag::RGBA => ChunkKind::Palette,
            Tag::IMAP => ChunkKind::IndexMap,
            Tag::NOTE => ChunkKind::Note,
            Tag::TRANSFORM => ChunkKind::Transform,
            Tag::GROUP => ChunkKind::Group,
            Tag::SHAPE => ChunkKind::Shape,
            _ => ChunkKind::Unknown,
        }
    }
}

/// One decoded chunk node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub tag: Tag,
    pub content: Vec<u8>,
    pub children: Vec<Chunk>,
    /// Encoded size of this node's whole subtree: header + content +
    /// children region. The parent decode loop advances by this amount.
    pub total_bytes: usize,
}

impl Chunk {
    /// Decode one chunk starting at the beginning of `input`
    pub fn decode(input: &[u8]) -> Result<Chunk> {
        let mut reader = ByteReader::new(input);
        Chunk::read(&mut reader)
    }

    /// Decode one chunk at the reader's current position
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Chunk> {
        let tag = Tag(reader.read_bytes(4)?.try_into().expect("4-byte read"));
        let content_len = reader.read_len()?;
        let children_len = reader.read_len()?;

        let content = reader.read_bytes(content_len)?.to_vec();
        let children_bytes = reader.read_bytes(children_len)?;
        let children = Self::read_children(tag, children_bytes)?;

        Ok(Chunk {
            tag,
            content,
            children,
            total_bytes: CHUNK_HEADER_SIZE + content_len + children_len,
        })
    }

    /// Decode child chunks until the children region is exhausted
    ///
    /// The region is fully present in `bytes`, so a child running out of
    /// input means its length fields overrun the region: the parent's
    /// children length does not partition into whole chunks.
    fn read_children(tag: Tag, bytes: &[u8]) -> Result<Vec<Chunk>> {
        let mut reader = ByteReader::new(bytes);
        let mut children = Vec::new();
        while !reader.is_empty() {
            match Chunk::read(&mut reader) {
                Ok(child) => children.push(child),
                Err(Error::Truncated { .. }) => {
                    return Err(Error::MalformedChunk {
                        tag,
                        declared: bytes.len(),
                        consumed: reader.position(),
                    })
                }
                Err(e) => return Err(e),
            }
        }
        Ok(children)
    }

    pub fn kind(&self) -> ChunkKind {
        ChunkKind::from_tag(self.tag)
    }

    /// Depth-first visit of this node and every descendant
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s Chunk)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
