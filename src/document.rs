//! Document assembly
//!
//! [`decode`] is the one entry point: verify the file header, decode the
//! root chunk tree, walk it once to collect the typed chunk content, then
//! resolve the scene graph. The raw tree is kept on the [`Document`] for
//! diagnostics and tooling.

use serde::Serialize;

use crate::chunk::{Chunk, ChunkKind};
use crate::content::{
    IndexMapContent, NoteContent, PackContent, PaletteContent, SizeContent, VoxelsContent,
};
use crate::node::{GroupNode, NodeChunk, ShapeNode, TransformNode};
use crate::palette::Palette;
use crate::reader::ByteReader;
use crate::scene::{self, Grid, Model};
use crate::{push_warning, Error, Result, Warning, VOX_MAGIC};

/// One fully decoded VOX file
///
/// Deeply immutable once constructed; safe to share for concurrent reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Format version from the file header
    pub version: i32,
    /// Scene-resolved models, in traversal order
    pub models: Vec<Model>,
    pub palette: Palette,
    /// Root-level chunk nodes, preserved for diagnostics
    pub chunks: Vec<Chunk>,
    /// Non-fatal findings collected during decode
    pub warnings: Vec<Warning>,
}

/// Decode one VOX file from an in-memory buffer
pub fn decode(bytes: &[u8]) -> Result<Document> {
    let mut reader = ByteReader::new(bytes);

    let magic: [u8; 4] = reader.read_bytes(4)?.try_into().expect("4-byte read");
    if magic != VOX_MAGIC {
        return Err(Error::InvalidMagic(magic));
    }
    let version = reader.read_i32()?;

    let mut chunks = Vec::new();
    while !reader.is_empty() {
        chunks.push(Chunk::read(&mut reader)?);
    }

    let mut warnings = Vec::new();
    let collected = collect(&chunks, &mut warnings)?;

    let grids = pair_grids(collected.sizes, collected.voxel_chunks, &mut warnings);
    if let Some(pack) = collected.pack {
        if pack.model_count != grids.len() as i32 {
            push_warning(
                &mut warnings,
                Warning::PackCountMismatch {
                    declared: pack.model_count,
                    found: grids.len(),
                },
            );
        }
    }

    let palette = Palette::from_parts(
        collected.colors.map(|c| c.colors),
        collected.index_map.as_ref().map(|m| &m.indices),
        collected.notes.map(|n| n.notes).unwrap_or_default(),
    );

    let models = scene::resolve(&collected.nodes, &grids, &palette, &mut warnings)?;

    tracing::debug!(
        version,
        chunks = chunks.len(),
        models = models.len(),
        warnings = warnings.len(),
        "decoded VOX document"
    );

    Ok(Document {
        version,
        models,
        palette,
        chunks,
        warnings,
    })
}

#[derive(Default)]
struct Collected {
    pack: Option<PackContent>,
    sizes: Vec<SizeContent>,
    voxel_chunks: Vec<VoxelsContent>,
    colors: Option<PaletteContent>,
    index_map: Option<IndexMapContent>,
    notes: Option<NoteContent>,
    nodes: Vec<NodeChunk>,
}

/// One pass over the whole tree, specializing known chunk content
fn collect(chunks: &[Chunk], warnings: &mut Vec<Warning>) -> Result<Collected> {
    let mut out = Collected::default();
    let mut result: Result<()> = Ok(());
    for root in chunks {
        root.walk(&mut |chunk| {
            if result.is_err() {
                return;
            }
            result = specialize(chunk, &mut out, warnings);
        });
    }
    result.map(|()| out)
}

fn specialize(chunk: &Chunk, out: &mut Collected, warnings: &mut Vec<Warning>) -> Result<()> {
    match chunk.kind() {
        ChunkKind::Pack => out.pack = Some(PackContent::parse(&chunk.content)?),
        ChunkKind::Size => out.sizes.push(SizeContent::parse(&chunk.content)?),
        ChunkKind::Voxels => out.voxel_chunks.push(VoxelsContent::parse(&chunk.content)?),
        ChunkKind::Palette => out.colors = Some(PaletteContent::parse(&chunk.content)?),
        ChunkKind::IndexMap => out.index_map = Some(IndexMapContent::parse(&chunk.content)?),
        ChunkKind::Note => out.notes = Some(NoteContent::parse(&chunk.content)?),
        ChunkKind::Transform => out.nodes.push(NodeChunk::Transform(TransformNode::parse(
            &chunk.content,
            warnings,
        )?)),
        ChunkKind::Group => out
            .nodes
            .push(NodeChunk::Group(GroupNode::parse(&chunk.content)?)),
        ChunkKind::Shape => out
            .nodes
            .push(NodeChunk::Shape(ShapeNode::parse(&chunk.content)?)),
        ChunkKind::Main | ChunkKind::Unknown => {}
    }
    Ok(())
}

/// Pair the Nth SIZE chunk with the Nth XYZI chunk, in document order
fn pair_grids(
    sizes: Vec<SizeContent>,
    voxel_chunks: Vec<VoxelsContent>,
    warnings: &mut Vec<Warning>,
) -> Vec<Grid> {
    if sizes.len() != voxel_chunks.len() {
        push_warning(
            warnings,
            Warning::GridPairMismatch {
                sizes: sizes.len(),
                voxel_chunks: voxel_chunks.len(),
            },
        );
    }
    sizes
        .into_iter()
        .zip(voxel_chunks)
        .map(|(size, voxels)| Grid {
            size: size.size,
            voxels: voxels.voxels,
        })
        .collect()
}
