//! Scene graph resolution
//!
//! Node chunks reference each other by id, forming a graph independent of
//! the chunk containment tree. Resolution walks that graph from the
//! document's first Transform, composing rotation and translation per hop
//! (Groups fan out, Shapes terminate) and emits one [`Model`] per shape
//! model reference. Each traversal path carries a visited set, so cyclic
//! id references fail instead of recursing unboundedly; recursion depth
//! is thereby bounded by the node count.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::content::RawVoxel;
use crate::geometry::{Matrix3, Vector3};
use crate::node::NodeChunk;
use crate::palette::{Color, Palette};
use crate::{push_warning, Error, Result, Warning};

/// One resolved voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voxel {
    /// Position within the model's grid
    pub position: Vector3,
    /// World position after the model's accumulated transform
    pub global_position: Vector3,
    /// 0-based palette index, remapped through IMAP when present
    pub palette_index: u8,
    pub color: Color,
}

/// One voxel grid placed by the scene graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Ordinal of the SIZE/XYZI pair this model references
    pub id: i32,
    /// Name from the nearest enclosing Transform
    pub name: Option<String>,
    /// True for every reference to this grid after the first, in
    /// traversal order
    pub is_copy: bool,
    pub local_position: Vector3,
    pub global_position: Vector3,
    pub local_rotation: Matrix3,
    pub global_rotation: Matrix3,
    pub local_size: Vector3,
    pub global_size: Vector3,
    pub voxels: Vec<Voxel>,
}

/// A SIZE/XYZI pair, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Grid {
    pub size: Vector3,
    pub voxels: Vec<RawVoxel>,
}

/// Accumulated transform state at one point of the traversal
#[derive(Clone)]
struct Placement {
    global_rotation: Matrix3,
    global_position: Vector3,
    /// Rotation and translation of the nearest enclosing Transform only
    local_rotation: Matrix3,
    local_position: Vector3,
    name: Option<String>,
}

impl Placement {
    fn root() -> Self {
        Self {
            global_rotation: Matrix3::IDENTITY,
            global_position: Vector3::ZERO,
            local_rotation: Matrix3::IDENTITY,
            local_position: Vector3::ZERO,
            name: None,
        }
    }
}

/// Resolve the node graph into a flat model list
///
/// Traversal starts at the first Transform chunk in document order. Files
/// without node chunks fall back to one identity-placed model per grid.
pub(crate) fn resolve(
    nodes: &[NodeChunk],
    grids: &[Grid],
    palette: &Palette,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Model>> {
    let root = nodes.iter().find_map(|n| match n {
        NodeChunk::Transform(t) => Some(t.id),
        _ => None,
    });

    let mut resolver = Resolver {
        nodes: nodes.iter().map(|n| (n.id(), n)).collect(),
        grids,
        palette,
        warnings,
        seen_models: HashSet::new(),
        models: Vec::new(),
    };

    match root {
        Some(root_id) => {
            let mut path = HashSet::new();
            resolver.visit(root_id, Placement::root(), &mut path)?;
        }
        None => resolver.emit_flat(),
    }

    Ok(resolver.models)
}

struct Resolver<'a> {
    nodes: HashMap<i32, &'a NodeChunk>,
    grids: &'a [Grid],
    palette: &'a Palette,
    warnings: &'a mut Vec<Warning>,
    seen_models: HashSet<i32>,
    models: Vec<Model>,
}

impl Resolver<'_> {
    fn visit(&mut self, id: i32, placement: Placement, path: &mut HashSet<i32>) -> Result<()> {
        if !path.insert(id) {
            return Err(Error::CyclicNodeGraph(id));
        }

        let Some(node) = self.nodes.get(&id).copied() else {
            push_warning(self.warnings, Warning::MissingNodeReference { node: id });
            path.remove(&id);
            return Ok(());
        };

        match node {
            NodeChunk::Transform(transform) => {
                let frame = transform.frame();
                let next = Placement {
                    global_rotation: placement.global_rotation * frame.rotation,
                    global_position: placement.global_position
                        + placement.global_rotation * frame.translation,
                    local_rotation: frame.rotation,
                    local_position: frame.translation,
                    name: transform.name().map(str::to_owned).or(placement.name),
                };
                self.visit(transform.child_id, next, path)?;
            }
            NodeChunk::Group(group) => {
                // Each child subtree starts from the same accumulated
                // transform; an empty group simply yields nothing.
                for &child in &group.child_ids {
                    self.visit(child, placement.clone(), path)?;
                }
            }
            NodeChunk::Shape(shape) => {
                for model_ref in &shape.models {
                    self.emit(shape.id, model_ref.model_id, &placement);
                }
            }
        }

        path.remove(&id);
        Ok(())
    }

    fn emit(&mut self, shape_id: i32, model_id: i32, placement: &Placement) {
        let grids = self.grids;
        let grid = usize::try_from(model_id).ok().and_then(|i| grids.get(i));
        let Some(grid) = grid else {
            push_warning(
                self.warnings,
                Warning::DanglingModelReference {
                    node: shape_id,
                    model: model_id,
                },
            );
            return;
        };

        let voxels = self.resolve_voxels(grid, placement);
        let is_copy = !self.seen_models.insert(model_id);
        self.models.push(Model {
            id: model_id,
            name: placement.name.clone(),
            is_copy,
            local_position: placement.local_position,
            global_position: placement.global_position,
            local_rotation: placement.local_rotation,
            global_rotation: placement.global_rotation,
            local_size: (placement.local_rotation * grid.size).abs(),
            global_size: (placement.global_rotation * grid.size).abs(),
            voxels,
        });
    }

    fn resolve_voxels(&self, grid: &Grid, placement: &Placement) -> Vec<Voxel> {
        let pivot = grid.size.half();
        grid.voxels
            .iter()
            .map(|raw| {
                let position =
                    Vector3::new(i32::from(raw.x), i32::from(raw.y), i32::from(raw.z));
                Voxel {
                    position,
                    global_position: placement.global_position
                        + placement.global_rotation.rotate_index(position - pivot),
                    palette_index: self.palette.mapped_index(raw.color_index.wrapping_sub(1)),
                    color: self.palette.voxel_color(raw.color_index),
                }
            })
            .collect()
    }

    /// Fallback for files exported without a scene graph
    fn emit_flat(&mut self) {
        let placement = Placement::root();
        let grids = self.grids;
        for (id, grid) in grids.iter().enumerate() {
            let voxels = self.resolve_voxels(grid, &placement);
            self.models.push(Model {
                id: id as i32,
                name: None,
                is_copy: false,
                local_position: Vector3::ZERO,
                global_position: Vector3::ZERO,
                local_rotation: Matrix3::IDENTITY,
                global_rotation: Matrix3::IDENTITY,
                local_size: grid.size,
                global_size: grid.size,
                voxels,
            });
        }
    }
}
