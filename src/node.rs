//! Node-graph chunk specializations
//!
//! Transform (nTRN), Group (nGRP) and Shape (nSHP) chunks share a common
//! header (node id + attribute dictionary) and reference each other by
//! node id, not by tree nesting. The format's fixed assumptions -- a
//! reserved id of -1 and a single frame per transform -- are checked and
//! surfaced as warnings rather than failures, since decode can proceed
//! with defaults.

use std::collections::HashMap;

use crate::geometry::{Matrix3, Vector3};
use crate::reader::ByteReader;
use crate::{push_warning, Result, Warning};

/// One keyed (rotation, translation) sample on a Transform node
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rotation: Matrix3,
    pub translation: Vector3,
    pub attributes: HashMap<String, String>,
}

impl Frame {
    /// Build a frame from its attribute dictionary
    ///
    /// `_r` holds the rotation byte as a decimal string, `_t` three
    /// space-separated integers. Absent keys default to identity and
    /// zero; unparseable values warn and fall back the same way.
    fn from_attributes(
        node: i32,
        attributes: HashMap<String, String>,
        warnings: &mut Vec<Warning>,
    ) -> Frame {
        let rotation = match attributes.get("_r") {
            Some(raw) => match raw.trim().parse::<u8>().ok().and_then(Matrix3::from_rotation_byte) {
                Some(m) => m,
                None => {
                    push_warning(
                        warnings,
                        Warning::InvalidFrameValue {
                            node,
                            key: "_r",
                            value: raw.clone(),
                        },
                    );
                    Matrix3::IDENTITY
                }
            },
            None => Matrix3::IDENTITY,
        };

        let translation = match attributes.get("_t") {
            Some(raw) => {
                let parts: Vec<i32> = raw
                    .split_whitespace()
                    .map_while(|p| p.parse().ok())
                    .collect();
                if parts.len() == 3 {
                    Vector3::new(parts[0], parts[1], parts[2])
                } else {
                    push_warning(
                        warnings,
                        Warning::InvalidFrameValue {
                            node,
                            key: "_t",
                            value: raw.clone(),
                        },
                    );
                    Vector3::ZERO
                }
            }
            None => Vector3::ZERO,
        };

        Frame {
            rotation,
            translation,
            attributes,
        }
    }

    pub fn identity() -> Frame {
        Frame {
            rotation: Matrix3::IDENTITY,
            translation: Vector3::ZERO,
            attributes: HashMap::new(),
        }
    }
}

/// nTRN content
#[derive(Debug, Clone, PartialEq)]
pub struct TransformNode {
    pub id: i32,
    pub attributes: HashMap<String, String>,
    pub child_id: i32,
    pub layer_id: i32,
    pub frames: Vec<Frame>,
}

impl TransformNode {
    pub fn parse(content: &[u8], warnings: &mut Vec<Warning>) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let id = reader.read_i32()?;
        let attributes = reader.read_dict()?;
        let child_id = reader.read_i32()?;

        let reserved_id = reader.read_i32()?;
        if reserved_id != -1 {
            push_warning(
                warnings,
                Warning::ReservedId {
                    node: id,
                    value: reserved_id,
                },
            );
        }

        let layer_id = reader.read_i32()?;

        let frame_count = reader.read_i32()?;
        if frame_count != 1 {
            push_warning(
                warnings,
                Warning::FrameCount {
                    node: id,
                    count: frame_count,
                },
            );
        }

        // All frames are decoded, but only frame 0 drives the scene.
        let mut frames = Vec::new();
        for _ in 0..frame_count.max(0) {
            let dict = reader.read_dict()?;
            frames.push(Frame::from_attributes(id, dict, warnings));
        }
        if frames.is_empty() {
            frames.push(Frame::identity());
        }

        Ok(Self {
            id,
            attributes,
            child_id,
            layer_id,
            frames,
        })
    }

    /// The `_name` attribute, when present and non-empty
    pub fn name(&self) -> Option<&str> {
        self.attributes
            .get("_name")
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// The single active frame
    pub fn frame(&self) -> &Frame {
        &self.frames[0]
    }
}

/// nGRP content
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: i32,
    pub attributes: HashMap<String, String>,
    pub child_ids: Vec<i32>,
}

impl GroupNode {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let id = reader.read_i32()?;
        let attributes = reader.read_dict()?;
        let count = reader.read_len()?;
        let mut child_ids = Vec::with_capacity(count.min(reader.remaining() / 4));
        for _ in 0..count {
            child_ids.push(reader.read_i32()?);
        }
        Ok(Self {
            id,
            attributes,
            child_ids,
        })
    }
}

/// One (model id, attributes) reference inside a Shape node
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeModel {
    pub model_id: i32,
    pub attributes: HashMap<String, String>,
}

/// nSHP content
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeNode {
    pub id: i32,
    pub attributes: HashMap<String, String>,
    pub models: Vec<ShapeModel>,
}

impl ShapeNode {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(content);
        let id = reader.read_i32()?;
        let attributes = reader.read_dict()?;
        let count = reader.read_len()?;
        let mut models = Vec::with_capacity(count.min(reader.remaining() / 8));
        for _ in 0..count {
            models.push(ShapeModel {
                model_id: reader.read_i32()?,
                attributes: reader.read_dict()?,
            });
        }
        Ok(Self {
            id,
            attributes,
            models,
        })
    }
}

/// Any node-graph chunk, for id-indexed lookup
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChunk {
    Transform(TransformNode),
    Group(GroupNode),
    Shape(ShapeNode),
}

impl NodeChunk {
    pub fn id(&self) -> i32 {
        match self {
            NodeChunk::Transform(n) => n.id,
            NodeChunk::Group(n) => n.id,
            NodeChunk::Shape(n) => n.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn str_bytes(s: &str) -> Vec<u8> {
        let mut out = (s.len() as i32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    fn dict_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut out = (entries.len() as i32).to_le_bytes().to_vec();
        for (k, v) in entries {
            out.extend(str_bytes(k));
            out.extend(str_bytes(v));
        }
        out
    }

    fn transform_bytes(
        id: i32,
        attrs: &[(&str, &str)],
        child: i32,
        reserved: i32,
        frames: &[&[(&str, &str)]],
    ) -> Vec<u8> {
        let mut out = id.to_le_bytes().to_vec();
        out.extend(dict_bytes(attrs));
        out.extend_from_slice(&child.to_le_bytes());
        out.extend_from_slice(&reserved.to_le_bytes());
        out.extend_from_slice(&0i32.to_le_bytes()); // layer id
        out.extend_from_slice(&(frames.len() as i32).to_le_bytes());
        for frame in frames {
            out.extend(dict_bytes(frame));
        }
        out
    }

    #[test]
    fn test_parse_transform_with_rotation_and_translation() {
        let content = transform_bytes(
            0,
            &[("_name", "torso")],
            1,
            -1,
            &[&[("_r", "4"), ("_t", "3 -2 7")]],
        );
        let mut warnings = Vec::new();
        let node = TransformNode::parse(&content, &mut warnings).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(node.id, 0);
        assert_eq!(node.child_id, 1);
        assert_eq!(node.name(), Some("torso"));
        assert_eq!(node.frame().rotation, Matrix3::IDENTITY);
        assert_eq!(node.frame().translation, Vector3::new(3, -2, 7));
    }

    #[test]
    fn test_missing_frame_keys_default_to_identity() {
        let content = transform_bytes(2, &[], 3, -1, &[&[]]);
        let mut warnings = Vec::new();
        let node = TransformNode::parse(&content, &mut warnings).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(node.frame().rotation, Matrix3::IDENTITY);
        assert_eq!(node.frame().translation, Vector3::ZERO);
    }

    #[test]
    fn test_reserved_id_violation_warns() {
        let content = transform_bytes(5, &[], 6, 0, &[&[]]);
        let mut warnings = Vec::new();
        TransformNode::parse(&content, &mut warnings).unwrap();
        assert_eq!(warnings, vec![Warning::ReservedId { node: 5, value: 0 }]);
    }

    #[test]
    fn test_multiple_frames_warn_but_parse() {
        let content = transform_bytes(1, &[], 2, -1, &[&[("_t", "1 0 0")], &[("_t", "9 9 9")]]);
        let mut warnings = Vec::new();
        let node = TransformNode::parse(&content, &mut warnings).unwrap();

        assert_eq!(warnings, vec![Warning::FrameCount { node: 1, count: 2 }]);
        assert_eq!(node.frames.len(), 2);
        // Frame 0 stays the active one.
        assert_eq!(node.frame().translation, Vector3::new(1, 0, 0));
    }

    #[test]
    fn test_garbage_frame_values_warn_and_default() {
        let content = transform_bytes(3, &[], 4, -1, &[&[("_r", "potato"), ("_t", "1 2")]]);
        let mut warnings = Vec::new();
        let node = TransformNode::parse(&content, &mut warnings).unwrap();

        assert_eq!(warnings.len(), 2);
        assert_eq!(node.frame().rotation, Matrix3::IDENTITY);
        assert_eq!(node.frame().translation, Vector3::ZERO);
    }

    #[test]
    fn test_parse_group() {
        let mut content = 7i32.to_le_bytes().to_vec();
        content.extend(dict_bytes(&[]));
        content.extend_from_slice(&3i32.to_le_bytes());
        for child in [8i32, 9, 10] {
            content.extend_from_slice(&child.to_le_bytes());
        }

        let node = GroupNode::parse(&content).unwrap();
        assert_eq!(node.id, 7);
        assert_eq!(node.child_ids, vec![8, 9, 10]);
    }

    #[test]
    fn test_parse_shape() {
        let mut content = 11i32.to_le_bytes().to_vec();
        content.extend(dict_bytes(&[]));
        content.extend_from_slice(&1i32.to_le_bytes());
        content.extend_from_slice(&0i32.to_le_bytes()); // model id
        content.extend(dict_bytes(&[("_f", "0")]));

        let node = ShapeNode::parse(&content).unwrap();
        assert_eq!(node.id, 11);
        assert_eq!(node.models.len(), 1);
        assert_eq!(node.models[0].model_id, 0);
        assert_eq!(node.models[0].attributes["_f"], "0");
    }

    #[test]
    fn test_node_chunk_id() {
        let group = GroupNode {
            id: 42,
            attributes: HashMap::new(),
            child_ids: vec![],
        };
        assert_eq!(NodeChunk::Group(group).id(), 42);
    }
}
